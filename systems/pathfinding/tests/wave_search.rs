use std::collections::{HashSet, VecDeque};

use etd_core::{MapSize, Point};
use etd_system_pathfinding::WavePathfinder;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SIZE: MapSize = MapSize::new(10, 10);

struct Field {
    stone: HashSet<Point>,
}

impl Field {
    fn random(rng: &mut ChaCha8Rng) -> Self {
        let mut stone = HashSet::new();
        for y in 0..SIZE.height() {
            for x in 0..SIZE.width() {
                if rng.gen_bool(0.3) {
                    let _ = stone.insert(Point::new(x, y));
                }
            }
        }
        Self { stone }
    }

    fn from_open(size: MapSize, open: &[Point]) -> Self {
        let mut stone = HashSet::new();
        for y in 0..size.height() {
            for x in 0..size.width() {
                let point = Point::new(x, y);
                if !open.contains(&point) {
                    let _ = stone.insert(point);
                }
            }
        }
        Self { stone }
    }

    fn passable(&self, point: Point) -> bool {
        !self.stone.contains(&point)
    }

    fn random_open(&self, rng: &mut ChaCha8Rng) -> Point {
        loop {
            let point = Point::new(
                rng.gen_range(0..SIZE.width()),
                rng.gen_range(0..SIZE.height()),
            );
            if self.passable(point) {
                return point;
            }
        }
    }
}

fn reference_distance(field: &Field, origin: Point, goal: Point) -> Option<u16> {
    let mut seen = HashSet::from([origin]);
    let mut queue = VecDeque::from([(origin, 0_u16)]);
    while let Some((point, distance)) = queue.pop_front() {
        if point == goal {
            return Some(distance);
        }
        for neighbor in point.neighbors(SIZE) {
            if (neighbor == goal || field.passable(neighbor)) && seen.insert(neighbor) {
                queue.push_back((neighbor, distance + 1));
            }
        }
    }
    None
}

#[test]
fn successful_searches_match_unbounded_breadth_first_distance() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut pathfinder = WavePathfinder::<128>::new();
    let mut routed = 0;

    for _ in 0..200 {
        let field = Field::random(&mut rng);
        let origin = field.random_open(&mut rng);
        let goal = field.random_open(&mut rng);
        if origin == goal {
            continue;
        }

        let expected = reference_distance(&field, origin, goal);
        let step = pathfinder.find_step(origin, goal, SIZE, |point| field.passable(point));

        match (expected, step) {
            (Some(distance), Some(step)) => {
                routed += 1;
                let goal_node = pathfinder.visited().last().expect("goal recorded last");
                assert_eq!(goal_node.position, goal);
                assert_eq!(goal_node.weight, distance);
                assert!(step.is_adjacent(origin), "step must be one hop away");
                assert_eq!(reference_distance(&field, step, goal), Some(distance - 1));
            }
            (None, None) => {}
            (expected, step) => {
                panic!("search disagreed with reference: {expected:?} vs {step:?}")
            }
        }
    }

    assert!(routed > 50, "too few routable samples: {routed}");
}

#[test]
fn weights_never_decrease_in_insertion_order() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut pathfinder = WavePathfinder::<128>::new();

    for _ in 0..100 {
        let field = Field::random(&mut rng);
        let origin = field.random_open(&mut rng);
        let goal = field.random_open(&mut rng);
        let _ = pathfinder.find_step(origin, goal, SIZE, |point| field.passable(point));

        let visited = pathfinder.visited();
        assert!(visited
            .windows(2)
            .all(|pair| pair[0].weight <= pair[1].weight));

        let unique: HashSet<Point> = visited.iter().map(|node| node.position).collect();
        assert_eq!(unique.len(), visited.len(), "a tile was discovered twice");
    }
}

#[test]
fn search_is_bounded_by_the_node_budget() {
    let size = MapSize::new(20, 20);
    let goal = Point::new(10, 10);
    let walls: Vec<Point> = goal.neighbors(size).collect();
    let mut pathfinder = WavePathfinder::<400>::with_budget(40);

    let step = pathfinder.find_step(Point::new(0, 0), goal, size, |point| {
        !walls.contains(&point)
    });

    assert_eq!(step, None);
    assert!(pathfinder.visited().len() <= 40);
}

#[test]
fn enclosed_goal_fails_once_the_reachable_area_is_exhausted() {
    let size = MapSize::new(20, 20);
    let goal = Point::new(10, 10);
    let walls: Vec<Point> = goal.neighbors(size).collect();
    let mut pathfinder = WavePathfinder::<400>::new();

    let step = pathfinder.find_step(Point::new(0, 0), goal, size, |point| {
        !walls.contains(&point)
    });

    assert_eq!(step, None);
    assert_eq!(pathfinder.visited().len(), 400 - 5);
}

#[test]
fn winding_corridor_is_followed_step_by_step() {
    let size = MapSize::new(7, 7);
    let corridor = [
        Point::new(0, 0),
        Point::new(1, 0),
        Point::new(2, 0),
        Point::new(3, 0),
        Point::new(4, 0),
        Point::new(4, 1),
        Point::new(4, 2),
        Point::new(3, 2),
        Point::new(2, 2),
        Point::new(1, 2),
        Point::new(0, 2),
        Point::new(0, 3),
        Point::new(0, 4),
        Point::new(1, 4),
        Point::new(2, 4),
        Point::new(3, 4),
    ];
    let field = Field::from_open(size, &corridor);
    let goal = corridor[corridor.len() - 1];
    let mut pathfinder = WavePathfinder::<32>::new();

    let mut position = corridor[0];
    for expected in &corridor[1..] {
        let step = pathfinder
            .find_step(position, goal, size, |point| field.passable(point))
            .expect("corridor stays routable");
        assert_eq!(step, *expected);
        position = step;
    }
    assert_eq!(position, goal);
}

#[test]
fn corridor_longer_than_the_budget_fails() {
    let size = MapSize::new(16, 1);
    let mut pathfinder = WavePathfinder::<8>::new();

    let step = pathfinder.find_step(Point::new(0, 0), Point::new(15, 0), size, |_| true);

    assert_eq!(step, None);
    assert_eq!(pathfinder.visited().len(), 8);
}
