use etd_core::{BotId, Command, EngineConfig, Event, Point};
use etd_system_movement::{DefaultMovementPolicy, MoveOutcome};
use etd_world::{self as world, query, MapLayout, TileLookup, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn world_from(rows: &[&str]) -> World {
    let layout = MapLayout::parse(&rows.join("\n")).expect("map parses");
    World::new(layout, &EngineConfig::default())
}

fn apply(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn spawn(world: &mut World, at: Point) -> BotId {
    let events = apply(world, vec![Command::SpawnBot { at }]);
    events
        .iter()
        .find_map(|event| match event {
            Event::BotSpawned { bot, .. } => Some(*bot),
            _ => None,
        })
        .expect("bot spawned")
}

struct Harness {
    world: World,
    policy: DefaultMovementPolicy,
    rng: ChaCha8Rng,
}

impl Harness {
    fn new(world: World) -> Self {
        Self {
            world,
            policy: DefaultMovementPolicy::new(&EngineConfig::default()),
            rng: ChaCha8Rng::seed_from_u64(42),
        }
    }

    fn turn(&mut self, bot: BotId) -> MoveOutcome {
        let mut commands = Vec::new();
        let outcome = self
            .policy
            .plan(&self.world, bot, &mut self.rng, &mut commands);
        let _ = apply(&mut self.world, commands);
        outcome
    }

    fn position(&self, bot: BotId) -> Point {
        query::bot(&self.world, bot).expect("bot exists").position
    }

    fn flood_attempts(&self, bot: BotId) -> u8 {
        query::bot(&self.world, bot).expect("bot exists").flood_attempts
    }
}

fn open_field(width: usize, height: usize) -> Vec<String> {
    let mut rows: Vec<String> = (0..height).map(|_| ".".repeat(width)).collect();
    rows[0].replace_range(0..1, "B");
    rows
}

#[test]
fn open_field_is_crossed_greedily_without_searching() {
    let rows = open_field(12, 12);
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    let mut harness = Harness::new(world_from(&rows));
    let bot = spawn(&mut harness.world, Point::new(10, 10));

    assert_eq!(harness.turn(bot), MoveOutcome::Direct);
    assert_eq!(harness.position(bot), Point::new(10, 9));
    assert_eq!(harness.turn(bot), MoveOutcome::Direct);
    assert_eq!(harness.position(bot), Point::new(9, 9));

    let mut moves = 2;
    loop {
        match harness.turn(bot) {
            MoveOutcome::Direct => moves += 1,
            MoveOutcome::ReachedBase => break,
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(moves < 40, "bot failed to converge");
    }

    assert_eq!(moves, 19);
    assert_eq!(harness.position(bot), Point::new(1, 0));
    assert_eq!(harness.flood_attempts(bot), 0);
}

#[test]
fn winding_corridor_is_completed_with_search_assistance() {
    let mut harness = Harness::new(world_from(&[
        "#...####",
        "#B#..###",
        "####.###",
        "####..##",
        "#####.##",
        "####..##",
        "###..###",
        "##E.####",
    ]));
    let corridor = [
        Point::new(3, 7),
        Point::new(3, 6),
        Point::new(4, 6),
        Point::new(4, 5),
        Point::new(5, 5),
        Point::new(5, 4),
        Point::new(5, 3),
        Point::new(4, 3),
        Point::new(4, 2),
        Point::new(4, 1),
        Point::new(3, 1),
        Point::new(3, 0),
        Point::new(2, 0),
        Point::new(1, 0),
    ];
    let bot = spawn(&mut harness.world, Point::new(2, 7));

    let mut searched = 0;
    for expected in corridor {
        match harness.turn(bot) {
            MoveOutcome::Searched => searched += 1,
            MoveOutcome::Direct => {}
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(harness.position(bot), expected);
        assert_eq!(harness.flood_attempts(bot), 0);
    }

    assert!(searched >= 4, "corridor must need the pathfinder");
    assert_eq!(harness.turn(bot), MoveOutcome::ReachedBase);
}

#[test]
fn enclosed_bot_relocates_after_exhausting_its_searches() {
    let mut harness = Harness::new(world_from(&[
        "....................",
        "....................",
        "...#................",
        "..#.#...............",
        "...#................",
        "..................B.",
        "....................",
    ]));
    let bot = spawn(&mut harness.world, Point::new(3, 3));
    let bystander = spawn(&mut harness.world, Point::new(12, 1));
    let _ = apply(
        &mut harness.world,
        vec![Command::BuildTower {
            at: Point::new(8, 4),
        }],
    );
    assert!(query::tower_at(&harness.world, Point::new(8, 4)).is_some());

    for attempt in 1..=5 {
        assert_eq!(harness.turn(bot), MoveOutcome::SearchFailed);
        assert_eq!(harness.flood_attempts(bot), attempt);
        assert_eq!(harness.position(bot), Point::new(3, 3));
    }

    assert_eq!(harness.turn(bot), MoveOutcome::Relocated);
    let landed = harness.position(bot);
    assert_ne!(landed, Point::new(3, 3));
    assert_ne!(landed, query::base(&harness.world));
    assert_ne!(landed, harness.position(bystander));
    assert!(query::tile_grid(&harness.world).is_passable(landed));
    assert!(query::tower_at(&harness.world, landed).is_none());
    assert_eq!(
        query::bot_at(&harness.world, landed).map(|(id, _)| id),
        Some(bot)
    );
    assert_eq!(harness.flood_attempts(bot), 0);
}

#[test]
fn enclosed_bot_near_the_base_holds_position() {
    let mut harness = Harness::new(world_from(&[
        "........",
        "...#....",
        "..#.#.B.",
        "...#....",
    ]));
    let bot = spawn(&mut harness.world, Point::new(3, 2));

    for _ in 0..5 {
        assert_eq!(harness.turn(bot), MoveOutcome::SearchFailed);
    }
    for _ in 0..3 {
        assert_eq!(harness.turn(bot), MoveOutcome::Holding);
        assert_eq!(harness.flood_attempts(bot), 5);
        assert_eq!(harness.position(bot), Point::new(3, 2));
    }
}

#[test]
fn congested_route_counts_as_a_failed_search() {
    let mut harness = Harness::new(world_from(&["B..EE"]));
    let front = spawn(&mut harness.world, Point::new(3, 0));
    let rear = spawn(&mut harness.world, Point::new(4, 0));

    assert_eq!(harness.turn(rear), MoveOutcome::SearchFailed);
    assert_eq!(harness.flood_attempts(rear), 1);
    assert_eq!(harness.position(front), Point::new(3, 0));
    assert_eq!(harness.position(rear), Point::new(4, 0));
}

#[test]
fn stuck_bot_passes_congestion_without_moving() {
    let mut harness = Harness::new(world_from(&["B..EE"]));
    let _front = spawn(&mut harness.world, Point::new(3, 0));
    let rear = spawn(&mut harness.world, Point::new(4, 0));
    let _ = apply(
        &mut harness.world,
        (0..5)
            .map(|_| Command::RecordSearchFailure { bot: rear })
            .collect(),
    );

    assert_eq!(harness.turn(rear), MoveOutcome::Yielded);
    assert_eq!(harness.position(rear), Point::new(4, 0));
    assert_eq!(harness.flood_attempts(rear), 5);
}

#[test]
fn dead_bots_are_inert() {
    let mut harness = Harness::new(world_from(&["B..E"]));
    let bot = spawn(&mut harness.world, Point::new(3, 0));
    let _ = apply(
        &mut harness.world,
        vec![Command::DamageBot {
            bot,
            tower: etd_core::TowerId::new(0),
            amount: u8::MAX,
        }],
    );

    assert_eq!(harness.turn(bot), MoveOutcome::Inert);
}
