use etd_core::{Command, Direction, EngineConfig, InputEvent, Point};
use etd_system_builder::Builder;
use etd_world::{self as world, query, MapLayout, World};

fn wide_world() -> World {
    let open_row = ".".repeat(120);
    let rows = [format!("B{}", ".".repeat(119)), open_row.clone(), open_row.clone(), open_row];
    let layout = MapLayout::parse(&rows.join("\n")).expect("map parses");
    World::new(layout, &EngineConfig::default())
}

fn translate(world: &World, input: InputEvent) -> Vec<Command> {
    let mut commands = Vec::new();
    Builder::new().handle(input, query::viewport(world), &mut commands);
    commands
}

#[test]
fn build_targets_the_cursor_tile() {
    let mut world = wide_world();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetCursor {
            to: Point::new(5, 2),
        },
        &mut events,
    );

    assert_eq!(
        translate(&world, InputEvent::Build),
        vec![Command::BuildTower {
            at: Point::new(5, 2),
        }],
    );
    assert_eq!(
        translate(&world, InputEvent::Inspect),
        vec![Command::Inspect {
            at: Point::new(5, 2),
        }],
    );
}

#[test]
fn build_is_ignored_while_the_cursor_is_off_screen() {
    let mut world = wide_world();
    let mut events = Vec::new();
    for _ in 0..10 {
        world::apply(
            &mut world,
            Command::PanView {
                direction: Direction::East,
            },
            &mut events,
        );
    }
    assert_eq!(query::viewport(&world).origin(), Point::new(10, 0));

    assert!(translate(&world, InputEvent::Build).is_empty());
    assert!(translate(&world, InputEvent::Upgrade).is_empty());
}

#[test]
fn navigation_input_maps_to_intent_commands() {
    let world = wide_world();

    assert_eq!(
        translate(&world, InputEvent::Pan(Direction::West)),
        vec![Command::PanView {
            direction: Direction::West,
        }],
    );
    assert_eq!(
        translate(&world, InputEvent::MoveCursor(Direction::South)),
        vec![Command::MoveCursor {
            direction: Direction::South,
        }],
    );
    assert_eq!(
        translate(
            &world,
            InputEvent::Resize {
                width: 100,
                height: 30,
            },
        ),
        vec![Command::ResizeViewport {
            width: 100,
            height: 30,
        }],
    );
    assert!(translate(&world, InputEvent::Quit).is_empty());
}
