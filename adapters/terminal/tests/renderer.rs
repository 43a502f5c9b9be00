use etd_core::{BotId, Command, EngineConfig, Event, Point};
use etd_terminal::{MemoryChannel, Renderer, Terminal};
use etd_world::{self as world, MapLayout, World};

fn session() -> (World, Renderer, Terminal<MemoryChannel>) {
    let layout = MapLayout::parse("E.#.\n....\n~..B\n").expect("map parses");
    let world = World::new(layout, &EngineConfig::default());
    (world, Renderer::new(), Terminal::new(MemoryChannel::new()))
}

fn apply(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn frame(
    renderer: &mut Renderer,
    terminal: &mut Terminal<MemoryChannel>,
    world: &World,
    events: &[Event],
) -> String {
    renderer.render(terminal, world, events).expect("render");
    String::from_utf8(terminal.channel_mut().take_sent()).expect("utf-8 output")
}

#[test]
fn first_frame_paints_the_whole_window() {
    let (mut world, mut renderer, mut terminal) = session();
    let events = apply(
        &mut world,
        Command::SpawnBot {
            at: Point::new(0, 0),
        },
    );

    let output = frame(&mut renderer, &mut terminal, &world, &events);

    assert!(output.contains("\x1b[2J"));
    assert!(output.contains("Embedded Tower Defense"));
    assert!(output.contains("Gold: 30000"));
    assert!(output.contains('%'));
    assert!(output.contains('#'));
    assert!(output.contains('~'));
}

#[test]
fn later_frames_only_touch_signalled_cells() {
    let (mut world, mut renderer, mut terminal) = session();
    let events = apply(
        &mut world,
        Command::SpawnBot {
            at: Point::new(0, 0),
        },
    );
    let _ = frame(&mut renderer, &mut terminal, &world, &events);

    let events = apply(
        &mut world,
        Command::MoveBot {
            bot: BotId::new(0),
            to: Point::new(1, 0),
        },
    );
    let output = frame(&mut renderer, &mut terminal, &world, &events);

    assert!(!output.contains("\x1b[2J"));
    let vacated = output.find("\x1b[2;2H").expect("vacated cell redrawn");
    let entered = output.find("\x1b[2;3H").expect("entered cell redrawn");
    assert!(vacated < entered);
    assert!(output[entered..].contains('%'));
}

#[test]
fn status_row_reports_build_outcomes() {
    let (mut world, mut renderer, mut terminal) = session();
    let _ = frame(&mut renderer, &mut terminal, &world, &[]);

    let rejected = apply(
        &mut world,
        Command::BuildTower {
            at: Point::new(2, 0),
        },
    );
    let output = frame(&mut renderer, &mut terminal, &world, &rejected);
    assert!(output.contains("Cannot Build Here"));

    let built = apply(
        &mut world,
        Command::BuildTower {
            at: Point::new(1, 1),
        },
    );
    let output = frame(&mut renderer, &mut terminal, &world, &built);
    assert!(output.contains("Tower Built Successfully"));
    assert!(output.contains("Gold: 28500"));
    let tower_cell = output.find("\x1b[3;3H").expect("tower cell drawn");
    assert!(output[tower_cell..].starts_with("\x1b[3;3H\x1b[48;5;129m1"));
}

#[test]
fn resizing_repaints_everything() {
    let (mut world, mut renderer, mut terminal) = session();
    let _ = frame(&mut renderer, &mut terminal, &world, &[]);

    let events = apply(
        &mut world,
        Command::ResizeViewport {
            width: 40,
            height: 10,
        },
    );
    let output = frame(&mut renderer, &mut terminal, &world, &events);

    assert!(output.contains("\x1b[2J"));
    assert!(output.contains("\x1b[10;1H"), "status row moves with the window");
}

#[test]
fn inspection_shows_bot_health() {
    let (mut world, mut renderer, mut terminal) = session();
    let _ = apply(
        &mut world,
        Command::SpawnBot {
            at: Point::new(0, 0),
        },
    );
    let _ = frame(&mut renderer, &mut terminal, &world, &[]);

    let events = apply(
        &mut world,
        Command::Inspect {
            at: Point::new(0, 0),
        },
    );
    assert!(frame(&mut renderer, &mut terminal, &world, &events).contains("10HP"));
}
