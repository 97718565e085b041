use std::process::ExitCode;

use quest_engine::{load_world, CutsceneOutcome, Direction, Hosts, Overworld, PlayerStep};
use tracing::{error, info, warn};

use super::bootstrap::AppWiring;
use super::console::{
    animations, read_stdin_line, unregistered_animations, ConsoleCrafting, ConsoleMenu,
    ConsoleMessages, LoggingSurface,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    Move(Direction),
    Interact,
    Wait,
    Look,
    Help,
    Quit,
}

const HELP: &str = "commands: w/a/s/d (move), e (interact), . (wait), l (look), h (help), q (quit)";

pub(crate) fn parse_command(line: &str) -> Result<Command, String> {
    let command = match line.trim().to_ascii_lowercase().as_str() {
        "w" | "up" => Command::Move(Direction::Up),
        "s" | "down" => Command::Move(Direction::Down),
        "a" | "left" => Command::Move(Direction::Left),
        "d" | "right" => Command::Move(Direction::Right),
        "e" | "interact" => Command::Interact,
        "." | "wait" => Command::Wait,
        "l" | "look" => Command::Look,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(command)
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!(error = %err, "runtime_start_failed");
            return ExitCode::FAILURE;
        }
    };
    runtime.block_on(play(app))
}

async fn play(app: AppWiring) -> ExitCode {
    let content = match load_world(&app.content_file) {
        Ok(content) => content,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };
    let animations = animations();
    for name in unregistered_animations(&animations, &content) {
        warn!(animation = name, "animation_unregistered");
    }
    let hosts = Hosts::new(ConsoleMessages, ConsoleMenu::new(Box::new(read_stdin_line)))
        .with_crafting(ConsoleCrafting::new(Box::new(read_stdin_line)))
        .with_animations(animations);
    let mut session = match Overworld::new(app.config, content, hosts) {
        Ok(session) => session,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };

    println!("{HELP}");
    describe(&session);
    loop {
        print!("> ");
        let _ = std::io::Write::flush(&mut std::io::stdout());
        let Some(line) = read_stdin_line() else {
            break;
        };
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}; {HELP}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        apply(&mut session, command).await;
    }

    let flags = session.finish();
    info!(
        flags = %flags.iter().collect::<Vec<_>>().join(","),
        "session_ended"
    );
    ExitCode::SUCCESS
}

async fn apply(session: &mut Overworld, command: Command) {
    match command {
        Command::Move(direction) => match session.step_player(direction).await {
            PlayerStep::Moved { position, cutscene } => {
                println!("you walk to ({}, {})", position.x, position.y);
                report_cutscene(cutscene);
            }
            PlayerStep::Turned => println!("something is in the way"),
            PlayerStep::Suppressed => println!("you cannot move right now"),
        },
        Command::Interact => match session.interact().await {
            Some(outcome) => report_cutscene(Some(outcome)),
            None => println!("nobody to talk to"),
        },
        Command::Wait => {}
        Command::Look => describe(session),
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
    // Idle NPCs get one step per command.
    session.advance_idle_behaviors().await;
}

fn report_cutscene(outcome: Option<CutsceneOutcome>) {
    if outcome == Some(CutsceneOutcome::Aborted) {
        println!("everything goes dark...");
    }
}

fn describe(session: &Overworld) {
    let map = session.map();
    println!("[{}]", map.id());
    for entity in map.entities().iter() {
        println!(
            "  {} at ({}, {}) facing {}",
            entity.key,
            entity.position.x,
            entity.position.y,
            entity.direction.as_token()
        );
    }
    let mut surface = LoggingSurface::default();
    session.draw(&mut surface);
    info!(map = %map.id(), layers = surface.draw_count, "map_drawn");
}
