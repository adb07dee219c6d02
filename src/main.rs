/// Entry point and game loop.

use std::process;

use log::{info, warn};

use boxrunner::config::{GameConfig, ROOT_ENV_VAR};
use boxrunner::sim::event::GameEvent;
use boxrunner::sim::play::Level;
use boxrunner::sim::session::LevelSession;
use boxrunner::ui::input::{self, Action};
use boxrunner::ui::prompt::TerminalPrompt;
use boxrunner::ui::renderer::{Renderer, StatusInfo};

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Outcome {
    Cleared,
    Quit,
}

fn main() {
    env_logger::init();
    let config = GameConfig::load();

    let mut session = match LevelSession::initialize(&config.root_dir) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Fatal: {e}");
            eprintln!(
                "Point {} or `root_dir` in config.toml at a directory containing Levels/.",
                ROOT_ENV_VAR
            );
            process::exit(1);
        }
    };

    info!(
        "playing {} level(s) from {}",
        session.level_count(),
        session.levels_dir().display()
    );

    let mut prompt = TerminalPrompt::stdin(session.banner());
    match session.select_save(&mut prompt) {
        Ok(Some(path)) => info!("resuming from {}", path.display()),
        Ok(None) => {}
        Err(e) => warn!(
            "save selection under {} failed: {e}; starting from the first level",
            session.root().display()
        ),
    }

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = run(&mut session, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(Outcome::Cleared) => println!("Every level cleared. Thanks for playing!"),
        Ok(Outcome::Quit) => println!("Thanks for playing!"),
        Err(e) => {
            eprintln!("Game error: {e}");
            process::exit(1);
        }
    }
}

fn run(session: &mut LevelSession, renderer: &mut Renderer, config: &GameConfig) -> AppResult<Outcome> {
    while session.advance_level() {
        let doc = session.load_current_level()?;
        let mut level = Level::from_document(&doc);
        renderer.clear()?;
        if play_level(&mut level, session, renderer, config)? == Outcome::Quit {
            return Ok(Outcome::Quit);
        }
    }
    Ok(Outcome::Cleared)
}

fn play_level(
    level: &mut Level,
    session: &LevelSession,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> AppResult<Outcome> {
    let level_number = session.current_index().map_or(1, |i| i + 1);
    let level_count = session.level_count();
    let mut notice = String::new();

    loop {
        let status = StatusInfo { level_number, level_count, notice: &notice };
        renderer.render(level, &status)?;

        let action = match input::next_action(config.play.poll)? {
            Some(a) => a,
            None => continue,
        };
        notice.clear();

        match action {
            Action::Move(dir) => {
                let events = level.step(dir);
                if events.contains(&GameEvent::LevelCleared) {
                    info!("level {} cleared in {}s", level_number, level.elapsed_secs());
                    let done = StatusInfo {
                        level_number,
                        level_count,
                        notice: "Level cleared! Press any key",
                    };
                    renderer.render(level, &done)?;
                    input::wait_for_key()?;
                    return Ok(Outcome::Cleared);
                }
            }
            Action::Undo => {
                if !level.undo() {
                    notice.push_str("Nothing to undo");
                }
            }
            Action::Reset => {
                level.reset();
                renderer.clear()?;
            }
            Action::Save => {
                match session.save_snapshot(level.objects(), level.map(), level.elapsed_secs()) {
                    Ok(name) => notice = format!("Saved to {name}"),
                    Err(e) => {
                        warn!("save failed: {e}");
                        notice = format!("Save failed: {e}");
                    }
                }
            }
            Action::Quit => return Ok(Outcome::Quit),
        }
    }
}
