//! Main chat event loop
//!
//! The loop owns the [`App`] outright. Each turn it draws, waits briefly for
//! terminal input, routes it, then applies whatever background tasks have
//! finished. Task completions therefore never race with key handling.

mod keybindings;
mod lifecycle;

pub use self::keybindings::{route_key, KeyLoopAction};
pub use self::lifecycle::{restore_terminal, setup_terminal, ChatTerminal, SuspendableTerminal};

use std::{error::Error, sync::Arc, time::Duration};

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use tracing::{debug, info};

use crate::api::ChatClient;
use crate::core::app::App;
use crate::core::config::Config;
use crate::core::tasks::TaskRunner;
use crate::ui::renderer::ui;
use crate::utils::editor::ExternalEditor;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub async fn run_chat(config: Config, client: Arc<dyn ChatClient>) -> Result<(), Box<dyn Error>> {
    let mut runner = TaskRunner::spawn(config.task_workers);
    let mut app = App::new(&config, client, runner.scheduler());
    app.post_info("Type /help for commands. Meta+E toggles multi-line, Meta+K opens $EDITOR.");

    let mut terminal = setup_terminal()?;
    info!("chat session started");

    let result = event_loop(&mut terminal, &mut app, &mut runner).await;

    restore_terminal(&mut terminal)?;
    info!("chat session ended");
    result
}

async fn event_loop(
    terminal: &mut ChatTerminal,
    app: &mut App,
    runner: &mut TaskRunner<App>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    match route_key(app, &key) {
                        KeyLoopAction::Continue => {}
                        KeyLoopAction::Break => break,
                        KeyLoopAction::LaunchEditor => launch_editor(terminal, app),
                    }
                }
                Event::Paste(text) => app.handle_paste(text.as_bytes()),
                _ => {}
            }
        }

        let applied = runner.apply_ready(app);
        if applied > 0 {
            debug!(applied, "applied task results");
        }
        if app.exit_requested {
            break;
        }
        tokio::task::yield_now().await;
    }
    Ok(())
}

fn launch_editor(terminal: &mut ChatTerminal, app: &mut App) {
    let editor = ExternalEditor::from_env();
    let lines = app.session.editor().lines().to_vec();
    let result = editor.edit(&lines, &mut SuspendableTerminal::new(terminal));
    app.apply_external_edit(result);
}
