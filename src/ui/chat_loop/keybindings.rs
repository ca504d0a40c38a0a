//! Global key bindings, checked before a key reaches the message editor.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use tracing::trace;

use crate::core::app::App;
use crate::core::editing::dispatch::{is_plain, KeyChord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLoopAction {
    Continue,
    Break,
    /// Suspend the UI and hand the draft to `$EDITOR`.
    LaunchEditor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GlobalAction {
    Quit,
    ToggleMultiline,
    ExternalEditor,
    TogglePreview,
    Submit,
    Complete,
}

struct GlobalBinding {
    chord: KeyChord,
    action: GlobalAction,
}

const GLOBAL_BINDINGS: &[GlobalBinding] = &[
    GlobalBinding {
        chord: KeyChord::ctrl('c'),
        action: GlobalAction::Quit,
    },
    GlobalBinding {
        chord: KeyChord::meta(KeyCode::Char('e')),
        action: GlobalAction::ToggleMultiline,
    },
    GlobalBinding {
        chord: KeyChord::meta(KeyCode::Char('k')),
        action: GlobalAction::ExternalEditor,
    },
    GlobalBinding {
        chord: KeyChord::meta(KeyCode::Char('p')),
        action: GlobalAction::TogglePreview,
    },
    GlobalBinding {
        chord: KeyChord::meta(KeyCode::Enter),
        action: GlobalAction::Submit,
    },
    GlobalBinding {
        chord: KeyChord::plain(KeyCode::Tab),
        action: GlobalAction::Complete,
    },
];

fn global_action(app: &App, key: &KeyEvent) -> Option<GlobalAction> {
    if let Some(binding) = GLOBAL_BINDINGS.iter().find(|b| b.chord.matches(key)) {
        return Some(binding.action);
    }
    // Plain Enter sends in single-line mode and breaks the line otherwise.
    (key.code == KeyCode::Enter && is_plain(key) && !app.session.is_multiline())
        .then_some(GlobalAction::Submit)
}

pub fn route_key(app: &mut App, key: &KeyEvent) -> KeyLoopAction {
    let Some(action) = global_action(app, key) else {
        let outcome = app.session.handle_key(key);
        trace!(rule = ?outcome.rule, changed = outcome.changed, "editor key");
        return KeyLoopAction::Continue;
    };

    match action {
        GlobalAction::Quit => return KeyLoopAction::Break,
        GlobalAction::ExternalEditor => return KeyLoopAction::LaunchEditor,
        GlobalAction::ToggleMultiline => app.session.toggle_multiline(),
        GlobalAction::TogglePreview => app.session.toggle_message_preview(),
        GlobalAction::Submit => app.submit_input(),
        GlobalAction::Complete => {
            app.complete_mention();
        }
    }
    if app.exit_requested {
        KeyLoopAction::Break
    } else {
        KeyLoopAction::Continue
    }
}
