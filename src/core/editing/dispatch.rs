//! Ordered key rules for the message editor.
//!
//! Each [`EditRule`] pairs a predicate over the current editor state with an
//! action. [`dispatch`] walks [`EDIT_RULES`] top to bottom and runs the first
//! rule whose predicate holds. The display-only backspace rule sits above the
//! smart-pair rules, and both sit above the plain control/meta bindings.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

use super::EditingSession;
use crate::core::buffer::EditorBuffer;

/// Key code plus modifiers, ignoring SHIFT (terminals disagree on whether
/// shifted punctuation such as `*` carries it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyChord {
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub const fn ctrl(ch: char) -> Self {
        Self {
            code: KeyCode::Char(ch),
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub const fn meta(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::ALT,
        }
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code && self.modifiers == key.modifiers.difference(KeyModifiers::SHIFT)
    }
}

/// True when no command modifier is held.
pub fn is_plain(key: &KeyEvent) -> bool {
    !key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
}

/// Everything a rule predicate may look at.
pub struct RuleContext<'a> {
    pub key: &'a KeyEvent,
    pub editor: &'a EditorBuffer,
    pub editing_permitted: bool,
    pub smart_pairs: bool,
    pub smart_chars: &'a [char],
}

impl RuleContext<'_> {
    fn editable_chord(&self, chord: KeyChord) -> bool {
        self.editing_permitted && chord.matches(self.key)
    }

    fn plain_backspace(&self) -> bool {
        self.key.code == KeyCode::Backspace && self.key.modifiers.is_empty()
    }
}

pub struct EditRule {
    pub name: &'static str,
    pub applies: fn(&RuleContext<'_>) -> bool,
    /// Returns false when the key turned out to mean nothing to the editor.
    pub apply: fn(&mut EditingSession, &KeyEvent) -> bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Name of the rule that handled the key, `None` when it was swallowed.
    pub rule: Option<&'static str>,
    /// Whether the buffer content changed (cursor motion alone does not count).
    pub changed: bool,
}

impl DispatchOutcome {
    pub fn handled(&self) -> bool {
        self.rule.is_some()
    }
}

const TRANSPOSE: KeyChord = KeyChord::ctrl('t');
const NEXT_CHAR: KeyChord = KeyChord::ctrl('f');
const PREV_CHAR: KeyChord = KeyChord::ctrl('b');
const NEXT_WORD: KeyChord = KeyChord::meta(KeyCode::Char('f'));
const PREV_WORD: KeyChord = KeyChord::meta(KeyCode::Char('b'));
const DELETE_PREV_WORD: KeyChord = KeyChord::meta(KeyCode::Backspace);
const DELETE_NEXT_WORD: KeyChord = KeyChord::meta(KeyCode::Char('d'));
const KILL_TO_EOL: KeyChord = KeyChord::ctrl('k');
const KILL_TO_BOL: KeyChord = KeyChord::ctrl('u');
const YANK: KeyChord = KeyChord::ctrl('y');

pub static EDIT_RULES: &[EditRule] = &[
    EditRule {
        name: "transpose-chars",
        applies: |ctx| ctx.editable_chord(TRANSPOSE),
        apply: |session, _| {
            session.editor_mut().transpose_chars();
            true
        },
    },
    EditRule {
        name: "clear-display-only",
        applies: |ctx| !ctx.editing_permitted && ctx.plain_backspace(),
        apply: |session, _| {
            session.editor_mut().clear();
            true
        },
    },
    EditRule {
        name: "smart-backspace",
        applies: |ctx| ctx.editing_permitted && ctx.smart_pairs && ctx.plain_backspace(),
        apply: smart_backspace,
    },
    EditRule {
        name: "smart-char",
        applies: |ctx| {
            ctx.editing_permitted
                && ctx.smart_pairs
                && is_plain(ctx.key)
                && matches!(ctx.key.code, KeyCode::Char(ch) if ctx.smart_chars.contains(&ch))
        },
        apply: smart_char,
    },
    EditRule {
        name: "next-char",
        applies: |ctx| ctx.editable_chord(NEXT_CHAR),
        apply: |session, _| {
            session.editor_mut().move_right();
            true
        },
    },
    EditRule {
        name: "prev-char",
        applies: |ctx| ctx.editable_chord(PREV_CHAR),
        apply: |session, _| {
            session.editor_mut().move_left();
            true
        },
    },
    EditRule {
        name: "next-word",
        applies: |ctx| ctx.editable_chord(NEXT_WORD),
        apply: |session, _| {
            session.editor_mut().move_word_right();
            true
        },
    },
    EditRule {
        name: "prev-word",
        applies: |ctx| ctx.editable_chord(PREV_WORD),
        apply: |session, _| {
            session.editor_mut().move_word_left();
            true
        },
    },
    EditRule {
        name: "delete-prev-word",
        applies: |ctx| ctx.editable_chord(DELETE_PREV_WORD),
        apply: |session, _| {
            session.editor_mut().delete_prev_word();
            true
        },
    },
    EditRule {
        name: "delete-next-word",
        applies: |ctx| ctx.editable_chord(DELETE_NEXT_WORD),
        apply: |session, _| {
            session.editor_mut().delete_word();
            true
        },
    },
    EditRule {
        name: "kill-to-eol",
        applies: |ctx| ctx.editable_chord(KILL_TO_EOL),
        apply: |session, _| {
            let killed = session.editor_mut().kill_to_eol();
            session.store_killed(killed);
            true
        },
    },
    EditRule {
        name: "kill-to-bol",
        applies: |ctx| ctx.editable_chord(KILL_TO_BOL),
        apply: |session, _| {
            let killed = session.editor_mut().kill_to_bol();
            session.store_killed(killed);
            true
        },
    },
    EditRule {
        name: "yank",
        applies: |ctx| ctx.editable_chord(YANK),
        apply: |session, _| {
            let yanked = session.yank_contents().to_string();
            session.editor_mut().insert_str(&yanked);
            true
        },
    },
    EditRule {
        name: "generic-edit",
        applies: |ctx| ctx.editing_permitted,
        apply: generic_edit,
    },
];

/// Runs the first matching rule. Keys no rule accepts leave the session as is.
pub fn dispatch(session: &mut EditingSession, key: &KeyEvent) -> DispatchOutcome {
    let selected = {
        let ctx = RuleContext {
            key,
            editor: &session.editor,
            editing_permitted: session.editing_permitted(),
            smart_pairs: session.settings.smart_pairs,
            smart_chars: &session.settings.smart_chars,
        };
        EDIT_RULES.iter().find(|rule| (rule.applies)(&ctx))
    };

    let Some(rule) = selected else {
        return DispatchOutcome {
            rule: None,
            changed: false,
        };
    };

    let revision = session.editor.revision();
    if !(rule.apply)(session, key) {
        return DispatchOutcome {
            rule: None,
            changed: false,
        };
    }

    trace!(rule = rule.name, code = ?key.code, "edit rule applied");
    session.clear_completion();
    DispatchOutcome {
        rule: Some(rule.name),
        changed: session.editor.revision() != revision,
    }
}

fn smart_backspace(session: &mut EditingSession, _key: &KeyEvent) -> bool {
    let editor = &session.editor;
    let closes_pair = editor.char_at_cursor().is_some_and(|ch| {
        session.settings.smart_chars.contains(&ch)
            && editor.char_before_cursor() == Some(ch)
            && is_last_on_line(editor)
    });
    let editor = session.editor_mut();
    if closes_pair {
        editor.delete_char();
    }
    editor.delete_prev_char();
    true
}

fn smart_char(session: &mut EditingSession, key: &KeyEvent) -> bool {
    let KeyCode::Char(ch) = key.code else {
        return false;
    };
    let editor = session.editor_mut();
    let at_boundary = editor.char_before_cursor().is_none_or(|c| c == ' ');
    if editor.is_empty() || (at_boundary && editor.cursor_at_eol()) {
        editor.insert_str(&format!("{ch}{ch}"));
        editor.move_left();
    } else if editor.char_at_cursor() == Some(ch) && is_last_on_line(editor) {
        editor.move_right();
    } else {
        editor.insert_char(ch);
    }
    true
}

/// The character under the cursor is the final one on its line.
fn is_last_on_line(editor: &EditorBuffer) -> bool {
    editor.cursor().column + 1 == editor.current_line().chars().count()
}

fn generic_edit(session: &mut EditingSession, key: &KeyEvent) -> bool {
    let editor = session.editor_mut();
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('a') if ctrl => editor.goto_bol(),
        KeyCode::Char('e') if ctrl => editor.goto_eol(),
        KeyCode::Char('d') if ctrl => editor.delete_char(),
        KeyCode::Char(ch) if is_plain(key) => editor.insert_char(ch),
        KeyCode::Enter if is_plain(key) => editor.break_line(),
        KeyCode::Backspace => editor.delete_prev_char(),
        KeyCode::Delete => editor.delete_char(),
        KeyCode::Left => editor.move_left(),
        KeyCode::Right => editor.move_right(),
        KeyCode::Up => editor.move_up(),
        KeyCode::Down => editor.move_down(),
        KeyCode::Home => editor.goto_bol(),
        KeyCode::End => editor.goto_eol(),
        _ => return false,
    }
    true
}
