//! Message composition state: the command-line editor, its mode flags and the
//! kill/yank slot.
//!
//! [`EditingSession`] is owned by [`crate::core::app::App`] and only changes
//! through the operations below. Key presses go through the ordered rule list
//! in [`dispatch`]; pastes and external edits bypass it.

pub mod completion;
pub mod dispatch;

use ratatui::crossterm::event::KeyEvent;
use tracing::debug;

use crate::core::buffer::EditorBuffer;
use crate::utils::input::sanitize_text_input;

pub use completion::Completion;
pub use dispatch::{DispatchOutcome, EditRule, EDIT_RULES};

/// Characters that are inserted and removed as pairs when smart pairing is on.
pub const SMART_CHARS: [char; 3] = ['*', '`', '_'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSettings {
    pub smart_pairs: bool,
    pub smart_chars: Vec<char>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            smart_pairs: true,
            smart_chars: SMART_CHARS.to_vec(),
        }
    }
}

/// Single-slot storage for the most recently killed span.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YankBuffer {
    contents: String,
}

impl YankBuffer {
    /// Overwrites the slot; there is no ring and no appending.
    pub fn store(&mut self, killed: String) {
        self.contents = killed;
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditingSession {
    editor: EditorBuffer,
    multiline: bool,
    show_preview: bool,
    yank: YankBuffer,
    completion: Option<Completion>,
    settings: EditorSettings,
}

impl EditingSession {
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn editor(&self) -> &EditorBuffer {
        &self.editor
    }

    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    pub fn show_preview(&self) -> bool {
        self.show_preview
    }

    pub fn yank_contents(&self) -> &str {
        self.yank.contents()
    }

    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    /// The editor is editable when it holds a single line or multiline mode
    /// is on. Otherwise it is display-only and backspace clears it.
    pub fn editing_permitted(&self) -> bool {
        self.editor.line_count() == 1 || self.multiline
    }

    pub fn toggle_multiline(&mut self) {
        self.multiline = !self.multiline;
        debug!(multiline = self.multiline, "toggled multiline editing");
    }

    pub fn toggle_message_preview(&mut self) {
        self.show_preview = !self.show_preview;
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> DispatchOutcome {
        dispatch::dispatch(self, key)
    }

    /// Inserts pasted bytes in one step, so smart pairing never sees the
    /// individual characters. A multi-line result forces multiline mode.
    pub fn handle_paste(&mut self, bytes: &[u8]) {
        let text = sanitize_text_input(&String::from_utf8_lossy(bytes));
        self.editor.insert_str(&text);
        self.completion = None;
        if self.editor.line_count() > 1 {
            self.multiline = true;
        }
    }

    /// Replaces the content with lines produced by the external editor.
    pub fn replace_lines(&mut self, lines: Vec<String>) {
        self.editor.set_lines(lines);
        self.multiline = self.editor.line_count() > 1;
        self.completion = None;
    }

    /// Takes the message for sending. Blank content stays in the editor.
    pub fn take_submission(&mut self) -> Option<String> {
        let text = self.editor.text();
        if text.trim().is_empty() {
            return None;
        }
        self.editor.clear();
        self.completion = None;
        Some(text)
    }

    /// Completes the `@mention` before the cursor, or advances to the next
    /// alternative when a completion is already pending.
    pub fn complete_mention<F>(&mut self, lookup: F) -> bool
    where
        F: FnOnce(&str) -> Vec<String>,
    {
        if !self.editing_permitted() {
            return false;
        }
        if let Some(pending) = self.completion.as_mut() {
            completion::cycle(&mut self.editor, pending);
            return true;
        }
        let Some(prefix) = completion::mention_prefix(&self.editor) else {
            return false;
        };
        let alternatives = lookup(&prefix)
            .into_iter()
            .map(|name| format!("@{name}"))
            .collect::<Vec<_>>();
        let Some(started) = completion::begin(&mut self.editor, alternatives) else {
            return false;
        };
        self.completion = Some(started);
        true
    }

    pub(crate) fn editor_mut(&mut self) -> &mut EditorBuffer {
        &mut self.editor
    }

    pub(crate) fn store_killed(&mut self, killed: String) {
        self.yank.store(killed);
    }

    pub(crate) fn clear_completion(&mut self) {
        self.completion = None;
    }
}
