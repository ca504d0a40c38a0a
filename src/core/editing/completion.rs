//! `@username` completion for the message editor.

use crate::core::buffer::EditorBuffer;

/// A completion that has been applied to the buffer and can be cycled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    alternatives: Vec<String>,
    selected: usize,
}

impl Completion {
    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    pub fn selected(&self) -> &str {
        &self.alternatives[self.selected]
    }
}

/// The `@word` immediately left of the cursor, without the sigil.
pub fn mention_prefix(editor: &EditorBuffer) -> Option<String> {
    let column = editor.cursor().column;
    let before: Vec<char> = editor.current_line().chars().take(column).collect();
    let start = before
        .iter()
        .rposition(|c| c.is_whitespace())
        .map_or(0, |idx| idx + 1);
    let word: String = before[start..].iter().collect();
    let prefix = word.strip_prefix('@')?;
    if prefix.is_empty() {
        None
    } else {
        Some(prefix.to_string())
    }
}

/// Starts a completion for the mention before the cursor, replacing the whole
/// `@word` with the first alternative.
pub fn begin(editor: &mut EditorBuffer, mut alternatives: Vec<String>) -> Option<Completion> {
    let prefix = mention_prefix(editor)?;
    alternatives.sort();
    alternatives.dedup();
    if alternatives.is_empty() {
        return None;
    }
    let completion = Completion {
        alternatives,
        selected: 0,
    };
    replace_mention(editor, prefix.chars().count() + 1, completion.selected());
    Some(completion)
}

/// Swaps the currently applied alternative for the next one.
pub fn cycle(editor: &mut EditorBuffer, completion: &mut Completion) {
    let previous_len = completion.selected().chars().count();
    completion.selected = (completion.selected + 1) % completion.alternatives.len();
    replace_mention(editor, previous_len, completion.selected());
}

fn replace_mention(editor: &mut EditorBuffer, current_len: usize, replacement: &str) {
    for _ in 0..current_len {
        editor.delete_prev_char();
    }
    editor.insert_str(replacement);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mention_prefix_requires_sigil() {
        assert_eq!(
            mention_prefix(&EditorBuffer::from_text("hi @jo")),
            Some("jo".to_string())
        );
        assert_eq!(mention_prefix(&EditorBuffer::from_text("hi jo")), None);
        assert_eq!(mention_prefix(&EditorBuffer::from_text("hi @")), None);
    }

    #[test]
    fn begin_and_cycle_replace_the_mention() {
        let mut editor = EditorBuffer::from_text("ping @jo");
        let mut completion = begin(
            &mut editor,
            vec!["@joseph".to_string(), "@joan".to_string()],
        )
        .expect("completion");
        assert_eq!(editor.text(), "ping @joan");

        cycle(&mut editor, &mut completion);
        assert_eq!(editor.text(), "ping @joseph");

        cycle(&mut editor, &mut completion);
        assert_eq!(editor.text(), "ping @joan");
    }

    #[test]
    fn begin_without_alternatives_leaves_buffer() {
        let mut editor = EditorBuffer::from_text("@zz");
        assert!(begin(&mut editor, Vec::new()).is_none());
        assert_eq!(editor.text(), "@zz");
    }
}
