//! Normalization for text that enters the editor in bulk (pastes).

/// Width a pasted tab expands to.
pub const TAB_WIDTH: usize = 4;

/// Makes pasted text safe to insert into the editor.
///
/// - `\r\n` and lone `\r` become `\n`
/// - tabs expand to [`TAB_WIDTH`] spaces
/// - every other control character is dropped
pub fn sanitize_text_input(text: &str) -> String {
    let mut sanitized = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                sanitized.push('\n');
            }
            '\t' => sanitized.extend(std::iter::repeat_n(' ', TAB_WIDTH)),
            '\n' => sanitized.push('\n'),
            _ if !c.is_control() => sanitized.push(c),
            _ => {}
        }
    }

    sanitized
}
