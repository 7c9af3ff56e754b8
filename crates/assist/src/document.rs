//! Common utilities for searching through a template buffer around a cursor.
//!
//! All offsets are byte offsets; the scans operate on ASCII structure
//! characters, so multi-byte text passes through untouched.

/// Reads forward from `position` until a non-whitespace char is found and
/// returns it.
pub fn read_to_next_char(text: &str, position: usize) -> Option<char> {
    text.get(position..)?
        .chars()
        .find(|c| !c.is_whitespace())
}

/// Reads backwards, ending just before `position`, until a non-whitespace
/// char is found and returns it.
pub fn read_to_previous_char(text: &str, position: usize) -> Option<char> {
    text.get(..position)?
        .chars()
        .rev()
        .find(|c| !c.is_whitespace())
}

/// Searches backwards from `position` for the first occurrence of
/// `char_to_find` and returns its byte offset.
pub fn find_previous_char_position(text: &str, position: usize, char_to_find: char) -> Option<usize> {
    text.get(..position)?.rfind(char_to_find)
}

/// Reads backwards from `position` until the first unmatched open brace
/// (`[` or `{`). Closed braces push onto a stack so a nested pair is not
/// returned; the braces are assumed to be nested correctly. This locates the
/// map or array containing the position.
pub fn read_to_previous_unmatched_open_brace(text: &str, position: usize) -> Option<char> {
    let mut depth = 0usize;
    for c in text.get(..position)?.chars().rev() {
        if c.is_whitespace() {
            continue;
        }
        match c {
            '}' | ']' => depth += 1,
            '{' | '[' => {
                if depth == 0 {
                    return Some(c);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}

/// Reads the string being typed: backwards from `position` to the first
/// double quote. Returns `None` if a newline or the start of the buffer is
/// hit first.
pub fn read_to_previous_quote(text: &str, position: usize) -> Option<String> {
    let slice = text.get(..position)?;
    let mut typed = Vec::new();
    for c in slice.chars().rev() {
        match c {
            '"' => {
                typed.reverse();
                return Some(typed.into_iter().collect());
            }
            '\n' | '\r' => return None,
            other => typed.push(other),
        }
    }
    None
}
