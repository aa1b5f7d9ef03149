//! Escape-aware scanning for substitution delimiters.

/// The character that hides a delimiter from the scanner.
pub const ESCAPE_CHAR: char = '\\';

/// Returns the byte offsets of every unescaped `delimiter` in `text`, in
/// ascending order.
///
/// An occurrence is skipped when the character immediately before it is
/// [`ESCAPE_CHAR`]. Occurrences are not paired or nested here; callers take
/// the offsets two at a time.
///
/// # Example
/// ```
/// use propstack::scanner::indices;
///
/// assert_eq!(indices("a %b% c", '%'), vec![2, 4]);
/// assert_eq!(indices(r"100\% %x%", '%'), vec![6, 8]);
/// ```
pub fn indices(text: &str, delimiter: char) -> Vec<usize> {
    let mut previous = None;
    let mut found = Vec::new();

    for (index, ch) in text.char_indices() {
        if ch == delimiter && previous != Some(ESCAPE_CHAR) {
            found.push(index);
        }
        previous = Some(ch);
    }

    found
}
