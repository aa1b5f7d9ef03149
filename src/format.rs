//! Positional argument formatting applied after expansion.
//!
//! Patterns use `{0}`, `{1}`, ... markers. A single quote starts and ends a
//! literal section, so `'{0}'` is printed as `{0}`; two single quotes in a
//! row print one quote. A marker is a bare index: `{ 0 }` is rejected.

use crate::error::{ConfigError, ConfigResult};

/// Substitutes positional `{n}` markers in `pattern` with `args[n]`.
///
/// # Errors
/// * `ConfigError::Format` - a marker is unclosed, is not a plain index,
///   or refers past the end of `args`
///
/// # Example
/// ```
/// use propstack::format::format_message;
///
/// let text = format_message("The day is {0} and month is {1}.", &["Monday", "April"]).unwrap();
/// assert_eq!(text, "The day is Monday and month is April.");
///
/// let quoted = format_message("It''s '{literal}' {0}", &["ok"]).unwrap();
/// assert_eq!(quoted, "It's {literal} ok");
/// ```
pub fn format_message<S: AsRef<str>>(pattern: &str, args: &[S]) -> ConfigResult<String> {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.char_indices().peekable();
    let mut in_quote = false;

    while let Some((offset, c)) = chars.next() {
        match c {
            '\'' => {
                if chars.peek().map(|&(_, next)| next) == Some('\'') {
                    chars.next();
                    out.push('\'');
                } else {
                    in_quote = !in_quote;
                }
            }
            _ if in_quote => out.push(c),
            '{' => {
                let mut marker = String::new();
                let mut closed = false;
                for (_, inner) in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    marker.push(inner);
                }
                if !closed {
                    return Err(ConfigError::format(format!(
                        "Unmatched braces in the pattern at offset {offset}"
                    )));
                }
                out.push_str(argument(&marker, args)?);
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn argument<'a, S: AsRef<str>>(marker: &str, args: &'a [S]) -> ConfigResult<&'a str> {
    if marker.contains(',') {
        return Err(ConfigError::format(format!(
            "Format types are not supported: {{{marker}}}"
        )));
    }

    let index: usize = marker
        .parse()
        .map_err(|_| ConfigError::format(format!("Can't parse argument number: {marker}")))?;

    args.get(index).map(|arg| arg.as_ref()).ok_or_else(|| {
        ConfigError::format(format!(
            "No argument for {{{index}}}: {} argument(s) given",
            args.len()
        ))
    })
}
