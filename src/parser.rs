//! Parsers for flat key/value source text.
//!
//! Two formats are supported:
//!
//! - **Properties** - the standard `key=value` text format with `#`/`!`
//!   comments, backslash line continuations and `\uXXXX` escapes
//! - **INI** - `[section]` headers with `key = value` lines; keys inside a
//!   section are flattened to `section.key`
//!
//! Values are kept as raw text. Placeholders such as `%name%` are not
//! interpreted here; that happens at lookup time.
//!
//! ```rust
//! use propstack::parser::{PropertiesParser, SourceParser};
//!
//! let parsed = PropertiesParser.parse("p1=blee\np2=p1 value is %p1%.").unwrap();
//! assert_eq!(parsed["p2"], "p1 value is %p1%.");
//! ```

use crate::error::{ConfigError, ConfigResult, ConfigResultExt};
use std::collections::HashMap;

/// Trait for parsing source text into a flat name to raw value map.
///
/// Parse failures are reported as `ConfigError::ResourceRead` with the
/// parser's name as the source; callers that know the actual resource
/// replace it with their own name.
pub trait SourceParser: Send + Sync {
    /// Parses source text into a name to raw value map.
    fn parse(&self, content: &str) -> ConfigResult<HashMap<String, String>>;

    /// Returns the file extensions handled by this parser, without the dot.
    fn supported_extensions(&self) -> &[&str];

    /// Returns a human-readable name for this parser.
    fn name(&self) -> &str;
}

/// Picks a parser for a file extension.
///
/// `ini` selects the [`IniParser`]; every other extension, including none at
/// all, is read as a properties file.
///
/// ```rust
/// use propstack::parser::detect_parser_by_extension;
///
/// assert_eq!(detect_parser_by_extension(Some("ini")).name(), "INI");
/// assert_eq!(detect_parser_by_extension(Some("properties")).name(), "Properties");
/// assert_eq!(detect_parser_by_extension(None).name(), "Properties");
/// ```
pub fn detect_parser_by_extension(extension: Option<&str>) -> Box<dyn SourceParser> {
    match extension.map(|ext| ext.to_lowercase()).as_deref() {
        Some("ini") => Box::new(IniParser),
        _ => Box::new(PropertiesParser),
    }
}

/// Parser for the properties text format.
pub struct PropertiesParser;

impl SourceParser for PropertiesParser {
    fn parse(&self, content: &str) -> ConfigResult<HashMap<String, String>> {
        parse_properties_content(content)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["properties"]
    }

    fn name(&self) -> &str {
        "Properties"
    }
}

/// Parser for flat INI files.
///
/// Inline comments are not stripped: `key = a ; b` has the value `a ; b`.
pub struct IniParser;

impl SourceParser for IniParser {
    fn parse(&self, content: &str) -> ConfigResult<HashMap<String, String>> {
        parse_ini_content(content)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["ini"]
    }

    fn name(&self) -> &str {
        "INI"
    }
}

fn is_properties_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

fn parse_properties_content(content: &str) -> ConfigResult<HashMap<String, String>> {
    let mut result = HashMap::new();

    for (line_number, line) in logical_lines(content) {
        let (key, value) = split_entry(&line);
        let key = unescape(key)
            .map_err(|message| ConfigError::resource_read("Properties", message))
            .with_context(|| format!("line {line_number}"))?;
        let value = unescape(value)
            .map_err(|message| ConfigError::resource_read("Properties", message))
            .with_context(|| format!("line {line_number}"))?;
        result.insert(key, value);
    }

    Ok(result)
}

/// Joins continued natural lines and drops blank and comment lines.
/// Each logical line is paired with the number of its first natural line.
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let normalized = content.replace("\r\n", "\n");
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (index, natural) in normalized.split(|c: char| c == '\n' || c == '\r').enumerate() {
        let trimmed = natural.trim_start_matches(is_properties_whitespace);

        let (start, mut text) = match pending.take() {
            Some(continued) => continued,
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                (index + 1, String::new())
            }
        };

        if ends_with_continuation(trimmed) {
            text.push_str(&trimmed[..trimmed.len() - 1]);
            pending = Some((start, text));
        } else {
            text.push_str(trimmed);
            lines.push((start, text));
        }
    }

    // A continuation on the last line just ends the entry
    if let Some(last) = pending {
        lines.push(last);
    }

    lines
}

fn ends_with_continuation(line: &str) -> bool {
    let backslashes = line.chars().rev().take_while(|&c| c == '\\').count();
    backslashes % 2 == 1
}

/// Splits a logical line into its still-escaped key and value.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    let mut has_separator = false;

    for (index, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = index;
                has_separator = true;
                break;
            }
            c if is_properties_whitespace(c) => {
                key_end = index;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = &line[key_end..];

    if has_separator {
        rest = &rest[1..];
    } else {
        rest = rest.trim_start_matches(is_properties_whitespace);
        if let Some(stripped) = rest.strip_prefix(|c: char| c == '=' || c == ':') {
            rest = stripped;
        }
    }

    (key, rest.trim_start_matches(is_properties_whitespace))
}

fn unescape(text: &str) -> Result<String, String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => out.push(read_unicode_escape(&mut chars)?),
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

/// Reads the code unit after `\u`, combining a surrogate pair when the
/// first unit is a high surrogate.
fn read_unicode_escape(chars: &mut std::str::Chars<'_>) -> Result<char, String> {
    let first = read_hex4(chars)?;

    if (0xD800..=0xDBFF).contains(&first) {
        let (backslash, marker) = (chars.next(), chars.next());
        if backslash != Some('\\') || marker != Some('u') {
            return Err("Unpaired surrogate in \\uxxxx encoding".to_string());
        }
        let second = read_hex4(chars)?;
        if !(0xDC00..=0xDFFF).contains(&second) {
            return Err("Unpaired surrogate in \\uxxxx encoding".to_string());
        }
        let combined = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
        return char::from_u32(combined)
            .ok_or_else(|| "Malformed \\uxxxx encoding".to_string());
    }

    char::from_u32(first).ok_or_else(|| "Malformed \\uxxxx encoding".to_string())
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> Result<u32, String> {
    let digits: String = chars.by_ref().take(4).collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("Malformed \\uxxxx encoding".to_string());
    }
    u32::from_str_radix(&digits, 16).map_err(|e| e.to_string())
}

fn parse_ini_content(content: &str) -> ConfigResult<HashMap<String, String>> {
    let mut result = HashMap::new();
    let mut current_section: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            let section_name = line[1..line.len() - 1].trim().to_string();
            if section_name.is_empty() {
                return Err(ConfigError::resource_read("INI", "Empty section name"));
            }
            current_section = Some(section_name);
            continue;
        }

        let Some(eq_pos) = line.find('=') else {
            return Err(ConfigError::resource_read(
                "INI",
                format!("Invalid line format: {line}"),
            ));
        };

        let key = line[..eq_pos].trim();
        let value = line[eq_pos + 1..].trim();

        if key.is_empty() {
            return Err(ConfigError::resource_read("INI", "Empty key name"));
        }

        let name = match &current_section {
            Some(section) => format!("{section}.{key}"),
            None => key.to_string(),
        };
        result.insert(name, value.to_string());
    }

    Ok(result)
}
