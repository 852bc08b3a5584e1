//! Shell-style word splitting and quoting.
//!
//! Uses Normal/Single/Double modes to follow POSIX quoting rules. Unlike a
//! shell, `#` starts no comment: dotfiles are full of them and they must
//! survive a render.

use crate::error::{Error, Result};

#[derive(Copy, Clone, Eq, PartialEq)]
enum QuoteMode {
    Normal,
    Single,
    Double,
}

fn is_separator(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

fn is_safe(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || "_@%+=:,./-".contains(ch)
}

/// Splits `text` into words.
///
/// # Errors
/// * `Error::MalformedLine` on an unterminated quote or a trailing backslash
pub fn split(text: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut buf = String::new();
    let mut in_word = false;
    let mut mode = QuoteMode::Normal;
    let mut chars = text.chars();

    let malformed = || Error::MalformedLine { line: text.to_string() };

    while let Some(ch) = chars.next() {
        match mode {
            QuoteMode::Normal => match ch {
                c if is_separator(c) => {
                    if in_word {
                        words.push(std::mem::take(&mut buf));
                        in_word = false;
                    }
                }
                '\\' => {
                    let escaped = chars.next().ok_or_else(malformed)?;
                    buf.push(escaped);
                    in_word = true;
                }
                '\'' => {
                    in_word = true;
                    mode = QuoteMode::Single;
                }
                '"' => {
                    in_word = true;
                    mode = QuoteMode::Double;
                }
                c => {
                    buf.push(c);
                    in_word = true;
                }
            },
            QuoteMode::Single => match ch {
                '\'' => mode = QuoteMode::Normal,
                c => buf.push(c),
            },
            QuoteMode::Double => match ch {
                '"' => mode = QuoteMode::Normal,
                '\\' => {
                    let next = chars.next().ok_or_else(malformed)?;
                    // Only `"` and `\` are escapable inside double quotes.
                    if next != '"' && next != '\\' {
                        buf.push('\\');
                    }
                    buf.push(next);
                }
                c => buf.push(c),
            },
        }
    }

    if mode != QuoteMode::Normal {
        return Err(malformed());
    }
    if in_word {
        words.push(buf);
    }
    Ok(words)
}

/// Quotes `word` so that [`split`] yields it back as a single word.
pub fn quote(word: &str) -> String {
    if word.is_empty() {
        return "''".to_string();
    }
    if word.chars().all(is_safe) {
        return word.to_string();
    }
    format!("'{}'", word.replace('\'', r#"'"'"'"#))
}

/// Returns true if `word` contains any whitespace character.
pub fn has_whitespace(word: &str) -> bool {
    word.chars().any(char::is_whitespace)
}
