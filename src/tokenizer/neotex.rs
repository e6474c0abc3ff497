//! Neotex tokenizer
//!
//! Reads the dual-column neotex format back into the token stream. The
//! text and sequence columns are split on the `" | "` separator at the
//! declared rune width, the mnemonics are replayed into SGR states, and
//! the whole document is lowered to a synthesized ANSI byte stream which
//! the ANSI tokenizer then parses. That keeps a single source of truth
//! for token semantics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ansi::AnsiTokenizer;
use super::stats::TokenStats;
use super::token::Token;
use crate::core::style::{Color, EmitMode, Sgr};

const SEPARATOR: &str = " | ";

/// Malformed neotex input
#[derive(Debug, Error)]
pub enum NeotexError {
    #[error("line {line}: separator \" | \" not found at column {column}, found {found:?}")]
    MissingSeparator {
        line: usize,
        column: usize,
        found: String,
    },
}

/// Header fields parsed from `!`-prefixed entries in the sequence column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeotexMetadata {
    /// `!V<n>`; 0 when absent (legacy files)
    pub version: u32,
    /// `!TW<trim>/<total>`, first half
    pub trimmed_width: usize,
    /// `!TW<trim>/<total>`, second half; authoritative for sizing
    pub width: usize,
    /// `!NL<n>`
    pub line_count: usize,
    /// Any other `!key:value` entries
    pub extra: BTreeMap<String, String>,
}

/// Tokenizer over one neotex document
pub struct NeotexTokenizer {
    text_lines: Vec<String>,
    seq_lines: Vec<String>,
    metadata: NeotexMetadata,
    width: usize,
}

impl NeotexTokenizer {
    /// Split the document at `width` runes per text column. The metadata
    /// width, when declared, overrides `width` for downstream sizing.
    pub fn new(data: &[u8], width: usize) -> Result<Self, NeotexError> {
        let (text_lines, seq_lines) = split_columns(width, data)?;
        let metadata = extract_metadata(&seq_lines);
        let effective = if metadata.width > 0 {
            metadata.width
        } else {
            width
        };

        Ok(Self {
            text_lines,
            seq_lines,
            metadata,
            width: effective,
        })
    }

    pub fn metadata(&self) -> &NeotexMetadata {
        &self.metadata
    }

    /// Width the virtual terminal should be constructed with
    pub fn width(&self) -> usize {
        self.width
    }

    /// Lower to ANSI and parse; tokens and stats come straight from the
    /// ANSI tokenizer.
    pub fn tokenize(&self) -> (Vec<Token>, TokenStats) {
        let ansi = self.lower_to_ansi();
        AnsiTokenizer::new(&ansi).tokenize()
    }

    /// Rebuild the ANSI byte stream this document describes. Style state
    /// carries across lines and transitions use differential legacy
    /// escapes. No newlines are injected: every text line is exactly one
    /// terminal row wide, so the receiving terminal wraps naturally.
    pub fn lower_to_ansi(&self) -> Vec<u8> {
        let mut out = String::new();
        let mut current = Sgr::new();

        for (i, text_line) in self.text_lines.iter().enumerate() {
            let seq_line = self.seq_lines.get(i).map(String::as_str).unwrap_or("");
            current = lower_line(&mut out, text_line, seq_line, current);
        }

        out.into_bytes()
    }
}

/// Split each document line into its text and sequence columns.
///
/// Lines shorter than `width + separator` end the document (a truncated
/// trailing line is tolerated); a full-length line without the separator
/// at the expected rune column is a hard error.
fn split_columns(width: usize, data: &[u8]) -> Result<(Vec<String>, Vec<String>), NeotexError> {
    let text = String::from_utf8_lossy(data);
    let mut text_lines = Vec::new();
    let mut seq_lines = Vec::new();

    for (n, line) in text.split('\n').enumerate() {
        let runes: Vec<char> = line.chars().collect();
        if runes.len() < width + SEPARATOR.len() {
            break;
        }

        let found: String = runes[width..width + SEPARATOR.len()].iter().collect();
        if found != SEPARATOR {
            return Err(NeotexError::MissingSeparator {
                line: n,
                column: width,
                found,
            });
        }

        text_lines.push(runes[..width].iter().collect());
        seq_lines.push(runes[width + SEPARATOR.len()..].iter().collect());
    }

    Ok((text_lines, seq_lines))
}

/// Pull `!`-prefixed metadata entries out of the sequence lines.
fn extract_metadata(seq_lines: &[String]) -> NeotexMetadata {
    let mut meta = NeotexMetadata::default();

    for seq_line in seq_lines {
        for entry in seq_line.split(';') {
            let entry = entry.trim();
            let Some(body) = entry.strip_prefix('!') else {
                continue;
            };

            if let Some(version) = body.strip_prefix('V') {
                if let Ok(v) = version.parse() {
                    meta.version = v;
                }
            } else if let Some(tw) = body.strip_prefix("TW") {
                if let Some((trimmed, total)) = tw.split_once('/') {
                    if let Ok(v) = trimmed.parse() {
                        meta.trimmed_width = v;
                    }
                    if let Ok(v) = total.parse() {
                        meta.width = v;
                    }
                }
            } else if let Some(nl) = body.strip_prefix("NL") {
                if let Ok(v) = nl.parse() {
                    meta.line_count = v;
                }
            } else if let Some((key, value)) = body.split_once(':') {
                meta.extra.insert(key.to_string(), value.to_string());
            }
        }
    }

    meta
}

/// Apply one mnemonic to an SGR state. Unknown codes are ignored.
///
/// Disambiguation order: 7 characters try the RGB hex form first, 2-4
/// characters try the decimal indexed form, everything else is a table
/// code.
pub fn apply_code(code: &str, sgr: &mut Sgr) {
    if code.len() == 7 {
        if let Some(color) = parse_rgb(code) {
            match code.as_bytes()[0] {
                b'F' => sgr.fg = color,
                b'B' => sgr.bg = color,
                _ => {}
            }
            return;
        }
    }

    if (2..=4).contains(&code.len()) && matches!(code.as_bytes()[0], b'F' | b'B') {
        if let Ok(index) = code[1..].parse::<u16>() {
            if index <= 255 {
                let color = Color::Indexed(index as u8);
                if code.as_bytes()[0] == b'F' {
                    sgr.fg = color;
                } else {
                    sgr.bg = color;
                }
                return;
            }
        }
    }

    match code {
        "R0" => sgr.reset(),
        "FD" => sgr.fg = Color::Default,
        "BD" => sgr.bg = Color::Default,
        "EM" => sgr.dim = true,
        "Em" => sgr.dim = false,
        "EI" => sgr.italic = true,
        "Ei" => sgr.italic = false,
        "EU" => sgr.underline = true,
        "Eu" => sgr.underline = false,
        "EB" => sgr.blink = true,
        "Eb" => sgr.blink = false,
        "ER" => sgr.reverse = true,
        "Er" => sgr.reverse = false,
        _ => {
            if let Some(index) = standard_color_index(code) {
                match code.as_bytes()[0] {
                    b'F' => sgr.fg = Color::Standard(index),
                    b'B' => sgr.bg = Color::Standard(index),
                    _ => {}
                }
            }
        }
    }
}

/// `Fk`..`Fw`/`FK`..`FW` and the background equivalents. Bright
/// backgrounds are accepted here for older files even though the emitter
/// never writes them.
fn standard_color_index(code: &str) -> Option<u8> {
    let mut chars = code.chars();
    let kind = chars.next()?;
    let letter = chars.next()?;
    if chars.next().is_some() || !matches!(kind, 'F' | 'B') {
        return None;
    }

    let base = "krgybmcw".find(letter.to_ascii_lowercase())? as u8;
    Some(if letter.is_ascii_uppercase() {
        base + 8
    } else {
        base
    })
}

fn parse_rgb(code: &str) -> Option<Color> {
    if !matches!(code.as_bytes()[0], b'F' | b'B') {
        return None;
    }
    let value = u32::from_str_radix(&code[1..], 16).ok()?;
    Some(Color::Rgb(
        (value >> 16) as u8,
        (value >> 8) as u8,
        value as u8,
    ))
}

/// One position group: 0-indexed column and its mnemonic list
struct Group {
    position: usize,
    codes: Vec<String>,
}

/// Parse the sequence column of one line, skipping metadata entries.
/// Wire positions are 1-indexed.
fn parse_groups(seq_line: &str) -> Vec<Group> {
    let mut groups = Vec::new();

    for entry in seq_line.split(';') {
        let entry = entry.trim();
        if entry.is_empty() || entry.starts_with('!') {
            continue;
        }

        let Some((position, codes)) = entry.split_once(':') else {
            continue;
        };
        let Ok(position) = position.trim().parse::<usize>() else {
            continue;
        };
        if position == 0 {
            continue;
        }

        let codes: Vec<String> = codes
            .split(',')
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .collect();

        if !codes.is_empty() {
            groups.push(Group {
                position: position - 1,
                codes,
            });
        }
    }

    groups
}

/// Lower one text+sequence pair, returning the style state after it.
fn lower_line(out: &mut String, text_line: &str, seq_line: &str, mut current: Sgr) -> Sgr {
    let groups = parse_groups(seq_line);
    if groups.is_empty() {
        out.push_str(text_line);
        return current;
    }

    let runes: Vec<char> = text_line.chars().collect();
    let mut text_pos = 0;

    for group in groups {
        let position = group.position.min(runes.len());
        if position > text_pos {
            out.extend(&runes[text_pos..position]);
        }

        let mut next = current;
        for code in &group.codes {
            apply_code(code, &mut next);
        }
        out.push_str(&next.diff_escape(Some(&current), EmitMode::Legacy));
        current = next;
        text_pos = position.max(text_pos);
    }

    if text_pos < runes.len() {
        out.extend(&runes[text_pos..]);
    }

    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::style::DEFAULT_SGR;
    use crate::tokenizer::token::TokenKind;

    #[test]
    fn test_split_columns() {
        let (text, seq) = split_columns(5, b"Hello | 1:Fr\nWorld | 1:Fg").unwrap();
        assert_eq!(text, vec!["Hello", "World"]);
        assert_eq!(seq, vec!["1:Fr", "1:Fg"]);
    }

    #[test]
    fn test_split_columns_unicode_width() {
        let (text, seq) = split_columns(9, "Héllo àüé | 1:Fr".as_bytes()).unwrap();
        assert_eq!(text, vec!["Héllo àüé"]);
        assert_eq!(seq, vec!["1:Fr"]);
    }

    #[test]
    fn test_split_columns_truncated_trailing_line_ignored() {
        let (text, _) = split_columns(5, b"Hello | 1:Fr\nWo").unwrap();
        assert_eq!(text, vec!["Hello"]);
    }

    #[test]
    fn test_split_columns_bad_separator() {
        let err = split_columns(5, b"HelloXXX1:Fr").unwrap_err();
        match err {
            NeotexError::MissingSeparator {
                line,
                column,
                found,
            } => {
                assert_eq!(line, 0);
                assert_eq!(column, 5);
                assert_eq!(found, "XXX");
            }
        }
    }

    #[test]
    fn test_extract_metadata() {
        let lines = vec!["!V1; !TW73/80; !NL42; !origin:mistigris".to_string()];
        let meta = extract_metadata(&lines);
        assert_eq!(meta.version, 1);
        assert_eq!(meta.trimmed_width, 73);
        assert_eq!(meta.width, 80);
        assert_eq!(meta.line_count, 42);
        assert_eq!(meta.extra["origin"], "mistigris");
    }

    #[test]
    fn test_metadata_mixed_with_groups() {
        let lines = vec!["1:Fr; !V1".to_string(), "2:Fg".to_string()];
        let meta = extract_metadata(&lines);
        assert_eq!(meta.version, 1);
        assert_eq!(meta.width, 0);
    }

    #[test]
    fn test_apply_code_colors() {
        let mut sgr = Sgr::new();
        apply_code("Fr", &mut sgr);
        assert_eq!(sgr.fg, Color::Standard(1));
        apply_code("FR", &mut sgr);
        assert_eq!(sgr.fg, Color::Standard(9));
        apply_code("Bk", &mut sgr);
        assert_eq!(sgr.bg, Color::Standard(0));
        apply_code("BR", &mut sgr);
        assert_eq!(sgr.bg, Color::Standard(9));
        apply_code("FD", &mut sgr);
        assert_eq!(sgr.fg, Color::Default);
        apply_code("BD", &mut sgr);
        assert_eq!(sgr.bg, Color::Default);
    }

    #[test]
    fn test_apply_code_rgb_and_indexed() {
        let mut sgr = Sgr::new();
        apply_code("FFF0080", &mut sgr);
        assert_eq!(sgr.fg, Color::Rgb(255, 0, 128));
        apply_code("B00FF00", &mut sgr);
        assert_eq!(sgr.bg, Color::Rgb(0, 255, 0));
        apply_code("F123", &mut sgr);
        assert_eq!(sgr.fg, Color::Indexed(123));
        apply_code("B200", &mut sgr);
        assert_eq!(sgr.bg, Color::Indexed(200));
    }

    #[test]
    fn test_apply_code_effects_and_reset() {
        let mut sgr = Sgr::new();
        apply_code("EU", &mut sgr);
        apply_code("EM", &mut sgr);
        assert!(sgr.underline && sgr.dim);
        apply_code("Eu", &mut sgr);
        assert!(!sgr.underline);
        apply_code("Fr", &mut sgr);
        apply_code("R0", &mut sgr);
        assert_eq!(sgr, DEFAULT_SGR);
    }

    #[test]
    fn test_apply_code_unknown_ignored() {
        let mut sgr = Sgr::new();
        apply_code("Zz", &mut sgr);
        apply_code("F", &mut sgr);
        apply_code("", &mut sgr);
        assert_eq!(sgr, DEFAULT_SGR);
    }

    #[test]
    fn test_parse_groups() {
        let groups = parse_groups("!V1; 1:Fr, EU; 5:Fg");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].position, 0);
        assert_eq!(groups[0].codes, vec!["Fr", "EU"]);
        assert_eq!(groups[1].position, 4);
        assert_eq!(groups[1].codes, vec!["Fg"]);
    }

    #[test]
    fn test_lower_line_inserts_escapes() {
        let mut out = String::new();
        lower_line(&mut out, "RedGreen", "1:Fr; 4:Fg", Sgr::new());
        assert_eq!(out, "\x1b[31mRed\x1b[32mGreen");
    }

    #[test]
    fn test_lower_carries_state_across_lines() {
        let data = b"Hello | 1:Fr\nWorld | ";
        let tokenizer = NeotexTokenizer::new(data, 5).unwrap();
        let ansi = tokenizer.lower_to_ansi();
        // No second escape: the red state persists into the second row.
        assert_eq!(ansi, b"\x1b[31mHelloWorld");
    }

    #[test]
    fn test_tokenize_produces_sgr_and_text() {
        let tokenizer = NeotexTokenizer::new(b"RedGreen | 1:Fr; 4:Fg", 8).unwrap();
        let (tokens, stats) = tokenizer.tokenize();

        let kinds: Vec<&str> = tokens.iter().map(Token::kind_name).collect();
        assert_eq!(kinds, vec!["SGR", "Text", "SGR", "Text"]);
        match &tokens[1].kind {
            TokenKind::Text(value) => assert_eq!(value, "Red"),
            other => panic!("expected text, got {other:?}"),
        }
        assert_eq!(stats.parsed_percent, 100.0);
    }

    #[test]
    fn test_metadata_width_overrides_caller() {
        let data = b"ABCD | !V1; !TW2/4; !NL1; 1:Fr, Bk";
        let tokenizer = NeotexTokenizer::new(data, 4).unwrap();
        assert_eq!(tokenizer.width(), 4);
        assert_eq!(tokenizer.metadata().trimmed_width, 2);

        let data = b"ABCD | !V1; !TW4/80; !NL1";
        let tokenizer = NeotexTokenizer::new(data, 4).unwrap();
        assert_eq!(tokenizer.width(), 80);
    }
}
