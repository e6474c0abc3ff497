//! ANSI tokenizer
//!
//! Slices a UTF-8 byte stream into [`Token`]s following the ECMA-48 /
//! xterm control rules the ANSI-art corpus actually uses. The tokenizer
//! tracks both a byte cursor and a rune cursor so token positions are
//! character indexes into the input, and it keeps the exact source
//! substring of every token so the stream can be reconstructed.
//!
//! References:
//! - https://vt100.net/docs/vt510-rm/chapter4.html
//! - https://invisible-island.net/xterm/ctlseqs/ctlseqs.html
//! - ECMA-48, 5th edition (June 1991)

use super::stats::TokenStats;
use super::token::{Token, TokenKind};

const ESC: u8 = 0x1B;
const SUB: u8 = 0x1A;
const BEL: u8 = 0x07;
const ST_8BIT: u8 = 0x9C;

/// Pull-style tokenizer over one input slice.
///
/// Consumed by [`AnsiTokenizer::tokenize`]; build a new one to parse again.
pub struct AnsiTokenizer<'a> {
    input: &'a [u8],
    byte_pos: usize,
    rune_pos: usize,
    tokens: Vec<Token>,
    stats: TokenStats,
}

impl<'a> AnsiTokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            byte_pos: 0,
            rune_pos: 0,
            tokens: Vec::new(),
            stats: TokenStats::new(input.len() as u64),
        }
    }

    /// Run to completion and return the token list with its statistics.
    ///
    /// A CSI interrupted by a C0 byte stops parsing; the partial token
    /// list ends with the `CsiInterrupted` token and the stats record how
    /// far parsing got. Every other malformed sequence is tokenized
    /// best-effort.
    pub fn tokenize(mut self) -> (Vec<Token>, TokenStats) {
        while self.byte_pos < self.input.len() {
            self.next_token();
            if self.tokens.last().is_some_and(Token::is_interrupted) {
                break;
            }
        }

        if self.stats.pos_first_bad_sequence == 0 {
            self.stats.parsed_percent = 100.0;
        }
        self.stats.finalize(&self.tokens);

        (self.tokens, self.stats)
    }

    fn next_token(&mut self) {
        match self.input[self.byte_pos] {
            ESC => self.parse_escape(),
            SUB => self.parse_sauce(),
            c if c < 0x20 => self.parse_c0(c),
            _ => self.parse_text(),
        }
    }

    fn push(&mut self, pos: usize, raw: String, kind: TokenKind) {
        self.rune_pos += raw.chars().count();
        self.tokens.push(Token { pos, raw, kind });
    }

    fn raw_since(&self, start_byte: usize) -> String {
        String::from_utf8_lossy(&self.input[start_byte..self.byte_pos]).into_owned()
    }

    fn parse_c0(&mut self, code: u8) {
        let pos = self.rune_pos;
        self.byte_pos += 1;
        self.push(pos, (code as char).to_string(), TokenKind::C0(code));
    }

    /// Everything after the SUB marker is Sauce metadata; the marker byte
    /// itself is dropped from the stream.
    fn parse_sauce(&mut self) {
        self.byte_pos += 1;
        self.rune_pos += 1;
        let pos = self.rune_pos;
        let tail = String::from_utf8_lossy(&self.input[self.byte_pos..]).into_owned();
        self.byte_pos = self.input.len();
        self.push(pos, tail, TokenKind::Sauce);
    }

    fn parse_text(&mut self) {
        let start_byte = self.byte_pos;
        let pos = self.rune_pos;
        let mut runes = 0usize;

        while self.byte_pos < self.input.len() {
            let b = self.input[self.byte_pos];
            if b < 0x20 {
                break;
            }
            self.byte_pos += (utf8_len(b)).min(self.input.len() - self.byte_pos);
            runes += 1;
        }

        let text = String::from_utf8_lossy(&self.input[start_byte..self.byte_pos]).into_owned();
        self.rune_pos = pos + runes;
        self.tokens.push(Token {
            pos,
            raw: text.clone(),
            kind: TokenKind::Text(text),
        });
    }

    fn parse_escape(&mut self) {
        let start_byte = self.byte_pos;
        let pos = self.rune_pos;
        self.byte_pos += 1;

        if self.byte_pos >= self.input.len() {
            // Trailing bare ESC
            self.push(pos, self.raw_since(start_byte), TokenKind::Escape);
            return;
        }

        match self.input[self.byte_pos] {
            b'[' => {
                self.byte_pos += 1;
                self.parse_csi(start_byte, pos);
            }
            b'P' => {
                self.byte_pos += 1;
                self.parse_dcs(start_byte, pos);
            }
            b']' => {
                self.byte_pos += 1;
                self.parse_osc(start_byte, pos);
            }
            b'\\' => {
                self.byte_pos += 1;
                self.push(pos, self.raw_since(start_byte), TokenKind::C1("ST".into()));
            }
            c @ (b'D' | b'E' | b'H' | b'M') => {
                self.byte_pos += 1;
                let name = match c {
                    b'D' => "IND",
                    b'E' => "NEL",
                    b'H' => "HTS",
                    _ => "RI",
                };
                self.push(pos, self.raw_since(start_byte), TokenKind::C1(name.into()));
            }
            _ => self.parse_other_escape(start_byte, pos),
        }
    }

    /// ESC c, ESC 7, ESC =, ESC (B, ESC #8 and friends. Character-set
    /// designators take one extra byte.
    fn parse_other_escape(&mut self, start_byte: usize, pos: usize) {
        let next = self.input[self.byte_pos];
        self.byte_pos += 1;

        if matches!(next, b'(' | b')' | b'#') && self.byte_pos < self.input.len() {
            self.byte_pos += 1;
        }

        self.push(pos, self.raw_since(start_byte), TokenKind::Escape);
    }

    /// Collect CSI parameter bytes. Digits build the current parameter,
    /// every `;`/`:` closes it (empty slots included), intermediate marker
    /// bytes are discarded. The first byte outside the set is the final.
    fn collect_params(&mut self) -> Vec<String> {
        let mut params = Vec::new();
        let mut current = String::new();

        while self.byte_pos < self.input.len() {
            match self.input[self.byte_pos] {
                b @ b'0'..=b'9' => {
                    current.push(b as char);
                    self.byte_pos += 1;
                }
                b';' | b':' => {
                    params.push(std::mem::take(&mut current));
                    self.byte_pos += 1;
                }
                b'?' | b'>' | b'!' | b'$' | b'\'' | b'"' | b' ' => {
                    // Private-mode and intermediate markers carry no
                    // meaning for this corpus; dropped.
                    self.byte_pos += 1;
                }
                _ => break,
            }
        }

        // Each separator delimits two slots, so a trailing empty slot is
        // real whenever any separator was seen.
        if !current.is_empty() || !params.is_empty() {
            params.push(current);
        }

        params
    }

    fn parse_csi(&mut self, start_byte: usize, pos: usize) {
        let params = self.collect_params();

        if self.byte_pos >= self.input.len() {
            // Ran off the end collecting parameters
            self.push(
                pos,
                self.raw_since(start_byte),
                TokenKind::Csi {
                    params,
                    final_byte: 0,
                    notation: String::new(),
                    meaning: String::new(),
                },
            );
            return;
        }

        let final_byte = self.input[self.byte_pos];
        self.byte_pos += 1;

        if final_byte < 0x20 {
            self.stats.pos_first_bad_sequence = self.byte_pos as u64;
            self.stats.parsed_percent =
                self.byte_pos as f64 / self.stats.file_size as f64 * 100.0;
            self.push(
                pos,
                self.raw_since(start_byte),
                TokenKind::CsiInterrupted {
                    notation: format!("CSI interrupted by C0 control (0x{final_byte:02X})"),
                },
            );
            return;
        }

        let kind = match final_byte {
            b'A' | b'B' | b'C' | b'D' => {
                let n = number_param(params.first(), 1);
                let direction = match final_byte {
                    b'A' => "Up",
                    b'B' => "Down",
                    b'C' => "Right",
                    _ => "Left",
                };
                TokenKind::Csi {
                    params,
                    final_byte,
                    notation: format!("CSI Ps {}", final_byte as char),
                    meaning: format!("Cursor {direction} {n} times"),
                }
            }
            b'H' | b'f' => {
                let (row, col) = cursor_position_params(&params);
                TokenKind::Csi {
                    params,
                    final_byte,
                    notation: format!("CSI Ps {}", final_byte as char),
                    meaning: format!("Cursor Position {row}, {col}"),
                }
            }
            b'J' => {
                let meaning = match number_param(params.first(), 0) {
                    0 => "EraseBelow".to_string(),
                    1 => "EraseAbove".to_string(),
                    2 => "EraseAll".to_string(),
                    n => format!("Unknown: {n}"),
                };
                TokenKind::Csi {
                    params,
                    final_byte,
                    notation: "CSI Ps J".into(),
                    meaning,
                }
            }
            b'K' => {
                let meaning = match number_param(params.first(), 0) {
                    0 => "EraseLineRight".to_string(),
                    1 => "EraseLineLeft".to_string(),
                    2 => "EraseLineAll".to_string(),
                    n => format!("Unknown: {n}"),
                };
                TokenKind::Csi {
                    params,
                    final_byte,
                    notation: "CSI Ps K".into(),
                    meaning,
                }
            }
            b's' => TokenKind::Csi {
                params,
                final_byte,
                notation: "CSI s".into(),
                meaning: "Save Cursor Position".into(),
            },
            b'u' => TokenKind::Csi {
                params,
                final_byte,
                notation: "CSI u".into(),
                meaning: "Restore Cursor Position".into(),
            },
            b'm' => TokenKind::Sgr { params },
            _ => TokenKind::Unknown,
        };

        self.push(pos, self.raw_since(start_byte), kind);
    }

    /// Accumulate a DCS payload until ESC-backslash or 8-bit ST.
    fn parse_dcs(&mut self, start_byte: usize, pos: usize) {
        let data_start = self.byte_pos;
        let mut data_end = self.byte_pos;

        while self.byte_pos < self.input.len() {
            if self.input[self.byte_pos] == ESC
                && self.input.get(self.byte_pos + 1) == Some(&b'\\')
            {
                self.byte_pos += 2;
                break;
            }
            if self.input[self.byte_pos] == ST_8BIT {
                self.byte_pos += 1;
                break;
            }
            self.byte_pos += 1;
            data_end = self.byte_pos;
        }

        let value = String::from_utf8_lossy(&self.input[data_start..data_end]).into_owned();
        self.push(pos, self.raw_since(start_byte), TokenKind::Dcs { value });
    }

    /// Accumulate an OSC payload until BEL, ESC-backslash or 8-bit ST,
    /// then split once on `;` into (Ps, Pt).
    fn parse_osc(&mut self, start_byte: usize, pos: usize) {
        let data_start = self.byte_pos;
        let mut data_end = self.byte_pos;

        while self.byte_pos < self.input.len() {
            let b = self.input[self.byte_pos];
            if b == BEL {
                self.byte_pos += 1;
                break;
            }
            if b == ESC && self.input.get(self.byte_pos + 1) == Some(&b'\\') {
                self.byte_pos += 2;
                break;
            }
            if b == ST_8BIT {
                self.byte_pos += 1;
                break;
            }
            self.byte_pos += 1;
            data_end = self.byte_pos;
        }

        let data = String::from_utf8_lossy(&self.input[data_start..data_end]).into_owned();
        let params = match data.split_once(';') {
            Some((ps, pt)) => vec![ps.to_string(), pt.to_string()],
            None if data.is_empty() => Vec::new(),
            None => vec![data],
        };

        self.push(pos, self.raw_since(start_byte), TokenKind::Osc { params });
    }
}

/// Byte length of a UTF-8 scalar from its lead byte. Stray continuation
/// bytes advance one byte and surface as replacement characters.
fn utf8_len(lead: u8) -> usize {
    match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

fn number_param(param: Option<&String>, default: i64) -> i64 {
    match param {
        Some(p) if !p.is_empty() => p.parse().unwrap_or(default),
        _ => default,
    }
}

/// Row/col for CUP: each defaults to 1 when empty or missing; a single
/// parameter is the row.
fn cursor_position_params(params: &[String]) -> (i64, i64) {
    let row = number_param(params.first(), 1);
    let col = number_param(params.get(1), 1);
    (row, col)
}
