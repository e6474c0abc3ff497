//! Tokenization statistics
//!
//! Running counters over a token list: totals, per-kind histograms, and
//! partial-parse progress when a malformed CSI stopped the tokenizer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::token::{Token, TokenKind};

/// Counters accumulated while tokenizing one input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenStats {
    pub total_tokens: usize,
    pub tokens_by_type: BTreeMap<String, usize>,
    /// SGR parameter string -> occurrences
    pub sgr_codes: BTreeMap<String, usize>,
    /// CSI notation -> occurrences
    pub csi_sequences: BTreeMap<String, usize>,
    pub c0_codes: BTreeMap<u8, usize>,
    pub c1_codes: BTreeMap<String, usize>,
    /// Total bytes of text content
    pub total_text_length: usize,
    pub file_size: u64,
    /// 100.0 unless parsing was interrupted
    pub parsed_percent: f64,
    /// Byte offset just past the first bad sequence, 0 if none
    pub pos_first_bad_sequence: u64,
}

impl TokenStats {
    pub fn new(file_size: u64) -> Self {
        Self {
            file_size,
            ..Self::default()
        }
    }

    /// Fill the histograms from a finished token list.
    pub fn finalize(&mut self, tokens: &[Token]) {
        self.total_tokens = tokens.len();

        for token in tokens {
            *self
                .tokens_by_type
                .entry(token.kind_name().to_string())
                .or_insert(0) += 1;

            match &token.kind {
                TokenKind::Text(value) => self.total_text_length += value.len(),
                TokenKind::Sgr { params } => {
                    for param in params {
                        *self.sgr_codes.entry(param.clone()).or_insert(0) += 1;
                    }
                }
                TokenKind::Csi { notation, .. } if !notation.is_empty() => {
                    *self.csi_sequences.entry(notation.clone()).or_insert(0) += 1;
                }
                TokenKind::C0(code) => {
                    *self.c0_codes.entry(*code).or_insert(0) += 1;
                }
                TokenKind::C1(name) => {
                    *self.c1_codes.entry(name.clone()).or_insert(0) += 1;
                }
                _ => {}
            }
        }
    }
}
