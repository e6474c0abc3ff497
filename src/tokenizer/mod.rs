//! Tokenizers
//!
//! Byte streams in, token lists out: the ANSI tokenizer for raw escape
//! streams and the neotex tokenizer for the dual-column format (which
//! lowers to ANSI and reuses the former). Both report [`TokenStats`].

pub mod ansi;
pub mod neotex;
pub mod stats;
pub mod token;

pub use ansi::AnsiTokenizer;
pub use neotex::{NeotexError, NeotexMetadata, NeotexTokenizer};
pub use stats::TokenStats;
pub use token::{Token, TokenKind};
