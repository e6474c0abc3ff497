//! Neotex
//!
//! An ANSI-art transformation pipeline. Raw ANSI byte streams (the
//! CP437-era escape-sequence screens of the art scene) are tokenized,
//! replayed through a virtual terminal, and re-emitted as flattened ANSI,
//! plain text, or the dual-column *neotex* format, which is readable in
//! any text editor and round-trips back to ANSI.
//!
//! # Architecture
//!
//! - `tokenizer`: byte stream → typed tokens (ANSI and neotex front ends)
//! - `core`: the SGR style model and the virtual terminal
//! - `export`: terminal buffer → ANSI / plain text / neotex / token table
//! - `encoding`: CP437, CP850, ISO-8859-1 and UTF-8 transcoding
//! - `app`: CLI configuration for the binary
//!
//! # Example
//!
//! ```
//! use neotex::core::VirtualTerminal;
//! use neotex::encoding::Encoding;
//! use neotex::export;
//! use neotex::tokenizer::AnsiTokenizer;
//!
//! let input = b"Hello \x1b[31mWorld\x1b[0m";
//! let (tokens, _stats) = AnsiTokenizer::new(input).tokenize();
//!
//! let mut term = VirtualTerminal::new(80, 25, Encoding::Utf8, false);
//! term.apply(&tokens);
//!
//! let flattened = export::ansi::render(&term);
//! assert!(flattened.contains("World"));
//! ```

pub mod app;
pub mod core;
pub mod encoding;
pub mod export;
pub mod tokenizer;

pub use crate::core::{Color, EmitMode, Sgr, VirtualTerminal, DEFAULT_SGR};
pub use crate::encoding::Encoding;
pub use crate::export::NeotexDocument;
pub use crate::tokenizer::{AnsiTokenizer, NeotexTokenizer, Token, TokenKind, TokenStats};
