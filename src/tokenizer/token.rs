//! Token model
//!
//! Tokens produced by the tokenizers. Identity fields shared by every kind
//! (`pos`, the rune index into the original input, and `raw`, the exact
//! source substring) live on the envelope; everything kind-specific lives
//! in the [`TokenKind`] variant so consumers can match exhaustively.

use serde::{Deserialize, Serialize};

/// One parsed token with its source identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Rune index into the original input (not a byte offset)
    pub pos: usize,
    /// Exact source substring this token was parsed from. For `Sauce` the
    /// marker byte itself is not included, only the tail it introduces.
    pub raw: String,
    pub kind: TokenKind,
}

/// What a token means
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    /// A run of printable characters
    Text(String),

    /// A single C0 control byte (0x00-0x1F, except ESC and SUB)
    C0(u8),

    /// A 7-bit C1 alias (ESC + one byte): IND, NEL, HTS, RI, ST
    C1(String),

    /// Control Sequence Introducer with a recognized final byte
    Csi {
        /// Parameters as source strings, empty slots preserved
        /// (`;12H` parses as `["", "12"]`)
        params: Vec<String>,
        /// Final byte deciding the command
        final_byte: u8,
        /// xterm-style notation, e.g. `CSI Ps A`
        notation: String,
        /// Human-readable effect, e.g. `Cursor Up 5 times`
        meaning: String,
    },

    /// Select Graphic Rendition (`m` final); params kept verbatim
    Sgr { params: Vec<String> },

    /// A CSI cut short by a C0 byte before its final; parsing halts here
    CsiInterrupted { notation: String },

    /// Device Control String payload (terminator stripped)
    Dcs { value: String },

    /// Operating System Command, split once on `;` into (Ps, Pt)
    Osc { params: Vec<String> },

    /// Any other escape sequence, carried only as raw bytes
    Escape,

    /// Sauce metadata block: everything after the 0x1A marker
    Sauce,

    /// CSI with a final byte the dispatch does not recognize
    Unknown,
}

impl Token {
    /// Stable name of the token kind, used as the stats key
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            TokenKind::Text(_) => "Text",
            TokenKind::C0(_) => "C0",
            TokenKind::C1(_) => "C1",
            TokenKind::Csi { .. } => "CSI",
            TokenKind::Sgr { .. } => "SGR",
            TokenKind::CsiInterrupted { .. } => "CSIInterrupted",
            TokenKind::Dcs { .. } => "DCS",
            TokenKind::Osc { .. } => "OSC",
            TokenKind::Escape => "Escape",
            TokenKind::Sauce => "Sauce",
            TokenKind::Unknown => "Unknown",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, TokenKind::Text(_))
    }

    pub fn is_sgr(&self) -> bool {
        matches!(self.kind, TokenKind::Sgr { .. })
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self.kind, TokenKind::CsiInterrupted { .. })
    }
}

/// Name of a C0 control byte, for diagnostics and the token table
pub fn c0_name(code: u8) -> &'static str {
    const NAMES: [&str; 32] = [
        "NUL", "SOH", "STX", "ETX", "EOT", "ENQ", "ACK", "BEL", "BS", "HT", "LF", "VT", "FF",
        "CR", "SO", "SI", "DLE", "DC1", "DC2", "DC3", "DC4", "NAK", "SYN", "ETB", "CAN", "EM",
        "SUB", "ESC", "FS", "GS", "RS", "US",
    ];
    NAMES.get(code as usize).copied().unwrap_or("??")
}
