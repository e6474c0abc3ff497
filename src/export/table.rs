//! Token table
//!
//! Fixed-width inspection view of a token list: one row per token with its
//! position, kind, semantic detail, and the escaped raw bytes. Padding is
//! by display width so box-drawing glyphs in text tokens line up.

use unicode_width::UnicodeWidthStr;

use crate::tokenizer::token::{c0_name, Token, TokenKind};

const HEADERS: [&str; 5] = ["#", "POS", "TYPE", "DETAIL", "RAW"];
const MAX_RAW: usize = 32;

/// Render the table as a string, trailing newline included.
pub fn render(tokens: &[Token]) -> String {
    let rows: Vec<[String; 5]> = tokens
        .iter()
        .enumerate()
        .map(|(i, token)| {
            [
                i.to_string(),
                token.pos.to_string(),
                token.kind_name().to_string(),
                detail(token),
                escape_raw(&token.raw),
            ]
        })
        .collect();

    let mut widths: [usize; 5] = HEADERS.map(UnicodeWidthStr::width);
    for row in &rows {
        for (width, field) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(field.width());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(String::from), &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, row: &[String; 5], widths: &[usize; 5]) {
    for (i, (field, width)) in row.iter().zip(widths).enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(field);
        // Pad by display width, not char count
        for _ in field.width()..*width {
            out.push(' ');
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out.push('\n');
}

fn detail(token: &Token) -> String {
    match &token.kind {
        TokenKind::Text(value) => format!("{} runes", value.chars().count()),
        TokenKind::C0(code) => c0_name(*code).to_string(),
        TokenKind::C1(name) => name.clone(),
        TokenKind::Csi {
            notation, meaning, ..
        } => {
            if meaning.is_empty() {
                notation.clone()
            } else {
                format!("{notation}: {meaning}")
            }
        }
        TokenKind::Sgr { params } => format!("SGR {}", params.join(";")),
        TokenKind::CsiInterrupted { notation } => notation.clone(),
        TokenKind::Dcs { value } => format!("DCS {value}"),
        TokenKind::Osc { params } => format!("OSC {}", params.join(";")),
        TokenKind::Escape | TokenKind::Sauce | TokenKind::Unknown => String::new(),
    }
}

fn escape_raw(raw: &str) -> String {
    let escaped: String = raw.chars().map(escape_char).collect();
    if escaped.chars().count() > MAX_RAW {
        let truncated: String = escaped.chars().take(MAX_RAW).collect();
        format!("{truncated}…")
    } else {
        escaped
    }
}

fn escape_char(c: char) -> String {
    match c {
        '\x1b' => "␛".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        c if (c as u32) < 0x20 => format!("\\x{:02X}", c as u32),
        c => c.to_string(),
    }
}
