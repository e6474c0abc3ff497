//! Neotex emitter
//!
//! Writes the buffer as the dual-column neotex format: a plain text column
//! and a sequence column of style-change mnemonics, joined by `" | "` per
//! line so the file stays readable without a terminal emulator. The
//! sequence side uses differential encoding with reset-and-rebuild as its
//! only turn-off mechanism, and a metadata header on the first line.

use crate::core::style::{Color, Sgr};
use crate::core::terminal::{StyleChange, StyledLine, VirtualTerminal};

/// Version written into the `!V` header
pub const NEOTEX_VERSION: u32 = 1;

/// Foreground mnemonics by standard index; uppercase is the bright half.
const FG_CODES: [&str; 16] = [
    "Fk", "Fr", "Fg", "Fy", "Fb", "Fm", "Fc", "Fw", //
    "FK", "FR", "FG", "FY", "FB", "FM", "FC", "FW",
];

/// Background mnemonics; there is no bright half on output, bright
/// backgrounds round-trip through the indexed form instead.
const BG_CODES: [&str; 8] = ["Bk", "Br", "Bg", "By", "Bb", "Bm", "Bc", "Bw"];

/// The two columns of a neotex document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeotexDocument {
    pub text: String,
    pub sequences: String,
}

impl NeotexDocument {
    /// Join the two columns into the on-disk line format. Text lines are
    /// already emitted at terminal width, so no padding is needed.
    pub fn combine(&self) -> String {
        let text_lines: Vec<&str> = self.text.split('\n').collect();
        let seq_lines: Vec<&str> = self.sequences.split('\n').collect();

        text_lines
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let seq = seq_lines.get(i).copied().unwrap_or("");
                format!("{text} | {seq}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Absolute mnemonic list for one style: foreground (bold folded into
/// brightness for standard colors), background, then effects.
pub fn sgr_codes(sgr: &Sgr) -> Vec<String> {
    let mut codes = Vec::new();

    match sgr.fg {
        Color::Standard(i) => {
            let idx = if sgr.bold && i < 8 { i + 8 } else { i };
            codes.push(FG_CODES[idx as usize & 0xF].to_string());
        }
        Color::Rgb(r, g, b) => codes.push(format!("F{r:02X}{g:02X}{b:02X}")),
        Color::Indexed(n) => codes.push(format!("F{n}")),
        Color::Default => codes.push("FD".to_string()),
    }

    match sgr.bg {
        Color::Standard(i) if i < 8 => codes.push(BG_CODES[i as usize].to_string()),
        // No bright-background mnemonics; fall back to the indexed form.
        Color::Standard(i) => codes.push(format!("B{i}")),
        Color::Rgb(r, g, b) => codes.push(format!("B{r:02X}{g:02X}{b:02X}")),
        Color::Indexed(n) => codes.push(format!("B{n}")),
        Color::Default => codes.push("BD".to_string()),
    }

    if sgr.dim {
        codes.push("EM".to_string());
    }
    if sgr.italic {
        codes.push("EI".to_string());
    }
    if sgr.underline {
        codes.push("EU".to_string());
    }
    if sgr.blink {
        codes.push("EB".to_string());
    }
    if sgr.reverse {
        codes.push("ER".to_string());
    }

    codes
}

/// Minimal mnemonic list from `previous` to `current`. Reset-and-rebuild
/// is the only way neotex switches anything off.
pub fn diff_codes(current: &Sgr, previous: Option<&Sgr>) -> Vec<String> {
    let prev = match previous {
        None => return sgr_codes(current),
        Some(prev) => prev,
    };

    if current == prev {
        return Vec::new();
    }
    if current.is_default() {
        return vec!["R0".to_string()];
    }
    if current.turned_off_since(prev) {
        let mut codes = vec!["R0".to_string()];
        codes.extend(sgr_codes(current));
        return codes;
    }

    let mut codes = Vec::new();

    if current.dim && !prev.dim {
        codes.push("EM".to_string());
    }
    if current.italic && !prev.italic {
        codes.push("EI".to_string());
    }
    if current.underline && !prev.underline {
        codes.push("EU".to_string());
    }
    if current.blink && !prev.blink {
        codes.push("EB".to_string());
    }
    if current.reverse && !prev.reverse {
        codes.push("ER".to_string());
    }

    // Bold rides on the standard-color case, so a bold flip re-emits the
    // foreground even when the color itself is unchanged.
    let bold_flip =
        current.bold != prev.bold && matches!(current.fg, Color::Standard(_));
    if current.fg != prev.fg || bold_flip {
        match current.fg {
            Color::Standard(i) => {
                let idx = if current.bold && i < 8 { i + 8 } else { i };
                codes.push(FG_CODES[idx as usize & 0xF].to_string());
            }
            Color::Rgb(r, g, b) => codes.push(format!("F{r:02X}{g:02X}{b:02X}")),
            Color::Indexed(n) => codes.push(format!("F{n}")),
            Color::Default => codes.push("FD".to_string()),
        }
    }

    if current.bg != prev.bg {
        match current.bg {
            Color::Standard(i) if i < 8 => codes.push(BG_CODES[i as usize].to_string()),
            Color::Standard(i) => codes.push(format!("B{i}")),
            Color::Rgb(r, g, b) => codes.push(format!("B{r:02X}{g:02X}{b:02X}")),
            Color::Indexed(n) => codes.push(format!("B{n}")),
            Color::Default => codes.push("BD".to_string()),
        }
    }

    codes
}

/// Standard export: one text+sequence pair per terminal row.
pub fn export(vt: &VirtualTerminal) -> NeotexDocument {
    build(vt, false)
}

/// Inline export: every row flattened into a single pair.
pub fn export_inline(vt: &VirtualTerminal) -> NeotexDocument {
    build(vt, true)
}

fn build(vt: &VirtualTerminal, inline: bool) -> NeotexDocument {
    let mut lines = vt.split_lines();
    if inline {
        lines = flatten(lines);
    }

    let (text_width, trimmed_width) = if inline {
        let width = lines
            .first()
            .map(|line| line.text.chars().count())
            .unwrap_or(0);
        (width, width)
    } else {
        (vt.width(), rightmost_content(&lines))
    };
    let line_count = lines.len();

    let mut text = String::new();
    let mut sequences = String::new();
    let mut running: Option<Sgr> = None;

    for (index, line) in lines.iter().enumerate() {
        text.push_str(&line.text);

        let mut groups = Vec::new();
        if index == 0 {
            groups.push(format!("!V{NEOTEX_VERSION}"));
            groups.push(format!("!TW{trimmed_width}/{text_width}"));
            groups.push(format!("!NL{line_count}"));
        }

        for change in &line.changes {
            let codes = diff_codes(&change.style, running.as_ref());
            if !codes.is_empty() {
                groups.push(format!("{}:{}", change.position + 1, codes.join(", ")));
            }
            running = Some(change.style);
        }

        sequences.push_str(&groups.join("; "));

        if index < lines.len() - 1 {
            text.push('\n');
            sequences.push('\n');
        }
    }

    NeotexDocument { text, sequences }
}

/// Rightmost column holding a non-space character, plus one.
fn rightmost_content(lines: &[StyledLine]) -> usize {
    lines
        .iter()
        .map(|line| {
            line.text
                .chars()
                .rev()
                .position(|c| c != ' ')
                .map(|from_end| line.text.chars().count() - from_end)
                .unwrap_or(0)
        })
        .max()
        .unwrap_or(0)
}

fn flatten(lines: Vec<StyledLine>) -> Vec<StyledLine> {
    if lines.len() <= 1 {
        return lines;
    }

    let mut text = String::new();
    let mut changes = Vec::new();
    let mut offset = 0;

    for line in lines {
        for change in &line.changes {
            changes.push(StyleChange {
                position: change.position + offset,
                style: change.style,
            });
        }
        offset += line.text.chars().count();
        text.push_str(&line.text);
    }

    vec![StyledLine { text, changes }]
}
