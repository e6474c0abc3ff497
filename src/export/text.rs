//! Plain-text emitter
//!
//! Text column only, styles discarded.

use crate::core::terminal::VirtualTerminal;

/// One terminal row per line, each terminated by `\n`.
pub fn render(vt: &VirtualTerminal) -> String {
    let mut out = String::new();
    for line in vt.split_lines() {
        out.push_str(&line.text);
        out.push('\n');
    }
    out
}

/// All rows concatenated without terminators.
pub fn render_inline(vt: &VirtualTerminal) -> String {
    let mut out = String::new();
    for line in vt.split_lines() {
        out.push_str(&line.text);
    }
    out
}
