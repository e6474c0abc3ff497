//! Flattened ANSI emitter
//!
//! Re-emits the virtual terminal as a linear ANSI stream: cursor motion is
//! already resolved by the terminal, so output is a plain left-to-right
//! walk with differential SGR escapes at each style change. Emission is
//! legacy-safe (reset-and-rebuild, bright via bold) so the output renders
//! on anything since ANSI.SYS.

use crate::core::style::Sgr;
use crate::core::terminal::VirtualTerminal;
use crate::encoding::Encoding;

/// Standard form: one line per terminal row (UTF-8 output only; legacy
/// code pages rely on width-wrapping and get no terminators).
pub fn render(vt: &VirtualTerminal) -> String {
    render_lines(vt, false)
}

/// Inline form: the same stream without any line terminators.
pub fn render_inline(vt: &VirtualTerminal) -> String {
    render_lines(vt, true)
}

fn render_lines(vt: &VirtualTerminal, inline: bool) -> String {
    let lines = vt.split_lines();
    let mode = vt.emit_mode();
    let utf8 = vt.output_encoding() == Encoding::Utf8;

    let mut out = String::new();
    let mut running: Option<Sgr> = None;

    for line in &lines {
        let mut pending = line.changes.iter().peekable();

        for (i, ch) in line.text.chars().enumerate() {
            if let Some(change) = pending.next_if(|change| change.position == i) {
                out.push_str(&change.style.diff_escape(running.as_ref(), mode));
                running = Some(change.style);
            }
            out.push(ch);
        }

        if utf8 && !inline {
            out.push('\n');
        }
    }

    // Leave the receiving terminal in its reset state
    if running.map_or(true, |style| !style.is_default()) {
        out.push_str("\x1b[0m");
    }

    out
}
