//! Virtual terminal
//!
//! A fixed-size grid of styled cells driven by the token stream. Cursor
//! motion is resolved here, so the exporters downstream only ever see
//! linear rows. Only the subset of terminal behavior the ANSI-art corpus
//! relies on is implemented; unknown sequences are logged and skipped.

use tracing::debug;

use super::cell::{Cell, EMPTY_CHAR};
use super::style::{EmitMode, Sgr};
use crate::encoding::Encoding;
use crate::tokenizer::token::{Token, TokenKind};

/// A style taking effect at a rune position within a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleChange {
    pub position: usize,
    pub style: Sgr,
}

/// One exported row: plain text plus the style changes inside it.
///
/// Styles are independent copies; mutating them cannot touch the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledLine {
    pub text: String,
    pub changes: Vec<StyleChange>,
}

/// The screen model tokens are applied to
pub struct VirtualTerminal {
    grid: Vec<Vec<Cell>>,
    width: usize,
    height: usize,
    cursor_x: usize,
    cursor_y: usize,
    saved_cursor_x: usize,
    saved_cursor_y: usize,
    max_cursor_x: usize,
    max_cursor_y: usize,
    /// Wrap is deferred: a write into the last column parks here and the
    /// next advance moves to the start of the following row. Keeps a line
    /// feed after a full-width row from opening a blank line.
    pending_wrap: bool,
    current: Sgr,
    output_encoding: Encoding,
    use_vga: bool,
}

impl VirtualTerminal {
    pub fn new(width: usize, height: usize, output_encoding: Encoding, use_vga: bool) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            grid: vec![vec![Cell::default(); width]; height],
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
            saved_cursor_x: 0,
            saved_cursor_y: 0,
            max_cursor_x: 0,
            max_cursor_y: 0,
            pending_wrap: false,
            current: Sgr::new(),
            output_encoding,
            use_vga,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn max_cursor_x(&self) -> usize {
        self.max_cursor_x
    }

    pub fn max_cursor_y(&self) -> usize {
        self.max_cursor_y
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_x, self.cursor_y)
    }

    pub fn output_encoding(&self) -> Encoding {
        self.output_encoding
    }

    /// Emission mode the exporters should use for this terminal
    pub fn emit_mode(&self) -> EmitMode {
        if self.use_vga {
            EmitMode::VgaLegacy
        } else {
            EmitMode::Legacy
        }
    }

    /// Apply a token list in order.
    pub fn apply(&mut self, tokens: &[Token]) {
        for token in tokens {
            match &token.kind {
                TokenKind::Text(value) => self.write_text(value),
                TokenKind::C0(code) => self.handle_c0(*code),
                TokenKind::Sgr { params } => self.handle_sgr(params),
                TokenKind::Csi {
                    params, final_byte, ..
                } => self.handle_csi(params, *final_byte),
                _ => {
                    debug!(kind = token.kind_name(), raw = ?token.raw, "token ignored");
                }
            }
        }
    }

    fn discharge_wrap(&mut self) {
        if self.pending_wrap {
            self.pending_wrap = false;
            self.cursor_x = 0;
            self.cursor_y += 1;
        }
    }

    fn touch(&mut self) {
        self.max_cursor_x = self.max_cursor_x.max(self.cursor_x);
        self.max_cursor_y = self.max_cursor_y.max(self.cursor_y.min(self.height - 1));
    }

    fn write_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.discharge_wrap();

            // Writes below the last row are dropped
            if self.cursor_y >= self.height {
                continue;
            }

            self.grid[self.cursor_y][self.cursor_x] = Cell::new(ch, self.current);
            self.touch();

            if self.cursor_x + 1 >= self.width {
                self.pending_wrap = true;
            } else {
                self.cursor_x += 1;
            }
        }
    }

    fn handle_c0(&mut self, code: u8) {
        match code {
            // NUL advances without writing
            0x00 => {
                self.discharge_wrap();
                if self.cursor_x + 1 >= self.width {
                    self.pending_wrap = true;
                } else {
                    self.cursor_x += 1;
                }
                self.touch();
            }
            // TAB to the next multiple of 8
            0x09 => {
                self.pending_wrap = false;
                self.cursor_x = (self.cursor_x / 8 + 1) * 8;
                if self.cursor_x >= self.width {
                    self.cursor_x = 0;
                    self.cursor_y += 1;
                }
                self.touch();
            }
            // LF carries an implicit CR in this corpus
            0x0A => {
                self.pending_wrap = false;
                self.cursor_y = (self.cursor_y + 1).min(self.height - 1);
                self.cursor_x = 0;
                self.touch();
            }
            0x0D => {
                self.pending_wrap = false;
                self.cursor_x = 0;
            }
            0x08 => {
                self.pending_wrap = false;
                self.cursor_x = self.cursor_x.saturating_sub(1);
            }
            _ => {}
        }
    }

    fn handle_sgr(&mut self, params: &[String]) {
        let numeric: Vec<u16> = params
            .iter()
            .filter_map(|p| {
                if p.is_empty() {
                    Some(0)
                } else {
                    p.parse::<u16>().ok()
                }
            })
            .collect();

        if numeric.is_empty() {
            self.current.reset();
        } else {
            self.current.apply_params(&numeric);
        }
    }

    fn handle_csi(&mut self, params: &[String], final_byte: u8) {
        let count = |default: i64| -> i64 {
            match params.first() {
                Some(p) if p.is_empty() => 0,
                Some(p) => p.parse().unwrap_or(0),
                None => default,
            }
        };

        match final_byte {
            b'A' => {
                self.pending_wrap = false;
                let n = count(1).max(0) as usize;
                self.cursor_y = self.cursor_y.saturating_sub(n);
            }
            b'B' => {
                self.pending_wrap = false;
                // Rows are not upper-clamped; writes past the bottom are
                // dropped instead.
                let n = count(1).max(0) as usize;
                self.cursor_y = self.cursor_y.saturating_add(n);
                self.touch();
            }
            b'C' => {
                self.pending_wrap = false;
                let n = count(1).max(0) as usize;
                self.cursor_x = (self.cursor_x + n).min(self.width - 1);
            }
            b'D' => {
                self.pending_wrap = false;
                let n = count(1).max(0) as usize;
                self.cursor_x = self.cursor_x.saturating_sub(n);
            }
            b'H' | b'f' => {
                self.pending_wrap = false;
                let (row, col) = cursor_position(params);
                self.cursor_y = (row - 1).max(0) as usize;
                self.cursor_x = ((col - 1).max(0) as usize).min(self.width - 1);
                self.touch();
            }
            b'J' => self.erase_display(count(0)),
            b'K' => self.erase_line(count(0)),
            b's' => {
                self.saved_cursor_x = self.cursor_x;
                self.saved_cursor_y = self.cursor_y;
            }
            b'u' => {
                self.pending_wrap = false;
                self.cursor_x = self.saved_cursor_x;
                self.cursor_y = self.saved_cursor_y;
            }
            _ => {
                debug!(final_byte, "CSI final ignored");
            }
        }
    }

    fn erase_display(&mut self, mode: i64) {
        match mode {
            0 => {
                // Cursor to end of screen
                let start_y = self.cursor_y.min(self.height);
                for y in start_y..self.height {
                    for x in 0..self.width {
                        if y == self.cursor_y && x < self.cursor_x {
                            continue;
                        }
                        self.grid[y][x].clear();
                    }
                }
            }
            1 => {
                // Start of screen to cursor, inclusive
                let end_y = self.cursor_y.min(self.height - 1);
                for y in 0..=end_y {
                    for x in 0..self.width {
                        if y == self.cursor_y && x > self.cursor_x {
                            break;
                        }
                        self.grid[y][x].clear();
                    }
                }
            }
            2 => {
                for row in &mut self.grid {
                    for cell in row {
                        cell.clear();
                    }
                }
                self.cursor_x = 0;
                self.cursor_y = 0;
                self.pending_wrap = false;
            }
            _ => {}
        }
    }

    fn erase_line(&mut self, mode: i64) {
        if self.cursor_y >= self.height {
            return;
        }
        let row = &mut self.grid[self.cursor_y];
        match mode {
            0 => {
                for cell in row.iter_mut().skip(self.cursor_x) {
                    cell.clear();
                }
            }
            1 => {
                for cell in row.iter_mut().take(self.cursor_x + 1) {
                    cell.clear();
                }
            }
            2 => {
                for cell in row.iter_mut() {
                    cell.clear();
                }
            }
            _ => {}
        }
    }

    /// Export rows up to the last one with content, as text plus style
    /// changes. The running style carries across rows and starts out as a
    /// sentinel, so the first cell always produces a change.
    pub fn split_lines(&self) -> Vec<StyledLine> {
        let mut result = Vec::new();
        let mut running: Option<Sgr> = None;
        let mut max_row = 0;

        for (y, row) in self.grid.iter().enumerate() {
            if row.iter().any(|cell| !cell.is_empty()) {
                max_row = y;
            }

            let mut text = String::with_capacity(self.width);
            let mut changes = Vec::new();

            for (x, cell) in row.iter().enumerate() {
                if running != Some(cell.style) {
                    changes.push(StyleChange {
                        position: x,
                        style: cell.style,
                    });
                    running = Some(cell.style);
                }

                let ch = if cell.ch == EMPTY_CHAR && self.output_encoding == Encoding::Utf8 {
                    ' '
                } else {
                    cell.ch
                };
                text.push(ch);
            }

            result.push(StyledLine { text, changes });
        }

        result.truncate(max_row + 1);
        result
    }
}

/// Row/col for CUP; empty slots count as 1, a single parameter is the row.
fn cursor_position(params: &[String]) -> (i64, i64) {
    let parse = |p: &String| -> i64 {
        if p.is_empty() {
            1
        } else {
            p.parse().unwrap_or(1)
        }
    };

    match params {
        [] => (1, 1),
        [row] => (parse(row), 1),
        [row, col, ..] => (parse(row), parse(col)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::style::Color;
    use crate::tokenizer::ansi::AnsiTokenizer;

    fn vt(width: usize, height: usize) -> VirtualTerminal {
        VirtualTerminal::new(width, height, Encoding::Utf8, false)
    }

    fn feed(term: &mut VirtualTerminal, input: &[u8]) {
        let (tokens, _) = AnsiTokenizer::new(input).tokenize();
        term.apply(&tokens);
    }

    fn texts(term: &VirtualTerminal) -> Vec<String> {
        term.split_lines()
            .into_iter()
            .map(|line| line.text.trim_end().to_string())
            .collect()
    }

    #[test]
    fn test_write_and_cursor() {
        let mut term = vt(10, 5);
        feed(&mut term, b"Hi");
        assert_eq!(term.cursor(), (2, 0));
        assert_eq!(texts(&term), vec!["Hi"]);
    }

    #[test]
    fn test_wrap_without_spurious_blank_line() {
        let mut term = vt(3, 10);
        feed(&mut term, b"abc\ndef");
        assert_eq!(texts(&term), vec!["abc", "def"]);
    }

    #[test]
    fn test_wrap_continues_writing() {
        let mut term = vt(3, 10);
        feed(&mut term, b"abcdef");
        assert_eq!(texts(&term), vec!["abc", "def"]);
    }

    #[test]
    fn test_cup_forms() {
        let mut term = vt(20, 10);
        feed(&mut term, b"\x1b[H");
        assert_eq!(term.cursor(), (0, 0));
        feed(&mut term, b"\x1b[6;12H");
        assert_eq!(term.cursor(), (11, 5));
        feed(&mut term, b"\x1b[6H");
        assert_eq!(term.cursor(), (0, 5));
        feed(&mut term, b"\x1b[;12H");
        assert_eq!(term.cursor(), (11, 0));
    }

    #[test]
    fn test_cursor_movements_clamped() {
        let mut term = vt(10, 5);
        feed(&mut term, b"\x1b[3;3H");
        feed(&mut term, b"\x1b[9A");
        assert_eq!(term.cursor(), (2, 0));
        feed(&mut term, b"\x1b[99C");
        assert_eq!(term.cursor(), (9, 0));
        feed(&mut term, b"\x1b[99D");
        assert_eq!(term.cursor(), (0, 0));
    }

    #[test]
    fn test_writes_past_bottom_dropped() {
        let mut term = vt(5, 2);
        feed(&mut term, b"one\ntwo\nthree\nfour");
        // Rows below the grid are gone, row 1 keeps its last write
        assert_eq!(term.split_lines().len(), 2);
    }

    #[test]
    fn test_lf_implicit_cr() {
        let mut term = vt(10, 5);
        feed(&mut term, b"ab\ncd");
        assert_eq!(texts(&term), vec!["ab", "cd"]);
    }

    #[test]
    fn test_cr_overwrites() {
        let mut term = vt(10, 5);
        feed(&mut term, b"abc\rX");
        assert_eq!(texts(&term), vec!["Xbc"]);
    }

    #[test]
    fn test_backspace_floors_at_zero() {
        let mut term = vt(10, 5);
        feed(&mut term, b"a\x08\x08\x08X");
        assert_eq!(texts(&term), vec!["X"]);
    }

    #[test]
    fn test_tab_stops() {
        let mut term = vt(20, 5);
        feed(&mut term, b"a\tb");
        assert_eq!(term.split_lines()[0].text.trim_end(), "a       b");
    }

    #[test]
    fn test_nul_advances_over_cell() {
        let mut term = vt(10, 5);
        feed(&mut term, b"a\x00c");
        let line = &term.split_lines()[0];
        // The skipped cell stays empty, rendered as a space
        assert_eq!(line.text.trim_end(), "a c");
    }

    #[test]
    fn test_save_restore_cursor() {
        let mut term = vt(10, 5);
        feed(&mut term, b"\x1b[3;4H\x1b[s\x1b[HX\x1b[uY");
        assert_eq!(term.cursor(), (4, 2));
        assert_eq!(texts(&term), vec!["X", "", "   Y"]);
    }

    #[test]
    fn test_erase_display_all() {
        let mut term = vt(5, 3);
        feed(&mut term, b"aaaaa\nbbbbb\nccccc\x1b[2J");
        assert_eq!(term.cursor(), (0, 0));
        let lines = term.split_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text.trim_end(), "");
    }

    #[test]
    fn test_erase_display_below() {
        let mut term = vt(3, 3);
        feed(&mut term, b"aaa\nbbb\nccc\x1b[2;2H\x1b[J");
        assert_eq!(texts(&term), vec!["aaa", "b"]);
    }

    #[test]
    fn test_erase_display_above() {
        let mut term = vt(3, 3);
        feed(&mut term, b"aaa\nbbb\nccc\x1b[2;2H\x1b[1J");
        assert_eq!(texts(&term), vec!["", "  b", "ccc"]);
    }

    #[test]
    fn test_erase_line_modes() {
        let mut term = vt(5, 3);
        feed(&mut term, b"aaaaa\x1b[1;3H\x1b[K");
        assert_eq!(texts(&term), vec!["aa"]);

        let mut term = vt(5, 3);
        feed(&mut term, b"aaaaa\x1b[1;3H\x1b[1K");
        assert_eq!(texts(&term), vec!["   aa"]);

        let mut term = vt(5, 3);
        feed(&mut term, b"aaaaa\x1b[1;3H\x1b[2K");
        assert_eq!(texts(&term), vec![""]);
    }

    #[test]
    fn test_cursor_far_below_grid_is_inert() {
        let mut term = vt(5, 2);
        feed(&mut term, b"\x1b[99B\x1b[Kok");
        // Erase is a no-op there and the writes are dropped
        assert_eq!(texts(&term), vec![""]);
    }

    #[test]
    fn test_nul_wraps_at_margin() {
        let mut term = vt(3, 5);
        feed(&mut term, b"ab\x00\x00Z");
        assert_eq!(texts(&term), vec!["ab", " Z"]);
    }

    #[test]
    fn test_sgr_applies_to_written_cells() {
        let mut term = vt(10, 2);
        feed(&mut term, b"\x1b[31mAB\x1b[0mC");
        let line = &term.split_lines()[0];
        assert_eq!(line.changes[0].position, 0);
        assert_eq!(line.changes[0].style.fg, Color::Standard(1));
        assert_eq!(line.changes[1].position, 2);
        assert!(line.changes[1].style.is_default());
    }

    #[test]
    fn test_split_lines_running_style_crosses_rows() {
        let mut term = vt(3, 4);
        feed(&mut term, b"\x1b[31mabcdef");
        let lines = term.split_lines();
        assert_eq!(lines.len(), 2);
        // Row 0 changes to red at column 0; row 1 is written in the same
        // red, so no further change is recorded there.
        assert_eq!(lines[0].changes.len(), 1);
        assert!(lines[1].changes.is_empty());
    }

    #[test]
    fn test_first_cell_always_emits_change() {
        let term = vt(4, 2);
        let lines = term.split_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].changes.len(), 1);
        assert_eq!(lines[0].changes[0].position, 0);
        assert!(lines[0].changes[0].style.is_default());
    }

    #[test]
    fn test_unknown_tokens_ignored() {
        let mut term = vt(10, 2);
        feed(&mut term, b"a\x1b[?25h\x1b]0;t\x07b");
        assert_eq!(texts(&term), vec!["ab"]);
    }
}
