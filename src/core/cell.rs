//! Grid cell
//!
//! One character slot of the virtual terminal, carrying the SGR state it
//! was written with. `NUL` marks a cell nothing was ever written to; it is
//! distinct from an explicit space and only becomes one on emission.

use serde::{Deserialize, Serialize};

use super::style::Sgr;

/// Codepoint standing for "never written"
pub const EMPTY_CHAR: char = '\0';

/// A single cell in the terminal grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub ch: char,
    pub style: Sgr,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: EMPTY_CHAR,
            style: Sgr::new(),
        }
    }
}

impl Cell {
    pub fn new(ch: char, style: Sgr) -> Self {
        Self { ch, style }
    }

    /// No character was ever written here
    pub fn is_empty(&self) -> bool {
        self.ch == EMPTY_CHAR
    }

    /// Reset to the never-written state
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::style::Color;

    #[test]
    fn test_cell_default_is_empty() {
        let cell = Cell::default();
        assert!(cell.is_empty());
        assert!(cell.style.is_default());
    }

    #[test]
    fn test_cell_clear() {
        let mut cell = Cell::new(
            'A',
            Sgr {
                fg: Color::Standard(1),
                ..Sgr::new()
            },
        );
        assert!(!cell.is_empty());
        cell.clear();
        assert!(cell.is_empty());
        assert!(cell.style.is_default());
    }

    #[test]
    fn test_empty_distinct_from_space() {
        let blank = Cell::new(' ', Sgr::new());
        assert!(!blank.is_empty());
    }
}
