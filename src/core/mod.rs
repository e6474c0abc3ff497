//! Screen model
//!
//! The platform-independent heart of the pipeline: the SGR style model
//! with differential emission, the cell type, and the virtual terminal
//! the token stream is applied to.

pub mod cell;
pub mod style;
pub mod terminal;

pub use cell::{Cell, EMPTY_CHAR};
pub use style::{Color, EmitMode, Sgr, DEFAULT_SGR, VGA_PALETTE};
pub use terminal::{StyleChange, StyledLine, VirtualTerminal};
