//! Emitters
//!
//! Everything that turns a processed virtual terminal (or the raw token
//! list) back into bytes: flattened ANSI, plain text, the neotex
//! dual-column format, and the inspection table.

pub mod ansi;
pub mod neotex;
pub mod table;
pub mod text;

pub use neotex::NeotexDocument;
