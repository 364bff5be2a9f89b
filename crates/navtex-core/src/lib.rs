//! Core types for the NAVTEX decoder
//!
//! This crate provides the fundamental pieces shared across the workspace:
//! - CodeWord, the 7-bit CCIR-476 character with its bit-order and validity rules
//! - The CCIR-476 letters/figures table
//! - BitSourceErr, the error type bit sources report
//! - Logging setup

pub mod bitsource_err;
pub mod ccir476;
pub mod code_word;
pub mod debug;

// Re-export commonly used items
pub use bitsource_err::BitSourceErr;
pub use ccir476::{Ccir476Entry, ControlGlyph, Glyph};
pub use code_word::{ALPHA, CODE_WORD_BITS, CodeWord, RC, is_valid_response};

/// Number of bits in the synchronisation window (10 characters)
pub const SYNC_WINDOW_BITS: usize = 70;
