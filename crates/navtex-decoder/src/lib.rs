//! NAVTEX CCIR-476 FEC decoder
//!
//! This crate turns a stream of demodulated bits into text:
//! - Bit sources (files, stdin, UDP multicast)
//! - Character alignment search over a 70-bit window
//! - DX/RX diversity voting with a confidence score
//! - Letters/figures mapping and text output
//! - The session loop tying these together

pub mod bitsource;
pub mod fec;
pub mod mapper;
pub mod output;
pub mod session;
pub mod sync;

// Re-export commonly used items
pub use bitsource::{BitSource, ChunkedBitSource, CountingSource, MulticastReceiver, ReaderBitSource};
pub use fec::{FecCase, FecDecoder};
pub use mapper::{CharMapper, Emission, ShiftState};
pub use output::TextSink;
pub use session::{Session, SessionErr, SessionState, SessionStats};
pub use sync::{SyncResult, Synchronizer};
