//! Character alignment search
//!
//! A 70-bit window (ten characters) slides over the stream one bit at a time until
//! its ten groups show the DX/RX diversity structure: groups 5, 7 and 9 repeat
//! groups 0, 2 and 4.

use std::collections::VecDeque;

use navtex_core::{BitSourceErr, CODE_WORD_BITS, CodeWord, SYNC_WINDOW_BITS};

use crate::bitsource::{BitSource, CountingSource};

/// Characters in the window
pub const SYNC_WINDOW_GROUPS: usize = SYNC_WINDOW_BITS / CODE_WORD_BITS;

/// Which synchronisation rule a window fails first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncReject {
    /// A group does not have exactly four 1-bits
    Weight { group: usize },
    /// Groups 5, 7 and 9 are identical
    Uniform,
    /// An RX group does not answer its DX group
    NoResponse { rx: usize, dx: usize },
}

/// Result of a successful search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncResult {
    /// Groups 0, 2 and 4, ready for the mapper
    pub first: [CodeWord; 3],
    /// Groups 6 and 8, seed for the FEC ring
    pub seed: [CodeWord; 2],
    /// Absolute bit position where FEC decoding resumes
    pub position: u64,
}

/// Check a 10-group window. Groups are in canonical orientation.
pub fn check_window(groups: &[CodeWord; SYNC_WINDOW_GROUPS]) -> Result<(), SyncReject> {
    if let Some(group) = groups.iter().position(|g| !g.is_valid()) {
        return Err(SyncReject::Weight { group });
    }
    if groups[9] == groups[7] && groups[7] == groups[5] {
        return Err(SyncReject::Uniform);
    }
    for (rx, dx) in [(9, 4), (7, 2), (5, 0)] {
        if !groups[rx].is_valid_response_to(groups[dx]) {
            return Err(SyncReject::NoResponse { rx, dx });
        }
    }
    Ok(())
}

/// Sliding-window synchronizer.
///
/// The window always holds the most recent bits of the stream, including the ones
/// consumed by the FEC decoder (fed back through [`Synchronizer::observe`]).
/// This differs from resuming with the window of the last lock plus one new bit,
/// which ignores everything read during the FEC run. With the recent bits, an aligned
/// stream re-locks one DX/RX pair after the point of loss. Do not drop the `observe`
/// feed to get the older behaviour back.
#[derive(Debug, Clone)]
pub struct Synchronizer {
    window: VecDeque<u8>,
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synchronizer {
    pub fn new() -> Self {
        Self {
            window: VecDeque::with_capacity(SYNC_WINDOW_BITS + 1),
        }
    }

    /// Push bits read elsewhere into the window, dropping the oldest
    pub fn observe(&mut self, bits: &[u8]) {
        for &b in bits {
            self.push(b);
        }
    }

    fn push(&mut self, bit: u8) {
        self.window.push_back(bit);
        if self.window.len() > SYNC_WINDOW_BITS {
            self.window.pop_front();
        }
    }

    fn is_full(&self) -> bool {
        self.window.len() == SYNC_WINDOW_BITS
    }

    /// Current window split into canonical groups, or None while not yet filled
    pub fn groups(&self) -> Option<[CodeWord; SYNC_WINDOW_GROUPS]> {
        if !self.is_full() {
            return None;
        }
        let mut wire = [0u8; SYNC_WINDOW_BITS];
        for (dst, src) in wire.iter_mut().zip(self.window.iter()) {
            *dst = *src;
        }
        let mut groups = [CodeWord::default(); SYNC_WINDOW_GROUPS];
        for (i, chunk) in wire.chunks_exact(CODE_WORD_BITS).enumerate() {
            groups[i] = CodeWord::from_wire(chunk);
        }
        Some(groups)
    }

    /// Search for alignment.
    ///
    /// An empty window is filled with one bulk fetch; a filled window is first advanced
    /// by one bit. Then the window advances one bit per failed check. Returns
    /// `BitSourceErr::EndOfData` if the source runs out first.
    pub fn run<S: BitSource>(&mut self, src: &mut CountingSource<S>) -> Result<SyncResult, BitSourceErr> {
        if self.is_full() {
            self.push(src.next_bit()?);
        } else {
            let mut bulk = vec![0u8; SYNC_WINDOW_BITS - self.window.len()];
            src.fetch(&mut bulk)?;
            self.observe(&bulk);
        }

        loop {
            let Some(groups) = self.groups() else {
                unreachable!("sync window not full after fill");
            };
            match check_window(&groups) {
                Ok(()) => {
                    return Ok(SyncResult {
                        first: [groups[0], groups[2], groups[4]],
                        seed: [groups[6], groups[8]],
                        position: src.position(),
                    });
                }
                Err(reject) => {
                    tracing::trace!(pos = src.position(), "no sync: {:?}", reject);
                    self.push(src.next_bit()?);
                }
            }
        }
    }
}
