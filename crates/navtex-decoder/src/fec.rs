//! FEC diversity decoder
//!
//! Every character is sent twice: once in the DX position and again, delayed, in the RX
//! position. Groups alternate DX/RX. A DX group is stored in a small ring; the matching
//! RX group arrives later and the pair is voted on. A confidence score tracks how well
//! the pairs agree; when it runs out, the decoder has lost sync.

use navtex_core::{ALPHA, CodeWord, RC};

use crate::mapper::Emission;

/// Score right after synchronisation: the two seeded characters
pub const SCORE_INIT: u8 = 2;
pub const SCORE_MAX: u8 = 20;

/// Ring depth
pub const FEC_RING_SLOTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FecSlot {
    pub valid: bool,
    pub code: CodeWord,
}

/// Delay line for DX characters waiting for their RX repeat.
/// Read and write cursors move independently, both modulo the ring size.
#[derive(Debug, Clone)]
pub struct FecRing {
    slots: [FecSlot; FEC_RING_SLOTS],
    wr: usize,
    rd: usize,
}

impl FecRing {
    /// Ring seeded with two confirmed characters from the sync window
    pub fn seeded(seed: [CodeWord; 2]) -> Self {
        let empty = FecSlot { valid: true, code: CodeWord::default() };
        let mut slots = [empty; FEC_RING_SLOTS];
        slots[0] = FecSlot { valid: true, code: seed[0] };
        slots[1] = FecSlot { valid: true, code: seed[1] };
        Self { slots, wr: 2, rd: 0 }
    }

    pub fn write(&mut self, slot: FecSlot) {
        self.slots[self.wr] = slot;
        self.wr = (self.wr + 1) % FEC_RING_SLOTS;
    }

    pub fn read(&mut self) -> FecSlot {
        let slot = self.slots[self.rd];
        self.rd = (self.rd + 1) % FEC_RING_SLOTS;
        slot
    }

    pub fn cursors(&self) -> (usize, usize) {
        (self.wr, self.rd)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FecPhase {
    /// Next group is a first transmission
    AwaitFirst,
    /// Next group is a repeat, to be paired with the ring
    AwaitSecond,
}

/// How a group was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FecCase {
    /// First transmission stored in the ring
    Stored,
    /// RC arrived in reply to ALPHA: DX/RX order reversed, group stored instead of paired
    ReversedResponse,
    /// Both copies valid and in agreement
    Confirmed,
    /// Both copies valid but different
    Mismatch,
    /// Repeat broken, stored copy used
    TrustedFirst,
    /// Stored copy broken, repeat used
    TrustedSecond,
    /// Both copies broken
    BothInvalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FecStep {
    pub case: FecCase,
    pub emission: Option<Emission>,
}

/// Per-run FEC state. Created fresh on every synchronisation.
#[derive(Debug, Clone)]
pub struct FecDecoder {
    ring: FecRing,
    phase: FecPhase,
    score: u8,
}

impl FecDecoder {
    pub fn new(seed: [CodeWord; 2]) -> Self {
        Self {
            ring: FecRing::seeded(seed),
            phase: FecPhase::AwaitFirst,
            score: SCORE_INIT,
        }
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn phase(&self) -> FecPhase {
        self.phase
    }

    /// Score has collapsed; the run is over
    pub fn is_exhausted(&self) -> bool {
        self.score < 1
    }

    /// Handle one group (already in canonical orientation)
    pub fn process(&mut self, code: CodeWord) -> FecStep {
        let valid = code.is_valid();

        if self.phase == FecPhase::AwaitFirst {
            self.ring.write(FecSlot { valid, code });
            self.phase = FecPhase::AwaitSecond;
            return FecStep { case: FecCase::Stored, emission: None };
        }

        let prev = self.ring.read();

        if prev.valid && valid && prev.code == ALPHA && code == RC {
            // Treat as a first transmission and keep waiting for a repeat
            self.ring.write(FecSlot { valid, code });
            return FecStep { case: FecCase::ReversedResponse, emission: None };
        }

        let step = match (prev.valid, valid) {
            (true, true) if prev.code.is_valid_response_to(code) => {
                self.score = u8::min(SCORE_MAX, self.score + 1);
                FecStep { case: FecCase::Confirmed, emission: Some(Emission::Code(code)) }
            }
            (true, true) => FecStep { case: FecCase::Mismatch, emission: Some(Emission::ErrorMarker) },
            (true, false) => FecStep { case: FecCase::TrustedFirst, emission: Some(Emission::Code(prev.code)) },
            (false, true) => FecStep { case: FecCase::TrustedSecond, emission: Some(Emission::Code(code)) },
            (false, false) => {
                self.score = self.score.saturating_sub(1);
                FecStep { case: FecCase::BothInvalid, emission: Some(Emission::ErrorMarker) }
            }
        };
        self.phase = FecPhase::AwaitFirst;
        step
    }
}
