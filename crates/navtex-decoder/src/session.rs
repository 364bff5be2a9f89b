use std::io::{self, Write};

use navtex_config::SharedConfig;
use navtex_core::{BitSourceErr, CODE_WORD_BITS, CodeWord};

use crate::bitsource::{BitSource, CountingSource};
use crate::fec::{FecCase, FecDecoder};
use crate::mapper::{CharMapper, Emission, Mapped};
use crate::output::TextSink;
use crate::sync::Synchronizer;

/// Session state machine
#[derive(Debug, Clone)]
pub enum SessionState {
    /// Looking for character alignment
    Syncing,
    /// Aligned; decoding with the contained per-run FEC state
    Decoding(FecDecoder),
    /// Bit source exhausted
    Terminated,
}

impl SessionState {
    pub fn is_terminated(&self) -> bool {
        matches!(self, SessionState::Terminated)
    }
}

/// Counters over the life of a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Bits read from the source
    pub bits: u64,
    /// Successful synchronisations
    pub syncs: u64,
    /// FEC runs ended by score collapse
    pub sync_losses: u64,
    /// Characters written to the output
    pub chars: u64,
    pub confirmed: u64,
    pub mismatches: u64,
    /// Pairs where only one copy was usable
    pub recovered: u64,
    pub both_invalid: u64,
    pub reversed: u64,
    /// Score of the most recent FEC run when it ended
    pub final_score: Option<u8>,
}

#[derive(Debug)]
pub enum SessionErr {
    /// Bit source failed (other than running out of data)
    Source(String),
    /// Writing decoded text failed
    Output(io::Error),
}

impl std::fmt::Display for SessionErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionErr::Source(msg) => write!(f, "Bit source failed: {}", msg),
            SessionErr::Output(e) => write!(f, "Output failed: {}", e),
        }
    }
}

impl std::error::Error for SessionErr {}

impl From<io::Error> for SessionErr {
    fn from(e: io::Error) -> Self {
        SessionErr::Output(e)
    }
}

/// Decoding session: alternates synchronisation and FEC runs until the source ends
pub struct Session<S: BitSource, W: Write> {
    config: SharedConfig,
    source: CountingSource<S>,
    sink: TextSink<W>,
    mapper: CharMapper,
    sync: Synchronizer,
    state: SessionState,
    stats: SessionStats,
}

impl<S: BitSource, W: Write> Session<S, W> {
    pub fn new(config: SharedConfig, source: S, out: W) -> Self {
        let (flush, print_all) = {
            let c = config.config();
            tracing::debug!(
                "Session: flush {:?}, print_all {}, print_position {}",
                c.output.flush,
                c.output.print_all,
                c.print_position
            );
            (c.output.flush, c.output.print_all)
        };

        Self {
            config,
            source: CountingSource::new(source),
            sink: TextSink::new(out, flush),
            mapper: CharMapper::new(print_all),
            sync: Synchronizer::new(),
            state: SessionState::Syncing,
            stats: SessionStats::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn mapper(&self) -> &CharMapper {
        &self.mapper
    }

    /// Absolute bit position in the input
    pub fn position(&self) -> u64 {
        self.source.position()
    }

    /// Force the current FEC run to end, as if its score had collapsed
    pub fn force_resync(&mut self) {
        if let SessionState::Decoding(ref fec) = self.state {
            self.stats.final_score = Some(fec.score());
            self.state = SessionState::Syncing;
        }
    }

    /// Perform one state's worth of work: a complete sync search, or a complete FEC run
    pub fn step(&mut self) -> Result<(), SessionErr> {
        let state = std::mem::replace(&mut self.state, SessionState::Terminated);
        self.state = match state {
            SessionState::Syncing => self.run_sync()?,
            SessionState::Decoding(fec) => self.run_fec(fec)?,
            SessionState::Terminated => SessionState::Terminated,
        };
        Ok(())
    }

    /// Run until the source is exhausted
    pub fn run(&mut self) -> Result<SessionStats, SessionErr> {
        while !self.state.is_terminated() {
            self.step()?;
        }
        let s = &self.stats;
        tracing::info!(
            pos = s.bits,
            "Done: {} syncs, {} lost, {} chars, {} confirmed, {} mismatched, {} recovered, {} unrecoverable",
            s.syncs,
            s.sync_losses,
            s.chars,
            s.confirmed,
            s.mismatches,
            s.recovered,
            s.both_invalid
        );
        Ok(self.stats.clone())
    }

    pub fn into_output(self) -> W {
        self.sink.into_inner()
    }

    fn log_position(&self) {
        let pos = self.source.position();
        if self.config.config().print_position {
            tracing::info!(pos, "Position: {}", pos);
        } else {
            tracing::debug!(pos, "Position: {}", pos);
        }
    }

    fn run_sync(&mut self) -> Result<SessionState, SessionErr> {
        if self.source.position() == 0 {
            tracing::info!("Synchronizing");
        } else {
            tracing::info!("Synchronisation lost, resynchronizing");
        }
        self.log_position();

        let res = match self.sync.run(&mut self.source) {
            Ok(res) => res,
            Err(e) => return self.on_source_err(e),
        };

        tracing::info!(pos = res.position, "Synchronisation success");
        self.log_position();
        self.stats.syncs += 1;

        for code in res.first {
            self.emit(Emission::Code(code))?;
        }
        Ok(SessionState::Decoding(FecDecoder::new(res.seed)))
    }

    fn run_fec(&mut self, mut fec: FecDecoder) -> Result<SessionState, SessionErr> {
        let mut bits = [0u8; CODE_WORD_BITS];
        loop {
            if let Err(e) = self.source.fetch(&mut bits) {
                self.stats.final_score = Some(fec.score());
                return self.on_source_err(e);
            }
            self.sync.observe(&bits);

            let step = fec.process(CodeWord::from_wire(&bits));
            tracing::trace!(pos = self.source.position(), "{:?} score {}", step, fec.score());

            match step.case {
                FecCase::Stored => {}
                FecCase::ReversedResponse => self.stats.reversed += 1,
                FecCase::Confirmed => self.stats.confirmed += 1,
                FecCase::Mismatch => self.stats.mismatches += 1,
                FecCase::TrustedFirst | FecCase::TrustedSecond => self.stats.recovered += 1,
                FecCase::BothInvalid => self.stats.both_invalid += 1,
            }
            if let Some(emission) = step.emission {
                self.emit(emission)?;
            }

            if fec.is_exhausted() {
                self.stats.sync_losses += 1;
                self.stats.final_score = Some(fec.score());
                return Ok(SessionState::Syncing);
            }
        }
    }

    fn emit(&mut self, emission: Emission) -> Result<(), SessionErr> {
        if let Mapped::Text(_) = self.mapper.emit(emission, &mut self.sink)? {
            self.stats.chars += 1;
        }
        Ok(())
    }

    /// End of data terminates the session; anything else is reported
    fn on_source_err(&mut self, e: BitSourceErr) -> Result<SessionState, SessionErr> {
        self.stats.bits = self.source.position();
        self.sink.flush()?;
        match e {
            BitSourceErr::EndOfData => {
                tracing::info!(pos = self.stats.bits, "End of data");
                Ok(SessionState::Terminated)
            }
            BitSourceErr::Io(msg) => Err(SessionErr::Source(msg)),
        }
    }
}
