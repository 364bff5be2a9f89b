use crossbeam_channel::Receiver;

use navtex_core::BitSourceErr;

use super::BitSource;

/// One delivery from the producer: a payload, or the error that stopped it
pub type Chunk = Result<Vec<u8>, BitSourceErr>;

/// Bit source fed by arbitrarily sized chunks, typically UDP datagram payloads.
///
/// Partially consumed chunks are kept for the next fetch. Empty chunks are skipped
/// without surfacing to the decoder. An `Err` chunk is handed to the decoder as is.
/// The source ends when every sender is dropped.
pub struct ChunkedBitSource {
    rx: Receiver<Chunk>,
    chunk: Vec<u8>,
    chunk_pos: usize,
    /// Number of empty chunks skipped, for diagnostics
    empty_chunks: u64,
}

impl ChunkedBitSource {
    pub fn new(rx: Receiver<Chunk>) -> Self {
        Self {
            rx,
            chunk: Vec::new(),
            chunk_pos: 0,
            empty_chunks: 0,
        }
    }

    pub fn empty_chunks(&self) -> u64 {
        self.empty_chunks
    }

    /// Block until a non-empty chunk is available
    fn refill(&mut self) -> Result<(), BitSourceErr> {
        loop {
            let chunk = self.rx.recv().map_err(|_| BitSourceErr::EndOfData)??;
            if chunk.is_empty() {
                self.empty_chunks += 1;
                tracing::trace!("skipping empty chunk");
                continue;
            }
            self.chunk = chunk;
            self.chunk_pos = 0;
            return Ok(());
        }
    }
}

impl BitSource for ChunkedBitSource {
    fn fetch(&mut self, out: &mut [u8]) -> Result<(), BitSourceErr> {
        let mut filled = 0;
        while filled < out.len() {
            if self.chunk_pos == self.chunk.len() {
                self.refill()?;
            }

            let n = usize::min(out.len() - filled, self.chunk.len() - self.chunk_pos);
            for (dst, src) in out[filled..filled + n].iter_mut().zip(&self.chunk[self.chunk_pos..self.chunk_pos + n]) {
                *dst = (*src != 0) as u8;
            }
            self.chunk_pos += n;
            filled += n;
        }
        Ok(())
    }
}
