use navtex_core::BitSourceErr;

pub mod chunked;
pub mod multicast;
pub mod reader;

pub use chunked::{Chunk, ChunkedBitSource};
pub use multicast::MulticastReceiver;
pub use reader::ReaderBitSource;

/// Bit source abstraction for the decoder
///
/// Bits are delivered one per byte, 0 or 1. A source blocks until it can fill the
/// whole request. A source that runs dry before that returns `BitSourceErr::EndOfData`;
/// whatever it had already written to `out` is then meaningless and the decoder treats
/// the condition as terminal.
pub trait BitSource {
    /// Fill `out` completely with the next `out.len()` bits
    fn fetch(&mut self, out: &mut [u8]) -> Result<(), BitSourceErr>;

    /// Fetch a single bit
    fn next_bit(&mut self) -> Result<u8, BitSourceErr> {
        let mut bit = [0u8; 1];
        self.fetch(&mut bit)?;
        Ok(bit[0])
    }
}

impl<S: BitSource + ?Sized> BitSource for &mut S {
    fn fetch(&mut self, out: &mut [u8]) -> Result<(), BitSourceErr> {
        (**self).fetch(out)
    }
}

impl<S: BitSource + ?Sized> BitSource for Box<S> {
    fn fetch(&mut self, out: &mut [u8]) -> Result<(), BitSourceErr> {
        (**self).fetch(out)
    }
}

/// Wraps a source and keeps the absolute number of bits delivered
pub struct CountingSource<S: BitSource> {
    inner: S,
    position: u64,
}

impl<S: BitSource> CountingSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, position: 0 }
    }

    /// Number of bits successfully fetched so far
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: BitSource> BitSource for CountingSource<S> {
    fn fetch(&mut self, out: &mut [u8]) -> Result<(), BitSourceErr> {
        self.inner.fetch(out)?;
        self.position += out.len() as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_source() {
        let data: &[u8] = &[1, 0, 1, 1, 0];
        let mut src = CountingSource::new(ReaderBitSource::new(data));
        let mut buf = [0u8; 3];
        src.fetch(&mut buf).unwrap();
        assert_eq!(buf, [1, 0, 1]);
        assert_eq!(src.position(), 3);
        assert_eq!(src.next_bit().unwrap(), 1);
        assert_eq!(src.position(), 4);

        // Short read does not advance the position
        assert_eq!(src.fetch(&mut buf), Err(BitSourceErr::EndOfData));
        assert_eq!(src.position(), 4);
    }
}
