use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use navtex_core::BitSourceErr;

use super::BitSource;

/// Bit source over any byte reader: file, stdin, or an in-memory slice.
/// Each input byte is one bit; any non-zero byte counts as 1.
pub struct ReaderBitSource<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> ReaderBitSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }
}

impl ReaderBitSource<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl ReaderBitSource<io::Stdin> {
    pub fn stdin() -> Self {
        Self::new(io::stdin())
    }
}

impl<R: Read> BitSource for ReaderBitSource<R> {
    fn fetch(&mut self, out: &mut [u8]) -> Result<(), BitSourceErr> {
        let mut filled = 0;
        while filled < out.len() {
            match self.reader.read(&mut out[filled..]) {
                Ok(0) => {
                    tracing::debug!("reader exhausted with {} of {} bits pending", filled, out.len());
                    return Err(BitSourceErr::EndOfData);
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        for b in out.iter_mut() {
            *b = (*b != 0) as u8;
        }
        Ok(())
    }
}
