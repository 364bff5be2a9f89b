use std::io::{self, Write};

use navtex_config::FlushPolicy;

/// Character output with a configurable flush policy
pub struct TextSink<W: Write> {
    out: W,
    policy: FlushPolicy,
    /// Scratch space for encoding one char
    utf8: [u8; 4],
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W, policy: FlushPolicy) -> Self {
        Self {
            out,
            policy,
            utf8: [0; 4],
        }
    }

    /// Write one decoded character. Line feed is the only newline that reaches here.
    pub fn put_char(&mut self, c: char) -> io::Result<()> {
        let encoded = c.encode_utf8(&mut self.utf8);
        self.out.write_all(encoded.as_bytes())?;
        let flush = match self.policy {
            FlushPolicy::EveryChar => true,
            FlushPolicy::Newline => c == '\n',
            FlushPolicy::Never => false,
        };
        if flush {
            self.out.flush()?;
        }
        Ok(())
    }

    /// Write a diagnostic marker such as `<LTRS>`
    pub fn put_marker(&mut self, marker: &str) -> io::Result<()> {
        self.out.write_all(marker.as_bytes())?;
        if self.policy == FlushPolicy::EveryChar {
            self.out.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every flush together with the number of bytes written so far
    #[derive(Default)]
    struct FlushLog {
        data: Vec<u8>,
        flushes: Vec<usize>,
    }

    impl Write for FlushLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes.push(self.data.len());
            Ok(())
        }
    }

    fn write_all(policy: FlushPolicy) -> FlushLog {
        let mut sink = TextSink::new(FlushLog::default(), policy);
        sink.put_char('A').unwrap();
        sink.put_marker("<FIGS>").unwrap();
        sink.put_char('\n').unwrap();
        sink.put_char('B').unwrap();
        sink.into_inner()
    }

    #[test]
    fn test_flush_every_char() {
        let log = write_all(FlushPolicy::EveryChar);
        assert_eq!(log.data, b"A<FIGS>\nB");
        assert_eq!(log.flushes, vec![1, 7, 8, 9]);
    }

    #[test]
    fn test_flush_newline() {
        let log = write_all(FlushPolicy::Newline);
        assert_eq!(log.flushes, vec![8]);
    }

    #[test]
    fn test_flush_never() {
        let log = write_all(FlushPolicy::Never);
        assert!(log.flushes.is_empty());
        assert_eq!(log.data, b"A<FIGS>\nB");
    }

    #[test]
    fn test_bell_passes_through() {
        let mut sink = TextSink::new(Vec::new(), FlushPolicy::Never);
        sink.put_char('\x07').unwrap();
        assert_eq!(sink.get_ref().as_slice(), b"\x07");
    }
}
