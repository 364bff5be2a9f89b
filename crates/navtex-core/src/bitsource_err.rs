/// Errors a bit source can report to the decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitSourceErr {
    /// Source permanently exhausted. Ends the session normally.
    EndOfData,
    /// Underlying reader or socket failed
    Io(String),
}

impl std::fmt::Display for BitSourceErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BitSourceErr::EndOfData => write!(f, "End of data"),
            BitSourceErr::Io(msg) => write!(f, "Bit source I/O error: {}", msg),
        }
    }
}

impl std::error::Error for BitSourceErr {}

impl From<std::io::Error> for BitSourceErr {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof => BitSourceErr::EndOfData,
            _ => BitSourceErr::Io(e.to_string()),
        }
    }
}
