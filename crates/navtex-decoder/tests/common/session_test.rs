use navtex_config::{DecoderConfig, FlushPolicy, SharedConfig};
use navtex_decoder::{ReaderBitSource, Session, SessionStats};

/// Config for tests: no flushing, no diagnostics
pub fn test_config() -> DecoderConfig {
    let mut cfg = DecoderConfig::default();
    cfg.output.flush = FlushPolicy::Never;
    cfg
}

/// Text and counters of one complete session
pub struct Decoded {
    pub text: String,
    pub stats: SessionStats,
}

pub fn decode_bits_with(cfg: DecoderConfig, bits: &[u8]) -> Decoded {
    let config = SharedConfig::from_config(cfg).unwrap();
    let mut session = Session::new(config, ReaderBitSource::new(bits), Vec::new());
    let stats = session.run().unwrap();
    assert!(session.state().is_terminated());
    let text = String::from_utf8(session.into_output()).unwrap();
    Decoded { text, stats }
}

pub fn decode_bits(bits: &[u8]) -> Decoded {
    decode_bits_with(test_config(), bits)
}
