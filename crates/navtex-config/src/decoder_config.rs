use serde::Deserialize;
use std::net::Ipv4Addr;
use std::sync::Arc;

/// When the text sink flushes its writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum FlushPolicy {
    /// Flush after every character and every diagnostic marker
    EveryChar,
    /// Flush only after a line feed
    Newline,
    /// Never flush explicitly
    Never,
}

/// Output sink configuration
#[derive(Debug, Clone)]
pub struct CfgOutput {
    pub flush: FlushPolicy,
    /// Echo shift changes and control characters inline, e.g. `<LTRS>`, `<ALPHA>`
    pub print_all: bool,
}

impl std::str::FromStr for FlushPolicy {
    type Err = String;

    /// Accepts `every-char`, `newline`, `never`, and the PascalCase names used in TOML
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace(['-', '_'], "").to_ascii_lowercase().as_str() {
            "everychar" => Ok(FlushPolicy::EveryChar),
            "newline" => Ok(FlushPolicy::Newline),
            "never" => Ok(FlushPolicy::Never),
            _ => Err(format!("unknown flush policy '{}', expected every-char, newline or never", s)),
        }
    }
}

impl Default for CfgOutput {
    fn default() -> Self {
        Self {
            flush: FlushPolicy::EveryChar,
            print_all: false,
        }
    }
}

/// Multicast input configuration
#[derive(Debug, Clone)]
pub struct CfgMulticast {
    pub group: Ipv4Addr,
    pub port: u16,
    /// Receive timeout, after which the receiver thread checks whether it should stop
    pub read_timeout_ms: u64,
}

impl CfgMulticast {
    /// Only the multicast entry point needs these fields to be usable.
    pub fn validate(&self) -> Result<(), &str> {
        if !self.group.is_multicast() {
            return Err("multicast group must be an IPv4 multicast address (224.0.0.0/4)");
        }
        if self.port == 0 {
            return Err("multicast port must be non-zero");
        }
        if self.read_timeout_ms == 0 {
            return Err("multicast read_timeout_ms must be non-zero");
        }
        Ok(())
    }
}

impl Default for CfgMulticast {
    fn default() -> Self {
        Self {
            group: default_multicast_group(),
            port: default_multicast_port(),
            read_timeout_ms: 200,
        }
    }
}

#[inline]
pub fn default_multicast_group() -> Ipv4Addr {
    Ipv4Addr::new(225, 0, 0, 1)
}

#[inline]
pub fn default_multicast_port() -> u16 {
    10000
}

#[derive(Debug, Clone, Default)]
pub struct DecoderConfig {
    /// Optional verbose log file
    pub debug_log: Option<String>,
    /// Log the absolute bit position on every (re)synchronisation at info level
    pub print_position: bool,

    pub output: CfgOutput,
    pub multicast: CfgMulticast,
}

impl DecoderConfig {
    /// Validate the fields every entry point uses.
    /// The `[multicast]` section is checked separately, see [`CfgMulticast::validate`].
    pub fn validate(&self) -> Result<(), &str> {
        if self.debug_log.as_deref().is_some_and(|f| f.trim().is_empty()) {
            return Err("debug_log must not be empty");
        }
        Ok(())
    }
}

/// Read-only configuration shared between entry point, session and receiver thread.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    cfg: Arc<DecoderConfig>,
}

impl SharedConfig {
    pub fn from_config(cfg: DecoderConfig) -> Result<Self, String> {
        cfg.validate().map_err(|e| format!("Invalid decoder configuration: {}", e))?;
        Ok(Self { cfg: Arc::new(cfg) })
    }

    /// Access immutable config.
    pub fn config(&self) -> Arc<DecoderConfig> {
        Arc::clone(&self.cfg)
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            cfg: Arc::new(DecoderConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = DecoderConfig::default();
        assert!(cfg.validate().is_ok());
        assert!(cfg.multicast.validate().is_ok());
        assert_eq!(cfg.multicast.group, Ipv4Addr::new(225, 0, 0, 1));
        assert_eq!(cfg.multicast.port, 10000);
        assert_eq!(cfg.output.flush, FlushPolicy::EveryChar);
        assert!(!cfg.output.print_all);
    }

    #[test]
    fn test_rejects_unicast_group() {
        let mut cfg = DecoderConfig::default();
        cfg.multicast.group = Ipv4Addr::new(192, 168, 1, 1);
        assert!(cfg.multicast.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_port() {
        let mut cfg = DecoderConfig::default();
        cfg.multicast.port = 0;
        assert!(cfg.multicast.validate().is_err());
    }

    #[test]
    fn test_unused_multicast_section_not_checked() {
        // File input never touches [multicast]
        let mut cfg = DecoderConfig::default();
        cfg.multicast.group = Ipv4Addr::new(10, 0, 0, 1);
        cfg.multicast.port = 0;
        assert!(cfg.validate().is_ok());
        assert!(SharedConfig::from_config(cfg).is_ok());
    }

    #[test]
    fn test_rejects_empty_debug_log() {
        let cfg = DecoderConfig { debug_log: Some(" ".to_string()), ..DecoderConfig::default() };
        assert!(SharedConfig::from_config(cfg).is_err());
    }

    #[test]
    fn test_flush_policy_from_str() {
        assert_eq!("every-char".parse::<FlushPolicy>(), Ok(FlushPolicy::EveryChar));
        assert_eq!("EveryChar".parse::<FlushPolicy>(), Ok(FlushPolicy::EveryChar));
        assert_eq!("newline".parse::<FlushPolicy>(), Ok(FlushPolicy::Newline));
        assert_eq!("Never".parse::<FlushPolicy>(), Ok(FlushPolicy::Never));
        assert!("sometimes".parse::<FlushPolicy>().is_err());
    }
}
