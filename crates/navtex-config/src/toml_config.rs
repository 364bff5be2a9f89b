use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::net::Ipv4Addr;
use std::path::Path;

use serde::Deserialize;
use toml::Value;

use super::decoder_config::{CfgMulticast, CfgOutput, DecoderConfig, FlushPolicy, SharedConfig};

/// Build `DecoderConfig` from a TOML configuration string
pub fn config_from_toml_str(toml_str: &str) -> Result<DecoderConfig, Box<dyn std::error::Error>> {
    let root: TomlConfigRoot = toml::from_str(toml_str)?;

    // Various sanity checks
    let expected_config_version = "0.1";
    if !root.config_version.eq(expected_config_version) {
        return Err(format!(
            "Unrecognized config_version: {}, expect {}",
            root.config_version, expected_config_version
        )
        .into());
    }
    if !root.extra.is_empty() {
        return Err(format!("Unrecognized top-level fields: {:?}", sorted_keys(&root.extra)).into());
    }
    if let Some(ref out) = root.output {
        if !out.extra.is_empty() {
            return Err(format!("Unrecognized fields: output::{:?}", sorted_keys(&out.extra)).into());
        }
    }
    if let Some(ref mc) = root.multicast {
        if !mc.extra.is_empty() {
            return Err(format!("Unrecognized fields: multicast::{:?}", sorted_keys(&mc.extra)).into());
        }
    }

    let mut cfg = DecoderConfig {
        debug_log: root.debug_log,
        print_position: root.print_position.unwrap_or(false),
        output: CfgOutput::default(),
        multicast: CfgMulticast::default(),
    };

    if let Some(out) = root.output {
        apply_output_patch(&mut cfg.output, out);
    }
    if let Some(mc) = root.multicast {
        apply_multicast_patch(&mut cfg.multicast, mc)?;
    }

    Ok(cfg)
}

/// Build `SharedConfig` from a TOML configuration string
pub fn from_toml_str(toml_str: &str) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let cfg = config_from_toml_str(toml_str)?;
    Ok(SharedConfig::from_config(cfg)?)
}

/// Build `SharedConfig` from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

/// Build `SharedConfig` from a file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    let r = BufReader::new(f);
    let cfg = from_reader(r)?;
    Ok(cfg)
}

/// Read the raw `DecoderConfig` from a file path, for callers that still apply overrides.
pub fn config_from_file<P: AsRef<Path>>(path: P) -> Result<DecoderConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    BufReader::new(File::open(path)?).read_to_string(&mut contents)?;
    config_from_toml_str(&contents)
}

fn apply_output_patch(dst: &mut CfgOutput, src: OutputDto) {
    if let Some(v) = src.flush {
        dst.flush = v;
    }
    if let Some(v) = src.print_all {
        dst.print_all = v;
    }
}

fn apply_multicast_patch(dst: &mut CfgMulticast, src: MulticastDto) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(group) = src.group {
        dst.group = group
            .parse::<Ipv4Addr>()
            .map_err(|e| format!("Invalid multicast::group {}: {}", group, e))?;
    }
    if let Some(v) = src.port {
        dst.port = v;
    }
    if let Some(v) = src.read_timeout_ms {
        dst.read_timeout_ms = v;
    }
    Ok(())
}

fn sorted_keys(map: &HashMap<String, Value>) -> Vec<&str> {
    let mut v: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
    v.sort_unstable();
    v
}

/// ----------------------- DTOs for input shape -----------------------

#[derive(Deserialize)]
struct TomlConfigRoot {
    config_version: String,
    debug_log: Option<String>,
    print_position: Option<bool>,

    #[serde(default)]
    output: Option<OutputDto>,

    #[serde(default)]
    multicast: Option<MulticastDto>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct OutputDto {
    flush: Option<FlushPolicy>,
    print_all: Option<bool>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct MulticastDto {
    group: Option<String>,
    port: Option<u16>,
    read_timeout_ms: Option<u64>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}
