use clap::Parser;

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use navtex_config::{DecoderConfig, FlushPolicy, SharedConfig, toml_config};
use navtex_core::debug;
use navtex_decoder::{MulticastReceiver, Session};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "NAVTEX CCIR-476 FEC decoder, UDP multicast input",
    long_about = "Joins a UDP multicast group carrying a NAVTEX bit stream (one bit per byte) and prints the decoded text until interrupted"
)]
struct Args {
    #[arg(help = "Multicast group [default: 225.0.0.1]")]
    group: Option<Ipv4Addr>,

    #[arg(help = "UDP port [default: 10000]")]
    port: Option<u16>,

    /// Config file
    #[arg(short = 'c', long = "config", help = "TOML config with multicast, output and logging settings")]
    config: Option<String>,

    #[arg(long, help = "When to flush decoded text to stdout: every-char, newline or never")]
    flush: Option<FlushPolicy>,

    #[arg(long, help = "Echo shift and control characters as <LTRS>, <ALPHA>, ...")]
    print_all: bool,

    #[arg(long, help = "Log bit positions of synchronisation events")]
    print_position: bool,

    #[arg(long, help = "Write a verbose log to this file")]
    debug_log: Option<String>,
}

/// Load configuration file, or defaults when none is given
fn load_config(cfg_path: Option<&str>) -> DecoderConfig {
    let Some(cfg_path) = cfg_path else {
        return DecoderConfig::default();
    };
    match toml_config::config_from_file(cfg_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", cfg_path, e);
            std::process::exit(1);
        }
    }
}

/// Command-line values override the config file
fn apply_args(cfg: &mut DecoderConfig, args: &Args) {
    if let Some(group) = args.group {
        cfg.multicast.group = group;
    }
    if let Some(port) = args.port {
        cfg.multicast.port = port;
    }
    if let Some(flush) = args.flush {
        cfg.output.flush = flush;
    }
    if args.print_all {
        cfg.output.print_all = true;
    }
    if args.print_position {
        cfg.print_position = true;
    }
    if args.debug_log.is_some() {
        cfg.debug_log = args.debug_log.clone();
    }
}

fn main() {
    eprintln!("NAVTEX multicast decoder {}", env!("CARGO_PKG_VERSION"));
    eprintln!("    Kristoff Bonne (ON1ARF)\n");

    let args = Args::parse();
    let mut cfg = load_config(args.config.as_deref());
    apply_args(&mut cfg, &args);
    if let Err(e) = cfg.multicast.validate() {
        eprintln!("Invalid multicast configuration: {}", e);
        std::process::exit(1);
    }

    let cfg = match SharedConfig::from_config(cfg) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let _log_guard = debug::setup_logging_default(cfg.config().debug_log.clone());

    let mc = cfg.config().multicast.clone();
    let receiver = match MulticastReceiver::bind(&mc) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to join {}:{}: {}", mc.group, mc.port, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Listening on {}:{}", mc.group, mc.port);

    // Set up Ctrl+C handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("failed to set Ctrl+C handler");

    let (source, rx_thread) = receiver.into_bit_source(running);
    let stdout = std::io::stdout().lock();
    let mut session = Session::new(cfg, source, stdout);
    let result = session.run();

    if rx_thread.join().is_err() {
        tracing::warn!("receiver thread panicked");
    }
    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
