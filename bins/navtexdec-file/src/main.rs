use clap::Parser;

use navtex_config::{DecoderConfig, FlushPolicy, SharedConfig, toml_config};
use navtex_core::debug;
use navtex_decoder::{BitSource, ReaderBitSource, Session};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "NAVTEX CCIR-476 FEC decoder",
    long_about = "Decodes a NAVTEX bit stream (one bit per byte, 0x00 or 0x01) from a file or stdin and prints the text"
)]
struct Args {
    /// Input file, or '-' for stdin
    #[arg(help = "Bit file to decode; stdin if absent or '-'")]
    input: Option<String>,

    /// Config file
    #[arg(short = 'c', long = "config", help = "TOML config with output and logging settings")]
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

fn open_input(input: Option<&str>) -> Box<dyn BitSource> {
    match input {
        None | Some("-") => {
            tracing::info!("Reading bits from stdin");
            Box::new(ReaderBitSource::stdin())
        }
        Some(path) => match ReaderBitSource::open(path) {
            Ok(src) => {
                tracing::info!("Reading bits from {}", path);
                Box::new(src)
            }
            Err(e) => {
                tracing::error!("Failed to open {}: {}", path, e);
                std::process::exit(1);
            }
        },
    }
}

fn main() {
    eprintln!("NAVTEX decoder {}", env!("CARGO_PKG_VERSION"));
    eprintln!("    Kristoff Bonne (ON1ARF)\n");

    let args = Args::parse();
    let mut cfg = load_config(args.config.as_deref());
    apply_args(&mut cfg, &args);

    let cfg = match SharedConfig::from_config(cfg) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let _log_guard = debug::setup_logging_default(cfg.config().debug_log.clone());

    let source = open_input(args.input.as_deref());
    let stdout = std::io::stdout().lock();
    let mut session = Session::new(cfg, source, stdout);
    if let Err(e) = session.run() {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
