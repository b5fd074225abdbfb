//! Entry point for `hostat`.
//!
//! Parses CLI arguments, sends one request through the local Chaosnet
//! stream endpoint and prints the decoded answer. All protocol work lives in
//! the library; `main.rs` owns only process setup (logging, arguments,
//! exit status).

use std::path::PathBuf;

use anyhow::Result;
use chaos_hostat::config::{CH_PK_MAXLEN, DEFAULT_CONTACT, DEFAULT_SOCKET_DIR};
use chaos_hostat::{decode, query, Config, DisplayMode, Renderer, Request, Service};
use clap::Parser;

/// Handles "simple" connectionless Chaosnet protocols.
///
/// Try STATUS, TIME, UPTIME, DUMP-ROUTING-TABLE, LASTCN, FINGER, LOAD.
/// The contact name is not case sensitive.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Host to ask.
    host: String,
    /// Contact name.
    #[arg(default_value = DEFAULT_CONTACT)]
    contact: String,
    /// Print nothing, only set the exit status.
    #[arg(short, long)]
    quiet: bool,
    /// Show extra detail (time difference against the local clock).
    #[arg(short, long)]
    verbose: bool,
    /// Dump the payload bytes instead of decoding.
    #[arg(short, long)]
    raw: bool,
    /// Print unrecognized payloads as text.
    #[arg(short, long)]
    ascii: bool,
    /// RFC timeout in seconds, passed on to the endpoint.
    #[arg(short, long)]
    timeout: Option<u32>,
    /// Directory holding the chaos_stream socket.
    #[arg(long, env = "CHAOS_SOCKET_DIR", default_value = DEFAULT_SOCKET_DIR)]
    socket_dir: PathBuf,
    /// Largest payload accepted from the endpoint.
    #[arg(long, default_value_t = CH_PK_MAXLEN)]
    max_record_size: usize,
}

impl Cli {
    fn config(&self) -> Config {
        let display = if self.raw {
            DisplayMode::Raw
        } else if self.ascii {
            DisplayMode::Ascii
        } else {
            DisplayMode::Decoded
        };
        Config {
            socket_dir: self.socket_dir.clone(),
            max_record_size: self.max_record_size,
            display,
            timeout: self.timeout,
            verbose: self.verbose,
            quiet: self.quiet,
        }
    }
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    let request = Request::new(&cli.host, &cli.contact).with_timeout(config.timeout);
    let reply = query(config, &request)?;
    if config.quiet {
        return Ok(());
    }
    let service = Service::from_name(&cli.contact);
    let record = decode(&service, config.display, &reply.payload)?;
    let renderer = Renderer::new(reply.source, &cli.host, config.verbose);
    print!("{}", renderer.render(&record));
    Ok(())
}

fn main() {
    // Initialise env_logger; set RUST_LOG to control verbosity.
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.config();

    if let Err(e) = run(&cli, &config) {
        if !config.quiet {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}
