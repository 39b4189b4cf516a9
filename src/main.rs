//! tcpdrop - push files to a tcpdropd daemon
//!
//! `tcpdrop <PATH> <HOST[:PORT]>` sends one file, or every top-level file of a
//! directory over one connection. `tcpdrop --serve` runs the daemon in-process.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use tcpdrop::cli::{DaemonOpts, SendOpts};
use tcpdrop::net::client::{with_default_port, Client};
use tcpdrop::progress::BarProgress;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tcpdrop - send files to a tcpdrop daemon over a plain TCP connection"
)]
struct Args {
    #[command(flatten)]
    send: SendOpts,

    /// Run as daemon (server mode)
    #[arg(long)]
    serve: bool,

    /// Destination directory for --serve
    #[arg(long, requires = "serve")]
    dest: Option<PathBuf>,

    /// Bind address for --serve
    #[arg(long, requires = "serve")]
    bind: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Server mode
    if args.serve {
        let opts = DaemonOpts {
            bind: args.bind.clone(),
            port: args.send.port,
            dest: args.dest.clone(),
            config: args.send.config.clone(),
            log: args.send.log.clone(),
            ..DaemonOpts::default()
        };
        return tcpdrop::daemon::serve_main(&opts);
    }

    // Set up Ctrl-C handler
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted by user. Exiting (Ctrl-C)...");
        // Exit immediately with 130 (128 + SIGINT)
        std::process::exit(130);
    })
    .context("Error setting Ctrl-C handler")?;

    let src_path = args
        .send
        .source
        .clone()
        .ok_or_else(|| anyhow::anyhow!("source required unless --serve"))?;
    let host = args
        .send
        .host
        .clone()
        .ok_or_else(|| anyhow::anyhow!("host required unless --serve"))?;

    let config = args.send.client_config()?;
    let addr = with_default_port(&host, config.port);
    let logger = args.send.log.build_logger()?;
    let client = Client::new(config)
        .with_progress(Arc::new(BarProgress::new(args.send.progress)))
        .with_logger(logger);

    println!("Sending to {}", addr);
    let stats = if src_path.is_dir() {
        client
            .send_batch(&addr, &src_path)
            .with_context(|| format!("batch send of {} failed", src_path.display()))?
    } else {
        client
            .send_one(&addr, &src_path)
            .with_context(|| format!("send of {} failed", src_path.display()))?
    };

    println!(
        "Completed {} files ({:.1} MB) in {:.1}s ({:.1} MB/s)",
        stats.files,
        stats.bytes as f64 / 1_048_576.0,
        stats.elapsed.as_secs_f64(),
        stats.throughput_mb_s()
    );
    Ok(())
}
