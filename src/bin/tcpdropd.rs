use anyhow::Result;
use clap::Parser;

use tcpdrop::cli::DaemonOpts;

/// tcpdrop receiving daemon
#[derive(Parser, Debug)]
#[command(author, version, about = "tcpdropd - receive files pushed with tcpdrop")]
struct Cli {
    #[command(flatten)]
    opts: DaemonOpts,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(ref dest) = cli.opts.dest {
        if dest.exists() && !dest.is_dir() {
            anyhow::bail!("Error: Destination is not a directory: {}", dest.display());
        }
    }

    tcpdrop::daemon::serve_main(&cli.opts)
}
