//! Daemon entry point shared by `tcpdropd` and `tcpdrop --serve`

use anyhow::{Context, Result};

use crate::cli::DaemonOpts;
use crate::net::client::with_default_port;
use crate::net::outbound_local_ip;
use crate::net::server::Server;

/// Explicit --bind wins; otherwise the outbound interface, then 0.0.0.0.
pub fn resolve_bind(bind: Option<&str>, port: u16) -> String {
    match bind {
        Some(b) => with_default_port(b, port),
        None => {
            let host = match outbound_local_ip() {
                Ok(ip) => ip.to_string(),
                Err(e) => {
                    eprintln!("⚠️  Could not determine outbound interface ({}), binding 0.0.0.0", e);
                    "0.0.0.0".to_string()
                }
            };
            with_default_port(&host, port)
        }
    }
}

pub fn serve_main(opts: &DaemonOpts) -> Result<()> {
    let config = opts.server_config()?;
    let bind = resolve_bind(opts.bind.as_deref(), config.port);
    let logger = opts.log.build_logger()?;

    let server = Server::bind(&bind, config.clone())
        .with_context(|| format!("bind {}", bind))?
        .with_logger(logger);

    let host = hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Starting tcpdrop daemon on {}:", host);
    println!("  Dest: {}", server.dest().display());
    println!("  Bind: {}", server.local_addr()?);
    if config.max_connections > 1 {
        println!("  Sessions: up to {} at once", config.max_connections);
    }
    eprintln!("⚠️  No encryption or authentication: only use on trusted networks (LAN)");

    let handle = server.shutdown_handle();
    ctrlc::set_handler(move || {
        eprintln!("\nReceived interrupt signal, shutting down server...");
        handle.shutdown();
    })
    .context("Error setting signal handler")?;

    let stats = server.run()?;
    println!(
        "Received {} files ({:.1} MB) over {:.1}s",
        stats.files,
        stats.bytes as f64 / 1_048_576.0,
        stats.elapsed.as_secs_f64()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_bind_explicit() {
        assert_eq!(resolve_bind(Some("127.0.0.1"), 12345), "127.0.0.1:12345");
        assert_eq!(resolve_bind(Some("127.0.0.1:9"), 12345), "127.0.0.1:9");
    }

    #[test]
    fn test_resolve_bind_auto_has_port() {
        // Works with or without a routable interface
        assert!(resolve_bind(None, 4242).ends_with(":4242"));
    }
}
