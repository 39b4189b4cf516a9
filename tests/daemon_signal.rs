#![cfg(unix)]

use anyhow::Result;
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tcpdrop::net::client;
use tcpdrop::TransferError;

fn free_port() -> Result<u16> {
    let sock = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(sock.local_addr()?.port())
}

fn wait_exit(child: &mut Child, limit: Duration) -> Result<std::process::ExitStatus> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() > deadline {
            let _ = child.kill();
            anyhow::bail!("daemon did not exit within {:?}", limit);
        }
        thread::sleep(Duration::from_millis(20));
    }
}

#[test]
fn sigterm_stops_daemon_and_frees_port() -> Result<()> {
    let src = tempfile::tempdir()?;
    let dst = tempfile::tempdir()?;
    let config = src.path().join("tcpdrop.toml");
    std::fs::write(&config, "")?;
    let file = src.path().join("hello.txt");
    std::fs::write(&file, b"hello daemon")?;

    let port = free_port()?;
    let mut child = Command::new(env!("CARGO_BIN_EXE_tcpdropd"))
        .arg("--bind")
        .arg("127.0.0.1")
        .arg("--port")
        .arg(port.to_string())
        .arg("--dest")
        .arg(dst.path())
        .arg("--poll-ms")
        .arg("20")
        .arg("--config")
        .arg(&config)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;

    // Retry until the daemon is listening
    let addr = format!("127.0.0.1:{}", port);
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        match client::send_one(&addr, &file) {
            Ok(stats) => {
                assert_eq!(stats.files, 1);
                break;
            }
            Err(TransferError::Connect { .. }) if Instant::now() < deadline => {
                thread::sleep(Duration::from_millis(50));
            }
            Err(e) => {
                let _ = child.kill();
                return Err(e.into());
            }
        }
    }
    assert_eq!(std::fs::read(dst.path().join("hello.txt"))?, b"hello daemon");

    let status = Command::new("kill")
        .arg("-TERM")
        .arg(child.id().to_string())
        .status()?;
    assert!(status.success());

    let exit = wait_exit(&mut child, Duration::from_secs(5))?;
    assert!(exit.success(), "daemon exited with {:?}", exit);

    let mut out = String::new();
    if let Some(mut stdout) = child.stdout.take() {
        stdout.read_to_string(&mut out)?;
    }
    assert!(out.contains("Received 1 files"), "{}", out);

    let rebound = std::net::TcpListener::bind(&addr)?;
    drop(rebound);
    Ok(())
}
