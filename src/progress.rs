//! Per-file send progress
//!
//! Purely observational: nothing here touches the wire. The client calls
//! `begin` before a file's payload, `advance` after every chunk with the
//! cumulative byte count, and `finish` once the frame is fully written.

use crossterm::style::{Color, Stylize};
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

use crate::protocol::timeouts::PROGRESS_TICK_MS;

pub trait ProgressSink: Send + Sync {
    fn begin(&self, _name: &str, _total: u64) {}
    fn advance(&self, _sent: u64, _total: u64) {}
    fn finish(&self, _name: &str, _bytes: u64) {}
}

pub struct NoopProgress;
impl ProgressSink for NoopProgress {}

/// Cargo-style output: a byte bar for the file in flight, and a
/// "Sent <name>" line scrolled above it when the file completes.
pub struct BarProgress {
    bar: Mutex<Option<ProgressBar>>,
    started: Mutex<Instant>,
    show_bar: bool,
}

impl BarProgress {
    pub fn new(show_bar: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            started: Mutex::new(Instant::now()),
            show_bar,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ")
    }
}

impl ProgressSink for BarProgress {
    fn begin(&self, name: &str, total: u64) {
        *self.started.lock() = Instant::now();
        if !self.show_bar {
            return;
        }
        let bar = ProgressBar::new(total);
        bar.set_style(Self::style());
        bar.set_message(format!("Sending {}", name));
        bar.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
        *self.bar.lock() = Some(bar);
    }

    fn advance(&self, sent: u64, _total: u64) {
        if let Some(bar) = self.bar.lock().as_ref() {
            bar.set_position(sent);
        }
    }

    fn finish(&self, name: &str, bytes: u64) {
        let elapsed = self.started.lock().elapsed().as_secs_f64();
        let line = format!(
            "  {} {:<35} {:.1} KB in {:.2}s",
            "Sent".with(Color::Green).bold(),
            name.with(Color::Cyan),
            bytes as f64 / 1024.0,
            elapsed
        );
        match self.bar.lock().take() {
            Some(bar) => {
                bar.finish_and_clear();
                bar.suspend(|| println!("{}", line));
            }
            None => println!("{}", line),
        }
    }
}

/// Records every event in order.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ProgressEvent {
    Begin(String, u64),
    Advance(u64, u64),
    Finish(String, u64),
}

#[cfg(test)]
impl RecordingProgress {
    pub(crate) fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().clone()
    }
}

#[cfg(test)]
impl ProgressSink for RecordingProgress {
    fn begin(&self, name: &str, total: u64) {
        self.events.lock().push(ProgressEvent::Begin(name.to_string(), total));
    }
    fn advance(&self, sent: u64, total: u64) {
        self.events.lock().push(ProgressEvent::Advance(sent, total));
    }
    fn finish(&self, name: &str, bytes: u64) {
        self.events.lock().push(ProgressEvent::Finish(name.to_string(), bytes));
    }
}
