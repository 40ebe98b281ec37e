//! Progress indicator for backend round-trips (login, search, profile loads).
//!
//! Drawn on stderr so piping `vericv search` output stays clean, and only
//! when stderr is a terminal.

use std::future::Future;
use std::io::{IsTerminal, Write};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const TICK: Duration = Duration::from_millis(80);

/// Erase the current terminal line and return to its start.
const CLEAR_LINE: &str = "\x1b[2K\r";

/// The line drawn on tick `tick`, e.g. `"⠙ searching..."`.
fn frame_line(tick: usize, message: &str) -> String {
    format!("{CLEAR_LINE}{} {message}...", FRAMES[tick % FRAMES.len()])
}

pub struct Spinner {
    handle: JoinHandle<()>,
    stop: watch::Sender<bool>,
}

impl Spinner {
    /// Start spinning next to `message`. Does nothing visible when stderr
    /// is redirected.
    pub fn start(message: &str) -> Self {
        Self::spawn(message.to_string(), std::io::stderr().is_terminal())
    }

    fn spawn(message: String, draw: bool) -> Self {
        let (stop, mut stopped) = watch::channel(false);
        let handle = tokio::spawn(async move {
            if !draw {
                let _ = stopped.changed().await;
                return;
            }
            let mut stderr = std::io::stderr();
            for tick in 0.. {
                let _ = write!(stderr, "{}", frame_line(tick, &message));
                let _ = stderr.flush();
                tokio::select! {
                    _ = tokio::time::sleep(TICK) => {}
                    _ = stopped.changed() => break,
                }
            }
            let _ = write!(stderr, "{CLEAR_LINE}");
            let _ = stderr.flush();
        });
        Self { handle, stop }
    }

    /// Stop and wipe the spinner line so the result prints on a clean line.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        let _ = self.handle.await;
    }

    /// Spin while a backend call runs and hand back its result untouched.
    pub async fn during<F: Future>(message: &str, call: F) -> F::Output {
        let spinner = Self::start(message);
        let out = call.await;
        spinner.stop().await;
        out
    }
}
