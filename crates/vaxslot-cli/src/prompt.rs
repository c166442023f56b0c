//! Interactive OTP entry on the terminal.
//!
//! Standard input is read by one dedicated thread for the life of the
//! process and handed over line by line through a channel. A prompt that
//! times out only stops waiting on the channel, so the next line typed is
//! delivered to the next prompt instead of an abandoned read.

use std::io::BufRead;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use vaxslot_client::OtpProvider;

/// Lines buffered between the reader thread and the prompt.
const LINE_BUFFER: usize = 16;

/// Reads the OTP from standard input. The session client bounds the wait.
pub(crate) struct PromptOtp {
    lines: Mutex<mpsc::Receiver<String>>,
}

impl PromptOtp {
    /// Starts the stdin reader thread. The thread ends at end of input or
    /// when the provider is dropped.
    pub(crate) fn stdin() -> Self {
        let (tx, rx) = mpsc::channel(LINE_BUFFER);
        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to read OTP from stdin");
                        break;
                    }
                }
            }
        });
        Self::from_lines(rx)
    }

    pub(crate) fn from_lines(lines: mpsc::Receiver<String>) -> Self {
        Self {
            lines: Mutex::new(lines),
        }
    }
}

impl OtpProvider for PromptOtp {
    async fn obtain_otp(&self, timeout: Duration) -> Option<String> {
        let mut lines = self.lines.lock().await;
        // Input typed before this prompt belongs to an earlier transaction.
        while let Ok(stale) = lines.try_recv() {
            tracing::debug!(chars = stale.len(), "discarding input typed before the prompt");
        }
        eprint!("Enter OTP (within {}s): ", timeout.as_secs());
        lines.recv().await
    }
}
