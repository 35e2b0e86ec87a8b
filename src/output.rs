//! Terminal output for outcomes and status lines.
//!
//! Lines are written from a dedicated blocking task so async code never waits on the
//! terminal. Stream locks are taken per line: the tracing subscriber shares stderr with
//! this writer and must be able to interleave with it.

use std::io::Write;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Output line routing for stdout/stderr writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum OutputLine {
    Stdout(String),
    Stderr(String),
}

pub(crate) struct OutputWriter {
    tx: mpsc::UnboundedSender<OutputLine>,
    handle: JoinHandle<()>,
}

impl OutputWriter {
    /// Writer bound to the process stdout and stderr.
    pub fn spawn() -> Self {
        Self::spawn_with(std::io::stdout(), std::io::stderr())
    }

    /// Writer bound to arbitrary sinks. Each line is one `writeln!` on the sink.
    pub fn spawn_with<O, E>(mut out: O, mut err: E) -> Self
    where
        O: Write + Send + 'static,
        E: Write + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
        let handle = tokio::task::spawn_blocking(move || {
            while let Some(line) = rx.blocking_recv() {
                let res = match line {
                    OutputLine::Stdout(msg) => writeln!(out, "{msg}").and_then(|_| out.flush()),
                    OutputLine::Stderr(msg) => writeln!(err, "{msg}"),
                };
                if let Err(e) = res {
                    // Reader went away; nothing left to write to.
                    if e.kind() == std::io::ErrorKind::BrokenPipe {
                        break;
                    }
                }
            }
        });
        Self { tx, handle }
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<OutputLine> {
        self.tx.clone()
    }

    /// Close this writer's sender and wait for queued lines to be written.
    ///
    /// Returns once every other sender handed out by `sender()` is dropped too.
    pub async fn finish(self) {
        drop(self.tx);
        let _ = self.handle.await;
    }
}
