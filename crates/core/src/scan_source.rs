//! Feeding scanned strings into the scanner from an external reader.

use std::io::BufRead;
use std::sync::Arc;

use futures::{pin_mut, Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::verify::OwnerVerifier;
use crate::workflow::Scanner;

/// Lines buffered between the reader thread and the scanner.
const LINE_BUFFER: usize = 16;

/// Lines of the process's stdin as a stream of scanned strings.
pub fn stdin_lines() -> impl Stream<Item = String> {
    blocking_lines(std::io::BufReader::new(std::io::stdin()))
}

/// Read lines on a dedicated thread and hand them over as a stream.
///
/// The thread is never joined. A read blocked on it does not keep the
/// runtime from shutting down, and it exits once the stream is dropped and
/// the next line arrives. A read error ends the stream.
pub fn blocking_lines<R>(reader: R) -> impl Stream<Item = String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(LINE_BUFFER);

    let spawned = std::thread::Builder::new()
        .name("scan-source".to_string())
        .spawn(move || {
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Scan source read failed");
                        break;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "Failed to start scan source reader");
    }

    futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|line| (line, rx))
    })
}

/// Hand each item of `scans` to the scanner, one at a time, until the stream ends.
///
/// Blank items are skipped. Returns the number of scans handed over.
pub async fn run_scan_source<S>(
    scanner: Arc<Scanner>,
    scans: S,
    verifier: Arc<dyn OwnerVerifier>,
) -> usize
where
    S: Stream<Item = String>,
{
    pin_mut!(scans);
    let mut handled = 0;

    while let Some(text) = scans.next().await {
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let outcome = scanner.handle_scan(text, verifier.as_ref()).await;
        debug!(?outcome, "Scan source item handled");
        handled += 1;
    }

    info!(handled, "Scan source ended");
    handled
}
