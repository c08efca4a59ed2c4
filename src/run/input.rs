//! Command input.
//!
//! Lines are read on a dedicated OS thread: a blocking stdin read must not
//! hold a runtime worker, and an unjoined thread does not delay exit.

use std::io::{BufRead, BufReader};
use std::thread;

use log::{error, warn};
use tokio::sync::mpsc;

const INPUT_BUFFER: usize = 16;

/// Reads standard input line by line.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    spawn_line_reader(BufReader::new(std::io::stdin()))
}

/// Forwards every line of `reader` to the returned channel.
///
/// The channel closes at end of input, on a read error, or if the
/// reader thread cannot be started.
pub fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(INPUT_BUFFER);
    let spawned = thread::Builder::new()
        .name("command-input".into())
        .spawn(move || {
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to read command input: {}", e);
                        break;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        error!("Failed to start command input thread: {}", e);
    }
    rx
}
