use crate::feed::envelope::decode_envelope;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::info;
use tradewatch_domain::events::feed_event::FeedEvent;
use tradewatch_domain::repositories::feed_stream::{FeedStream, StreamError};

/// Recorded feed: one envelope per line, `#` comments and blank lines ignored.
#[derive(Debug)]
pub struct ReplayFeedStream<R> {
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
    delay: Option<Duration>,
    delivered: u64,
}

impl ReplayFeedStream<BufReader<File>> {
    pub fn open(path: &Path, delay: Option<Duration>) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|err| format!("failed to open replay {}: {}", path.display(), err))?;
        info!(path = %path.display(), "replaying feed");
        Ok(Self::from_reader(BufReader::new(file), delay))
    }
}

impl<R: BufRead> ReplayFeedStream<R> {
    pub fn from_reader(reader: R, delay: Option<Duration>) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_no: 0,
            delay: delay.filter(|d| !d.is_zero()),
            delivered: 0,
        }
    }
}

impl<R: BufRead> FeedStream for ReplayFeedStream<R> {
    fn next_event(&mut self) -> Result<Option<FeedEvent>, StreamError> {
        loop {
            self.buf.clear();
            let read = self.reader.read_until(b'\n', &mut self.buf).map_err(|e| {
                StreamError::Protocol(format!(
                    "replay read failed at line {}: {e}",
                    self.line_no + 1
                ))
            })?;
            if read == 0 {
                return Err(StreamError::Exhausted);
            }
            self.line_no += 1;
            // An undecodable line is a bad frame; the recording itself is still readable.
            let line = std::str::from_utf8(&self.buf).map_err(|e| {
                StreamError::InvalidData(format!("line {}: not valid UTF-8: {e}", self.line_no))
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let decoded = decode_envelope(trimmed).map_err(|err| match err {
                StreamError::InvalidData(msg) => {
                    StreamError::InvalidData(format!("line {}: {msg}", self.line_no))
                }
                other => other,
            })?;
            let Some(event) = decoded else {
                continue;
            };

            if let Some(delay) = self.delay {
                if self.delivered > 0 {
                    thread::sleep(delay);
                }
            }
            self.delivered += 1;
            return Ok(Some(event));
        }
    }

    fn request_balance(&mut self) -> Result<(), StreamError> {
        // Recordings are read-only.
        Ok(())
    }
}
