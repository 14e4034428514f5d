use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// Capped ring of formatted tracing lines, shown as the console panel.
pub struct LogStore {
    lines: VecDeque<String>,
    max_lines: usize,
    written: u64,
}

impl LogStore {
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines: max_lines.max(1),
            written: 0,
        }
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        let line = line.into();
        if line.is_empty() {
            return;
        }
        self.lines.push_back(line);
        self.written = self.written.wrapping_add(1);
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines accepted so far, including evicted ones.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Up to `max` lines ending `scroll` lines before the newest, oldest first.
    pub fn window(&self, scroll: usize, max: usize) -> Vec<String> {
        let end = self.lines.len().saturating_sub(scroll);
        let start = end.saturating_sub(max);
        self.lines.range(start..end).cloned().collect()
    }
}

pub type SharedLogStore = Arc<Mutex<LogStore>>;

#[derive(Clone)]
pub struct LogMakeWriter {
    store: SharedLogStore,
}

impl LogMakeWriter {
    pub fn new(store: SharedLogStore) -> Self {
        Self { store }
    }
}

impl<'a> MakeWriter<'a> for LogMakeWriter {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            store: self.store.clone(),
            partial: String::new(),
        }
    }
}

/// Splits writes on newlines; a trailing partial line is flushed on drop.
pub struct LogWriter {
    store: SharedLogStore,
    partial: String,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.partial.push_str(&String::from_utf8_lossy(buf));
        while let Some(idx) = self.partial.find('\n') {
            let line = self.partial[..idx].trim_end_matches('\r').to_string();
            self.partial.drain(..=idx);
            self.store.lock().push_line(line);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let line = self.partial.trim().to_string();
        if !line.is_empty() {
            self.store.lock().push_line(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LogMakeWriter, LogStore};
    use parking_lot::Mutex;
    use std::io::Write;
    use std::sync::Arc;
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn store_keeps_newest_lines() {
        let mut store = LogStore::new(3);
        for n in 0..5 {
            store.push_line(format!("line {n}"));
        }
        store.push_line("");
        assert_eq!(store.len(), 3);
        assert_eq!(store.written(), 5);
        assert_eq!(store.window(0, 10), vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn window_scrolls_back_from_the_newest_line() {
        let mut store = LogStore::new(10);
        for n in 0..6 {
            store.push_line(n.to_string());
        }
        assert_eq!(store.window(0, 2), vec!["4", "5"]);
        assert_eq!(store.window(2, 2), vec!["2", "3"]);
        assert_eq!(store.window(5, 3), vec!["0"]);
        assert!(store.window(9, 3).is_empty());
    }

    #[test]
    fn writer_splits_lines_and_flushes_partial_on_drop() {
        let store = Arc::new(Mutex::new(LogStore::new(10)));
        let make = LogMakeWriter::new(store.clone());
        {
            let mut writer = make.make_writer();
            writer.write_all(b"first\r\nsec").unwrap();
            writer.write_all(b"ond\n\ntail").unwrap();
        }
        assert_eq!(store.lock().window(0, 10), vec!["first", "second", "tail"]);
    }
}
