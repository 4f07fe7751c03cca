//! Human-facing progress output.
//!
//! Nothing here is a machine interface; write failures are ignored.

use crossterm::QueueableCommand;
use crossterm::terminal::{self, Clear, ClearType};
use parking_lot::Mutex;
use std::io::{IsTerminal, Write, stdout};
use std::sync::Arc;

/// Used when the terminal size cannot be queried (e.g. output is piped).
const FALLBACK_COLUMNS: u16 = 80;

pub type ProgressHandle = Arc<dyn Progress>;

pub trait Progress: Send + Sync {
    /// A cache miss started downloading `url` into `path`.
    fn caching(&self, url: &str, path: &str);
    /// The batch is complete.
    fn finish(&self);
}

/// Single overwritten status line on the terminal.
///
/// Each download replaces the previous line; [`finish()`](Progress::finish)
/// blanks the line across the full terminal width.
pub struct TerminalProgress {
    writer: Mutex<Box<dyn Write + Send>>,
    columns: Option<u16>,
    /// Emit the clear-line escape; only on an interactive terminal.
    clear: bool,
}

impl TerminalProgress {
    pub fn new() -> Self {
        let clear = stdout().is_terminal();
        Self { clear, ..Self::with_writer(stdout()) }
    }

    /// Write to `writer` instead of stdout.
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self { writer: Mutex::new(Box::new(writer)), columns: None, clear: false }
    }

    /// Pin the width used by the closing blank line.
    pub fn with_columns(mut self, columns: u16) -> Self {
        self.columns = Some(columns);
        self
    }

    fn columns(&self) -> u16 {
        self.columns
            .or_else(|| terminal::size().ok().map(|(columns, _)| columns))
            .filter(|columns| *columns > 0)
            .unwrap_or(FALLBACK_COLUMNS)
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for TerminalProgress {
    fn caching(&self, url: &str, path: &str) {
        let mut writer = self.writer.lock();
        if self.clear {
            writer.queue(Clear(ClearType::CurrentLine)).ok();
        }
        write!(writer, "Caching {url} in {path}\r").ok();
        writer.flush().ok();
    }

    fn finish(&self) {
        let blank = " ".repeat(usize::from(self.columns()));
        let mut writer = self.writer.lock();
        write!(writer, "{blank}\r").ok();
        writer.flush().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn caching_line_is_overwritten_in_place() {
        let buffer = Buffer::default();
        let progress = TerminalProgress::with_writer(buffer.clone());
        progress.caching("https://x.test/a.png", "/cache/a.png");
        assert_eq!(buffer.text(), "Caching https://x.test/a.png in /cache/a.png\r");
    }

    #[test]
    fn redirected_output_has_no_escapes() {
        let buffer = Buffer::default();
        let progress = TerminalProgress::with_writer(buffer.clone()).with_columns(4);
        progress.caching("https://x.test/a.png", "/cache/a.png");
        progress.caching("https://x.test/b.png", "/cache/b.png");
        progress.finish();
        let text = buffer.text();
        assert!(!text.contains('\x1b'), "{text:?}");
        assert_eq!(text, "Caching https://x.test/a.png in /cache/a.png\rCaching https://x.test/b.png in /cache/b.png\r    \r");
    }

    #[test]
    fn finish_blanks_the_terminal_width() {
        let buffer = Buffer::default();
        let progress = TerminalProgress::with_writer(buffer.clone()).with_columns(12);
        progress.finish();
        assert_eq!(buffer.text(), format!("{}\r", " ".repeat(12)));
    }
}
