use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// Shared, replaceable text sink for a session's console output.
///
/// Clones share the same underlying writer; [`OutputSink::replace`] redirects
/// every clone at once.
#[derive(Clone)]
pub struct OutputSink {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl OutputSink {
    /// Wraps `writer`.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Sink writing to the process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Swaps the underlying writer for every clone of this sink.
    pub fn replace(&self, writer: impl Write + Send + 'static) {
        *self.inner.lock() = Box::new(writer);
    }

    /// Writes `text` and flushes.
    pub fn write_str(&self, text: &str) -> io::Result<()> {
        let mut writer = self.inner.lock();
        writer.write_all(text.as_bytes())?;
        writer.flush()
    }
}

impl Default for OutputSink {
    fn default() -> Self {
        Self::stdout()
    }
}

impl fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSink").finish_non_exhaustive()
    }
}
