//! Masking writer for the `tracing` fmt layer.
//!
//! Every formatted log line passes through secret substitution before it
//! reaches the terminal. The writer holds the secrets sorted longest-first
//! so replacement order is fixed once at startup.

use crate::masking::mask_sorted;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// `MakeWriter` that masks secrets on the way to stderr.
///
/// ```no_run
/// use std::collections::BTreeSet;
/// use toolgate_observability::MaskingMakeWriter;
///
/// let secrets = BTreeSet::from(["ghp_abc123".to_string()]);
/// tracing_subscriber::fmt()
///     .with_writer(MaskingMakeWriter::new(secrets))
///     .init();
/// ```
#[derive(Clone)]
pub struct MaskingMakeWriter {
    secrets: Arc<Vec<String>>,
}

impl MaskingMakeWriter {
    pub fn new(secrets: BTreeSet<String>) -> Self {
        let mut sorted: Vec<String> = secrets.into_iter().collect();
        sorted.sort_by_key(|s| std::cmp::Reverse(s.len()));
        Self {
            secrets: Arc::new(sorted),
        }
    }
}

impl<'a> MakeWriter<'a> for MaskingMakeWriter {
    type Writer = MaskingWriter<io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        MaskingWriter {
            secrets: Arc::clone(&self.secrets),
            inner: io::stderr(),
        }
    }
}

/// Writer wrapper that substitutes secrets in each chunk.
pub struct MaskingWriter<W: Write> {
    secrets: Arc<Vec<String>>,
    inner: W,
}

impl<W: Write> MaskingWriter<W> {
    pub fn wrap(inner: W, secrets: Arc<Vec<String>>) -> Self {
        Self { secrets, inner }
    }
}

impl<W: Write> Write for MaskingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // The fmt layer hands over whole formatted records, so chunk-level
        // substitution cannot split a secret.
        let text = String::from_utf8_lossy(buf);
        let masked = mask_sorted(&text, &self.secrets);
        self.inner.write_all(masked.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
