//! FIFO speech source
//!
//! Speech-to-text runs in a separate process that writes one recognised
//! utterance per line into a named pipe. This source reads those lines
//! during a recognition window and reports the window's end when the
//! conductor stops it.
//!
//! ```text
//! some-recogniser --lang ru > "$XDG_RUNTIME_DIR/murmur/speech.fifo"
//! ```

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;

use murmur_core::{SpeechEvent, SpeechSource};

/// Lines buffered between the pipe reader and the conductor
const LINE_BUFFER: usize = 64;

/// Reads utterances from a named pipe
pub struct FifoSpeechSource {
    path: Option<PathBuf>,
    lines: Option<mpsc::Receiver<String>>,
    reader: Option<JoinHandle<()>>,
    active: bool,
    window_ended: bool,
}

impl FifoSpeechSource {
    /// Create a source for the given pipe path; nothing is opened yet
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            lines: None,
            reader: None,
            active: false,
            window_ended: false,
        }
    }

    /// Pipe path, if one is configured
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether a recognition window is open
    pub fn is_active(&self) -> bool {
        self.active
    }

    fn open(&mut self, path: &Path) -> anyhow::Result<()> {
        ensure_fifo(path)?;
        let handle = tokio::runtime::Handle::try_current()
            .context("speech FIFO needs a tokio runtime")?;

        // Opening read-write keeps the pipe alive between writers, so a
        // recogniser restarting does not end the stream with EOF
        let receiver = tokio::net::unix::pipe::OpenOptions::new()
            .read_write(true)
            .open_receiver(path)
            .with_context(|| format!("opening speech FIFO {}", path.display()))?;

        let (tx, rx) = mpsc::channel(LINE_BUFFER);
        let display_path = path.display().to_string();

        self.reader = Some(handle.spawn(async move {
            let mut lines = LinesStream::new(BufReader::new(receiver).lines());
            while let Some(line) = lines.next().await {
                match line {
                    Ok(line) => {
                        if tx.send(line).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(path = %display_path, error = %e, "Speech FIFO read failed");
                        break;
                    }
                }
            }
            tracing::debug!(path = %display_path, "Speech FIFO reader finished");
        }));
        self.lines = Some(rx);
        tracing::info!(path = %path.display(), "Listening for speech on FIFO");
        Ok(())
    }
}

impl SpeechSource for FifoSpeechSource {
    fn start(&mut self) -> anyhow::Result<()> {
        let Some(path) = self.path.clone() else {
            bail!("no speech FIFO configured");
        };
        if self.lines.is_none() {
            self.open(&path)?;
        }
        self.window_ended = false;
        self.active = true;
        Ok(())
    }

    fn stop(&mut self) {
        if self.active {
            self.active = false;
            self.window_ended = true;
        }
    }

    fn try_next(&mut self) -> Option<SpeechEvent> {
        if self.active {
            let lines = self.lines.as_mut()?;
            return lines.try_recv().ok().map(SpeechEvent::Result);
        }
        if self.window_ended {
            self.window_ended = false;
            return Some(SpeechEvent::WindowEnded);
        }
        None
    }
}

impl Drop for FifoSpeechSource {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

/// Create the pipe (and its directory) unless it already exists
///
/// # Errors
///
/// Fails if the path exists but is not a FIFO, or if `mkfifo` fails.
pub fn ensure_fifo(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    match std::fs::metadata(path) {
        Ok(meta) if meta.file_type().is_fifo() => return Ok(()),
        Ok(_) => bail!("{} exists and is not a FIFO", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e).with_context(|| format!("inspecting {}", path.display())),
    }

    let c_path = CString::new(path.as_os_str().as_bytes())
        .with_context(|| format!("invalid FIFO path {}", path.display()))?;
    // SAFETY: c_path is a valid NUL-terminated string that outlives the call
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), 0o600) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error())
            .with_context(|| format!("mkfifo {}", path.display()));
    }
    tracing::debug!(path = %path.display(), "Created speech FIFO");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_without_path_fails() {
        let mut source = FifoSpeechSource::new(None);
        assert!(source.path().is_none());
        assert!(source.start().is_err());
        assert!(!source.is_active());
    }

    #[test]
    fn test_path_is_kept() {
        let source = FifoSpeechSource::new(Some(PathBuf::from("/run/user/1000/murmur/speech.fifo")));
        assert_eq!(
            source.path(),
            Some(Path::new("/run/user/1000/murmur/speech.fifo"))
        );
    }

    #[test]
    fn test_ensure_fifo_creates_pipe() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("speech.fifo");

        ensure_fifo(&path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().file_type().is_fifo());

        // Second call finds the existing pipe
        ensure_fifo(&path).unwrap();
    }

    #[test]
    fn test_ensure_fifo_rejects_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speech.fifo");
        std::fs::write(&path, b"not a pipe").unwrap();

        assert!(ensure_fifo(&path).is_err());
    }
}
