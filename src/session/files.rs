//! File intake and download delivery.
//!
//! Files come in through an explicit open or a drop and are read on a
//! background thread; the result is picked up by polling from the event
//! loop. Saved and exported documents leave through a [`DownloadSink`].

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use anyhow::{Context, Result};

/// Name suffixes accepted for open and drop. Case-sensitive.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[".md", ".markdown", ".txt"];

pub const MARKDOWN_MEDIA_TYPE: &str = "text/markdown";
pub const SAVE_CONTENT_TYPE: &str = MARKDOWN_MEDIA_TYPE;
pub const EXPORT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// A file offered by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingFile {
    /// Bare file name, used as the document name.
    pub name: String,
    /// Declared media type, if the source provided one.
    pub media_type: Option<String>,
    pub path: PathBuf,
}

impl IncomingFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            name,
            media_type: None,
            path,
        }
    }

    #[must_use]
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Markdown or plain text, by declared type or name suffix.
    pub fn is_accepted(&self) -> bool {
        self.media_type.as_deref() == Some(MARKDOWN_MEDIA_TYPE)
            || ACCEPTED_EXTENSIONS
                .iter()
                .any(|ext| self.name.ends_with(ext))
    }
}

/// Completion of a background read.
#[derive(Debug)]
pub struct FileRead {
    pub file: IncomingFile,
    pub result: std::io::Result<String>,
}

/// Reads one file at a time off the event loop.
///
/// Starting a new read supersedes the previous one; a superseded result is
/// never delivered.
#[derive(Debug, Default)]
pub struct FileReader {
    rx: Option<Receiver<FileRead>>,
}

impl FileReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, file: IncomingFile) {
        let (tx, rx) = mpsc::channel();
        self.rx = Some(rx);
        std::thread::spawn(move || {
            let result = fs::read(&file.path).map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
            let _ = tx.send(FileRead { file, result });
        });
    }

    pub const fn is_busy(&self) -> bool {
        self.rx.is_some()
    }

    /// Non-blocking check for a finished read.
    pub fn poll(&mut self) -> Option<FileRead> {
        let read = self.rx.as_ref()?.try_recv();
        self.finish(read.map_err(|err| match err {
            mpsc::TryRecvError::Empty => RecvTimeoutError::Timeout,
            mpsc::TryRecvError::Disconnected => RecvTimeoutError::Disconnected,
        }))
    }

    /// Block up to `timeout` for the pending read.
    pub fn wait(&mut self, timeout: Duration) -> Option<FileRead> {
        let read = self.rx.as_ref()?.recv_timeout(timeout);
        self.finish(read)
    }

    fn finish(&mut self, read: std::result::Result<FileRead, RecvTimeoutError>) -> Option<FileRead> {
        match read {
            Ok(read) => {
                self.rx = None;
                Some(read)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.rx = None;
                None
            }
        }
    }
}

/// A document handed to the user as a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub content_type: &'static str,
    pub contents: String,
}

/// Where downloads are delivered.
pub trait DownloadSink {
    /// Deliver `download`, returning where it ended up.
    ///
    /// # Errors
    ///
    /// Returns an error if the download could not be written.
    fn deliver(&mut self, download: &Download) -> Result<PathBuf>;
}

/// Writes downloads into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&mut self, download: &Download) -> Result<PathBuf> {
        // Only the final component, so a stored name cannot escape the directory.
        let name = Path::new(&download.file_name)
            .file_name()
            .with_context(|| format!("Invalid file name {:?}", download.file_name))?;
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.dir.join(name);
        fs::write(&path, &download.contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// Keeps downloads in memory. Clones share the list.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    downloads: Rc<RefCell<Vec<Download>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downloads(&self) -> Vec<Download> {
        self.downloads.borrow().clone()
    }

    pub fn last(&self) -> Option<Download> {
        self.downloads.borrow().last().cloned()
    }
}

impl DownloadSink for MemorySink {
    fn deliver(&mut self, download: &Download) -> Result<PathBuf> {
        self.downloads.borrow_mut().push(download.clone());
        Ok(PathBuf::from(&download.file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_accepts_markdown_and_text_names() {
        for name in ["a.md", "b.markdown", "c.txt", "dir/d.md"] {
            assert!(IncomingFile::from_path(name).is_accepted(), "{name}");
        }
    }

    #[test]
    fn test_rejects_other_names() {
        for name in ["image.png", "notes.MD", "md", "archive.md.zip"] {
            assert!(!IncomingFile::from_path(name).is_accepted(), "{name}");
        }
    }

    #[test]
    fn test_accepts_declared_markdown_type() {
        let file = IncomingFile::from_path("README").with_media_type("text/markdown");
        assert!(file.is_accepted());
        let other = IncomingFile::from_path("README").with_media_type("text/plain");
        assert!(!other.is_accepted());
    }

    #[test]
    fn test_reader_reads_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.md");
        fs::write(&path, "# Hi\r\nthere\n").unwrap();

        let mut reader = FileReader::new();
        reader.start(IncomingFile::from_path(&path));
        assert!(reader.is_busy());
        let read = reader.wait(WAIT).unwrap();
        assert_eq!(read.file.name, "doc.md");
        assert_eq!(read.result.unwrap(), "# Hi\r\nthere\n");
        assert!(!reader.is_busy());
    }

    #[test]
    fn test_reader_reports_missing_file() {
        let dir = tempdir().unwrap();
        let mut reader = FileReader::new();
        reader.start(IncomingFile::from_path(dir.path().join("gone.md")));
        let read = reader.wait(WAIT).unwrap();
        assert!(read.result.is_err());
    }

    #[test]
    fn test_new_read_supersedes_old() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.md");
        let second = dir.path().join("second.md");
        fs::write(&first, "one").unwrap();
        fs::write(&second, "two").unwrap();

        let mut reader = FileReader::new();
        reader.start(IncomingFile::from_path(&first));
        reader.start(IncomingFile::from_path(&second));
        let read = reader.wait(WAIT).unwrap();
        assert_eq!(read.file.name, "second.md");
        assert!(reader.poll().is_none());
    }

    #[test]
    fn test_idle_reader_polls_nothing() {
        let mut reader = FileReader::new();
        assert!(reader.poll().is_none());
        assert!(reader.wait(Duration::from_millis(1)).is_none());
    }

    #[test]
    fn test_directory_sink_writes_file() {
        let dir = tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path().join("out"));
        let path = sink
            .deliver(&Download {
                file_name: "notes.md".to_string(),
                content_type: SAVE_CONTENT_TYPE,
                contents: "body".to_string(),
            })
            .unwrap();
        assert_eq!(path, dir.path().join("out").join("notes.md"));
        assert_eq!(fs::read_to_string(path).unwrap(), "body");
    }

    #[test]
    fn test_directory_sink_strips_directories_from_name() {
        let dir = tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        let path = sink
            .deliver(&Download {
                file_name: "../escape.md".to_string(),
                content_type: SAVE_CONTENT_TYPE,
                contents: String::new(),
            })
            .unwrap();
        assert_eq!(path, dir.path().join("escape.md"));
    }

    #[test]
    fn test_memory_sink_clones_share_downloads() {
        let sink = MemorySink::new();
        let mut handle = sink.clone();
        handle
            .deliver(&Download {
                file_name: "a.html".to_string(),
                content_type: EXPORT_CONTENT_TYPE,
                contents: "<html>".to_string(),
            })
            .unwrap();
        assert_eq!(sink.downloads().len(), 1);
        assert_eq!(sink.last().unwrap().content_type, "text/html; charset=utf-8");
    }
}
