//! Waypoint sources: where trace lines come from.
//!
//! A [`WaypointSource`] is a reopenable factory; each [`WaypointSource::open`]
//! yields a fresh [`WaypointReader`], a lazy single-pass sequence of raw
//! lines in file order. Playback restarts by reopening, never by rewinding a
//! reader. Readers own their backing resource exclusively and release it via
//! an idempotent [`WaypointReader::close`], with `Drop` as a backstop.

use crate::{PlaybackError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

/// A reopenable origin of waypoint trace lines.
///
/// Opening fails with [`PlaybackError::SourceUnavailable`] when the backing
/// resource cannot be located or read; that is a caller configuration error,
/// reported rather than retried.
pub trait WaypointSource: Send + Sync + 'static {
    type Reader: WaypointReader;

    /// Open a fresh single-pass reader positioned at the first line.
    fn open(&self) -> Result<Self::Reader>;
}

/// An open handle producing raw trace lines.
pub trait WaypointReader: Send + 'static {
    /// Get the next raw line.
    ///
    /// Returns:
    /// - `Ok(Some(line))` - next line, in source order
    /// - `Ok(None)` - end of source (normal termination), or already closed
    /// - `Err(e)` - mid-stream read failure
    fn next_line(&mut self) -> Result<Option<String>>;

    /// Release the backing resource.
    ///
    /// Idempotent: safe to call repeatedly and after a read failure.
    fn close(&mut self);
}

/// File-backed waypoint source.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Create a source for the given trace file path.
    ///
    /// The file is not touched until [`WaypointSource::open`].
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    /// Path of the backing trace file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WaypointSource for FileSource {
    type Reader = FileReader;

    fn open(&self) -> Result<FileReader> {
        let file = File::open(&self.path)
            .map_err(|e| PlaybackError::source_unavailable(self.path.clone(), e))?;
        Ok(FileReader { lines: Some(BufReader::new(file).lines()), line: 0 })
    }
}

/// Open handle over a trace file.
#[derive(Debug)]
pub struct FileReader {
    /// `None` once closed; reads after close report end-of-source.
    lines: Option<Lines<BufReader<File>>>,
    line: u64,
}

impl WaypointReader for FileReader {
    fn next_line(&mut self) -> Result<Option<String>> {
        let Some(lines) = self.lines.as_mut() else {
            return Ok(None);
        };
        match lines.next() {
            Some(Ok(line)) => {
                self.line += 1;
                Ok(Some(line))
            }
            Some(Err(e)) => Err(PlaybackError::read_failure(self.line + 1, e)),
            None => Ok(None),
        }
    }

    fn close(&mut self) {
        // Dropping the buffered reader closes the file
        self.lines.take();
    }
}

impl Drop for FileReader {
    fn drop(&mut self) {
        self.close();
    }
}

/// In-memory waypoint source for tests and programmatically scripted traces.
pub struct MemorySource {
    trace: String,
}

impl MemorySource {
    pub fn new(trace: impl Into<String>) -> Self {
        Self { trace: trace.into() }
    }
}

impl WaypointSource for MemorySource {
    type Reader = MemoryReader;

    fn open(&self) -> Result<MemoryReader> {
        Ok(MemoryReader {
            lines: self.trace.lines().map(str::to_owned).collect(),
            position: 0,
            closed: false,
        })
    }
}

/// Open handle over an in-memory trace.
pub struct MemoryReader {
    lines: Vec<String>,
    position: usize,
    closed: bool,
}

impl WaypointReader for MemoryReader {
    fn next_line(&mut self) -> Result<Option<String>> {
        if self.closed || self.position >= self.lines.len() {
            return Ok(None);
        }
        let line = self.lines[self.position].clone();
        self.position += 1;
        Ok(Some(line))
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_source_reads_lines_in_order() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp trace");
        writeln!(file, "# header").unwrap();
        writeln!(file, "1|2.0|3.0").unwrap();
        writeln!(file, "0|4.0|5.0").unwrap();

        let source = FileSource::new(file.path());
        let mut reader = source.open().expect("open trace");

        assert_eq!(reader.next_line().unwrap().as_deref(), Some("# header"));
        assert_eq!(reader.next_line().unwrap().as_deref(), Some("1|2.0|3.0"));
        assert_eq!(reader.next_line().unwrap().as_deref(), Some("0|4.0|5.0"));
        assert_eq!(reader.next_line().unwrap(), None);
        // End-of-source is sticky
        assert_eq!(reader.next_line().unwrap(), None);
    }

    #[test]
    fn file_source_missing_path_is_source_unavailable() {
        let source = FileSource::new("/definitely/not/a/real/trace.txt");
        match source.open() {
            Err(PlaybackError::SourceUnavailable { path, .. }) => {
                assert_eq!(path, PathBuf::from("/definitely/not/a/real/trace.txt"));
            }
            other => panic!("expected SourceUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn file_reader_close_is_idempotent() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp trace");
        writeln!(file, "1|2.0|3.0").unwrap();

        let mut reader = FileSource::new(file.path()).open().expect("open trace");
        reader.close();
        reader.close();
        // Reads after close report end-of-source, not an error
        assert_eq!(reader.next_line().unwrap(), None);
    }

    #[test]
    fn reopening_restarts_from_the_top() {
        let source = MemorySource::new("1|2.0|3.0\n0|4.0|5.0");

        let mut first = source.open().unwrap();
        assert_eq!(first.next_line().unwrap().as_deref(), Some("1|2.0|3.0"));

        let mut second = source.open().unwrap();
        assert_eq!(second.next_line().unwrap().as_deref(), Some("1|2.0|3.0"));
    }

    #[test]
    fn memory_reader_close_stops_reads() {
        let source = MemorySource::new("1|2.0|3.0");
        let mut reader = source.open().unwrap();
        reader.close();
        reader.close();
        assert_eq!(reader.next_line().unwrap(), None);
    }
}
