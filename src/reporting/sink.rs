// src/reporting/sink.rs
use std::fmt;
use std::io;
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::LeakerResult;
use crate::utils::{fs::create_output_file, ExistingFile};

/// An output destination receiving one formatted line per finding
pub struct ResultSink {
    label: String,
    writer: Box<dyn AsyncWrite + Unpin + Send>,
}

impl ResultSink {
    /// Wrap any async writer, e.g. an in-memory buffer
    pub fn from_writer(label: impl Into<String>, writer: impl AsyncWrite + Unpin + Send + 'static) -> Self {
        Self {
            label: label.into(),
            writer: Box::new(writer),
        }
    }

    /// Standard output
    pub fn stdout() -> Self {
        Self::from_writer("stdout", tokio::io::stdout())
    }

    /// A file, opened according to `existing`
    pub fn file(path: &Path, existing: ExistingFile) -> LeakerResult<Self> {
        let file = create_output_file(path, existing)?;
        Ok(Self::from_writer(path.display().to_string(), tokio::fs::File::from_std(file)))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Append one line and flush it through
    pub async fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');

        self.writer.write_all(buf.as_bytes()).await?;
        self.writer.flush().await
    }
}

impl fmt::Debug for ResultSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSink").field("label", &self.label).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_sink_writes_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");

        let mut sink = ResultSink::file(&path, ExistingFile::Refuse).unwrap();
        sink.write_line("first").await.unwrap();
        sink.write_line("second").await.unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
        assert_eq!(sink.label(), path.display().to_string());
    }

    #[tokio::test]
    async fn test_file_sink_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "previous\n").unwrap();

        let mut sink = ResultSink::file(&path, ExistingFile::Append).unwrap();
        sink.write_line("next").await.unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "previous\nnext\n");
    }

    #[test]
    fn test_file_sink_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "keep").unwrap();

        assert!(ResultSink::file(&path, ExistingFile::Refuse).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep");
    }
}
