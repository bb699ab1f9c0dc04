// src/utils/fs.rs
use std::fs::{File, OpenOptions};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, BufReader};
use tracing::debug;

use crate::error::{LeakerError, LeakerResult};

/// Line-oriented source of targets
pub type TargetReader = Box<dyn AsyncBufRead + Unpin + Send>;

/// How an already existing output file is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExistingFile {
    #[default]
    Refuse,
    Truncate,
    Append,
}

/// Check if the path points to a regular file
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

/// Determine whether stdin carries piped or redirected data.
///
/// Only a FIFO, a regular file or a socket counts. Character devices such as
/// a terminal or `/dev/null` never do.
#[cfg(unix)]
pub fn has_stdin() -> bool {
    use std::os::fd::AsFd;

    let Ok(fd) = std::io::stdin().as_fd().try_clone_to_owned() else {
        return false;
    };
    File::from(fd)
        .metadata()
        .map(|meta| is_piped(&meta.file_type()))
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn has_stdin() -> bool {
    use std::io::IsTerminal;
    !std::io::stdin().is_terminal()
}

#[cfg(unix)]
fn is_piped(file_type: &std::fs::FileType) -> bool {
    use std::os::unix::fs::FileTypeExt;
    file_type.is_fifo() || file_type.is_file() || file_type.is_socket()
}

/// Resolve where targets come from, reading stdin when `stdin` is set
pub fn open_targets(targets: Option<&str>, stdin: bool) -> LeakerResult<TargetReader> {
    let piped = stdin.then(|| Box::new(BufReader::new(tokio::io::stdin())) as TargetReader);
    select_targets(targets, piped)
}

/// Pick the target reader.
///
/// `piped` wins over the positional argument so redirected data is never
/// dropped. Otherwise the argument is opened as a file when one exists at that
/// path, and treated as a single literal line when not.
pub fn select_targets(targets: Option<&str>, piped: Option<TargetReader>) -> LeakerResult<TargetReader> {
    if let Some(reader) = piped {
        debug!("Reading targets from stdin");
        return Ok(reader);
    }

    match targets.filter(|t| !t.is_empty()) {
        Some(targets) if file_exists(Path::new(targets)) => {
            debug!("Reading targets from file {}", targets);
            let file = File::open(targets).map_err(|e| LeakerError::FileError {
                path: PathBuf::from(targets),
                message: e.to_string(),
            })?;
            Ok(Box::new(BufReader::new(tokio::fs::File::from_std(file))))
        }
        Some(targets) => Ok(Box::new(Cursor::new(targets.as_bytes().to_vec()))),
        None => Err(LeakerError::InvalidInput("no targets provided".to_string())),
    }
}

/// Open an output file, refusing to clobber an existing one unless told to
pub fn create_output_file(path: &Path, existing: ExistingFile) -> LeakerResult<File> {
    if path.as_os_str().is_empty() {
        return Err(LeakerError::InvalidInput("empty filename".to_string()));
    }

    if existing == ExistingFile::Refuse && file_exists(path) {
        return Err(LeakerError::FileExists(path.to_path_buf()));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| LeakerError::FileError {
                path: parent.to_path_buf(),
                message: format!("Failed to create directory: {}", e),
            })?;
        }
    }

    let mut options = OpenOptions::new();
    options.create(true).write(true);
    match existing {
        ExistingFile::Append => options.append(true),
        _ => options.truncate(true),
    };

    options.open(path).map_err(|e| LeakerError::FileError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use tokio::io::AsyncBufReadExt;

    #[tokio::test]
    async fn test_literal_target_is_single_line() {
        let mut reader = open_targets(Some("a@test.com"), false).unwrap();
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        assert_eq!(line, "a@test.com");
    }

    #[tokio::test]
    async fn test_file_target_is_read_line_by_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("targets.txt");
        std::fs::write(&path, "one@test.com\ntwo@test.com\n").unwrap();

        let reader = open_targets(path.to_str(), false).unwrap();
        let mut lines = reader.lines();
        let mut collected = Vec::new();
        while let Some(line) = lines.next_line().await.unwrap() {
            collected.push(line);
        }
        assert_eq!(collected, vec!["one@test.com", "two@test.com"]);
    }

    #[test]
    fn test_missing_targets_is_an_error() {
        assert!(matches!(open_targets(None, false), Err(LeakerError::InvalidInput(_))));
        assert!(matches!(open_targets(Some(""), false), Err(LeakerError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_piped_input_wins_over_argument() {
        let piped: TargetReader = Box::new(Cursor::new(b"piped@test.com\n".to_vec()));
        let mut reader = select_targets(Some("a@test.com"), Some(piped)).unwrap();

        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        assert_eq!(line, "piped@test.com\n");
        line.clear();
        assert_eq!(reader.read_line(&mut line).await.unwrap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_only_pipes_files_and_sockets_count_as_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("targets.txt");
        std::fs::write(&path, "a@test.com\n").unwrap();

        let null = std::fs::metadata("/dev/null").unwrap();
        assert!(!is_piped(&null.file_type()));
        let regular = std::fs::metadata(&path).unwrap();
        assert!(is_piped(&regular.file_type()));
        let directory = std::fs::metadata(dir.path()).unwrap();
        assert!(!is_piped(&directory.file_type()));
    }

    #[test]
    fn test_existing_output_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "previous\n").unwrap();

        let err = create_output_file(&path, ExistingFile::Refuse).unwrap_err();
        assert!(matches!(err, LeakerError::FileExists(_)));
    }

    #[test]
    fn test_truncate_and_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "previous\n").unwrap();

        let mut file = create_output_file(&path, ExistingFile::Append).unwrap();
        file.write_all(b"next\n").unwrap();
        drop(file);
        let mut content = String::new();
        File::open(&path).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "previous\nnext\n");

        let mut file = create_output_file(&path, ExistingFile::Truncate).unwrap();
        file.write_all(b"fresh\n").unwrap();
        drop(file);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh\n");
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("out.jsonl");

        create_output_file(&path, ExistingFile::Refuse).unwrap();
        assert!(path.is_file());
    }
}
