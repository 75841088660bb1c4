use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{ResourceError, Result};
use crate::mode::AccessMode;

/// Default buffer capacity for buffered file resources: 64 KiB.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// A file opened from a path, buffered for the direction it was opened in.
///
/// Read-only files sit behind a `BufReader` and carry a sequential-access
/// hint, write-only files sit behind a `BufWriter` positioned at the end of
/// the file, and read-write files are left unbuffered so that interleaved
/// reads and writes always agree on the file position.
pub struct FileResource {
    inner: FileResourceInner,
}

enum FileResourceInner {
    Reader(BufReader<File>),
    Writer(BufWriter<File>),
    ReadWrite(File),
}

impl FileResource {
    /// Open `path` for the given access mode.
    ///
    /// Write-capable modes create the file when missing; existing contents
    /// are never truncated.
    pub fn open(path: impl AsRef<Path>, mode: AccessMode, buffer_size: usize) -> Result<Self> {
        let path = path.as_ref();
        let open_err = |source| ResourceError::Open {
            path: path.to_path_buf(),
            source,
        };

        let inner = match mode {
            AccessMode::ReadOnly => {
                let file = OpenOptions::new().read(true).open(path).map_err(open_err)?;
                advise_sequential(&file);
                FileResourceInner::Reader(BufReader::with_capacity(buffer_size, file))
            }
            AccessMode::WriteOnly => {
                let mut file = OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(path)
                    .map_err(open_err)?;
                file.seek(SeekFrom::End(0)).map_err(open_err)?;
                FileResourceInner::Writer(BufWriter::with_capacity(buffer_size, file))
            }
            AccessMode::ReadAndWrite => {
                let file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(path)
                    .map_err(open_err)?;
                FileResourceInner::ReadWrite(file)
            }
        };

        debug!(?path, %mode, buffer_size, "opened document file");
        Ok(Self { inner })
    }

    /// The access mode this resource was opened in.
    pub fn mode(&self) -> AccessMode {
        match &self.inner {
            FileResourceInner::Reader(_) => AccessMode::ReadOnly,
            FileResourceInner::Writer(_) => AccessMode::WriteOnly,
            FileResourceInner::ReadWrite(_) => AccessMode::ReadAndWrite,
        }
    }

    /// Borrow the underlying file.
    pub fn file(&self) -> &File {
        match &self.inner {
            FileResourceInner::Reader(reader) => reader.get_ref(),
            FileResourceInner::Writer(writer) => writer.get_ref(),
            FileResourceInner::ReadWrite(file) => file,
        }
    }
}

impl Read for FileResource {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            FileResourceInner::Reader(reader) => reader.read(buf),
            FileResourceInner::ReadWrite(file) => file.read(buf),
            FileResourceInner::Writer(_) => Err(std::io::Error::new(
                ErrorKind::Unsupported,
                "file resource was opened write-only",
            )),
        }
    }
}

impl Write for FileResource {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            FileResourceInner::Writer(writer) => writer.write(buf),
            FileResourceInner::ReadWrite(file) => file.write(buf),
            FileResourceInner::Reader(_) => Err(std::io::Error::new(
                ErrorKind::Unsupported,
                "file resource was opened read-only",
            )),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            FileResourceInner::Writer(writer) => writer.flush(),
            FileResourceInner::ReadWrite(file) => file.flush(),
            FileResourceInner::Reader(_) => Ok(()),
        }
    }
}

impl Seek for FileResource {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        match &mut self.inner {
            FileResourceInner::Reader(reader) => reader.seek(pos),
            FileResourceInner::Writer(writer) => writer.seek(pos),
            FileResourceInner::ReadWrite(file) => file.seek(pos),
        }
    }

    fn stream_position(&mut self) -> std::io::Result<u64> {
        match &mut self.inner {
            FileResourceInner::Reader(reader) => reader.stream_position(),
            FileResourceInner::Writer(writer) => writer.stream_position(),
            FileResourceInner::ReadWrite(file) => file.stream_position(),
        }
    }
}

impl std::fmt::Debug for FileResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileResource")
            .field("mode", &self.mode())
            .finish()
    }
}

#[cfg(target_os = "linux")]
fn advise_sequential(file: &File) {
    use std::os::fd::AsRawFd;

    // SAFETY: `file` owns an open descriptor for the duration of this call;
    // posix_fadvise only records an access-pattern hint for it.
    let rc = unsafe { libc::posix_fadvise(file.as_raw_fd(), 0, 0, libc::POSIX_FADV_SEQUENTIAL) };
    if rc != 0 {
        debug!(errno = rc, "sequential access hint rejected");
    }
}

#[cfg(not(target_os = "linux"))]
fn advise_sequential(_file: &File) {}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn unique_temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "jsonstream-resource-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir
    }

    #[test]
    fn read_only_requires_existing_file() {
        let dir = unique_temp_dir("missing");
        let err = FileResource::open(dir.join("absent.jsonl"), AccessMode::ReadOnly, 1024)
            .unwrap_err();
        assert!(matches!(err, ResourceError::Open { .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_only_appends_after_existing_content() {
        let dir = unique_temp_dir("append");
        let path = dir.join("docs.bin");
        std::fs::write(&path, b"existing").unwrap();

        let mut resource = FileResource::open(&path, AccessMode::WriteOnly, 16).unwrap();
        assert_eq!(resource.stream_position().unwrap(), 8);
        resource.write_all(b"+more").unwrap();
        resource.flush().unwrap();
        drop(resource);

        assert_eq!(std::fs::read(&path).unwrap(), b"existing+more");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn read_only_reads_from_start() {
        let dir = unique_temp_dir("read");
        let path = dir.join("docs.bin");
        std::fs::write(&path, b"0123456789").unwrap();

        let mut resource = FileResource::open(&path, AccessMode::ReadOnly, 4).unwrap();
        let mut head = [0u8; 6];
        resource.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"012345");
        assert_eq!(resource.stream_position().unwrap(), 6);

        resource.seek(SeekFrom::Start(2)).unwrap();
        let mut rest = Vec::new();
        resource.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"23456789");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn read_and_write_starts_at_zero_and_creates() {
        let dir = unique_temp_dir("rw");
        let path = dir.join("docs.bin");

        let mut resource = FileResource::open(&path, AccessMode::ReadAndWrite, 4).unwrap();
        assert_eq!(resource.stream_position().unwrap(), 0);
        resource.write_all(b"abc").unwrap();
        resource.rewind().unwrap();
        let mut back = String::new();
        resource.read_to_string(&mut back).unwrap();
        assert_eq!(back, "abc");
        assert_eq!(resource.mode(), AccessMode::ReadAndWrite);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn wrong_direction_is_unsupported() {
        let dir = unique_temp_dir("direction");
        let path = dir.join("docs.bin");

        let mut writer = FileResource::open(&path, AccessMode::WriteOnly, 4).unwrap();
        let mut buf = [0u8; 1];
        let err = writer.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        drop(writer);

        let mut reader = FileResource::open(&path, AccessMode::ReadOnly, 4).unwrap();
        let err = reader.write(b"x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert!(reader.flush().is_ok());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
