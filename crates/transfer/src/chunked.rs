use std::io::{Read, Seek, SeekFrom};
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::TransferError;

/// Reads byte ranges of a local file.
pub struct ChunkReader {
    file: std::fs::File,
    file_size: u64,
}

impl ChunkReader {
    /// Opens `path` for ranged reading.
    pub fn open(path: &Path) -> Result<Self, TransferError> {
        let file = std::fs::File::open(path)?;
        let file_size = file.metadata()?.len();
        Ok(Self { file, file_size })
    }

    /// Reads exactly the bytes in `range`.
    ///
    /// Fails if the range reaches past the end of the file (for example
    /// because the file shrank after it was enumerated).
    pub fn read_range(&mut self, range: Range<u64>) -> Result<Vec<u8>, TransferError> {
        if range.start > range.end || range.end > self.file_size {
            return Err(TransferError::InvalidRange {
                start: range.start,
                end: range.end,
                size: self.file_size,
            });
        }

        let mut buf = vec![0u8; (range.end - range.start) as usize];
        self.file.seek(SeekFrom::Start(range.start))?;
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Total file size in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }
}

/// Reads `range` from `path` on the blocking pool.
pub async fn read_range(path: PathBuf, range: Range<u64>) -> Result<Vec<u8>, TransferError> {
    tokio::task::spawn_blocking(move || ChunkReader::open(&path)?.read_range(range))
        .await
        .map_err(|e| TransferError::Io(std::io::Error::other(format!("task join error: {e}"))))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(data).unwrap();
        path
    }

    #[test]
    fn reads_requested_ranges() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "test.bin", b"AABBCCDDEE");

        let mut reader = ChunkReader::open(&path).unwrap();
        assert_eq!(reader.file_size(), 10);
        assert_eq!(reader.read_range(0..4).unwrap(), b"AABB");
        assert_eq!(reader.read_range(8..10).unwrap(), b"EE");
        // Out of order reads seek back.
        assert_eq!(reader.read_range(4..8).unwrap(), b"CCDD");
        assert!(reader.read_range(5..5).unwrap().is_empty());
    }

    #[test]
    fn range_past_end_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "test.bin", b"0123456789");

        let mut reader = ChunkReader::open(&path).unwrap();
        let err = reader.read_range(6..12).unwrap_err();
        assert!(matches!(err, TransferError::InvalidRange { size: 10, .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ChunkReader::open(Path::new("/nonexistent/chunk/source")).err().unwrap();
        assert!(matches!(err, TransferError::Io(_)));
    }

    #[tokio::test]
    async fn async_read_matches_blocking_read() {
        let dir = TempDir::new().unwrap();
        let data: Vec<u8> = (0..=255u8).cycle().take(5000).collect();
        let path = create_test_file(dir.path(), "big.bin", &data);

        let bytes = read_range(path, 1000..3500).await.unwrap();
        assert_eq!(bytes, &data[1000..3500]);
    }
}
