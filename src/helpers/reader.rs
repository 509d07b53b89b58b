use crate::error::EnricherError;
use std::fs::File;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum UnifiedReaderError {
    #[error("No data from remote file: '{0}'")]
    RemoteFileNoDataError(String),

    #[error("Remote file '{0}' answered with HTTP {1}")]
    RemoteFileStatusError(String, u16),
}

/// A unified reader that can handle both local files and remote URLs
pub(crate) enum UnifiedReader {
    /// Local file reader
    Local(BufReader<File>),
    /// Remote URL reader (in-memory buffer)
    Remote(Cursor<Vec<u8>>),
}

impl UnifiedReader {
    /// Timeout for downloading a remote workbook
    const REMOTE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Opens a file from either a local path or remote URL.
    /// Remote files are downloaded into memory.
    pub(crate) fn new(file_name: &str) -> Result<UnifiedReader, EnricherError> {
        if Self::is_remote_url(file_name) {
            Self::download(file_name)
        } else {
            let file = File::open(file_name)?;
            Ok(UnifiedReader::Local(BufReader::new(file)))
        }
    }

    /// Checks if a file name represents a remote URL
    pub(crate) fn is_remote_url(file_name: &str) -> bool {
        if let Ok(url) = Url::parse(file_name) {
            matches!(url.scheme(), "http" | "https")
        } else {
            false
        }
    }

    fn download(file_name: &str) -> Result<UnifiedReader, EnricherError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Self::REMOTE_TIMEOUT)
            .build()?;
        let response = client.get(file_name).send()?;
        let status = response.status();
        if !status.is_success() {
            Err(UnifiedReaderError::RemoteFileStatusError(file_name.to_owned(), status.as_u16()))?;
        }

        let bytes = response.bytes()?.to_vec();
        if bytes.is_empty() {
            Err(UnifiedReaderError::RemoteFileNoDataError(file_name.to_owned()))?;
        }
        tracing::debug!(url = file_name, bytes = bytes.len(), "downloaded remote workbook");

        Ok(UnifiedReader::Remote(Cursor::new(bytes)))
    }
}

impl Read for UnifiedReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            UnifiedReader::Local(reader) => reader.read(buf),
            UnifiedReader::Remote(reader) => reader.read(buf),
        }
    }
}

impl Seek for UnifiedReader {
    fn seek(&mut self, pos: std::io::SeekFrom) -> std::io::Result<u64> {
        match self {
            UnifiedReader::Local(reader) => reader.seek(pos),
            UnifiedReader::Remote(reader) => reader.seek(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_remote_url() {
        // Local files
        assert!(!UnifiedReader::is_remote_url("export.xlsx"));
        assert!(!UnifiedReader::is_remote_url("/path/to/export.xlsx"));
        assert!(!UnifiedReader::is_remote_url("./relative/export.xlsx"));

        // Remote URLs
        assert!(UnifiedReader::is_remote_url("http://example.com/export.xlsx"));
        assert!(UnifiedReader::is_remote_url(
            "https://docs.google.com/spreadsheets/d/abc/export?format=xlsx"
        ));

        // File URLs are read locally by the caller, not downloaded
        assert!(!UnifiedReader::is_remote_url("file:///path/to/export.xlsx"));
    }

    #[test]
    fn test_open_local_file() {
        // Cargo.toml always exists at the crate root during tests
        let result = UnifiedReader::new("Cargo.toml");
        assert!(result.is_ok(), "Failed to open local file: {:?}", result.err());

        let result = UnifiedReader::new("non_existent_file.xlsx");
        assert!(result.is_err(), "Should fail to open non-existent file");
    }
}
