use thiserror::Error;

/// Main error type for the sheet enricher.
/// Aggregates errors from the standard library, dependencies and internal modules.
#[derive(Error, Debug)]
pub enum EnricherError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    // Third-party library errors
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    UrlError(#[from] url::ParseError),

    #[error("{0}")]
    HttpError(#[from] reqwest::Error),

    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    #[error("{0}")]
    UnifiedReaderError(#[from] crate::helpers::reader::UnifiedReaderError),

    // Domain module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    CredentialError(#[from] crate::auth::CredentialError),

    #[error("{0}")]
    ConfigError(#[from] crate::config::ConfigError),
}

pub trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, EnricherError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| EnricherError::WithContextError(format!("{}: {}", message, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_prefix_wraps_message() {
        let result: Result<(), EnricherError> = Err(EnricherError::WithContextError("boom".to_owned()));
        let error = result.with_prefix("Load index").unwrap_err();
        assert_eq!(error.to_string(), "Load index: boom");
    }
}
