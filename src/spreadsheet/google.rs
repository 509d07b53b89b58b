//! Google Sheets v4 and Drive v3 backend.
use crate::auth::CredentialProvider;
use crate::auth::TokenFileCredentials;
use crate::config::EnrichmentConfig;
use crate::error::EnricherError;
use crate::spreadsheet::RectangularTable;
use crate::spreadsheet::SpreadsheetClient;
use crate::spreadsheet::SpreadsheetError;
use chrono::DateTime;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const DEFAULT_SHEETS_BASE: &str = "https://sheets.googleapis.com";
const DEFAULT_DRIVE_BASE: &str = "https://www.googleapis.com";

/// Failure of a single HTTP exchange
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{0}")]
    Network(String),
}

/// Blocking HTTP `GET` with a bearer token, returning the response body.
pub trait Transport {
    fn get(&self, url: &Url, bearer_token: &str) -> Result<String, TransportError>;
}

/// [`Transport`] backed by a blocking `reqwest` client
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    const TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new() -> Result<Self, EnricherError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Self::TIMEOUT)
            .build()?;
        Ok(ReqwestTransport { client })
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, url: &Url, bearer_token: &str) -> Result<String, TransportError> {
        let response = self.client
            .get(url.clone())
            .bearer_auth(bearer_token)
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = response.status();
        let body = response.text().map_err(|e| TransportError::Network(e.to_string()))?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(TransportError::Status { status: status.as_u16(), body })
        }
    }
}

/// Spreadsheet metadata as returned for `fields=properties,sheets.properties,revisionId`
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetInfo {
    #[serde(default)]
    pub properties: SpreadsheetProperties,
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
    pub revision_id: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetProperties {
    pub title: Option<String>,
    pub locale: Option<String>,
    pub time_zone: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SheetEntry {
    #[serde(default)]
    pub properties: SheetProperties,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default)]
    pub sheet_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub index: i64,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    modified_time: Option<DateTime<Utc>>,
}

/// One entry of the file revision history
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    pub id: String,
    pub modified_time: Option<DateTime<Utc>>,
    pub last_modifying_user: Option<RevisionUser>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RevisionUser {
    pub display_name: Option<String>,
    pub email_address: Option<String>,
}

#[derive(Deserialize)]
struct RevisionList {
    #[serde(default)]
    revisions: Vec<Revision>,
}

/// A Google spreadsheet addressed by its resource ID.
///
/// Spreadsheet metadata and the sheet listing are fetched once and kept for the
/// lifetime of the client. Sheet values are fetched on every
/// [`read_sheet`](SpreadsheetClient::read_sheet).
pub struct GoogleSheetsClient<T: Transport = ReqwestTransport> {
    spreadsheet_id: String,
    sheets_base: Url,
    drive_base: Url,
    transport: T,
    credentials: Box<dyn CredentialProvider>,
    spreadsheet_info: Option<SpreadsheetInfo>,
    existing_sheets: Option<Vec<String>>,
}

impl GoogleSheetsClient<ReqwestTransport> {
    /// Creates a client talking to the public Google endpoints
    ///
    /// # Arguments
    /// * `spreadsheet_id` - Resource ID, for example `1y_gqMZ6ZKyunhmnusbJ9pdUFHvim-aJmUhGqGD4AF7Y`
    /// * `credentials` - Source of bearer tokens
    pub fn new(spreadsheet_id: &str, credentials: impl CredentialProvider + 'static) -> Result<Self, EnricherError> {
        Self::with_transport(spreadsheet_id, credentials, ReqwestTransport::new()?)
    }

    /// Creates a client from configuration, reading tokens from `token_path`
    pub fn from_config(config: &EnrichmentConfig) -> Result<Self, EnricherError> {
        let mut client = Self::new(&config.spreadsheet_id, TokenFileCredentials::new(&config.token_path))?;
        if let Some(base) = &config.api_base {
            client = client.with_sheets_base(base)?;
        }
        if let Some(base) = &config.drive_base {
            client = client.with_drive_base(base)?;
        }
        Ok(client)
    }
}

impl<T: Transport> GoogleSheetsClient<T> {
    pub fn with_transport(
        spreadsheet_id: &str,
        credentials: impl CredentialProvider + 'static,
        transport: T,
    ) -> Result<Self, EnricherError> {
        Ok(GoogleSheetsClient {
            spreadsheet_id: spreadsheet_id.to_owned(),
            sheets_base: Url::parse(DEFAULT_SHEETS_BASE)?,
            drive_base: Url::parse(DEFAULT_DRIVE_BASE)?,
            transport,
            credentials: Box::new(credentials),
            spreadsheet_info: None,
            existing_sheets: None,
        })
    }

    /// Overrides the Sheets API base URL
    pub fn with_sheets_base(mut self, base: &str) -> Result<Self, EnricherError> {
        self.sheets_base = Url::parse(base)?;
        Ok(self)
    }

    /// Overrides the Drive API base URL
    pub fn with_drive_base(mut self, base: &str) -> Result<Self, EnricherError> {
        self.drive_base = Url::parse(base)?;
        Ok(self)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the spreadsheet metadata, fetching it on first use.
    pub fn spreadsheet_info(&mut self) -> Result<&SpreadsheetInfo, EnricherError> {
        if self.spreadsheet_info.is_none() {
            let mut url = endpoint(&self.sheets_base, &["v4", "spreadsheets", self.spreadsheet_id.as_str()])?;
            url.query_pairs_mut().append_pair("fields", "properties,sheets.properties,revisionId");
            let info: SpreadsheetInfo = self.fetch(&url)?;
            tracing::debug!(
                spreadsheet = %self.spreadsheet_id,
                sheets = info.sheets.len(),
                revision = ?info.revision_id,
                "loaded spreadsheet metadata"
            );
            self.spreadsheet_info = Some(info);
        }
        Ok(self.spreadsheet_info.get_or_insert_with(SpreadsheetInfo::default))
    }

    /// Lists the revision history of the spreadsheet file.
    ///
    /// Failures are logged and yield an empty list.
    pub fn revisions(&mut self) -> Vec<Revision> {
        let url = endpoint(&self.drive_base, &["drive", "v3", "files", self.spreadsheet_id.as_str(), "revisions"]);
        let result = url.and_then(|mut url| {
            url.query_pairs_mut().append_pair("fields", "revisions(id,modifiedTime,lastModifyingUser)");
            self.fetch::<RevisionList>(&url)
        });
        match result {
            Ok(list) => list.revisions,
            Err(error) => {
                tracing::warn!(spreadsheet = %self.spreadsheet_id, %error, "failed to list revisions");
                Vec::new()
            }
        }
    }

    /// Performs an authenticated `GET` and decodes the JSON body
    fn fetch<D: DeserializeOwned>(&mut self, url: &Url) -> Result<D, EnricherError> {
        let credential = self.credentials.acquire().map_err(|e| self.unavailable(e.to_string()))?;
        tracing::debug!(url = %url, "GET");
        let body = self.transport
            .get(url, &credential.access_token)
            .map_err(|e| self.unavailable(e.to_string()))?;
        serde_json::from_str(&body)
            .map_err(|e| SpreadsheetError::InvalidResponse(self.spreadsheet_id.to_owned(), e.to_string()).into())
    }

    fn unavailable(&self, message: String) -> SpreadsheetError {
        SpreadsheetError::Unavailable {
            spreadsheet: self.spreadsheet_id.to_owned(),
            message,
        }
    }
}

impl<T: Transport> SpreadsheetClient for GoogleSheetsClient<T> {
    fn id(&self) -> &str {
        &self.spreadsheet_id
    }

    fn sheet_names(&mut self) -> Result<Vec<String>, EnricherError> {
        if self.existing_sheets.is_none() {
            let names = self.spreadsheet_info()?
                .sheets
                .iter()
                .map(|sheet| sheet.properties.title.to_owned())
                .collect();
            self.existing_sheets = Some(names);
        }
        Ok(self.existing_sheets.clone().unwrap_or_default())
    }

    fn last_modified(&mut self) -> Option<DateTime<Utc>> {
        let url = endpoint(&self.drive_base, &["drive", "v3", "files", self.spreadsheet_id.as_str()]);
        let result = url.and_then(|mut url| {
            url.query_pairs_mut().append_pair("fields", "modifiedTime");
            self.fetch::<DriveFile>(&url)
        });
        match result {
            Ok(DriveFile { modified_time: Some(time) }) => Some(time),
            Ok(DriveFile { modified_time: None }) => {
                tracing::warn!(spreadsheet = %self.spreadsheet_id, "drive reported no modification time");
                None
            }
            Err(error) => {
                tracing::warn!(spreadsheet = %self.spreadsheet_id, %error, "failed to read modification time");
                None
            }
        }
    }

    fn read_sheet(&mut self, name: &str) -> Result<RectangularTable, EnricherError> {
        self.ensure_sheet(name)?;
        let range = quote_sheet_name(name);
        let url = endpoint(&self.sheets_base, &["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range.as_str()])?;
        let values: ValueRange = self.fetch(&url)?;
        let rows = values.values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect::<Vec<Vec<String>>>();
        tracing::debug!(spreadsheet = %self.spreadsheet_id, sheet = name, rows = rows.len(), "read sheet");
        Ok(RectangularTable::from_rows(rows))
    }
}

/// Appends path segments to a base URL, percent-encoding each segment
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, EnricherError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| EnricherError::WithContextError(format!("'{}' cannot be used as a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Quotes a sheet name for use as an A1 range: `it's` becomes `'it''s'`
fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
