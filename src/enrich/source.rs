//! Records produced by an ingestion source.
use either::Either;
use serde::Deserialize;
use serde::Serialize;

/// Column of a table entity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type_display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal_position: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Column>,
}

impl Column {
    pub fn new(name: &str, data_type: &str) -> Self {
        Column {
            name: name.to_owned(),
            data_type: data_type.to_owned(),
            data_type_display: None,
            description: None,
            ordinal_position: None,
            children: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableType {
    #[default]
    Regular,
    View,
    MaterializedView,
    External,
    Dictionary,
}

/// Request to create or update a table entity in the metadata catalog
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTableRequest {
    pub name: String,
    #[serde(default)]
    pub table_type: TableType,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_schema: Option<String>,
}

/// Failure reported by a source in place of a record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTraceError {
    pub name: String,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
}

/// One item of an ingestion stream: a failure (left) or a table record (right)
pub type IngestionItem = Either<StackTraceError, CreateTableRequest>;

/// Produces table records lazily, one table at a time.
pub trait TableSource {
    fn yield_table<'a>(
        &'a mut self,
        table_name: &str,
        table_type: TableType,
    ) -> Box<dyn Iterator<Item = IngestionItem> + 'a>;
}
