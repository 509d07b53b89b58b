use chrono::Duration;
use chrono::Utc;
use either::Either;
use sheet_enricher::enrich::Column;
use sheet_enricher::enrich::CreateTableRequest;
use sheet_enricher::enrich::IngestionItem;
use sheet_enricher::enrich::StackTraceError;
use sheet_enricher::enrich::TableSource;
use sheet_enricher::enrich::TableType;
use sheet_enricher::spreadsheet::google::Transport;
use sheet_enricher::spreadsheet::google::TransportError;
use sheet_enricher::EnrichedSource;
use sheet_enricher::EnrichmentConfig;
use sheet_enricher::GoogleSheetsClient;
use sheet_enricher::MemorySpreadsheet;
use sheet_enricher::MetadataEnricher;
use sheet_enricher::StaticCredentials;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use url::Url;

const PLACEHOLDER_ONLY: &str =
    "Description from source:\nNo comment available\n\nDescription from spreadsheet:\nNo comment available";

fn orders_spreadsheet(tables: &[&str]) -> MemorySpreadsheet {
    let mut index = vec![vec!["Table"]];
    index.extend(tables.iter().map(|table| vec![*table]));
    MemorySpreadsheet::new("descriptions")
        .with_sheet("Tables", index)
        .with_sheet("orders", [vec!["orders", "Description"], vec!["id", "Primary key"], vec!["amount", ""]])
}

fn orders_columns() -> Vec<Column> {
    vec![
        Column::new("id", "bigint").with_description("int64"),
        Column::new("amount", "decimal"),
    ]
}

#[test]
fn orders_descriptions_are_merged() {
    let mut client = orders_spreadsheet(&["orders"]);
    let enricher = MetadataEnricher::from_spreadsheet(&mut client, &EnrichmentConfig::new("descriptions"), Utc::now()).unwrap();

    let columns: Vec<Column> = enricher.enrich("orders", orders_columns()).collect();
    assert_eq!(columns.len(), 2);
    assert_eq!(
        columns[0].description.as_deref(),
        Some("Description from source:\nint64\n\nDescription from spreadsheet:\nPrimary key")
    );
    assert_eq!(
        columns[1].description.as_deref(),
        Some("Description from source:\nNo comment available\n\nDescription from spreadsheet:\n")
    );
}

#[test]
fn missing_table_sheet_falls_back_to_placeholder() {
    let mut client = orders_spreadsheet(&["orders", "users"]);
    let enricher = MetadataEnricher::from_spreadsheet(&mut client, &EnrichmentConfig::new("descriptions"), Utc::now()).unwrap();

    assert_eq!(enricher.tracked_tables(), &["orders", "users"]);
    assert_eq!(enricher.index().tables().collect::<Vec<_>>(), vec!["orders"]);

    let columns: Vec<Column> = enricher.enrich("users", vec![Column::new("id", "bigint")]).collect();
    assert_eq!(columns[0].description.as_deref(), Some(PLACEHOLDER_ONLY));
}

#[test]
fn stale_spreadsheet_only_reads_index_sheet() {
    let now = Utc::now();
    let mut client = orders_spreadsheet(&["orders"]).with_last_modified(now - Duration::days(5));
    let enricher = MetadataEnricher::from_spreadsheet(&mut client, &EnrichmentConfig::new("descriptions"), now).unwrap();

    assert_eq!(client.reads(), &["Tables"]);
    let columns: Vec<Column> = enricher.enrich("orders", vec![Column::new("id", "bigint")]).collect();
    assert_eq!(columns[0].description.as_deref(), Some(PLACEHOLDER_ONLY));
}

#[test]
fn localized_labels_come_from_configuration() {
    let mut client = MemorySpreadsheet::new("descriptions")
        .with_sheet("Список таблиц", [vec!["Таблица"], vec!["orders"]])
        .with_sheet("orders", [vec!["orders", "Описание"], vec!["id", "Идентификатор"]]);
    let config: EnrichmentConfig = serde_json::from_value(serde_json::json!({
        "spreadsheet_id": "descriptions",
        "index_sheet": "Список таблиц",
        "table_column": "Таблица",
        "description_column": "Описание",
        "template": {
            "source_label": "Описание из БД",
            "spreadsheet_label": "Описание из GS",
            "placeholder": "Комментарий отсутствует"
        }
    }))
    .unwrap();
    let enricher = MetadataEnricher::from_spreadsheet(&mut client, &config, Utc::now()).unwrap();

    let columns: Vec<Column> = enricher.enrich("orders", vec![Column::new("id", "UInt64")]).collect();
    assert_eq!(
        columns[0].description.as_deref(),
        Some("Описание из БД:\nКомментарий отсутствует\n\nОписание из GS:\nИдентификатор")
    );
}

/// Serves canned JSON by URL path and counts requests per path
#[derive(Clone, Default)]
struct CannedTransport {
    responses: Rc<HashMap<String, String>>,
    hits: Rc<RefCell<HashMap<String, usize>>>,
}

impl CannedTransport {
    fn hits(&self, path: &str) -> usize {
        self.hits.borrow().get(path).copied().unwrap_or(0)
    }
}

impl Transport for CannedTransport {
    fn get(&self, url: &Url, bearer_token: &str) -> Result<String, TransportError> {
        assert_eq!(bearer_token, "test-token");
        *self.hits.borrow_mut().entry(url.path().to_owned()).or_default() += 1;
        self.responses.get(url.path()).cloned().ok_or_else(|| TransportError::Status {
            status: 404,
            body: String::new(),
        })
    }
}

fn google_transport() -> CannedTransport {
    let responses = HashMap::from([
        (
            "/v4/spreadsheets/sheet-id".to_owned(),
            serde_json::json!({
                "sheets": [
                    { "properties": { "sheetId": 0, "title": "Tables", "index": 0 } },
                    { "properties": { "sheetId": 1, "title": "orders", "index": 1 } }
                ],
                "revisionId": "r1"
            })
            .to_string(),
        ),
        (
            "/v4/spreadsheets/sheet-id/values/'Tables'".to_owned(),
            serde_json::json!({ "values": [["Table"], ["orders"], ["users"]] }).to_string(),
        ),
        (
            "/v4/spreadsheets/sheet-id/values/'orders'".to_owned(),
            serde_json::json!({ "values": [["orders", "Description"], ["id", "Primary key"], ["amount"]] }).to_string(),
        ),
        (
            "/drive/v3/files/sheet-id".to_owned(),
            serde_json::json!({ "modifiedTime": Utc::now().to_rfc3339() }).to_string(),
        ),
    ]);
    CannedTransport {
        responses: Rc::new(responses),
        hits: Rc::default(),
    }
}

struct OrdersSource;

impl TableSource for OrdersSource {
    fn yield_table<'a>(&'a mut self, table_name: &str, table_type: TableType) -> Box<dyn Iterator<Item = IngestionItem> + 'a> {
        let request = CreateTableRequest {
            name: table_name.to_owned(),
            table_type,
            columns: orders_columns(),
            description: None,
            database_schema: Some("shop".to_owned()),
        };
        let failure = StackTraceError {
            name: table_name.to_owned(),
            error: "Unsupported column type".to_owned(),
            stack_trace: Some("at yield_table".to_owned()),
        };
        Box::new(vec![Either::Right(request), Either::Left(failure)].into_iter())
    }
}

#[test]
fn google_backed_ingestion_is_enriched() {
    let transport = google_transport();
    let mut client = GoogleSheetsClient::with_transport("sheet-id", StaticCredentials::new("test-token"), transport.clone()).unwrap();
    let enricher = MetadataEnricher::from_spreadsheet(&mut client, &EnrichmentConfig::new("sheet-id"), Utc::now()).unwrap();

    assert_eq!(transport.hits("/v4/spreadsheets/sheet-id"), 1);
    assert_eq!(transport.hits("/v4/spreadsheets/sheet-id/values/'Tables'"), 1);
    assert_eq!(transport.hits("/v4/spreadsheets/sheet-id/values/'orders'"), 1);
    assert_eq!(transport.hits("/v4/spreadsheets/sheet-id/values/'users'"), 0);

    let mut source = EnrichedSource::new(OrdersSource, enricher);
    let items: Vec<IngestionItem> = source.yield_table("orders", TableType::Regular).collect();
    assert_eq!(items.len(), 2);

    let request = items[0].as_ref().right().unwrap();
    assert_eq!(request.columns.len(), 2);
    assert!(request.columns[0].description.as_deref().unwrap().ends_with("spreadsheet:\nPrimary key"));
    assert!(request.columns[1].description.as_deref().unwrap().ends_with("spreadsheet:\n"));

    let failure = items[1].as_ref().left().unwrap();
    assert_eq!(failure.error, "Unsupported column type");
}
