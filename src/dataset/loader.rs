//! `.csv` / `.xlsx` のパース。
use std::io::Cursor;

use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use csv::ReaderBuilder;
use tracing::debug;

use super::{
    Dataset, DatasetError, LOCATION_COLUMN, SENTIMENT_COLUMN, TWEET_COLUMN, TweetRecord,
    USERNAME_COLUMN,
};

/// 既知の列がヘッダ上のどの位置にあるか。
#[derive(Debug, Default)]
struct ColumnIndex {
    tweet: Option<usize>,
    username: Option<usize>,
    location: Option<usize>,
    sentiment: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &[String]) -> Self {
        let find = |name: &str| headers.iter().position(|h| h == name);
        Self {
            tweet: find(TWEET_COLUMN),
            username: find(USERNAME_COLUMN),
            location: find(LOCATION_COLUMN),
            sentiment: find(SENTIMENT_COLUMN),
        }
    }

    fn record<F>(&self, cell: F) -> TweetRecord
    where
        F: Fn(usize) -> Option<String>,
    {
        TweetRecord {
            tweet: self.tweet.and_then(&cell),
            username: self.username.and_then(&cell),
            location: self.location.and_then(&cell),
            sentiment: self.sentiment.and_then(&cell),
        }
    }
}

fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').to_string()
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub(super) fn read_csv(bytes: &[u8]) -> Result<Dataset, DatasetError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let columns: Vec<String> = reader.headers()?.iter().map(clean_header).collect();
    let index = ColumnIndex::from_headers(&columns);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(index.record(|i| row.get(i).and_then(non_empty)));
    }

    debug!(rows = records.len(), columns = columns.len(), "csv dataset parsed");
    Ok(Dataset::new(columns, records))
}

fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(value) => non_empty(value),
        other => Some(other.to_string()),
    }
}

pub(super) fn read_xlsx(bytes: Vec<u8>) -> Result<Dataset, DatasetError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DatasetError::EmptyWorkbook)??;

    let mut rows = range.rows();
    let columns: Vec<String> = rows
        .next()
        .map(|header| {
            header
                .iter()
                .map(|cell| cell_to_string(cell).map_or_else(String::new, |h| clean_header(&h)))
                .collect()
        })
        .unwrap_or_default();
    let index = ColumnIndex::from_headers(&columns);

    let records: Vec<TweetRecord> = rows
        .map(|row| index.record(|i| row.get(i).and_then(cell_to_string)))
        .collect();

    debug!(rows = records.len(), columns = columns.len(), "xlsx dataset parsed");
    Ok(Dataset::new(columns, records))
}
