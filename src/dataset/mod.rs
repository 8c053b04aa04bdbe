//! ツイートデータセットの読み込み。
//!
//! `.csv` と `.xlsx` を受け付け、`Tweet` / `username` / `location` / `sentimen`
//! 列を型付きのレコードへ写す。列名は大文字小文字を区別して完全一致で照合する。
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

mod catalog;
mod loader;

pub use catalog::DatasetCatalog;

/// ツイート本文の列名。
pub const TWEET_COLUMN: &str = "Tweet";
/// 投稿者の列名。
pub const USERNAME_COLUMN: &str = "username";
/// 位置情報の列名。
pub const LOCATION_COLUMN: &str = "location";
/// 感情ラベルの列名。
pub const SENTIMENT_COLUMN: &str = "sentimen";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("missing column `{0}`")]
    MissingColumn(&'static str),
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to parse xlsx: {0}")]
    Xlsx(#[from] calamine::XlsxError),
    #[error("workbook has no worksheet")]
    EmptyWorkbook,
}

impl DatasetError {
    /// 利用者に表示するエラーメッセージ。
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::UnsupportedFileType(_) => {
                "Unsupported file type. Please upload a .xlsx atau .csv file.".to_string()
            }
            Self::MissingColumn(column) => format!("File tidak memiliki kolom '{column}'."),
            other => other.to_string(),
        }
    }
}

/// データセットの1行。欠損セルは`None`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TweetRecord {
    #[serde(rename = "Tweet")]
    pub tweet: Option<String>,
    pub username: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "sentimen")]
    pub sentiment: Option<String>,
}

impl TweetRecord {
    /// 列名に対応する値を返す。
    #[must_use]
    pub fn field(&self, column: &str) -> Option<&str> {
        match column {
            TWEET_COLUMN => self.tweet.as_deref(),
            USERNAME_COLUMN => self.username.as_deref(),
            LOCATION_COLUMN => self.location.as_deref(),
            SENTIMENT_COLUMN => self.sentiment.as_deref(),
            _ => None,
        }
    }
}

/// 読み込んだデータセット（列名とレコード）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<TweetRecord>,
}

/// 対応するファイル形式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Xlsx,
}

impl FileKind {
    /// ファイル名の拡張子から形式を判定する。拡張子は大文字小文字を区別する。
    ///
    /// # Errors
    /// `.csv` / `.xlsx` 以外は [`DatasetError::UnsupportedFileType`] を返す。
    pub fn from_file_name(file_name: &str) -> Result<Self, DatasetError> {
        if file_name.ends_with(".xlsx") {
            Ok(Self::Xlsx)
        } else if file_name.ends_with(".csv") {
            Ok(Self::Csv)
        } else {
            Err(DatasetError::UnsupportedFileType(file_name.to_string()))
        }
    }
}

impl Dataset {
    #[must_use]
    pub fn new(columns: Vec<String>, records: Vec<TweetRecord>) -> Self {
        Self { columns, records }
    }

    /// アップロードされたバイト列をファイル名の拡張子に従って読み込む。
    ///
    /// # Errors
    /// 非対応の拡張子、またはパースに失敗した場合は [`DatasetError`] を返す。
    pub fn from_bytes(file_name: &str, bytes: &[u8]) -> Result<Self, DatasetError> {
        match FileKind::from_file_name(file_name)? {
            FileKind::Csv => loader::read_csv(bytes),
            FileKind::Xlsx => loader::read_xlsx(bytes.to_vec()),
        }
    }

    /// ファイルパスから読み込む。
    ///
    /// # Errors
    /// 非対応の拡張子、読み込み失敗、またはパース失敗時は [`DatasetError`] を返す。
    pub fn load_path(path: &Path) -> Result<Self, DatasetError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        FileKind::from_file_name(&file_name)?;
        let bytes = std::fs::read(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(&file_name, &bytes)
    }

    /// 複数のデータセットを順に連結する。列は初出順の和集合になる。
    #[must_use]
    pub fn concat(datasets: impl IntoIterator<Item = Dataset>) -> Self {
        let mut merged = Self::default();
        for dataset in datasets {
            for column in dataset.columns {
                if !merged.columns.contains(&column) {
                    merged.columns.push(column);
                }
            }
            merged.records.extend(dataset.records);
        }
        merged
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn records(&self) -> &[TweetRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// 列が存在することを確認する。
    ///
    /// # Errors
    /// 列がない場合は [`DatasetError::MissingColumn`] を返す。
    pub fn require_column(&self, column: &'static str) -> Result<(), DatasetError> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(DatasetError::MissingColumn(column))
        }
    }

    /// 感情ラベル列を書き込む（列がなければ追加する）。
    pub fn set_sentiments(&mut self, labels: impl IntoIterator<Item = String>) {
        if !self.has_column(SENTIMENT_COLUMN) {
            self.columns.push(SENTIMENT_COLUMN.to_string());
        }
        for (record, label) in self.records.iter_mut().zip(labels) {
            record.sentiment = Some(label);
        }
    }

    /// 先頭`n`行（`df.head()`相当）。
    #[must_use]
    pub fn head(&self, n: usize) -> &[TweetRecord] {
        &self.records[..n.min(self.records.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tweet: &str) -> TweetRecord {
        TweetRecord {
            tweet: Some(tweet.to_string()),
            ..TweetRecord::default()
        }
    }

    #[test]
    fn file_kind_follows_extension() {
        assert_eq!(
            FileKind::from_file_name("Dataset_Anies-CakImin.xlsx").unwrap(),
            FileKind::Xlsx
        );
        assert_eq!(FileKind::from_file_name("tweets.csv").unwrap(), FileKind::Csv);
        let error = FileKind::from_file_name("tweets.json").unwrap_err();
        assert_eq!(
            error.user_message(),
            "Unsupported file type. Please upload a .xlsx atau .csv file."
        );
    }

    #[test]
    fn file_kind_extension_is_case_sensitive() {
        for name in ["tweets.CSV", "Dataset.XLSX", "tweets.Csv"] {
            assert!(
                matches!(
                    FileKind::from_file_name(name),
                    Err(DatasetError::UnsupportedFileType(_))
                ),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn require_column_reports_missing_tweet() {
        let dataset = Dataset::new(vec!["text".into()], vec![]);
        let error = dataset.require_column(TWEET_COLUMN).unwrap_err();
        assert_eq!(error.user_message(), "File tidak memiliki kolom 'Tweet'.");
    }

    #[test]
    fn concat_unions_columns_and_keeps_order() {
        let first = Dataset::new(
            vec!["Tweet".into(), "username".into()],
            vec![record("satu")],
        );
        let second = Dataset::new(
            vec!["Tweet".into(), "location".into()],
            vec![record("dua"), record("tiga")],
        );

        let merged = Dataset::concat([first, second]);

        assert_eq!(merged.columns(), &["Tweet", "username", "location"]);
        let tweets: Vec<_> = merged
            .records()
            .iter()
            .map(|r| r.tweet.as_deref().unwrap())
            .collect();
        assert_eq!(tweets, vec!["satu", "dua", "tiga"]);
    }

    #[test]
    fn set_sentiments_adds_column() {
        let mut dataset = Dataset::new(vec!["Tweet".into()], vec![record("a"), record("b")]);
        dataset.set_sentiments(["POSITIVE".to_string(), "ERROR".to_string()]);

        assert!(dataset.has_column(SENTIMENT_COLUMN));
        assert_eq!(dataset.records()[1].field(SENTIMENT_COLUMN), Some("ERROR"));
    }

    #[test]
    fn head_is_bounded() {
        let dataset = Dataset::new(vec!["Tweet".into()], vec![record("a"), record("b")]);
        assert_eq!(dataset.head(5).len(), 2);
        assert_eq!(dataset.head(1).len(), 1);
    }
}
