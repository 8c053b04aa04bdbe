//! データセットから各ビジュアライゼーション用のデータを組み立てる。
use serde::{Deserialize, Serialize};

use crate::dataset::{
    Dataset, LOCATION_COLUMN, SENTIMENT_COLUMN, TWEET_COLUMN, TweetRecord, USERNAME_COLUMN,
};

mod counts;
mod wordcloud;

pub use counts::{CategoryCount, top_values, value_counts};
pub use wordcloud::{WordFrequency, word_frequencies};

/// 選択可能なビジュアライゼーション。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualizationKind {
    #[serde(rename = "Word Cloud")]
    WordCloud,
    #[serde(rename = "Sentiment Distribution")]
    SentimentDistribution,
    #[serde(rename = "Top Usernames")]
    TopUsernames,
    #[serde(rename = "Top Locations")]
    TopLocations,
}

impl VisualizationKind {
    pub const ALL: [Self; 4] = [
        Self::WordCloud,
        Self::SentimentDistribution,
        Self::TopUsernames,
        Self::TopLocations,
    ];

    /// データ源となる列。
    #[must_use]
    pub fn source_column(self) -> &'static str {
        match self {
            Self::WordCloud => TWEET_COLUMN,
            Self::SentimentDistribution => SENTIMENT_COLUMN,
            Self::TopUsernames => USERNAME_COLUMN,
            Self::TopLocations => LOCATION_COLUMN,
        }
    }
}

/// パネルの中身。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum PanelData {
    Words(Vec<WordFrequency>),
    Counts(Vec<CategoryCount>),
}

/// 1つのビジュアライゼーション。列が欠けている場合は`error`のみを持つ。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub view: VisualizationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PanelData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// パネル生成時の上限設定。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsightLimits {
    pub max_words: usize,
    pub top_n: usize,
}

impl Default for InsightLimits {
    fn default() -> Self {
        Self {
            max_words: 200,
            top_n: 10,
        }
    }
}

/// 感情ラベル列の分布（円グラフ用）。
#[must_use]
pub fn sentiment_distribution(records: &[TweetRecord]) -> Vec<CategoryCount> {
    value_counts(records.iter().map(|r| r.sentiment.as_deref()))
}

/// 選択されたビジュアライゼーションごとにパネルを組み立てる。
#[must_use]
pub fn build_panels(
    dataset: &Dataset,
    views: &[VisualizationKind],
    limits: InsightLimits,
) -> Vec<Panel> {
    views
        .iter()
        .map(|&view| build_panel(dataset, view, limits))
        .collect()
}

fn build_panel(dataset: &Dataset, view: VisualizationKind, limits: InsightLimits) -> Panel {
    let column = view.source_column();
    if !dataset.has_column(column) {
        return Panel {
            view,
            data: None,
            error: Some(format!("Dataset tidak memiliki kolom '{column}'.")),
        };
    }

    let records = dataset.records();
    let data = match view {
        VisualizationKind::WordCloud => PanelData::Words(word_frequencies(
            records.iter().filter_map(|r| r.tweet.as_deref()),
            limits.max_words,
        )),
        VisualizationKind::SentimentDistribution => {
            PanelData::Counts(sentiment_distribution(records))
        }
        VisualizationKind::TopUsernames => PanelData::Counts(top_values(
            records.iter().map(|r| r.username.as_deref()),
            limits.top_n,
        )),
        VisualizationKind::TopLocations => PanelData::Counts(top_values(
            records.iter().map(|r| r.location.as_deref()),
            limits.top_n,
        )),
    };

    Panel {
        view,
        data: Some(data),
        error: None,
    }
}
