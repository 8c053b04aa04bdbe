/// Prometheusメトリクス定義。
use prometheus::{
    Histogram, IntCounter, IntCounterVec, Registry, register_histogram_with_registry,
    register_int_counter_vec_with_registry, register_int_counter_with_registry,
};
use std::sync::Arc;

use crate::sentiment::SentimentLabel;
use crate::translation::TranslationError;

/// メトリクスコレクター。
#[derive(Debug, Clone)]
pub struct Metrics {
    // カウンター
    pub classifications: IntCounterVec,
    pub translation_failures: IntCounterVec,
    pub dataset_rows_classified: IntCounter,
    pub datasets_loaded: IntCounter,
    pub uploads_rejected: IntCounter,

    // ヒストグラム
    pub translation_duration: Histogram,
}

impl Metrics {
    /// 新しいメトリクスコレクターを作成する。
    ///
    /// # Errors
    /// 同名のメトリクスが既にレジストリに登録されている場合はエラーを返す。
    pub fn new(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        Ok(Self {
            classifications: register_int_counter_vec_with_registry!(
                "sentiment_classifications_total",
                "Total number of classified texts by sentiment label",
                &["label"],
                registry
            )?,
            translation_failures: register_int_counter_vec_with_registry!(
                "sentiment_translation_failures_total",
                "Translation failures that fell back to the ERROR label",
                &["reason"],
                registry
            )?,
            dataset_rows_classified: register_int_counter_with_registry!(
                "sentiment_dataset_rows_classified_total",
                "Rows classified through dataset uploads",
                registry
            )?,
            datasets_loaded: register_int_counter_with_registry!(
                "sentiment_datasets_loaded_total",
                "Datasets parsed from uploads or the catalog",
                registry
            )?,
            uploads_rejected: register_int_counter_with_registry!(
                "sentiment_uploads_rejected_total",
                "Uploads rejected before classification",
                registry
            )?,
            translation_duration: register_histogram_with_registry!(
                "sentiment_translation_duration_seconds",
                "Duration of translation calls",
                vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
                registry
            )?,
        })
    }

    pub fn record_classification(&self, label: SentimentLabel) {
        self.classifications
            .with_label_values(&[label.as_str()])
            .inc();
    }

    pub fn record_translation_failure(&self, error: &TranslationError) {
        self.translation_failures
            .with_label_values(&[error.reason()])
            .inc();
    }
}
