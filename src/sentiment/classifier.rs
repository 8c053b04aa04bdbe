use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, warn};

use super::{PolarityScorer, SentimentResult};
use crate::observability::metrics::Metrics;
use crate::translation::{AUTO_DETECT, TranslationError, Translator};
use crate::util::text::preview;

/// 1件の分類の詳細。警告は画面側に表示するためのメッセージ。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationOutcome {
    #[serde(flatten)]
    pub result: SentimentResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// 列全体を分類した結果。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub results: Vec<SentimentResult>,
    /// 重複を除いた警告（初出順）。
    pub warnings: Vec<String>,
}

/// テキストをピボット言語へ翻訳し、極性スコアでラベル付けする分類器。
pub struct SentimentClassifier {
    translator: Arc<dyn Translator>,
    scorer: Arc<dyn PolarityScorer>,
    pivot_language: String,
    metrics: Option<Arc<Metrics>>,
}

impl std::fmt::Debug for SentimentClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentClassifier")
            .field("pivot_language", &self.pivot_language)
            .finish_non_exhaustive()
    }
}

impl SentimentClassifier {
    #[must_use]
    pub fn new(
        translator: Arc<dyn Translator>,
        scorer: Arc<dyn PolarityScorer>,
        pivot_language: impl Into<String>,
    ) -> Self {
        Self {
            translator,
            scorer,
            pivot_language: pivot_language.into(),
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    #[must_use]
    pub fn pivot_language(&self) -> &str {
        &self.pivot_language
    }

    /// テキストを分類する。翻訳失敗は`{ERROR, 0.0}`となり、呼び出し元へ伝播しない。
    pub async fn classify(&self, text: &str) -> SentimentResult {
        self.classify_detailed(text).await.result
    }

    /// 訳文と警告メッセージ付きでテキストを分類する。
    pub async fn classify_detailed(&self, text: &str) -> ClassificationOutcome {
        let started = Instant::now();
        let translated = self
            .translator
            .translate(text, AUTO_DETECT, &self.pivot_language)
            .await;
        if let Some(metrics) = &self.metrics {
            metrics
                .translation_duration
                .observe(started.elapsed().as_secs_f64());
        }

        match translated {
            Ok(translated) => {
                let scores = self.scorer.polarity_scores(&translated);
                let result = SentimentResult::from_score(scores.compound);
                debug!(
                    label = %result.label,
                    score = result.score,
                    text = %preview(&translated, 80),
                    "text classified"
                );
                self.record(result);
                ClassificationOutcome {
                    result,
                    translated_text: Some(translated),
                    warning: None,
                }
            }
            Err(error) => self.fallback(&error),
        }
    }

    /// データセットの1セルを分類する。欠損セルは翻訳不能な入力として扱う。
    pub async fn classify_cell(&self, cell: Option<&str>) -> ClassificationOutcome {
        match cell {
            Some(text) => self.classify_detailed(text).await,
            None => self.fallback(&TranslationError::InvalidPayload),
        }
    }

    /// 列を1行ずつ順番に分類する。同一テキストは1回だけ翻訳する。
    pub async fn classify_batch<'a, I>(&self, cells: I) -> BatchOutcome
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut memo: HashMap<&'a str, ClassificationOutcome> = HashMap::new();
        let mut outcome = BatchOutcome::default();

        for cell in cells {
            let classified = match cell {
                Some(text) => {
                    if let Some(cached) = memo.get(text) {
                        // 再翻訳はしないがラベル集計は行ごとに数える
                        self.record(cached.result);
                        cached.clone()
                    } else {
                        let fresh = self.classify_detailed(text).await;
                        memo.insert(text, fresh.clone());
                        fresh
                    }
                }
                None => self.classify_cell(None).await,
            };

            if let Some(warning) = classified.warning {
                if !outcome.warnings.contains(&warning) {
                    outcome.warnings.push(warning);
                }
            }
            outcome.results.push(classified.result);
        }

        if let Some(metrics) = &self.metrics {
            metrics
                .dataset_rows_classified
                .inc_by(outcome.results.len() as u64);
        }
        debug!(
            rows = outcome.results.len(),
            unique = memo.len(),
            warnings = outcome.warnings.len(),
            "batch classified"
        );

        outcome
    }

    fn fallback(&self, error: &TranslationError) -> ClassificationOutcome {
        warn!(reason = error.reason(), error = %error, "translation failed, labelling as ERROR");
        if let Some(metrics) = &self.metrics {
            metrics.record_translation_failure(error);
        }
        let result = SentimentResult::error();
        self.record(result);
        ClassificationOutcome {
            result,
            translated_text: None,
            warning: Some(error.user_message()),
        }
    }

    fn record(&self, result: SentimentResult) {
        if let Some(metrics) = &self.metrics {
            metrics.record_classification(result.label);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use prometheus::Registry;

    use super::*;
    use crate::sentiment::{PolarityScores, SentimentLabel, VaderScorer};
    use crate::translation::test_support::{FailingTranslator, IdentityTranslator};

    /// 訳文を数値として読むスコアラー。閾値の境界確認用。
    struct LiteralScorer;

    impl PolarityScorer for LiteralScorer {
        fn polarity_scores(&self, text: &str) -> PolarityScores {
            PolarityScores {
                compound: text.parse().unwrap_or(0.0),
                ..PolarityScores::default()
            }
        }
    }

    fn classifier_with(translator: Arc<dyn Translator>) -> SentimentClassifier {
        SentimentClassifier::new(translator, Arc::new(VaderScorer::new()), "en")
    }

    #[tokio::test]
    async fn positive_text_through_identity_translator() {
        let classifier = classifier_with(Arc::new(IdentityTranslator::default()));
        let result = classifier.classify("I love this candidate").await;

        assert_eq!(result.label, SentimentLabel::Positive);
        assert!(result.score > 0.05);
    }

    #[tokio::test]
    async fn empty_text_is_neutral() {
        let classifier = classifier_with(Arc::new(IdentityTranslator::default()));
        let result = classifier.classify("").await;

        assert_eq!(result, SentimentResult::from_score(0.0));
        assert_eq!(result.label, SentimentLabel::Neutral);
    }

    #[tokio::test]
    async fn rate_limit_yields_error_result() {
        let classifier = classifier_with(Arc::new(FailingTranslator(
            TranslationError::RateLimited,
        )));
        let outcome = classifier.classify_detailed("Pemilu damai").await;

        assert_eq!(outcome.result, SentimentResult::error());
        assert_eq!(outcome.translated_text, None);
        assert_eq!(
            outcome.warning.as_deref(),
            Some("Terlalu banyak permintaan telah dilakukan. Silakan coba lagi nanti.")
        );
    }

    #[tokio::test]
    async fn any_translation_failure_yields_error_result() {
        let failures = [
            TranslationError::Timeout,
            TranslationError::Transport("connection refused".into()),
            TranslationError::Service {
                status: 500,
                body: "boom".into(),
            },
            TranslationError::MalformedResponse("bad".into()),
        ];
        for failure in failures {
            let classifier = classifier_with(Arc::new(FailingTranslator(failure)));
            for text in ["", "I love this candidate", "Saya benci korupsi"] {
                assert_eq!(classifier.classify(text).await, SentimentResult::error());
            }
        }
    }

    #[tokio::test]
    async fn thresholds_are_applied_to_compound() {
        let classifier = SentimentClassifier::new(
            Arc::new(IdentityTranslator::default()),
            Arc::new(LiteralScorer),
            "en",
        );

        assert_eq!(
            classifier.classify("0.05").await.label,
            SentimentLabel::Positive
        );
        assert_eq!(
            classifier.classify("-0.05").await.label,
            SentimentLabel::Negative
        );
        assert_eq!(
            classifier.classify("0.04").await.label,
            SentimentLabel::Neutral
        );
    }

    #[tokio::test]
    async fn classification_is_idempotent() {
        let classifier = classifier_with(Arc::new(IdentityTranslator::default()));
        let first = classifier.classify("What a wonderful debate").await;
        let second = classifier.classify("What a wonderful debate").await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn batch_translates_duplicates_once() {
        let translator = Arc::new(IdentityTranslator::default());
        let classifier = classifier_with(Arc::clone(&translator) as Arc<dyn Translator>);

        let cells = vec![
            Some("I love this candidate"),
            Some("I love this candidate"),
            None,
            Some("terrible debate"),
        ];
        let outcome = classifier.classify_batch(cells).await;

        assert_eq!(translator.calls.load(Ordering::SeqCst), 2);
        let labels: Vec<SentimentLabel> = outcome.results.iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            vec![
                SentimentLabel::Positive,
                SentimentLabel::Positive,
                SentimentLabel::Error,
                SentimentLabel::Negative,
            ]
        );
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[tokio::test]
    async fn batch_deduplicates_warnings() {
        let classifier = classifier_with(Arc::new(FailingTranslator(
            TranslationError::RateLimited,
        )));
        let outcome = classifier
            .classify_batch(vec![Some("a"), Some("b"), Some("c")])
            .await;

        assert_eq!(outcome.results, vec![SentimentResult::error(); 3]);
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[tokio::test]
    async fn metrics_are_recorded() {
        let metrics = Arc::new(Metrics::new(Arc::new(Registry::new())).expect("metrics"));
        let classifier = classifier_with(Arc::new(FailingTranslator(TranslationError::Timeout)))
            .with_metrics(Arc::clone(&metrics));

        classifier.classify("halo").await;

        assert_eq!(
            metrics.classifications.with_label_values(&["ERROR"]).get(),
            1
        );
        assert_eq!(
            metrics
                .translation_failures
                .with_label_values(&["timeout"])
                .get(),
            1
        );
    }
}
