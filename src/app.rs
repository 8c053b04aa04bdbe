use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;

use crate::{
    api,
    clients::{GoogleTranslateClient, GoogleTranslateConfig},
    config::Config,
    dataset::DatasetCatalog,
    insights::InsightLimits,
    observability::Telemetry,
    sentiment::{PolarityScorer, SentimentClassifier, VaderScorer},
    translation::Translator,
};

#[derive(Clone)]
pub(crate) struct AppState {
    registry: Arc<ComponentRegistry>,
}

pub struct ComponentRegistry {
    config: Arc<Config>,
    telemetry: Telemetry,
    classifier: Arc<SentimentClassifier>,
    catalog: Arc<DatasetCatalog>,
}

impl AppState {
    pub(crate) fn new(registry: ComponentRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub(crate) fn telemetry(&self) -> &Telemetry {
        &self.registry.telemetry
    }

    pub(crate) fn config(&self) -> &Config {
        &self.registry.config
    }

    pub(crate) fn classifier(&self) -> Arc<SentimentClassifier> {
        Arc::clone(&self.registry.classifier)
    }

    pub(crate) fn catalog(&self) -> Arc<DatasetCatalog> {
        Arc::clone(&self.registry.catalog)
    }

    pub(crate) fn insight_limits(&self) -> InsightLimits {
        InsightLimits {
            max_words: self.config().wordcloud_max_words(),
            top_n: self.config().top_n(),
        }
    }
}

impl ComponentRegistry {
    /// 構成情報から翻訳クライアント・VADER辞書・カタログを初期化し、共有レジストリを構築する。
    ///
    /// # Errors
    /// Telemetry の初期化や HTTP クライアント構築が失敗した場合はエラーを返す。
    pub fn build(config: Config) -> Result<Self> {
        let telemetry = Telemetry::new().context("failed to initialize telemetry")?;
        let translator = GoogleTranslateClient::new(GoogleTranslateConfig::from_config(&config))
            .context("failed to build translation client")?;
        // 辞書の読み込みは起動時の一度だけ
        let scorer = VaderScorer::new();

        Ok(Self::from_parts(
            config,
            telemetry,
            Arc::new(translator),
            Arc::new(scorer),
        ))
    }

    /// 依存を外から差し込んで構築する（テストや別実装の翻訳器向け）。
    #[must_use]
    pub fn from_parts(
        config: Config,
        telemetry: Telemetry,
        translator: Arc<dyn Translator>,
        scorer: Arc<dyn PolarityScorer>,
    ) -> Self {
        let config = Arc::new(config);
        let classifier = SentimentClassifier::new(
            translator,
            scorer,
            config.translator_pivot_language(),
        )
        .with_metrics(telemetry.metrics_arc());
        let catalog = DatasetCatalog::from_config(&config);

        Self {
            config,
            telemetry,
            classifier: Arc::new(classifier),
            catalog: Arc::new(catalog),
        }
    }

    #[must_use]
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    #[must_use]
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    #[must_use]
    pub fn classifier(&self) -> Arc<SentimentClassifier> {
        Arc::clone(&self.classifier)
    }
}

pub fn build_router(registry: ComponentRegistry) -> Router {
    let state = AppState::new(registry);
    api::router(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::SentimentLabel;
    use crate::translation::test_support::IdentityTranslator;

    fn config() -> Config {
        temp_env::with_vars(
            [
                ("SENTIMENT_DATASET_DIR", Some("fixtures")),
                ("SENTIMENT_DATASETS", Some("Sample=sample.csv")),
                ("SENTIMENT_TOP_N", Some("3")),
                ("SENTIMENT_WORDCLOUD_MAX_WORDS", Some("50")),
            ],
            || Config::from_env().expect("config loads"),
        )
    }

    #[tokio::test]
    async fn from_parts_wires_classifier_and_catalog() {
        let registry = ComponentRegistry::from_parts(
            config(),
            Telemetry::without_tracing().expect("telemetry"),
            Arc::new(IdentityTranslator::default()),
            Arc::new(VaderScorer::new()),
        );
        let state = AppState::new(registry);

        assert_eq!(state.catalog().names(), vec!["Sample"]);
        assert_eq!(
            state.insight_limits(),
            InsightLimits {
                max_words: 50,
                top_n: 3
            }
        );

        let result = state.classifier().classify("I love this candidate").await;
        assert_eq!(result.label, SentimentLabel::Positive);
        assert!(
            state
                .telemetry()
                .render_prometheus()
                .contains("sentiment_classifications_total{label=\"POSITIVE\"} 1")
        );
    }
}
