/// Google翻訳（gtxエンドポイント）クライアント。
///
/// タイムアウトとバックオフ付き再試行をサポートします。
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, warn};

use crate::translation::{MAX_INPUT_CHARS, TranslationError, Translator};
use crate::util::retry::RetryConfig;

/// Google翻訳クライアントの設定。
#[derive(Debug, Clone)]
pub struct GoogleTranslateConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub total_timeout: Duration,
    pub max_attempts: usize,
    pub backoff_base_ms: u64,
    pub backoff_cap_ms: u64,
}

impl GoogleTranslateConfig {
    /// サービス設定からクライアント設定を組み立てる。
    #[must_use]
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            base_url: config.translator_base_url().to_string(),
            connect_timeout: config.translator_connect_timeout(),
            total_timeout: config.translator_total_timeout(),
            max_attempts: config.translator_max_attempts().get(),
            backoff_base_ms: config.translator_backoff_base_ms(),
            backoff_cap_ms: config.translator_backoff_cap_ms(),
        }
    }
}

/// 翻訳サービスとの通信を管理するクライアント。
#[derive(Debug, Clone)]
pub struct GoogleTranslateClient {
    client: Client,
    base_url: Url,
    retry: RetryConfig,
}

impl GoogleTranslateClient {
    /// 新しい翻訳クライアントを作成する。
    ///
    /// # Errors
    /// URLのパースまたはHTTPクライアントの構築に失敗した場合はエラーを返します。
    pub fn new(config: GoogleTranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.total_timeout)
            .build()
            .context("failed to build translator HTTP client")?;

        // join() で最後のパスセグメントが落ちないよう末尾スラッシュを補う
        let mut raw_base = config.base_url;
        if !raw_base.ends_with('/') {
            raw_base.push('/');
        }
        let base_url = Url::parse(&raw_base).context("invalid translator base URL")?;

        Ok(Self {
            client,
            base_url,
            retry: RetryConfig::new(
                config.max_attempts.max(1),
                config.backoff_base_ms,
                config.backoff_cap_ms,
            ),
        })
    }

    async fn request_once(
        &self,
        url: Url,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationError> {
        let response = self
            .client
            .get(url)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|error| map_transport_error(&error))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TranslationError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|error| map_transport_error(&error))?;
        let payload: Value = serde_json::from_str(&body)
            .map_err(|error| TranslationError::MalformedResponse(error.to_string()))?;

        extract_translation(&payload)
    }
}

#[async_trait]
impl Translator for GoogleTranslateClient {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(String::new());
        }

        let chars = text.chars().count();
        if chars >= MAX_INPUT_CHARS {
            return Err(TranslationError::UnsupportedInput {
                chars,
                max: MAX_INPUT_CHARS,
            });
        }

        let url = self
            .base_url
            .join("translate_a/single")
            .map_err(|error| TranslationError::Transport(error.to_string()))?;

        let mut attempt = 0_usize;
        loop {
            let delay = self.retry.delay_for_attempt(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match self.request_once(url.clone(), text, source, target).await {
                Ok(translated) => {
                    debug!(attempt, chars, "translation succeeded");
                    return Ok(translated);
                }
                Err(error) if error.is_retryable() && self.retry.can_retry(attempt + 1) => {
                    warn!(
                        attempt,
                        reason = error.reason(),
                        error = %error,
                        "translation attempt failed, retrying"
                    );
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

fn map_transport_error(error: &reqwest::Error) -> TranslationError {
    if error.is_timeout() {
        TranslationError::Timeout
    } else {
        TranslationError::Transport(error.to_string())
    }
}

/// `[[["訳文","原文",...], ...], ...]` 形式のレスポンスから訳文を連結する。
fn extract_translation(payload: &Value) -> Result<String, TranslationError> {
    let segments = match payload.get(0) {
        Some(Value::Array(segments)) => segments,
        // 空白だけの入力などでは訳文配列がnullになる
        Some(Value::Null) => return Ok(String::new()),
        _ => {
            return Err(TranslationError::MalformedResponse(
                "missing sentence array".to_string(),
            ));
        }
    };

    let mut translated = String::new();
    for segment in segments {
        match segment.get(0) {
            Some(Value::String(part)) => translated.push_str(part),
            Some(Value::Null) => {}
            _ => {
                return Err(TranslationError::MalformedResponse(
                    "unexpected sentence segment".to_string(),
                ));
            }
        }
    }

    Ok(translated)
}
