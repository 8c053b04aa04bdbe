//! 翻訳コラボレータの抽象。
//!
//! 分類器はこのトレイト越しに翻訳を呼び出し、失敗は [`TranslationError`] として
//! パターンマッチで扱う（例外的な制御フローは持たない）。
use async_trait::async_trait;
use thiserror::Error;

/// 入力言語の自動判定を指示するソース言語コード。
pub const AUTO_DETECT: &str = "auto";

/// 翻訳で受け付ける最大文字数（これ以上はサービス側で拒否される）。
pub const MAX_INPUT_CHARS: usize = 5000;

/// 翻訳失敗の理由。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    #[error("too many requests sent to the translation service")]
    RateLimited,
    #[error("translation service returned status {status}: {body}")]
    Service { status: u16, body: String },
    #[error("translation request timed out")]
    Timeout,
    #[error("translation request failed: {0}")]
    Transport(String),
    #[error("text of {chars} characters is outside the supported length (< {max})")]
    UnsupportedInput { chars: usize, max: usize },
    #[error("text must be a valid text with maximum 5000 characters")]
    InvalidPayload,
    #[error("malformed translation response: {0}")]
    MalformedResponse(String),
}

impl TranslationError {
    /// メトリクスのラベルに使う短い理由名。
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::RateLimited => "rate_limited",
            Self::Service { .. } => "service",
            Self::Timeout => "timeout",
            Self::Transport(_) => "transport",
            Self::UnsupportedInput { .. } => "unsupported_input",
            Self::InvalidPayload => "invalid_payload",
            Self::MalformedResponse(_) => "malformed_response",
        }
    }

    /// 利用者に表示する警告メッセージ。
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::RateLimited => {
                "Terlalu banyak permintaan telah dilakukan. Silakan coba lagi nanti.".to_string()
            }
            other => format!("Translation error: {other}"),
        }
    }

    /// 再試行で回復が見込めるかどうか。
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited | Self::Timeout | Self::Transport(_) => true,
            Self::Service { status, .. } => *status >= 500,
            Self::UnsupportedInput { .. } | Self::InvalidPayload | Self::MalformedResponse(_) => {
                false
            }
        }
    }
}

/// テキストを別言語へ翻訳するコラボレータ。
#[async_trait]
pub trait Translator: Send + Sync {
    /// `text`を`source`から`target`へ翻訳する。`source`には [`AUTO_DETECT`] を渡せる。
    ///
    /// # Errors
    /// 翻訳サービスが失敗した場合は [`TranslationError`] を返す。
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationError>;
}
