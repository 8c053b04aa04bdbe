//! 翻訳 → スコアリング → ラベル付けによる感情分類。
//!
//! ## 主な型
//!
//! - [`SentimentClassifier`] - 翻訳コラボレータと極性スコアラーを束ねた分類器
//! - [`PolarityScorer`] / [`VaderScorer`] - 辞書ベースの極性スコアラー
//! - [`SentimentResult`] - `{label, score}` の分類結果
use serde::{Deserialize, Serialize};

mod classifier;
mod scorer;

pub use classifier::{BatchOutcome, ClassificationOutcome, SentimentClassifier};
pub use scorer::{PolarityScorer, PolarityScores, VaderScorer};

/// これ以上のcompoundスコアはPOSITIVE。
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// これ以下のcompoundスコアはNEGATIVE。
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// 感情ラベル。ERRORは翻訳失敗時のみ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Error,
}

impl SentimentLabel {
    /// 固定閾値（±0.05）でcompoundスコアをラベルに写像する。
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= POSITIVE_THRESHOLD {
            Self::Positive
        } else if score <= NEGATIVE_THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
            Self::Neutral => "NEUTRAL",
            Self::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 分類結果。`label`は`score`から決定的に導かれる（ERRORを除く）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub score: f64,
}

impl SentimentResult {
    /// compoundスコアから結果を作る。スコアは[-1, 1]に丸め込む。
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        let score = if score.is_nan() {
            0.0
        } else {
            score.clamp(-1.0, 1.0)
        };
        Self {
            label: SentimentLabel::from_score(score),
            score,
        }
    }

    /// 翻訳失敗時の結果。
    #[must_use]
    pub const fn error() -> Self {
        Self {
            label: SentimentLabel::Error,
            score: 0.0,
        }
    }
}
