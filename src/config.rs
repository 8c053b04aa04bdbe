use std::{env, net::SocketAddr, num::NonZeroUsize, path::PathBuf, time::Duration};

use thiserror::Error;

const DEFAULT_DATASETS: &str = "Anies-CakImin=Dataset_Anies-CakImin.xlsx,\
Prabowo-Gibran=Dataset_Prabowo-Gibran.xlsx,\
Ganjar-Mahfud=Dataset_Ganjar-Mahfud.xlsx";

/// データセットカタログの1エントリ（表示名とファイル名）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetEntry {
    pub name: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    http_bind: SocketAddr,
    translator_base_url: String,
    translator_pivot_language: String,
    translator_connect_timeout: Duration,
    translator_total_timeout: Duration,
    translator_max_attempts: NonZeroUsize,
    translator_backoff_base_ms: u64,
    translator_backoff_cap_ms: u64,
    dataset_dir: PathBuf,
    datasets: Vec<DatasetEntry>,
    max_upload_bytes: usize,
    wordcloud_max_words: usize,
    top_n: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl Config {
    /// 環境変数からサービスの設定値を読み込み、検証する。
    ///
    /// すべての項目にデフォルト値があるため、未設定の変数はエラーにならない。
    ///
    /// # Errors
    /// 数値／アドレス／データセット定義のパースに失敗した場合は [`ConfigError`] を返す。
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_bind = parse_socket_addr("SENTIMENT_HTTP_BIND", "0.0.0.0:9010")?;

        // Translation service settings
        let translator_base_url = env::var("TRANSLATOR_BASE_URL")
            .unwrap_or_else(|_| "https://translate.googleapis.com/".to_string());
        let translator_pivot_language =
            env::var("TRANSLATOR_PIVOT_LANGUAGE").unwrap_or_else(|_| "en".to_string());
        let translator_connect_timeout =
            parse_duration_ms("TRANSLATOR_CONNECT_TIMEOUT_MS", 3000)?;
        let translator_total_timeout = parse_duration_ms("TRANSLATOR_TOTAL_TIMEOUT_MS", 10000)?;

        // Retry settings (exponential backoff + jitter). 1 = 再試行なし
        let translator_max_attempts = parse_non_zero_usize("TRANSLATOR_MAX_ATTEMPTS", 1)?;
        let translator_backoff_base_ms = parse_u64("TRANSLATOR_BACKOFF_BASE_MS", 250)?;
        let translator_backoff_cap_ms = parse_u64("TRANSLATOR_BACKOFF_CAP_MS", 10000)?;

        // Dataset catalog
        let dataset_dir =
            PathBuf::from(env::var("SENTIMENT_DATASET_DIR").unwrap_or_else(|_| "data".into()));
        let datasets = parse_datasets("SENTIMENT_DATASETS", DEFAULT_DATASETS)?;

        let max_upload_bytes = parse_usize("SENTIMENT_MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?;
        let wordcloud_max_words = parse_usize("SENTIMENT_WORDCLOUD_MAX_WORDS", 200)?;
        let top_n = parse_usize("SENTIMENT_TOP_N", 10)?;

        Ok(Self {
            http_bind,
            translator_base_url,
            translator_pivot_language,
            translator_connect_timeout,
            translator_total_timeout,
            translator_max_attempts,
            translator_backoff_base_ms,
            translator_backoff_cap_ms,
            dataset_dir,
            datasets,
            max_upload_bytes,
            wordcloud_max_words,
            top_n,
        })
    }

    #[must_use]
    pub fn http_bind(&self) -> SocketAddr {
        self.http_bind
    }

    #[must_use]
    pub fn translator_base_url(&self) -> &str {
        &self.translator_base_url
    }

    #[must_use]
    pub fn translator_pivot_language(&self) -> &str {
        &self.translator_pivot_language
    }

    #[must_use]
    pub fn translator_connect_timeout(&self) -> Duration {
        self.translator_connect_timeout
    }

    #[must_use]
    pub fn translator_total_timeout(&self) -> Duration {
        self.translator_total_timeout
    }

    #[must_use]
    pub fn translator_max_attempts(&self) -> NonZeroUsize {
        self.translator_max_attempts
    }

    #[must_use]
    pub fn translator_backoff_base_ms(&self) -> u64 {
        self.translator_backoff_base_ms
    }

    #[must_use]
    pub fn translator_backoff_cap_ms(&self) -> u64 {
        self.translator_backoff_cap_ms
    }

    #[must_use]
    pub fn dataset_dir(&self) -> &std::path::Path {
        &self.dataset_dir
    }

    #[must_use]
    pub fn datasets(&self) -> &[DatasetEntry] {
        &self.datasets
    }

    #[must_use]
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    #[must_use]
    pub fn wordcloud_max_words(&self) -> usize {
        self.wordcloud_max_words
    }

    #[must_use]
    pub fn top_n(&self) -> usize {
        self.top_n
    }
}

fn parse_socket_addr(name: &'static str, default: &str) -> Result<SocketAddr, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());

    raw.parse().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_non_zero_usize(name: &'static str, default: usize) -> Result<NonZeroUsize, ConfigError> {
    let parsed = parse_usize(name, default)?;
    NonZeroUsize::new(parsed).ok_or_else(|| ConfigError::Invalid {
        name,
        source: anyhow::anyhow!("must be greater than zero"),
    })
}

fn parse_duration_ms(name: &'static str, default_ms: u64) -> Result<Duration, ConfigError> {
    let ms = parse_u64(name, default_ms)?;
    if ms == 0 {
        return Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("timeout must be greater than zero"),
        });
    }
    Ok(Duration::from_millis(ms))
}

fn parse_usize(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.trim().parse::<usize>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_u64(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.trim().parse::<u64>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

/// `名前=ファイル名` をカンマ区切りで並べた定義をパースする。
fn parse_datasets(name: &'static str, default: &str) -> Result<Vec<DatasetEntry>, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (label, file) = entry.split_once('=').ok_or_else(|| ConfigError::Invalid {
                name,
                source: anyhow::anyhow!("expected `name=file`, got `{entry}`"),
            })?;
            let (label, file) = (label.trim(), file.trim());
            if label.is_empty() || file.is_empty() {
                return Err(ConfigError::Invalid {
                    name,
                    source: anyhow::anyhow!("empty dataset name or file in `{entry}`"),
                });
            }
            Ok(DatasetEntry {
                name: label.to_string(),
                file_name: file.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KEYS: [&str; 13] = [
        "SENTIMENT_HTTP_BIND",
        "TRANSLATOR_BASE_URL",
        "TRANSLATOR_PIVOT_LANGUAGE",
        "TRANSLATOR_CONNECT_TIMEOUT_MS",
        "TRANSLATOR_TOTAL_TIMEOUT_MS",
        "TRANSLATOR_MAX_ATTEMPTS",
        "TRANSLATOR_BACKOFF_BASE_MS",
        "TRANSLATOR_BACKOFF_CAP_MS",
        "SENTIMENT_DATASET_DIR",
        "SENTIMENT_DATASETS",
        "SENTIMENT_MAX_UPLOAD_BYTES",
        "SENTIMENT_WORDCLOUD_MAX_WORDS",
        "SENTIMENT_TOP_N",
    ];

    fn with_env<R>(overrides: &[(&str, &str)], f: impl FnOnce() -> R) -> R {
        let vars: Vec<(&str, Option<&str>)> = ALL_KEYS
            .iter()
            .map(|key| {
                let value = overrides
                    .iter()
                    .find(|(name, _)| name == key)
                    .map(|(_, value)| *value);
                (*key, value)
            })
            .collect();
        temp_env::with_vars(vars, f)
    }

    #[test]
    fn from_env_uses_defaults_when_optional_missing() {
        let config = with_env(&[], || Config::from_env().expect("config should load"));

        assert_eq!(config.http_bind(), "0.0.0.0:9010".parse().unwrap());
        assert_eq!(
            config.translator_base_url(),
            "https://translate.googleapis.com/"
        );
        assert_eq!(config.translator_pivot_language(), "en");
        assert_eq!(
            config.translator_connect_timeout(),
            Duration::from_millis(3000)
        );
        assert_eq!(
            config.translator_total_timeout(),
            Duration::from_millis(10000)
        );
        assert_eq!(config.translator_max_attempts().get(), 1);
        assert_eq!(config.translator_backoff_base_ms(), 250);
        assert_eq!(config.translator_backoff_cap_ms(), 10000);
        assert_eq!(config.dataset_dir(), std::path::Path::new("data"));
        assert_eq!(config.max_upload_bytes(), 10 * 1024 * 1024);
        assert_eq!(config.wordcloud_max_words(), 200);
        assert_eq!(config.top_n(), 10);

        let names: Vec<&str> = config.datasets().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Anies-CakImin", "Prabowo-Gibran", "Ganjar-Mahfud"]);
        assert_eq!(
            config.datasets()[1].file_name,
            "Dataset_Prabowo-Gibran.xlsx"
        );
    }

    #[test]
    fn from_env_overrides_values() {
        let config = with_env(
            &[
                ("SENTIMENT_HTTP_BIND", "127.0.0.1:8088"),
                ("TRANSLATOR_BASE_URL", "http://translator.local/"),
                ("TRANSLATOR_PIVOT_LANGUAGE", "id"),
                ("TRANSLATOR_TOTAL_TIMEOUT_MS", "2500"),
                ("TRANSLATOR_MAX_ATTEMPTS", "4"),
                ("SENTIMENT_DATASET_DIR", "/srv/datasets"),
                ("SENTIMENT_DATASETS", "A=a.csv, B = b.xlsx"),
                ("SENTIMENT_TOP_N", "5"),
            ],
            || Config::from_env().expect("config should load"),
        );

        assert_eq!(config.http_bind(), "127.0.0.1:8088".parse().unwrap());
        assert_eq!(config.translator_base_url(), "http://translator.local/");
        assert_eq!(config.translator_pivot_language(), "id");
        assert_eq!(
            config.translator_total_timeout(),
            Duration::from_millis(2500)
        );
        assert_eq!(config.translator_max_attempts().get(), 4);
        assert_eq!(config.dataset_dir(), std::path::Path::new("/srv/datasets"));
        assert_eq!(
            config.datasets(),
            &[
                DatasetEntry {
                    name: "A".into(),
                    file_name: "a.csv".into(),
                },
                DatasetEntry {
                    name: "B".into(),
                    file_name: "b.xlsx".into(),
                },
            ]
        );
        assert_eq!(config.top_n(), 5);
    }

    #[test]
    fn from_env_rejects_zero_attempts() {
        let error = with_env(&[("TRANSLATOR_MAX_ATTEMPTS", "0")], || {
            Config::from_env().expect_err("zero attempts should fail")
        });

        assert!(matches!(
            error,
            ConfigError::Invalid {
                name: "TRANSLATOR_MAX_ATTEMPTS",
                ..
            }
        ));
    }

    #[test]
    fn from_env_rejects_malformed_dataset_entry() {
        let error = with_env(&[("SENTIMENT_DATASETS", "Anies-CakImin")], || {
            Config::from_env().expect_err("entry without `=` should fail")
        });

        assert!(matches!(
            error,
            ConfigError::Invalid {
                name: "SENTIMENT_DATASETS",
                ..
            }
        ));
    }

    #[test]
    fn from_env_rejects_invalid_bind() {
        let error = with_env(&[("SENTIMENT_HTTP_BIND", "not-an-addr")], || {
            Config::from_env().expect_err("invalid bind should fail")
        });

        assert!(matches!(
            error,
            ConfigError::Invalid {
                name: "SENTIMENT_HTTP_BIND",
                ..
            }
        ));
    }
}
