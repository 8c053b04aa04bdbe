use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{Dataset, DatasetError};
use crate::config::{Config, DatasetEntry};

/// 名前で選べる固定データセットの一覧。
#[derive(Debug, Clone)]
pub struct DatasetCatalog {
    root: PathBuf,
    entries: Vec<DatasetEntry>,
}

impl DatasetCatalog {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, entries: Vec<DatasetEntry>) -> Self {
        Self {
            root: root.into(),
            entries,
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.dataset_dir(), config.datasets().to_vec())
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 名前に対応するファイルパスを返す。
    #[must_use]
    pub fn path_of(&self, name: &str) -> Option<PathBuf> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| self.root.join(&entry.file_name))
    }

    /// 選択されたデータセットを読み込み、選択順に連結する。
    ///
    /// 未知の名前は無視する。何も選択されなかった場合は`None`。
    ///
    /// # Errors
    /// 選択されたファイルの読み込みまたはパースに失敗した場合は [`DatasetError`] を返す。
    pub fn load_selected<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Option<Dataset>, DatasetError> {
        let mut loaded = Vec::new();
        for name in names {
            let name = name.as_ref();
            let Some(path) = self.path_of(name) else {
                warn!(dataset = name, "ignoring unknown dataset name");
                continue;
            };
            let dataset = Dataset::load_path(&path)?;
            info!(dataset = name, rows = dataset.len(), "dataset loaded");
            loaded.push(dataset);
        }

        if loaded.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Dataset::concat(loaded)))
        }
    }
}
