use crate::error::{PatchError, Result};
use landmark_fix_common::PhotoLimits;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 引数省略時の対象ファイル
    pub default_file: Option<PathBuf>,
    /// 書き込み前に常にバックアップを取る
    pub backup: bool,
    pub min_photos: usize,
    pub max_photos: usize,
}

impl Default for Config {
    fn default() -> Self {
        let limits = PhotoLimits::default();
        Self {
            default_file: None,
            backup: false,
            min_photos: limits.min,
            max_photos: limits.max,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PatchError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("landmark-fix").join("config.json"))
    }

    fn validate(&self) -> Result<()> {
        if self.min_photos > self.max_photos {
            return Err(PatchError::Config(format!(
                "min_photos ({}) が max_photos ({}) より大きい",
                self.min_photos, self.max_photos
            )));
        }
        Ok(())
    }

    pub fn photo_limits(&self) -> PhotoLimits {
        PhotoLimits {
            min: self.min_photos,
            max: self.max_photos,
        }
    }

    /// 引数 → 設定の順で対象ファイルを決める
    pub fn resolve_file(&self, arg: Option<PathBuf>) -> Result<PathBuf> {
        arg.or_else(|| self.default_file.clone())
            .ok_or(PatchError::MissingTargetFile)
    }

    pub fn set_default_file(&mut self, path: PathBuf) -> Result<()> {
        self.default_file = Some(path);
        self.save()
    }
}
