// src/config.rs

pub mod mapping;

pub use self::mapping::AutomaticMapping;

use crate::{
    constants,
    error::{AppError, AppResult},
};
use anyhow::{Context, anyhow};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

/// 终端配色主题
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Color,
    Plain,
    /// 跟随终端能力自动判断；无法识别的取值也按此处理
    #[default]
    #[serde(other)]
    Auto,
}

impl Theme {
    pub fn apply(&self) {
        match self {
            Theme::Auto => colored::control::unset_override(),
            Theme::Color => colored::control::set_override(true),
            Theme::Plain => colored::control::set_override(false),
        }
    }
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(constants::DEFAULT_DIR_NAME)
}

fn default_bulk_delay_secs() -> u64 {
    constants::DEFAULT_BULK_DELAY_SECS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_bulk_delay_secs")]
    pub bulk_delay_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            theme: Theme::default(),
            bulk_delay_secs: default_bulk_delay_secs(),
        }
    }
}

impl AppConfig {
    pub fn default_download_dir() -> PathBuf {
        default_download_dir()
    }

    pub fn bulk_delay(&self) -> Duration {
        Duration::from_secs(self.bulk_delay_secs)
    }
}

/// 配置目录：`config.json` 与 `automatic.json` 均位于其中
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 优先使用命令行/环境变量指定的目录，其次是系统标准配置目录。
    pub fn locate(override_dir: Option<&Path>) -> AppResult<Self> {
        if let Some(dir) = override_dir {
            return Ok(Self::new(dir));
        }
        let dir = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .ok_or_else(|| AppError::Other(anyhow!("无法获取用户配置目录")))?
            .join(constants::APP_DIR_NAME);
        Ok(Self::new(dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(constants::CONFIG_FILE_NAME)
    }

    pub fn mapping_path(&self) -> PathBuf {
        self.dir.join(constants::MAPPING_FILE_NAME)
    }

    /// 读取配置。文件缺失或损坏时回退到默认值，从不失败。
    pub fn load(&self) -> AppConfig {
        let path = self.config_path();
        if !path.is_file() {
            info!("配置文件 {:?} 不存在，使用默认配置。", path);
            return AppConfig::default();
        }
        match fs::read_to_string(&path)
            .map_err(AppError::from)
            .and_then(|content| serde_json::from_str::<AppConfig>(&content).map_err(AppError::from))
        {
            Ok(config) => {
                debug!("已加载配置: {:?}", config);
                config
            }
            Err(e) => {
                warn!("配置文件 {:?} 无法读取或已损坏 ({})，使用默认配置。", path, e);
                AppConfig::default()
            }
        }
    }

    /// 原子地写入配置：先写临时文件，再替换目标文件。
    pub fn save(&self, config: &AppConfig) -> AppResult<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("创建配置目录 '{}' 失败", self.dir.display()))?;
        let json_content = serde_json::to_string_pretty(config)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(json_content.as_bytes())?;
        tmp.persist(self.config_path())?;
        info!("配置已保存至 {}", self.config_path().display());
        Ok(())
    }

    /// 交给 yt-dlp 的 `--config-location`，用户可自行编辑
    pub fn ytdlp_config_path(&self) -> PathBuf {
        self.dir.join(constants::YTDLP_CONFIG_FILE_NAME)
    }

    /// 文件不存在时写入一个只有注释的空配置；已存在的文件保持不变。
    pub fn ensure_ytdlp_config(&self) -> AppResult<PathBuf> {
        let path = self.ytdlp_config_path();
        if !path.is_file() {
            fs::create_dir_all(&self.dir)?;
            fs::write(&path, constants::YTDLP_CONFIG_TEMPLATE)?;
            info!("已创建 yt-dlp 配置文件 {}", path.display());
        }
        Ok(path)
    }

    pub fn load_mapping(&self) -> AutomaticMapping {
        AutomaticMapping::load(&self.mapping_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        assert_eq!(store.load(), AppConfig::default());
    }

    #[test]
    fn test_corrupt_config_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        fs::write(store.config_path(), "{ not json").unwrap();
        assert_eq!(store.load(), AppConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("nested"));
        let config = AppConfig {
            download_dir: PathBuf::from("/srv/media"),
            theme: Theme::Plain,
            bulk_delay_secs: 2,
        };
        store.save(&config).unwrap();
        assert_eq!(store.load(), config);
    }

    #[test]
    fn test_ytdlp_config_created_once() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("cfg"));
        let path = store.ensure_ytdlp_config().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# yt-dlp config file\n");

        fs::write(&path, "--no-mtime\n").unwrap();
        assert_eq!(store.ensure_ytdlp_config().unwrap(), path);
        assert_eq!(fs::read_to_string(&path).unwrap(), "--no-mtime\n");
    }

    #[test]
    fn test_theme_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Theme::Auto).unwrap(), "\"auto\"");
        assert_eq!(serde_json::from_str::<Theme>("\"plain\"").unwrap(), Theme::Plain);
    }

    #[test]
    fn test_partial_config_and_unknown_theme() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        fs::write(
            store.config_path(),
            r#"{"download_dir": "/srv/media", "theme": "solarized"}"#,
        )
        .unwrap();
        let config = store.load();
        assert_eq!(config.download_dir, PathBuf::from("/srv/media"));
        assert_eq!(config.theme, Theme::Auto);
        assert_eq!(config.bulk_delay_secs, constants::DEFAULT_BULK_DELAY_SECS);
    }
}
