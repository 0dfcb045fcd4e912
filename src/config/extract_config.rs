use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::path_matcher::PathMatcher;
use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "htmlscripts.json";

/// htmlscripts.json の設定
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractConfig {
    /// 走査対象のglobパターン（空の場合は全HTMLファイル対象）
    #[serde(default)]
    pub include: Vec<String>,
    /// 除外対象のglobパターン
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    /// 非相対な `src` 参照の基準ディレクトリ（未指定ならHTMLファイルの親ディレクトリ）
    #[serde(default)]
    pub root: Option<PathBuf>,
}

fn default_exclude() -> Vec<String> {
    vec![
        "**/node_modules".to_string(),
        "**/node_modules/**".to_string(),
        "**/.*".to_string(),
        "**/.*/**".to_string(),
    ]
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: default_exclude(),
            root: None,
        }
    }
}

impl ExtractConfig {
    /// 指定ディレクトリからhtmlscripts.jsonを読み込む
    pub fn load_from_dir(dir: &Path) -> Self {
        Self::load_from_path(&dir.join(CONFIG_FILE_NAME))
    }

    /// 指定パスから読み込む（存在しない・壊れている場合はデフォルト）
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match Self::read(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// 指定パスから読み込む（エラーをそのまま返す）
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&content)?;
        // 相対rootは設定ファイルの場所基準
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            config.root = config
                .root
                .map(|root| if root.is_relative() { dir.join(root) } else { root });
        }
        Ok(config)
    }

    /// PathMatcherを作成
    pub fn create_path_matcher(&self) -> Result<PathMatcher, ConfigError> {
        PathMatcher::new(&self.include, &self.exclude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExtractConfig::default();
        assert!(config.include.is_empty());
        assert!(config.exclude.contains(&"**/node_modules".to_string()));
        assert!(config.root.is_none());
    }

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "include": ["pages/**/*.html"],
            "exclude": [],
            "root": "public"
        }"#;
        let config: ExtractConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.include, vec!["pages/**/*.html".to_string()]);
        assert!(config.exclude.is_empty());
        assert_eq!(config.root, Some(PathBuf::from("public")));
    }

    #[test]
    fn test_empty_config() {
        let config: ExtractConfig = serde_json::from_str("{}").unwrap();
        assert!(config.include.is_empty());
        assert_eq!(config.exclude, default_exclude());
    }

    #[test]
    fn test_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExtractConfig::load_from_dir(dir.path());
        assert_eq!(config.exclude, default_exclude());
    }

    #[test]
    fn test_invalid_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "{ not json").unwrap();

        assert!(matches!(
            ExtractConfig::read(&dir.path().join(CONFIG_FILE_NAME)),
            Err(ConfigError::Deserialize(_))
        ));
        let config = ExtractConfig::load_from_dir(dir.path());
        assert_eq!(config.exclude, default_exclude());
    }

    #[test]
    fn test_relative_root_is_resolved_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{ "root": "public" }"#).unwrap();

        let config = ExtractConfig::load_from_dir(dir.path());
        assert_eq!(config.root, Some(dir.path().join("public")));
    }
}
