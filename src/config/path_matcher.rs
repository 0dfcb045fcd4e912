use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::ConfigError;

/// 走査対象のHTMLファイルを絞り込むinclude/excludeマッチャー
#[derive(Debug, Clone)]
pub struct PathMatcher {
    include: Option<GlobSet>,
    exclude: GlobSet,
}

impl PathMatcher {
    /// include/excludeパターンからPathMatcherを作成（includeが空なら全ファイル対象）
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, ConfigError> {
        let include = if include.is_empty() {
            None
        } else {
            Some(build_set(include)?)
        };
        let exclude = build_set(exclude)?;

        Ok(Self { include, exclude })
    }

    /// ファイルが抽出対象かどうか（パスは走査ルートからの相対パス）
    pub fn should_include(&self, relative_path: &Path) -> bool {
        if self.exclude.is_match(relative_path) {
            return false;
        }
        self.include
            .as_ref()
            .is_none_or(|include| include.is_match(relative_path))
    }

    /// ディレクトリに降りるべきか（excludeのみチェック）
    pub fn should_traverse_dir(&self, relative_path: &Path) -> bool {
        !self.exclude.is_match(relative_path)
    }
}

fn build_set(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ConfigError::Pattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ConfigError::Pattern {
        pattern: patterns.join(", "),
        reason: e.to_string(),
    })
}
