use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// スクリプト抽出エラー
///
/// どのエラーもその文書の抽出全体を失敗させる（部分的な結果は返さない）。
#[derive(Debug, Error)]
pub enum ExtractError {
    /// 明示的（`http:` など）または暗黙的（`//`）なスキームを持つ参照
    #[error("Schemes are not supported (analysis limitation). Bad reference: {reference}")]
    UnsupportedScheme { reference: String },

    /// URI参照として構文的に不正な参照
    #[error("Malformed reference '{reference}': {reason}")]
    MalformedReference { reference: String, reason: String },

    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse HTML document {}", path.display())]
    Parse { path: PathBuf },
}

impl ExtractError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ExtractError::Io {
            path: path.into(),
            source,
        }
    }

    /// 解析の既知の制限によるエラーかどうか（入力の欠陥やIO障害とは区別される）
    pub fn is_limitation(&self) -> bool {
        matches!(self, ExtractError::UnsupportedScheme { .. })
    }
}

/// 設定ファイル関連のエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid config: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },
}
