//! HTML文書と外部スクリプトの読み込み

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// ファイル内容をUTF-8テキストとして読み込む
pub trait SourceLoader: Send + Sync {
    fn load(&self, path: &Path) -> io::Result<String>;
}

/// ファイルシステムから読み込むローダー
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        tracing::debug!("Loading {}", path.display());
        fs::read_to_string(path)
    }
}

/// メモリ上のファイルを返すローダー（ファイルシステムを使わない呼び出し元向け）
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }
}
