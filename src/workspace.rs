use std::fs;
use std::path::{Path, PathBuf};

use crate::config::PathMatcher;

/// ファイルがHTMLかどうか判定
pub fn is_html_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}

/// ディレクトリ以下のHTMLファイルをパス順に収集
pub fn collect_html_files(root: &Path, path_matcher: Option<&PathMatcher>) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_files(root, root, path_matcher, &mut files);
    files.sort();
    files
}

fn collect_files(
    dir: &Path,
    root: &Path,
    path_matcher: Option<&PathMatcher>,
    files: &mut Vec<PathBuf>,
) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Failed to read directory {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let relative_path = path.strip_prefix(root).unwrap_or(&path);

        if path.is_dir() {
            let traverse = match path_matcher {
                Some(matcher) => matcher.should_traverse_dir(relative_path),
                None => !path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| name.starts_with('.') || name == "node_modules"),
            };
            if traverse {
                collect_files(&path, root, path_matcher, files);
            }
        } else if is_html_file(&path) {
            if path_matcher.is_some_and(|matcher| !matcher.should_include(relative_path)) {
                continue;
            }
            files.push(path);
        }
    }
}
