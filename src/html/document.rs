//! 解析済みHTML文書とオフセット→行・列変換

use std::fmt;
use std::path::{Path, PathBuf};

use tree_sitter::{Node, Tree};

use crate::model::Position;

/// バイトオフセットを0始まりの行・列に変換するための行頭テーブル
///
/// 改行は `\n`, `\r\n`, 単独の `\r` のいずれか。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = vec![0];
        for (i, &b) in bytes.iter().enumerate() {
            match b {
                b'\n' => line_starts.push(i + 1),
                b'\r' if bytes.get(i + 1) != Some(&b'\n') => line_starts.push(i + 1),
                _ => {}
            }
        }
        Self {
            line_starts,
            len: text.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// `text` 内のバイトオフセットの位置を返す
    ///
    /// `text` はこのインデックスを作ったテキストであること。
    /// 範囲外や文字境界でないオフセットは呼び出し側のバグなのでpanicする。
    pub fn position(&self, text: &str, offset: usize) -> Position {
        assert_eq!(text.len(), self.len, "LineIndex used with a different text");
        assert!(
            offset <= self.len,
            "offset {} out of range for document of {} bytes",
            offset,
            self.len
        );
        assert!(
            text.is_char_boundary(offset),
            "offset {} is not on a char boundary",
            offset
        );

        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let line_start = self.line_starts[line];
        let column: usize = text[line_start..offset].chars().map(char::len_utf16).sum();

        Position::new(line as u32, column as u32)
    }
}

/// 解析済みのHTML文書
///
/// 抽出結果と一緒に呼び出し側へ渡される（診断・レポート用）。
pub struct HtmlDocument {
    path: PathBuf,
    source: String,
    tree: Tree,
    line_index: LineIndex,
}

impl HtmlDocument {
    pub(crate) fn new(path: PathBuf, source: String, tree: Tree) -> Self {
        let line_index = LineIndex::new(&source);
        Self {
            path,
            source,
            tree,
            line_index,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 断片のラベルに使うパス文字列
    pub fn label(&self) -> String {
        self.path.display().to_string()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// バイトオフセット→0始まりの行・列
    pub fn position_at(&self, offset: usize) -> Position {
        self.line_index.position(&self.source, offset)
    }

    /// ノードのテキストを取得
    pub fn node_text(&self, node: Node) -> &str {
        &self.source[node.byte_range()]
    }
}

impl fmt::Debug for HtmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlDocument")
            .field("path", &self.path)
            .field("len", &self.source.len())
            .field("lines", &self.line_index.line_count())
            .finish()
    }
}
