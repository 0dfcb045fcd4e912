use std::fmt;

use serde::Serialize;

use super::span::Position;

/// スクリプト断片の出所
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScriptOrigin {
    /// `<script src="...">` で参照される外部ファイル
    ExternalFile,
    /// `<script>...</script>` の本体
    EmbeddedBlock,
    /// `on*` 属性、または `<a href="javascript:...">` / `<form action="javascript:...">`
    EventHandler { event: String },
}

impl ScriptOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptOrigin::ExternalFile => "external",
            ScriptOrigin::EmbeddedBlock => "embedded",
            ScriptOrigin::EventHandler { .. } => "event-handler",
        }
    }
}

/// HTMLから抽出されたJavaScriptの断片
///
/// 抽出時に一度だけ作られ、以降変更されない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptFragment {
    #[serde(flatten)]
    origin: ScriptOrigin,
    source_label: String,
    content: String,
    start: Position,
}

impl ScriptFragment {
    pub fn new(
        origin: ScriptOrigin,
        source_label: impl Into<String>,
        content: impl Into<String>,
        start: Position,
    ) -> Self {
        Self {
            origin,
            source_label: source_label.into(),
            content: content.into(),
            start,
        }
    }

    pub fn origin(&self) -> &ScriptOrigin {
        &self.origin
    }

    /// 診断用のラベル（HTMLファイル、外部スクリプトの場合は解決済みパス）
    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// `content` の開始位置（自身のソーステキスト基準）
    pub fn start(&self) -> Position {
        self.start
    }

    /// イベント名（EventHandlerの場合のみ）
    pub fn event_name(&self) -> Option<&str> {
        match &self.origin {
            ScriptOrigin::EventHandler { event } => Some(event),
            _ => None,
        }
    }
}

impl fmt::Display for ScriptFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({}", self.source_label, self.start, self.origin.as_str())?;
        if let Some(event) = self.event_name() {
            write!(f, " {}", event)?;
        }
        write!(f, ")")
    }
}
