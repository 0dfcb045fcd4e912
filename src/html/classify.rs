//! 要素ごとのスクリプト断片の判定

use std::path::Path;

use phf::phf_set;
use tree_sitter::Node;

use super::attribute::{find_attribute, read_attributes, tag_name, HtmlAttribute};
use super::document::HtmlDocument;
use super::resolve::resolve_src_reference;
use crate::error::ExtractError;
use crate::loader::SourceLoader;
use crate::model::{Position, ScriptFragment, ScriptOrigin};

/// JavaScriptとして扱う `<script type>` の値
///
/// 標準の4種に加え、よくある書き間違い（`javascript`, `ecmascript`）と空文字列。
static JAVASCRIPT_TYPES: phf::Set<&'static str> = phf_set! {
    "text/javascript",
    "text/ecmascript",
    "application/javascript",
    "application/ecmascript",
    "javascript",
    "ecmascript",
    "",
};

const JAVASCRIPT_PREFIX: &str = "javascript:";
const EVENT_HANDLER_PREFIX: &str = "on";

/// 断片判定に必要な文脈
pub struct ClassifyContext<'a> {
    pub document: &'a HtmlDocument,
    /// 非相対参照の基準ディレクトリ
    pub root: Option<&'a Path>,
    pub loader: &'a dyn SourceLoader,
}

/// `type` 属性がJavaScriptを示すか（属性なしはJavaScript）
pub fn is_javascript_type(script_type: Option<&str>) -> bool {
    script_type.is_none_or(|t| JAVASCRIPT_TYPES.contains(t))
}

/// 開始タグ（`start_tag` / `self_closing_tag`）1つから断片を取り出す
///
/// `<script>` / `href` / `action` 由来の断片が先、続いて `on*` 属性が属性順に並ぶ。
pub fn classify(tag: Node, ctx: &ClassifyContext) -> Result<Vec<ScriptFragment>, ExtractError> {
    let source = ctx.document.source();
    let Some(name) = tag_name(tag, source) else {
        return Ok(Vec::new());
    };
    let attributes = read_attributes(tag, source);
    let mut fragments = Vec::new();

    match name.as_str() {
        "script" => {
            let script_type = find_attribute(&attributes, "type").and_then(HtmlAttribute::value);
            if is_javascript_type(script_type) {
                fragments.extend(script_fragment(tag, &attributes, ctx)?);
            }
        }
        "a" | "form" => {
            let (attr_name, event) = if name == "a" {
                ("href", "click")
            } else {
                ("action", "submit")
            };
            if let Some(attr) = find_attribute(&attributes, attr_name) {
                fragments.extend(javascript_uri_fragment(attr, event, ctx));
            }
        }
        _ => {}
    }

    for attr in &attributes {
        fragments.extend(event_handler_fragment(attr, ctx));
    }

    Ok(fragments)
}

/// `<script src>` なら外部ファイル、なければ本体
fn script_fragment(
    tag: Node,
    attributes: &[HtmlAttribute],
    ctx: &ClassifyContext,
) -> Result<Option<ScriptFragment>, ExtractError> {
    if let Some(src) = find_attribute(attributes, "src").and_then(HtmlAttribute::value) {
        if src.is_empty() {
            tracing::debug!("Skipping <script> with empty src in {}", ctx.document.label());
            return Ok(None);
        }
        let path = resolve_src_reference(ctx.root, ctx.document.path(), src)?;
        let content = ctx
            .loader
            .load(&path)
            .map_err(|e| ExtractError::io(&path, e))?;
        return Ok(Some(ScriptFragment::new(
            ScriptOrigin::ExternalFile,
            path.display().to_string(),
            content,
            Position::origin(),
        )));
    }

    let Some(body) = script_body(tag) else {
        return Ok(None);
    };
    let content = ctx.document.node_text(body);
    if content.is_empty() {
        return Ok(None);
    }
    Ok(Some(ScriptFragment::new(
        ScriptOrigin::EmbeddedBlock,
        ctx.document.label(),
        content,
        ctx.document.position_at(tag.end_byte()),
    )))
}

/// `<script>` の本体（`raw_text`）ノード
fn script_body(tag: Node) -> Option<Node> {
    let element = tag.parent().filter(|p| p.kind() == "script_element")?;
    let mut cursor = element.walk();
    element
        .children(&mut cursor)
        .find(|child| child.kind() == "raw_text")
}

/// `javascript:` URI（接頭辞の後が空なら対象外）
fn javascript_uri_fragment(
    attr: &HtmlAttribute,
    event: &str,
    ctx: &ClassifyContext,
) -> Option<ScriptFragment> {
    let value = attr.value()?;
    let prefix = value.get(..JAVASCRIPT_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(JAVASCRIPT_PREFIX) || value.len() == JAVASCRIPT_PREFIX.len() {
        return None;
    }
    let start = value_position(attr, JAVASCRIPT_PREFIX.len(), ctx)?;
    Some(ScriptFragment::new(
        ScriptOrigin::EventHandler {
            event: event.to_string(),
        },
        ctx.document.label(),
        &value[JAVASCRIPT_PREFIX.len()..],
        start,
    ))
}

/// `on*` 属性（要素名を問わない。不正なHTMLでは余分に拾うことがある）
fn event_handler_fragment(attr: &HtmlAttribute, ctx: &ClassifyContext) -> Option<ScriptFragment> {
    let event = attr.name.strip_prefix(EVENT_HANDLER_PREFIX)?;
    let value = attr.value().filter(|v| !v.is_empty())?;
    let start = value_position(attr, 0, ctx)?;
    Some(ScriptFragment::new(
        ScriptOrigin::EventHandler {
            event: event.to_string(),
        },
        ctx.document.label(),
        value,
        start,
    ))
}

/// 属性値の先頭から `skip` バイト後ろの位置
///
/// 文字参照のデコードで値がずれている場合は、元テキスト上の文字境界に丸める。
fn value_position(attr: &HtmlAttribute, skip: usize, ctx: &ClassifyContext) -> Option<Position> {
    let source = ctx.document.source();
    let mut offset = (attr.value_start? + skip).min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    Some(ctx.document.position_at(offset))
}
