//! HTML文書を一度だけ走査してスクリプト断片を集める

use std::path::{Path, PathBuf};

use tree_sitter::Node;

use super::classify::{classify, ClassifyContext};
use super::document::HtmlDocument;
use super::parser::HtmlParser;
use crate::error::ExtractError;
use crate::loader::{FsLoader, SourceLoader};
use crate::model::ScriptFragment;

/// 抽出結果：解析済み文書と、文書順に並んだ断片
#[derive(Debug)]
pub struct ParsedHtml {
    document: HtmlDocument,
    fragments: Vec<ScriptFragment>,
}

impl ParsedHtml {
    pub fn document(&self) -> &HtmlDocument {
        &self.document
    }

    /// 深さ優先の走査順に並んだ全断片
    pub fn fragments(&self) -> &[ScriptFragment] {
        &self.fragments
    }

    pub fn into_parts(self) -> (HtmlDocument, Vec<ScriptFragment>) {
        (self.document, self.fragments)
    }
}

/// HTMLからJavaScript断片を抽出するエクストラクター
///
/// 保持するのは設定だけなので、複数の文書を並行して抽出してよい。
pub struct ScriptExtractor {
    root: Option<PathBuf>,
    loader: Box<dyn SourceLoader>,
}

impl ScriptExtractor {
    pub fn new() -> Self {
        Self {
            root: None,
            loader: Box::new(FsLoader),
        }
    }

    /// 非相対参照の基準ディレクトリ（未指定ならHTMLファイルの親ディレクトリ）
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_loader(mut self, loader: impl SourceLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    /// HTMLファイルを読み込んで抽出
    pub fn extract(&self, html_file: &Path) -> Result<ParsedHtml, ExtractError> {
        let source = self
            .loader
            .load(html_file)
            .map_err(|e| ExtractError::io(html_file, e))?;
        self.extract_source(html_file, source)
    }

    /// 読み込み済みのHTMLテキストから抽出
    ///
    /// `path` は断片のラベルと、`.` で始まる参照の解決に使われる。
    pub fn extract_source(
        &self,
        path: impl Into<PathBuf>,
        source: impl Into<String>,
    ) -> Result<ParsedHtml, ExtractError> {
        let path = path.into();
        let source = source.into();

        let mut html_parser = HtmlParser::new();
        let Some(tree) = html_parser.parse(&source) else {
            return Err(ExtractError::Parse { path });
        };
        let document = HtmlDocument::new(path, source, tree);

        let root = match &self.root {
            Some(root) => Some(root.as_path()),
            None => document.path().parent(),
        };
        let ctx = ClassifyContext {
            document: &document,
            root,
            loader: self.loader.as_ref(),
        };

        let mut fragments = Vec::new();
        visit_tags(document.root_node(), |tag| {
            let found = classify(tag, &ctx)?;
            for fragment in &found {
                tracing::debug!("Found script fragment {}", fragment);
            }
            fragments.extend(found);
            Ok(())
        })?;

        tracing::debug!(
            "Extracted {} script fragments from {}",
            fragments.len(),
            document.label()
        );

        Ok(ParsedHtml {
            document,
            fragments,
        })
    }
}

impl Default for ScriptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// 開始タグを文書順（深さ優先）に訪問
///
/// エラー回復で `ERROR` ノードの下に置かれたタグも訪問する。
fn visit_tags<'a, F>(root: Node<'a>, mut visit: F) -> Result<(), ExtractError>
where
    F: FnMut(Node<'a>) -> Result<(), ExtractError>,
{
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if matches!(node.kind(), "start_tag" | "self_closing_tag") {
            visit(node)?;
        }

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemoryLoader;
    use crate::model::{Position, ScriptOrigin};
    use rstest::{fixture, rstest};

    #[fixture]
    fn extractor() -> ScriptExtractor {
        ScriptExtractor::new().with_loader(
            MemoryLoader::new()
                .with_file("site/js/app.js", "app();")
                .with_file("site/pages/./local.js", "local();"),
        )
    }

    fn extract(extractor: &ScriptExtractor, html: &str) -> Vec<ScriptFragment> {
        extractor
            .extract_source("site/pages/index.html", html)
            .unwrap()
            .into_parts()
            .1
    }

    fn handler(event: &str) -> ScriptOrigin {
        ScriptOrigin::EventHandler {
            event: event.to_string(),
        }
    }

    #[rstest]
    fn test_inline_scripts_in_document_order(extractor: ScriptExtractor) {
        let html = "<html>\n<head><script>var a = 1;</script></head>\n<body>\n  <script>var b = 2;</script>\n</body>\n</html>";
        let fragments = extract(&extractor, html);

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].origin(), &ScriptOrigin::EmbeddedBlock);
        assert_eq!(fragments[0].content(), "var a = 1;");
        assert_eq!(fragments[0].start(), Position::new(1, 14));
        assert_eq!(fragments[0].source_label(), "site/pages/index.html");
        assert_eq!(fragments[1].content(), "var b = 2;");
        assert_eq!(fragments[1].start(), Position::new(3, 10));
    }

    #[rstest]
    #[case::absent("<script>x()</script>")]
    #[case::empty_type(r#"<script type="">x()</script>"#)]
    #[case::text_javascript(r#"<script type="text/javascript">x()</script>"#)]
    #[case::uppercase_tag("<SCRIPT>x()</SCRIPT>")]
    fn test_javascript_script_types(extractor: ScriptExtractor, #[case] html: &str) {
        let fragments = extract(&extractor, html);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].origin(), &ScriptOrigin::EmbeddedBlock);
        assert_eq!(fragments[0].content(), "x()");
    }

    #[rstest]
    #[case::vbscript(r#"<script type="text/vbscript">MsgBox "hi"</script>"#)]
    #[case::template(r#"<script type="text/ng-template" id="t.html"><div></div></script>"#)]
    #[case::empty_body("<script></script>")]
    #[case::empty_src(r#"<script src="">ignored()</script>"#)]
    fn test_scripts_without_fragments(extractor: ScriptExtractor, #[case] html: &str) {
        assert!(extract(&extractor, html).is_empty());
    }

    #[rstest]
    fn test_external_script_uses_root(extractor: ScriptExtractor) {
        let extractor = extractor.with_root("site");
        let fragments = extract(&extractor, r#"<script src="js/app.js"></script>"#);

        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].origin(), &ScriptOrigin::ExternalFile);
        assert_eq!(fragments[0].content(), "app();");
        assert_eq!(fragments[0].start(), Position::origin());
        assert_eq!(
            PathBuf::from(fragments[0].source_label()),
            Path::new("site").join("js/app.js")
        );
    }

    #[rstest]
    fn test_external_script_relative_to_page(extractor: ScriptExtractor) {
        let extractor = extractor.with_root("site");
        let fragments = extract(&extractor, r#"<script src="./local.js"></script>"#);
        assert_eq!(fragments[0].content(), "local();");
    }

    #[rstest]
    fn test_missing_external_script_fails(extractor: ScriptExtractor) {
        let err = extractor
            .extract_source("site/pages/index.html", r#"<script>ok()</script><script src="missing.js"></script>"#)
            .unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
    }

    #[rstest]
    fn test_javascript_uri_on_anchor_and_form(extractor: ScriptExtractor) {
        let html = r#"<a href="javascript:alert(1)">x</a><form action="JavaScript:check()"></form>"#;
        let fragments = extract(&extractor, html);

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].origin(), &handler("click"));
        assert_eq!(fragments[0].content(), "alert(1)");
        assert_eq!(fragments[0].start(), Position::new(0, 20));
        assert_eq!(fragments[1].origin(), &handler("submit"));
        assert_eq!(fragments[1].content(), "check()");
    }

    #[rstest]
    #[case::empty_payload(r#"<a href="javascript:">x</a>"#)]
    #[case::plain_link(r#"<a href="/home">x</a>"#)]
    #[case::href_on_div(r#"<div href="javascript:go()"></div>"#)]
    fn test_no_javascript_uri(extractor: ScriptExtractor, #[case] html: &str) {
        assert!(extract(&extractor, html).is_empty());
    }

    #[rstest]
    fn test_on_attributes_in_attribute_order(extractor: ScriptExtractor) {
        let html = r#"<div onclick="foo()" ondblclick="bar()"></div>"#;
        let fragments = extract(&extractor, html);

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].event_name(), Some("click"));
        assert_eq!(fragments[0].content(), "foo()");
        assert_eq!(fragments[0].start(), Position::new(0, 14));
        assert_eq!(fragments[1].event_name(), Some("dblclick"));
        assert_eq!(fragments[1].content(), "bar()");
    }

    #[rstest]
    fn test_uri_handler_precedes_on_attributes(extractor: ScriptExtractor) {
        let html = r#"<a onmouseover="hover()" href="javascript:go()" onclick="track()">x</a>"#;
        let fragments = extract(&extractor, html);

        let events: Vec<_> = fragments.iter().filter_map(|f| f.event_name()).collect();
        assert_eq!(events, vec!["click", "mouseover", "click"]);
        assert_eq!(fragments[0].content(), "go()");
    }

    #[rstest]
    fn test_on_attributes_on_script_and_void_elements(extractor: ScriptExtractor) {
        let html = r#"<script onload="ready()">init()</script><img src="a.png" onerror="fail()"><input onchange='save()'/>"#;
        let fragments = extract(&extractor, html);

        let summary: Vec<_> = fragments
            .iter()
            .map(|f| (f.origin().as_str(), f.content()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("embedded", "init()"),
                ("event-handler", "ready()"),
                ("event-handler", "fail()"),
                ("event-handler", "save()"),
            ]
        );
    }

    #[rstest]
    fn test_empty_and_valueless_handlers_are_skipped(extractor: ScriptExtractor) {
        assert!(extract(&extractor, r#"<div onclick="" onblur></div>"#).is_empty());
    }

    #[rstest]
    fn test_nested_elements_depth_first(extractor: ScriptExtractor) {
        let html = r#"<div onclick="outer()"><p onclick="inner()"><script>body()</script></p></div><span onclick="after()"></span>"#;
        let contents: Vec<_> = extract(&extractor, html)
            .iter()
            .map(|f| f.content().to_string())
            .collect();
        assert_eq!(contents, vec!["outer()", "inner()", "body()", "after()"]);
    }

    #[rstest]
    fn test_unsupported_scheme_fails_without_loading(extractor: ScriptExtractor) {
        let err = extractor
            .extract_source(
                "site/pages/index.html",
                r#"<script src="http://example.com/a.js"></script>"#,
            )
            .unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedScheme { .. }));
    }

    #[rstest]
    fn test_extraction_is_idempotent(extractor: ScriptExtractor) {
        let html = r#"<a href="javascript:a()" onclick="b()">x</a><script>c()</script>"#;
        assert_eq!(extract(&extractor, html), extract(&extractor, html));
    }
}
