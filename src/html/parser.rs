use tree_sitter::{Parser, Tree};

/// tree-sitter-htmlによるHTMLパーサー
pub struct HtmlParser {
    parser: Parser,
}

impl HtmlParser {
    pub fn new() -> Self {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_html::LANGUAGE.into())
            .expect("Failed to load HTML grammar");

        Self { parser }
    }

    pub fn parse(&mut self, source: &str) -> Option<Tree> {
        self.parser.parse(source, None)
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}
