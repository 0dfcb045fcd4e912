//! HTML文書からのJavaScript断片抽出

pub mod attribute;
pub mod classify;
pub mod document;
pub mod extract;
pub mod parser;
pub mod resolve;

pub use classify::is_javascript_type;
pub use document::{HtmlDocument, LineIndex};
pub use extract::{ParsedHtml, ScriptExtractor};
pub use parser::HtmlParser;
pub use resolve::resolve_src_reference;
