//! HTML文書に埋め込まれた／参照されたJavaScriptを、出所と位置付きで抽出する。

pub mod config;
pub mod error;
pub mod html;
pub mod loader;
pub mod model;
pub mod workspace;

pub use error::{ConfigError, ExtractError};
pub use html::{HtmlDocument, ParsedHtml, ScriptExtractor};
pub use loader::{FsLoader, MemoryLoader, SourceLoader};
pub use model::{Position, ScriptFragment, ScriptOrigin};
