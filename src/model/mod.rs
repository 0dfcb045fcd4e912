pub mod fragment;
pub mod span;

pub use fragment::{ScriptFragment, ScriptOrigin};
pub use span::Position;
