pub mod extract_config;
pub mod path_matcher;

pub use extract_config::{ExtractConfig, CONFIG_FILE_NAME};
pub use path_matcher::PathMatcher;
