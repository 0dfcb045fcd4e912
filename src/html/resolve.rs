//! `<script src>` 参照のファイルパス解決

use std::path::{Path, PathBuf};

use url::{ParseError, Url};

use crate::error::ExtractError;

/// 参照をロードすべきパスに解決
///
/// - スキーム付き（`http:` など）や `//` で始まる参照は `UnsupportedScheme`
/// - URI参照として不正な参照は `MalformedReference`
/// - `.` で始まる参照は参照元ファイルのディレクトリ基準、それ以外は `root` 基準
///
/// `.` / `..` セグメントの正規化は行わない。
pub fn resolve_src_reference(
    root: Option<&Path>,
    referencing_file: &Path,
    reference: &str,
) -> Result<PathBuf, ExtractError> {
    match Url::parse(reference) {
        Ok(_) => {
            return Err(ExtractError::UnsupportedScheme {
                reference: reference.to_string(),
            });
        }
        Err(ParseError::RelativeUrlWithoutBase) => {}
        Err(e) if has_scheme(reference) => {
            return Err(ExtractError::MalformedReference {
                reference: reference.to_string(),
                reason: e.to_string(),
            });
        }
        Err(_) => {}
    }

    if reference.starts_with("//") {
        return Err(ExtractError::UnsupportedScheme {
            reference: reference.to_string(),
        });
    }

    validate_relative_reference(reference).map_err(|reason| ExtractError::MalformedReference {
        reference: reference.to_string(),
        reason,
    })?;

    let path = strip_query_and_fragment(reference);
    let base = if reference.starts_with('.') {
        referencing_file.parent()
    } else {
        root
    };

    Ok(match base.filter(|dir| !dir.as_os_str().is_empty()) {
        Some(dir) => dir.join(path),
        None => PathBuf::from(path),
    })
}

/// `scheme ":"` で始まるか（RFC 3986の scheme 構文）
fn has_scheme(reference: &str) -> bool {
    let Some(colon) = reference.find(':') else {
        return false;
    };
    let scheme = &reference[..colon];
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// スキームなし参照の構文チェック
fn validate_relative_reference(reference: &str) -> Result<(), String> {
    // 最初のセグメントの `:` はスキームとしてしか解釈できない
    let first_segment_end = reference.find(['/', '?', '#']).unwrap_or(reference.len());
    if let Some(colon) = reference[..first_segment_end].find(':') {
        return Err(format!("expected scheme name before ':' at index {}", colon));
    }

    let bytes = reference.as_bytes();
    let mut seen_fragment = false;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'%' => {
                let escaped = bytes
                    .get(i + 1..i + 3)
                    .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
                if !escaped {
                    return Err(format!("malformed escape at index {}", i));
                }
                i += 3;
                continue;
            }
            b'#' if seen_fragment => {
                return Err(format!("illegal character '#' in fragment at index {}", i));
            }
            b'#' => seen_fragment = true,
            b' ' | b'"' | b'<' | b'>' | b'\\' | b'^' | b'`' | b'{' | b'|' | b'}' | b'[' | b']' => {
                return Err(format!("illegal character '{}' at index {}", b as char, i));
            }
            _ if b.is_ascii_control() => {
                return Err(format!("illegal control character at index {}", i));
            }
            _ => {}
        }
        i += 1;
    }
    Ok(())
}

fn strip_query_and_fragment(reference: &str) -> &str {
    match reference.find(['?', '#']) {
        Some(end) => &reference[..end],
        None => reference,
    }
}
