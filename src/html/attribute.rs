//! 開始タグの属性読み取り

use std::borrow::Cow;

use phf::phf_map;
use tree_sitter::Node;

/// 属性値で使われる名前付き文字参照
static NAMED_CHARACTER_REFERENCES: phf::Map<&'static str, char> = phf_map! {
    "amp" => '&',
    "lt" => '<',
    "gt" => '>',
    "quot" => '"',
    "apos" => '\'',
    "nbsp" => '\u{a0}',
    "Tab" => '\t',
    "NewLine" => '\n',
    "excl" => '!',
    "num" => '#',
    "dollar" => '$',
    "percnt" => '%',
    "lpar" => '(',
    "rpar" => ')',
    "ast" => '*',
    "plus" => '+',
    "comma" => ',',
    "period" => '.',
    "sol" => '/',
    "colon" => ':',
    "semi" => ';',
    "equals" => '=',
    "quest" => '?',
    "commat" => '@',
    "lsqb" => '[',
    "rsqb" => ']',
    "bsol" => '\\',
    "lowbar" => '_',
    "grave" => '`',
    "lcub" => '{',
    "rcub" => '}',
    "verbar" => '|',
    "copy" => '\u{a9}',
    "reg" => '\u{ae}',
    "hellip" => '\u{2026}',
    "ndash" => '\u{2013}',
    "mdash" => '\u{2014}',
    "lsquo" => '\u{2018}',
    "rsquo" => '\u{2019}',
    "ldquo" => '\u{201c}',
    "rdquo" => '\u{201d}',
};

/// 開始タグ上の属性
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlAttribute {
    /// 小文字化した属性名
    pub name: String,
    /// 文字参照をデコードした値（`<div hidden>` のように値がなければ None）
    pub value: Option<String>,
    /// 値（クォートの内側）の開始バイトオフセット
    pub value_start: Option<usize>,
}

impl HtmlAttribute {
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// 開始タグ（`start_tag` / `self_closing_tag`）のタグ名を小文字で取得
pub fn tag_name(tag: Node, source: &str) -> Option<String> {
    find_child_by_kind(tag, "tag_name").map(|name| source[name.byte_range()].to_ascii_lowercase())
}

/// 開始タグの全属性を出現順に取得
pub fn read_attributes(tag: Node, source: &str) -> Vec<HtmlAttribute> {
    let mut attributes = Vec::new();
    let mut cursor = tag.walk();
    for child in tag.children(&mut cursor) {
        if child.kind() != "attribute" {
            continue;
        }
        let Some(name_node) = find_child_by_kind(child, "attribute_name") else {
            continue;
        };
        let name = source[name_node.byte_range()].to_ascii_lowercase();

        let (value, value_start) = match attribute_value_range(child) {
            Some((start, end)) => (
                Some(decode_character_references(&source[start..end]).into_owned()),
                Some(start),
            ),
            None => (None, None),
        };

        attributes.push(HtmlAttribute {
            name,
            value,
            value_start,
        });
    }
    attributes
}

/// 同名属性が複数あれば最初のものを返す
pub fn find_attribute<'a>(attributes: &'a [HtmlAttribute], name: &str) -> Option<&'a HtmlAttribute> {
    attributes.iter().find(|attr| attr.name == name)
}

/// 属性値の（クォートを除いた）バイト範囲
fn attribute_value_range(attribute: Node) -> Option<(usize, usize)> {
    if let Some(value) = find_child_by_kind(attribute, "attribute_value") {
        return Some((value.start_byte(), value.end_byte()));
    }
    let quoted = find_child_by_kind(attribute, "quoted_attribute_value")?;
    match find_child_by_kind(quoted, "attribute_value") {
        Some(value) => Some((value.start_byte(), value.end_byte())),
        // 空文字列 "" / ''
        None => {
            let inner = quoted.start_byte() + 1;
            Some((inner, inner))
        }
    }
}

fn find_child_by_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == kind {
            return Some(child);
        }
    }
    None
}

/// 文字参照（`&amp;`, `&#39;`, `&#x27;`）をデコード
///
/// 未知の名前や `;` で終わらない参照はそのまま残す。
pub fn decode_character_references(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let mut result = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        match after.find(';').and_then(|semi| decode_reference(&after[..semi]).map(|c| (c, semi))) {
            Some((c, semi)) => {
                result.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                result.push('&');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    Cow::Owned(result)
}

fn decode_reference(body: &str) -> Option<char> {
    if let Some(numeric) = body.strip_prefix('#') {
        let code = match numeric.strip_prefix('x').or_else(|| numeric.strip_prefix('X')) {
            Some(hex) if !hex.is_empty() => u32::from_str_radix(hex, 16).ok()?,
            Some(_) => return None,
            None if !numeric.is_empty() => numeric.parse::<u32>().ok()?,
            None => return None,
        };
        return Some(match char::from_u32(code) {
            Some('\0') | None => char::REPLACEMENT_CHARACTER,
            Some(c) => c,
        });
    }
    NAMED_CHARACTER_REFERENCES.get(body).copied()
}
