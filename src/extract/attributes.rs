//! Scanner for `key="value"` pairs inside a tag
//!
//! This is not an HTML attribute grammar. Whitespace outside a value resets
//! the key; on `=` the value is read either up to the matching quote or, when
//! unquoted, up to the next whitespace or `>`. A quoted value whose closing
//! quote is missing ends the scan for the whole tag.

/// Attribute names whose values may contain links
pub const RELEVANT_KEYWORDS: &[&str] = &["href"];

/// One `key=value` pair found in a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

impl Attribute<'_> {
    /// Returns true if the key is a relevant keyword (ASCII case-insensitive)
    pub fn is_relevant(&self) -> bool {
        RELEVANT_KEYWORDS
            .iter()
            .any(|keyword| self.key.eq_ignore_ascii_case(keyword))
    }
}

/// Iterator over the attributes of one tag's raw text
#[derive(Debug, Clone)]
pub struct AttributeScanner<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> AttributeScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, position: 0 }
    }

    fn read_value(&mut self) -> Option<&'a str> {
        let bytes = self.text.as_bytes();

        match bytes.get(self.position) {
            Some(&quote @ (b'"' | b'\'')) => {
                let start = self.position + 1;
                match bytes[start..].iter().position(|&b| b == quote) {
                    Some(length) => {
                        self.position = start + length + 1;
                        Some(&self.text[start..start + length])
                    }
                    None => {
                        tracing::trace!("Unterminated attribute value, skipping rest of tag");
                        self.position = bytes.len();
                        None
                    }
                }
            }
            _ => {
                let start = self.position;
                let length = bytes[start..]
                    .iter()
                    .position(|&b| b == b'>' || b.is_ascii_whitespace())
                    .unwrap_or(bytes.len() - start);
                self.position = start + length;
                Some(&self.text[start..start + length])
            }
        }
    }
}

impl<'a> Iterator for AttributeScanner<'a> {
    type Item = Attribute<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.text.as_bytes();
        let mut key_start = self.position;

        while self.position < bytes.len() {
            match bytes[self.position] {
                b'=' => {
                    let key = &self.text[key_start..self.position];
                    self.position += 1;
                    let value = self.read_value()?;
                    return Some(Attribute { key, value });
                }
                b if b.is_ascii_whitespace() => {
                    self.position += 1;
                    key_start = self.position;
                }
                _ => self.position += 1,
            }
        }

        None
    }
}

/// Returns true if the tag is a `<base>` declaration
///
/// Only the tag name is inspected, the first token up to whitespace or `=`,
/// and any name containing `base` counts.
pub fn is_base_tag(tag: &str) -> bool {
    tag.split(|c: char| c.is_ascii_whitespace() || c == '=')
        .next()
        .is_some_and(|name| name.contains("base"))
}

/// Returns the value of the first relevant attribute of a tag
pub fn href_value(tag: &str) -> Option<&str> {
    AttributeScanner::new(tag)
        .find(Attribute::is_relevant)
        .map(|attribute| attribute.value)
}
