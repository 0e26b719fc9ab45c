use std::io;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::ser::{CompactFormatter, Formatter};

pub const DEFAULT_NAME: &str = "Chris Clarkson";
pub const DEFAULT_EMAIL: &str = "chris.clarkson@hitachicapital.co.uk";
pub const DEFAULT_PHONE: &str = "0123456789";

/// The record served on GET.
///
/// Field declaration order is the wire order. Signatures are computed over
/// the output of [`IdentityRecord::encode`], so anything that changes that
/// output (field order, whitespace, escaping) invalidates every signature
/// issued before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl IdentityRecord {
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Canonical bytes: compact JSON, fields in declaration order, with
    /// `<`, `>`, `&`, U+2028 and U+2029 written as `\uXXXX` escapes so that
    /// signatures match those issued by encoders that HTML-escape strings.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, HtmlSafeFormatter);
        self.serialize(&mut serializer)
            .context("serializing identity record to canonical JSON")?;
        Ok(out)
    }
}

/// Compact formatter that also escapes HTML-significant characters.
struct HtmlSafeFormatter;

impl Formatter for HtmlSafeFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            let escaped = match ch {
                '<' => "\\u003c",
                '>' => "\\u003e",
                '&' => "\\u0026",
                '\u{2028}' => "\\u2028",
                '\u{2029}' => "\\u2029",
                _ => continue,
            };
            writer.write_all(fragment[start..index].as_bytes())?;
            writer.write_all(escaped.as_bytes())?;
            start = index + ch.len_utf8();
        }
        CompactFormatter.write_string_fragment(writer, &fragment[start..])
    }
}

impl Default for IdentityRecord {
    fn default() -> Self {
        Self::new(DEFAULT_NAME, DEFAULT_EMAIL, DEFAULT_PHONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_encodes_canonically() {
        let encoded = IdentityRecord::default().encode().unwrap();
        assert_eq!(
            encoded,
            br#"{"name":"Chris Clarkson","email":"chris.clarkson@hitachicapital.co.uk","phone":"0123456789"}"#
        );
    }

    #[test]
    fn decodes_back_to_same_record() {
        let record = IdentityRecord::default();
        let decoded: IdentityRecord = serde_json::from_slice(&record.encode().unwrap()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn deterministic_encoding() {
        let record = IdentityRecord::new("A", "b@example.com", "1");
        assert_eq!(record.encode().unwrap(), record.encode().unwrap());
    }

    #[test]
    fn html_significant_characters_are_escaped() {
        let record = IdentityRecord::new("Smith & <Sons>", "a\u{2028}b", "1");
        let encoded = String::from_utf8(record.encode().unwrap()).unwrap();
        assert_eq!(
            encoded,
            r#"{"name":"Smith \u0026 \u003cSons\u003e","email":"a\u2028b","phone":"1"}"#
        );

        let decoded: IdentityRecord = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn quotes_and_control_characters_still_escaped() {
        let record = IdentityRecord::new("say \"hi\"\n", "e", "p");
        let encoded = String::from_utf8(record.encode().unwrap()).unwrap();
        assert_eq!(encoded, r#"{"name":"say \"hi\"\n","email":"e","phone":"p"}"#);
    }

    #[test]
    fn field_order_is_fixed() {
        let encoded = String::from_utf8(IdentityRecord::new("n", "e", "p").encode().unwrap()).unwrap();
        assert_eq!(encoded, r#"{"name":"n","email":"e","phone":"p"}"#);
    }
}
