//! Text metadata blocks written into `.dist-info/`.
//!
//! `METADATA` and `WHEEL` are RFC 822 style header blocks: one `Name: value`
//! line per header, a blank line, then an optional body. `RECORD` is a CSV
//! file listing every member with its digest and size.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

/// Ordered header list. Repeated names are allowed (`Classifier`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderBlock {
    headers: Vec<(String, String)>,
}

impl HeaderBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn extend<'h>(&mut self, headers: impl IntoIterator<Item = &'h (String, String)>) {
        self.headers.extend(headers.into_iter().cloned());
    }

    /// Serialise as header lines, a blank line, then `body` verbatim.
    pub fn to_bytes(&self, body: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        for (name, value) in &self.headers {
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(b": ");
            out.extend_from_slice(value.as_bytes());
            out.push(b'\n');
        }
        out.push(b'\n');
        out.extend_from_slice(body);
        out
    }
}

/// Accumulates `RECORD` rows as members are written.
#[derive(Debug, Default)]
pub struct Record {
    rows: Vec<String>,
}

impl Record {
    pub fn push(&mut self, path: &str, data: &[u8]) {
        let digest = URL_SAFE_NO_PAD.encode(Sha256::digest(data));
        self.rows.push(format!(
            "{},sha256={digest},{}",
            csv_field(path),
            data.len()
        ));
    }

    /// Render the file, listing `record_path` itself last with no digest.
    pub fn finish(mut self, record_path: &str) -> Vec<u8> {
        self.rows.push(format!("{},,", csv_field(record_path)));
        let mut out = self.rows.join("\n");
        out.push('\n');
        out.into_bytes()
    }
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_block_with_body() {
        let block = HeaderBlock::new()
            .with("Name", "x13binary")
            .with("Classifier", "A")
            .with("Classifier", "B");
        assert_eq!(
            block.to_bytes(b"# Title\n"),
            b"Name: x13binary\nClassifier: A\nClassifier: B\n\n# Title\n"
        );
    }

    #[test]
    fn header_block_without_body_ends_with_blank_line() {
        let block = HeaderBlock::new().with("Wheel-Version", "1.0");
        assert_eq!(block.to_bytes(b""), b"Wheel-Version: 1.0\n\n");
    }

    #[test]
    fn record_rows_and_self_entry() {
        let mut record = Record::default();
        record.push("x13binary/__init__.py", b"");
        let text = String::from_utf8(record.finish("x-1.dist-info/RECORD")).unwrap();
        assert_eq!(
            text,
            "x13binary/__init__.py,sha256=47DEQpj8HBSa-_TImW-5JCeuQeRkm5NMpJWZG3hSuFU,0\n\
             x-1.dist-info/RECORD,,\n"
        );
    }

    #[test]
    fn csv_quotes_only_when_needed() {
        assert_eq!(csv_field("a/b.txt"), "a/b.txt");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
