/*
 * headers.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Rivolo, an incremental HTTP client.
 *
 * Rivolo is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Rivolo is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Rivolo.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Header maps: one-or-many values per name, raw block parsing, and the
//! request-header denylist.
//!
//! Names are stored lowercase. A repeated name promotes the stored value
//! from `Single` to `Multiple` and appends in arrival order. A raw line
//! without a `name: value` shape is kept as a `Flag` entry keyed by the
//! whole line, so the anomaly stays visible without failing the parse.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Header names the transport manages itself; silently dropped from
/// outgoing requests. Case-insensitive match.
const RESTRICTED_HEADERS: &[&str] = &[
    "accept-charset",
    "accept-encoding",
    "access-control-request-headers",
    "access-control-request-method",
    "connection",
    "content-length",
    "cookie",
    "cookie2",
    "content-transfer-encoding",
    "date",
    "expect",
    "host",
    "keep-alive",
    "origin",
    "referer",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "user-agent",
    "via",
];

/// True if the named request header may be forwarded to the transport.
pub fn is_header_allowed(name: &str) -> bool {
    !RESTRICTED_HEADERS
        .iter()
        .any(|restricted| name.eq_ignore_ascii_case(restricted))
}

/// One value, an ordered list of values, or a valueless marker for a
/// malformed raw line. Serializes as string | array | true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
    Flag,
}

impl HeaderValue {
    /// The single value, or the first of a list. `None` for `Flag`.
    pub fn first(&self) -> Option<&str> {
        match self {
            HeaderValue::Single(v) => Some(v),
            HeaderValue::Multiple(vs) => vs.first().map(|v| v.as_str()),
            HeaderValue::Flag => None,
        }
    }
}

impl Serialize for HeaderValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            HeaderValue::Single(v) => serializer.serialize_str(v),
            HeaderValue::Multiple(vs) => vs.serialize(serializer),
            HeaderValue::Flag => serializer.serialize_bool(true),
        }
    }
}

/// Mapping from lowercase header name to value(s).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: HashMap<String, HeaderValue>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up by name, case-insensitively. Falls back to the exact key so
    /// `Flag` entries (keyed by their raw line) stay reachable.
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .or_else(|| self.entries.get(name))
    }

    /// Set a single value, replacing whatever was stored under the name.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.entries
            .insert(name.to_ascii_lowercase(), HeaderValue::Single(value.into()));
    }

    /// Set an ordered list of values, replacing whatever was stored.
    pub fn set_values(&mut self, name: &str, values: Vec<String>) {
        self.entries
            .insert(name.to_ascii_lowercase(), HeaderValue::Multiple(values));
    }

    /// Incorporate one occurrence of a name. First occurrence stores a
    /// `Single`; a repeat promotes to `Multiple` and appends.
    pub fn add(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let key = name.to_ascii_lowercase();
        let merged = match self.entries.remove(&key) {
            None | Some(HeaderValue::Flag) => HeaderValue::Single(value),
            Some(HeaderValue::Single(first)) => HeaderValue::Multiple(vec![first, value]),
            Some(HeaderValue::Multiple(mut values)) => {
                values.push(value);
                HeaderValue::Multiple(values)
            }
        };
        self.entries.insert(key, merged);
    }

    /// Record a malformed raw line as a valueless entry keyed by the line.
    pub fn add_flag(&mut self, raw_line: &str) {
        self.entries
            .entry(raw_line.to_string())
            .or_insert(HeaderValue::Flag);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Parse a raw CRLF/LF-delimited "Name: value" block, as exposed by a
/// transport, into a `Headers` map. Blank lines are skipped; lines without
/// a name become `Flag` entries.
pub fn parse_header_block(raw: &str) -> Headers {
    let mut headers = Headers::new();
    for line in raw.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            continue;
        }
        match line.find(':') {
            Some(colon) if colon > 0 => {
                let name = line[..colon].trim().to_ascii_lowercase();
                let value = line[colon + 1..].trim();
                headers.add(&name, value);
            }
            _ => headers.add_flag(line),
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_then_repeat_promotes_to_list() {
        let raw = "bling: blong\r\nbling: blong\r\n";
        let headers = parse_header_block(raw);
        assert_eq!(
            headers.get("bling"),
            Some(&HeaderValue::Multiple(vec![
                "blong".to_string(),
                "blong".to_string()
            ]))
        );
    }

    #[test]
    fn third_occurrence_appends() {
        let mut headers = Headers::new();
        headers.add("set-cookie", "a=1");
        headers.add("set-cookie", "b=2");
        headers.add("set-cookie", "c=3");
        assert_eq!(
            headers.get("set-cookie"),
            Some(&HeaderValue::Multiple(vec![
                "a=1".to_string(),
                "b=2".to_string(),
                "c=3".to_string()
            ]))
        );
    }

    #[test]
    fn names_are_lowercased_and_lookup_is_case_insensitive() {
        let headers = parse_header_block("Content-Type: text/plain\r\n");
        assert_eq!(
            headers.get("content-type"),
            Some(&HeaderValue::Single("text/plain".to_string()))
        );
        assert_eq!(headers.get("CONTENT-TYPE"), headers.get("content-type"));
    }

    #[test]
    fn malformed_line_becomes_flag_entry() {
        let headers = parse_header_block("this is not a header\r\nfoo: bar\r\n");
        assert_eq!(
            headers.get("this is not a header"),
            Some(&HeaderValue::Flag)
        );
        assert_eq!(
            headers.get("foo"),
            Some(&HeaderValue::Single("bar".to_string()))
        );
    }

    #[test]
    fn lf_only_blocks_parse_too() {
        let headers = parse_header_block("foo: bar\nbaz: quux\n");
        assert_eq!(headers.len(), 2);
        assert_eq!(
            headers.get("baz"),
            Some(&HeaderValue::Single("quux".to_string()))
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        let headers = parse_header_block("\r\nfoo: bar\r\n\r\n");
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn denylist_matches_case_insensitively() {
        assert!(!is_header_allowed("cookie"));
        assert!(!is_header_allowed("Cookie"));
        assert!(!is_header_allowed("HOST"));
        assert!(!is_header_allowed("User-Agent"));
        assert!(is_header_allowed("content-type"));
        assert!(is_header_allowed("bling"));
    }

    #[test]
    fn value_whitespace_is_trimmed() {
        let headers = parse_header_block("foo:   spaced out  \r\n");
        assert_eq!(
            headers.get("foo"),
            Some(&HeaderValue::Single("spaced out".to_string()))
        );
    }

    #[test]
    fn serializes_as_string_array_or_true() {
        let raw = "foo: bar\r\nbling: blong\r\nbling: blong\r\nbroken line\r\n";
        let headers = parse_header_block(raw);
        let json = serde_json::to_value(&headers).unwrap();
        assert_eq!(json["foo"], serde_json::json!("bar"));
        assert_eq!(json["bling"], serde_json::json!(["blong", "blong"]));
        assert_eq!(json["broken line"], serde_json::json!(true));
    }
}
