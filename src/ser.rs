//! Writing values back out as Strata text.
//!
//! Two dump styles exist:
//!
//! - **Map-shaped**: structural nesting only. Scalar entries become
//!   `key: value` lines, nested maps and lists become a bare-key line with
//!   deeper entries (or inline composites with
//!   [`WriteOptions::with_compact`]), list items become `- ` lines.
//! - **Record-shaped**: schema-driven. Every record reachable from the
//!   root schema is declared with a `$struct` header (dependencies first),
//!   followed by `[Name] root` and the root's member values in positional
//!   order.
//!
//! Scalar quoting guarantees that written output re-parses to the same
//! scalar text: bare names and numbers are written as-is, anything else is
//! quoted with escapes. String-typed scalars are always quoted and
//! enum-typed scalars always bare.

use std::fmt::Write as _;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::io::{Sink, StringSink};
use crate::options::WriteOptions;
use crate::schema::{to_record_value, Schema};
use crate::types::{RecordType, TypeRef};
use crate::value::{List, Scalar, Value};
use crate::StrataMap;

/// Writes a map-shaped dump of `value` with default options.
///
/// # Examples
///
/// ```rust
/// use strata::strata;
///
/// let value = strata!({
///     "name": "Alice",
///     "note": "two words"
/// });
/// assert_eq!(
///     strata::to_string(&value).unwrap(),
///     "name: Alice\nnote: \"two words\"\n"
/// );
/// ```
pub fn to_string(value: &Value) -> Result<String> {
    to_string_with_options(value, &WriteOptions::default())
}

/// Writes a map-shaped dump of `value` with the given options.
pub fn to_string_with_options(value: &Value, options: &WriteOptions) -> Result<String> {
    let mut sink = StringSink::new();
    to_writer(value, &mut sink, options)?;
    Ok(sink.into_string())
}

/// Writes a map-shaped dump of `value` into `sink`.
pub fn to_writer(value: &Value, sink: &mut dyn Sink, options: &WriteOptions) -> Result<()> {
    let mut writer = Writer::new(sink, options);
    writer.write_root(value)?;
    writer.sink.close()
}

/// Writes a record-shaped dump of `value` with default options.
pub fn to_record_string<T: Schema>(value: &T) -> Result<String> {
    to_record_string_with_options(value, &WriteOptions::default())
}

/// Writes a record-shaped dump of `value` with the given options.
pub fn to_record_string_with_options<T: Schema>(
    value: &T,
    options: &WriteOptions,
) -> Result<String> {
    let mut sink = StringSink::new();
    record_to_writer(value, &mut sink, options)?;
    Ok(sink.into_string())
}

/// Writes a record-shaped dump of `value` into `sink`: `$struct`
/// declarations for every reachable record (dependencies first), then
/// `[Name] root` with the member values one `- ` line each.
pub fn record_to_writer<T: Schema>(
    value: &T,
    sink: &mut dyn Sink,
    options: &WriteOptions,
) -> Result<()> {
    let record = T::record();
    let mut records: IndexMap<String, RecordType> = IndexMap::new();
    collect_records(&record, &mut records);

    let mut writer = Writer::new(sink, options);
    for rec in records.values() {
        writer.sink.write_line(&format!("$struct {}", rec.name()))?;
        for member in rec.members() {
            writer.indent(1)?;
            writer
                .sink
                .write_line(&format!("{} {}", member.ty(), member.name()))?;
        }
    }
    writer.sink.write_line(&format!("[{}] root", record.name()))?;

    let shaped = to_record_value(&value.to_value(), &record)?;
    let Value::List(members) = &shaped else {
        return Err(Error::internal("record shaping did not produce a list"));
    };
    for member in members.iter() {
        writer.indent(1)?;
        writer.sink.write_str("- ")?;
        writer.sink.write_line(&inline_string(member))?;
    }
    writer.sink.close()
}

/// Collects the records reachable from `rec`, dependencies before
/// dependents, so declarations can be resolved in reading order.
fn collect_records(rec: &RecordType, out: &mut IndexMap<String, RecordType>) {
    if out.contains_key(rec.name()) {
        return;
    }
    for member in rec.members() {
        collect_member(member.ty(), out);
    }
    out.insert(rec.name().to_string(), rec.clone());
}

fn collect_member(ty: &TypeRef, out: &mut IndexMap<String, RecordType>) {
    match ty {
        TypeRef::Record(rec) => collect_records(rec, out),
        TypeRef::Generic { params, .. } => {
            for param in params {
                collect_member(param, out);
            }
        }
        TypeRef::Scalar(_) | TypeRef::Enum(_) => {}
    }
}

struct Writer<'a> {
    sink: &'a mut dyn Sink,
    options: &'a WriteOptions,
    unit: String,
}

impl<'a> Writer<'a> {
    fn new(sink: &'a mut dyn Sink, options: &'a WriteOptions) -> Self {
        Writer {
            sink,
            options,
            unit: options.indent_unit(),
        }
    }

    fn indent(&mut self, depth: usize) -> Result<()> {
        self.sink.write_indent(depth, &self.unit)
    }

    fn write_root(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Map(map) => self.write_map_block(map, 0),
            other => self.sink.write_line(&inline_string(other)),
        }
    }

    fn write_map_block(&mut self, map: &StrataMap, depth: usize) -> Result<()> {
        for (key, value) in map.iter() {
            self.indent(depth)?;
            match value {
                Value::Null | Value::Scalar(_) => self.write_entry(key, value)?,
                Value::Map(inner) => {
                    if self.options.compact || inner.is_empty() {
                        self.write_entry(key, value)?;
                    } else {
                        self.sink.write_line(&key_text(key))?;
                        self.write_map_block(inner, depth + 1)?;
                    }
                }
                Value::List(inner) => {
                    if self.options.compact || inner.is_empty() {
                        self.write_entry(key, value)?;
                    } else {
                        self.sink.write_line(&key_text(key))?;
                        self.write_list_block(inner, depth + 1)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn write_entry(&mut self, key: &str, value: &Value) -> Result<()> {
        self.sink.write_str(&key_text(key))?;
        self.sink.write_str(": ")?;
        self.sink.write_line(&inline_string(value))
    }

    fn write_list_block(&mut self, list: &List, depth: usize) -> Result<()> {
        for item in list.iter() {
            self.indent(depth)?;
            self.sink.write_str("- ")?;
            // composites under list items stay inline so each line is one
            // item
            self.sink.write_line(&inline_string(item))?;
        }
        Ok(())
    }
}

/// The single-token or inline-composite form of a value.
pub(crate) fn inline_string(value: &Value) -> String {
    let mut out = String::new();
    write_inline(value, &mut out);
    out
}

fn write_inline(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str(crate::value::NULL_TEXT),
        Value::Scalar(scalar) => out.push_str(&scalar_text(scalar)),
        Value::List(list) => {
            out.push('(');
            for (i, item) in list.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_inline(item, out);
            }
            out.push(')');
        }
        Value::Map(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&key_text(key));
                out.push_str(": ");
                write_inline(item, out);
            }
            out.push('}');
        }
    }
}

fn scalar_text(scalar: &Scalar) -> String {
    match scalar.ty() {
        Some(TypeRef::Enum(_)) => scalar.text().to_string(),
        Some(TypeRef::Scalar(name)) if name == "string" => quote(scalar.text()),
        _ => {
            if is_bare(scalar.text()) {
                scalar.text().to_string()
            } else {
                quote(scalar.text())
            }
        }
    }
}

fn key_text(key: &str) -> String {
    if is_bare_key(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

/// Whether `text` reads back as a map key unquoted. Key position accepts
/// name and integer tokens only, and `-` at the start of a line is a list
/// item marker, so keys are stricter than bare scalars: a name, or
/// unsigned digits.
fn is_bare_key(text: &str) -> bool {
    let bytes = text.as_bytes();
    let Some(&first) = bytes.first() else {
        return false;
    };
    if first.is_ascii_alphabetic() || first == b'_' {
        return bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'_' || *b == b'.');
    }
    bytes.iter().all(u8::is_ascii_digit)
}

/// Whether `text` lexes back as a single bare token with the same text: a
/// name, or a number shape the lexer takes in one piece.
fn is_bare(text: &str) -> bool {
    let bytes = text.as_bytes();
    let Some(&first) = bytes.first() else {
        return false;
    };
    if first.is_ascii_alphabetic() || first == b'_' {
        return bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'_' || *b == b'.');
    }
    let digits = if first == b'-' { &bytes[1..] } else { bytes };
    if digits.is_empty() {
        return false;
    }
    let mut dots = 0;
    for &b in digits {
        if b == b'.' {
            dots += 1;
        } else if !b.is_ascii_digit() {
            return false;
        }
    }
    if dots > 1 {
        return false;
    }
    // a leading dot only lexes after a minus sign
    !(digits[0] == b'.' && first != b'-')
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strata;

    #[test]
    fn scalar_entries_one_per_line() {
        let value = strata!({
            "a": 1,
            "b": "hello",
            "c": "two words"
        });
        assert_eq!(
            to_string(&value).unwrap(),
            "a: 1\nb: hello\nc: \"two words\"\n"
        );
    }

    #[test]
    fn null_entries_use_the_reference_form() {
        let value = strata!({ "gone": null });
        assert_eq!(to_string(&value).unwrap(), "gone: %null\n");
    }

    #[test]
    fn nested_maps_use_bare_key_blocks() {
        let value = strata!({
            "outer": { "x": 1, "y": 2 }
        });
        assert_eq!(to_string(&value).unwrap(), "outer\n  x: 1\n  y: 2\n");
    }

    #[test]
    fn lists_use_item_lines() {
        let value = strata!({ "items": [1, 2, 3] });
        assert_eq!(to_string(&value).unwrap(), "items\n  - 1\n  - 2\n  - 3\n");
    }

    #[test]
    fn composites_under_list_items_stay_inline() {
        let value = strata!({
            "rows": [{ "sku": "A1", "n": 2 }]
        });
        assert_eq!(to_string(&value).unwrap(), "rows\n  - {sku: A1, n: 2}\n");
    }

    #[test]
    fn empty_composites_are_inline() {
        let value = strata!({
            "m": {},
            "l": []
        });
        assert_eq!(to_string(&value).unwrap(), "m: {}\nl: ()\n");
    }

    #[test]
    fn compact_mode_inlines_composites() {
        let value = strata!({
            "point": { "x": 1, "y": 2 },
            "tags": ["a", "b"]
        });
        let text = to_string_with_options(&value, &WriteOptions::compact()).unwrap();
        assert_eq!(text, "point: {x: 1, y: 2}\ntags: (a, b)\n");
    }

    #[test]
    fn indent_width_is_configurable() {
        let value = strata!({ "outer": { "x": 1 } });
        let text = to_string_with_options(&value, &WriteOptions::new().with_indent(4)).unwrap();
        assert_eq!(text, "outer\n    x: 1\n");
    }

    #[test]
    fn non_map_root_is_a_single_line() {
        let value = strata!([1, 2]);
        assert_eq!(to_string(&value).unwrap(), "(1, 2)\n");
    }

    #[test]
    fn bare_heuristic() {
        assert!(is_bare("hello"));
        assert!(is_bare("a.b_c2"));
        assert!(is_bare("123"));
        assert!(is_bare("-1.5"));
        assert!(is_bare("-.5"));
        assert!(is_bare("1."));
        assert!(!is_bare(""));
        assert!(!is_bare(".5"));
        assert!(!is_bare("1.2.3"));
        assert!(!is_bare("two words"));
        assert!(!is_bare("1e5"));
        assert!(!is_bare("a-b"));
    }

    #[test]
    fn non_bare_keys_are_quoted() {
        let value = strata!({
            "two words": 1,
            "a-b": { "x": 1 },
            "1.5": [1]
        });
        assert_eq!(
            to_string(&value).unwrap(),
            "\"two words\": 1\n\"a-b\"\n  x: 1\n\"1.5\"\n  - 1\n"
        );
        let compact = to_string_with_options(
            &strata!({ "m": { "two words": 1 } }),
            &WriteOptions::compact(),
        )
        .unwrap();
        assert_eq!(compact, "m: {\"two words\": 1}\n");
    }

    #[test]
    fn bare_key_heuristic() {
        assert!(is_bare_key("hello"));
        assert!(is_bare_key("a.b_c2"));
        assert!(is_bare_key("123"));
        // a leading minus reads as a list item marker at line start
        assert!(!is_bare_key("-1"));
        // decimals are not accepted in key position
        assert!(!is_bare_key("1.5"));
        assert!(!is_bare_key("two words"));
        assert!(!is_bare_key(""));
    }

    #[test]
    fn quoting_escapes_controls_and_specials() {
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
        assert_eq!(quote("a\\b"), "\"a\\\\b\"");
        assert_eq!(quote("a\nb\tc"), "\"a\\nb\\tc\"");
        assert_eq!(quote("bell\u{7}"), "\"bell\\x07\"");
        assert_eq!(quote("Päivää"), "\"Päivää\"");
    }
}
