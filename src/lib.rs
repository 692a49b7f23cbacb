//! # strata
//!
//! A reader and writer for Strata, a human-readable, indentation-sensitive
//! data format with maps, lists, raw-text scalars, and optional record
//! schemas.
//!
//! ## The format in one look
//!
//! ```text
//! name: Alice
//! address
//!   city: Helsinki
//!   zip: "00100"
//! scores
//!   - 1
//!   - 2
//! point: {x: 1, y: 2}
//! ```
//!
//! Nesting is by indentation; `{...}` and `(...)` are the inline forms of
//! maps and lists. Scalars are raw text: nothing is converted while
//! parsing, and conversions like [`Value::to_i32`] happen on demand.
//!
//! ## Reading
//!
//! ```rust
//! let doc = strata::from_str("name: Alice\nscores\n  - 1\n  - 2").unwrap();
//! assert_eq!(doc.get("name").unwrap().text().unwrap(), "Alice");
//! assert_eq!(doc.get("scores").unwrap().at(1).unwrap().to_i32().unwrap(), 2);
//! ```
//!
//! ## Writing
//!
//! ```rust
//! use strata::strata;
//!
//! let value = strata!({
//!     "name": "Alice",
//!     "scores": [1, 2]
//! });
//! assert_eq!(
//!     strata::to_string(&value).unwrap(),
//!     "name: Alice\nscores\n  - 1\n  - 2\n"
//! );
//! ```
//!
//! ## Records
//!
//! Input can declare record types with `$struct` and use them for
//! positional, schema-checked data:
//!
//! ```rust
//! let text = "\
//! $struct Demo.Point
//!   int32 x
//!   int32 y
//! [Demo.Point] origin
//!   - 3
//!   - 4
//! ";
//! let doc = strata::from_str(text).unwrap();
//! let origin = doc.get("origin").unwrap();
//! assert_eq!(origin.get("x").unwrap().to_i32().unwrap(), 3);
//! assert_eq!(origin.get("y").unwrap().to_i32().unwrap(), 4);
//! ```
//!
//! Native types implement [`Schema`] to round-trip through the
//! record-shaped form; see [`to_record_string`] and [`from_record_str`].
//!
//! ## Serde interop
//!
//! [`Value`] implements `Serialize` and `Deserialize`, so documents bridge
//! to any other serde format:
//!
//! ```rust
//! let value: strata::Value = serde_json::from_str(r#"{"a": 1}"#).unwrap();
//! assert_eq!(strata::to_string(&value).unwrap(), "a: 1\n");
//! ```

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;

mod assemble;
mod automaton;
mod error;
mod grammar;
mod indent;
mod io;
mod macros;
mod map;
mod options;
mod schema;
mod ser;
mod token;
mod types;
mod value;

pub use error::{Error, ErrorKind, Result};
pub use io::{ByteSource, FileSink, FileSource, Sink, SliceSource, StringSink, WriteSink};
pub use map::StrataMap;
pub use options::WriteOptions;
pub use schema::{from_record_str, Schema};
pub use ser::{
    record_to_writer, to_record_string, to_record_string_with_options, to_string,
    to_string_with_options, to_writer,
};
pub use types::{Member, RecordType, Registry, TypeRef, SCALAR_TYPE_NAMES};
pub use value::{List, Scalar, Value};

/// A parsed input: the root map plus the record types the input declared.
///
/// # Examples
///
/// ```rust
/// let doc = strata::from_str("a: 1\nb\n  c: 2").unwrap();
/// assert_eq!(doc.get("a").unwrap().to_i32().unwrap(), 1);
/// assert_eq!(doc.field("b").unwrap().field("c").unwrap().to_i32().unwrap(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: StrataMap,
    records: IndexMap<String, Arc<RecordType>>,
}

impl Document {
    pub(crate) fn new(root: StrataMap, records: IndexMap<String, Arc<RecordType>>) -> Self {
        Document { root, records }
    }

    /// The root map.
    #[must_use]
    pub fn root(&self) -> &StrataMap {
        &self.root
    }

    /// Consumes the document, returning the root map.
    #[must_use]
    pub fn into_root(self) -> StrataMap {
        self.root
    }

    /// Consumes the document, returning the root as a [`Value`].
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Map(self.root)
    }

    /// A top-level entry by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Like [`Document::get`], but a missing key is a
    /// [`DataShape`](Error::DataShape) error.
    pub fn field(&self, key: &str) -> Result<&Value> {
        self.root
            .get(key)
            .ok_or_else(|| Error::data_shape(format!("value not found by name: {key}")))
    }

    /// A record type declared by the input, by name.
    #[must_use]
    pub fn record(&self, name: &str) -> Option<&Arc<RecordType>> {
        self.records.get(name)
    }

    /// All record types the input declared, in declaration order.
    pub fn records(&self) -> impl Iterator<Item = &Arc<RecordType>> {
        self.records.values()
    }
}

/// Parses Strata text.
pub fn from_str(text: &str) -> Result<Document> {
    from_slice(text.as_bytes())
}

/// Parses Strata text against a registry of natively known types.
pub fn from_str_with_registry(text: &str, registry: &Registry) -> Result<Document> {
    from_slice_with_registry(text.as_bytes(), registry)
}

/// Parses Strata input bytes. A UTF-8 byte order mark is skipped.
pub fn from_slice(bytes: &[u8]) -> Result<Document> {
    from_slice_with_registry(bytes, &Registry::new())
}

/// Parses Strata input bytes against a registry of natively known types.
pub fn from_slice_with_registry(bytes: &[u8], registry: &Registry) -> Result<Document> {
    let mut source = SliceSource::new(bytes);
    grammar::parse(&mut source, registry)
}

/// Parses Strata input from any [`std::io::Read`].
pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Document> {
    from_reader_with_registry(reader, &Registry::new())
}

/// Parses Strata input from any [`std::io::Read`] against a registry.
pub fn from_reader_with_registry<R: std::io::Read>(
    mut reader: R,
    registry: &Registry,
) -> Result<Document> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    from_slice_with_registry(&bytes, registry)
}

/// Parses a Strata file, streaming byte by byte.
pub fn from_file(path: impl AsRef<Path>) -> Result<Document> {
    from_file_with_registry(path, &Registry::new())
}

/// Parses a Strata file against a registry of natively known types.
pub fn from_file_with_registry(path: impl AsRef<Path>, registry: &Registry) -> Result<Document> {
    let mut source = FileSource::open(path)?;
    grammar::parse(&mut source, registry)
}
