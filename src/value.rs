//! Dynamic value representation for Strata documents.
//!
//! This module provides the [`Value`] enum which represents any parsed
//! Strata value. Scalars keep their exact source text; nothing is converted
//! at parse time. Conversions happen on demand and fail with a
//! [`Conversion`](crate::Error::Conversion) error when the text does not
//! parse as the requested primitive.
//!
//! ## Core Types
//!
//! - [`Value`]: null, scalar, list, or map
//! - [`Scalar`]: raw decoded text plus an optional attached type
//! - [`List`]: ordered items plus an optional attached type (a record type
//!   makes the list addressable by member name)
//!
//! ## Usage Patterns
//!
//! ### Creating Values
//!
//! ```rust
//! use strata::Value;
//!
//! // From primitives (scalar text is the display form)
//! let null = Value::Null;
//! let flag = Value::from(true);
//! let number = Value::from(42);
//! let text = Value::from("hello");
//!
//! // Using the strata! macro
//! use strata::strata;
//! let obj = strata!({
//!     "name": "Alice",
//!     "age": 30
//! });
//! # let _ = (null, flag, number, text, obj);
//! ```
//!
//! ### Lazy Conversion
//!
//! ```rust
//! use strata::{Value, ErrorKind};
//!
//! let value = Value::from("1.23");
//! assert_eq!(value.to_f64().unwrap(), 1.23);
//! assert_eq!(value.to_i64().unwrap_err().kind(), ErrorKind::Conversion);
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::types::{RecordType, TypeRef};
use crate::StrataMap;

/// The text a null value reads back as, and the reference token that
/// produces one.
pub(crate) const NULL_TEXT: &str = "%null";

/// A dynamically-typed representation of any parsed Strata value.
///
/// Equality ignores attached types: two values are equal when their
/// structure and scalar texts are equal. Attached types only influence
/// later formatted output and member-name lookup.
///
/// # Examples
///
/// ```rust
/// use strata::Value;
///
/// let doc = strata::from_str("a: 1\nb: \"two\"").unwrap();
/// let a = doc.get("a").unwrap();
/// assert_eq!(a.to_i32().unwrap(), 1);
/// assert_eq!(doc.get("b").unwrap().text().unwrap(), "two");
/// # let _ = doc;
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Scalar(Scalar),
    List(List),
    Map(StrataMap),
}

/// A scalar: exact raw decoded text, plus an optional type attached later
/// by propagation.
#[derive(Clone, Debug)]
pub struct Scalar {
    text: String,
    ty: Option<TypeRef>,
}

impl Scalar {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Scalar {
            text: text.into(),
            ty: None,
        }
    }

    /// The exact decoded source text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The attached type, if any.
    #[must_use]
    pub fn ty(&self) -> Option<&TypeRef> {
        self.ty.as_ref()
    }
}

// Attached types do not participate in equality.
impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

/// An ordered list of values, optionally typed.
///
/// A record-typed list is positional record data: item N holds the value of
/// member N, and items can also be looked up by member name through
/// [`Value::get`].
#[derive(Clone, Debug, Default)]
pub struct List {
    items: Vec<Value>,
    ty: Option<TypeRef>,
}

impl List {
    #[must_use]
    pub fn new() -> Self {
        List::default()
    }

    pub(crate) fn with_record(record: Arc<RecordType>) -> Self {
        List {
            items: Vec::new(),
            ty: Some(TypeRef::Record(record)),
        }
    }

    pub fn push(&mut self, value: Value) {
        self.items.push(value);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// The attached type, if any.
    #[must_use]
    pub fn ty(&self) -> Option<&TypeRef> {
        self.ty.as_ref()
    }

    /// The record descriptor, when this list is record-typed.
    #[must_use]
    pub fn record(&self) -> Option<&Arc<RecordType>> {
        match &self.ty {
            Some(TypeRef::Record(rec)) => Some(rec),
            _ => None,
        }
    }

    /// Positional lookup by record member name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Value> {
        let index = self.record()?.member_index(name)?;
        self.items.get(index)
    }
}

// Attached types do not participate in equality.
impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl From<Vec<Value>> for List {
    fn from(items: Vec<Value>) -> Self {
        List { items, ty: None }
    }
}

impl FromIterator<Value> for List {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        List {
            items: iter.into_iter().collect(),
            ty: None,
        }
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Value {
    /// A scalar value holding the given text.
    #[must_use]
    pub fn scalar(text: impl Into<String>) -> Value {
        Value::Scalar(Scalar::new(text))
    }

    /// Returns `true` if the value is null.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// If the value is a scalar, returns it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is a scalar, returns its raw text. Otherwise returns
    /// `None`.
    #[inline]
    #[must_use]
    pub fn as_scalar_text(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(&s.text),
            _ => None,
        }
    }

    /// If the value is a list, returns a reference to it. Otherwise returns
    /// `None`.
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// If the value is a map, returns a reference to it. Otherwise returns
    /// `None`.
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> Option<&StrataMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// The attached type, if any.
    #[must_use]
    pub fn ty(&self) -> Option<&TypeRef> {
        match self {
            Value::Scalar(s) => s.ty(),
            Value::List(l) => l.ty(),
            _ => None,
        }
    }

    /// The textual form of a scalar or null value.
    ///
    /// Null reads back as `%null`; asking a list or map for text is a
    /// [`DataShape`](crate::Error::DataShape) error.
    pub fn text(&self) -> Result<&str> {
        match self {
            Value::Null => Ok(NULL_TEXT),
            Value::Scalar(s) => Ok(&s.text),
            Value::List(_) => Err(Error::data_shape("a list has no scalar text")),
            Value::Map(_) => Err(Error::data_shape("a map has no scalar text")),
        }
    }

    /// Keyed access: map entry by key, or record-typed list item by member
    /// name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(m) => m.get(key),
            Value::List(l) => l.member(key),
            _ => None,
        }
    }

    /// Like [`Value::get`], but a missing key is a
    /// [`DataShape`](crate::Error::DataShape) error.
    pub fn field(&self, key: &str) -> Result<&Value> {
        self.get(key)
            .ok_or_else(|| Error::data_shape(format!("value not found by name: {key}")))
    }

    /// Positional access into a list.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&Value> {
        match self {
            Value::List(l) => l.get(index),
            _ => None,
        }
    }

    fn parse<T: std::str::FromStr>(&self, target: &'static str) -> Result<T> {
        let text = self.text()?;
        text.trim()
            .parse::<T>()
            .map_err(|_| Error::conversion(text, target))
    }

    /// Parses the scalar text as a boolean (case-insensitive `true`/`false`).
    pub fn to_bool(&self) -> Result<bool> {
        let text = self.text()?;
        let trimmed = text.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if trimmed.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(Error::conversion(text, "bool"))
        }
    }

    /// Interprets the scalar text as a single character.
    pub fn to_char(&self) -> Result<char> {
        let text = self.text()?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Error::conversion(text, "char")),
        }
    }

    pub fn to_i8(&self) -> Result<i8> {
        self.parse("int8")
    }

    pub fn to_i16(&self) -> Result<i16> {
        self.parse("int16")
    }

    pub fn to_i32(&self) -> Result<i32> {
        self.parse("int32")
    }

    pub fn to_i64(&self) -> Result<i64> {
        self.parse("int64")
    }

    pub fn to_u8(&self) -> Result<u8> {
        self.parse("uint8")
    }

    pub fn to_u16(&self) -> Result<u16> {
        self.parse("uint16")
    }

    pub fn to_u32(&self) -> Result<u32> {
        self.parse("uint32")
    }

    pub fn to_u64(&self) -> Result<u64> {
        self.parse("uint64")
    }

    pub fn to_f32(&self) -> Result<f32> {
        self.parse("float32")
    }

    pub fn to_f64(&self) -> Result<f64> {
        self.parse("float64")
    }

    /// Attaches `ty` to this value and propagates it structurally:
    ///
    /// - a scalar stores the type (no conversion, no validation);
    /// - a `list[E]`-typed list assigns `E` to every item;
    /// - a record-typed list must have exactly one item per member, and
    ///   each item receives the corresponding member type;
    /// - a `map[K, V]`-typed map assigns `V` to every entry value;
    /// - null accepts any type.
    ///
    /// Any structural mismatch is a [`DataShape`](crate::Error::DataShape)
    /// error.
    pub fn assign_type(&mut self, ty: &TypeRef) -> Result<()> {
        match self {
            Value::Null => Ok(()),
            Value::Scalar(s) => {
                s.ty = Some(ty.clone());
                Ok(())
            }
            Value::List(list) => {
                list.ty = Some(ty.clone());
                match ty {
                    TypeRef::Generic { name, params } if name == "list" && params.len() == 1 => {
                        for item in &mut list.items {
                            item.assign_type(&params[0])?;
                        }
                        Ok(())
                    }
                    TypeRef::Record(rec) => {
                        if list.items.len() != rec.len() {
                            return Err(Error::data_shape(format!(
                                "wrong number of member values for {}: expected {}, found {}",
                                rec.name(),
                                rec.len(),
                                list.items.len()
                            )));
                        }
                        for (item, member) in list.items.iter_mut().zip(rec.members()) {
                            item.assign_type(member.ty())?;
                        }
                        Ok(())
                    }
                    _ => Err(Error::data_shape(format!("a list cannot hold type {ty}"))),
                }
            }
            Value::Map(map) => match ty {
                TypeRef::Generic { name, params } if name == "map" && params.len() == 2 => {
                    for value in map.values_mut() {
                        value.assign_type(&params[1])?;
                    }
                    Ok(())
                }
                _ => Err(Error::data_shape(format!("a map cannot hold type {ty}"))),
            },
        }
    }

    /// Validates a container against its attached type once it is complete.
    /// For record-typed lists this checks arity and re-propagates member
    /// types over the final items.
    pub(crate) fn close(&mut self) -> Result<()> {
        let ty = match self {
            Value::List(list) => list.ty.clone(),
            _ => None,
        };
        match ty {
            Some(ty) => self.assign_type(&ty),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::ser::inline_string(self))
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Scalar(s) => serializer.serialize_str(&s.text),
            Value::List(list) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(list.len()))?;
                for item in list.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                use serde::ser::SerializeMap;
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any Strata value")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Self::Value, E> {
                Ok(Value::scalar(if value { "true" } else { "false" }))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Self::Value, E> {
                Ok(Value::scalar(value.to_string()))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Self::Value, E> {
                Ok(Value::scalar(value.to_string()))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Self::Value, E> {
                Ok(Value::scalar(value.to_string()))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E> {
                Ok(Value::scalar(value))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Self::Value, E> {
                Ok(Value::Scalar(Scalar::new(value)))
            }

            fn visit_unit<E>(self) -> std::result::Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> std::result::Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut list = List::new();
                while let Some(item) = seq.next_element()? {
                    list.push(item);
                }
                Ok(Value::List(list))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut values = StrataMap::new();
                while let Some((key, value)) = map.next_entry()? {
                    values.insert(key, value);
                }
                Ok(Value::Map(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::scalar(if value { "true" } else { "false" })
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::scalar(value.to_string())
    }
}

macro_rules! from_display {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::scalar(value.to_string())
                }
            }
        )*
    };
}

from_display!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(Scalar::new(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::scalar(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(List::from(value))
    }
}

impl From<List> for Value {
    fn from(value: List) -> Self {
        Value::List(value)
    }
}

impl From<StrataMap> for Value {
    fn from(value: StrataMap) -> Self {
        Value::Map(value)
    }
}
