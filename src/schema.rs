//! Bridging native Rust types and record-shaped data.
//!
//! A type implements [`Schema`] by describing itself as a
//! [`RecordType`] and converting to and from the dynamic [`Value`]
//! representation. Everything else follows from that: the record writer
//! derives `$struct` declarations from the descriptor, and
//! [`from_record_str`] registers the descriptor so typed input resolves
//! against it.
//!
//! `to_value` produces the natural map shape (member name to value);
//! shaping into positional record lists happens here, by zipping a map
//! against the record descriptor.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{RecordType, Registry, TypeRef};
use crate::value::{List, Value};
use crate::StrataMap;

/// A native type with a record descriptor.
///
/// # Examples
///
/// ```rust
/// use strata::{strata, RecordType, Result, Schema, TypeRef, Value};
///
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Schema for Point {
///     fn record() -> RecordType {
///         let mut rec = RecordType::new("Demo.Point");
///         rec.push_member("x", TypeRef::Scalar("int32".into()));
///         rec.push_member("y", TypeRef::Scalar("int32".into()));
///         rec
///     }
///
///     fn to_value(&self) -> Value {
///         strata!({ "x": (self.x), "y": (self.y) })
///     }
///
///     fn from_value(value: &Value) -> Result<Self> {
///         Ok(Point {
///             x: value.field("x")?.to_i32()?,
///             y: value.field("y")?.to_i32()?,
///         })
///     }
/// }
///
/// let text = strata::to_record_string(&Point { x: 3, y: 4 }).unwrap();
/// let back: Point = strata::from_record_str(&text).unwrap();
/// assert_eq!((back.x, back.y), (3, 4));
/// ```
pub trait Schema: Sized {
    /// The record descriptor for this type.
    fn record() -> RecordType;

    /// Converts to the dynamic representation, map-shaped: one entry per
    /// member, keyed by member name.
    fn to_value(&self) -> Value;

    /// Reconstructs from a dynamic value. The value may be map-shaped or a
    /// record-typed list; [`Value::get`] and [`Value::field`] resolve
    /// member names in both shapes.
    fn from_value(value: &Value) -> Result<Self>;
}

/// Parses record-shaped text into a native type.
///
/// Registers `T`'s descriptor (and everything reachable from it), parses,
/// and reads the `root` entry.
pub fn from_record_str<T: Schema>(text: &str) -> Result<T> {
    let mut registry = Registry::new();
    registry.register::<T>();
    let doc = crate::from_str_with_registry(text, &registry)?;
    let root = doc
        .get("root")
        .ok_or_else(|| Error::data_shape("no root entry in record-shaped input"))?;
    T::from_value(root)
}

/// Shapes a map-shaped value into the positional record form: a
/// record-typed list with one item per member, each carrying its member
/// type. Null passes through.
pub(crate) fn to_record_value(value: &Value, record: &RecordType) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    let map = value.as_map().ok_or_else(|| {
        Error::data_shape(format!("expected a map to fill record {}", record.name()))
    })?;
    let mut items = List::with_record(Arc::new(record.clone()));
    for member in record.members() {
        let field = map.get(member.name()).ok_or_else(|| {
            Error::data_shape(format!(
                "missing member {} for record {}",
                member.name(),
                record.name()
            ))
        })?;
        items.push(shape_member(field, member.ty())?);
    }
    Ok(Value::List(items))
}

fn shape_member(value: &Value, ty: &TypeRef) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    match ty {
        TypeRef::Scalar(_) | TypeRef::Enum(_) => {
            let mut shaped = Value::scalar(value.text()?);
            shaped.assign_type(ty)?;
            Ok(shaped)
        }
        TypeRef::Record(rec) => to_record_value(value, rec),
        TypeRef::Generic { name, params } if name == "list" && params.len() == 1 => {
            let list = value
                .as_list()
                .ok_or_else(|| Error::data_shape(format!("expected a list for {ty}")))?;
            let mut items = List::new();
            for item in list.iter() {
                items.push(shape_member(item, &params[0])?);
            }
            let mut shaped = Value::List(items);
            shaped.assign_type(ty)?;
            Ok(shaped)
        }
        TypeRef::Generic { name, params } if name == "map" && params.len() == 2 => {
            let map = value
                .as_map()
                .ok_or_else(|| Error::data_shape(format!("expected a map for {ty}")))?;
            let mut entries = StrataMap::with_capacity(map.len());
            for (key, item) in map.iter() {
                entries.insert(key.clone(), shape_member(item, &params[1])?);
            }
            Ok(Value::Map(entries))
        }
        TypeRef::Generic { .. } => Err(Error::data_shape(format!("unsupported member type {ty}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{strata, ErrorKind};

    fn point_record() -> RecordType {
        let mut rec = RecordType::new("Demo.Point");
        rec.push_member("x", TypeRef::Scalar("int32".into()));
        rec.push_member("y", TypeRef::Scalar("int32".into()));
        rec
    }

    #[test]
    fn shaping_orders_by_member_position() {
        let value = strata!({ "y": 2, "x": 1 });
        let shaped = to_record_value(&value, &point_record()).unwrap();
        assert_eq!(shaped.at(0).unwrap().to_i32().unwrap(), 1);
        assert_eq!(shaped.at(1).unwrap().to_i32().unwrap(), 2);
        // and member names still resolve positionally
        assert_eq!(shaped.get("y").unwrap().to_i32().unwrap(), 2);
    }

    #[test]
    fn missing_member_is_a_shape_error() {
        let value = strata!({ "x": 1 });
        let err = to_record_value(&value, &point_record()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataShape);
    }

    #[test]
    fn null_members_pass_through() {
        let value = strata!({ "x": null, "y": 2 });
        let shaped = to_record_value(&value, &point_record()).unwrap();
        assert!(shaped.at(0).unwrap().is_null());
    }

    #[test]
    fn scalar_members_carry_their_type() {
        let mut rec = RecordType::new("Demo.Named");
        rec.push_member("name", TypeRef::Scalar("string".into()));
        let value = strata!({ "name": "Alice" });
        let shaped = to_record_value(&value, &rec).unwrap();
        let ty = shaped.at(0).unwrap().ty().unwrap();
        assert!(ty.matches(&TypeRef::Scalar("string".into())));
    }

    #[test]
    fn container_members_recurse() {
        let mut rec = RecordType::new("Demo.Bag");
        rec.push_member("tags", TypeRef::list_of(TypeRef::Scalar("string".into())));
        rec.push_member(
            "points",
            TypeRef::map_of(
                TypeRef::Scalar("string".into()),
                TypeRef::Record(Arc::new(point_record())),
            ),
        );
        let value = strata!({
            "tags": ["a", "b"],
            "points": { "origin": { "x": 0, "y": 0 } }
        });
        let shaped = to_record_value(&value, &rec).unwrap();
        assert_eq!(shaped.at(0).unwrap().at(1).unwrap().text().unwrap(), "b");
        let origin = shaped.at(1).unwrap().get("origin").unwrap();
        // nested record became positional
        assert_eq!(origin.at(0).unwrap().to_i32().unwrap(), 0);
    }

    #[test]
    fn scalar_where_container_expected_is_a_shape_error() {
        let mut rec = RecordType::new("Demo.Bag");
        rec.push_member("tags", TypeRef::list_of(TypeRef::Scalar("string".into())));
        let value = strata!({ "tags": "oops" });
        let err = to_record_value(&value, &rec).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataShape);
    }
}
