//! The structural type system: type references, record descriptors, and the
//! registry of natively known types.
//!
//! Types are descriptive rather than prescriptive: a parsed document is
//! untyped until a type is attached (by a typed key such as `[Name] key`, or
//! by record member propagation), and attaching a type never converts
//! scalar text. Two record types are considered the same when their member
//! sets match by name and type, regardless of declaration order.

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::error::{Error, Result};

/// The builtin scalar type names.
pub const SCALAR_TYPE_NAMES: &[&str] = &[
    "string", "bool", "char", "int8", "int16", "int32", "int64", "uint8", "uint16", "uint32",
    "uint64", "float32", "float64",
];

/// A reference to a type: builtin scalar, enum, record, or generic container.
///
/// `TypeRef` is cheap to clone; record descriptors are shared behind [`Arc`].
#[derive(Debug, Clone)]
pub enum TypeRef {
    /// A builtin scalar type, e.g. `int32` or `string`.
    Scalar(String),
    /// A named enumeration. Matches like a scalar; distinguished so writers
    /// can emit enum values bare.
    Enum(String),
    /// A record (struct) type.
    Record(Arc<RecordType>),
    /// A generic container instance, e.g. `list[int32]` or
    /// `map[string, int64]`.
    Generic {
        name: String,
        params: Vec<TypeRef>,
    },
}

impl TypeRef {
    /// Returns the builtin scalar type of the given name, if `name` is one
    /// of [`SCALAR_TYPE_NAMES`].
    #[must_use]
    pub fn builtin(name: &str) -> Option<TypeRef> {
        SCALAR_TYPE_NAMES
            .contains(&name)
            .then(|| TypeRef::Scalar(name.to_string()))
    }

    /// A `list[elem]` container type.
    #[must_use]
    pub fn list_of(elem: TypeRef) -> TypeRef {
        TypeRef::Generic {
            name: "list".to_string(),
            params: vec![elem],
        }
    }

    /// A `map[key, value]` container type.
    #[must_use]
    pub fn map_of(key: TypeRef, value: TypeRef) -> TypeRef {
        TypeRef::Generic {
            name: "map".to_string(),
            params: vec![key, value],
        }
    }

    /// Structural equivalence.
    ///
    /// Scalars and enums match by name. Records match by member set (see
    /// [`RecordType::matches`]). Generics match by container name and
    /// pairwise parameter match.
    #[must_use]
    pub fn matches(&self, other: &TypeRef) -> bool {
        match (self, other) {
            (TypeRef::Scalar(a) | TypeRef::Enum(a), TypeRef::Scalar(b) | TypeRef::Enum(b)) => {
                a == b
            }
            (TypeRef::Record(a), TypeRef::Record(b)) => a.matches(b),
            (
                TypeRef::Generic { name: a, params: pa },
                TypeRef::Generic { name: b, params: pb },
            ) => {
                a == b
                    && pa.len() == pb.len()
                    && pa.iter().zip(pb).all(|(x, y)| x.matches(y))
            }
            _ => false,
        }
    }

    /// Returns the record descriptor if this is a record type.
    #[must_use]
    pub fn as_record(&self) -> Option<&Arc<RecordType>> {
        match self {
            TypeRef::Record(rec) => Some(rec),
            _ => None,
        }
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Scalar(name) | TypeRef::Enum(name) => f.write_str(name),
            TypeRef::Record(rec) => f.write_str(rec.name()),
            TypeRef::Generic { name, params } => {
                write!(f, "{name}[")?;
                for p in params {
                    write!(f, " {p}")?;
                }
                f.write_str(" ]")
            }
        }
    }
}

/// A single record member: name plus type.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    name: String,
    ty: TypeRef,
}

impl Member {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Member {
            name: name.into(),
            ty,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }
}

/// A record (struct) type: a name plus an ordered list of members.
///
/// Member order defines the positional layout of record-shaped data; it does
/// not participate in type identity.
///
/// # Examples
///
/// ```rust
/// use strata::{RecordType, TypeRef};
///
/// let mut rec = RecordType::new("Demo.Point");
/// rec.push_member("x", TypeRef::Scalar("int32".into()));
/// rec.push_member("y", TypeRef::Scalar("int32".into()));
/// assert_eq!(rec.len(), 2);
/// assert_eq!(rec.member_index("y"), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    name: String,
    members: Vec<Member>,
}

impl RecordType {
    /// Creates an empty record type with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        RecordType {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Creates a record type from a full member list.
    #[must_use]
    pub fn with_members(name: impl Into<String>, members: Vec<Member>) -> Self {
        RecordType {
            name: name.into(),
            members,
        }
    }

    /// Appends a member.
    pub fn push_member(&mut self, name: impl Into<String>, ty: TypeRef) {
        self.members.push(Member::new(name, ty));
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The members in declaration (positional) order.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Looks up a member by name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    /// The positional index of the named member.
    #[must_use]
    pub fn member_index(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name == name)
    }

    /// Structural equivalence: same member count, and for every member of
    /// `self` the other record has a member with the same name and a
    /// matching type. Record names and member order are irrelevant.
    #[must_use]
    pub fn matches(&self, other: &RecordType) -> bool {
        self.members.len() == other.members.len()
            && self.members.iter().all(|m| {
                other
                    .member(&m.name)
                    .is_some_and(|o| m.ty.matches(&o.ty))
            })
    }
}

/// The set of record and enum types known natively, before any parse.
///
/// A registry is built up front (write-once) and then shared by reference
/// across parses; records declared by the input itself are kept per-document
/// and shadow registry entries of the same name.
///
/// # Examples
///
/// ```rust
/// use strata::{Registry, RecordType, TypeRef};
///
/// let mut registry = Registry::new();
/// let mut point = RecordType::new("Demo.Point");
/// point.push_member("x", TypeRef::Scalar("int32".into()));
/// point.push_member("y", TypeRef::Scalar("int32".into()));
/// registry.add_record(point);
///
/// assert!(registry.record("Demo.Point").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    records: IndexMap<String, Arc<RecordType>>,
    enums: IndexSet<String>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Registry::default()
    }

    /// Adds a record descriptor, returning the shared handle. Re-adding a
    /// name replaces the previous descriptor.
    pub fn add_record(&mut self, record: RecordType) -> Arc<RecordType> {
        let arc = Arc::new(record);
        self.records.insert(arc.name().to_string(), Arc::clone(&arc));
        arc
    }

    /// Declares an enum type name.
    pub fn add_enum(&mut self, name: impl Into<String>) {
        self.enums.insert(name.into());
    }

    /// Registers a [`Schema`](crate::Schema) type: its record descriptor and
    /// every record and enum reachable from its members.
    pub fn register<T: crate::Schema>(&mut self) {
        self.register_record(T::record());
    }

    fn register_record(&mut self, record: RecordType) {
        if self.records.contains_key(record.name()) {
            return;
        }
        for member in record.members() {
            self.register_type(member.ty());
        }
        self.add_record(record);
    }

    fn register_type(&mut self, ty: &TypeRef) {
        match ty {
            TypeRef::Scalar(_) => {}
            TypeRef::Enum(name) => self.add_enum(name.clone()),
            TypeRef::Record(rec) => self.register_record(RecordType::clone(rec)),
            TypeRef::Generic { params, .. } => {
                for p in params {
                    self.register_type(p);
                }
            }
        }
    }

    /// Looks up a natively registered record.
    #[must_use]
    pub fn record(&self, name: &str) -> Option<&Arc<RecordType>> {
        self.records.get(name)
    }

    /// Returns `true` if `name` is a registered enum type.
    #[must_use]
    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.contains(name)
    }

    /// All registered records, in registration order.
    pub fn records(&self) -> impl Iterator<Item = &Arc<RecordType>> {
        self.records.values()
    }
}

/// Builds the `list`/`map` generic container type for `name`, checking
/// parameter arity. Any other generic name is a grammar error.
pub(crate) fn make_generic(name: &str, params: Vec<TypeRef>) -> Result<TypeRef> {
    let arity = match name {
        "list" => 1,
        "map" => 2,
        _ => return Err(Error::grammar(format!("unknown generic type: {name}"))),
    };
    if params.len() != arity {
        return Err(Error::grammar(format!(
            "{name} takes {arity} type parameter(s), found {}",
            params.len()
        )));
    }
    Ok(TypeRef::Generic {
        name: name.to_string(),
        params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(name: &str, first: &str, second: &str) -> RecordType {
        let mut rec = RecordType::new(name);
        rec.push_member(first, TypeRef::Scalar("int32".into()));
        rec.push_member(second, TypeRef::Scalar("int32".into()));
        rec
    }

    #[test]
    fn record_match_ignores_name_and_order() {
        let a = point("A", "x", "y");
        let b = point("B", "y", "x");
        assert!(a.matches(&b));
    }

    #[test]
    fn record_match_requires_same_member_types() {
        let a = point("A", "x", "y");
        let mut b = RecordType::new("A");
        b.push_member("x", TypeRef::Scalar("int32".into()));
        b.push_member("y", TypeRef::Scalar("int64".into()));
        assert!(!a.matches(&b));
    }

    #[test]
    fn record_match_requires_same_arity() {
        let a = point("A", "x", "y");
        let mut b = RecordType::new("A");
        b.push_member("x", TypeRef::Scalar("int32".into()));
        assert!(!a.matches(&b));
    }

    #[test]
    fn enum_matches_scalar_by_name() {
        let e = TypeRef::Enum("Demo.Rank".into());
        let s = TypeRef::Scalar("Demo.Rank".into());
        assert!(e.matches(&s));
        assert!(!e.matches(&TypeRef::Scalar("int32".into())));
    }

    #[test]
    fn generic_match_is_pairwise() {
        let a = TypeRef::list_of(TypeRef::Scalar("int32".into()));
        let b = TypeRef::list_of(TypeRef::Scalar("int32".into()));
        let c = TypeRef::list_of(TypeRef::Scalar("string".into()));
        assert!(a.matches(&b));
        assert!(!a.matches(&c));
        assert!(!a.matches(&TypeRef::map_of(
            TypeRef::Scalar("int32".into()),
            TypeRef::Scalar("int32".into())
        )));
    }

    #[test]
    fn generic_display_format() {
        let t = TypeRef::map_of(
            TypeRef::Scalar("int32".into()),
            TypeRef::Record(Arc::new(point("Demo.Point", "x", "y"))),
        );
        assert_eq!(t.to_string(), "map[ int32 Demo.Point ]");
    }

    #[test]
    fn make_generic_checks_arity() {
        assert!(make_generic("list", vec![TypeRef::Scalar("int32".into())]).is_ok());
        assert!(make_generic("list", vec![]).is_err());
        assert!(make_generic("set", vec![TypeRef::Scalar("int32".into())]).is_err());
    }

    #[test]
    fn builtin_scalar_names() {
        assert!(TypeRef::builtin("uint64").is_some());
        assert!(TypeRef::builtin("Demo.Point").is_none());
    }
}
