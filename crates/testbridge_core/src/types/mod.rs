//! Runtime type descriptors.
//!
//! A [`Type`] describes the static shape of a parameter, a return value, or the runtime type of a supplied
//! argument. Descriptors are plain data: they compare structurally and can be shared freely across threads.
//!
//! ## Notes
//! - [`Type::Null`] is the *null marker*: the type reported for an argument that was supplied as null and
//!   whose static type is therefore unknown. It only ever appears on the argument side of a compatibility
//!   check.
//! - User-defined classes, interfaces and value structs are described by [`ClassType`], which records the
//!   base chain, implemented interfaces and implicit conversion targets.

pub mod primitives;

use std::fmt;
use std::sync::Arc;

pub use primitives::{PRIMITIVES, PrimitiveInfo, PrimitiveKind};

/// Describe a type visible to dynamic dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Return type of operations that produce no value.
    Void,
    /// A primitive value kind (integers, floats, char, bool, decimal).
    Primitive(PrimitiveKind),
    /// An optional/nullable value type wrapping a value type.
    Nullable(Box<Type>),
    /// Immutable text (reference type).
    String,
    /// The root of every type; all values are assignable to it.
    Object,
    /// A string-keyed mapping of arbitrary values (used for settings).
    Map,
    /// A reference to a loaded module.
    Module,
    /// A callback taking the listed parameters and returning nothing.
    Action(Vec<Type>),
    /// A user-defined class, interface or value struct.
    Class(Arc<ClassType>),
    /// The null marker (argument was null, static type unknown).
    Null,
}

impl Type {
    /// Shorthand for `Type::Primitive(kind)`.
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Type::Primitive(kind)
    }

    /// Wrap a value type into its nullable form.
    pub fn nullable(inner: Type) -> Self {
        Type::Nullable(Box::new(inner))
    }

    /// The `Action<string>` shape used for progress callbacks.
    pub fn string_action() -> Self {
        Type::Action(vec![Type::String])
    }

    /// Whether values of this type are stored inline (primitives, nullable wrappers and value structs).
    pub fn is_value_type(&self) -> bool {
        match self {
            Type::Primitive(_) | Type::Nullable(_) => true,
            Type::Class(class) => class.kind == ClassKind::Struct,
            _ => false,
        }
    }

    /// Whether this is a reference type (may hold null).
    pub fn is_reference_type(&self) -> bool {
        match self {
            Type::String | Type::Object | Type::Map | Type::Module | Type::Action(_) | Type::Null => true,
            Type::Class(class) => class.kind != ClassKind::Struct,
            Type::Void | Type::Primitive(_) | Type::Nullable(_) => false,
        }
    }

    /// Whether this is an optional/nullable value type.
    pub fn is_nullable_value(&self) -> bool {
        matches!(self, Type::Nullable(_))
    }

    /// Return the primitive kind if this is a primitive.
    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self {
            Type::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => f.write_str("System.Void"),
            Type::Primitive(kind) => f.write_str(primitives::as_str(*kind)),
            Type::Nullable(inner) => write!(f, "System.Nullable<{inner}>"),
            Type::String => f.write_str("System.String"),
            Type::Object => f.write_str("System.Object"),
            Type::Map => f.write_str("System.Collections.Generic.IDictionary<System.String, System.Object>"),
            Type::Module => f.write_str("System.Reflection.Assembly"),
            Type::Action(params) => {
                f.write_str("System.Action<")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{p}")?;
                }
                f.write_str(">")
            }
            Type::Class(class) => f.write_str(&class.name),
            Type::Null => f.write_str("<null>"),
        }
    }
}

/// What flavour of user-defined type a [`ClassType`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Struct,
}

/// Descriptor of a user-defined type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassType {
    pub name: String,
    pub kind: ClassKind,
    pub base: Option<Arc<ClassType>>,
    pub interfaces: Vec<Arc<ClassType>>,
    /// Targets of public implicit conversion operators declared on this type.
    pub conversions: Vec<Type>,
}

impl ClassType {
    fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            base: None,
            interfaces: Vec::new(),
            conversions: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, ClassKind::Class)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, ClassKind::Interface)
    }

    pub fn value(name: impl Into<String>) -> Self {
        Self::new(name, ClassKind::Struct)
    }

    pub fn with_base(mut self, base: Arc<ClassType>) -> Self {
        self.base = Some(base);
        self
    }

    pub fn implementing(mut self, interface: Arc<ClassType>) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_conversion(mut self, target: Type) -> Self {
        self.conversions.push(target);
        self
    }

    /// Freeze into a shareable [`Type::Class`].
    pub fn into_type(self) -> Type {
        Type::Class(Arc::new(self))
    }

    /// Whether `self` is `other`, derives from it, or implements it (directly or through a base).
    pub fn derives_from(&self, other: &ClassType) -> bool {
        if self == other {
            return true;
        }
        if self.interfaces.iter().any(|i| i.derives_from(other)) {
            return true;
        }
        self.base.as_ref().is_some_and(|b| b.derives_from(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_and_reference_classification() {
        assert!(Type::Primitive(PrimitiveKind::Int32).is_value_type());
        assert!(!Type::Primitive(PrimitiveKind::Int32).is_reference_type());
        assert!(Type::String.is_reference_type());
        assert!(Type::nullable(Type::Primitive(PrimitiveKind::Int32)).is_value_type());
        assert!(ClassType::value("Point").into_type().is_value_type());
        assert!(ClassType::interface("IRunnable").into_type().is_reference_type());
        assert!(!Type::Void.is_reference_type() && !Type::Void.is_value_type());
    }

    #[test]
    fn derives_from_walks_bases_and_interfaces() {
        let listener = Arc::new(ClassType::interface("ITestListener"));
        let base = Arc::new(ClassType::class("BaseController").implementing(listener.clone()));
        let derived = ClassType::class("Controller").with_base(base.clone());

        assert!(derived.derives_from(&base));
        assert!(derived.derives_from(&listener));
        assert!(!base.derives_from(&derived));
    }

    #[test]
    fn display_uses_canonical_names() {
        assert_eq!(Type::Primitive(PrimitiveKind::Int64).to_string(), "System.Int64");
        assert_eq!(Type::string_action().to_string(), "System.Action<System.String>");
        assert_eq!(
            Type::nullable(Type::Primitive(PrimitiveKind::Boolean)).to_string(),
            "System.Nullable<System.Boolean>"
        );
    }
}
