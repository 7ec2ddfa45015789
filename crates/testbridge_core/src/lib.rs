//! Provide the pure building blocks the testbridge driver uses to talk to framework modules it has no
//! compile-time knowledge of.
//!
//! This crate is intentionally small and dependency-light. It contains:
//! - a runtime type model ([`types`]) with a registry of primitive kinds,
//! - the type-compatibility resolver ([`compat`]) deciding whether an argument can be passed where a parameter
//!   is expected (assignment, numeric widening, null matching, implicit conversions),
//! - a narrow dynamic object model ([`reflect`]): modules, type descriptors, methods, values and instances.
//!
//! ## Notes
//!
//! - This is a "semantic core" crate: **no IO** and no global mutable state. The only shared data is the
//!   read-only widening table in [`compat`].

#![deny(clippy::unwrap_used)]

pub mod compat;
pub mod errors;
pub mod reflect;
pub mod types;

pub use compat::{Compatibility, WideningTable, is_assignable, is_castable, parameters_match};
pub use errors::{Fault, FaultKind};
pub use reflect::{Action, ConstructorInfo, Instance, MethodInfo, Module, ParamInfo, TypeInfo, Value, Visibility};
pub use types::{ClassKind, ClassType, PrimitiveKind, Type};
