//! Primitive value-kind vocabulary.
//!
//! This registry covers the primitive value kinds a framework controller may declare in its operation
//! signatures, with their canonical (fully-qualified) names and short aliases.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-insensitive ASCII**.
//! - This module is vocabulary only (spellings + metadata). Conversion rules live in [`crate::compat`].
//!
//! ## Examples
//! ```rust
//! use testbridge_core::types::primitives::{self, PrimitiveKind};
//!
//! assert_eq!(primitives::from_str("int"), Some(PrimitiveKind::Int32));
//! assert_eq!(primitives::from_str("System.Int64"), Some(PrimitiveKind::Int64));
//! assert_eq!(primitives::as_str(PrimitiveKind::Double), "System.Double");
//! ```

/// Stable identifier for primitive value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Boolean,
    Char,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
}

/// Metadata for a primitive kind.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveInfo {
    pub id: PrimitiveKind,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub numeric: bool,
}

/// Registry of primitive kinds.
pub const PRIMITIVES: &[PrimitiveInfo] = &[
    info(PrimitiveKind::Boolean, "System.Boolean", &["bool"], false),
    info(PrimitiveKind::Char, "System.Char", &["char"], true),
    info(PrimitiveKind::SByte, "System.SByte", &["sbyte", "i8"], true),
    info(PrimitiveKind::Byte, "System.Byte", &["byte", "u8"], true),
    info(PrimitiveKind::Int16, "System.Int16", &["short", "i16"], true),
    info(PrimitiveKind::UInt16, "System.UInt16", &["ushort", "u16"], true),
    info(PrimitiveKind::Int32, "System.Int32", &["int", "i32"], true),
    info(PrimitiveKind::UInt32, "System.UInt32", &["uint", "u32"], true),
    info(PrimitiveKind::Int64, "System.Int64", &["long", "i64"], true),
    info(PrimitiveKind::UInt64, "System.UInt64", &["ulong", "u64"], true),
    info(PrimitiveKind::Single, "System.Single", &["float", "f32"], true),
    info(PrimitiveKind::Double, "System.Double", &["double", "f64"], true),
    info(PrimitiveKind::Decimal, "System.Decimal", &["decimal"], true),
];

/// Resolve a type name to a [`PrimitiveKind`].
///
/// ## Parameters
/// - `name`: Candidate type name (canonical or alias).
///
/// ## Returns
/// - `Some(PrimitiveKind)` if the spelling matches this registry.
/// - `None` otherwise.
pub fn from_str(name: &str) -> Option<PrimitiveKind> {
    if let Some(p) = PRIMITIVES.iter().find(|p| p.canonical.eq_ignore_ascii_case(name)) {
        return Some(p.id);
    }
    PRIMITIVES
        .iter()
        .find(|p| p.aliases.iter().any(|a| a.eq_ignore_ascii_case(name)))
        .map(|p| p.id)
}

/// Return the canonical spelling for a primitive kind (e.g. `"System.Int32"`).
pub fn as_str(id: PrimitiveKind) -> &'static str {
    info_for(id).canonical
}

/// Return the full metadata entry for a primitive kind.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: PrimitiveKind) -> &'static PrimitiveInfo {
    PRIMITIVES
        .iter()
        .find(|p| p.id == id)
        .expect("INVARIANT: every PrimitiveKind has a registry entry")
}

const fn info(
    id: PrimitiveKind,
    canonical: &'static str,
    aliases: &'static [&'static str],
    numeric: bool,
) -> PrimitiveInfo {
    PrimitiveInfo {
        id,
        canonical,
        aliases,
        numeric,
    }
}
