//! Type compatibility: can an argument of type `A` be passed where a parameter of type `P` is expected?
//!
//! [`Compatibility::is_castable`] answers in this order:
//! 1. `A` is assignable to `P` (identity, boxing to `Object`, base/interface relationships, `T` into
//!    `Nullable<T>`).
//! 2. `A` is the null marker and `P` is a reference type or a nullable value type.
//! 3. `P` is a widening target and `A` is one of its accepted sources in the [`WideningTable`].
//! 4. `A` declares an implicit conversion to exactly `P`.
//!
//! The widening table is fixed data shared process-wide; a [`Compatibility`] borrows it, so resolvers are
//! `Copy` and safe to use from any thread.
//!
//! ## Examples
//! ```rust
//! use testbridge_core::compat::is_castable;
//! use testbridge_core::types::{PrimitiveKind, Type};
//!
//! let int = Type::Primitive(PrimitiveKind::Int32);
//! let long = Type::Primitive(PrimitiveKind::Int64);
//! assert!(is_castable(&long, &int));
//! assert!(!is_castable(&int, &long));
//! assert!(is_castable(&Type::String, &Type::Null));
//! ```

use crate::types::{PrimitiveKind, Type};

use PrimitiveKind::*;

/// Directed widening map: each entry lists the narrower kinds that implicitly convert into the wider one.
#[derive(Debug)]
pub struct WideningTable {
    entries: &'static [(PrimitiveKind, &'static [PrimitiveKind])],
}

/// Implicit numeric conversions accepted when matching parameters.
pub static IMPLICIT_NUMERIC_CONVERSIONS: WideningTable = WideningTable::new(&[
    (Decimal, &[SByte, Byte, Int16, UInt16, Int32, UInt32, Int64, UInt64, Char]),
    (Double, &[SByte, Byte, Int16, UInt16, Int32, UInt32, Int64, UInt64, Char, Single]),
    (Single, &[SByte, Byte, Int16, UInt16, Int32, UInt32, Int64, UInt64, Char]),
    (UInt64, &[Byte, UInt16, UInt32, Char]),
    (Int64, &[SByte, Byte, Int16, UInt16, Int32, UInt32, Char]),
    (UInt32, &[Byte, UInt16, Char]),
    (Int32, &[SByte, Byte, Int16, UInt16, Char]),
    (UInt16, &[Byte, Char]),
    (Int16, &[Byte]),
]);

impl WideningTable {
    pub const fn new(entries: &'static [(PrimitiveKind, &'static [PrimitiveKind])]) -> Self {
        Self { entries }
    }

    /// The standard implicit numeric conversion table.
    pub fn standard() -> &'static WideningTable {
        &IMPLICIT_NUMERIC_CONVERSIONS
    }

    /// The kinds that widen into `target` (empty if `target` is not a widening target).
    pub fn sources(&self, target: PrimitiveKind) -> &'static [PrimitiveKind] {
        self.entries
            .iter()
            .find(|(t, _)| *t == target)
            .map(|(_, sources)| *sources)
            .unwrap_or(&[])
    }

    /// Whether a `source` value implicitly widens into `target`.
    pub fn accepts(&self, target: PrimitiveKind, source: PrimitiveKind) -> bool {
        self.sources(target).contains(&source)
    }

    /// Iterate the widening targets in table order.
    pub fn targets(&self) -> impl Iterator<Item = PrimitiveKind> + '_ {
        self.entries.iter().map(|(t, _)| *t)
    }
}

/// Whether a value of type `from` is directly assignable to `to` (no conversion involved).
pub fn is_assignable(to: &Type, from: &Type) -> bool {
    if to == from {
        return true;
    }
    match (to, from) {
        (Type::Void, _) | (_, Type::Void) => false,
        (Type::Object, _) => true,
        (Type::Nullable(inner), _) => inner.as_ref() == from,
        (Type::Class(target), Type::Class(source)) => source.derives_from(target),
        _ => false,
    }
}

/// Castability resolver bound to a widening table.
#[derive(Debug, Clone, Copy)]
pub struct Compatibility<'t> {
    table: &'t WideningTable,
}

impl Default for Compatibility<'static> {
    fn default() -> Self {
        Self::standard()
    }
}

impl<'t> Compatibility<'t> {
    pub fn new(table: &'t WideningTable) -> Self {
        Self { table }
    }

    /// A resolver over [`IMPLICIT_NUMERIC_CONVERSIONS`].
    pub fn standard() -> Compatibility<'static> {
        Compatibility::new(WideningTable::standard())
    }

    pub fn table(&self) -> &'t WideningTable {
        self.table
    }

    /// Whether an argument of type `from` may be passed where `to` is expected.
    pub fn is_castable(&self, to: &Type, from: &Type) -> bool {
        if is_assignable(to, from) {
            return true;
        }

        if *from == Type::Null && (to.is_reference_type() || to.is_nullable_value()) {
            return true;
        }

        if let (Some(target), Some(source)) = (to.as_primitive(), from.as_primitive()) {
            if self.table.accepts(target, source) {
                return true;
            }
        }

        match from {
            Type::Class(class) => class.conversions.iter().any(|c| c == to),
            _ => false,
        }
    }

    /// Whether `args` satisfy `params` pairwise (same count, each position castable).
    pub fn parameters_match(&self, params: &[Type], args: &[Type]) -> bool {
        params.len() == args.len() && params.iter().zip(args).all(|(p, a)| self.is_castable(p, a))
    }

    /// Whether parameter list `a` is at least as specific as `b` (every `a[i]` castable to `b[i]`).
    pub fn at_least_as_specific(&self, a: &[Type], b: &[Type]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.is_castable(y, x))
    }

    /// Pick the overload to call among `candidates` (parameter lists in declaration order).
    ///
    /// ## Returns
    /// - The index of the most specific compatible candidate, i.e. one at least as specific as every other
    ///   compatible candidate. Ties keep the earliest declaration.
    /// - When no single candidate dominates, the first compatible candidate.
    /// - `None` if nothing is compatible with `args`.
    pub fn select_overload(&self, candidates: &[&[Type]], args: &[Type]) -> Option<usize> {
        let compatible: Vec<usize> = candidates
            .iter()
            .enumerate()
            .filter(|(_, params)| self.parameters_match(params, args))
            .map(|(i, _)| i)
            .collect();

        let first = *compatible.first()?;
        let best = compatible.iter().copied().find(|&i| {
            compatible
                .iter()
                .all(|&j| i == j || self.at_least_as_specific(candidates[i], candidates[j]))
        });
        Some(best.unwrap_or(first))
    }
}

/// [`Compatibility::is_castable`] over the standard widening table.
pub fn is_castable(to: &Type, from: &Type) -> bool {
    Compatibility::standard().is_castable(to, from)
}

/// [`Compatibility::parameters_match`] over the standard widening table.
pub fn parameters_match(params: &[Type], args: &[Type]) -> bool {
    Compatibility::standard().parameters_match(params, args)
}
