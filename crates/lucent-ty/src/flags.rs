//! Cached type flags.
//!
//! Every constructed type caches a summary of its own structure so the
//! realizer and solver never have to walk a type tree to answer
//! "does this contain a variable" or "is this canonical already".
//! Flags are computed once at construction time from the flags of a
//! type's immediate children and never recomputed.

use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct TypeFlags: u8 {
        /// Contains a fresh unification variable somewhere in its structure.
        const HAS_VARIABLE = 1 << 0;
        /// Contains the `error` sentinel somewhere in its structure.
        const HAS_ERROR = 1 << 1;
        /// Contains an unsubstituted generic type parameter or skolem.
        const HAS_GENERIC_TYPE_PARAMETER = 1 << 2;
        /// Contains an unsubstituted generic value parameter.
        const HAS_GENERIC_VALUE_PARAMETER = 1 << 3;
        /// Already in canonical form (no alias expansion or argument
        /// normalization would change it).
        const IS_CANONICAL = 1 << 4;
    }
}

impl TypeFlags {
    pub fn has_variable(self) -> bool {
        self.contains(TypeFlags::HAS_VARIABLE)
    }

    pub fn has_error(self) -> bool {
        self.contains(TypeFlags::HAS_ERROR)
    }

    pub fn has_generic_type_parameter(self) -> bool {
        self.contains(TypeFlags::HAS_GENERIC_TYPE_PARAMETER)
    }

    pub fn has_generic_value_parameter(self) -> bool {
        self.contains(TypeFlags::HAS_GENERIC_VALUE_PARAMETER)
    }

    pub fn is_canonical(self) -> bool {
        self.contains(TypeFlags::IS_CANONICAL)
    }

    /// The flags of a compound type are the union of its children's
    /// flags, minus canonicality, which each constructor decides for
    /// itself (a bound-generic of canonical arguments over a canonical
    /// base is canonical; a tuple of canonical elements is canonical;
    /// and so on — never implied simply by unioning children).
    pub fn union_children(children: impl IntoIterator<Item = TypeFlags>) -> TypeFlags {
        children.into_iter().fold(TypeFlags::empty(), |acc, f| {
            acc | (f - TypeFlags::IS_CANONICAL)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_children_drops_canonical_bit() {
        let a = TypeFlags::HAS_VARIABLE | TypeFlags::IS_CANONICAL;
        let b = TypeFlags::HAS_ERROR;
        let unioned = TypeFlags::union_children([a, b]);
        assert!(unioned.has_variable());
        assert!(unioned.has_error());
        assert!(!unioned.is_canonical());
    }
}
