//! The type universe and the relations that hold between its members.
//!
//! This crate owns everything that is pure data about types: the
//! interned [`ty::TypeArena`], the cached [`flags::TypeFlags`], fresh
//! [`variable::Variable`]s, per-generic-scope [`environment::GenericEnvironment`]s,
//! and the [`relations::RelationsStore`] of canonical equivalence and
//! registered conformances. Populating any of this from an AST — that
//! is, deciding *what* a declaration's type is — belongs to
//! `lucent-sema`, one layer up; this crate only has to make that data
//! cheap to construct, compare, and query once it exists.

pub mod flags;
pub use flags::TypeFlags;

pub mod variable;
pub use variable::{Variable, VariableAllocator, VariableContext};

pub mod ty;
pub use ty::{
    BuiltinKind, CallableVariant, GenericArgument, Interface, LabeledInput, NominalKind, TypeArena, TypeId, TypeKind,
};

pub mod environment;
pub use environment::{GenericEnvironment, WhereConstraint};

pub mod relations;
pub use relations::{Conformance, ConformanceId, Implementation, RelationsStore, SynthesizedKind};
