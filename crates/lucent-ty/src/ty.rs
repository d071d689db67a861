//! The type universe.
//!
//! `Type` is a single closed, tagged variant rather than an open trait
//! hierarchy, so every case analysis over types is exhaustive and
//! equality is structural. Nominal and bound-generic types are
//! interned by key; callable, tuple, and sum types are structural
//! values whose own children are already-interned [`TypeId`]s, so
//! interning them still dedups correctly without a separate identity.

use indexmap::IndexMap;
use lucent_ast::{AccessEffect, DeclId, ExprId, ParameterConvention};
use rustc_hash::FxHashMap;

use crate::environment::WhereConstraint;
use crate::flags::TypeFlags;
use crate::variable::Variable;

/// A handle into a [`TypeArena`]. Cheap to copy, compare, and hash —
/// the only thing code outside this module ever holds onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    fn from_index(index: usize) -> Self {
        TypeId(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A generic argument: either a type or an unevaluated value
/// expression. Value arguments are stored as written; this universe
/// does not attempt constant evaluation of them (see `DESIGN.md`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GenericArgument {
    Type(TypeId),
    Value(ExprId),
}

/// A single labeled input of a callable shape (`label: convention Type`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LabeledInput {
    pub label: Option<lucent_common::Atom>,
    pub ty: TypeId,
}

/// One access-effect variant of a method or subscript bundle.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CallableVariant {
    pub inputs: Vec<LabeledInput>,
    pub output: TypeId,
}

/// What an existential's interface is given by.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Interface {
    /// A (possibly singleton) set of traits the existential conforms to.
    Traits(Vec<DeclId>),
    /// A single generic type used as the interface, e.g. `any Collection`.
    GenericType(TypeId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
    /// The sentinel naming the built-in module itself (`Builtin`).
    ModuleSentinel,
    Pointer,
    /// The synthetic module containing every intrinsic declaration.
    ModuleOfBuiltins,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NominalKind {
    Product,
    Trait,
    TypeAlias,
    Module,
    Namespace,
}

/// The closed set of type variants. See GLOSSARY for the vocabulary.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Nominal { kind: NominalKind, decl: DeclId },
    GenericParameter(DeclId),
    AssociatedType(DeclId),
    AssociatedValue(DeclId),
    /// A universally-quantified parameter fixed inside the scope that
    /// introduced it. Carries the generic-parameter declaration it
    /// skolemizes so two skolems of the same parameter compare equal.
    Skolem(DeclId),
    Variable(Variable),
    BoundGeneric { base: TypeId, arguments: IndexMap<DeclId, GenericArgument> },
    /// "The type of a type" — wraps an instance type.
    Metatype(TypeId),
    Lambda {
        receiver_effect: Option<AccessEffect>,
        environment: Vec<TypeId>,
        inputs: Vec<LabeledInput>,
        output: TypeId,
    },
    MethodBundle {
        receiver: TypeId,
        variants: Vec<(AccessEffect, CallableVariant)>,
    },
    Subscript {
        is_property: bool,
        environment: Vec<TypeId>,
        variants: Vec<(AccessEffect, CallableVariant)>,
    },
    /// A bare type carrying an access convention, stripped by the
    /// resolver during parameter matching.
    Parameter { inner: TypeId, convention: ParameterConvention },
    /// A borrow of `inner` under the given effect.
    Remote { inner: TypeId, effect: AccessEffect },
    Tuple(Vec<TypeId>),
    /// Must have at least two elements once checked (see
    /// `SumWithZeroOrOneElement`); the universe itself does not forbid
    /// a degenerate sum, since the diagnostic is the checker's job.
    Sum(Vec<TypeId>),
    Existential { interface: Interface, where_constraints: Vec<WhereConstraint> },
    /// `subject` viewed through `trait_`'s requirement set.
    ConformanceLens { subject: TypeId, trait_: DeclId },
    Error,
    BuiltIn(BuiltinKind),
    Never,
    Void,
    Any,
}

struct TypeData {
    kind: TypeKind,
    flags: TypeFlags,
}

/// The interning arena for every [`TypeKind`] constructed during a
/// compilation. One arena per checker instance.
#[derive(Default)]
pub struct TypeArena {
    types: Vec<TypeData>,
    interned: FxHashMap<TypeKind, TypeId>,
    error: Option<TypeId>,
    never: Option<TypeId>,
    void: Option<TypeId>,
    any: Option<TypeId>,
}

impl TypeArena {
    pub fn new() -> Self {
        TypeArena::default()
    }

    /// Intern `kind`, computing its flags from `children`'s flags plus
    /// any bits this call contributes directly (see [`TypeFlags::union_children`]).
    /// Canonicality is never inferred here — callers that know a
    /// constructor preserves canonicality pass `IS_CANONICAL` explicitly
    /// via `own_flags`.
    pub fn intern(&mut self, kind: TypeKind, children: &[TypeId], own_flags: TypeFlags) -> TypeId {
        if let Some(&id) = self.interned.get(&kind) {
            return id;
        }
        let child_flags = TypeFlags::union_children(children.iter().map(|&c| self.flags(c)));
        let flags = child_flags | own_flags;
        let id = TypeId::from_index(self.types.len());
        self.types.push(TypeData { kind: kind.clone(), flags });
        self.interned.insert(kind, id);
        id
    }

    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.types[id.index()].kind
    }

    pub fn flags(&self, id: TypeId) -> TypeFlags {
        self.types[id.index()].flags
    }

    pub fn error(&mut self) -> TypeId {
        if let Some(id) = self.error {
            return id;
        }
        let id = self.intern(TypeKind::Error, &[], TypeFlags::HAS_ERROR | TypeFlags::IS_CANONICAL);
        self.error = Some(id);
        id
    }

    pub fn never(&mut self) -> TypeId {
        if let Some(id) = self.never {
            return id;
        }
        let id = self.intern(TypeKind::Never, &[], TypeFlags::IS_CANONICAL);
        self.never = Some(id);
        id
    }

    pub fn void(&mut self) -> TypeId {
        if let Some(id) = self.void {
            return id;
        }
        let id = self.intern(TypeKind::Void, &[], TypeFlags::IS_CANONICAL);
        self.void = Some(id);
        id
    }

    pub fn any(&mut self) -> TypeId {
        if let Some(id) = self.any {
            return id;
        }
        let id = self.intern(TypeKind::Any, &[], TypeFlags::IS_CANONICAL);
        self.any = Some(id);
        id
    }

    pub fn nominal(&mut self, kind: NominalKind, decl: DeclId) -> TypeId {
        // A type alias is canonical only after `canonical()` expands it;
        // every other nominal kind denotes itself and is canonical
        // the moment it is constructed.
        let canonical = if matches!(kind, NominalKind::TypeAlias) { TypeFlags::empty() } else { TypeFlags::IS_CANONICAL };
        self.intern(TypeKind::Nominal { kind, decl }, &[], canonical)
    }

    pub fn variable(&mut self, variable: Variable) -> TypeId {
        self.intern(TypeKind::Variable(variable), &[], TypeFlags::HAS_VARIABLE)
    }

    pub fn skolem(&mut self, decl: DeclId) -> TypeId {
        self.intern(TypeKind::Skolem(decl), &[], TypeFlags::HAS_GENERIC_TYPE_PARAMETER | TypeFlags::IS_CANONICAL)
    }

    pub fn generic_parameter(&mut self, decl: DeclId) -> TypeId {
        self.intern(TypeKind::GenericParameter(decl), &[], TypeFlags::HAS_GENERIC_TYPE_PARAMETER)
    }

    /// Whether every type in `children` already carries `IS_CANONICAL`
    /// — structural constructors (tuple, sum, metatype, parameter,
    /// remote, bound-generic) are canonical exactly when their parts
    /// are, since none of them perform alias expansion themselves.
    fn children_canonical(&self, children: &[TypeId]) -> TypeFlags {
        if children.iter().all(|&c| self.flags(c).is_canonical()) {
            TypeFlags::IS_CANONICAL
        } else {
            TypeFlags::empty()
        }
    }

    pub fn metatype(&mut self, inner: TypeId) -> TypeId {
        let own = self.children_canonical(&[inner]);
        self.intern(TypeKind::Metatype(inner), &[inner], own)
    }

    pub fn tuple(&mut self, elements: Vec<TypeId>) -> TypeId {
        let own = self.children_canonical(&elements);
        let children = elements.clone();
        self.intern(TypeKind::Tuple(elements), &children, own)
    }

    pub fn sum(&mut self, elements: Vec<TypeId>) -> TypeId {
        let own = self.children_canonical(&elements);
        let children = elements.clone();
        self.intern(TypeKind::Sum(elements), &children, own)
    }

    pub fn parameter(&mut self, inner: TypeId, convention: ParameterConvention) -> TypeId {
        let own = self.children_canonical(&[inner]);
        self.intern(TypeKind::Parameter { inner, convention }, &[inner], own)
    }

    pub fn remote(&mut self, inner: TypeId, effect: AccessEffect) -> TypeId {
        let own = self.children_canonical(&[inner]);
        self.intern(TypeKind::Remote { inner, effect }, &[inner], own)
    }

    pub fn bound_generic(&mut self, base: TypeId, arguments: IndexMap<DeclId, GenericArgument>) -> TypeId {
        let children: Vec<TypeId> = std::iter::once(base)
            .chain(arguments.values().filter_map(|arg| match arg {
                GenericArgument::Type(t) => Some(*t),
                GenericArgument::Value(_) => None,
            }))
            .collect();
        let own = self.children_canonical(&children);
        self.intern(TypeKind::BoundGeneric { base, arguments }, &children, own)
    }

    pub fn associated_type(&mut self, decl: DeclId) -> TypeId {
        self.intern(TypeKind::AssociatedType(decl), &[], TypeFlags::HAS_GENERIC_TYPE_PARAMETER)
    }

    pub fn associated_value(&mut self, decl: DeclId) -> TypeId {
        self.intern(TypeKind::AssociatedValue(decl), &[], TypeFlags::HAS_GENERIC_VALUE_PARAMETER)
    }

    pub fn lambda(
        &mut self,
        receiver_effect: Option<AccessEffect>,
        environment: Vec<TypeId>,
        inputs: Vec<LabeledInput>,
        output: TypeId,
    ) -> TypeId {
        let children: Vec<TypeId> = environment
            .iter()
            .copied()
            .chain(inputs.iter().map(|i| i.ty))
            .chain(std::iter::once(output))
            .collect();
        let own = self.children_canonical(&children);
        self.intern(TypeKind::Lambda { receiver_effect, environment, inputs, output }, &children, own)
    }

    pub fn method_bundle(&mut self, receiver: TypeId, variants: Vec<(AccessEffect, CallableVariant)>) -> TypeId {
        let children: Vec<TypeId> = std::iter::once(receiver)
            .chain(variants.iter().flat_map(|(_, v)| v.inputs.iter().map(|i| i.ty).chain(std::iter::once(v.output))))
            .collect();
        let own = self.children_canonical(&children);
        self.intern(TypeKind::MethodBundle { receiver, variants }, &children, own)
    }

    pub fn subscript(
        &mut self,
        is_property: bool,
        environment: Vec<TypeId>,
        variants: Vec<(AccessEffect, CallableVariant)>,
    ) -> TypeId {
        let children: Vec<TypeId> = environment
            .iter()
            .copied()
            .chain(variants.iter().flat_map(|(_, v)| v.inputs.iter().map(|i| i.ty).chain(std::iter::once(v.output))))
            .collect();
        let own = self.children_canonical(&children);
        self.intern(TypeKind::Subscript { is_property, environment, variants }, &children, own)
    }

    pub fn existential(&mut self, interface: Interface, where_constraints: Vec<WhereConstraint>) -> TypeId {
        let children: Vec<TypeId> = match &interface {
            Interface::Traits(_) => Vec::new(),
            Interface::GenericType(t) => vec![*t],
        };
        let own = self.children_canonical(&children);
        self.intern(TypeKind::Existential { interface, where_constraints }, &children, own)
    }

    pub fn conformance_lens(&mut self, subject: TypeId, trait_: DeclId) -> TypeId {
        let own = self.children_canonical(&[subject]);
        self.intern(TypeKind::ConformanceLens { subject, trait_ }, &[subject], own)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_dedups_structurally_equal_tuples() {
        let mut arena = TypeArena::new();
        let void = arena.void();
        let a = arena.tuple(vec![void, void]);
        let b = arena.tuple(vec![void, void]);
        assert_eq!(a, b);
    }

    #[test]
    fn error_type_carries_has_error_flag() {
        let mut arena = TypeArena::new();
        let error = arena.error();
        assert!(arena.flags(error).has_error());
    }

    #[test]
    fn variable_type_is_never_canonical() {
        let mut arena = TypeArena::new();
        let mut allocator = crate::variable::VariableAllocator::new();
        let v = allocator.fresh(crate::variable::VariableContext::ExpressionInference);
        let id = arena.variable(v);
        assert!(arena.flags(id).has_variable());
        assert!(!arena.flags(id).is_canonical());
    }

    #[test]
    fn tuple_of_canonical_children_is_canonical_but_union_strips_child_canonical_bit() {
        let mut arena = TypeArena::new();
        let void = arena.void();
        let tuple = arena.tuple(vec![void]);
        // own_flags explicitly asserts canonicality for tuples of
        // already-canonical elements; this test only documents that
        // the constructor, not the union, is what sets the bit.
        assert!(arena.flags(tuple).is_canonical());
    }
}
