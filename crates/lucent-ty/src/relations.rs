//! The relations store: canonicalization, equivalence, registered
//! conformances, and the refinement closure over traits.
//!
//! This is pure data plus the structural rules that follow from it —
//! *deciding* that a model conforms to a trait is the conformance
//! checker's job (`lucent-sema::conformance`); this store only records
//! the decision and answers queries about what has already been
//! recorded.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use lucent_ast::{DeclId, ScopeId};
use lucent_common::Span;

use crate::environment::WhereConstraint;
use crate::ty::{GenericArgument, TypeArena, TypeId, TypeKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConformanceId(u32);

impl ConformanceId {
    fn from_index(index: usize) -> Self {
        ConformanceId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What satisfied a single requirement of a conformance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Implementation {
    /// An ordinary member declaration on the model (or an extension of it).
    Concrete(DeclId),
    Synthesized(SynthesizedKind),
}

/// The built-in traits this store permits synthesizing requirements
/// for (`Destructible`, `Movable`, `Copyable`); see
/// `lucent-sema::conformance` for the synthesis rules themselves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SynthesizedKind {
    Destroy,
    MoveInitialize,
    MoveAssign,
    CopyInitialize,
    CopyAssign,
}

#[derive(Clone, Debug)]
pub struct Conformance {
    pub model: TypeId,
    pub concept: DeclId,
    pub arguments: IndexMap<DeclId, GenericArgument>,
    pub conditions: Vec<WhereConstraint>,
    pub source_decl: DeclId,
    pub exposition_scope: ScopeId,
    pub implementations: FxHashMap<DeclId, Implementation>,
    pub site: Span,
}

/// Why a registration was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RedundantConformance {
    pub first_site: Span,
}

#[derive(Default)]
pub struct RelationsStore {
    conformances: Vec<Conformance>,
    /// (canonical model, concept, exposition scope) -> the one
    /// conformance registered for that triple; enforces "at most one
    /// conformance may be registered per exposition scope".
    by_model_concept_scope: FxHashMap<(TypeId, DeclId, ScopeId), ConformanceId>,
    /// `B: A` edges collected as trait declarations are realized —
    /// populated by the conformance checker, queried by
    /// `conformed_traits` to compute the transitive refinement closure.
    refines: FxHashMap<DeclId, Vec<DeclId>>,
}

impl RelationsStore {
    pub fn new() -> Self {
        RelationsStore::default()
    }

    /// Record that trait `refiner` refines `base` (`trait refiner: base`).
    pub fn register_refinement(&mut self, refiner: DeclId, base: DeclId) {
        self.refines.entry(refiner).or_default().push(base);
    }

    /// Register a conformance, unless one is already registered for the
    /// same (canonical model, concept) pair within `exposition_scope`.
    pub fn register(&mut self, conformance: Conformance) -> Result<ConformanceId, RedundantConformance> {
        let key = (conformance.model, conformance.concept, conformance.exposition_scope);
        if let Some(&existing) = self.by_model_concept_scope.get(&key) {
            return Err(RedundantConformance { first_site: self.conformances[existing.index()].site });
        }
        let id = ConformanceId::from_index(self.conformances.len());
        self.by_model_concept_scope.insert(key, id);
        self.conformances.push(conformance);
        Ok(id)
    }

    pub fn get(&self, id: ConformanceId) -> &Conformance {
        &self.conformances[id.index()]
    }

    /// Every conformance whose model canonicalizes to `model`, visible
    /// from `scope` (registered in `scope` or an ancestor of it — file-
    /// level conformances are promoted to module-wide visibility by the
    /// caller choosing the module scope as `exposition_scope` at
    /// registration time, so a simple equality/ancestor check here
    /// suffices).
    pub fn conformances_of<'a>(
        &'a self,
        model: TypeId,
        scope_is_visible: impl Fn(ScopeId) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Conformance> + 'a {
        self.conformances
            .iter()
            .filter(move |c| c.model == model && scope_is_visible(c.exposition_scope))
    }

    /// Every trait `model` conforms to, directly or through refinement:
    /// traits `A`, `B: A`; `T: B` implies `conformedTraits(T) = {A, B}`.
    pub fn conformed_traits(&self, model: TypeId, scope_is_visible: impl Fn(ScopeId) -> bool) -> Vec<DeclId> {
        let mut seen = Vec::new();
        let mut stack: Vec<DeclId> = self
            .conformances
            .iter()
            .filter(|c| c.model == model && scope_is_visible(c.exposition_scope))
            .map(|c| c.concept)
            .collect();
        while let Some(trait_) = stack.pop() {
            if seen.contains(&trait_) {
                continue;
            }
            seen.push(trait_);
            if let Some(bases) = self.refines.get(&trait_) {
                stack.extend(bases.iter().copied());
            }
        }
        seen
    }

    pub fn conforms_to(&self, model: TypeId, concept: DeclId, scope_is_visible: impl Fn(ScopeId) -> bool) -> bool {
        self.conformed_traits(model, scope_is_visible).contains(&concept)
    }
}

/// Canonicalize `ty`: expand type-alias nominals through
/// `alias_targets` (a decl id -> already-realized aliased type map,
/// populated by the realizer — this store never realizes anything
/// itself) and recursively canonicalize every structural child.
/// Idempotent: `canonical(canonical(t)) == canonical(t)`.
pub fn canonicalize(arena: &mut TypeArena, alias_targets: &FxHashMap<DeclId, TypeId>, ty: TypeId) -> TypeId {
    if arena.flags(ty).is_canonical() {
        return ty;
    }
    match arena.kind(ty).clone() {
        TypeKind::Nominal { kind: crate::ty::NominalKind::TypeAlias, decl } => match alias_targets.get(&decl) {
            Some(&target) => canonicalize(arena, alias_targets, target),
            // Alias not yet realized (shouldn't happen once realization
            // has completed, but canonicalization must not panic on a
            // partially-checked program); leave it as-is.
            None => ty,
        },
        TypeKind::Metatype(inner) => {
            let inner = canonicalize(arena, alias_targets, inner);
            arena.metatype(inner)
        }
        TypeKind::Tuple(elements) => {
            let elements: Vec<_> = elements.into_iter().map(|e| canonicalize(arena, alias_targets, e)).collect();
            arena.tuple(elements)
        }
        TypeKind::Sum(elements) => {
            let elements: Vec<_> = elements.into_iter().map(|e| canonicalize(arena, alias_targets, e)).collect();
            arena.sum(elements)
        }
        TypeKind::Parameter { inner, convention } => {
            let inner = canonicalize(arena, alias_targets, inner);
            arena.parameter(inner, convention)
        }
        TypeKind::Remote { inner, effect } => {
            let inner = canonicalize(arena, alias_targets, inner);
            arena.remote(inner, effect)
        }
        TypeKind::BoundGeneric { base, arguments } => {
            let base = canonicalize(arena, alias_targets, base);
            // Argument order is already normalized to declaration order
            // by the generic environment builder at construction time;
            // canonicalization only needs to recurse into each type
            // argument, never re-sort the map.
            let mut normalized = IndexMap::with_capacity(arguments.len());
            for (param, arg) in arguments {
                let arg = match arg {
                    GenericArgument::Type(t) => GenericArgument::Type(canonicalize(arena, alias_targets, t)),
                    GenericArgument::Value(v) => GenericArgument::Value(v),
                };
                normalized.insert(param, arg);
            }
            arena.bound_generic(base, normalized)
        }
        TypeKind::ConformanceLens { subject, trait_ } => {
            let subject = canonicalize(arena, alias_targets, subject);
            arena.conformance_lens(subject, trait_)
        }
        // Every other variant is already structurally canonical once
        // its own constructor ran (nominal non-aliases, generic
        // parameters, skolems, variables, lambdas/bundles/subscripts
        // built from already-canonical pieces by the realizer,
        // existentials, error/never/void/any/built-in).
        _ => ty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::NominalKind;
    use lucent_ast::ScopeId;

    fn scope() -> ScopeId {
        ScopeId::from_index(0)
    }

    #[test]
    fn canonicalize_is_idempotent_through_an_alias() {
        let mut arena = TypeArena::new();
        let target_decl = DeclId::from_index(0);
        let alias_decl = DeclId::from_index(1);
        let target = arena.nominal(NominalKind::Product, target_decl);
        let alias = arena.nominal(NominalKind::TypeAlias, alias_decl);

        let mut targets = FxHashMap::default();
        targets.insert(alias_decl, target);

        let once = canonicalize(&mut arena, &targets, alias);
        let twice = canonicalize(&mut arena, &targets, once);
        assert_eq!(once, target);
        assert_eq!(once, twice);
    }

    #[test]
    fn register_rejects_redundant_conformance_in_same_scope() {
        let mut arena = TypeArena::new();
        let model = arena.nominal(NominalKind::Product, DeclId::from_index(0));
        let concept = DeclId::from_index(1);
        let mut store = RelationsStore::new();

        let make = || Conformance {
            model,
            concept,
            arguments: IndexMap::new(),
            conditions: Vec::new(),
            source_decl: DeclId::from_index(2),
            exposition_scope: scope(),
            implementations: FxHashMap::default(),
            site: Span::dummy(),
        };

        assert!(store.register(make()).is_ok());
        assert!(store.register(make()).is_err());
    }

    #[test]
    fn conformed_traits_includes_transitive_refinements() {
        let mut arena = TypeArena::new();
        let model = arena.nominal(NominalKind::Product, DeclId::from_index(0));
        let trait_a = DeclId::from_index(1);
        let trait_b = DeclId::from_index(2);
        let mut store = RelationsStore::new();
        store.register_refinement(trait_b, trait_a);

        store
            .register(Conformance {
                model,
                concept: trait_b,
                arguments: IndexMap::new(),
                conditions: Vec::new(),
                source_decl: DeclId::from_index(3),
                exposition_scope: scope(),
                implementations: FxHashMap::default(),
                site: Span::dummy(),
            })
            .unwrap();

        let traits = store.conformed_traits(model, |_| true);
        assert!(traits.contains(&trait_a));
        assert!(traits.contains(&trait_b));
    }
}
