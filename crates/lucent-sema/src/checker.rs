//! Orchestration: the `Checker` value and its two memoized entry
//! points, `realize` and `check`.
//!
//! Every other module in this crate is an `impl Checker` block in its
//! own file — `realizer.rs`, `resolver.rs`, `generator.rs`, `solver.rs`,
//! `conformance.rs`, `fold.rs`, `capture.rs`, `generic_env_builder.rs`
//! — the same way the teacher spreads one large state struct's
//! behavior across many single-concern files instead of one god
//! module. `Checker` itself is the *only* piece of mutable state; per
//! §5, no process-wide caches exist anywhere in this crate.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use lucent_ast::{DeclId, ModuleId, ScopedProgram};
use lucent_common::{CheckerOptions, Diagnostic, DiagnosticSink, Interner};
use lucent_ty::{GenericEnvironment, RelationsStore, TypeArena, TypeId, VariableAllocator};

use crate::property_maps::{DeclRequestState, PropertyMaps};
use crate::resolver::ResolverState;

/// The whole semantic front-end for one compilation. Owns the type
/// arena, the relations store, every property map, and the resolver's
/// caches; the AST it checks is borrowed read-only for its whole
/// lifetime (§5: "the AST is read-only; the scope tree is read-only;
/// everything the checker writes is owned by the checker").
pub struct Checker<'p> {
    pub program: &'p ScopedProgram,
    /// The interner that produced every `Atom` in `program`. Held only
    /// to recognize fixed intrinsic spellings (`Builtin`, `Any`,
    /// `Never`, `Self`, `Sum`, `Metatype`) by re-interning them and
    /// comparing `Atom`s — never to render a name back to text, which
    /// is a downstream diagnostics-rendering concern out of scope here.
    pub interner: &'p Interner,
    pub options: CheckerOptions,
    pub arena: TypeArena,
    pub variables: VariableAllocator,
    pub relations: RelationsStore,
    /// Type-alias declaration id -> its realized aliased type, fed to
    /// `lucent_ty::relations::canonicalize` so the relations store
    /// never has to call back into the realizer itself.
    pub alias_targets: FxHashMap<DeclId, TypeId>,
    pub props: PropertyMaps,
    /// Per generic-scope declaration id. Built lazily by
    /// `generic_env_builder` and cached here for the lifetime of the
    /// checker.
    pub environments: FxHashMap<DeclId, GenericEnvironment>,
    pub resolver: ResolverState,
    pub diagnostics: DiagnosticSink,
    realize_depth: u32,
}

impl<'p> Checker<'p> {
    pub fn new(program: &'p ScopedProgram, interner: &'p Interner, options: CheckerOptions) -> Self {
        Checker {
            program,
            interner,
            options,
            arena: TypeArena::new(),
            variables: VariableAllocator::new(),
            relations: RelationsStore::new(),
            alias_targets: FxHashMap::default(),
            props: PropertyMaps::new(),
            environments: FxHashMap::default(),
            resolver: ResolverState::new(),
            diagnostics: DiagnosticSink::new(),
            realize_depth: 0,
        }
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn enter_realize(&mut self) -> u32 {
        self.realize_depth += 1;
        self.realize_depth
    }

    pub(crate) fn exit_realize(&mut self) {
        self.realize_depth -= 1;
    }

    pub(crate) fn realize_depth(&self) -> u32 {
        self.realize_depth
    }

    /// Realize and check every top-level declaration of `module`,
    /// recursively. This is the driver a downstream CLI (out of scope)
    /// would call once per module after import resolution.
    pub fn check_module(&mut self, module: ModuleId) {
        let decls: Vec<DeclId> = self.program.top_level_decls(module).collect();
        for decl in decls {
            self.check(decl);
        }
    }

    /// Consume this checker, freezing it behind a read-only sharing
    /// wrapper (§5) so downstream IR-generation workers can query
    /// canonical types and conformances concurrently. No further
    /// mutation is possible through the returned handle.
    pub fn freeze(self) -> FrozenChecker<'p> {
        FrozenChecker { inner: Arc::new(RwLock::new(self)) }
    }

    /// Whether every reachable declaration finished checking without
    /// being forced to `error` by an unrecoverable defect — the
    /// module-level soundness summary used by the scenario tests.
    pub fn request_state(&self, decl: DeclId) -> DeclRequestState {
        self.props.request_state(decl)
    }
}

/// A read-only, `Arc`-shared handle onto a completed `Checker`,
/// guarded by a `parking_lot::RwLock` so multiple downstream workers
/// can read concurrently while a single writer (never constructed by
/// this crate — the checker itself never resumes mutation once frozen)
/// would still be serialized.
#[derive(Clone)]
pub struct FrozenChecker<'p> {
    inner: Arc<RwLock<Checker<'p>>>,
}

impl<'p> FrozenChecker<'p> {
    pub fn type_of(&self, decl: DeclId) -> Option<TypeId> {
        self.inner.read().props.decl_type(decl)
    }

    pub fn canonical(&self, ty: TypeId) -> TypeId {
        let mut guard = self.inner.write();
        let Checker { arena, alias_targets, .. } = &mut *guard;
        lucent_ty::relations::canonicalize(arena, alias_targets, ty)
    }

    pub fn conformances_of(&self, model: TypeId) -> Vec<DeclId> {
        self.inner.read().relations.conformed_traits(model, |_| true)
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.inner.read().diagnostics.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lucent_ast::ProgramBuilder;

    #[test]
    fn fresh_checker_has_no_diagnostics() {
        let (program, interner) = ProgramBuilder::new("main").into_parts();
        let checker = Checker::new(&program, &interner, CheckerOptions::new());
        assert!(checker.diagnostics.is_empty());
    }

    #[test]
    fn freezing_preserves_recorded_types() {
        let (program, interner) = ProgramBuilder::new("main").into_parts();
        let mut checker = Checker::new(&program, &interner, CheckerOptions::new());
        let decl = DeclId::from_index(0);
        let void = checker.arena.void();
        checker.props.set_decl_type(decl, void);
        let frozen = checker.freeze();
        assert_eq!(frozen.type_of(decl), Some(void));
    }
}
