//! Generic environment construction (§3 "Generic environment", §9
//! design note on associated-type/value stubs).
//!
//! An environment is built lazily, once per generic-scope declaration
//! id, and cached for the checker's lifetime — the same memoization
//! discipline as `realize`, just without a three-color marker, since a
//! generic parameter list cannot recurse into itself.

use lucent_ast::DeclId;
use lucent_common::Span;
use lucent_ty::{GenericEnvironment, WhereConstraint};

use crate::checker::Checker;

impl<'p> Checker<'p> {
    /// The generic parameter declarations introduced directly by
    /// `decl`, in declaration order. Empty for a non-generic
    /// declaration.
    pub fn generic_params_of(&self, decl: DeclId) -> Vec<DeclId> {
        match &self.program.decl(decl).kind {
            lucent_ast::DeclKind::Product { generic_params, .. } => generic_params.clone(),
            lucent_ast::DeclKind::Trait { generic_params, .. } => generic_params.clone(),
            lucent_ast::DeclKind::Function(f) | lucent_ast::DeclKind::Initializer(f) => f.generic_params.clone(),
            lucent_ast::DeclKind::Method(m) => m.generic_params.clone(),
            lucent_ast::DeclKind::Subscript(s) => s.generic_params.clone(),
            _ => Vec::new(),
        }
    }

    /// The environment for `decl`'s own generic-parameter list: build
    /// it on first request, then return the cached value on every
    /// later call.
    pub fn generic_environment(&mut self, decl: DeclId) -> GenericEnvironment {
        if let Some(env) = self.environments.get(&decl) {
            return env.clone();
        }
        let parameters = self.generic_params_of(decl);
        let mut env = GenericEnvironment::new(parameters.clone());
        for &param in &parameters {
            self.realize(param);
            if let Some(constraint) = self.sugared_conformance_constraint(param) {
                env.push_constraint(constraint);
            }
        }
        self.environments.insert(decl, env.clone());
        env
    }

    /// A type-parameter's first annotation, when it names a trait,
    /// becomes a `Conforms` where-constraint sugared directly onto the
    /// environment, rather than requiring a separate `where` clause —
    /// the "sugared conformance constraints" of §2's generic
    /// environment builder row.
    fn sugared_conformance_constraint(&mut self, param: DeclId) -> Option<WhereConstraint> {
        let lucent_ast::DeclKind::GenericParameter(g) = &self.program.decl(param).kind else { return None };
        let first = *g.annotations.first()?;
        let use_scope = self.program.decl(param).enclosing_scope;
        let annotation_ty = self.realize_type_expr(first, use_scope);
        let lucent_ty::TypeKind::Metatype(inner) = self.arena.kind(annotation_ty).clone() else { return None };
        let lucent_ty::TypeKind::Nominal { kind: lucent_ty::NominalKind::Trait, decl: trait_decl } = self.arena.kind(inner).clone() else {
            return None;
        };
        let skolem = self.arena.skolem(param);
        Some(WhereConstraint::Conforms { subject: skolem, trait_: trait_decl, site: Span::dummy() })
    }

    /// Whether `param` is rigid (skolemized) when referenced from
    /// `use_scope` — i.e. `use_scope` sits inside the `Generic(owner)`
    /// scope that introduced it — as opposed to belonging to some
    /// other generic declaration's parameter list, in which case a
    /// reference from `use_scope` must open a fresh variable instead.
    pub(crate) fn generic_param_is_rigid_at(&self, param: DeclId, use_scope: lucent_ast::ScopeId) -> bool {
        self.program.scopes.walk_up(use_scope).any(|s| match self.program.scopes.kind(s) {
            lucent_ast::ScopeKind::Generic(owner) => self.generic_params_of(owner).contains(&param),
            _ => false,
        })
    }
}
