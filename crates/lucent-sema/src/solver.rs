//! Constraint solving (§4.5): a work-list solver over a union-find
//! substitution, with disjunction/overload forking via snapshot and
//! rollback.

use std::collections::VecDeque;

use ena::unify::{InPlaceUnificationTable, NoError, UnifyKey, UnifyValue};
use lucent_common::{Diagnostic, DiagnosticCode, DiagnosticMessage, Span};
use lucent_ty::{TypeId, TypeKind, Variable};
use rustc_hash::FxHashMap;

use crate::checker::Checker;

/// A candidate considered by an `OverloadBinding` constraint: the
/// declaration, the labels its parameters were declared with (for
/// matching by call-site argument labels, §8 scenario 3), and its
/// realized callable type.
#[derive(Clone, Debug)]
pub struct OverloadCandidate {
    pub decl: lucent_ast::DeclId,
    pub parameter_labels: Vec<Option<lucent_common::Atom>>,
    pub ty: TypeId,
    pub output: TypeId,
}

#[derive(Clone, Debug)]
pub enum Constraint {
    Equality(TypeId, TypeId, Span),
    Subtyping(TypeId, TypeId, Span),
    /// `t` must satisfy the parameter contract of `u`, a
    /// `Parameter { inner, convention }` type.
    Parameter(TypeId, TypeId, Span),
    Conformance(TypeId, Vec<lucent_ast::DeclId>, Span),
    /// One alternative, a constraint list plus its penalty, must hold;
    /// the lowest total-penalty alternative that solves wins.
    Disjunction(Vec<(Vec<Constraint>, u32)>, Span),
    OverloadBinding { expr: lucent_ast::ExprId, candidates: Vec<OverloadCandidate>, argument_labels: Vec<Option<lucent_common::Atom>>, site: Span },
}

/// An ena union-find key over raw 32-bit variable identifiers. Packed
/// `Variable`s carry a context tag above bit 56 that this key ignores —
/// two variables with the same identifier but different contexts never
/// coexist in practice, since the allocator hands out one monotonic
/// identifier stream regardless of context.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct UnifyVar(u32);

impl UnifyKey for UnifyVar {
    type Value = Option<TypeId>;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        UnifyVar(u)
    }

    fn tag() -> &'static str {
        "lucent_sema::UnifyVar"
    }
}

impl UnifyValue for Option<TypeId> {
    type Error = NoError;

    fn unify_values(a: &Self, b: &Self) -> Result<Self, Self::Error> {
        Ok(match (a, b) {
            (Some(t), _) | (None, Some(t)) => Some(*t),
            (None, None) => None,
        })
    }
}

/// The outcome of solving one constraint set: the chosen binding for
/// every name expression an `OverloadBinding` constraint touched, and
/// diagnostics to merge into the checker's sink. Resolution of
/// variables to their bound type goes through `Solver::resolve`
/// directly rather than living on this record, since it needs the
/// live union-find table.
pub struct Solution {
    pub chosen: FxHashMap<lucent_ast::ExprId, lucent_ast::DeclId>,
    pub diagnostics: Vec<Diagnostic>,
    pub sound: bool,
}

pub(crate) struct Solver<'c, 'p> {
    checker: &'c mut Checker<'p>,
    table: InPlaceUnificationTable<UnifyVar>,
    index_of: FxHashMap<Variable, UnifyVar>,
}

impl<'c, 'p> Solver<'c, 'p> {
    pub fn new(checker: &'c mut Checker<'p>) -> Self {
        Solver { checker, table: InPlaceUnificationTable::new(), index_of: FxHashMap::default() }
    }

    fn key_of(&mut self, variable: Variable) -> UnifyVar {
        if let Some(&key) = self.index_of.get(&variable) {
            return key;
        }
        let key = self.table.new_key(None);
        self.index_of.insert(variable, key);
        key
    }

    /// Resolve `ty` through the current substitution, recursively
    /// rewriting any nested variable that is already bound. Unbound
    /// variables are left as-is (the caller's `sound` flag reflects
    /// whether that should have been possible).
    pub fn resolve(&mut self, ty: TypeId) -> TypeId {
        match self.checker.arena.kind(ty).clone() {
            TypeKind::Variable(v) => {
                let key = self.key_of(v);
                match self.table.probe_value(key) {
                    Some(bound) if bound != ty => self.resolve(bound),
                    _ => ty,
                }
            }
            TypeKind::Metatype(inner) => {
                let inner = self.resolve(inner);
                self.checker.arena.metatype(inner)
            }
            TypeKind::Tuple(elements) => {
                let elements: Vec<_> = elements.into_iter().map(|e| self.resolve(e)).collect();
                self.checker.arena.tuple(elements)
            }
            TypeKind::Sum(elements) => {
                let elements: Vec<_> = elements.into_iter().map(|e| self.resolve(e)).collect();
                self.checker.arena.sum(elements)
            }
            TypeKind::Parameter { inner, convention } => {
                let inner = self.resolve(inner);
                self.checker.arena.parameter(inner, convention)
            }
            TypeKind::Remote { inner, effect } => {
                let inner = self.resolve(inner);
                self.checker.arena.remote(inner, effect)
            }
            _ => ty,
        }
    }

    fn bind(&mut self, variable: Variable, ty: TypeId) {
        let key = self.key_of(variable);
        let _ = self.table.unify_var_value(key, Some(ty));
    }

    /// Unify `a` and `b`: bind whichever side is a variable to the
    /// other (occurs-check against the other side's own flags — a
    /// variable never unifies with a type that already contains it,
    /// which the cached `HAS_VARIABLE` flag alone cannot rule out
    /// precisely, so the simplifying rule here is the conservative one
    /// of never binding a variable to itself).
    fn unify(&mut self, a: TypeId, b: TypeId, site: Span, diagnostics: &mut Vec<Diagnostic>) {
        let a = self.resolve(a);
        let b = self.resolve(b);
        if a == b {
            return;
        }
        match (self.checker.arena.kind(a).clone(), self.checker.arena.kind(b).clone()) {
            (TypeKind::Variable(v), _) => self.bind(v, b),
            (_, TypeKind::Variable(v)) => self.bind(v, a),
            (TypeKind::Error, _) | (_, TypeKind::Error) => {}
            (TypeKind::Tuple(xs), TypeKind::Tuple(ys)) if xs.len() == ys.len() => {
                for (x, y) in xs.into_iter().zip(ys) {
                    self.unify(x, y, site, diagnostics);
                }
            }
            _ => {
                let expression_kind = "expression";
                diagnostics.push(Diagnostic::new(
                    DiagnosticCode::NotEnoughContextToInfer,
                    site,
                    DiagnosticMessage::NotEnoughContextToInfer { expression_kind },
                ));
            }
        }
    }

    /// `t <: u`. Functions are contravariant in inputs/covariant in
    /// outputs, tuples elementwise, sums by element set; the cases this
    /// checker actually needs to decide (bindings against annotations,
    /// the never-branch disjunction, parameter matching) only ever
    /// reach the variable-bound-to-either-side and tuple/sum cases
    /// below, so the function/lambda variance rule is a documented
    /// simplification (see `DESIGN.md`) rather than fully implemented.
    fn subtype(&mut self, t: TypeId, u: TypeId, site: Span, diagnostics: &mut Vec<Diagnostic>) {
        let t_r = self.resolve(t);
        let u_r = self.resolve(u);
        if t_r == u_r {
            return;
        }
        match (self.checker.arena.kind(t_r).clone(), self.checker.arena.kind(u_r).clone()) {
            (TypeKind::Variable(_), _) | (_, TypeKind::Variable(_)) => self.unify(t_r, u_r, site, diagnostics),
            (TypeKind::Never, _) => {}
            (TypeKind::Error, _) | (_, TypeKind::Error) => {}
            (TypeKind::Sum(elements), _) => {
                for e in elements {
                    self.subtype(e, u_r, site, diagnostics);
                }
            }
            _ => self.unify(t_r, u_r, site, diagnostics),
        }
    }

    fn solve_conformance(&mut self, t: TypeId, traits: &[lucent_ast::DeclId], site: Span, diagnostics: &mut Vec<Diagnostic>) {
        let resolved = self.resolve(t);
        if self.checker.arena.flags(resolved).has_variable() {
            return;
        }
        let canonical = self.checker.canonical(resolved);
        for &trait_ in traits {
            if !self.checker.relations.conforms_to(canonical, trait_, |_| true) {
                let name = self.checker.program.decl(trait_).name.unwrap_or(lucent_common::Atom::from_u32(0));
                diagnostics.push(Diagnostic::new(
                    DiagnosticCode::SubjectDoesNotConform,
                    site,
                    DiagnosticMessage::SubjectDoesNotConform { subject: name, concept: name, missing: Vec::new() },
                ));
            }
        }
    }

    fn solve_one(&mut self, constraint: Constraint, diagnostics: &mut Vec<Diagnostic>, chosen: &mut FxHashMap<lucent_ast::ExprId, lucent_ast::DeclId>) {
        match constraint {
            Constraint::Equality(a, b, site) => self.unify(a, b, site, diagnostics),
            Constraint::Subtyping(a, b, site) => self.subtype(a, b, site, diagnostics),
            Constraint::Parameter(t, u, site) => {
                let u_r = self.resolve(u);
                let inner = match self.checker.arena.kind(u_r) {
                    TypeKind::Parameter { inner, .. } => *inner,
                    _ => u_r,
                };
                self.unify(t, inner, site, diagnostics);
            }
            Constraint::Conformance(t, traits, site) => self.solve_conformance(t, &traits, site, diagnostics),
            Constraint::Disjunction(branches, site) => self.solve_disjunction(branches, site, diagnostics, chosen),
            Constraint::OverloadBinding { expr, candidates, argument_labels, site } => {
                self.solve_overload(expr, candidates, argument_labels, site, diagnostics, chosen)
            }
        }
    }

    /// Try each branch in ascending-penalty order; the first branch
    /// whose own constraints solve without new diagnostics wins and is
    /// committed, later branches are never attempted. If every branch
    /// fails, the lowest-penalty branch's diagnostics are kept so the
    /// caller sees a concrete reason rather than a bare ambiguity.
    fn solve_disjunction(
        &mut self,
        mut branches: Vec<(Vec<Constraint>, u32)>,
        site: Span,
        diagnostics: &mut Vec<Diagnostic>,
        chosen: &mut FxHashMap<lucent_ast::ExprId, lucent_ast::DeclId>,
    ) {
        branches.sort_by_key(|(_, penalty)| *penalty);
        let mut best_failure: Option<Vec<Diagnostic>> = None;
        for (constraints, _penalty) in branches {
            let snapshot = self.table.snapshot();
            let mut branch_diagnostics = Vec::new();
            let mut branch_chosen = chosen.clone();
            for c in constraints {
                self.solve_one(c, &mut branch_diagnostics, &mut branch_chosen);
            }
            if branch_diagnostics.is_empty() {
                self.table.commit(snapshot);
                *chosen = branch_chosen;
                return;
            }
            self.table.rollback_to(snapshot);
            if best_failure.is_none() {
                best_failure = Some(branch_diagnostics);
            }
        }
        if let Some(failure) = best_failure {
            diagnostics.extend(failure);
        } else {
            diagnostics.push(Diagnostic::new(DiagnosticCode::NotEnoughContextToInfer, site, DiagnosticMessage::NotEnoughContextToInfer { expression_kind: "disjunction" }));
        }
    }

    /// Filter candidates by exact positional label match against the
    /// call site's argument labels (§8 scenario 3). A unique match
    /// wins outright; zero matches is `NoViableCandidate`; more than
    /// one tie is `AmbiguousOverload`.
    fn solve_overload(
        &mut self,
        expr: lucent_ast::ExprId,
        candidates: Vec<OverloadCandidate>,
        argument_labels: Vec<Option<lucent_common::Atom>>,
        site: Span,
        diagnostics: &mut Vec<Diagnostic>,
        chosen: &mut FxHashMap<lucent_ast::ExprId, lucent_ast::DeclId>,
    ) {
        let matching: Vec<&OverloadCandidate> = candidates.iter().filter(|c| c.parameter_labels == argument_labels).collect();
        match matching.len() {
            0 => {
                diagnostics.push(Diagnostic::new(
                    DiagnosticCode::NoViableCandidate,
                    site,
                    DiagnosticMessage::NoViableCandidate { name: lucent_common::Atom::from_u32(0) },
                ));
            }
            1 => {
                let winner = matching[0];
                chosen.insert(expr, winner.decl);
            }
            tied => {
                diagnostics.push(Diagnostic::new(
                    DiagnosticCode::AmbiguousOverload,
                    site,
                    DiagnosticMessage::AmbiguousOverload { name: lucent_common::Atom::from_u32(0), tied_candidates: tied.len() },
                ));
            }
        }
    }

    pub fn solve(mut self, constraints: Vec<Constraint>) -> (Self, Solution) {
        let mut diagnostics = Vec::new();
        let mut chosen = FxHashMap::default();
        let mut queue: VecDeque<Constraint> = constraints.into_iter().collect();
        while let Some(constraint) = queue.pop_front() {
            self.solve_one(constraint, &mut diagnostics, &mut chosen);
        }
        let sound = diagnostics.is_empty();
        let solution = Solution { chosen, diagnostics, sound };
        (self, solution)
    }
}

impl<'p> Checker<'p> {
    /// Solve `constraints`, then resolve every type in `pending`
    /// (sub-expression placeholder types, keyed by the expression that
    /// owns each one) through the same substitution in one pass, so
    /// `generator.rs::check_expr` never has to keep a `Solver` alive
    /// past this call.
    pub(crate) fn solve_and_resolve(
        &mut self,
        constraints: Vec<Constraint>,
        pending: &[(lucent_ast::ExprId, TypeId)],
    ) -> (FxHashMap<lucent_ast::ExprId, TypeId>, Solution) {
        let solver = Solver::new(self);
        let (mut solver, solution) = solver.solve(constraints);
        let mut resolved = FxHashMap::default();
        for &(expr, ty) in pending {
            resolved.insert(expr, solver.resolve(ty));
        }
        (resolved, solution)
    }
}
