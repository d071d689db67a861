//! Constraint generation and the `check` entry point (§4.4).
//!
//! `check` is the companion to `realize`: where `realize` answers "what
//! type does this declaration denote", `check` answers "does this
//! declaration's body actually conform to that type", walking bodies
//! bottom-up into constraints and handing the whole set to the solver
//! once per body rather than per sub-expression.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use lucent_ast::decl::FunctionBody;
use lucent_ast::{DeclKind, ExprId, ExprKind, FunctionLikeDecl, LiteralKind, ScopeId};
use lucent_ast::{AccessEffect, DeclId};
use lucent_common::{Diagnostic, DiagnosticCode, DiagnosticMessage};
use lucent_ty::{GenericArgument, LabeledInput, TypeId, TypeKind};

use crate::checker::Checker;
use crate::property_maps::{DeclReference, DeclRequestState, FoldedExpr};
use crate::solver::{Constraint, OverloadCandidate};

/// An ambiguous/overloaded call whose final type can only be known once
/// the solver has chosen a winner: the call expression, the callee
/// expression the `OverloadBinding` constraint was keyed on, and each
/// candidate's output type by declaration, so the call's type can be
/// read off the winner after solving completes.
type PendingOverloadCall = (ExprId, ExprId, Vec<(DeclId, TypeId)>);

impl<'p> Checker<'p> {
    /// Fully check `decl`: realize its signature (unless it is itself a
    /// binding, whose realization *is* checking), then check its body
    /// or its members, memoized the same way `realize` is.
    pub fn check(&mut self, decl: DeclId) -> TypeId {
        match self.props.request_state(decl) {
            DeclRequestState::Done => return self.props.decl_type(decl).unwrap_or_else(|| self.arena.error()),
            DeclRequestState::Checking => {
                let name = self.program.decl(decl).name.unwrap_or(lucent_common::Atom::from_u32(0));
                let span = self.program.decl(decl).span;
                self.emit(Diagnostic::new(DiagnosticCode::CircularDependency, span, DiagnosticMessage::CircularDependency { declaration: name }));
                let err = self.arena.error();
                self.props.set_decl_type(decl, err);
                self.props.set_request_state(decl, DeclRequestState::Done);
                return err;
            }
            _ => {}
        }

        if matches!(self.program.decl(decl).kind, DeclKind::Binding { .. }) {
            return self.check_binding(decl);
        }

        let ty = self.realize(decl);
        self.props.set_request_state(decl, DeclRequestState::Checking);
        self.check_body(decl);
        self.props.set_request_state(decl, DeclRequestState::Done);
        ty
    }

    fn check_body(&mut self, decl: DeclId) {
        let use_scope = self.program.decl(decl).enclosing_scope;
        match self.program.decl(decl).kind.clone() {
            DeclKind::Function(f) | DeclKind::Initializer(f) => self.check_function_like_body(decl, &f, use_scope),
            DeclKind::Method(m) => {
                for (effect, body) in &m.variants {
                    self.check_variant_body(decl, *effect, body, use_scope);
                }
            }
            DeclKind::Subscript(s) => {
                for (effect, body) in &s.variants {
                    self.check_variant_body(decl, *effect, body, use_scope);
                }
            }
            DeclKind::Product { members, .. } | DeclKind::Trait { requirements: members, .. } => {
                for member in members {
                    self.check(member);
                }
            }
            DeclKind::Extension { members, .. } => {
                for member in members {
                    self.check(member);
                }
            }
            DeclKind::Module { decls } | DeclKind::Namespace { decls } => {
                for member in decls {
                    self.check(member);
                }
            }
            DeclKind::MemberwiseInitializer { .. }
            | DeclKind::TypeAlias { .. }
            | DeclKind::GenericParameter(_)
            | DeclKind::AssociatedType { .. }
            | DeclKind::AssociatedValue { .. }
            | DeclKind::Binding { .. } => {}
        }
    }

    /// The declared output type for one access-effect variant of a
    /// method/subscript bundle, read back from the already-realized
    /// bundle type.
    fn declared_variant_output(&mut self, decl: DeclId, effect: AccessEffect) -> TypeId {
        let ty = self.props.decl_type(decl).unwrap_or_else(|| self.arena.error());
        match self.arena.kind(ty).clone() {
            TypeKind::MethodBundle { variants, .. } | TypeKind::Subscript { variants, .. } => {
                variants.into_iter().find(|(e, _)| *e == effect).map(|(_, v)| v.output).unwrap_or_else(|| self.arena.error())
            }
            _ => self.arena.error(),
        }
    }

    fn check_variant_body(&mut self, decl: DeclId, effect: AccessEffect, body: &FunctionLikeDecl, use_scope: ScopeId) {
        let declared_output = self.declared_variant_output(decl, effect);
        self.check_body_against(body, use_scope, declared_output);
    }

    fn check_function_like_body(&mut self, decl: DeclId, f: &FunctionLikeDecl, use_scope: ScopeId) {
        let ty = self.props.decl_type(decl).unwrap_or_else(|| self.arena.error());
        let declared_output = match self.arena.kind(ty) {
            TypeKind::Lambda { output, .. } => *output,
            _ => self.arena.error(),
        };
        self.check_body_against(f, use_scope, declared_output);
    }

    /// Check one function-shaped body's statements against a declared
    /// output type, gathering constraints for the whole body and
    /// solving them in a single pass (§4.4/§4.5).
    fn check_body_against(&mut self, f: &FunctionLikeDecl, use_scope: ScopeId, declared_output: TypeId) {
        let Some(body) = &f.body else { return };
        let body_scope = use_scope;
        let mut constraints = Vec::new();
        let mut pending = Vec::new();
        let mut overload_calls: Vec<PendingOverloadCall> = Vec::new();

        match body.clone() {
            FunctionBody::SingleExpression(e) => {
                let ty = self.infer_expr(e, body_scope, &mut constraints, &mut pending, &mut overload_calls);
                let site = self.program.expr(e).span;
                let never = self.arena.never();
                constraints.push(Constraint::Disjunction(
                    vec![
                        (vec![Constraint::Subtyping(ty, declared_output, site)], 0),
                        (vec![Constraint::Equality(ty, never, site)], 1),
                    ],
                    site,
                ));
                pending.push((e, ty));
            }
            FunctionBody::Block(statements) => {
                let last_index = statements.len().checked_sub(1);
                for (index, stmt) in statements.iter().enumerate() {
                    let ty = self.infer_expr(*stmt, body_scope, &mut constraints, &mut pending, &mut overload_calls);
                    pending.push((*stmt, ty));
                    let site = self.program.expr(*stmt).span;
                    if Some(index) == last_index {
                        constraints.push(Constraint::Subtyping(ty, declared_output, site));
                    } else if !matches!(self.arena.kind(ty), TypeKind::Void | TypeKind::Error) {
                        self.emit(Diagnostic::new(DiagnosticCode::UnusedResult, site, DiagnosticMessage::UnusedResult));
                    }
                }
            }
        }

        let (resolved, solution) = self.solve_and_resolve(constraints, &pending);
        for diagnostic in solution.diagnostics.clone() {
            self.emit(diagnostic);
        }
        for (expr, ty) in resolved {
            self.props.set_expr_type(expr, ty);
        }
        self.finalize_overload_calls(&overload_calls, &solution.chosen);
    }

    fn finalize_overload_calls(&mut self, calls: &[PendingOverloadCall], chosen: &FxHashMap<ExprId, DeclId>) {
        for (call_expr, callee_expr, candidates) in calls {
            match chosen.get(callee_expr) {
                Some(winner) => {
                    let output = candidates.iter().find(|(d, _)| d == winner).map(|(_, t)| *t).unwrap_or_else(|| self.arena.error());
                    self.props.set_expr_type(*call_expr, output);
                    self.props.set_referred_decl(*call_expr, DeclReference::Direct { decl: *winner, arguments: IndexMap::new() });
                }
                None => {
                    let err = self.arena.error();
                    self.props.set_expr_type(*call_expr, err);
                }
            }
        }
    }

    /// Check an unannotated or annotated binding: realize the
    /// annotation if present, infer the initializer if present, and
    /// reconcile the two into the binding's final type (§3 "Binding
    /// shape" variable context).
    fn check_binding(&mut self, decl: DeclId) -> TypeId {
        self.props.set_request_state(decl, DeclRequestState::Checking);
        let DeclKind::Binding { annotation, initializer, .. } = self.program.decl(decl).kind.clone() else {
            unreachable!("check_binding called on a non-binding declaration")
        };
        let use_scope = self.program.decl(decl).enclosing_scope;

        let declared = annotation.map(|a| self.realize_as_type(a, use_scope));

        let ty = match (declared, initializer) {
            (Some(declared), Some(initializer)) => {
                let mut constraints = Vec::new();
                let mut pending = Vec::new();
                let mut overload_calls = Vec::new();
                let inferred = self.infer_expr(initializer, use_scope, &mut constraints, &mut pending, &mut overload_calls);
                let site = self.program.expr(initializer).span;
                constraints.push(Constraint::Subtyping(inferred, declared, site));
                pending.push((initializer, inferred));
                let (resolved, solution) = self.solve_and_resolve(constraints, &pending);
                for diagnostic in solution.diagnostics.clone() {
                    self.emit(diagnostic);
                }
                for (expr, ty) in resolved {
                    self.props.set_expr_type(expr, ty);
                }
                self.finalize_overload_calls(&overload_calls, &solution.chosen);
                declared
            }
            (Some(declared), None) => declared,
            (None, Some(initializer)) => {
                let mut constraints = Vec::new();
                let mut pending = Vec::new();
                let mut overload_calls = Vec::new();
                let inferred = self.infer_expr(initializer, use_scope, &mut constraints, &mut pending, &mut overload_calls);
                pending.push((initializer, inferred));
                let (resolved, solution) = self.solve_and_resolve(constraints, &pending);
                for diagnostic in solution.diagnostics.clone() {
                    self.emit(diagnostic);
                }
                let final_ty = resolved.get(&initializer).copied().unwrap_or(inferred);
                for (expr, ty) in resolved {
                    self.props.set_expr_type(expr, ty);
                }
                self.finalize_overload_calls(&overload_calls, &solution.chosen);
                final_ty
            }
            (None, None) => {
                let variable = self.variables.fresh(lucent_ty::VariableContext::BindingShape);
                self.arena.variable(variable)
            }
        };

        self.props.set_decl_type(decl, ty);
        self.props.set_request_state(decl, DeclRequestState::Done);
        ty
    }

    /// Resolve "Int"/"Bool"/"Void" for a literal by looking up the
    /// fitting core-library type: `Bool`/`Void` have dedicated
    /// `CoreLibrary` fields; `Int` has none (the AST stand-in's core
    /// library was never extended with one — see `DESIGN.md`), so an
    /// integer literal resolves by plain unqualified lookup for the
    /// name `Int` instead, falling back to `error` when the fixture
    /// under test never declared one.
    fn literal_type(&mut self, kind: LiteralKind, use_scope: ScopeId) -> TypeId {
        match kind {
            LiteralKind::Void => self.arena.void(),
            LiteralKind::Bool => match self.program.core_library.bool_type {
                Some(decl) => self.realize_as_type_decl(decl),
                None => self.arena.error(),
            },
            LiteralKind::Integer(_) => {
                let name = self.interner.intern("Int");
                match self.unqualified_lookup(name, use_scope).first() {
                    Some(&decl) => self.realize_as_type_decl(decl),
                    None => self.arena.error(),
                }
            }
        }
    }

    fn realize_as_type_decl(&mut self, decl: DeclId) -> TypeId {
        let ty = self.realize(decl);
        match self.arena.kind(ty) {
            TypeKind::Metatype(inner) => *inner,
            _ => ty,
        }
    }

    /// The parameter labels and output of a resolved candidate's
    /// callable shape: a plain function/initializer realizes directly
    /// to `Lambda`; a method/subscript bundle is called through one
    /// access-effect variant, chosen by the fixed preference order
    /// below since this AST has no call-site syntax for naming the
    /// effect explicitly (documented simplification, see `DESIGN.md`).
    fn callable_shape(&self, ty: TypeId) -> Option<(Vec<LabeledInput>, TypeId)> {
        match self.arena.kind(ty).clone() {
            TypeKind::Lambda { inputs, output, .. } => Some((inputs, output)),
            TypeKind::MethodBundle { variants, .. } | TypeKind::Subscript { variants, .. } => {
                const PREFERENCE: [AccessEffect; 5] =
                    [AccessEffect::Let, AccessEffect::Sink, AccessEffect::Inout, AccessEffect::Set, AccessEffect::Yielded];
                for effect in PREFERENCE {
                    if let Some((_, variant)) = variants.iter().find(|(e, _)| *e == effect) {
                        return Some((variant.inputs.clone(), variant.output));
                    }
                }
                None
            }
            _ => None,
        }
    }

    fn overload_candidate(&self, decl: DeclId, candidate_ty: TypeId) -> Option<OverloadCandidate> {
        let (inputs, output) = self.callable_shape(candidate_ty)?;
        let parameter_labels = inputs.iter().map(|i| i.label).collect();
        Some(OverloadCandidate { decl, parameter_labels, ty: candidate_ty, output })
    }

    /// Infer an expression's type, emitting constraints and pending
    /// resolutions into the caller's accumulators rather than solving
    /// eagerly (§4.4).
    fn infer_expr(
        &mut self,
        expr: ExprId,
        use_scope: ScopeId,
        constraints: &mut Vec<Constraint>,
        pending: &mut Vec<(ExprId, TypeId)>,
        overload_calls: &mut Vec<PendingOverloadCall>,
    ) -> TypeId {
        let kind = self.program.expr(expr).kind.clone();
        let ty = match kind {
            ExprKind::Literal(literal) => self.literal_type(literal, use_scope),
            ExprKind::Name(_) | ExprKind::Member { .. } => self.infer_name_expr(expr, use_scope),
            ExprKind::Call { callee, arguments } => self.infer_call(expr, callee, arguments, use_scope, constraints, pending, overload_calls),
            ExprKind::Subscript { base, arguments } => self.infer_subscript(expr, base, arguments, use_scope, constraints, pending, overload_calls),
            ExprKind::Sequence { .. } => self.infer_sequence(expr, use_scope, constraints, pending, overload_calls),
            ExprKind::Address { operand } => self.infer_expr(operand, use_scope, constraints, pending, overload_calls),
            ExprKind::Tuple(elements) => {
                let element_types: Vec<TypeId> =
                    elements.iter().map(|&e| self.infer_expr(e, use_scope, constraints, pending, overload_calls)).collect();
                self.arena.tuple(element_types)
            }
            ExprKind::Lambda(decl) => self.check(decl),
        };
        self.props.set_expr_type(expr, ty);
        ty
    }

    fn infer_name_expr(&mut self, expr: ExprId, use_scope: ScopeId) -> TypeId {
        match self.resolve_name_expression(expr, use_scope) {
            crate::resolver::ResolutionResult::Done { resolved, .. } => {
                let Some(candidate) = resolved.viable().next() else {
                    self.emit_undefined_name(expr);
                    return self.arena.error();
                };
                let reference = if candidate.decl.index() == u32::MAX as usize {
                    DeclReference::CompilerKnown(self.program_head_name(expr))
                } else if resolved.viable_count() > 1 {
                    DeclReference::Member { decl: candidate.decl, arguments: candidate.arguments.clone() }
                } else {
                    DeclReference::Direct { decl: candidate.decl, arguments: candidate.arguments.clone() }
                };
                self.props.set_referred_decl(expr, reference);
                candidate.ty
            }
            crate::resolver::ResolutionResult::Inexecutable { .. } => {
                // A non-nominal prefix (e.g. a call or tuple result) —
                // the member suffix is resolved through `infer_call`'s
                // or `infer_subscript`'s own member-lookup path instead
                // of here; reached only when a bare member chain roots
                // in one of those without going through them, which
                // this AST stand-in never produces.
                self.arena.error()
            }
            crate::resolver::ResolutionResult::Failed => {
                self.emit_undefined_name(expr);
                self.arena.error()
            }
        }
    }

    fn program_head_name(&self, expr: ExprId) -> lucent_common::Atom {
        match &self.program.expr(expr).kind {
            ExprKind::Name(component) => component.name,
            ExprKind::Member { component, .. } => component.name,
            _ => lucent_common::Atom::from_u32(0),
        }
    }

    fn emit_undefined_name(&mut self, expr: ExprId) {
        let name = self.program_head_name(expr);
        self.emit(Diagnostic::new(DiagnosticCode::UndefinedName, self.program.expr(expr).span, DiagnosticMessage::UndefinedName { name }));
    }

    fn infer_call(
        &mut self,
        expr: ExprId,
        callee: ExprId,
        arguments: Vec<lucent_ast::Argument>,
        use_scope: ScopeId,
        constraints: &mut Vec<Constraint>,
        pending: &mut Vec<(ExprId, TypeId)>,
        overload_calls: &mut Vec<PendingOverloadCall>,
    ) -> TypeId {
        for argument in &arguments {
            self.infer_expr(argument.value, use_scope, constraints, pending, overload_calls);
        }
        let resolution = self.resolve_name_expression(callee, use_scope);
        let candidate_set = match resolution {
            crate::resolver::ResolutionResult::Done { resolved, .. } => resolved,
            _ => {
                self.emit_undefined_name(callee);
                return self.arena.error();
            }
        };

        let candidates: Vec<OverloadCandidate> =
            candidate_set.viable().filter_map(|c| self.overload_candidate(c.decl, c.ty)).collect();

        if candidates.is_empty() {
            self.emit_undefined_name(callee);
            return self.arena.error();
        }

        if candidates.len() == 1 {
            let winner = &candidates[0];
            self.props.set_referred_decl(callee, DeclReference::Direct { decl: winner.decl, arguments: IndexMap::new() });
            self.props.set_expr_type(callee, winner.ty);
            return winner.output;
        }

        let argument_labels: Vec<Option<lucent_common::Atom>> = arguments.iter().map(|a| a.label).collect();
        let site = self.program.expr(expr).span;
        let outputs: Vec<(DeclId, TypeId)> = candidates.iter().map(|c| (c.decl, c.output)).collect();
        constraints.push(Constraint::OverloadBinding { expr: callee, candidates, argument_labels, site });
        overload_calls.push((expr, callee, outputs));
        self.arena.error()
    }

    fn infer_subscript(
        &mut self,
        expr: ExprId,
        base: ExprId,
        arguments: Vec<lucent_ast::Argument>,
        use_scope: ScopeId,
        constraints: &mut Vec<Constraint>,
        pending: &mut Vec<(ExprId, TypeId)>,
        overload_calls: &mut Vec<PendingOverloadCall>,
    ) -> TypeId {
        let base_ty = self.infer_expr(base, use_scope, constraints, pending, overload_calls);
        for argument in &arguments {
            self.infer_expr(argument.value, use_scope, constraints, pending, overload_calls);
        }
        let canonical_base = self.canonical(base_ty);
        let TypeKind::Nominal { decl, .. } = self.arena.kind(canonical_base).clone() else {
            return self.arena.error();
        };
        let subscript_decl = self
            .direct_members_of(decl)
            .into_iter()
            .find(|&m| matches!(self.program.decl(m).kind, DeclKind::Subscript(_)));
        let Some(subscript_decl) = subscript_decl else {
            return self.arena.error();
        };
        let ty = self.realize(subscript_decl);
        match self.callable_shape(ty) {
            Some((_, output)) => output,
            None => self.arena.error(),
        }
    }

    fn infer_sequence(
        &mut self,
        expr: ExprId,
        use_scope: ScopeId,
        constraints: &mut Vec<Constraint>,
        pending: &mut Vec<(ExprId, TypeId)>,
        overload_calls: &mut Vec<PendingOverloadCall>,
    ) -> TypeId {
        let folded = self.fold_sequence(expr, use_scope);
        self.infer_folded(&folded, use_scope, constraints, pending, overload_calls)
    }

    fn infer_folded(
        &mut self,
        folded: &FoldedExpr,
        use_scope: ScopeId,
        constraints: &mut Vec<Constraint>,
        pending: &mut Vec<(ExprId, TypeId)>,
        overload_calls: &mut Vec<PendingOverloadCall>,
    ) -> TypeId {
        match folded {
            FoldedExpr::Leaf(e) => self.infer_expr(*e, use_scope, constraints, pending, overload_calls),
            FoldedExpr::Apply { operator, left, right } => {
                let left_ty = self.infer_folded(left, use_scope, constraints, pending, overload_calls);
                let right_ty = self.infer_folded(right, use_scope, constraints, pending, overload_calls);
                if operator.index() == u32::MAX as usize {
                    return self.arena.error();
                }
                let op_ty = self.realize(*operator);
                match self.callable_shape(op_ty) {
                    Some((inputs, output)) => {
                        if let Some(first) = inputs.first() {
                            constraints.push(Constraint::Subtyping(left_ty, first.ty, lucent_common::Span::dummy()));
                        }
                        if let Some(second) = inputs.get(1) {
                            constraints.push(Constraint::Subtyping(right_ty, second.ty, lucent_common::Span::dummy()));
                        }
                        output
                    }
                    None => self.arena.error(),
                }
            }
        }
    }
}
