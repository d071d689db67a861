//! Type realization (§4.1): "what type does this declaration denote?",
//! lazily and exactly once, plus the type-universe operations realization
//! depends on — canonicalization, generic specialization, and
//! instantiation — since all three recurse through the same transform
//! shape and have no other natural home.

use indexmap::IndexMap;
use lucent_ast::{
    AccessEffect, CaptureIntroducer, DeclId, DeclKind, ExprId, FunctionBody, FunctionLikeDecl, ParameterConvention,
    ScopeId,
};
use lucent_common::{Diagnostic, DiagnosticCode, DiagnosticMessage, Span};
use lucent_ty::{relations, CallableVariant, GenericArgument, LabeledInput, NominalKind, TypeId, TypeKind, VariableContext};

use crate::checker::Checker;
use crate::property_maps::DeclRequestState;
use crate::resolver::ResolutionResult;

impl<'p> Checker<'p> {
    /// Canonicalize `ty` through this checker's alias-target map. See
    /// `lucent_ty::relations::canonicalize`; kept as an `impl Checker`
    /// method (rather than requiring every caller to destructure the
    /// checker fields itself) because nearly every component calls it.
    pub fn canonical(&mut self, ty: TypeId) -> TypeId {
        relations::canonicalize(&mut self.arena, &self.alias_targets, ty)
    }

    /// Substitute every `GenericParameter`/`Skolem` type in `ty` that
    /// has an entry in `arguments` with its bound argument; structural
    /// types recurse, everything else (including unmapped parameters,
    /// left rigid for a partially-applied generic) passes through
    /// unchanged. Composable: `specialize(specialize(t, a), b)` and
    /// `specialize(t, a ∘ b)` agree whenever `a` and `b` share no key,
    /// because substitution only ever looks up its own map.
    pub fn specialize(&mut self, ty: TypeId, arguments: &IndexMap<DeclId, GenericArgument>) -> TypeId {
        if arguments.is_empty() {
            return ty;
        }
        match self.arena.kind(ty).clone() {
            TypeKind::GenericParameter(decl) | TypeKind::Skolem(decl) => match arguments.get(&decl) {
                Some(GenericArgument::Type(t)) => *t,
                _ => ty,
            },
            TypeKind::Metatype(inner) => {
                let inner = self.specialize(inner, arguments);
                self.arena.metatype(inner)
            }
            TypeKind::Tuple(elements) => {
                let elements: Vec<_> = elements.into_iter().map(|e| self.specialize(e, arguments)).collect();
                self.arena.tuple(elements)
            }
            TypeKind::Sum(elements) => {
                let elements: Vec<_> = elements.into_iter().map(|e| self.specialize(e, arguments)).collect();
                self.arena.sum(elements)
            }
            TypeKind::Parameter { inner, convention } => {
                let inner = self.specialize(inner, arguments);
                self.arena.parameter(inner, convention)
            }
            TypeKind::Remote { inner, effect } => {
                let inner = self.specialize(inner, arguments);
                self.arena.remote(inner, effect)
            }
            TypeKind::BoundGeneric { base, arguments: own } => {
                let base = self.specialize(base, arguments);
                let mut specialized = IndexMap::with_capacity(own.len());
                for (param, arg) in own {
                    let arg = match arg {
                        GenericArgument::Type(t) => GenericArgument::Type(self.specialize(t, arguments)),
                        GenericArgument::Value(v) => GenericArgument::Value(v),
                    };
                    specialized.insert(param, arg);
                }
                self.arena.bound_generic(base, specialized)
            }
            TypeKind::Lambda { receiver_effect, environment, inputs, output } => {
                let environment: Vec<_> = environment.into_iter().map(|e| self.specialize(e, arguments)).collect();
                let inputs: Vec<_> =
                    inputs.into_iter().map(|i| LabeledInput { label: i.label, ty: self.specialize(i.ty, arguments) }).collect();
                let output = self.specialize(output, arguments);
                self.arena.lambda(receiver_effect, environment, inputs, output)
            }
            TypeKind::MethodBundle { receiver, variants } => {
                let receiver = self.specialize(receiver, arguments);
                let variants = self.specialize_variants(variants, arguments);
                self.arena.method_bundle(receiver, variants)
            }
            TypeKind::Subscript { is_property, environment, variants } => {
                let environment: Vec<_> = environment.into_iter().map(|e| self.specialize(e, arguments)).collect();
                let variants = self.specialize_variants(variants, arguments);
                self.arena.subscript(is_property, environment, variants)
            }
            TypeKind::ConformanceLens { subject, trait_ } => {
                let subject = self.specialize(subject, arguments);
                self.arena.conformance_lens(subject, trait_)
            }
            _ => ty,
        }
    }

    fn specialize_variants(
        &mut self,
        variants: Vec<(AccessEffect, CallableVariant)>,
        arguments: &IndexMap<DeclId, GenericArgument>,
    ) -> Vec<(AccessEffect, CallableVariant)> {
        variants
            .into_iter()
            .map(|(effect, variant)| {
                let inputs: Vec<_> = variant
                    .inputs
                    .into_iter()
                    .map(|i| LabeledInput { label: i.label, ty: self.specialize(i.ty, arguments) })
                    .collect();
                let output = self.specialize(variant.output, arguments);
                (effect, CallableVariant { inputs, output })
            })
            .collect()
    }

    /// Replace every `GenericParameter` in `ty` by a skolem when its
    /// introducing scope is `use_scope` (or an ancestor of it), and by a
    /// fresh variable otherwise — "skolemize parameters introduced
    /// inside `useScope`, open others as variables" (§4.3 step 3).
    pub fn instantiate(&mut self, ty: TypeId, use_scope: ScopeId) -> TypeId {
        match self.arena.kind(ty).clone() {
            TypeKind::GenericParameter(decl) => {
                if self.generic_param_is_rigid_at(decl, use_scope) {
                    self.arena.skolem(decl)
                } else {
                    let variable = self.variables.fresh(VariableContext::GenericInstantiation);
                    self.arena.variable(variable)
                }
            }
            TypeKind::Metatype(inner) => {
                let inner = self.instantiate(inner, use_scope);
                self.arena.metatype(inner)
            }
            TypeKind::Tuple(elements) => {
                let elements: Vec<_> = elements.into_iter().map(|e| self.instantiate(e, use_scope)).collect();
                self.arena.tuple(elements)
            }
            TypeKind::Sum(elements) => {
                let elements: Vec<_> = elements.into_iter().map(|e| self.instantiate(e, use_scope)).collect();
                self.arena.sum(elements)
            }
            TypeKind::Parameter { inner, convention } => {
                let inner = self.instantiate(inner, use_scope);
                self.arena.parameter(inner, convention)
            }
            TypeKind::Remote { inner, effect } => {
                let inner = self.instantiate(inner, use_scope);
                self.arena.remote(inner, effect)
            }
            TypeKind::BoundGeneric { base, arguments } => {
                let base = self.instantiate(base, use_scope);
                let mut next = IndexMap::with_capacity(arguments.len());
                for (param, arg) in arguments {
                    let arg = match arg {
                        GenericArgument::Type(t) => GenericArgument::Type(self.instantiate(t, use_scope)),
                        GenericArgument::Value(v) => GenericArgument::Value(v),
                    };
                    next.insert(param, arg);
                }
                self.arena.bound_generic(base, next)
            }
            _ => ty,
        }
    }

    /// Realize `expr` as a type-position expression: resolve the name
    /// chain it denotes and return the resolved (possibly `Metatype`-
    /// wrapped) type of its final component. Used wherever an
    /// annotation, generic argument, or extension subject is realized
    /// rather than checked as a value expression.
    pub fn realize_type_expr(&mut self, expr: ExprId, use_scope: ScopeId) -> TypeId {
        match self.resolve_name_expression(expr, use_scope) {
            ResolutionResult::Done { resolved, .. } => {
                resolved.viable().next().map(|c| c.ty).unwrap_or_else(|| self.arena.error())
            }
            ResolutionResult::Inexecutable { .. } | ResolutionResult::Failed => self.arena.error(),
        }
    }

    /// Like [`Self::realize_type_expr`], but unwraps the `Metatype` a
    /// type-denoting name resolves to, yielding the instance type
    /// itself (`Box<Int>`'s annotation resolves to `Metatype(Int)`;
    /// callers that want `Int` call this instead).
    pub fn realize_as_type(&mut self, expr: ExprId, use_scope: ScopeId) -> TypeId {
        let ty = self.realize_type_expr(expr, use_scope);
        match self.arena.kind(ty) {
            TypeKind::Metatype(inner) => *inner,
            _ => ty,
        }
    }

    /// The memoized entry point (§4.1). Idempotent: a second call
    /// returns the cached type and emits no new diagnostics.
    #[tracing::instrument(level = "trace", skip(self), fields(decl = ?decl))]
    pub fn realize(&mut self, decl: DeclId) -> TypeId {
        if decl.index() == u32::MAX as usize {
            // The sentinel id used for intrinsic/builtin candidates
            // that never went through `realize` in the first place.
            return self.arena.error();
        }
        match self.props.request_state(decl) {
            DeclRequestState::Realizing => {
                let name = self.program.decl(decl).name.unwrap_or(lucent_common::Atom::from_u32(0));
                self.emit(Diagnostic::new(
                    DiagnosticCode::CircularDependency,
                    self.program.decl(decl).span,
                    DiagnosticMessage::CircularDependency { declaration: name },
                ));
                let err = self.arena.error();
                self.props.set_decl_type(decl, err);
                self.props.set_request_state(decl, DeclRequestState::Done);
                return err;
            }
            DeclRequestState::Realized | DeclRequestState::Checking | DeclRequestState::Done => {
                return self.props.decl_type(decl).unwrap_or_else(|| self.arena.error());
            }
            DeclRequestState::Unseen => {}
        }
        if self.realize_depth() >= lucent_common::limits::MAX_REALIZE_DEPTH {
            self.emit(Diagnostic::new(
                DiagnosticCode::RealizationTooDeep,
                self.program.decl(decl).span,
                DiagnosticMessage::RealizationTooDeep { depth: self.realize_depth() },
            ));
            let err = self.arena.error();
            self.props.set_decl_type(decl, err);
            self.props.set_request_state(decl, DeclRequestState::Done);
            return err;
        }

        self.props.set_request_state(decl, DeclRequestState::Realizing);
        self.enter_realize();
        let ty = self.realize_by_kind(decl);
        self.exit_realize();
        self.props.set_decl_type(decl, ty);
        // `realize` never leaves a declaration mid-flight: kinds that
        // need checking (bindings, function bodies) still record a
        // `Realized` marker here so a later `check()` can detect
        // re-entrant checking distinctly from re-entrant realizing.
        if self.props.request_state(decl) == DeclRequestState::Realizing {
            self.props.set_request_state(decl, DeclRequestState::Realized);
        }
        ty
    }

    fn realize_by_kind(&mut self, decl: DeclId) -> TypeId {
        let use_scope = self.program.decl(decl).enclosing_scope;
        match self.program.decl(decl).kind.clone() {
            DeclKind::Product { conformances, .. } => {
                let nominal = self.arena.nominal(NominalKind::Product, decl);
                let ty = self.arena.metatype(nominal);
                let span = self.program.decl(decl).span;
                self.register_conformances(decl, nominal, &conformances, use_scope, span);
                ty
            }
            DeclKind::Trait { refinements, .. } => {
                for refinement in refinements {
                    let refined = self.realize_as_type(refinement, use_scope);
                    if let TypeKind::Nominal { kind: NominalKind::Trait, decl: base } = self.arena.kind(refined) {
                        self.relations.register_refinement(decl, *base);
                    }
                }
                let nominal = self.arena.nominal(NominalKind::Trait, decl);
                self.arena.metatype(nominal)
            }
            DeclKind::Module { .. } => {
                let nominal = self.arena.nominal(NominalKind::Module, decl);
                self.arena.metatype(nominal)
            }
            DeclKind::Namespace { .. } => {
                let nominal = self.arena.nominal(NominalKind::Namespace, decl);
                self.arena.metatype(nominal)
            }
            DeclKind::TypeAlias { aliased } => {
                let target = self.realize_as_type(aliased, use_scope);
                self.alias_targets.insert(decl, target);
                // An alias whose target already collapsed to `error` (most
                // commonly the other end of a circular `type A = B; type B
                // = A` chain) denotes `error` itself rather than a fresh
                // `Metatype(TypeAlias)` wrapper, so every alias in the
                // cycle ends up with the same error type instead of only
                // the one re-entrant declaration that tripped the check.
                if self.arena.flags(target).has_error() {
                    return self.arena.error();
                }
                let nominal = self.arena.nominal(NominalKind::TypeAlias, decl);
                self.arena.metatype(nominal)
            }
            DeclKind::Extension { subject, conformances, .. } => {
                let subject_ty = self.realize_as_type(subject, use_scope);
                let span = self.program.decl(decl).span;
                self.register_conformances(decl, subject_ty, &conformances, use_scope, span);
                self.arena.metatype(subject_ty)
            }
            DeclKind::Binding { .. } => self.check(decl),
            DeclKind::Function(f) | DeclKind::Initializer(f) => self.realize_function_like(decl, &f, use_scope),
            DeclKind::MemberwiseInitializer { product } => self.realize_memberwise_initializer(decl, product, use_scope),
            DeclKind::Method(m) => self.realize_bundle(decl, &m.parameters, &m.variants, use_scope, false),
            DeclKind::Subscript(s) => self.realize_bundle(decl, &s.parameters, &s.variants, use_scope, s.is_property),
            DeclKind::GenericParameter(g) => self.realize_generic_parameter(decl, &g, use_scope),
            DeclKind::AssociatedType { constraint } => {
                if let Some(constraint) = constraint {
                    let _ = self.realize_type_expr(constraint, use_scope);
                }
                let associated = self.arena.associated_type(decl);
                self.arena.metatype(associated)
            }
            DeclKind::AssociatedValue { annotation } => {
                let _ = self.realize_as_type(annotation, use_scope);
                self.arena.associated_value(decl)
            }
        }
    }

    fn realize_generic_parameter(
        &mut self,
        decl: DeclId,
        g: &lucent_ast::GenericParamDecl,
        use_scope: ScopeId,
    ) -> TypeId {
        if g.annotations.is_empty() {
            let skolem = self.arena.skolem(decl);
            return self.arena.metatype(skolem);
        }
        let first_ty = self.realize_type_expr(g.annotations[0], use_scope);
        let is_trait = matches!(
            self.arena.kind(first_ty),
            TypeKind::Metatype(inner) if matches!(self.arena.kind(*inner), TypeKind::Nominal { kind: NominalKind::Trait, .. })
        );
        if is_trait {
            let skolem = self.arena.skolem(decl);
            self.arena.metatype(skolem)
        } else {
            if g.annotations.len() > 1 {
                self.emit(Diagnostic::new(
                    DiagnosticCode::TooManyAnnotationsOnValueParameter,
                    self.program.decl(decl).span,
                    DiagnosticMessage::TooManyAnnotationsOnValueParameter {
                        parameter: self.program.decl(decl).name.unwrap_or(lucent_common::Atom::from_u32(0)),
                    },
                ));
            }
            self.realize_as_type(g.annotations[0], use_scope)
        }
    }

    /// Realize a parameter declaration: explicit annotation realized as
    /// a type wrapped in its convention, or — outside expression
    /// contexts this crate never needs to model directly — a fresh
    /// variable carrying the declared convention.
    fn realize_parameter(&mut self, param: &lucent_ast::ParameterDecl, use_scope: ScopeId) -> LabeledInput {
        let inner = match param.annotation {
            Some(annotation) => self.realize_as_type(annotation, use_scope),
            None => {
                let variable = self.variables.fresh(VariableContext::ExpressionInference);
                self.arena.variable(variable)
            }
        };
        let ty = self.arena.parameter(inner, param.convention);
        LabeledInput { label: param.label, ty }
    }

    fn realize_parameters(&mut self, parameters: &[lucent_ast::ParameterDecl], use_scope: ScopeId) -> Vec<LabeledInput> {
        let mut seen = std::collections::HashSet::new();
        let mut inputs = Vec::with_capacity(parameters.len());
        for param in parameters {
            if let Some(name) = param.name {
                if !seen.insert(name) {
                    self.emit(Diagnostic::new(
                        DiagnosticCode::DuplicateParameterName,
                        param.span,
                        DiagnosticMessage::DuplicateParameterName { name },
                    ));
                }
            }
            inputs.push(self.realize_parameter(param, use_scope));
        }
        inputs
    }

    fn receiver_effect_of(&self, decl: DeclId) -> Option<AccessEffect> {
        match &self.program.decl(decl).kind {
            DeclKind::Function(f) | DeclKind::Initializer(f) => f.receiver_effect,
            _ => None,
        }
    }

    /// Realize explicit captures, rejecting duplicate names; `let`/
    /// `inout` introducers become remote borrows, `sink-let`/`sink-var`
    /// become owned values (§4.1).
    fn realize_explicit_captures(&mut self, decl: DeclId, captures: &[lucent_ast::CaptureDecl]) -> Vec<TypeId> {
        let mut seen = std::collections::HashSet::new();
        let mut environment = Vec::with_capacity(captures.len());
        for capture in captures {
            if !seen.insert(capture.name) {
                self.emit(Diagnostic::new(
                    DiagnosticCode::DuplicateCapture,
                    capture.span,
                    DiagnosticMessage::DuplicateCapture { name: capture.name },
                ));
                continue;
            }
            let use_scope = self.program.decl(decl).enclosing_scope;
            let referenced = self.unqualified_lookup(capture.name, use_scope);
            let referenced_ty = referenced.first().map(|&d| self.realize(d)).unwrap_or_else(|| self.arena.error());
            let captured = match capture.introducer {
                CaptureIntroducer::Let => self.arena.remote(referenced_ty, AccessEffect::Let),
                CaptureIntroducer::Inout => self.arena.remote(referenced_ty, AccessEffect::Inout),
                CaptureIntroducer::SinkLet | CaptureIntroducer::SinkVar => referenced_ty,
            };
            environment.push(captured);
        }
        environment
    }

    fn implicit_capture_environment(&mut self, decl: DeclId, use_scope: ScopeId) -> Vec<TypeId> {
        let captures = self.analyze_captures(decl, use_scope);
        self.props.set_implicit_captures(decl, captures.clone());
        captures
            .into_iter()
            .map(|(_, effect, referenced)| {
                let referenced_ty = self.realize(referenced);
                self.arena.remote(referenced_ty, effect)
            })
            .collect()
    }

    fn realize_function_like(&mut self, decl: DeclId, f: &FunctionLikeDecl, use_scope: ScopeId) -> TypeId {
        self.generic_environment(decl);
        let inputs = self.realize_parameters(&f.parameters, use_scope);
        let mut environment = self.realize_explicit_captures(decl, &f.explicit_captures);
        environment.extend(self.implicit_capture_environment(decl, use_scope));
        let receiver_effect = self.receiver_effect_of(decl);
        let output = match f.return_annotation {
            Some(annotation) => self.realize_as_type(annotation, use_scope),
            None if matches!(f.body, Some(FunctionBody::SingleExpression(_))) => {
                let variable = self.variables.fresh(VariableContext::ExpressionInference);
                self.arena.variable(variable)
            }
            None => self.arena.void(),
        };
        self.arena.lambda(receiver_effect, environment, inputs, output)
    }

    fn realize_memberwise_initializer(&mut self, decl: DeclId, product: DeclId, use_scope: ScopeId) -> TypeId {
        let receiver = self.realize(product);
        let DeclKind::Product { members, .. } = self.program.decl(product).kind.clone() else {
            return self.arena.error();
        };
        let mut inputs = Vec::new();
        for member in members {
            if let DeclKind::Binding { annotation, .. } = &self.program.decl(member).kind {
                let ty = match annotation {
                    Some(a) => self.realize_as_type(*a, use_scope),
                    None => self.realize(member),
                };
                inputs.push(LabeledInput {
                    label: self.program.decl(member).name,
                    ty: self.arena.parameter(ty, ParameterConvention::Sink),
                });
            }
        }
        let receiver_instance = match self.arena.kind(receiver) {
            TypeKind::Metatype(inner) => *inner,
            _ => receiver,
        };
        self.arena.lambda(Some(AccessEffect::Let), Vec::new(), inputs, receiver_instance)
    }

    /// Realize a method or subscript bundle: one variant per declared
    /// access effect, each derived from its own `FunctionLikeDecl`, with
    /// the inout/set 2-tuple well-formedness check (§4.1).
    fn realize_bundle(
        &mut self,
        decl: DeclId,
        parameters: &[lucent_ast::ParameterDecl],
        variants: &[(AccessEffect, FunctionLikeDecl)],
        use_scope: ScopeId,
        is_property: bool,
    ) -> TypeId {
        self.generic_environment(decl);
        let shared_inputs = self.realize_parameters(parameters, use_scope);
        let receiver_variable = {
            let variable = self.variables.fresh(VariableContext::ExpressionInference);
            self.arena.variable(variable)
        };
        let mut realized = Vec::with_capacity(variants.len());
        for (effect, body) in variants {
            let mut inputs = shared_inputs.clone();
            inputs.extend(self.realize_parameters(&body.parameters, use_scope));
            let written = body.return_annotation.map(|annotation| self.realize_as_type(annotation, use_scope));
            let output = match (effect, written) {
                // Inout/set with no annotation, or a bare (non-tuple) result type:
                // the receiver half of the pair is implicit, so wrap it in rather
                // than demand the model spell it out.
                (AccessEffect::Inout | AccessEffect::Set, None) => {
                    let void = self.arena.void();
                    self.arena.tuple(vec![receiver_variable, void])
                }
                (AccessEffect::Inout | AccessEffect::Set, Some(ty)) if !matches!(self.arena.kind(ty), TypeKind::Tuple(_)) => {
                    self.arena.tuple(vec![receiver_variable, ty])
                }
                // An explicit tuple annotation: the model wrote the full pair
                // itself, so it must already be exactly two elements wide.
                (AccessEffect::Inout | AccessEffect::Set, Some(ty)) => match self.arena.kind(ty) {
                    TypeKind::Tuple(elements) if elements.len() == 2 => ty,
                    _ => {
                        self.emit(Diagnostic::new(
                            DiagnosticCode::MutatingBundleMustReturn,
                            self.program.decl(decl).span,
                            DiagnosticMessage::MutatingBundleMustReturn {
                                variant: if *effect == AccessEffect::Inout { "inout" } else { "set" },
                            },
                        ));
                        self.arena.error()
                    }
                },
                (_, Some(ty)) => ty,
                (_, None) => self.arena.void(),
            };
            realized.push((*effect, CallableVariant { inputs, output }));
        }
        if is_property {
            self.arena.subscript(true, Vec::new(), realized)
        } else if matches!(self.program.decl(decl).kind, DeclKind::Subscript(_)) {
            self.arena.subscript(false, Vec::new(), realized)
        } else {
            self.arena.method_bundle(receiver_variable, realized)
        }
    }
}
