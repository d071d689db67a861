//! Capture analysis (§4.2): discovering the implicit captures of a
//! closure or local function by walking its body for name-expression
//! uses.

use rustc_hash::FxHashMap;

use lucent_ast::{AccessEffect, DeclId, DeclKind, ExprId, ExprKind, FunctionBody, FunctionLikeDecl, ScopeId};
use lucent_common::Atom;

use crate::checker::Checker;
use crate::property_maps::ImplicitCapture;

impl<'p> Checker<'p> {
    fn function_bodies(&self, decl: DeclId) -> Vec<ExprId> {
        fn body_exprs(f: &FunctionLikeDecl) -> Vec<ExprId> {
            match &f.body {
                Some(FunctionBody::SingleExpression(e)) => vec![*e],
                Some(FunctionBody::Block(es)) => es.clone(),
                None => Vec::new(),
            }
        }
        match &self.program.decl(decl).kind {
            DeclKind::Function(f) | DeclKind::Initializer(f) => body_exprs(f),
            DeclKind::Method(m) => m.variants.iter().flat_map(|(_, f)| body_exprs(f)).collect(),
            DeclKind::Subscript(s) => s.variants.iter().flat_map(|(_, f)| body_exprs(f)).collect(),
            _ => Vec::new(),
        }
    }

    /// Whether `decl` sits directly in a module's top-level scope
    /// (global), as opposed to nested inside a function body.
    fn is_module_scope_decl(&self, decl: DeclId) -> bool {
        let scope = self.program.decl(decl).enclosing_scope;
        matches!(self.program.scopes.kind(scope), lucent_ast::ScopeKind::Module(_))
    }

    /// True when `candidate` is declared inside `decl`'s own body (so
    /// it is a local, not a capture), is a top-level/global
    /// declaration, or is itself a capture-less (static, non-closure)
    /// function — all three are filtered out as capture candidates.
    fn is_capture_candidate(&self, decl: DeclId, candidate: DeclId) -> bool {
        if candidate == decl {
            return false;
        }
        if let Some(body_scope) = self.program.scopes.function_body_scope(decl) {
            let candidate_scope = self.program.decl(candidate).enclosing_scope;
            if self.program.scopes.is_ancestor(body_scope, candidate_scope) {
                return false;
            }
        }
        if self.is_module_scope_decl(candidate) {
            return false;
        }
        match &self.program.decl(candidate).kind {
            DeclKind::Function(f) | DeclKind::Initializer(f) => {
                f.receiver_effect.is_none() && f.explicit_captures.is_empty()
            }
            _ => true,
        }
    }

    /// Resolve a bare name expression's base declaration, recursing
    /// through member chains to their leftmost name (this is what
    /// rewrites `self.foo` into a use of `self`, per §4.2).
    fn base_name_use(&mut self, expr: ExprId, use_scope: ScopeId) -> Option<DeclId> {
        match &self.program.expr(expr).kind {
            ExprKind::Name(component) => self.unqualified_lookup(component.name, use_scope).first().copied(),
            ExprKind::Member { parent, .. } => self.base_name_use(*parent, use_scope),
            _ => None,
        }
    }

    fn walk_for_captures(&mut self, expr: ExprId, use_scope: ScopeId, mutable: bool, uses: &mut FxHashMap<DeclId, bool>) {
        match &self.program.expr(expr).kind {
            ExprKind::Name(_) => {
                if let Some(decl) = self.base_name_use(expr, use_scope) {
                    let entry = uses.entry(decl).or_insert(false);
                    *entry = *entry || mutable;
                }
            }
            ExprKind::Member { parent, .. } => self.walk_for_captures(*parent, use_scope, mutable, uses),
            ExprKind::Call { callee, arguments } => {
                self.walk_for_captures(*callee, use_scope, false, uses);
                for arg in arguments {
                    self.walk_for_captures(arg.value, use_scope, false, uses);
                }
            }
            ExprKind::Subscript { base, arguments } => {
                self.walk_for_captures(*base, use_scope, false, uses);
                for arg in arguments {
                    self.walk_for_captures(arg.value, use_scope, false, uses);
                }
            }
            ExprKind::Sequence { head, tail } => {
                self.walk_for_captures(*head, use_scope, false, uses);
                for (_, operand) in tail {
                    self.walk_for_captures(*operand, use_scope, false, uses);
                }
            }
            ExprKind::Address { operand } => self.walk_for_captures(*operand, use_scope, true, uses),
            ExprKind::Tuple(elements) => {
                for e in elements {
                    self.walk_for_captures(*e, use_scope, false, uses);
                }
            }
            ExprKind::Literal(_) => {}
            ExprKind::Lambda(_) => {
                // Nested closures analyze their own captures
                // independently when realized; they are not walked
                // again from the enclosing declaration.
            }
        }
    }

    /// Discover the implicit captures of `decl`'s body, in discovery
    /// order. `use_scope` is the scope names inside the body resolve
    /// from — `decl`'s own `FunctionBody` scope when the scope tree has
    /// one, or the caller's best substitute for hand-built fixtures
    /// that never opened one.
    pub fn analyze_captures(&mut self, decl: DeclId, use_scope: ScopeId) -> Vec<ImplicitCapture> {
        let body_scope = self.program.scopes.function_body_scope(decl).unwrap_or(use_scope);
        let bodies = self.function_bodies(decl);
        let mut uses: FxHashMap<DeclId, bool> = FxHashMap::default();
        let mut order: Vec<DeclId> = Vec::new();
        for body in &bodies {
            self.walk_for_captures(*body, body_scope, false, &mut uses);
        }
        for body in &bodies {
            self.collect_order(*body, body_scope, &mut order, &uses);
        }
        order
            .into_iter()
            .filter(|&candidate| self.is_capture_candidate(decl, candidate))
            .map(|candidate| {
                let mutable = uses[&candidate];
                let effect = if mutable { AccessEffect::Inout } else { AccessEffect::Let };
                let name = self.program.decl(candidate).name.unwrap_or(Atom::from_u32(0));
                (name, effect, candidate)
            })
            .collect()
    }

    /// Re-walk purely to record first-use order (the hash map above
    /// loses it); small bodies make this cheap enough to not bother
    /// threading an ordered set through `walk_for_captures` itself.
    fn collect_order(&mut self, expr: ExprId, use_scope: ScopeId, order: &mut Vec<DeclId>, uses: &FxHashMap<DeclId, bool>) {
        if let Some(decl) = self.base_name_use(expr, use_scope) {
            if uses.contains_key(&decl) && !order.contains(&decl) {
                order.push(decl);
            }
        }
        match &self.program.expr(expr).kind {
            ExprKind::Member { parent, .. } | ExprKind::Address { operand: parent } => {
                self.collect_order(*parent, use_scope, order, uses)
            }
            ExprKind::Call { callee, arguments } => {
                self.collect_order(*callee, use_scope, order, uses);
                for arg in arguments {
                    self.collect_order(arg.value, use_scope, order, uses);
                }
            }
            ExprKind::Subscript { base, arguments } => {
                self.collect_order(*base, use_scope, order, uses);
                for arg in arguments {
                    self.collect_order(arg.value, use_scope, order, uses);
                }
            }
            ExprKind::Sequence { head, tail } => {
                self.collect_order(*head, use_scope, order, uses);
                for (_, operand) in tail {
                    self.collect_order(*operand, use_scope, order, uses);
                }
            }
            ExprKind::Tuple(elements) => {
                for e in elements {
                    self.collect_order(*e, use_scope, order, uses);
                }
            }
            _ => {}
        }
    }
}
