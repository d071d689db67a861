//! Keyed stores from node id to the checker's computed facts about it.
//!
//! Every other component writes into these maps and nothing else;
//! reading them back is how `realize`/`check` stay memoized fix-points
//! rather than re-walking the AST on every query.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use lucent_ast::{AccessEffect, DeclId, ExprId, ModuleId};
use lucent_common::Atom;
use lucent_ty::{GenericArgument, TypeId};

use crate::errors::CheckerHostError;

/// The three-color marker attached to every declaration. See §3/§4.1:
/// re-entering `Realizing` or `Checking` for the same declaration
/// signals a circular dependency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeclRequestState {
    Unseen,
    Realizing,
    Realized,
    Checking,
    Done,
}

impl Default for DeclRequestState {
    fn default() -> Self {
        DeclRequestState::Unseen
    }
}

/// What a name expression refers to, once resolved — see GLOSSARY and
/// §3 (`Expression`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeclReference {
    /// A direct reference to a declaration with its generic-argument
    /// bindings (empty when the declaration is non-generic).
    Direct { decl: DeclId, arguments: IndexMap<DeclId, GenericArgument> },
    /// A member reference, reached through a non-nominal or dotted prefix.
    Member { decl: DeclId, arguments: IndexMap<DeclId, GenericArgument> },
    /// `init` reached by rewriting a metatype callee to a constructor call.
    Constructor { decl: DeclId, arguments: IndexMap<DeclId, GenericArgument> },
    BuiltinFunction(Atom),
    BuiltinType(Atom),
    BuiltinModule,
    /// An intrinsic the resolver recognizes without an AST lookup
    /// (`Any`, `Never`, `Self`, `Sum<...>`, `Metatype<...>`).
    CompilerKnown(Atom),
}

/// A binary-operator chain folded into a tree once precedence is known
/// (§4.7). Leaves are the original operand expressions; internal nodes
/// name the infix-operator declaration chosen for that application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FoldedExpr {
    Leaf(ExprId),
    Apply { operator: DeclId, left: Box<FoldedExpr>, right: Box<FoldedExpr> },
}

/// `(name, access-effect, referenced-decl)` — one implicit capture, in
/// discovery order (see `lucent-sema::capture`).
pub type ImplicitCapture = (Atom, AccessEffect, DeclId);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SynthesizedKind {
    Destroy,
    MoveInitialize,
    MoveAssign,
    CopyInitialize,
    CopyAssign,
}

#[derive(Clone, Debug)]
pub struct SynthesizedDecl {
    pub kind: SynthesizedKind,
    pub for_type: TypeId,
    pub in_scope: lucent_ast::ScopeId,
}

/// The checker's entire mutable memoization surface, keyed by node id.
#[derive(Default)]
pub struct PropertyMaps {
    decl_request: FxHashMap<DeclId, DeclRequestState>,
    decl_types: FxHashMap<DeclId, TypeId>,
    expr_types: FxHashMap<ExprId, TypeId>,
    referred_decls: FxHashMap<ExprId, DeclReference>,
    folded_sequences: FxHashMap<ExprId, FoldedExpr>,
    implicit_captures: FxHashMap<DeclId, Vec<ImplicitCapture>>,
    synthesized_decls: FxHashMap<ModuleId, Vec<SynthesizedDecl>>,
    imports: FxHashMap<lucent_ast::TranslationUnitId, Vec<ModuleId>>,
}

impl PropertyMaps {
    pub fn new() -> Self {
        PropertyMaps::default()
    }

    pub fn request_state(&self, decl: DeclId) -> DeclRequestState {
        self.decl_request.get(&decl).copied().unwrap_or_default()
    }

    pub fn set_request_state(&mut self, decl: DeclId, state: DeclRequestState) {
        self.decl_request.insert(decl, state);
    }

    pub fn decl_type(&self, decl: DeclId) -> Option<TypeId> {
        self.decl_types.get(&decl).copied()
    }

    pub fn require_decl_type(&self, decl: DeclId) -> Result<TypeId, CheckerHostError> {
        self.decl_type(decl).ok_or(CheckerHostError::UnregisteredDecl(decl))
    }

    pub fn set_decl_type(&mut self, decl: DeclId, ty: TypeId) {
        self.decl_types.insert(decl, ty);
    }

    pub fn expr_type(&self, expr: ExprId) -> Option<TypeId> {
        self.expr_types.get(&expr).copied()
    }

    pub fn require_expr_type(&self, expr: ExprId) -> Result<TypeId, CheckerHostError> {
        self.expr_type(expr).ok_or(CheckerHostError::UnregisteredExpr(expr))
    }

    pub fn set_expr_type(&mut self, expr: ExprId, ty: TypeId) {
        self.expr_types.insert(expr, ty);
    }

    pub fn referred_decl(&self, expr: ExprId) -> Option<&DeclReference> {
        self.referred_decls.get(&expr)
    }

    pub fn require_referred_decl(&self, expr: ExprId) -> Result<&DeclReference, CheckerHostError> {
        self.referred_decl(expr).ok_or(CheckerHostError::NotAReferredDecl(expr))
    }

    pub fn set_referred_decl(&mut self, expr: ExprId, reference: DeclReference) {
        self.referred_decls.insert(expr, reference);
    }

    pub fn folded_sequence(&self, expr: ExprId) -> Option<&FoldedExpr> {
        self.folded_sequences.get(&expr)
    }

    pub fn set_folded_sequence(&mut self, expr: ExprId, folded: FoldedExpr) {
        self.folded_sequences.insert(expr, folded);
    }

    pub fn implicit_captures(&self, decl: DeclId) -> &[ImplicitCapture] {
        self.implicit_captures.get(&decl).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn set_implicit_captures(&mut self, decl: DeclId, captures: Vec<ImplicitCapture>) {
        self.implicit_captures.insert(decl, captures);
    }

    pub fn push_synthesized(&mut self, module: ModuleId, decl: SynthesizedDecl) {
        self.synthesized_decls.entry(module).or_default().push(decl);
    }

    pub fn synthesized_decls(&self, module: ModuleId) -> &[SynthesizedDecl] {
        self.synthesized_decls.get(&module).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn record_import(&mut self, unit: lucent_ast::TranslationUnitId, module: ModuleId) {
        let imports = self.imports.entry(unit).or_default();
        if !imports.contains(&module) {
            imports.push(module);
        }
    }

    pub fn imports_of(&self, unit: lucent_ast::TranslationUnitId) -> &[ModuleId] {
        self.imports.get(&unit).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_expr_type_is_a_host_error_not_a_panic() {
        let maps = PropertyMaps::new();
        let err = maps.require_expr_type(ExprId::from_index(0));
        assert!(matches!(err, Err(CheckerHostError::UnregisteredExpr(_))));
    }

    #[test]
    fn request_state_defaults_to_unseen() {
        let maps = PropertyMaps::new();
        assert_eq!(maps.request_state(DeclId::from_index(0)), DeclRequestState::Unseen);
    }
}
