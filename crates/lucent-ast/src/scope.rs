//! The lexical scope tree.
//!
//! The scoped program offers "ordered decl list per scope" and
//! "parent-scope walks" plus "containing-module and containing-
//! translation-unit queries". A real scope-tree builder (out of scope
//! here) would populate this incrementally during parsing; this crate
//! only needs to answer the queries, so it stores the finished tree as
//! a flat arena of [`ScopeData`] nodes.

use crate::ids::{DeclId, ModuleId, ScopeId, TranslationUnitId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    TranslationUnit(TranslationUnitId),
    Module(ModuleId),
    /// The scope introduced by a generic declaration's parameter list
    /// and where-clause, in which its own parameters are skolems.
    Generic(DeclId),
    /// The scope introduced by a function/method/subscript body, in
    /// which parameters and explicit captures are visible.
    FunctionBody(DeclId),
    Block,
}

struct ScopeData {
    parent: Option<ScopeId>,
    kind: ScopeKind,
    decls: Vec<DeclId>,
}

#[derive(Default)]
pub struct ScopeTree {
    scopes: Vec<ScopeData>,
}

impl ScopeTree {
    pub fn new() -> Self {
        ScopeTree::default()
    }

    pub fn push_scope(&mut self, parent: Option<ScopeId>, kind: ScopeKind) -> ScopeId {
        let id = ScopeId::from_index(self.scopes.len());
        self.scopes.push(ScopeData { parent, kind, decls: Vec::new() });
        id
    }

    pub fn add_decl(&mut self, scope: ScopeId, decl: DeclId) {
        self.scopes[scope.index()].decls.push(decl);
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.index()].parent
    }

    pub fn kind(&self, scope: ScopeId) -> ScopeKind {
        self.scopes[scope.index()].kind
    }

    /// Every scope id in the tree, in allocation order. Used by capture
    /// analysis to find the `FunctionBody` scope a given declaration
    /// opened, since a `Decl` only records the scope it was
    /// *introduced into*, not one it may itself open.
    pub fn scope_ids(&self) -> impl Iterator<Item = ScopeId> + '_ {
        (0..self.scopes.len()).map(ScopeId::from_index)
    }

    /// The `FunctionBody(decl)` scope opened by `decl`'s own body, if any.
    pub fn function_body_scope(&self, decl: DeclId) -> Option<ScopeId> {
        self.scope_ids().find(|&s| self.kind(s) == ScopeKind::FunctionBody(decl))
    }

    /// The ordered list of declarations introduced directly into
    /// `scope` (not its ancestors or descendants).
    pub fn decls_in(&self, scope: ScopeId) -> &[DeclId] {
        &self.scopes[scope.index()].decls
    }

    /// Walk from `scope` outward through every enclosing scope,
    /// innermost first, ending with `scope` itself as the first item.
    pub fn walk_up(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        let mut current = Some(scope);
        std::iter::from_fn(move || {
            let next = current?;
            current = self.parent(next);
            Some(next)
        })
    }

    /// True iff `ancestor` contains `scope`, i.e. `scope` is `ancestor`
    /// or nested within it.
    pub fn is_ancestor(&self, ancestor: ScopeId, scope: ScopeId) -> bool {
        self.walk_up(scope).any(|s| s == ancestor)
    }

    pub fn containing_module(&self, scope: ScopeId) -> Option<ModuleId> {
        self.walk_up(scope).find_map(|s| match self.kind(s) {
            ScopeKind::Module(m) => Some(m),
            _ => None,
        })
    }

    pub fn containing_translation_unit(&self, scope: ScopeId) -> Option<TranslationUnitId> {
        self.walk_up(scope).find_map(|s| match self.kind(s) {
            ScopeKind::TranslationUnit(t) => Some(t),
            _ => None,
        })
    }

    /// The nearest enclosing generic-declaration scope, if any — used
    /// to decide whether a generic parameter referenced during name
    /// resolution was "introduced inside `useScope`" (and should be
    /// skolemized) or belongs to an outer generic scope (and should be
    /// opened as a fresh variable).
    pub fn enclosing_generic_decl(&self, scope: ScopeId) -> Option<DeclId> {
        self.walk_up(scope).find_map(|s| match self.kind(s) {
            ScopeKind::Generic(d) => Some(d),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_up_starts_with_self() {
        let mut tree = ScopeTree::new();
        let tu = tree.push_scope(None, ScopeKind::TranslationUnit(TranslationUnitId(0)));
        let module = tree.push_scope(Some(tu), ScopeKind::Module(ModuleId(0)));
        let block = tree.push_scope(Some(module), ScopeKind::Block);

        let chain: Vec<_> = tree.walk_up(block).collect();
        assert_eq!(chain, vec![block, module, tu]);
    }

    #[test]
    fn containing_module_skips_intermediate_scopes() {
        let mut tree = ScopeTree::new();
        let tu = tree.push_scope(None, ScopeKind::TranslationUnit(TranslationUnitId(0)));
        let module = tree.push_scope(Some(tu), ScopeKind::Module(ModuleId(3)));
        let block = tree.push_scope(Some(module), ScopeKind::Block);

        assert_eq!(tree.containing_module(block), Some(ModuleId(3)));
        assert_eq!(tree.containing_translation_unit(block), Some(TranslationUnitId(0)));
    }

    #[test]
    fn is_ancestor_is_reflexive_and_transitive() {
        let mut tree = ScopeTree::new();
        let tu = tree.push_scope(None, ScopeKind::TranslationUnit(TranslationUnitId(0)));
        let module = tree.push_scope(Some(tu), ScopeKind::Module(ModuleId(0)));
        let block = tree.push_scope(Some(module), ScopeKind::Block);

        assert!(tree.is_ancestor(block, block));
        assert!(tree.is_ancestor(tu, block));
        assert!(!tree.is_ancestor(block, tu));
    }
}
