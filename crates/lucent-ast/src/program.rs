//! The scoped program: the checker's entire external input surface.
//!
//! A [`ScopedProgram`] owns the arenas for every declaration,
//! expression, and pattern plus the [`ScopeTree`] linking them, and
//! exposes the query surface expected of a "scoped program" —
//! "iteration over top-level declarations per module", "ordered decl
//! list per scope", "parent-scope walks" (via [`ScopeTree`] directly),
//! "containing-module and containing-translation-unit queries", and
//! "node-by-id access".

use rustc_hash::FxHashMap;

use crate::decl::Decl;
use crate::expr::Expr;
use crate::ids::{DeclId, ExprId, ModuleId, PatternId, TranslationUnitId};
use crate::pattern::Pattern;
use crate::scope::ScopeTree;
use lucent_common::Atom;

#[derive(Clone, Debug)]
pub struct Module {
    pub id: ModuleId,
    pub name: Atom,
    pub translation_units: Vec<TranslationUnitId>,
}

#[derive(Clone, Debug)]
pub struct TranslationUnit {
    pub id: TranslationUnitId,
    pub module: ModuleId,
    /// Top-level declarations introduced by this file, in source order.
    pub top_level: Vec<DeclId>,
}

/// The optional implicit core library. When present, `Bool`, `Void`,
/// `Movable`, `Copyable`, and `Destructible` resolve without an
/// explicit import, as the built-in-trait synthesis machinery
/// requires all three conformances to be nameable from anywhere.
#[derive(Clone, Debug, Default)]
pub struct CoreLibrary {
    pub module: Option<ModuleId>,
    pub bool_type: Option<DeclId>,
    pub void_type: Option<DeclId>,
    pub movable_trait: Option<DeclId>,
    pub copyable_trait: Option<DeclId>,
    pub destructible_trait: Option<DeclId>,
}

/// The full input the checker runs over. Built once (by a parser, or
/// by hand via [`crate::builder::ProgramBuilder`] for tests) and then
/// treated as read-only — the checker's own mutable state lives
/// entirely in its property maps, never here.
#[derive(Default)]
pub struct ScopedProgram {
    decls: Vec<Decl>,
    exprs: Vec<Expr>,
    patterns: Vec<Pattern>,
    pub scopes: ScopeTree,
    modules: Vec<Module>,
    translation_units: Vec<TranslationUnit>,
    modules_by_name: FxHashMap<Atom, ModuleId>,
    pub core_library: CoreLibrary,
}

impl ScopedProgram {
    pub fn new() -> Self {
        ScopedProgram::default()
    }

    pub fn alloc_decl(&mut self, build: impl FnOnce(DeclId) -> Decl) -> DeclId {
        let id = DeclId::from_index(self.decls.len());
        self.decls.push(build(id));
        id
    }

    pub fn alloc_expr(&mut self, build: impl FnOnce(ExprId) -> Expr) -> ExprId {
        let id = ExprId::from_index(self.exprs.len());
        self.exprs.push(build(id));
        id
    }

    pub fn alloc_pattern(&mut self, build: impl FnOnce(PatternId) -> Pattern) -> PatternId {
        let id = PatternId::from_index(self.patterns.len());
        self.patterns.push(build(id));
        id
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn pattern(&self, id: PatternId) -> &Pattern {
        &self.patterns[id.index()]
    }

    pub fn add_module(&mut self, module: Module) -> ModuleId {
        let id = module.id;
        self.modules_by_name.insert(module.name, id);
        self.modules.push(module);
        id
    }

    pub fn add_translation_unit(&mut self, unit: TranslationUnit) -> TranslationUnitId {
        let id = unit.id;
        self.translation_units.push(unit);
        id
    }

    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.index()]
    }

    /// Overwrite an already-registered module, e.g. once its
    /// translation units are known. The name is assumed unchanged.
    pub fn replace_module(&mut self, module: Module) {
        self.modules[module.id.index()] = module;
    }

    pub fn module_named(&self, name: Atom) -> Option<ModuleId> {
        self.modules_by_name.get(&name).copied()
    }

    pub fn translation_unit(&self, id: TranslationUnitId) -> &TranslationUnit {
        &self.translation_units[id.index()]
    }

    /// Every top-level declaration in `module`, across all of its
    /// translation units, in file-then-source order.
    pub fn top_level_decls(&self, module: ModuleId) -> impl Iterator<Item = DeclId> + '_ {
        self.module(module)
            .translation_units
            .iter()
            .flat_map(move |&tu| self.translation_unit(tu).top_level.iter().copied())
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::DeclKind;
    use crate::scope::ScopeKind;
    use lucent_common::{Interner, Span};

    #[test]
    fn top_level_decls_spans_multiple_translation_units() {
        let mut program = ScopedProgram::new();
        let mut interner = Interner::new();
        let name = interner.intern("main");

        let tu_scope = program.scopes.push_scope(None, ScopeKind::TranslationUnit(TranslationUnitId(0)));
        let module_id = ModuleId::from_index(0);
        let module_scope = program.scopes.push_scope(Some(tu_scope), ScopeKind::Module(module_id));

        let a = program.alloc_decl(|id| Decl {
            id,
            name: Some(name),
            span: Span::dummy(),
            enclosing_scope: module_scope,
            kind: DeclKind::Module { decls: vec![] },
        });
        let b = program.alloc_decl(|id| Decl {
            id,
            name: Some(name),
            span: Span::dummy(),
            enclosing_scope: module_scope,
            kind: DeclKind::Module { decls: vec![] },
        });

        let tu0 = program.add_translation_unit(TranslationUnit {
            id: TranslationUnitId::from_index(0),
            module: module_id,
            top_level: vec![a],
        });
        let tu1 = program.add_translation_unit(TranslationUnit {
            id: TranslationUnitId::from_index(1),
            module: module_id,
            top_level: vec![b],
        });
        program.add_module(Module { id: module_id, name, translation_units: vec![tu0, tu1] });

        let collected: Vec<_> = program.top_level_decls(module_id).collect();
        assert_eq!(collected, vec![a, b]);
    }
}
