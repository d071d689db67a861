//! Hand-construction of test fixtures.
//!
//! There is no parser in this crate (lexing and parsing are a separate
//! front-end stage). Tests build a [`crate::program::ScopedProgram`]
//! directly with `ProgramBuilder` instead of invoking a real scanner.

use lucent_common::{Atom, Interner, Span};

use crate::decl::{Decl, DeclKind};
use crate::expr::{Expr, ExprKind, NameComponent};
use crate::ids::{DeclId, ExprId, ModuleId, ScopeId, TranslationUnitId};
use crate::program::{Module, ScopedProgram, TranslationUnit};
use crate::scope::ScopeKind;

/// Builds a [`ScopedProgram`] containing a single module with a single
/// translation unit, which covers the overwhelming majority of
/// checker test fixtures; multi-module programs are assembled by
/// calling [`ProgramBuilder::new_module`] more than once.
pub struct ProgramBuilder {
    pub interner: Interner,
    program: ScopedProgram,
    translation_unit_scope: ScopeId,
    module_scope: ScopeId,
    module: ModuleId,
    top_level: Vec<DeclId>,
}

impl ProgramBuilder {
    pub fn new(module_name: &str) -> Self {
        let interner = Interner::new();
        let mut program = ScopedProgram::new();
        let tu_scope = program
            .scopes
            .push_scope(None, ScopeKind::TranslationUnit(TranslationUnitId::from_index(0)));
        let module = ModuleId::from_index(0);
        let module_scope = program.scopes.push_scope(Some(tu_scope), ScopeKind::Module(module));
        let name = interner.intern(module_name);
        program.add_module(Module { id: module, name, translation_units: vec![] });

        ProgramBuilder {
            interner,
            program,
            translation_unit_scope: tu_scope,
            module_scope,
            module,
            top_level: Vec::new(),
        }
    }

    pub fn intern(&self, text: &str) -> Atom {
        self.interner.intern(text)
    }

    /// The scope new top-level declarations should be introduced into.
    pub fn module_scope(&self) -> ScopeId {
        self.module_scope
    }

    pub fn push_scope(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        self.program.scopes.push_scope(Some(parent), kind)
    }

    /// Allocate a declaration and register it in both the scope tree
    /// (so resolution can find it) and, if `top_level` is set, the
    /// translation unit's top-level list.
    pub fn decl(&mut self, name: &str, scope: ScopeId, top_level: bool, kind: DeclKind) -> DeclId {
        let atom = self.interner.intern(name);
        let id = self.program.alloc_decl(|id| Decl {
            id,
            name: Some(atom),
            span: Span::dummy(),
            enclosing_scope: scope,
            kind,
        });
        self.program.scopes.add_decl(scope, id);
        if top_level {
            self.top_level.push(id);
        }
        id
    }

    /// Like [`Self::decl`] but for anonymous declarations (generic
    /// parameters, the synthesized memberwise initializer) that carry
    /// no source name.
    pub fn decl_unnamed(&mut self, scope: ScopeId, kind: DeclKind) -> DeclId {
        self.program.alloc_decl(|id| Decl {
            id,
            name: None,
            span: Span::dummy(),
            enclosing_scope: scope,
            kind,
        })
    }

    pub fn name_expr(&mut self, name: &str) -> ExprId {
        let atom = self.interner.intern(name);
        self.program.alloc_expr(|id| Expr {
            id,
            span: Span::dummy(),
            kind: ExprKind::Name(NameComponent { name: atom, generic_args: Vec::new(), span: Span::dummy() }),
        })
    }

    pub fn expr(&mut self, kind: ExprKind) -> ExprId {
        self.program.alloc_expr(|id| Expr { id, span: Span::dummy(), kind })
    }

    pub fn pattern(&mut self, kind: crate::pattern::PatternKind) -> crate::ids::PatternId {
        self.program
            .alloc_pattern(|id| crate::pattern::Pattern { id, span: Span::dummy(), kind })
    }

    /// Finish building: attach the accumulated top-level declarations
    /// as a single translation unit and return the finished program.
    pub fn build(self) -> ScopedProgram {
        self.into_parts().0
    }

    /// Like [`Self::build`], but also hands back the `Interner` that
    /// produced every `Atom` in the program — a real driver would keep
    /// its interner alive independently of the AST it built with it;
    /// tests that need to recognize atoms by text (e.g. the resolver's
    /// intrinsic dispatch table) need it back too.
    pub fn into_parts(mut self) -> (ScopedProgram, Interner) {
        let tu = self.program.add_translation_unit(TranslationUnit {
            id: TranslationUnitId::from_index(0),
            module: self.module,
            top_level: self.top_level,
        });
        let module_name = self.program.module(self.module).name;
        self.program.replace_module(Module { id: self.module, name: module_name, translation_units: vec![tu] });
        let _ = self.translation_unit_scope;
        (self.program, self.interner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternKind;

    #[test]
    fn builds_a_single_binding_program() {
        let mut builder = ProgramBuilder::new("main");
        let scope = builder.module_scope();
        let pattern = builder.pattern(PatternKind::Name(builder.intern("x")));
        let init = builder.name_expr("y");
        builder.decl(
            "x",
            scope,
            true,
            DeclKind::Binding { pattern, annotation: None, initializer: Some(init), mutable: false },
        );

        let program = builder.build();
        let module_id = program.modules().next().unwrap().id;
        let top_level: Vec<_> = program.top_level_decls(module_id).collect();
        assert_eq!(top_level.len(), 1);
    }
}
