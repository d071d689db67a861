//! The scoped program: a stand-in for the lexer, parser, and scope-tree
//! builder that a real front-end would run before the checker ever sees
//! a program.
//!
//! Those three stages are external collaborators specified only by
//! interface: the checker is handed an
//! immutable AST with stable node ids and a lexical scope tree that
//! answers containment and enclosing-scope queries. This crate supplies
//! exactly that shape — declarations, expressions, patterns, and a
//! scope tree — plus a [`builder::ProgramBuilder`] so tests can
//! construct fixtures directly, without a real grammar.

pub mod ids;
pub use ids::{DeclId, ExprId, ModuleId, PatternId, ScopeId, TranslationUnitId};

pub mod decl;
pub use decl::{
    AccessEffect, CaptureDecl, CaptureIntroducer, Decl, DeclKind, FunctionLikeDecl, GenericParamDecl,
    MethodBundleDecl, ParameterConvention, ParameterDecl, SubscriptBundleDecl,
};

pub mod expr;
pub use expr::{Argument, Expr, ExprKind, LiteralKind, NameComponent};

pub mod pattern;
pub use pattern::{Pattern, PatternKind};

pub mod scope;
pub use scope::{ScopeKind, ScopeTree};

pub mod program;
pub use program::{CoreLibrary, Module, ScopedProgram, TranslationUnit};

pub mod builder;
pub use builder::ProgramBuilder;
