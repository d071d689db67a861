//! Host-misuse errors.
//!
//! Distinct from [`lucent_common::Diagnostic`]: a diagnostic reports a
//! defect in the *checked program*; a [`CheckerHostError`] reports a
//! defect in how the *caller* drove this crate (asking for the type of
//! a node id that was never registered, checking a declaration whose
//! module was never handed to the checker). These are real `Result`
//! returns, never silently substituted with `error`.

use lucent_ast::{DeclId, ExprId, ModuleId};

#[derive(Debug, thiserror::Error)]
pub enum CheckerHostError {
    #[error("no type recorded for expression {0:?}; it was never visited by the constraint generator")]
    UnregisteredExpr(ExprId),
    #[error("no type recorded for declaration {0:?}; realize() was never called on it")]
    UnregisteredDecl(DeclId),
    #[error("module {0:?} was never registered with this checker")]
    UnknownModule(ModuleId),
    #[error("declaration {0:?} has no referred-decl recorded; it is not a name expression")]
    NotAReferredDecl(ExprId),
}
