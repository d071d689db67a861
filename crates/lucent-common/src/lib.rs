//! Source utilities shared across the lucent compiler front-end.
//!
//! This crate provides foundations used by every other crate in the
//! workspace:
//! - String interning (`Atom`, `Interner`)
//! - Source spans (`Span`, `Spanned`)
//! - The diagnostics data model (`Diagnostic`, `DiagnosticCode`)
//! - Centralized limits and thresholds (`limits`)
//! - Checker configuration (`CheckerOptions`)

pub mod interner;
pub use interner::{Atom, Interner};

pub mod span;
pub use span::{Span, Spanned};

pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticCode, DiagnosticMessage, DiagnosticNote, DiagnosticSink};

pub mod limits;

pub mod options;
pub use options::CheckerOptions;
