//! The diagnostics data model.
//!
//! Diagnostics are data, never exceptions: the checker emits one of these
//! for every defect it detects and substitutes the `error` type into the
//! affected position, then keeps going. Each
//! diagnostic carries a stable [`DiagnosticCode`] and a structured
//! [`DiagnosticMessage`] payload rather than a pre-formatted string, so a
//! downstream renderer (out of scope here) can localize or reformat
//! messages without parsing text back out.

use crate::interner::Atom;
use crate::span::Span;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Error,
    Warning,
}

/// A stable, closed enumeration of every diagnostic kind the checker can
/// emit, grouped as Structural / Lookup / Type / Inference / Semantic.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    // Structural
    CircularDependency,
    DeclarationRequiresBody,
    DuplicateOperator,
    DuplicateParameterName,
    DuplicateCapture,
    // Lookup
    UndefinedName,
    AmbiguousUse,
    NoViableCandidate,
    UndefinedOperator,
    // Type
    InvalidConformanceTarget,
    NotATrait,
    SubjectDoesNotConform,
    RedundantConformance,
    InvalidEqualityConstraint,
    TooManyAnnotationsOnValueParameter,
    // Inference
    NotEnoughContextToInfer,
    AmbiguousOverload,
    UnusedResult,
    // Semantic
    DeclarationDenotesValueInTypePosition,
    ValueInSumTypePosition,
    SumWithZeroOrOneElement,
    MutatingBundleMustReturn,
    // Guards against runaway recursion rather than a user-facing defect.
    RealizationTooDeep,
}

impl DiagnosticCode {
    pub fn category(self) -> DiagnosticCategory {
        match self {
            DiagnosticCode::UnusedResult => DiagnosticCategory::Warning,
            _ => DiagnosticCategory::Error,
        }
    }
}

/// A structured message payload. One variant per diagnostic code (or
/// per small family of related codes) carrying exactly the data a
/// renderer needs, instead of an already-formatted string.
#[derive(Clone, Debug)]
pub enum DiagnosticMessage {
    CircularDependency { declaration: Atom },
    DeclarationRequiresBody { declaration: Atom },
    DuplicateOperator { stem: Atom, first_site: Span },
    DuplicateParameterName { name: Atom },
    DuplicateCapture { name: Atom },
    UndefinedName { name: Atom },
    AmbiguousUse { name: Atom, candidate_count: usize },
    NoViableCandidate { name: Atom },
    UndefinedOperator { stem: Atom },
    InvalidConformanceTarget { subject: Atom },
    NotATrait { name: Atom },
    SubjectDoesNotConform { subject: Atom, concept: Atom, missing: Vec<Atom> },
    RedundantConformance { subject: Atom, concept: Atom, first_site: Span },
    InvalidEqualityConstraint,
    TooManyAnnotationsOnValueParameter { parameter: Atom },
    NotEnoughContextToInfer { expression_kind: &'static str },
    AmbiguousOverload { name: Atom, tied_candidates: usize },
    UnusedResult,
    DeclarationDenotesValueInTypePosition { name: Atom },
    ValueInSumTypePosition,
    SumWithZeroOrOneElement { element_count: usize },
    MutatingBundleMustReturn { variant: &'static str },
    RealizationTooDeep { depth: u32 },
}

/// A note attached to a diagnostic (e.g. a requirement-satisfaction
/// failure folded into an outer "does-not-conform" error).
#[derive(Clone, Debug)]
pub struct DiagnosticNote {
    pub span: Span,
    pub message: DiagnosticMessage,
}

#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub span: Span,
    pub message: DiagnosticMessage,
    pub notes: Vec<DiagnosticNote>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, span: Span, message: DiagnosticMessage) -> Self {
        Diagnostic { code, span, message, notes: Vec::new() }
    }

    pub fn with_note(mut self, span: Span, message: DiagnosticMessage) -> Self {
        self.notes.push(DiagnosticNote { span, message });
        self
    }

    pub fn category(&self) -> DiagnosticCategory {
        self.code.category()
    }
}

/// An insertion-ordered collection of diagnostics. Order matters:
/// callers rely on diagnostics appearing in the order their defects
/// were discovered, not sorted by span or severity.
#[derive(Default, Debug, Clone)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        DiagnosticSink::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.category() == DiagnosticCategory::Error)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_preserves_insertion_order() {
        let mut sink = DiagnosticSink::new();
        sink.push(Diagnostic::new(
            DiagnosticCode::UndefinedName,
            Span::new(0, 1),
            DiagnosticMessage::UndefinedName { name: Atom::from_u32(0) },
        ));
        sink.push(Diagnostic::new(
            DiagnosticCode::UndefinedOperator,
            Span::new(2, 3),
            DiagnosticMessage::UndefinedOperator { stem: Atom::from_u32(1) },
        ));
        let codes: Vec<_> = sink.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![DiagnosticCode::UndefinedName, DiagnosticCode::UndefinedOperator]);
    }

    #[test]
    fn unused_result_is_a_warning() {
        assert_eq!(DiagnosticCode::UnusedResult.category(), DiagnosticCategory::Warning);
        assert_eq!(DiagnosticCode::CircularDependency.category(), DiagnosticCategory::Error);
    }
}
