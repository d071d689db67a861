//! Binding patterns.
//!
//! Patterns appear on binding declarations and, indirectly, on
//! parameters. Pattern inference against an optional annotation and
//! initializer is delegated to the checker.

use crate::ids::PatternId;
use lucent_common::{Atom, Span};

#[derive(Clone, Debug)]
pub enum PatternKind {
    Name(Atom),
    Wildcard,
    Tuple(Vec<PatternId>),
}

#[derive(Clone, Debug)]
pub struct Pattern {
    pub id: PatternId,
    pub span: Span,
    pub kind: PatternKind,
}
