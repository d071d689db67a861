//! Expression nodes.
//!
//! Name expressions are left-recursive member-access chains in the
//! surface syntax (`a.b.c`); the resolver walks them as a
//! reversed linked list of [`NameComponent`]s, splitting off a
//! non-nominal prefix when the innermost node is not itself a name.

use crate::ids::{DeclId, ExprId};
use lucent_common::{Atom, Span};

/// One nominal component of a name expression: a stem plus the static
/// argument list written on it (`Box<Int>`'s `<Int>`, or a call's `()`
/// is *not* here — this is specifically the dotted-name grammar).
#[derive(Clone, Debug)]
pub struct NameComponent {
    pub name: Atom,
    pub generic_args: Vec<ExprId>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Argument {
    pub label: Option<Atom>,
    pub value: ExprId,
}

#[derive(Clone, Copy, Debug)]
pub enum LiteralKind {
    Integer(i64),
    Bool(bool),
    Void,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    /// An unqualified name: the base case of a name-expression chain.
    Name(NameComponent),
    /// `parent.component` — qualified name resolution recurses through
    /// this to split off the nominal suffix.
    Member { parent: ExprId, component: NameComponent },
    Call { callee: ExprId, arguments: Vec<Argument> },
    /// A `[]` subscript call, after the resolver's sugar rule rewrites
    /// a subscript callee on a non-metatype.
    Subscript { base: ExprId, arguments: Vec<Argument> },
    /// A flat binary-operator chain, folded by
    /// `foldedSequence` once operator precedence is known.
    Sequence { head: ExprId, tail: Vec<(Atom, ExprId)> },
    /// `&expr` — a mutable-use site for capture analysis.
    Address { operand: ExprId },
    Tuple(Vec<ExprId>),
    Literal(LiteralKind),
    /// A closure literal, represented as a reference to a synthetic
    /// `Function` declaration so capture analysis and realization
    /// operate uniformly on declarations rather than a separate
    /// expression-level function shape.
    Lambda(DeclId),
}

#[derive(Clone, Debug)]
pub struct Expr {
    pub id: ExprId,
    pub span: Span,
    pub kind: ExprKind,
}
