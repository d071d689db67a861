//! Sequence folding (§4.7): turning a flat binary-operator chain into a
//! tree once each operator's precedence group is known, by precedence
//! climbing over the already-populated `OperatorTable`.

use lucent_ast::{DeclId, ExprId, ExprKind, ScopeId};
use lucent_common::{Diagnostic, DiagnosticCode, DiagnosticMessage};

use crate::checker::Checker;
use crate::property_maps::FoldedExpr;
use crate::resolver::{Associativity, PrecedenceGroup};

/// An operator slot between two operands: the resolved declaration and
/// precedence group, or `None` when the stem named no known operator —
/// folded as if it bound at the lowest possible precedence, so the
/// unresolved application still ends up the outermost node rather than
/// aborting the fold entirely.
type Slot = Option<(DeclId, PrecedenceGroup)>;

const LOWEST: PrecedenceGroup = PrecedenceGroup { level: 0, associativity: Associativity::Left };

impl<'p> Checker<'p> {
    /// Fold `expr` into a `FoldedExpr`, memoized by expression id.
    /// Non-sequence expressions (and single-operand sequences) fold to
    /// a bare `Leaf`.
    pub fn fold_sequence(&mut self, expr: ExprId, use_scope: ScopeId) -> FoldedExpr {
        let _ = use_scope;
        if let Some(folded) = self.props.folded_sequence(expr) {
            return folded.clone();
        }
        let ExprKind::Sequence { head, tail } = self.program.expr(expr).kind.clone() else {
            let folded = FoldedExpr::Leaf(expr);
            self.props.set_folded_sequence(expr, folded.clone());
            return folded;
        };
        if tail.is_empty() {
            let folded = FoldedExpr::Leaf(head);
            self.props.set_folded_sequence(expr, folded.clone());
            return folded;
        }

        let mut operands = vec![FoldedExpr::Leaf(head)];
        let mut operators: Vec<Slot> = Vec::with_capacity(tail.len());
        for (stem, operand) in tail {
            operands.push(FoldedExpr::Leaf(operand));
            match self.resolve_operator(stem) {
                Some((decl, group)) => operators.push(Some((decl, group))),
                None => {
                    self.emit(Diagnostic::new(
                        DiagnosticCode::UndefinedOperator,
                        self.program.expr(expr).span,
                        DiagnosticMessage::UndefinedOperator { stem },
                    ));
                    operators.push(None);
                }
            }
        }

        let (folded, _) = climb(&operands, &operators, 0, 0);
        self.props.set_folded_sequence(expr, folded.clone());
        folded
    }
}

/// Precedence-climbing reduction: `operands[i]` is the operand to the
/// left of `operators[i]`, which in turn sits to the left of
/// `operands[i + 1]`. Returns the folded tree rooted at `operands[pos]`
/// plus the operand index immediately after everything it consumed.
fn climb(operands: &[FoldedExpr], operators: &[Slot], pos: usize, min_level: u16) -> (FoldedExpr, usize) {
    let mut left = operands[pos].clone();
    let mut index = pos;
    while index < operators.len() {
        let (decl, group) = operators[index].unwrap_or((DeclId::from_index(u32::MAX as usize), LOWEST));
        if group.level < min_level {
            break;
        }
        let next_min = match group.associativity {
            Associativity::Left | Associativity::None => group.level + 1,
            Associativity::Right => group.level,
        };
        let (right, next_index) = climb(operands, operators, index + 1, next_min);
        left = FoldedExpr::Apply { operator: decl, left: Box::new(left), right: Box::new(right) };
        index = next_index;
    }
    (left, index)
}
