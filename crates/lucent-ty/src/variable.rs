//! Unification variables.
//!
//! A variable is a placeholder introduced during inference that the
//! solver must eventually eliminate. It packs a 56-bit monotonic
//! identifier with an 8-bit context tag into a single `u64`, the same
//! way the checker packs flow-node ids elsewhere rather than carrying a
//! second word around for what is, in practice, a small enum.

const IDENTIFIER_BITS: u32 = 56;
const IDENTIFIER_MASK: u64 = (1 << IDENTIFIER_BITS) - 1;

/// What a variable was opened for, attached purely for diagnostics and
/// tracing (`CheckerOptions::inference_tracing_site`) — the solver
/// itself treats all variables identically regardless of tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VariableContext {
    /// Opened while instantiating a generic declaration's parameters.
    GenericInstantiation = 0,
    /// Opened for an unannotated binding's pattern shape.
    BindingShape = 1,
    /// Opened for an expression with no contextual type.
    ExpressionInference = 2,
    /// Opened for a lambda's inferred parameter or return type.
    LambdaSignature = 3,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable(u64);

impl Variable {
    fn pack(identifier: u64, context: VariableContext) -> Self {
        debug_assert!(identifier <= IDENTIFIER_MASK, "variable identifier overflowed 56 bits");
        Variable((identifier & IDENTIFIER_MASK) | ((context as u64) << IDENTIFIER_BITS))
    }

    pub fn identifier(self) -> u64 {
        self.0 & IDENTIFIER_MASK
    }

    pub fn context(self) -> VariableContext {
        match self.0 >> IDENTIFIER_BITS {
            0 => VariableContext::GenericInstantiation,
            1 => VariableContext::BindingShape,
            2 => VariableContext::ExpressionInference,
            _ => VariableContext::LambdaSignature,
        }
    }
}

impl std::fmt::Debug for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "?{}:{:?}", self.identifier(), self.context())
    }
}

/// Monotonically allocates fresh [`Variable`]s. One instance lives per
/// checker; it never resets mid-compilation.
#[derive(Default)]
pub struct VariableAllocator {
    next: u64,
}

impl VariableAllocator {
    pub fn new() -> Self {
        VariableAllocator::default()
    }

    pub fn fresh(&mut self, context: VariableContext) -> Variable {
        let id = self.next;
        self.next += 1;
        Variable::pack(id, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_identifier_and_context() {
        let v = Variable::pack(12345, VariableContext::LambdaSignature);
        assert_eq!(v.identifier(), 12345);
        assert_eq!(v.context(), VariableContext::LambdaSignature);
    }

    #[test]
    fn allocator_is_monotonic_and_distinct() {
        let mut alloc = VariableAllocator::new();
        let a = alloc.fresh(VariableContext::ExpressionInference);
        let b = alloc.fresh(VariableContext::ExpressionInference);
        assert_ne!(a, b);
        assert_eq!(a.identifier() + 1, b.identifier());
    }
}
