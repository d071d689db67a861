//! Centralized limits and thresholds.
//!
//! Kept in one place so the numbers can be tuned without hunting
//! through the checker for magic constants.

/// Maximum recursion depth for `realize`. Distinct from cycle detection
/// (which catches *direct* self-reference through the same declaration
/// id): this catches unbounded chains through distinct declarations,
/// e.g. a long `type A = B; type B = C; ...` alias chain, without
/// overflowing the native call stack.
pub const MAX_REALIZE_DEPTH: u32 = 512;

/// Maximum recursion depth for generic instantiation (specializing a
/// bound generic whose arguments themselves reference other bound
/// generics).
pub const MAX_INSTANTIATION_DEPTH: u32 = 256;

/// Maximum number of disjunction branches explored before the solver
/// gives up and reports "not enough context to infer" rather than
/// continuing to fork. Bounds pathological overload sets.
pub const MAX_DISJUNCTION_BRANCHES: usize = 4096;
