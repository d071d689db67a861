//! The semantic front-end: type realization, name resolution,
//! constraint generation/solving, and conformance checking over the
//! AST and scope tree `lucent-ast` supplies and the type universe
//! `lucent-ty` owns.
//!
//! `checker.rs` holds the one piece of mutable state, [`checker::Checker`];
//! every other module in this crate is an `impl Checker` block in its
//! own file, split by concern the way the teacher spreads one large
//! state struct's behavior across many single-concern files rather
//! than one god module:
//!
//! - [`realizer`] — type realization (§4.1): declarations to types.
//! - [`resolver`] — name resolution and operator lookup (§4.3).
//! - [`generator`] — constraint generation over expression bodies (§4.4).
//! - [`solver`] — constraint solving: unification, subtyping, overload
//!   and disjunction resolution (§4.5).
//! - [`conformance`] — conformance checking and built-in synthesis (§4.6).
//! - [`fold`] — operator-sequence folding by precedence climbing (§4.7).
//! - [`capture`] — implicit capture analysis (§4.2).
//! - [`generic_env_builder`] — lazy per-scope generic environments.
//! - [`property_maps`] — every keyed result table the checker populates.
//! - [`errors`] — host-misuse errors, distinct from [`lucent_common::Diagnostic`].

pub mod errors;
pub use errors::CheckerHostError;

pub mod property_maps;
pub use property_maps::{DeclReference, DeclRequestState, FoldedExpr, ImplicitCapture, SynthesizedDecl, SynthesizedKind};

pub mod resolver;
pub use resolver::{Associativity, Candidate, CandidateSet, OperatorTable, PrecedenceGroup, ResolutionResult, ResolverState};

pub mod solver;
pub use solver::{Constraint, OverloadCandidate, Solution};

pub mod checker;
pub use checker::{Checker, FrozenChecker};

mod realizer;
mod generator;
mod conformance;
mod fold;
mod capture;
mod generic_env_builder;
