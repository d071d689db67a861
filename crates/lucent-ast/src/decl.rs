//! Declaration nodes.
//!
//! One [`Decl`] exists per declaration in the source program: bindings,
//! functions, products (struct-like types), traits, extensions, type
//! aliases, generic parameters, associated types/values, and the
//! method/subscript bundles that group variants by access effect.
//!
//! `Decl` itself carries no realized type and no request state — those
//! live in the checker's property maps (`lucent-sema::property_maps`,
//! `lucent-sema::request`), because the AST is read-only input and
//! the checker's memoization is mutable state the checker alone owns.

use crate::ids::{DeclId, ExprId, PatternId, ScopeId};
use lucent_common::{Atom, Span};

/// The access convention under which a receiver or parameter is used:
/// borrow (`let`), mutable borrow (`inout`), consume (`sink`),
/// initialize (`set`), or yield (`yielded`). See GLOSSARY.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessEffect {
    Let,
    Inout,
    Set,
    Sink,
    Yielded,
}

/// How a captured name was introduced at its use site, which determines
/// whether capture analysis treats it as a remote borrow or an
/// owned value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CaptureIntroducer {
    Let,
    Inout,
    SinkLet,
    SinkVar,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterConvention {
    Let,
    Inout,
    Set,
    Sink,
    Yielded,
}

#[derive(Clone, Debug)]
pub struct ParameterDecl {
    pub label: Option<Atom>,
    pub name: Option<Atom>,
    pub annotation: Option<ExprId>,
    pub convention: ParameterConvention,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct CaptureDecl {
    pub name: Atom,
    pub introducer: CaptureIntroducer,
    pub span: Span,
}

/// A single function-shaped body: a function, initializer, method
/// variant, or subscript variant all realize to the same callable
/// shape, so they share this record.
#[derive(Clone, Debug)]
pub struct FunctionLikeDecl {
    pub generic_params: Vec<DeclId>,
    pub explicit_captures: Vec<CaptureDecl>,
    pub parameters: Vec<ParameterDecl>,
    /// `None` for a `static` function/method (no receiver).
    pub receiver_effect: Option<AccessEffect>,
    pub return_annotation: Option<ExprId>,
    pub body: Option<FunctionBody>,
}

#[derive(Clone, Debug)]
pub enum FunctionBody {
    /// A single-expression body, e.g. `fun f(): Int { 1 + 1 }` viewed
    /// as a single trailing expression for the purposes of the
    /// return-disjunction.
    SingleExpression(ExprId),
    /// A block body. Only the last expression participates in the
    /// return-type disjunction; earlier statements are checked as
    /// ordinary expressions with unused-result diagnostics where
    /// applicable (`UnusedResult`).
    Block(Vec<ExprId>),
}

#[derive(Clone, Debug)]
pub struct MethodBundleDecl {
    pub generic_params: Vec<DeclId>,
    pub parameters: Vec<ParameterDecl>,
    pub variants: Vec<(AccessEffect, FunctionLikeDecl)>,
}

#[derive(Clone, Debug)]
pub struct SubscriptBundleDecl {
    pub generic_params: Vec<DeclId>,
    pub parameters: Vec<ParameterDecl>,
    /// A subscript declared without parameters is a *property*
    /// subscript; resolution strips property-subscripts to their
    /// output during resolution.
    pub is_property: bool,
    pub variants: Vec<(AccessEffect, FunctionLikeDecl)>,
}

#[derive(Clone, Debug)]
pub struct GenericParamDecl {
    /// Annotations written on the parameter. The realizer
    /// classifies the first annotation: if it refers to a trait, the
    /// parameter is a type parameter; otherwise it's a value parameter
    /// whose type is the annotation, and a second annotation on a value
    /// parameter is rejected (`TooManyAnnotationsOnValueParameter`).
    pub annotations: Vec<ExprId>,
}

#[derive(Clone, Debug)]
pub enum DeclKind {
    /// A struct-like product type.
    Product {
        generic_params: Vec<DeclId>,
        members: Vec<DeclId>,
        /// Conformances declared directly on the type (`Model: Trait`
        /// sites), as opposed to ones declared via a separate extension.
        conformances: Vec<ExprId>,
    },
    /// A trait ("view"): a named set of requirements.
    Trait {
        generic_params: Vec<DeclId>,
        requirements: Vec<DeclId>,
        /// Traits this trait refines, e.g. `trait B: A`.
        refinements: Vec<ExprId>,
    },
    /// An extension: adds members and/or conformances to `subject`.
    Extension { subject: ExprId, members: Vec<DeclId>, conformances: Vec<ExprId> },
    TypeAlias { aliased: ExprId },
    Module { decls: Vec<DeclId> },
    Namespace { decls: Vec<DeclId> },
    Binding {
        pattern: PatternId,
        annotation: Option<ExprId>,
        initializer: Option<ExprId>,
        /// Whether the binding is mutable (`var`) or not (`let`);
        /// relevant to parameter-convention inference for captures.
        mutable: bool,
    },
    Function(FunctionLikeDecl),
    Initializer(FunctionLikeDecl),
    /// The compiler-synthesized memberwise initializer for a product:
    /// a receiver plus one sink parameter per stored binding.
    MemberwiseInitializer { product: DeclId },
    Method(MethodBundleDecl),
    Subscript(SubscriptBundleDecl),
    GenericParameter(GenericParamDecl),
    AssociatedType { constraint: Option<ExprId> },
    AssociatedValue { annotation: ExprId },
}

#[derive(Clone, Debug)]
pub struct Decl {
    pub id: DeclId,
    pub name: Option<Atom>,
    pub span: Span,
    /// The scope this declaration is *introduced into* (its parent
    /// scope), not the scope it may itself open for its own members.
    pub enclosing_scope: ScopeId,
    pub kind: DeclKind,
}

impl Decl {
    /// Whether this declaration kind denotes a value rather than a
    /// type, trait, module, or namespace — used by the resolver to
    /// reject `DeclarationDenotesValueInTypePosition` when a value name
    /// is used where a type was expected.
    pub fn denotes_value(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Binding { .. }
                | DeclKind::Function(_)
                | DeclKind::Initializer(_)
                | DeclKind::MemberwiseInitializer { .. }
                | DeclKind::Method(_)
                | DeclKind::Subscript(_)
                | DeclKind::AssociatedValue { .. }
        )
        // Note: `GenericParameter` is deliberately excluded — whether it
        // denotes a type or a value is only known after realization
        // classifies its first annotation.
    }

    pub fn is_generic(&self) -> bool {
        match &self.kind {
            DeclKind::Product { generic_params, .. } | DeclKind::Trait { generic_params, .. } => {
                !generic_params.is_empty()
            }
            DeclKind::Function(f) | DeclKind::Initializer(f) => !f.generic_params.is_empty(),
            DeclKind::Method(m) => !m.generic_params.is_empty(),
            DeclKind::Subscript(s) => !s.generic_params.is_empty(),
            _ => false,
        }
    }
}
