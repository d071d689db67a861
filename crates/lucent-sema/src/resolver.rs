//! Name resolution: unqualified and qualified lookup, member tables,
//! extension discovery, intrinsics, and the operator namespace.
//!
//! A name expression is a reversed linked list of [`NameComponent`]s
//! (`crate::checker::Checker::split_name_components`); resolution
//! splits off a non-nominal prefix and resolves the remaining nominal
//! components left to right (§4.3).

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use lucent_ast::{DeclId, DeclKind, ExprKind, ExprId, NameComponent, ScopeId};
use lucent_common::Atom;
use lucent_ty::{GenericArgument, NominalKind, TypeId};

use crate::checker::Checker;
use crate::property_maps::DeclReference;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PrecedenceGroup {
    pub level: u16,
    pub associativity: Associativity,
}

/// The operator namespace: infix-operator declarations keyed by stem,
/// plus the precedence group each one belongs to. §4.7 needs both to
/// fold a binary-operator chain; the distilled spec assumes this table
/// exists without specifying its shape (see `DESIGN.md`).
#[derive(Default)]
pub struct OperatorTable {
    by_stem: FxHashMap<Atom, Vec<DeclId>>,
    precedence: FxHashMap<DeclId, PrecedenceGroup>,
}

impl OperatorTable {
    pub fn register(&mut self, stem: Atom, decl: DeclId, group: PrecedenceGroup) {
        self.by_stem.entry(stem).or_default().push(decl);
        self.precedence.insert(decl, group);
    }

    pub fn candidates(&self, stem: Atom) -> &[DeclId] {
        self.by_stem.get(&stem).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn precedence_of(&self, decl: DeclId) -> Option<PrecedenceGroup> {
        self.precedence.get(&decl).copied()
    }

    /// A fixed table of well-known arithmetic/comparison/logical
    /// operator stems, consulted when registering module-level operator
    /// functions. A real implementation would read precedence from a
    /// user-declared `precedencegroup`; this crate's AST stand-in has
    /// no such declaration kind, so well-known stems are wired in
    /// directly (documented as an Open Question resolution in
    /// `DESIGN.md`).
    pub fn well_known_precedence(stem: &str) -> Option<PrecedenceGroup> {
        let (level, associativity) = match stem {
            "*" | "/" | "%" => (3, Associativity::Left),
            "+" | "-" => (2, Associativity::Left),
            "==" | "!=" | "<" | ">" | "<=" | ">=" => (1, Associativity::None),
            "&&" => (0, Associativity::Left),
            "||" => (-1i16 as u16, Associativity::Left),
            _ => return None,
        };
        Some(PrecedenceGroup { level, associativity })
    }
}

/// One resolved candidate for a name component: the declaration, its
/// type after convention-stripping/specialization/instantiation, the
/// generic-argument bindings chosen for it, and whether it is viable
/// (carries no error diagnostic).
#[derive(Clone, Debug)]
pub struct Candidate {
    pub decl: DeclId,
    pub ty: TypeId,
    pub arguments: IndexMap<DeclId, GenericArgument>,
    pub viable: bool,
}

#[derive(Clone, Debug, Default)]
pub struct CandidateSet {
    pub elements: Vec<Candidate>,
}

impl CandidateSet {
    pub fn viable(&self) -> impl Iterator<Item = &Candidate> {
        self.elements.iter().filter(|c| c.viable)
    }

    pub fn viable_count(&self) -> usize {
        self.viable().count()
    }
}

/// The outcome of resolving a name expression (§4.3).
pub enum ResolutionResult {
    /// Nominal-only resolution completed; `resolved` is the candidate
    /// set for the final component, `unresolved_suffix` is empty unless
    /// resolution had to stop early for some other reason.
    Done { resolved: CandidateSet, unresolved_suffix: Vec<NameComponent> },
    /// The caller must supply a type for a non-nominal head before the
    /// remaining (nominal) suffix can be resolved.
    Inexecutable { suffix: Vec<NameComponent> },
    /// An error was already diagnosed.
    Failed,
}

/// Per-checker resolver state: the operator namespace, a memoized
/// lookup-table cache keyed by (parent type, member name, use scope),
/// and the extension-discovery recursion guard.
#[derive(Default)]
pub struct ResolverState {
    pub operators: OperatorTable,
    lookup_cache: FxHashMap<(Option<TypeId>, Atom, ScopeId), Vec<DeclId>>,
    extensions_on_stack: Vec<DeclId>,
}

impl ResolverState {
    pub fn new() -> Self {
        ResolverState::default()
    }
}

pub(crate) struct IntrinsicAtoms {
    pub(crate) builtin: Atom,
    pub(crate) any: Atom,
    pub(crate) never: Atom,
    pub(crate) self_: Atom,
    pub(crate) sum: Atom,
    pub(crate) metatype: Atom,
}

impl<'p> Checker<'p> {
    pub(crate) fn intrinsic_atoms(&self) -> IntrinsicAtoms {
        IntrinsicAtoms {
            builtin: self.interner.intern("Builtin"),
            any: self.interner.intern("Any"),
            never: self.interner.intern("Never"),
            self_: self.interner.intern("Self"),
            sum: self.interner.intern("Sum"),
            metatype: self.interner.intern("Metatype"),
        }
    }

    /// Populate the operator namespace by scanning every top-level
    /// function declaration whose name matches a well-known operator
    /// stem. Idempotent: re-running simply re-registers the same decls
    /// (the table itself does not dedup, so callers should only invoke
    /// this once per module, typically from `check_module`).
    pub fn populate_operator_table(&mut self, module: lucent_ast::ModuleId) {
        let decls: Vec<DeclId> = self.program.top_level_decls(module).collect();
        for decl_id in decls {
            let decl = self.program.decl(decl_id);
            if !matches!(decl.kind, DeclKind::Function(_)) {
                continue;
            }
            let Some(name) = decl.name else { continue };
            let text = self.interner.resolve(name);
            if let Some(group) = OperatorTable::well_known_precedence(&text) {
                self.resolver.operators.register(name, decl_id, group);
            }
        }
    }

    /// Resolve an infix operator's declaration by stem within the
    /// operator namespace, for §4.7 sequence folding.
    pub fn resolve_operator(&self, stem: Atom) -> Option<(DeclId, PrecedenceGroup)> {
        let decl = *self.resolver.operators.candidates(stem).first()?;
        let group = self.resolver.operators.precedence_of(decl)?;
        Some((decl, group))
    }

    /// Split a name expression into its reversed-linked-list
    /// components plus the non-nominal head it bottoms out at (`None`
    /// when the whole chain is nominal, i.e. starts with a bare
    /// `Name`).
    pub fn split_name_components(&self, expr: ExprId) -> (Option<ExprId>, Vec<NameComponent>) {
        let mut components = Vec::new();
        let mut current = expr;
        loop {
            match &self.program.expr(current).kind {
                ExprKind::Name(component) => {
                    components.push(component.clone());
                    components.reverse();
                    return (None, components);
                }
                ExprKind::Member { parent, component } => {
                    components.push(component.clone());
                    current = *parent;
                }
                _ => {
                    components.reverse();
                    return (Some(current), components);
                }
            }
        }
    }

    /// Direct members of a nominal declaration: stored bindings and
    /// methods for a product, requirements for a trait, members for an
    /// extension (extensions are resolved through their subject, not
    /// looked up directly by this helper).
    pub fn direct_members_of(&self, decl: DeclId) -> Vec<DeclId> {
        match &self.program.decl(decl).kind {
            DeclKind::Product { members, .. } => members.clone(),
            DeclKind::Trait { requirements, .. } => requirements.clone(),
            DeclKind::Module { decls } | DeclKind::Namespace { decls } => decls.clone(),
            _ => Vec::new(),
        }
    }

    /// Every extension in the program whose subject realizes to the
    /// same canonical type as `subject`, skipping any extension
    /// currently being resolved (the recursion guard of §4.3).
    fn matching_extensions(&mut self, subject: TypeId) -> Vec<DeclId> {
        let mut found = Vec::new();
        let all_decls: Vec<DeclId> = self
            .program
            .modules()
            .flat_map(|m| self.program.top_level_decls(m.id))
            .collect();
        for decl_id in all_decls {
            if self.resolver.extensions_on_stack.contains(&decl_id) {
                continue;
            }
            let is_extension_for = match &self.program.decl(decl_id).kind {
                DeclKind::Extension { subject: subject_expr, .. } => Some(*subject_expr),
                _ => None,
            };
            if let Some(subject_expr) = is_extension_for {
                let extension_scope = self.program.decl(decl_id).enclosing_scope;
                self.resolver.extensions_on_stack.push(decl_id);
                let extension_subject = self.realize_as_type(subject_expr, extension_scope);
                self.resolver.extensions_on_stack.pop();
                if self.canonical(extension_subject) == self.canonical(subject) {
                    found.push(decl_id);
                }
            }
        }
        found
    }

    /// Member lookup on a realized receiver type: declarations directly
    /// in the type's scope, then extensions visible from `use_scope`,
    /// then inherited conformance requirements (§4.3).
    pub fn member_lookup(&mut self, receiver: TypeId, name: Atom, use_scope: ScopeId) -> Vec<DeclId> {
        if let Some(cached) = self.resolver.lookup_cache.get(&(Some(receiver), name, use_scope)) {
            return cached.clone();
        }
        let mut found = Vec::new();
        if let lucent_ty::TypeKind::Nominal { decl, .. } = self.arena.kind(receiver).clone() {
            for member in self.direct_members_of(decl) {
                if self.program.decl(member).name == Some(name) {
                    found.push(member);
                }
            }
        }
        if found.is_empty() {
            for extension in self.matching_extensions(receiver) {
                let DeclKind::Extension { members, .. } = &self.program.decl(extension).kind else { continue };
                for &member in members {
                    if self.program.decl(member).name == Some(name) {
                        found.push(member);
                    }
                }
            }
        }
        if found.is_empty() {
            for trait_ in self.relations.conformed_traits(self.canonical(receiver), |_| true) {
                for requirement in self.direct_members_of(trait_) {
                    if self.program.decl(requirement).name == Some(name) {
                        found.push(requirement);
                    }
                }
            }
        }
        self.resolver.lookup_cache.insert((Some(receiver), name, use_scope), found.clone());
        found
    }

    /// Unqualified lookup: walk the scope chain from `use_scope`
    /// outward; the first scope with any declaration named `name`
    /// wins (all of that scope's matches become the overload set, a
    /// simplification of "if a non-overloadable match is found it
    /// short-circuits" — see `DESIGN.md`). Imported modules are
    /// consulted last, only within the containing translation unit.
    pub fn unqualified_lookup(&mut self, name: Atom, use_scope: ScopeId) -> Vec<DeclId> {
        if let Some(cached) = self.resolver.lookup_cache.get(&(None, name, use_scope)) {
            return cached.clone();
        }
        for scope in self.program.scopes.walk_up(use_scope) {
            let matches: Vec<DeclId> =
                self.program.scopes.decls_in(scope).iter().copied().filter(|&d| self.program.decl(d).name == Some(name)).collect();
            if !matches.is_empty() {
                self.resolver.lookup_cache.insert((None, name, use_scope), matches.clone());
                return matches;
            }
        }
        if let Some(tu) = self.program.scopes.containing_translation_unit(use_scope) {
            for &module in self.props.imports_of(tu) {
                let matches: Vec<DeclId> = self
                    .program
                    .top_level_decls(module)
                    .filter(|&d| self.program.decl(d).name == Some(name))
                    .collect();
                if !matches.is_empty() {
                    self.resolver.lookup_cache.insert((None, name, use_scope), matches.clone());
                    return matches;
                }
            }
        }
        self.resolver.lookup_cache.insert((None, name, use_scope), Vec::new());
        Vec::new()
    }

    /// Resolve a single nominal component against an optional parent
    /// type, producing a candidate set. Steps 1-5 of §4.3: evaluate
    /// static arguments, look up the stem (intrinsics, qualified, or
    /// unqualified), realize/strip/specialize/instantiate each match,
    /// apply sugar rules, then partition into viable/non-viable.
    pub fn resolve_component(
        &mut self,
        component: &NameComponent,
        parent: Option<TypeId>,
        use_scope: ScopeId,
        keep_implicit_arguments: bool,
        instantiate_types: bool,
    ) -> CandidateSet {
        let intrinsics = self.intrinsic_atoms();

        if parent.is_none() {
            if component.name == intrinsics.builtin && self.options.is_builtin_module_visible {
                let module_ty = self.arena_builtin_module();
                return CandidateSet {
                    elements: vec![Candidate {
                        decl: DeclId::from_index(u32::MAX as usize),
                        ty: module_ty,
                        arguments: IndexMap::new(),
                        viable: true,
                    }],
                };
            }
            if let Some(ty) = self.intrinsic_type(component.name, &intrinsics) {
                return CandidateSet {
                    elements: vec![Candidate { decl: DeclId::from_index(u32::MAX as usize), ty, arguments: IndexMap::new(), viable: true }],
                };
            }
        }

        let raw_matches = match parent {
            Some(parent_ty) => self.member_lookup(parent_ty, component.name, use_scope),
            None => self.unqualified_lookup(component.name, use_scope),
        };

        let mut elements = Vec::with_capacity(raw_matches.len());
        for decl in raw_matches {
            let realized = self.realize(decl);
            let stripped = self.strip_parameter_convention(realized);
            let stripped = self.strip_property_subscript(stripped);
            let arguments = self.associate_generic_arguments(decl, component, parent, keep_implicit_arguments, use_scope);
            // Explicit arguments written on this component (`Box<Int>`)
            // name the generic declaration itself, so they bind a fresh
            // `BoundGeneric` wrapper around its bare nominal rather than
            // substituting into it — there is nothing inside a `Nominal`
            // node for `specialize` to rewrite. Arguments inherited from
            // a parent receiver (a member's own signature referencing
            // the enclosing type's parameters) go through `specialize`
            // as before.
            let specialized = if arguments.is_empty() {
                stripped
            } else if !component.generic_args.is_empty() {
                match self.arena.kind(stripped).clone() {
                    lucent_ty::TypeKind::Metatype(inner)
                        if matches!(self.arena.kind(inner), lucent_ty::TypeKind::Nominal { .. }) =>
                    {
                        let bound = self.arena.bound_generic(inner, arguments.clone());
                        self.arena.metatype(bound)
                    }
                    _ => self.specialize(stripped, &arguments),
                }
            } else {
                self.specialize(stripped, &arguments)
            };
            let final_ty = if instantiate_types { self.instantiate(specialized, use_scope) } else { specialized };
            let viable = !self.arena.flags(final_ty).has_error();
            elements.push(Candidate { decl, ty: final_ty, arguments, viable });
        }
        CandidateSet { elements }
    }

    fn intrinsic_type(&mut self, name: Atom, intrinsics: &IntrinsicAtoms) -> Option<TypeId> {
        if name == intrinsics.any {
            Some(self.arena.any())
        } else if name == intrinsics.never {
            Some(self.arena.never())
        } else if name == intrinsics.self_ {
            None // `Self` is resolved contextually by the caller, not a fixed intrinsic type.
        } else if name == intrinsics.sum || name == intrinsics.metatype {
            None // Generic intrinsics require their argument list; handled by the caller once arguments are known.
        } else {
            let _ = intrinsics;
            None
        }
    }

    fn arena_builtin_module(&mut self) -> TypeId {
        self.arena.intern(
            lucent_ty::TypeKind::BuiltIn(lucent_ty::BuiltinKind::ModuleSentinel),
            &[],
            lucent_ty::TypeFlags::IS_CANONICAL,
        )
    }

    /// Strip a `Parameter { inner, convention }` wrapper to its inner
    /// type, as resolution does before presenting a candidate's type.
    fn strip_parameter_convention(&mut self, ty: TypeId) -> TypeId {
        if let lucent_ty::TypeKind::Parameter { inner, .. } = self.arena.kind(ty) {
            *inner
        } else {
            ty
        }
    }

    /// Replace a property-subscript type by its output, per §4.3 step 3.
    fn strip_property_subscript(&mut self, ty: TypeId) -> TypeId {
        if let lucent_ty::TypeKind::Subscript { is_property: true, variants, .. } = self.arena.kind(ty).clone() {
            if let Some((_, variant)) = variants.first() {
                return variant.output;
            }
        }
        ty
    }

    /// Associate generic arguments for a resolved declaration: explicit
    /// arguments written on the component, or inherited from the
    /// parent's bound-generic arguments, or left open as fresh
    /// variables when `keep_implicit_arguments` is set.
    /// Bindings for every generic-parameter decl that can appear free in
    /// `decl`'s realized type: first the parent receiver's own
    /// bound-generic arguments (a member's signature may reference its
    /// enclosing product/trait's type parameters directly, without
    /// re-declaring them), then `decl`'s own parameter list — explicit
    /// arguments on the component, inherited from the parent when `decl`
    /// reuses the same param decls, or fresh variables when
    /// `keep_implicit_arguments` is set.
    fn associate_generic_arguments(
        &mut self,
        decl: DeclId,
        component: &NameComponent,
        parent: Option<TypeId>,
        keep_implicit_arguments: bool,
        use_scope: ScopeId,
    ) -> IndexMap<DeclId, GenericArgument> {
        let mut arguments = IndexMap::new();
        if let Some(parent_ty) = parent {
            if let lucent_ty::TypeKind::BoundGeneric { arguments: parent_args, .. } = self.arena.kind(parent_ty).clone() {
                arguments.extend(parent_args);
            }
        }

        let env = self.generic_environment(decl);
        let own_parameters = env.parameters.clone();
        if own_parameters.is_empty() {
            return arguments;
        }

        if !component.generic_args.is_empty() {
            for (param, &arg_expr) in own_parameters.iter().zip(component.generic_args.iter()) {
                arguments.insert(*param, GenericArgument::Type(self.realize_as_type(arg_expr, use_scope)));
            }
            return arguments;
        }

        if keep_implicit_arguments {
            for param in own_parameters {
                let variable = self.variables.fresh(lucent_ty::VariableContext::GenericInstantiation);
                arguments.insert(param, GenericArgument::Type(self.arena.variable(variable)));
            }
        }
        arguments
    }

    /// Top-level entry: resolve a full name expression into a
    /// `DeclReference` for the (innermost/final) component, applying
    /// the metatype-callee and non-metatype-subscript sugar rules.
    pub fn resolve_name_expression(&mut self, expr: ExprId, use_scope: ScopeId) -> ResolutionResult {
        let (head, components) = self.split_name_components(expr);
        if head.is_some() {
            // A non-nominal prefix: the caller must supply its type
            // (via `resolve_component`'s `parent` argument) before the
            // remaining nominal suffix can be resolved.
            return ResolutionResult::Inexecutable { suffix: components };
        }
        if components.is_empty() {
            return ResolutionResult::Failed;
        }
        let mut parent_ty: Option<TypeId> = None;
        let mut last = CandidateSet::default();
        for (index, component) in components.iter().enumerate() {
            let is_last = index + 1 == components.len();
            let set = self.resolve_component(component, parent_ty, use_scope, is_last, true);
            if set.viable_count() == 0 {
                return ResolutionResult::Failed;
            }
            if !is_last {
                parent_ty = set.viable().next().map(|c| c.ty);
            }
            last = set;
        }
        ResolutionResult::Done { resolved: last, unresolved_suffix: Vec::new() }
    }
}
