//! Conformance checking and synthesis (§4.6): matching a trait's
//! requirements against a model's members, registering the result in
//! the relations store, and synthesizing the three built-in traits
//! (`Destructible`, `Movable`, `Copyable`) when the model has no
//! explicit implementation of their requirements.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use lucent_ast::{DeclId, ExprId, ScopeId};
use lucent_common::{Atom, Diagnostic, DiagnosticCode, DiagnosticMessage, Span};
use lucent_ty::{relations::Implementation, Conformance, NominalKind, TypeId, TypeKind};
use lucent_ty::SynthesizedKind as RelationKind;

use crate::checker::Checker;
use crate::property_maps::{SynthesizedDecl, SynthesizedKind as RecordKind};

fn as_record_kind(kind: RelationKind) -> RecordKind {
    match kind {
        RelationKind::Destroy => RecordKind::Destroy,
        RelationKind::MoveInitialize => RecordKind::MoveInitialize,
        RelationKind::MoveAssign => RecordKind::MoveAssign,
        RelationKind::CopyInitialize => RecordKind::CopyInitialize,
        RelationKind::CopyAssign => RecordKind::CopyAssign,
    }
}

impl<'p> Checker<'p> {
    /// Realize and register every conformance written on a product or
    /// extension: `conformances` is the list of trait-naming
    /// expressions from `DeclKind::Product`/`DeclKind::Extension`.
    pub(crate) fn register_conformances(
        &mut self,
        source_decl: DeclId,
        subject: TypeId,
        conformances: &[ExprId],
        exposition_scope: ScopeId,
        site: Span,
    ) {
        for &conformance_expr in conformances {
            let trait_ty = self.realize_as_type(conformance_expr, exposition_scope);
            let TypeKind::Nominal { kind: NominalKind::Trait, decl: trait_decl } = self.arena.kind(trait_ty).clone() else {
                self.emit(Diagnostic::new(
                    DiagnosticCode::NotATrait,
                    site,
                    DiagnosticMessage::NotATrait { name: self.program.decl(source_decl).name.unwrap_or(Atom::from_u32(0)) },
                ));
                continue;
            };
            self.check_and_register_conformance(source_decl, subject, trait_decl, exposition_scope, site);
        }
    }

    fn check_and_register_conformance(
        &mut self,
        source_decl: DeclId,
        subject: TypeId,
        trait_decl: DeclId,
        exposition_scope: ScopeId,
        site: Span,
    ) {
        let canonical_subject = self.canonical(subject);
        let requirements = self.direct_members_of(trait_decl);
        let mut implementations = FxHashMap::default();
        let mut missing = Vec::new();

        for requirement in requirements {
            let Some(name) = self.program.decl(requirement).name else { continue };
            let matches = self.member_lookup(canonical_subject, name, exposition_scope);
            if let Some(&concrete) = matches.first() {
                implementations.insert(requirement, Implementation::Concrete(concrete));
            } else if let Some(kind) = self.synthesized_kind_for(trait_decl, name) {
                implementations.insert(requirement, Implementation::Synthesized(kind));
            } else {
                missing.push(name);
            }
        }

        if !missing.is_empty() {
            let subject_name = self.program.decl(source_decl).name.unwrap_or(Atom::from_u32(0));
            let concept_name = self.program.decl(trait_decl).name.unwrap_or(Atom::from_u32(0));
            self.emit(Diagnostic::new(
                DiagnosticCode::SubjectDoesNotConform,
                site,
                DiagnosticMessage::SubjectDoesNotConform { subject: subject_name, concept: concept_name, missing },
            ));
            return;
        }

        self.record_synthesized_implementations(trait_decl, canonical_subject, exposition_scope, &implementations);

        let conformance = Conformance {
            model: canonical_subject,
            concept: trait_decl,
            arguments: IndexMap::new(),
            conditions: Vec::new(),
            source_decl,
            exposition_scope,
            implementations,
            site,
        };
        if let Err(redundant) = self.relations.register(conformance) {
            let subject_name = self.program.decl(source_decl).name.unwrap_or(Atom::from_u32(0));
            let concept_name = self.program.decl(trait_decl).name.unwrap_or(Atom::from_u32(0));
            self.emit(Diagnostic::new(
                DiagnosticCode::RedundantConformance,
                site,
                DiagnosticMessage::RedundantConformance {
                    subject: subject_name,
                    concept: concept_name,
                    first_site: redundant.first_site,
                },
            ));
        }
    }

    /// Whether `trait_decl` is one of the three built-in traits this
    /// checker may synthesize a requirement for, and if so, which
    /// synthesized kind `name` denotes.
    fn synthesized_kind_for(&self, trait_decl: DeclId, name: Atom) -> Option<RelationKind> {
        let core = &self.program.core_library;
        let text = self.interner.resolve(name);
        if Some(trait_decl) == core.destructible_trait && &*text == "deinit" {
            return Some(RelationKind::Destroy);
        }
        if Some(trait_decl) == core.movable_trait {
            return match &*text {
                "init" => Some(RelationKind::MoveInitialize),
                "assign" => Some(RelationKind::MoveAssign),
                _ => None,
            };
        }
        if Some(trait_decl) == core.copyable_trait {
            return match &*text {
                "init" => Some(RelationKind::CopyInitialize),
                "assign" => Some(RelationKind::CopyAssign),
                _ => None,
            };
        }
        None
    }

    /// Record one `SynthesizedDecl` per requirement this conformance
    /// actually needed synthesized (a model that implemented a
    /// requirement itself leaves no synthesis trail for it). Movable
    /// conformance additionally records a `Destroy` entry whenever any
    /// of its requirements were synthesized: a moved-from value still
    /// needs its storage released, so synthesizing `Movable` always
    /// implies synthesizing the `Destructible` hookup alongside it even
    /// when the model declared no explicit `Destructible` conformance
    /// of its own.
    fn record_synthesized_implementations(
        &mut self,
        trait_decl: DeclId,
        subject: TypeId,
        scope: ScopeId,
        implementations: &FxHashMap<DeclId, Implementation>,
    ) {
        let Some(module) = self.program.scopes.containing_module(scope) else { return };
        let mut any_synthesized = false;
        for implementation in implementations.values() {
            if let Implementation::Synthesized(kind) = implementation {
                any_synthesized = true;
                self.props.push_synthesized(module, SynthesizedDecl { kind: as_record_kind(*kind), for_type: subject, in_scope: scope });
            }
        }
        if any_synthesized && Some(trait_decl) == self.program.core_library.movable_trait {
            self.props.push_synthesized(module, SynthesizedDecl { kind: RecordKind::Destroy, for_type: subject, in_scope: scope });
        }
    }
}
