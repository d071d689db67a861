//! `trait A { fun foo() }`, `trait B: A {}`, `struct T: B {}` with `T`
//! declaring no members of its own — §8 scenario 5.

use lucent_ast::{DeclKind, FunctionLikeDecl, ProgramBuilder};
use lucent_common::CheckerOptions;
use lucent_sema::Checker;
use lucent_ty::NominalKind;

fn empty_function(name: &str, builder: &mut ProgramBuilder, scope: lucent_ast::ScopeId) -> lucent_ast::DeclId {
    builder.decl(
        name,
        scope,
        false,
        DeclKind::Function(FunctionLikeDecl {
            generic_params: vec![],
            explicit_captures: vec![],
            parameters: vec![],
            receiver_effect: None,
            return_annotation: None,
            body: None,
        }),
    )
}

#[test]
fn a_product_conforming_to_a_refining_trait_inherits_the_base_traits_requirements() {
    let mut builder = ProgramBuilder::new("main");
    let scope = builder.module_scope();

    let foo = empty_function("foo", &mut builder, scope);
    let a_trait = builder.decl("A", scope, true, DeclKind::Trait { generic_params: vec![], requirements: vec![foo], refinements: vec![] });

    let a_name = builder.name_expr("A");
    let b_trait = builder.decl("B", scope, true, DeclKind::Trait { generic_params: vec![], requirements: vec![], refinements: vec![a_name] });

    let b_name = builder.name_expr("B");
    let t_decl = builder.decl("T", scope, true, DeclKind::Product { generic_params: vec![], members: vec![], conformances: vec![b_name] });
    let foo_atom = builder.intern("foo");

    let (program, interner) = builder.into_parts();
    let mut checker = Checker::new(&program, &interner, CheckerOptions::new());

    checker.check(t_decl);
    assert!(checker.diagnostics.is_empty(), "expected no diagnostics, got {:?}", checker.diagnostics.iter().collect::<Vec<_>>());

    let t_instance = checker.arena.nominal(NominalKind::Product, t_decl);
    let canonical_t = checker.canonical(t_instance);

    let conformed = checker.relations.conformed_traits(canonical_t, |_| true);
    assert!(conformed.contains(&a_trait), "expected T to transitively conform to A, got {conformed:?}");
    assert!(conformed.contains(&b_trait), "expected T to conform to B directly, got {conformed:?}");

    let found = checker.member_lookup(canonical_t, foo_atom, scope);
    assert_eq!(found, vec![foo], "expected member lookup on T to find A's requirement through B's refinement");
}
