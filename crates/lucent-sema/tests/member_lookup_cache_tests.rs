//! A product declaring two members that a trait requires must not have
//! the second requirement's lookup return the first's cached result —
//! regression coverage for the member-lookup cache key needing to be
//! keyed by name, not just (receiver, scope).

use lucent_ast::{DeclKind, FunctionLikeDecl, ProgramBuilder};
use lucent_common::CheckerOptions;
use lucent_sema::Checker;
use lucent_ty::{Implementation, NominalKind};

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
fn second_requirement_binds_its_own_member_not_the_first_requirements_cached_lookup() {
    let mut builder = ProgramBuilder::new("main");
    let scope = builder.module_scope();

    let foo_req = empty_function("foo", &mut builder, scope);
    let bar_req = empty_function("bar", &mut builder, scope);
    let trait_decl = builder.decl(
        "Trait2",
        scope,
        true,
        DeclKind::Trait { generic_params: vec![], requirements: vec![foo_req, bar_req], refinements: vec![] },
    );

    let foo_impl = empty_function("foo", &mut builder, scope);
    let bar_impl = empty_function("bar", &mut builder, scope);
    let trait_name = builder.name_expr("Trait2");
    let t_decl = builder.decl(
        "T",
        scope,
        true,
        DeclKind::Product { generic_params: vec![], members: vec![foo_impl, bar_impl], conformances: vec![trait_name] },
    );

    let (program, interner) = builder.into_parts();
    let mut checker = Checker::new(&program, &interner, CheckerOptions::new());

    checker.check(t_decl);
    assert!(checker.diagnostics.is_empty(), "expected no diagnostics, got {:?}", checker.diagnostics.iter().collect::<Vec<_>>());

    let t_instance = checker.arena.nominal(NominalKind::Product, t_decl);
    let canonical_t = checker.canonical(t_instance);

    let conformance = checker
        .relations
        .conformances_of(canonical_t, |_| true)
        .find(|c| c.concept == trait_decl)
        .expect("expected T's conformance to Trait2 to be registered");

    assert_eq!(
        conformance.implementations.get(&foo_req),
        Some(&Implementation::Concrete(foo_impl)),
        "foo's requirement should bind to T's own foo"
    );
    assert_eq!(
        conformance.implementations.get(&bar_req),
        Some(&Implementation::Concrete(bar_impl)),
        "bar's requirement should bind to T's own bar, not foo's cached lookup result"
    );
}
