//! An empty product conforming to `Movable` with no explicit `init`/
//! `assign` members: both requirements, plus the implied `Destroy`
//! hookup, get synthesized — §8 scenario 6.

use lucent_ast::{DeclKind, FunctionLikeDecl, ProgramBuilder};
use lucent_common::CheckerOptions;
use lucent_sema::{Checker, SynthesizedKind};

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
fn an_empty_product_conforming_to_movable_synthesizes_init_assign_and_destroy() {
    let mut builder = ProgramBuilder::new("main");
    let scope = builder.module_scope();

    let init_req = empty_function("init", &mut builder, scope);
    let assign_req = empty_function("assign", &mut builder, scope);
    let movable = builder.decl(
        "Movable",
        scope,
        true,
        DeclKind::Trait { generic_params: vec![], requirements: vec![init_req, assign_req], refinements: vec![] },
    );

    let movable_name = builder.name_expr("Movable");
    let p_decl = builder.decl("P", scope, true, DeclKind::Product { generic_params: vec![], members: vec![], conformances: vec![movable_name] });

    let (mut program, interner) = builder.into_parts();
    program.core_library.movable_trait = Some(movable);

    let mut checker = Checker::new(&program, &interner, CheckerOptions::new());
    checker.check(p_decl);

    assert!(checker.diagnostics.is_empty(), "expected no diagnostics, got {:?}", checker.diagnostics.iter().collect::<Vec<_>>());

    let module = program.modules().next().unwrap().id;
    let synthesized = checker.props.synthesized_decls(module);
    assert_eq!(synthesized.len(), 3, "expected init, assign, and the implied destroy, got {synthesized:?}");
    assert!(synthesized.iter().any(|s| s.kind == SynthesizedKind::MoveInitialize));
    assert!(synthesized.iter().any(|s| s.kind == SynthesizedKind::MoveAssign));
    assert!(synthesized.iter().any(|s| s.kind == SynthesizedKind::Destroy));
}
