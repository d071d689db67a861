//! A single-expression body whose only statement diverges (calls a
//! `Never`-returning function) satisfies any declared return type
//! through the disjunction's penalty-1 branch — §8 scenario 1.

use lucent_ast::{Argument, DeclKind, ExprKind, FunctionBody, FunctionLikeDecl, ProgramBuilder};
use lucent_common::CheckerOptions;
use lucent_sema::Checker;

#[test]
fn a_diverging_single_expression_body_satisfies_any_declared_return_type() {
    let mut builder = ProgramBuilder::new("main");
    let scope = builder.module_scope();

    let _int_decl = builder.decl("Int", scope, true, DeclKind::Product { generic_params: vec![], members: vec![], conformances: vec![] });

    let never_name = builder.name_expr("Never");
    let fatal = builder.decl(
        "fatalError",
        scope,
        true,
        DeclKind::Function(FunctionLikeDecl {
            generic_params: vec![],
            explicit_captures: vec![],
            parameters: vec![],
            receiver_effect: None,
            return_annotation: Some(never_name),
            body: None,
        }),
    );

    let callee = builder.name_expr("fatalError");
    let call = builder.expr(ExprKind::Call { callee, arguments: Vec::<Argument>::new() });

    let int_name = builder.name_expr("Int");
    let caller = builder.decl(
        "caller",
        scope,
        true,
        DeclKind::Function(FunctionLikeDecl {
            generic_params: vec![],
            explicit_captures: vec![],
            parameters: vec![],
            receiver_effect: None,
            return_annotation: Some(int_name),
            body: Some(FunctionBody::SingleExpression(call)),
        }),
    );

    let (program, interner) = builder.into_parts();
    let mut checker = Checker::new(&program, &interner, CheckerOptions::new());
    checker.check(fatal);
    checker.check(caller);

    assert!(checker.diagnostics.is_empty(), "expected no diagnostics, got {:?}", checker.diagnostics.iter().collect::<Vec<_>>());
    let call_ty = checker.props.expr_type(call).expect("call expression was typed");
    assert!(matches!(checker.arena.kind(call_ty), lucent_ty::TypeKind::Never));
}
