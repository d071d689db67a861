//! `fun f(x: Int)`, `fun f(y: Int)`; `f(x: 1)` — §8 scenario 3.

use lucent_ast::{
    AccessEffect, Argument, DeclKind, ExprKind, FunctionBody, FunctionLikeDecl, LiteralKind, ParameterConvention,
    ParameterDecl, ProgramBuilder,
};
use lucent_common::{CheckerOptions, Span};
use lucent_sema::{Checker, DeclReference};

fn int_param(builder: &mut ProgramBuilder, label: &str) -> ParameterDecl {
    let name = builder.intern(label);
    ParameterDecl { label: Some(name), name: Some(name), annotation: None, convention: ParameterConvention::Let, span: Span::dummy() }
}

#[test]
fn call_with_a_label_picks_the_uniquely_matching_overload() {
    let mut builder = ProgramBuilder::new("main");
    let scope = builder.module_scope();

    let f_x = builder.decl(
        "f",
        scope,
        true,
        DeclKind::Function(FunctionLikeDecl {
            generic_params: vec![],
            explicit_captures: vec![],
            parameters: vec![int_param(&mut builder, "x")],
            receiver_effect: None,
            return_annotation: None,
            body: None,
        }),
    );
    let _f_y = builder.decl(
        "f",
        scope,
        true,
        DeclKind::Function(FunctionLikeDecl {
            generic_params: vec![],
            explicit_captures: vec![],
            parameters: vec![int_param(&mut builder, "y")],
            receiver_effect: None,
            return_annotation: None,
            body: None,
        }),
    );

    let x_label = builder.intern("x");
    let one = builder.expr(ExprKind::Literal(LiteralKind::Integer(1)));
    let callee = builder.name_expr("f");
    let call = builder.expr(ExprKind::Call { callee, arguments: vec![Argument { label: Some(x_label), value: one }] });

    let caller = builder.decl(
        "caller",
        scope,
        true,
        DeclKind::Function(FunctionLikeDecl {
            generic_params: vec![],
            explicit_captures: vec![],
            parameters: vec![],
            receiver_effect: None,
            return_annotation: None,
            body: Some(FunctionBody::SingleExpression(call)),
        }),
    );

    let (program, interner) = builder.into_parts();
    let mut checker = Checker::new(&program, &interner, CheckerOptions::new());
    checker.check(caller);

    assert!(checker.diagnostics.is_empty(), "expected no diagnostics, got {:?}", checker.diagnostics.iter().collect::<Vec<_>>());
    match checker.props.referred_decl(call) {
        Some(DeclReference::Direct { decl, .. }) => assert_eq!(*decl, f_x),
        other => panic!("expected call to resolve to a direct reference, got {other:?}"),
    }
}
