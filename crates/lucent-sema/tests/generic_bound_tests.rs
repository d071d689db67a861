//! `type Box<T>`; the expression `Box<Int>` — §8 scenario 4.

use lucent_ast::{DeclKind, ExprKind, GenericParamDecl, NameComponent, ProgramBuilder};
use lucent_common::{CheckerOptions, Span};
use lucent_sema::{Checker, ResolutionResult};
use lucent_ty::{GenericArgument, TypeKind};

#[test]
fn a_generic_argument_list_binds_the_type_parameter_to_a_bound_generic() {
    let mut builder = ProgramBuilder::new("main");
    let scope = builder.module_scope();

    let int_decl = builder.decl("Int", scope, true, DeclKind::Product { generic_params: vec![], members: vec![], conformances: vec![] });
    let t_param = builder.decl_unnamed(scope, DeclKind::GenericParameter(GenericParamDecl { annotations: vec![] }));
    let box_decl = builder.decl(
        "Box",
        scope,
        true,
        DeclKind::Product { generic_params: vec![t_param], members: vec![], conformances: vec![] },
    );

    let int_name = builder.name_expr("Int");
    let box_applied = builder.expr(ExprKind::Name(NameComponent { name: builder.intern("Box"), generic_args: vec![int_name], span: Span::dummy() }));

    let (program, interner) = builder.into_parts();
    let mut checker = Checker::new(&program, &interner, CheckerOptions::new());

    let resolved = match checker.resolve_name_expression(box_applied, scope) {
        ResolutionResult::Done { resolved, .. } => resolved,
        ResolutionResult::Inexecutable { .. } => panic!("expected resolution to complete, got Inexecutable"),
        ResolutionResult::Failed => panic!("expected resolution to complete, got Failed"),
    };
    let candidate = resolved.viable().next().expect("Box<Int> should resolve to a viable candidate");

    let TypeKind::Metatype(inner) = checker.arena.kind(candidate.ty).clone() else {
        panic!("expected Box<Int> to resolve to a Metatype");
    };
    let TypeKind::BoundGeneric { base, arguments } = checker.arena.kind(inner).clone() else {
        panic!("expected the metatype to wrap a BoundGeneric");
    };
    let TypeKind::Nominal { decl, .. } = checker.arena.kind(base).clone() else {
        panic!("expected the bound generic's base to be Box's nominal type");
    };
    assert_eq!(decl, box_decl);
    assert_eq!(arguments.len(), 1);
    match arguments.get(&t_param) {
        Some(GenericArgument::Type(bound)) => {
            let int_instance = checker.arena.nominal(lucent_ty::NominalKind::Product, int_decl);
            assert_eq!(*bound, int_instance);
        }
        other => panic!("expected T to be bound to a type argument, got {other:?}"),
    }
}
