//! `type X = Y; type Y = X` — §8 scenario 2.

use lucent_ast::{DeclKind, ProgramBuilder};
use lucent_common::{CheckerOptions, DiagnosticCode};
use lucent_sema::Checker;

#[test]
fn circular_alias_reports_exactly_one_diagnostic_and_both_sides_are_error() {
    let mut builder = ProgramBuilder::new("main");
    let scope = builder.module_scope();

    let to_y = builder.name_expr("Y");
    let x = builder.decl("X", scope, true, DeclKind::TypeAlias { aliased: to_y });
    let to_x = builder.name_expr("X");
    let y = builder.decl("Y", scope, true, DeclKind::TypeAlias { aliased: to_x });

    let (program, interner) = builder.into_parts();
    let mut checker = Checker::new(&program, &interner, CheckerOptions::new());

    let module = program.modules().next().unwrap().id;
    checker.check_module(module);

    let circular: Vec<_> =
        checker.diagnostics.iter().filter(|d| d.code == DiagnosticCode::CircularDependency).collect();
    assert_eq!(circular.len(), 1, "expected exactly one CircularDependency diagnostic, got {circular:?}");

    let x_ty = checker.props.decl_type(x).expect("X was realized");
    let y_ty = checker.props.decl_type(y).expect("Y was realized");
    assert!(checker.arena.flags(x_ty).has_error());
    assert!(checker.arena.flags(y_ty).has_error());
}
