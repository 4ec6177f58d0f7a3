//! Scope-stack-driven type/expression disambiguation (spec §4.4, §9),
//! observed through how the same token sequence parses differently
//! depending on what's already known to be a type.

use cxxhdr::ast::{Declaration, TypeKind};
use cxxhdr::{parse, Options};

#[test]
fn known_type_names_option_makes_an_external_identifier_resolve_as_a_type() {
    let mut options = Options::default();
    options.known_type_names.insert("Widget".to_string());
    let (ast, _) = parse("t.h", "Widget *p;", options).unwrap();
    let Declaration::Variable(v) = &ast.declarations[0] else { panic!("expected variable") };
    assert!(matches!(v.type_.kind, TypeKind::Pointer(_)));
}

#[test]
fn forward_declared_class_becomes_a_known_type_for_later_declarations_in_scope() {
    let (ast, _) = parse("t.h", "class Widget; Widget *p;", Options::default()).unwrap();
    assert_eq!(ast.declarations.len(), 2);
    let Declaration::Variable(v) = &ast.declarations[1] else { panic!("expected variable") };
    match &v.type_.kind {
        TypeKind::Pointer(inner) => {
            assert!(matches!(&inner.kind, TypeKind::Named { .. }));
        }
        other => panic!("expected pointer to named type, got {other:?}"),
    }
}

#[test]
fn class_declared_inside_a_namespace_is_visible_to_sibling_declarations_in_that_namespace() {
    let (ast, _) = parse(
        "t.h",
        "namespace n { class Inner; Inner value; }",
        Options::default(),
    )
    .unwrap();
    let Declaration::Namespace { body, .. } = &ast.declarations[0] else { panic!("expected namespace") };
    assert_eq!(body.len(), 2);
    let Declaration::Variable(v) = &body[1] else { panic!("expected variable") };
    assert!(matches!(v.type_.kind, TypeKind::Named { .. }));
}

#[test]
fn class_member_type_is_visible_within_its_own_body() {
    // A nested class used by name inside the enclosing class body relies on
    // the enclosing class scope (and its own declared members) being on the
    // scope-stack search path.
    let (ast, _) = parse(
        "t.h",
        "struct Outer { struct Inner; Inner *p; };",
        Options::default(),
    )
    .unwrap();
    let Declaration::Class { body, .. } = &ast.declarations[0] else { panic!("expected class") };
    let Declaration::Variable(v) = &body[1] else { panic!("expected variable") };
    assert!(matches!(v.type_.kind, TypeKind::Pointer(_)));
}

#[test]
fn template_parameter_name_is_a_known_type_inside_the_template_body() {
    let (ast, _) = parse(
        "t.h",
        "template<typename T> struct Box { T *value; };",
        Options::default(),
    )
    .unwrap();
    let Declaration::Class { body, .. } = &ast.declarations[0] else { panic!("expected class") };
    let Declaration::Variable(v) = &body[0] else { panic!("expected variable") };
    assert!(matches!(v.type_.kind, TypeKind::Pointer(_)));
}
