//! Type Parser coverage: pointers, references, arrays, function types,
//! template-ids, and the `>>` closing-bracket split, observed through the
//! `Type` trees attached to parsed variable/function declarations.

use cxxhdr::ast::{Declaration, NameSegment, TypeKind};
use cxxhdr::{parse, Options};

fn first_decl(source: &str) -> Declaration {
    parse("t.h", source, Options::default()).unwrap().0.declarations.into_iter().next().unwrap()
}

#[test]
fn pointer_to_const_int_nests_pointer_over_fundamental() {
    let Declaration::Variable(v) = first_decl("const int *p;") else { panic!("expected variable") };
    match &v.type_.kind {
        TypeKind::Pointer(inner) => {
            assert!(inner.cv.is_const);
            assert!(matches!(&inner.kind, TypeKind::Fundamental(s) if s == "int"));
        }
        other => panic!("expected pointer, got {other:?}"),
    }
}

#[test]
fn lvalue_reference_to_named_type() {
    let Declaration::Variable(v) = first_decl("Widget &w;") else { panic!("expected variable") };
    match &v.type_.kind {
        TypeKind::Reference { kind, .. } => assert_eq!(*kind, cxxhdr::ast::RefKind::Lvalue),
        other => panic!("expected reference, got {other:?}"),
    }
}

#[test]
fn rvalue_reference_is_distinguished_from_lvalue() {
    let Declaration::Variable(v) = first_decl("Widget &&w;") else { panic!("expected variable") };
    match &v.type_.kind {
        TypeKind::Reference { kind, .. } => assert_eq!(*kind, cxxhdr::ast::RefKind::Rvalue),
        other => panic!("expected reference, got {other:?}"),
    }
}

#[test]
fn array_of_int_carries_size_tokens() {
    let Declaration::Variable(v) = first_decl("int a[10];") else { panic!("expected variable") };
    match &v.type_.kind {
        TypeKind::Array { size_tokens, .. } => {
            let toks = size_tokens.as_ref().unwrap();
            assert_eq!(toks.len(), 1);
            assert_eq!(toks[0].spelling, "10");
        }
        other => panic!("expected array, got {other:?}"),
    }
}

#[test]
fn unbounded_array_has_no_size_tokens() {
    let Declaration::Variable(v) = first_decl("extern int a[];") else { panic!("expected variable") };
    match &v.type_.kind {
        TypeKind::Array { size_tokens, .. } => assert!(size_tokens.is_none()),
        other => panic!("expected array, got {other:?}"),
    }
}

#[test]
fn function_pointer_variable_captures_parameter_list() {
    let Declaration::Variable(v) = first_decl("int (*fp)(int, char);") else { panic!("expected variable") };
    match &v.type_.kind {
        TypeKind::Pointer(inner) => match &inner.kind {
            TypeKind::Function(ft) => assert_eq!(ft.parameters.len(), 2),
            other => panic!("expected function type, got {other:?}"),
        },
        other => panic!("expected pointer, got {other:?}"),
    }
}

#[test]
fn member_pointer_type_records_class_and_pointee() {
    let Declaration::Variable(v) = first_decl("int Widget::*mp;") else { panic!("expected variable") };
    assert!(matches!(&v.type_.kind, TypeKind::MemberPointer { .. }));
}

#[test]
fn auto_and_decltype_auto_are_distinct_kinds() {
    let Declaration::Variable(v) = first_decl("auto x = 1;") else { panic!("expected variable") };
    assert!(matches!(v.type_.kind, TypeKind::Auto));

    let Declaration::Variable(v) = first_decl("decltype(auto) y = f();") else { panic!("expected variable") };
    assert!(matches!(v.type_.kind, TypeKind::DecltypeAuto));
}

#[test]
fn decltype_of_expression_captures_its_tokens() {
    let Declaration::Variable(v) = first_decl("decltype(x + y) z;") else { panic!("expected variable") };
    match &v.type_.kind {
        TypeKind::Decltype(toks) => assert!(toks.iter().any(|t| t.spelling == "x")),
        other => panic!("expected decltype, got {other:?}"),
    }
}

#[test]
fn template_id_type_argument_is_parsed_as_a_nested_type() {
    let Declaration::Variable(v) = first_decl("std::vector<int> v;") else { panic!("expected variable") };
    match &v.type_.kind {
        TypeKind::Named { name, .. } => match name.segments.last().unwrap() {
            NameSegment::TemplateId { name, arguments } => {
                assert_eq!(name, "vector");
                assert_eq!(arguments.len(), 1);
            }
            other => panic!("expected template-id segment, got {other:?}"),
        },
        other => panic!("expected named type, got {other:?}"),
    }
}

#[test]
fn nested_template_ids_split_the_double_angle_bracket() {
    // `>>` at the close of `vector<vector<int>>` must split into two `>`
    // rather than lexing as a single shift-right token.
    let decl = first_decl("std::vector<std::vector<int>> grid;");
    let Declaration::Variable(v) = decl else { panic!("expected variable") };
    match &v.type_.kind {
        TypeKind::Named { name, .. } => {
            let NameSegment::TemplateId { arguments, .. } = name.segments.last().unwrap() else {
                panic!("expected template-id");
            };
            assert_eq!(arguments.len(), 1);
        }
        other => panic!("expected named type, got {other:?}"),
    }
}

#[test]
fn non_type_template_argument_falls_back_to_expression_tokens() {
    let Declaration::Variable(v) = first_decl("std::array<int, 4> a;") else { panic!("expected variable") };
    match &v.type_.kind {
        TypeKind::Named { name, .. } => {
            let NameSegment::TemplateId { arguments, .. } = name.segments.last().unwrap() else {
                panic!("expected template-id");
            };
            assert_eq!(arguments.len(), 2);
            assert!(matches!(arguments[1], cxxhdr::ast::TemplateArgument::Expression(_)));
        }
        other => panic!("expected named type, got {other:?}"),
    }
}

#[test]
fn elaborated_struct_specifier_is_recorded_on_the_named_type() {
    let Declaration::Variable(v) = first_decl("struct Point p;") else { panic!("expected variable") };
    match &v.type_.kind {
        TypeKind::Named { elaborated, .. } => {
            assert_eq!(*elaborated, Some(cxxhdr::ast::ElaboratedKey::Struct));
        }
        other => panic!("expected named type, got {other:?}"),
    }
}

#[test]
fn trailing_return_type_is_parsed_in_trailing_return_context() {
    let Declaration::Function(f) = first_decl("auto f() -> int;") else { panic!("expected function") };
    assert!(matches!(f.trailing_return.as_ref().unwrap().kind, TypeKind::Fundamental(ref s) if s == "int"));
}
