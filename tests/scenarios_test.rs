//! End-to-end scenarios S1-S6.

use cxxhdr::ast::{AccessSpecifier, ClassKey, Declaration, NameSegment, TemplateParameterKind, TypeKind};
use cxxhdr::{parse, Options};

fn declarations(source: &str) -> Vec<Declaration> {
    parse("t.h", source, Options::default()).unwrap().0.declarations
}

/// S1: `int x = 3;` -> one global `Variable`.
#[test]
fn s1_simple_initialized_variable() {
    let decls = declarations("int x = 3;");
    assert_eq!(decls.len(), 1);
    let Declaration::Variable(v) = &decls[0] else { panic!("expected variable") };
    assert!(matches!(&v.type_.kind, TypeKind::Fundamental(s) if s == "int"));
    assert_eq!(v.name, "x");
    let init = v.initializer_tokens.as_ref().unwrap();
    assert_eq!(init.iter().map(|t| t.spelling.as_str()).collect::<Vec<_>>(), vec!["3"]);
}

/// S2: `namespace a { struct B { int m; }; }` -> namespace a / struct B (public) / member m: int.
#[test]
fn s2_namespace_containing_public_struct() {
    let decls = declarations("namespace a { struct B { int m; }; }");
    let Declaration::Namespace { name, body, .. } = &decls[0] else { panic!("expected namespace") };
    assert_eq!(name.as_ref().unwrap().last_identifier(), Some("a"));
    let Declaration::Class { key, name: class_name, body: members, .. } = &body[0] else {
        panic!("expected class")
    };
    assert_eq!(*key, ClassKey::Struct);
    assert_eq!(class_name.as_ref().unwrap().last_identifier(), Some("B"));
    let Declaration::Variable(m) = &members[0] else { panic!("expected variable") };
    assert_eq!(m.name, "m");
    assert!(matches!(&m.type_.kind, TypeKind::Fundamental(s) if s == "int"));
    assert_eq!(m.access, Some(AccessSpecifier::Public));
}

/// S3: class template `Vec` with a typename and a defaulted non-type parameter;
/// member `data` is `T[N]` with public access.
#[test]
fn s3_class_template_with_array_member() {
    let decls = declarations("template<typename T, int N = 4> class Vec { public: T data[N]; };");
    let Declaration::Class { template, body, .. } = &decls[0] else { panic!("expected class") };
    let params = &template.as_ref().unwrap().parameters;
    assert_eq!(params.len(), 2);
    assert!(matches!(&params[0].kind, TemplateParameterKind::Type { name: Some(n), .. } if n == "T"));
    match &params[1].kind {
        TemplateParameterKind::NonType { name: Some(n), default, .. } => {
            assert_eq!(n, "N");
            let default_tokens = default.as_ref().unwrap();
            assert_eq!(default_tokens[0].spelling, "4");
        }
        other => panic!("expected non-type parameter, got {other:?}"),
    }

    let Declaration::Variable(data) = &body[0] else { panic!("expected variable") };
    assert_eq!(data.name, "data");
    assert_eq!(data.access, Some(AccessSpecifier::Public));
    match &data.type_.kind {
        TypeKind::Array { inner, size_tokens } => {
            assert!(matches!(&inner.kind, TypeKind::Named { name, .. } if name.last_identifier() == Some("T")));
            assert_eq!(size_tokens.as_ref().unwrap()[0].spelling, "N");
        }
        other => panic!("expected array type, got {other:?}"),
    }
}

/// S4: `int f(int x, const char* s = "hi") noexcept;`
#[test]
fn s4_function_with_default_argument_and_bare_noexcept() {
    let decls = declarations(r#"int f(int x, const char* s = "hi") noexcept;"#);
    let Declaration::Function(f) = &decls[0] else { panic!("expected function") };
    assert_eq!(f.name.last_identifier(), Some("f"));
    assert!(matches!(&f.return_type.as_ref().unwrap().kind, TypeKind::Fundamental(s) if s == "int"));
    assert_eq!(f.parameters.len(), 2);
    assert_eq!(f.parameters[0].name.as_deref(), Some("x"));
    assert_eq!(f.parameters[1].name.as_deref(), Some("s"));
    let default = f.parameters[1].default_value_tokens.as_ref().unwrap();
    assert!(default.iter().any(|t| t.spelling.contains("hi")));
    assert!(matches!(f.noexcept, cxxhdr::ast::NoexceptSpec::Bare));
}

/// S5: `struct A : public B<int>, virtual C {};`
#[test]
fn s5_struct_with_explicit_and_implicit_public_bases() {
    let decls = declarations("struct A : public B<int>, virtual C {};");
    let Declaration::Class { bases, .. } = &decls[0] else { panic!("expected class") };
    assert_eq!(bases.len(), 2);

    assert_eq!(bases[0].access, AccessSpecifier::Public);
    assert!(!bases[0].is_virtual);
    match &bases[0].type_.kind {
        TypeKind::Named { name, .. } => {
            let NameSegment::TemplateId { name, .. } = name.segments.last().unwrap() else {
                panic!("expected template-id base")
            };
            assert_eq!(name, "B");
        }
        other => panic!("expected named type, got {other:?}"),
    }

    // A struct's bases default to public access when no access-specifier keyword is given.
    assert_eq!(bases[1].access, AccessSpecifier::Public);
    assert!(bases[1].is_virtual);
    assert!(matches!(&bases[1].type_.kind, TypeKind::Named { name, .. } if name.last_identifier() == Some("C")));
}

/// S6: `enum class E : unsigned char { a, b = 2, c };`
#[test]
fn s6_scoped_enum_with_underlying_type_and_explicit_value() {
    let decls = declarations("enum class E : unsigned char { a, b = 2, c };");
    let Declaration::Enum { name, is_scoped, underlying_type, enumerators, .. } = &decls[0] else {
        panic!("expected enum")
    };
    assert_eq!(name.as_ref().unwrap().last_identifier(), Some("E"));
    assert!(is_scoped);
    assert!(matches!(
        &underlying_type.as_ref().unwrap().kind,
        TypeKind::Fundamental(s) if s == "unsigned char"
    ));
    assert_eq!(enumerators.len(), 3);
    assert_eq!(enumerators[0].name, "a");
    assert!(enumerators[0].value_tokens.is_none());
    assert_eq!(enumerators[1].name, "b");
    assert_eq!(enumerators[1].value_tokens.as_ref().unwrap()[0].spelling, "2");
    assert_eq!(enumerators[2].name, "c");
    assert!(enumerators[2].value_tokens.is_none());
}
