//! Declaration Parser coverage: namespaces, classes, enums, templates,
//! using/typedef, friend, static_assert, and extern blocks.

use cxxhdr::ast::{AccessSpecifier, ClassKey, Declaration};
use cxxhdr::{parse, Options};

fn declarations(source: &str) -> Vec<Declaration> {
    parse("t.h", source, Options::default()).unwrap().0.declarations
}

#[test]
fn nested_namespace_shorthand_produces_one_nested_namespace_per_segment() {
    let decls = declarations("namespace a::b { int x; }");
    let Declaration::Namespace { name, body, .. } = &decls[0] else { panic!("expected namespace") };
    assert_eq!(name.as_ref().unwrap().last_identifier(), Some("a"));
    let Declaration::Namespace { name: inner_name, body: inner_body, .. } = &body[0] else {
        panic!("expected nested namespace")
    };
    assert_eq!(inner_name.as_ref().unwrap().last_identifier(), Some("b"));
    assert_eq!(inner_body.len(), 1);
}

#[test]
fn unnamed_namespace_has_no_name() {
    let decls = declarations("namespace { int x; }");
    let Declaration::Namespace { name, .. } = &decls[0] else { panic!("expected namespace") };
    assert!(name.is_none());
}

#[test]
fn class_members_default_to_private_access() {
    let decls = declarations("class C { int m; };");
    let Declaration::Class { body, .. } = &decls[0] else { panic!("expected class") };
    assert_eq!(body[0].access(), Some(AccessSpecifier::Private));
}

#[test]
fn struct_members_default_to_public_access() {
    let decls = declarations("struct S { int m; };");
    let Declaration::Class { body, key, .. } = &decls[0] else { panic!("expected class") };
    assert_eq!(*key, ClassKey::Struct);
    assert_eq!(body[0].access(), Some(AccessSpecifier::Public));
}

#[test]
fn access_label_changes_access_for_subsequent_members() {
    let decls = declarations("class C { int a; public: int b; private: int c; };");
    let Declaration::Class { body, .. } = &decls[0] else { panic!("expected class") };
    assert_eq!(body[0].access(), Some(AccessSpecifier::Private));
    assert_eq!(body[1].access(), Some(AccessSpecifier::Public));
    assert_eq!(body[2].access(), Some(AccessSpecifier::Private));
}

#[test]
fn forward_declared_class_has_no_body_and_is_marked_forward() {
    let decls = declarations("class Widget;");
    let Declaration::Class { is_forward, body, name, .. } = &decls[0] else { panic!("expected class") };
    assert!(is_forward);
    assert!(body.is_empty());
    assert_eq!(name.as_ref().unwrap().last_identifier(), Some("Widget"));
}

#[test]
fn class_with_virtual_base_records_access_and_virtual_flag() {
    let decls = declarations("class D : public virtual B {};");
    let Declaration::Class { bases, .. } = &decls[0] else { panic!("expected class") };
    assert_eq!(bases.len(), 1);
    assert_eq!(bases[0].access, AccessSpecifier::Public);
    assert!(bases[0].is_virtual);
}

#[test]
fn final_class_sets_is_final() {
    let decls = declarations("class Sealed final {};");
    let Declaration::Class { is_final, .. } = &decls[0] else { panic!("expected class") };
    assert!(is_final);
}

#[test]
fn anonymous_union_member_has_no_name() {
    let decls = declarations("struct S { union { int i; float f; }; };");
    let Declaration::Class { body, .. } = &decls[0] else { panic!("expected class") };
    let Declaration::Class { name, key, .. } = &body[0] else { panic!("expected nested union") };
    assert!(name.is_none());
    assert_eq!(*key, ClassKey::Union);
}

#[test]
fn bitfield_without_a_declarator_name_is_an_unnamed_padding_member() {
    let decls = declarations("struct S { int a : 3; int : 5; int b : 2; };");
    let Declaration::Class { body, .. } = &decls[0] else { panic!("expected class") };
    let Declaration::Variable(padding) = &body[1] else { panic!("expected variable") };
    assert!(padding.name.is_empty());
    assert!(padding.bitfield_width.is_some());
}

#[test]
fn scoped_enum_with_underlying_type_is_recorded() {
    let decls = declarations("enum class Color : unsigned char { Red, Green, Blue };");
    let Declaration::Enum { is_scoped, underlying_type, enumerators, .. } = &decls[0] else {
        panic!("expected enum")
    };
    assert!(is_scoped);
    assert!(underlying_type.is_some());
    assert_eq!(enumerators.len(), 3);
}

#[test]
fn plain_enum_has_no_underlying_type_by_default() {
    let decls = declarations("enum Direction { North, South };");
    let Declaration::Enum { is_scoped, underlying_type, .. } = &decls[0] else { panic!("expected enum") };
    assert!(!is_scoped);
    assert!(underlying_type.is_none());
}

#[test]
fn class_template_with_non_type_default_parameter() {
    let decls = declarations("template<typename T, int N = 16> class Vec {};");
    let Declaration::Class { template, .. } = &decls[0] else { panic!("expected class") };
    let params = &template.as_ref().unwrap().parameters;
    assert_eq!(params.len(), 2);
    match &params[1].kind {
        cxxhdr::ast::TemplateParameterKind::NonType { default, .. } => assert!(default.is_some()),
        other => panic!("expected non-type parameter, got {other:?}"),
    }
}

#[test]
fn variadic_template_parameter_pack_is_flagged() {
    let decls = declarations("template<typename... Ts> class Tuple {};");
    let Declaration::Class { template, .. } = &decls[0] else { panic!("expected class") };
    assert!(template.as_ref().unwrap().parameters[0].is_pack);
}

#[test]
fn using_alias_declaration_records_the_aliased_type() {
    let decls = declarations("using IntPtr = int*;");
    let Declaration::Using { name, type_, .. } = &decls[0] else { panic!("expected using alias") };
    assert_eq!(name, "IntPtr");
    assert!(matches!(type_.kind, cxxhdr::ast::TypeKind::Pointer(_)));
}

#[test]
fn typedef_declaration_records_name_and_type() {
    let decls = declarations("typedef unsigned long size_type;");
    let Declaration::Typedef { name, .. } = &decls[0] else { panic!("expected typedef") };
    assert_eq!(name, "size_type");
}

#[test]
fn using_namespace_directive_is_distinguished_from_using_declaration() {
    let decls = declarations("using namespace std; using std::vector;");
    assert!(matches!(decls[0], Declaration::UsingDirective { .. }));
    assert!(matches!(decls[1], Declaration::UsingDeclaration { .. }));
}

#[test]
fn friend_class_declaration_is_parsed() {
    let decls = declarations("class A { friend class B; };");
    let Declaration::Class { body, .. } = &decls[0] else { panic!("expected class") };
    let Declaration::Friend { target, .. } = &body[0] else { panic!("expected friend") };
    assert!(matches!(target, cxxhdr::ast::FriendTarget::Class(_)));
}

#[test]
fn static_assert_with_message_captures_both_token_runs() {
    let decls = declarations(r#"static_assert(sizeof(int) == 4, "int must be 4 bytes");"#);
    let Declaration::StaticAssert { expression_tokens, message_tokens, .. } = &decls[0] else {
        panic!("expected static_assert")
    };
    assert!(!expression_tokens.is_empty());
    assert!(message_tokens.is_some());
}

#[test]
fn static_assert_without_message_has_no_message_tokens() {
    let decls = declarations("static_assert(true);");
    let Declaration::StaticAssert { message_tokens, .. } = &decls[0] else { panic!("expected static_assert") };
    assert!(message_tokens.is_none());
}

#[test]
fn extern_c_block_wraps_its_body_declarations() {
    let decls = declarations(r#"extern "C" { void c_function(int x); }"#);
    let Declaration::ExternBlock { linkage, body, .. } = &decls[0] else { panic!("expected extern block") };
    assert_eq!(linkage, "C");
    assert_eq!(body.len(), 1);
}

#[test]
fn function_with_noexcept_and_default_argument() {
    let decls = declarations("void f(int x = 3) noexcept;");
    let Declaration::Function(f) = &decls[0] else { panic!("expected function") };
    assert!(matches!(f.noexcept, cxxhdr::ast::NoexceptSpec::Bare));
    assert!(f.parameters[0].default_value_tokens.is_some());
}

#[test]
fn pure_virtual_member_function_sets_is_pure() {
    let decls = declarations("struct I { virtual void run() = 0; };");
    let Declaration::Class { body, .. } = &decls[0] else { panic!("expected class") };
    let Declaration::Function(f) = &body[0] else { panic!("expected function") };
    assert!(f.is_virtual);
    assert!(f.is_pure);
}

#[test]
fn constructor_with_member_initializer_list_is_classified_correctly() {
    let decls = declarations("struct Point { Point() : x(0), y(0) {} int x; int y; };");
    let Declaration::Class { body, .. } = &decls[0] else { panic!("expected class") };
    let Declaration::Function(ctor) = &body[0] else { panic!("expected function") };
    assert_eq!(ctor.kind, cxxhdr::ast::FunctionKind::Constructor);
    assert_eq!(ctor.member_initializers.len(), 2);
}
