//! Lexer-level behavior exercised through the public parse entry point:
//! spelling fidelity, literal handling, and comment/doc-comment retention
//! survive into the declarations the lexer's tokens end up forming.

use cxxhdr::{parse, Options};

fn parse_ok(source: &str) -> cxxhdr::Ast {
    parse("t.h", source, Options::default()).unwrap().0
}

#[test]
fn digit_separators_are_preserved_in_initializer_tokens() {
    let ast = parse_ok("int x = 1'000'000;");
    let cxxhdr::ast::Declaration::Variable(v) = &ast.declarations[0] else { panic!("expected variable") };
    let tokens = v.initializer_tokens.as_ref().unwrap();
    assert!(tokens.iter().any(|t| t.spelling == "1'000'000"));
}

#[test]
fn user_defined_literal_suffix_is_kept_on_the_number_token() {
    let ast = parse_ok("int x = 5_km;");
    let cxxhdr::ast::Declaration::Variable(v) = &ast.declarations[0] else { panic!("expected variable") };
    let tokens = v.initializer_tokens.as_ref().unwrap();
    assert!(tokens.iter().any(|t| t.spelling == "5_km"));
}

#[test]
fn raw_string_body_round_trips_through_initializer_tokens() {
    let ast = parse_ok(r####"const char *s = R"(a "quoted" thing)";"####);
    let cxxhdr::ast::Declaration::Variable(v) = &ast.declarations[0] else { panic!("expected variable") };
    let tokens = v.initializer_tokens.as_ref().unwrap();
    assert!(tokens.iter().any(|t| t.spelling.contains("a \"quoted\" thing")));
}

#[test]
fn adjacent_string_literals_concatenate_into_one_token() {
    let ast = parse_ok(r#"const char *s = "foo" "bar";"#);
    let cxxhdr::ast::Declaration::Variable(v) = &ast.declarations[0] else { panic!("expected variable") };
    let tokens = v.initializer_tokens.as_ref().unwrap();
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].spelling.contains("foo"));
    assert!(tokens[0].spelling.contains("bar"));
}

#[test]
fn line_and_block_comments_do_not_appear_in_token_text() {
    let ast = parse_ok("int x /* a comment */ = 1; // trailing\n");
    let cxxhdr::ast::Declaration::Variable(v) = &ast.declarations[0] else { panic!("expected variable") };
    assert_eq!(v.name, "x");
}

#[test]
fn doxygen_comment_is_retained_as_a_pending_doc_when_enabled() {
    // Retention is plumbed through the lexer's checkpoint/take_pending_docs
    // path; here we only assert the declaration following the doc comment
    // still parses cleanly (the doc text itself isn't surfaced in the AST).
    let ast = parse_ok("/// Does a thing.\nint compute();");
    assert_eq!(ast.declarations.len(), 1);
}

#[test]
fn shift_right_operator_lexes_as_a_single_token_outside_templates() {
    let ast = parse_ok("int x = 4 >> 1;");
    let cxxhdr::ast::Declaration::Variable(v) = &ast.declarations[0] else { panic!("expected variable") };
    let tokens = v.initializer_tokens.as_ref().unwrap();
    assert!(tokens.iter().any(|t| t.spelling == ">>"));
}

#[test]
fn preprocessor_line_between_declarations_is_retained_by_default() {
    let ast = parse_ok("#pragma once\nint x;");
    assert!(matches!(ast.declarations[0], cxxhdr::ast::Declaration::PragmaOrIncludeLine { .. }));
    assert!(matches!(ast.declarations[1], cxxhdr::ast::Declaration::Variable(_)));
}

#[test]
fn preprocessor_line_is_dropped_when_option_disables_it() {
    let mut options = Options::default();
    options.preprocessor_lines = cxxhdr::PreprocessorLines::Ignore;
    let (ast, _) = parse("t.h", "#include <vector>\nint x;", options).unwrap();
    assert_eq!(ast.declarations.len(), 1);
    assert!(matches!(ast.declarations[0], cxxhdr::ast::Declaration::Variable(_)));
}
