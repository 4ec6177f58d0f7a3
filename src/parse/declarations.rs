//! Declaration Parser: the main recursive-descent engine (spec §4.3).
//!
//! Dispatches on the leading (non-attribute) token of each top-level or
//! member position to the specialized productions named in the spec:
//! namespaces, using-declarations/directives, classes/structs/unions,
//! enums, templates, `extern` linkage blocks, `static_assert`, friend
//! declarations, access-specifier labels, `#`-lines, and the general
//! decl-specifier-seq + declarator path for everything else.

use crate::ast::{
    AccessSpecifier, Attribute, BaseSpecifier, ClassKey, Declaration, Enumerator, FriendTarget,
    FunctionDecl, FunctionKind, MemberInitializer, NameSegment, QualifiedName, TemplateParameter,
    TemplateParameterKind, TemplateParameterList, Type, TypeKind, VariableDecl,
};
use crate::error::ParseError;
use crate::location::Location;
use crate::options::{ExternTemplateHandling, MethodBody, PreprocessorLines};
use crate::scope::ScopeKind;
use crate::token::{Keyword, Punct, Token, TokenKind};

use super::types::{DeclSpecifierSeq, FunctionShape};
use super::{Parser, TypeContext};

impl<'v> Parser<'v> {
    /// One top-level (or class-member) declaration, or `None` when the
    /// position held only a `#`-line that options say to drop, or a bare
    /// `;` (an empty-declaration, tolerated and ignored).
    pub(crate) fn parse_top_level_declaration(&mut self) -> Result<Option<Declaration>, ParseError> {
        let attrs_before = self.parse_attribute_seq()?;
        let tok = self.tokens.peek0()?.clone();

        if tok.is_punct(Punct::Semi) {
            self.tokens.bump()?;
            return Ok(None);
        }

        if let TokenKind::PPLine = tok.kind {
            self.tokens.bump()?;
            return Ok(match self.options.preprocessor_lines {
                PreprocessorLines::Ignore => None,
                PreprocessorLines::Retain => Some(Declaration::PragmaOrIncludeLine {
                    raw: tok.spelling,
                    location: tok.location,
                }),
            });
        }

        match &tok.kind {
            TokenKind::Keyword(Keyword::Namespace) => self.parse_namespace().map(Some),
            TokenKind::Keyword(Keyword::Using) => self.parse_using().map(Some),
            TokenKind::Keyword(Keyword::Template) => self.parse_template_declaration().map(Some),
            TokenKind::Keyword(Keyword::Static_assert) => self.parse_static_assert().map(Some),
            TokenKind::Keyword(Keyword::Extern) if self.tokens.peek(1)?.is_keyword(Keyword::Template) => {
                self.parse_extern_template_instantiation()
            }
            TokenKind::Keyword(Keyword::Extern) if self.tokens.peek(1)?.kind == TokenKind::StringLit => {
                self.parse_extern_block().map(Some)
            }
            TokenKind::Keyword(Keyword::Public) | TokenKind::Keyword(Keyword::Private) | TokenKind::Keyword(Keyword::Protected)
                if self.tokens.peek(1)?.is_punct(Punct::Colon) =>
            {
                self.apply_access_label()?;
                Ok(None)
            }
            _ => self.parse_general_declaration(attrs_before, None).map(Some),
        }
    }

    /// Parse member declarations up to (and consuming) the matching `}` of
    /// a class/struct/union body. The body's scope must already be active.
    fn parse_member_sequence(&mut self, default_access: AccessSpecifier) -> Result<Vec<Declaration>, ParseError> {
        self.scope.set_current_access(default_access);
        let mut members = Vec::new();
        loop {
            if self.tokens.eat_punct(Punct::RBrace)? {
                return Ok(members);
            }
            match self.parse_top_level_declaration() {
                Ok(Some(mut decl)) => {
                    decl.set_access(self.scope.current_access());
                    members.push(decl);
                }
                Ok(None) => {}
                Err(e) if e.is_recoverable() => {
                    self.diagnostics.push(crate::error::Diagnostic::from(&e));
                    self.tokens.recover_to_next_declaration()?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn apply_access_label(&mut self) -> Result<(), ParseError> {
        let tok = self.tokens.bump()?;
        self.tokens.expect_punct(Punct::Colon)?;
        let access = match tok.kind {
            TokenKind::Keyword(Keyword::Public) => AccessSpecifier::Public,
            TokenKind::Keyword(Keyword::Private) => AccessSpecifier::Private,
            TokenKind::Keyword(Keyword::Protected) => AccessSpecifier::Protected,
            _ => unreachable!("guarded by caller"),
        };
        self.scope.set_current_access(access);
        Ok(())
    }

    // ---- namespaces ---------------------------------------------------

    fn parse_namespace(&mut self) -> Result<Declaration, ParseError> {
        let loc = self.tokens.peek0()?.location.clone();
        self.tokens.bump()?; // `namespace`
        let is_inline = self.tokens.eat_keyword(Keyword::Inline)?;

        if self.tokens.peek0()?.is_punct(Punct::LBrace) {
            // Unnamed namespace.
            self.tokens.bump()?;
            self.scope.enter(ScopeKind::Namespace, None);
            let body = self.parse_namespace_body()?;
            self.scope.exit();
            return Ok(Declaration::Namespace { name: None, is_inline, body, location: loc });
        }

        let first = self.expect_identifier()?;
        // `namespace Alias = Target;`
        if self.tokens.eat_punct(Punct::Eq)? {
            let target = self.parse_qualified_name(false)?;
            self.tokens.expect_punct(Punct::Semi)?;
            return Ok(Declaration::NamespaceAlias { name: first, target, location: loc });
        }

        let mut path = vec![first];
        while self.tokens.eat_punct(Punct::ColonColon)? {
            let _ = self.tokens.eat_keyword(Keyword::Inline)?;
            path.push(self.expect_identifier()?);
        }
        self.tokens.expect_punct(Punct::LBrace)?;

        // Nested `namespace a::b::c { }` opens one scope per path segment
        // so `types_in_scope` lookups inside the body resolve through each
        // level, matching how a real nested-namespace definition behaves.
        let mut qn_segments = Vec::new();
        for seg in &path {
            self.scope.enter(ScopeKind::Namespace, Some(seg.clone()));
            qn_segments.push(NameSegment::Identifier(seg.clone()));
        }
        let body = self.parse_namespace_body()?;
        for _ in &path {
            self.scope.exit();
        }

        let name = QualifiedName { leading_global: false, segments: qn_segments, location: loc.clone() };
        Ok(Declaration::Namespace { name: Some(name), is_inline, body, location: loc })
    }

    fn parse_namespace_body(&mut self) -> Result<Vec<Declaration>, ParseError> {
        let mut body = Vec::new();
        loop {
            if self.tokens.eat_punct(Punct::RBrace)? {
                return Ok(body);
            }
            match self.parse_top_level_declaration() {
                Ok(Some(decl)) => body.push(decl),
                Ok(None) => {}
                Err(e) if e.is_recoverable() => {
                    self.diagnostics.push(crate::error::Diagnostic::from(&e));
                    self.tokens.recover_to_next_declaration()?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    // ---- using ----------------------------------------------------------

    fn parse_using(&mut self) -> Result<Declaration, ParseError> {
        let loc = self.tokens.peek0()?.location.clone();
        self.tokens.bump()?; // `using`

        if self.tokens.eat_keyword(Keyword::Namespace)? {
            let name = self.parse_qualified_name(false)?;
            self.tokens.expect_punct(Punct::Semi)?;
            return Ok(Declaration::UsingDirective { name, access: None, location: loc });
        }

        if self.tokens.eat_keyword(Keyword::Enum)? {
            let name = self.parse_qualified_name(false)?;
            self.tokens.expect_punct(Punct::Semi)?;
            return Ok(Declaration::UsingEnum { name, access: None, location: loc });
        }

        // `using Name = Type;` vs. a plain using-declaration (`using
        // std::vector;` / `using Base::member;`).
        let mark = self.tokens.mark();
        if self.tokens.peek0()?.is_identifier() && self.tokens.peek(1)?.is_punct(Punct::Eq) {
            let name = self.expect_identifier()?;
            self.tokens.expect_punct(Punct::Eq)?;
            let attrs = self.parse_attribute_seq()?;
            let mut type_ = self.parse_type_only(TypeContext::TopLevel)?;
            if type_.attributes.is_empty() {
                type_.attributes = attrs;
            }
            self.tokens.expect_punct(Punct::Semi)?;
            self.scope.declare_type(name.clone());
            return Ok(Declaration::Using { name, type_, template: None, access: None, location: loc });
        }
        self.tokens.rewind(mark);

        let name = self.parse_qualified_name(true)?;
        self.tokens.expect_punct(Punct::Semi)?;
        if let Some(last) = name.last_identifier() {
            self.scope.declare_type(last.to_string());
        }
        Ok(Declaration::UsingDeclaration { name, access: None, location: loc })
    }

    // ---- templates --------------------------------------------------

    /// `template<...>` followed by a class, function, variable, alias, or
    /// concept declaration (spec §4.3). Template template parameters
    /// recurse back into this same production for their own head.
    fn parse_template_declaration(&mut self) -> Result<Declaration, ParseError> {
        let template = self.parse_template_parameter_list()?;
        self.scope.enter(ScopeKind::Template, None);
        for p in &template.parameters {
            if let Some(name) = template_parameter_type_name(p) {
                self.scope.declare_type(name);
            }
        }

        // `template<...> concept Name = requires-expr;` — recorded as an
        // opaque declaration (concepts are modeled as an opaque predicate
        // expression the same way `static_assert` captures one) when
        // `Options::concepts` is enabled.
        if self.tokens.peek0()?.is_keyword(Keyword::Concept) {
            let loc = self.tokens.peek0()?.location.clone();
            self.scope.exit();
            if !self.options.concepts {
                return Err(ParseError::Unsupported { construct: "concept definition".into(), location: loc });
            }
            self.tokens.bump()?;
            let name = self.expect_identifier()?;
            self.tokens.expect_punct(Punct::Eq)?;
            let tokens = self.collect_until_top_level(&[Punct::Semi])?;
            self.tokens.expect_punct(Punct::Semi)?;
            return Ok(Declaration::StaticAssert {
                expression_tokens: tokens,
                message_tokens: Some(vec![Token {
                    kind: TokenKind::Identifier,
                    spelling: name,
                    location: loc.clone(),
                }]),
                access: None,
                location: loc,
            });
        }

        let result = self.parse_general_declaration(Vec::new(), Some(template));
        self.scope.exit();
        result
    }

    /// `template<...>` — a single parameter list, possibly with a trailing
    /// `requires(...)` clause on the template head.
    pub(crate) fn parse_template_parameter_list(&mut self) -> Result<TemplateParameterList, ParseError> {
        let loc = self.tokens.peek0()?.location.clone();
        self.tokens.bump()?; // `template`
        self.tokens.expect_punct(Punct::Lt)?;
        let mut parameters = Vec::new();
        if !self.tokens.peek0()?.is_punct(Punct::Gt) {
            loop {
                parameters.push(self.parse_template_parameter()?);
                if !self.tokens.eat_punct(Punct::Comma)? {
                    break;
                }
            }
        }
        self.tokens.split_gtgt_if_needed()?;
        self.tokens.expect_punct(Punct::Gt)?;

        let requires_clause = if self.tokens.eat_keyword(Keyword::Requires)? {
            Some(self.collect_until_top_level(&[Punct::LBrace, Punct::Semi])?)
        } else {
            None
        };

        Ok(TemplateParameterList { parameters, requires_clause, location: loc })
    }

    fn parse_template_parameter(&mut self) -> Result<TemplateParameter, ParseError> {
        let loc = self.tokens.peek0()?.location.clone();
        let _ = self.parse_attribute_seq()?;
        let tok = self.tokens.peek0()?.clone();

        if tok.is_keyword(Keyword::Template) {
            self.tokens.bump()?;
            self.tokens.expect_punct(Punct::Lt)?;
            let mut inner_params = Vec::new();
            if !self.tokens.peek0()?.is_punct(Punct::Gt) {
                loop {
                    inner_params.push(self.parse_template_parameter()?);
                    if !self.tokens.eat_punct(Punct::Comma)? {
                        break;
                    }
                }
            }
            self.tokens.split_gtgt_if_needed()?;
            self.tokens.expect_punct(Punct::Gt)?;
            let inner = TemplateParameterList { parameters: inner_params, requires_clause: None, location: loc.clone() };
            let _ = self.tokens.eat_keyword(Keyword::Typename)? || self.tokens.eat_keyword(Keyword::Class)?;
            let is_pack = self.tokens.eat_punct(Punct::Ellipsis)?;
            let name = if self.tokens.peek0()?.is_identifier() {
                Some(self.expect_identifier()?)
            } else {
                None
            };
            let default = if self.tokens.eat_punct(Punct::Eq)? {
                Some(self.parse_qualified_name(false)?)
            } else {
                None
            };
            return Ok(TemplateParameter {
                kind: TemplateParameterKind::Template { inner: Box::new(inner), name, default },
                is_pack,
                location: loc,
            });
        }

        if tok.is_keyword(Keyword::Typename) || tok.is_keyword(Keyword::Class) {
            let used_typename_keyword = tok.is_keyword(Keyword::Typename);
            self.tokens.bump()?;
            let is_pack = self.tokens.eat_punct(Punct::Ellipsis)?;
            let name = if self.tokens.peek0()?.is_identifier() {
                Some(self.expect_identifier()?)
            } else {
                None
            };
            let default = if self.tokens.eat_punct(Punct::Eq)? {
                Some(Box::new(self.parse_type_only(TypeContext::TopLevel)?))
            } else {
                None
            };
            return Ok(TemplateParameter {
                kind: TemplateParameterKind::Type { used_typename_keyword, name, default },
                is_pack,
                location: loc,
            });
        }

        // Non-type template parameter: `int N = 4`, `bool B`, `auto V`.
        let type_ = self.parse_type_only(TypeContext::Parameter)?;
        let is_pack = self.tokens.eat_punct(Punct::Ellipsis)?;
        let name = if self.tokens.peek0()?.is_identifier() {
            Some(self.expect_identifier()?)
        } else {
            None
        };
        let default = if self.tokens.eat_punct(Punct::Eq)? {
            Some(self.collect_until_top_level(&[Punct::Comma, Punct::Gt, Punct::GtGt])?)
        } else {
            None
        };
        Ok(TemplateParameter {
            kind: TemplateParameterKind::NonType { type_: Box::new(type_), name, default },
            is_pack,
            location: loc,
        })
    }

    // ---- static_assert / extern -----------------------------------------

    fn parse_static_assert(&mut self) -> Result<Declaration, ParseError> {
        let loc = self.tokens.peek0()?.location.clone();
        self.tokens.bump()?; // `static_assert`
        self.tokens.expect_punct(Punct::LParen)?;
        let expression_tokens = self.collect_until_top_level(&[Punct::Comma, Punct::RParen])?;
        let message_tokens = if self.tokens.eat_punct(Punct::Comma)? {
            Some(self.collect_until_top_level(&[Punct::RParen])?)
        } else {
            None
        };
        self.tokens.expect_punct(Punct::RParen)?;
        self.tokens.expect_punct(Punct::Semi)?;
        Ok(Declaration::StaticAssert { expression_tokens, message_tokens, access: None, location: loc })
    }

    fn parse_extern_block(&mut self) -> Result<Declaration, ParseError> {
        let loc = self.tokens.peek0()?.location.clone();
        self.tokens.bump()?; // `extern`
        let linkage_tok = self.tokens.bump()?; // string literal
        let linkage = linkage_tok.spelling;
        if self.tokens.eat_punct(Punct::LBrace)? {
            let body = self.parse_namespace_body()?;
            Ok(Declaration::ExternBlock { linkage, body, location: loc })
        } else {
            // `extern "C" void f();` — single declaration, no braces.
            let decl = self.parse_general_declaration(Vec::new(), None)?;
            Ok(Declaration::ExternBlock { linkage, body: vec![decl], location: loc })
        }
    }

    /// `extern template class Foo<int>;` / `extern template void f<int>(int);`
    /// — an explicit-instantiation declaration. The instantiated signature is
    /// not re-parsed into a full `Declaration`; `Options` governs whether the
    /// statement is recorded at all (spec §6 `extern_template_handling`).
    fn parse_extern_template_instantiation(&mut self) -> Result<Option<Declaration>, ParseError> {
        let loc = self.tokens.peek0()?.location.clone();
        self.tokens.bump()?; // `extern`
        self.tokens.bump()?; // `template`
        let body = self.collect_until_top_level(&[Punct::Semi])?;
        self.tokens.expect_punct(Punct::Semi)?;
        match self.options.extern_template_handling {
            ExternTemplateHandling::Skip => Ok(None),
            ExternTemplateHandling::Record => Ok(Some(Declaration::ExternBlock {
                linkage: "template".into(),
                body: vec![Declaration::PragmaOrIncludeLine { raw: spell(&body), location: loc.clone() }],
                location: loc,
            })),
        }
    }

    // ---- classes / enums -----------------------------------------------

    /// Everything that is not one of the keyword-dispatched productions:
    /// class/struct/union/enum definitions and forward declarations (when
    /// the leading keyword is the *entire* type specifier), friend
    /// declarations, and the general decl-specifier-seq + declarator(s)
    /// path (functions, variables, typedefs, bit-fields).
    fn parse_general_declaration(
        &mut self,
        mut leading_attrs: Vec<Attribute>,
        template: Option<TemplateParameterList>,
    ) -> Result<Declaration, ParseError> {
        let tok = self.tokens.peek0()?.clone();

        if matches!(
            tok.kind,
            TokenKind::Keyword(Keyword::Class) | TokenKind::Keyword(Keyword::Struct) | TokenKind::Keyword(Keyword::Union)
        ) {
            if let Some(decl) = self.try_parse_class_declaration(&mut leading_attrs, template.clone())? {
                return Ok(decl);
            }
        }

        if tok.is_keyword(Keyword::Enum) {
            if let Some(decl) = self.try_parse_enum_declaration(&mut leading_attrs)? {
                return Ok(decl);
            }
        }

        if tok.is_keyword(Keyword::Friend) {
            return self.parse_friend_declaration(leading_attrs, template);
        }

        self.parse_decl_statement(leading_attrs, template)
    }

    /// Attempts the `class`/`struct`/`union` production. Returns `Ok(None)`
    /// only when the keyword turned out to be the leading elaborated-type
    /// specifier of a larger declaration (e.g. `struct Foo *p;`) rather
    /// than a definition or bare forward declaration — the caller falls
    /// through to the general decl-specifier path in that case, and the
    /// `class`/`struct`/`union` keyword is re-lexed from the checkpoint. A
    /// definition not immediately followed by `;` (`struct Foo {...} x;`)
    /// surfaces as a recoverable `Unsupported` construct rather than
    /// splitting one top-level call into several declarations.
    fn try_parse_class_declaration(
        &mut self,
        leading_attrs: &mut Vec<Attribute>,
        template: Option<TemplateParameterList>,
    ) -> Result<Option<Declaration>, ParseError> {
        let mark = self.tokens.mark();
        let loc = self.tokens.peek0()?.location.clone();
        let key_kw = self.tokens.bump()?; // class/struct/union
        let key = match key_kw.kind {
            TokenKind::Keyword(Keyword::Class) => ClassKey::Class,
            TokenKind::Keyword(Keyword::Struct) => ClassKey::Struct,
            TokenKind::Keyword(Keyword::Union) => ClassKey::Union,
            _ => unreachable!(),
        };

        let mut attrs = self.parse_attribute_seq()?;
        let name = if self.tokens.peek0()?.is_identifier() {
            let mark2 = self.tokens.mark();
            match self.parse_qualified_name(false) {
                Ok(qn) => Some(qn),
                Err(_) => {
                    self.tokens.rewind(mark2);
                    None
                }
            }
        } else {
            None
        };

        let is_final = name.is_some() && self.tokens.eat_identifier_spelled("final")?;

        let peek = self.tokens.peek0()?.clone();
        if peek.is_punct(Punct::Semi) {
            // Forward declaration.
            self.tokens.bump()?;
            attrs.splice(0..0, std::mem::take(leading_attrs));
            if let Some(qn) = &name {
                if let Some(last) = qn.last_identifier() {
                    self.scope.declare_type(last.to_string());
                }
            }
            return Ok(Some(Declaration::Class {
                key,
                name,
                bases: Vec::new(),
                is_final: false,
                body: Vec::new(),
                is_forward: true,
                template,
                attributes: attrs,
                access: None,
                location: loc,
            }));
        }

        if !peek.is_punct(Punct::Colon) && !peek.is_punct(Punct::LBrace) {
            // Not a definition/forward-decl after all (e.g. `struct Foo
            // *p;`, `struct Foo f(int);`) — rewind and let the general
            // decl-specifier path re-parse it as an elaborated type.
            self.tokens.rewind(mark);
            return Ok(None);
        }

        if let Some(qn) = &name {
            if let Some(last) = qn.last_identifier() {
                self.scope.declare_type(last.to_string());
            }
        }

        let mut bases = Vec::new();
        if self.tokens.eat_punct(Punct::Colon)? {
            loop {
                bases.push(self.parse_base_specifier()?);
                if !self.tokens.eat_punct(Punct::Comma)? {
                    break;
                }
            }
        }

        self.tokens.expect_punct(Punct::LBrace)?;
        let class_name_str = name.as_ref().and_then(|n| n.last_identifier()).map(str::to_string);
        self.scope.enter(ScopeKind::Class, class_name_str.clone());
        if let Some(n) = &class_name_str {
            // Injected-class-name: the class's own name names a type
            // inside its own body (needed for constructor declarator
            // recognition and nested self-referencing members).
            self.scope.declare_type(n.clone());
        }
        let body = self.parse_member_sequence(key.default_access())?;
        self.scope.exit();

        if !self.tokens.eat_punct(Punct::Semi)? {
            return Err(ParseError::Unsupported {
                construct: "class/union definition with a trailing declarator list".into(),
                location: loc,
            });
        }

        attrs.splice(0..0, std::mem::take(leading_attrs));
        Ok(Some(Declaration::Class {
            key,
            name,
            bases,
            is_final,
            body,
            is_forward: false,
            template,
            attributes: attrs,
            access: None,
            location: loc,
        }))
    }

    fn parse_base_specifier(&mut self) -> Result<BaseSpecifier, ParseError> {
        let loc = self.tokens.peek0()?.location.clone();
        let mut access = AccessSpecifier::Public;
        let mut is_virtual = false;
        loop {
            if self.tokens.eat_keyword(Keyword::Virtual)? {
                is_virtual = true;
            } else if self.tokens.eat_keyword(Keyword::Public)? {
                access = AccessSpecifier::Public;
            } else if self.tokens.eat_keyword(Keyword::Private)? {
                access = AccessSpecifier::Private;
            } else if self.tokens.eat_keyword(Keyword::Protected)? {
                access = AccessSpecifier::Protected;
            } else {
                break;
            }
        }
        let type_ = self.parse_type_only(TypeContext::TopLevel)?;
        let is_pack = self.tokens.eat_punct(Punct::Ellipsis)?;
        Ok(BaseSpecifier { access, is_virtual, type_, is_pack, location: loc })
    }

    fn try_parse_enum_declaration(&mut self, leading_attrs: &mut Vec<Attribute>) -> Result<Option<Declaration>, ParseError> {
        let mark = self.tokens.mark();
        let loc = self.tokens.peek0()?.location.clone();
        self.tokens.bump()?; // `enum`
        let is_scoped = self.tokens.eat_keyword(Keyword::Class)? || self.tokens.eat_keyword(Keyword::Struct)?;
        let mut attrs = self.parse_attribute_seq()?;

        let name = if self.tokens.peek0()?.is_identifier() {
            Some(self.parse_qualified_name(false)?)
        } else {
            None
        };

        let underlying_type = if self.tokens.eat_punct(Punct::Colon)? {
            Some(self.parse_type_only(TypeContext::TopLevel)?)
        } else {
            None
        };

        let peek = self.tokens.peek0()?.clone();
        if peek.is_punct(Punct::Semi) {
            self.tokens.bump()?;
            attrs.splice(0..0, std::mem::take(leading_attrs));
            if let Some(qn) = &name {
                if let Some(last) = qn.last_identifier() {
                    self.scope.declare_type(last.to_string());
                }
            }
            return Ok(Some(Declaration::Enum {
                name,
                is_scoped,
                underlying_type,
                enumerators: Vec::new(),
                is_forward: true,
                attributes: attrs,
                access: None,
                location: loc,
            }));
        }

        if !peek.is_punct(Punct::LBrace) {
            self.tokens.rewind(mark);
            return Ok(None);
        }

        if let Some(qn) = &name {
            if let Some(last) = qn.last_identifier() {
                self.scope.declare_type(last.to_string());
            }
        }

        self.tokens.bump()?; // `{`
        let enumerators = self.parse_enumerator_list()?;
        self.tokens.expect_punct(Punct::RBrace)?;

        if !self.tokens.eat_punct(Punct::Semi)? {
            return Err(ParseError::Unsupported {
                construct: "enum definition with a trailing declarator list".into(),
                location: loc,
            });
        }

        attrs.splice(0..0, std::mem::take(leading_attrs));
        Ok(Some(Declaration::Enum {
            name,
            is_scoped,
            underlying_type,
            enumerators,
            is_forward: false,
            attributes: attrs,
            access: None,
            location: loc,
        }))
    }

    fn parse_enumerator_list(&mut self) -> Result<Vec<Enumerator>, ParseError> {
        let mut out = Vec::new();
        if self.tokens.peek0()?.is_punct(Punct::RBrace) {
            return Ok(out);
        }
        loop {
            if self.tokens.peek0()?.is_punct(Punct::RBrace) {
                break;
            }
            let loc = self.tokens.peek0()?.location.clone();
            let name = self.expect_identifier()?;
            let attributes = self.parse_attribute_seq()?;
            let value_tokens = if self.tokens.eat_punct(Punct::Eq)? {
                Some(self.collect_until_top_level(&[Punct::Comma, Punct::RBrace])?)
            } else {
                None
            };
            out.push(Enumerator { name, attributes, value_tokens, location: loc });
            if !self.tokens.eat_punct(Punct::Comma)? {
                break;
            }
        }
        Ok(out)
    }

    // ---- friend --------------------------------------------------------

    fn parse_friend_declaration(
        &mut self,
        leading_attrs: Vec<Attribute>,
        template: Option<TemplateParameterList>,
    ) -> Result<Declaration, ParseError> {
        let loc = self.tokens.peek0()?.location.clone();
        self.tokens.bump()?; // `friend`

        // `friend class X;` / `friend struct X;` — always a forward
        // reference, never a definition.
        if matches!(
            self.tokens.peek0()?.kind,
            TokenKind::Keyword(Keyword::Class) | TokenKind::Keyword(Keyword::Struct)
        ) && self.tokens.peek(1)?.is_identifier()
        {
            let key_kw = self.tokens.bump()?;
            let key = match key_kw.kind {
                TokenKind::Keyword(Keyword::Class) => ClassKey::Class,
                TokenKind::Keyword(Keyword::Struct) => ClassKey::Struct,
                _ => unreachable!(),
            };
            let name = self.parse_qualified_name(false)?;
            self.tokens.expect_punct(Punct::Semi)?;
            let class_decl = Declaration::Class {
                key,
                name: Some(name),
                bases: Vec::new(),
                is_final: false,
                body: Vec::new(),
                is_forward: true,
                template,
                attributes: leading_attrs,
                access: None,
                location: loc.clone(),
            };
            return Ok(Declaration::Friend {
                target: FriendTarget::Class(Box::new(class_decl)),
                access: None,
                location: loc,
            });
        }

        // `friend T;` / `friend T<U>;` (a friend type, C++11) vs. `friend
        // ReturnType f(...);` (a friend function). Parse the general decl
        // statement and classify by its result.
        let decl = self.parse_decl_statement(leading_attrs, template)?;
        match decl {
            Declaration::Function(mut f) => {
                f.is_friend = true;
                Ok(Declaration::Friend { target: FriendTarget::Function(Box::new(f)), access: None, location: loc })
            }
            Declaration::Variable(v) => {
                Ok(Declaration::Friend { target: FriendTarget::Type(v.type_), access: None, location: loc })
            }
            other => Ok(Declaration::Friend {
                target: FriendTarget::Type(Type::new(TypeKind::Auto, other.location().clone())),
                access: None,
                location: loc,
            }),
        }
    }

    // ---- the general decl-specifier + declarator(s) path ----------------

    /// Parses `decl-specifier-seq declarator ';'`, or a function declarator
    /// followed by `= default|delete|0`, a member-initializer list and/or a
    /// body, producing exactly one `Declaration`. A comma-separated
    /// declarator list collapsing several names onto one decl-specifier-seq
    /// is not supported — real headers overwhelmingly keep one declarator
    /// per statement once a body, bit-field, or initializer is involved,
    /// and this parser assumes the same discipline.
    fn parse_decl_statement(
        &mut self,
        leading_attrs: Vec<Attribute>,
        template: Option<TemplateParameterList>,
    ) -> Result<Declaration, ParseError> {
        let loc = self.tokens.peek0()?.location.clone();
        let mut specs = self.parse_decl_specifier_seq(TypeContext::TopLevel)?;
        specs.attributes.splice(0..0, leading_attrs);

        if specs.is_typedef {
            let result = self.parse_declarator(specs.type_.clone(), TypeContext::TopLevel)?;
            let name = result
                .name
                .and_then(|n| n.last_identifier().map(str::to_string))
                .ok_or_else(|| ParseError::UnexpectedToken {
                    expected: "typedef name".into(),
                    found: self.tokens.peek0().map(|t| t.describe()).unwrap_or_default(),
                    location: loc.clone(),
                })?;
            self.tokens.expect_punct(Punct::Semi)?;
            self.scope.declare_type(name.clone());
            return Ok(Declaration::Typedef { name, type_: result.type_, access: None, location: loc });
        }

        let result = self.parse_declarator(specs.type_.clone(), TypeContext::TopLevel)?;

        if let Some(shape) = result.function {
            let name = result.name.unwrap_or_else(|| QualifiedName::simple("", loc.clone()));
            return self.finish_function_declaration(loc, specs, name, shape, template);
        }

        // Bit-field: `int x : 3;` or the anonymous padding form `int : 3;`.
        let bitfield_width = if self.tokens.eat_punct(Punct::Colon)? {
            Some(self.collect_until_top_level(&[Punct::Comma, Punct::Semi])?)
        } else {
            None
        };

        let name = result
            .name
            .and_then(|n| n.last_identifier().map(str::to_string))
            .unwrap_or_default();

        let initializer_tokens = if self.tokens.eat_punct(Punct::Eq)? {
            Some(self.collect_until_top_level(&[Punct::Comma, Punct::Semi])?)
        } else if self.tokens.peek0()?.is_punct(Punct::LBrace) {
            self.tokens.bump()?;
            let mut toks = self.tokens.collect_balanced(Punct::LBrace, Punct::RBrace)?;
            toks.pop();
            Some(toks)
        } else if self.tokens.peek0()?.is_punct(Punct::LParen) {
            self.tokens.bump()?;
            let mut toks = self.tokens.collect_balanced(Punct::LParen, Punct::RParen)?;
            toks.pop();
            Some(toks)
        } else {
            None
        };

        self.tokens.expect_punct(Punct::Semi)?;

        Ok(Declaration::Variable(VariableDecl {
            type_: result.type_,
            name,
            initializer_tokens,
            is_static: specs.is_static,
            is_extern: specs.is_extern,
            is_constexpr: specs.is_constexpr,
            is_inline: specs.is_inline,
            is_thread_local: specs.is_thread_local,
            bitfield_width,
            template,
            attributes: specs.attributes,
            access: None,
            location: loc,
        }))
    }

    fn finish_function_declaration(
        &mut self,
        loc: Location,
        specs: DeclSpecifierSeq,
        name: QualifiedName,
        shape: FunctionShape,
        template: Option<TemplateParameterList>,
    ) -> Result<Declaration, ParseError> {
        let kind = classify_function_kind(&name, self.scope.enclosing_class_name());
        let return_type = if matches!(kind, FunctionKind::Constructor | FunctionKind::Destructor) {
            None
        } else {
            Some(specs.type_.clone())
        };

        let mut trailing_attrs = self.parse_attribute_seq()?;
        // `override`/`final` lex as plain identifiers (they are
        // context-sensitive, not reserved words), so they're matched by
        // spelling rather than by keyword.
        let is_override = self.tokens.eat_identifier_spelled("override")?;
        trailing_attrs.extend(self.parse_attribute_seq()?);
        let is_final = self.tokens.eat_identifier_spelled("final")?;
        trailing_attrs.extend(self.parse_attribute_seq()?);

        let mut is_pure = false;
        let mut is_default = false;
        let mut is_deleted = false;
        if self.tokens.eat_punct(Punct::Eq)? {
            let tok = self.tokens.bump()?;
            match &tok.kind {
                TokenKind::NumberLit if tok.spelling == "0" => is_pure = true,
                TokenKind::Keyword(Keyword::Default) => is_default = true,
                TokenKind::Keyword(Keyword::Delete) => is_deleted = true,
                _ => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "'0', 'default', or 'delete'".into(),
                        found: tok.describe(),
                        location: tok.location,
                    })
                }
            }
        }

        let mut member_initializers = Vec::new();
        if matches!(kind, FunctionKind::Constructor) && self.tokens.eat_punct(Punct::Colon)? {
            loop {
                member_initializers.push(self.parse_member_initializer()?);
                if !self.tokens.eat_punct(Punct::Comma)? {
                    break;
                }
            }
        }

        let body_tokens = if self.tokens.peek0()?.is_punct(Punct::LBrace) {
            self.tokens.bump()?;
            match self.options.method_body {
                MethodBody::Skip => {
                    self.tokens.collect_balanced(Punct::LBrace, Punct::RBrace)?;
                    None
                }
                MethodBody::RetainTokens => {
                    let mut toks = self.tokens.collect_balanced(Punct::LBrace, Punct::RBrace)?;
                    toks.pop();
                    Some(toks)
                }
            }
        } else {
            self.tokens.expect_punct(Punct::Semi)?;
            None
        };

        Ok(Declaration::Function(FunctionDecl {
            name,
            kind,
            return_type,
            parameters: shape.parameters,
            is_variadic: shape.is_variadic,
            cv: shape.cv,
            ref_qual: shape.ref_qual,
            noexcept: shape.noexcept,
            is_virtual: specs.is_virtual,
            is_explicit: specs.is_explicit,
            is_constexpr: specs.is_constexpr,
            is_consteval: specs.is_consteval,
            is_constinit: specs.is_constinit,
            is_static: specs.is_static,
            is_friend: specs.is_friend,
            is_inline: specs.is_inline,
            is_pure,
            is_default,
            is_deleted,
            is_override,
            is_final,
            trailing_return: shape.trailing_return,
            member_initializers,
            body_tokens,
            template,
            requires_clause: shape.requires_clause,
            access: None,
            attributes: {
                let mut a = specs.attributes;
                a.extend(trailing_attrs);
                a
            },
            location: loc,
        }))
    }

    fn parse_member_initializer(&mut self) -> Result<MemberInitializer, ParseError> {
        let loc = self.tokens.peek0()?.location.clone();
        let target = self.parse_qualified_name(false)?;
        let args_tokens = if self.tokens.eat_punct(Punct::LParen)? {
            let mut toks = self.tokens.collect_balanced(Punct::LParen, Punct::RParen)?;
            toks.pop();
            toks
        } else {
            self.tokens.expect_punct(Punct::LBrace)?;
            let mut toks = self.tokens.collect_balanced(Punct::LBrace, Punct::RBrace)?;
            toks.pop();
            toks
        };
        Ok(MemberInitializer { target, args_tokens, location: loc })
    }
}

/// Whether a declarator's bound name identifies a constructor, destructor,
/// conversion operator, or an ordinary function (spec §3 "Special kinds
/// flagged"). `enclosing_class` is the innermost class scope's name, used
/// to recognize an unqualified constructor (`Point()` inside `struct
/// Point`); a qualified `Outer::Outer` name is caught the same way by
/// comparing the last two segments instead.
fn classify_function_kind(name: &QualifiedName, enclosing_class: Option<&str>) -> FunctionKind {
    match name.segments.last() {
        Some(NameSegment::Destructor(_)) => FunctionKind::Destructor,
        Some(NameSegment::ConversionOperator(_)) => FunctionKind::ConversionOperator,
        Some(NameSegment::Identifier(id)) => {
            if name.segments.len() >= 2 {
                if let Some(NameSegment::Identifier(prev)) = name.segments.get(name.segments.len() - 2) {
                    if prev == id {
                        return FunctionKind::Constructor;
                    }
                }
            } else if enclosing_class == Some(id.as_str()) {
                return FunctionKind::Constructor;
            }
            FunctionKind::Ordinary
        }
        _ => FunctionKind::Ordinary,
    }
}

/// The identifier a template type/template-template parameter introduces
/// into the template parameter scope, if any (used so `template<typename
/// T> void f(T x);`'s `T` resolves as a type inside the declarator).
fn template_parameter_type_name(p: &TemplateParameter) -> Option<String> {
    match &p.kind {
        TemplateParameterKind::Type { name, .. } => name.clone(),
        TemplateParameterKind::Template { name, .. } => name.clone(),
        TemplateParameterKind::NonType { .. } => None,
    }
}

fn spell(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.spelling.as_str()).collect::<Vec<_>>().join(" ")
}
