//! Type Parser: decl-specifier-seq accumulation, declarators, qualified
//! names, and template-argument lists (spec §4.2).

use crate::ast::{
    Attribute, CvQualifiers, ElaboratedKey, FunctionType, NameSegment, NoexceptSpec, Parameter,
    QualifiedName, RefKind, TemplateArgument, Type, TypeKind,
};
use crate::error::ParseError;
use crate::token::{Keyword, Punct, TokenKind};

use super::{Parser, TypeContext};

/// The accumulated leading specifiers of a declaration, before its
/// declarator (spec §4.2 step 1).
#[derive(Debug, Clone)]
pub(crate) struct DeclSpecifierSeq {
    pub type_: Type,
    pub is_typedef: bool,
    pub is_friend: bool,
    pub is_constexpr: bool,
    pub is_consteval: bool,
    pub is_constinit: bool,
    pub is_inline: bool,
    pub is_static: bool,
    pub is_extern: bool,
    pub is_thread_local: bool,
    pub is_virtual: bool,
    pub is_explicit: bool,
    pub attributes: Vec<Attribute>,
}

/// The shape a declarator gave to a base type: its derived [`Type`], the
/// name it bound (if any), and — when the outermost derivation was a
/// function — the pieces needed to build a `FunctionDecl` (spec §4.3
/// "Function signatures").
pub(crate) struct DeclaratorResult {
    pub type_: Type,
    pub name: Option<QualifiedName>,
    pub function: Option<FunctionShape>,
}

pub(crate) struct FunctionShape {
    pub parameters: Vec<Parameter>,
    pub is_variadic: bool,
    pub cv: CvQualifiers,
    pub ref_qual: Option<RefKind>,
    pub noexcept: NoexceptSpec,
    pub trailing_return: Option<Type>,
    /// Tokens of a trailing `requires(...)` clause attached to the
    /// parameter list itself, distinct from one on the template head.
    pub requires_clause: Option<Vec<crate::token::Token>>,
}

/// Declarator derivation tree: mirrors the C++ declarator grammar with a
/// hole (`Name`/`Abstract`) where the base type eventually plugs in.
enum DeclNode {
    Name(QualifiedName),
    Abstract,
    Pointer {
        cv: CvQualifiers,
        inner: Box<DeclNode>,
    },
    Reference {
        kind: RefKind,
        inner: Box<DeclNode>,
    },
    MemberPointer {
        class_type: Box<Type>,
        cv: CvQualifiers,
        inner: Box<DeclNode>,
    },
    Array {
        size_tokens: Option<Vec<crate::token::Token>>,
        inner: Box<DeclNode>,
    },
    Function {
        shape: FunctionShape,
        inner: Box<DeclNode>,
    },
}

impl<'v> Parser<'v> {
    /// Accumulate CV qualifiers, storage-class/function specifiers, and a
    /// single type specifier (spec §4.2 step 1).
    pub(crate) fn parse_decl_specifier_seq(&mut self, ctx: TypeContext) -> Result<DeclSpecifierSeq, ParseError> {
        let mut attributes = Vec::new();
        let mut is_typedef = false;
        let mut is_friend = false;
        let mut is_constexpr = false;
        let mut is_consteval = false;
        let mut is_constinit = false;
        let mut is_inline = false;
        let mut is_static = false;
        let mut is_extern = false;
        let mut is_thread_local = false;
        let mut is_virtual = false;
        let mut is_explicit = false;
        let mut cv = CvQualifiers::none();
        let mut fundamental_words: Vec<Keyword> = Vec::new();
        let mut type_specifier: Option<Type> = None;
        let start_loc = self.tokens.peek0()?.location.clone();

        loop {
            attributes.extend(self.parse_attribute_seq()?);
            let tok = self.tokens.peek0()?.clone();
            match &tok.kind {
                TokenKind::Keyword(Keyword::Typedef) => {
                    is_typedef = true;
                    self.tokens.bump()?;
                }
                TokenKind::Keyword(Keyword::Friend) => {
                    is_friend = true;
                    self.tokens.bump()?;
                }
                TokenKind::Keyword(Keyword::Constexpr) => {
                    is_constexpr = true;
                    self.tokens.bump()?;
                }
                TokenKind::Keyword(Keyword::Consteval) => {
                    is_consteval = true;
                    self.tokens.bump()?;
                }
                TokenKind::Keyword(Keyword::Constinit) => {
                    is_constinit = true;
                    self.tokens.bump()?;
                }
                TokenKind::Keyword(Keyword::Inline) => {
                    is_inline = true;
                    self.tokens.bump()?;
                }
                TokenKind::Keyword(Keyword::Static) => {
                    is_static = true;
                    self.tokens.bump()?;
                }
                TokenKind::Keyword(Keyword::Extern) => {
                    // `extern "C" { ... }` linkage blocks are handled by the
                    // Declaration Parser before decl-specifiers are parsed;
                    // here `extern` is always the plain storage-class form.
                    is_extern = true;
                    self.tokens.bump()?;
                }
                TokenKind::Keyword(Keyword::Thread_local) => {
                    is_thread_local = true;
                    self.tokens.bump()?;
                }
                TokenKind::Keyword(Keyword::Virtual) => {
                    is_virtual = true;
                    self.tokens.bump()?;
                }
                TokenKind::Keyword(Keyword::Explicit) => {
                    is_explicit = true;
                    self.tokens.bump()?;
                    if self.tokens.eat_punct(Punct::LParen)? {
                        self.tokens.collect_balanced(Punct::LParen, Punct::RParen)?;
                    }
                }
                TokenKind::Keyword(Keyword::Mutable) | TokenKind::Keyword(Keyword::Register) => {
                    self.tokens.bump()?;
                }
                TokenKind::Keyword(Keyword::Const) => {
                    cv.is_const = true;
                    self.tokens.bump()?;
                }
                TokenKind::Keyword(Keyword::Volatile) => {
                    cv.is_volatile = true;
                    self.tokens.bump()?;
                }
                TokenKind::Keyword(Keyword::Auto) if type_specifier.is_none() => {
                    type_specifier = Some(Type::new(TypeKind::Auto, tok.location.clone()));
                    self.tokens.bump()?;
                }
                TokenKind::Keyword(Keyword::Decltype) if type_specifier.is_none() => {
                    type_specifier = Some(self.parse_decltype()?);
                }
                TokenKind::Keyword(Keyword::Typename) if type_specifier.is_none() => {
                    self.tokens.bump()?;
                    let qn = self.parse_qualified_name(false)?;
                    type_specifier = Some(Type::new(
                        TypeKind::Named {
                            name: qn,
                            is_typename: true,
                            elaborated: None,
                        },
                        tok.location.clone(),
                    ));
                }
                TokenKind::Keyword(k @ (Keyword::Class | Keyword::Struct | Keyword::Union | Keyword::Enum))
                    if type_specifier.is_none() =>
                {
                    let key_kw = *k;
                    let key_loc = tok.location.clone();
                    self.tokens.bump()?;
                    if key_kw == Keyword::Enum {
                        let _ = self.tokens.eat_keyword(Keyword::Class)?
                            || self.tokens.eat_keyword(Keyword::Struct)?;
                    }
                    if self.tokens.peek0()?.is_punct(Punct::LBrace) {
                        // `typedef struct { ... } Name;` and friends: a
                        // full definition nested inside a decl-specifier-seq
                        // rather than a bare elaborated-type reference.
                        // Recognized at the top level via
                        // `try_parse_class_declaration`/`try_parse_enum_declaration`;
                        // unsupported in this nested position.
                        return Err(ParseError::Unsupported {
                            construct: "class/union/enum body nested in a declaration".into(),
                            location: key_loc,
                        });
                    }
                    let qn = self.parse_qualified_name(false)?;
                    if matches!(self.tokens.peek0()?.kind, TokenKind::Punct(Punct::LBrace))
                        || (key_kw != Keyword::Enum && self.tokens.peek0()?.is_punct(Punct::Colon))
                    {
                        return Err(ParseError::Unsupported {
                            construct: "class/union/enum body nested in a declaration".into(),
                            location: key_loc,
                        });
                    }
                    let elab = match key_kw {
                        Keyword::Class => ElaboratedKey::Class,
                        Keyword::Struct => ElaboratedKey::Struct,
                        Keyword::Union => ElaboratedKey::Union,
                        Keyword::Enum => ElaboratedKey::Enum,
                        _ => unreachable!(),
                    };
                    type_specifier = Some(Type::new(
                        TypeKind::Named {
                            name: qn,
                            is_typename: false,
                            elaborated: Some(elab),
                        },
                        tok.location.clone(),
                    ));
                }
                TokenKind::Keyword(k) if k.is_fundamental_type_keyword() && type_specifier.is_none() => {
                    fundamental_words.push(*k);
                    self.tokens.bump()?;
                }
                TokenKind::Identifier if type_specifier.is_none() => {
                    if self.is_constructor_declarator_id()? {
                        break;
                    }
                    if self.looks_like_type_name(ctx)? {
                        let qn = self.parse_qualified_name(false)?;
                        type_specifier = Some(Type::new(
                            TypeKind::Named {
                                name: qn,
                                is_typename: false,
                                elaborated: None,
                            },
                            tok.location.clone(),
                        ));
                    } else {
                        break;
                    }
                }
                TokenKind::Punct(Punct::ColonColon) if type_specifier.is_none() => {
                    let qn = self.parse_qualified_name(false)?;
                    type_specifier = Some(Type::new(
                        TypeKind::Named {
                            name: qn,
                            is_typename: false,
                            elaborated: None,
                        },
                        tok.location.clone(),
                    ));
                }
                _ => break,
            }
        }

        let type_ = if !fundamental_words.is_empty() {
            Type::new(TypeKind::Fundamental(canonicalize_fundamental(&fundamental_words)), start_loc)
        } else if let Some(t) = type_specifier {
            t
        } else {
            let tok = self.tokens.peek0()?.clone();
            return Err(ParseError::UnexpectedToken {
                expected: "type specifier".into(),
                found: tok.describe(),
                location: tok.location,
            });
        };

        Ok(DeclSpecifierSeq {
            type_: type_.with_cv(cv),
            is_typedef,
            is_friend,
            is_constexpr,
            is_consteval,
            is_constinit,
            is_inline,
            is_static,
            is_extern,
            is_thread_local,
            is_virtual,
            is_explicit,
            attributes,
        })
    }

    /// A self-contained type expression with no bound name: used for
    /// template arguments, trailing return types, friend type-targets,
    /// base-specifier types, and `new`-expression operands (spec §4.2).
    pub(crate) fn parse_type_only(&mut self, ctx: TypeContext) -> Result<Type, ParseError> {
        let specs = self.parse_decl_specifier_seq(ctx)?;
        let result = self.parse_declarator(specs.type_, ctx)?;
        Ok(result.type_)
    }

    /// Heuristic used while accumulating decl-specifiers: should a bare
    /// leading identifier be treated as (the start of) a type-specifier,
    /// as opposed to the declarator name of a constructor-shaped
    /// declaration with no explicit return type? Spec §9: carry a
    /// scope-aware "is this identifier a type?" predicate.
    ///
    /// In a position where a type is required (`ctx` is `TopLevel`,
    /// `Parameter`, or `TrailingReturn`), an otherwise-unknown identifier
    /// is still accepted as the type-specifier as long as what follows it
    /// can only begin a declarator — this is what lets `Widget &w;` and a
    /// base-specifier naming a forward-unseen class resolve without the
    /// type having been declared yet. `TemplateArgument`/`NewExpression`
    /// keep the narrower `::`/`<`-only check so the speculative
    /// non-type-template-argument fallback still gets a chance to run.
    fn looks_like_type_name(&mut self, ctx: TypeContext) -> Result<bool, ParseError> {
        let tok = self.tokens.peek0()?.clone();
        let name = match &tok.kind {
            TokenKind::Identifier => tok.spelling.clone(),
            _ => return Ok(false),
        };
        if self.scope.is_type_name(&name) {
            return Ok(true);
        }
        let next = self.tokens.peek(1)?.clone();
        if next.is_punct(Punct::ColonColon) || next.is_punct(Punct::Lt) {
            return Ok(true);
        }
        if matches!(ctx, TypeContext::TopLevel | TypeContext::Parameter | TypeContext::TrailingReturn) {
            let begins_declarator = next.is_identifier()
                || next.is_punct(Punct::Star)
                || next.is_punct(Punct::Amp)
                || next.is_punct(Punct::AmpAmp)
                || next.is_punct(Punct::LParen)
                || next.is_punct(Punct::LBrace)
                || next.is_punct(Punct::Comma)
                || next.is_punct(Punct::Semi);
            if begins_declarator {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether the upcoming identifier is a constructor's declarator-id: it
    /// repeats the innermost enclosing class's name and is immediately
    /// followed by `(`. Checked ahead of `looks_like_type_name` so the
    /// injected-class-name doesn't swallow the constructor's own name as
    /// its (nonexistent) return type.
    fn is_constructor_declarator_id(&mut self) -> Result<bool, ParseError> {
        let tok = self.tokens.peek0()?.clone();
        let name = match &tok.kind {
            TokenKind::Identifier => tok.spelling.clone(),
            _ => return Ok(false),
        };
        if self.scope.enclosing_class_name() != Some(name.as_str()) {
            return Ok(false);
        }
        Ok(self.tokens.peek(1)?.is_punct(Punct::LParen))
    }

    pub(crate) fn parse_decltype(&mut self) -> Result<Type, ParseError> {
        let loc = self.tokens.peek0()?.location.clone();
        self.tokens.bump()?; // `decltype`
        self.tokens.expect_punct(Punct::LParen)?;
        if self.tokens.peek0()?.is_keyword(Keyword::Auto) && self.tokens.peek(1)?.is_punct(Punct::RParen) {
            self.tokens.bump()?;
            self.tokens.bump()?;
            return Ok(Type::new(TypeKind::DecltypeAuto, loc));
        }
        let mut toks = self.tokens.collect_balanced(Punct::LParen, Punct::RParen)?;
        toks.pop();
        Ok(Type::new(TypeKind::Decltype(toks), loc))
    }

    /// A (possibly qualified, possibly operator/destructor/conversion)
    /// name. Shared by declarators, friend targets, using-declarations,
    /// and base-specifiers.
    pub(crate) fn parse_qualified_name(&mut self, allow_special: bool) -> Result<QualifiedName, ParseError> {
        let start_loc = self.tokens.peek0()?.location.clone();
        let leading_global = self.tokens.eat_punct(Punct::ColonColon)?;
        let mut segments = Vec::new();
        loop {
            let tok = self.tokens.peek0()?.clone();
            if allow_special && tok.is_punct(Punct::Tilde) {
                self.tokens.bump()?;
                let id = self.expect_identifier()?;
                segments.push(NameSegment::Destructor(id));
            } else if allow_special && tok.is_keyword(Keyword::Operator) {
                self.tokens.bump()?;
                segments.push(self.parse_operator_name_segment()?);
            } else if tok.is_identifier() {
                self.tokens.bump()?;
                let name = tok.spelling.clone();
                if self.tokens.peek0()?.is_punct(Punct::Lt) {
                    let mark = self.tokens.mark();
                    match self.try_parse_template_id_arguments() {
                        Ok(arguments) => segments.push(NameSegment::TemplateId { name, arguments }),
                        Err(_) => {
                            self.tokens.rewind(mark);
                            segments.push(NameSegment::Identifier(name));
                        }
                    }
                } else {
                    segments.push(NameSegment::Identifier(name));
                }
            } else {
                return Err(ParseError::UnexpectedToken {
                    expected: "identifier".into(),
                    found: tok.describe(),
                    location: tok.location,
                });
            }
            if self.tokens.eat_punct(Punct::ColonColon)? {
                continue;
            }
            break;
        }
        Ok(QualifiedName {
            leading_global,
            segments,
            location: start_loc,
        })
    }

    fn parse_operator_name_segment(&mut self) -> Result<NameSegment, ParseError> {
        let tok = self.tokens.peek0()?.clone();
        match &tok.kind {
            TokenKind::Keyword(Keyword::New) | TokenKind::Keyword(Keyword::Delete) => {
                self.tokens.bump()?;
                let mut s = tok.spelling.clone();
                if self.tokens.eat_punct(Punct::LBracket)? {
                    self.tokens.expect_punct(Punct::RBracket)?;
                    s.push_str("[]");
                }
                Ok(NameSegment::Operator(s))
            }
            TokenKind::StringLit => {
                self.tokens.bump()?;
                let suffix = self.expect_identifier()?;
                Ok(NameSegment::Operator(format!("\"\"{suffix}")))
            }
            TokenKind::Punct(Punct::LParen) => {
                self.tokens.bump()?;
                self.tokens.expect_punct(Punct::RParen)?;
                Ok(NameSegment::Operator("()".into()))
            }
            TokenKind::Punct(Punct::LBracket) => {
                self.tokens.bump()?;
                self.tokens.expect_punct(Punct::RBracket)?;
                Ok(NameSegment::Operator("[]".into()))
            }
            TokenKind::Punct(p) => {
                let s = p.to_string();
                self.tokens.bump()?;
                Ok(NameSegment::Operator(s))
            }
            _ => {
                let ty = self.parse_type_only(TypeContext::TrailingReturn)?;
                Ok(NameSegment::ConversionOperator(Box::new(ty)))
            }
        }
    }

    /// Consumes `<`, a template argument list, and the matching `>`
    /// (splitting a `>>` if needed). The `<` must be the current token.
    fn try_parse_template_id_arguments(&mut self) -> Result<Vec<TemplateArgument>, ParseError> {
        self.tokens.expect_punct(Punct::Lt)?;
        let args = self.parse_template_argument_list()?;
        self.tokens.split_gtgt_if_needed()?;
        self.tokens.expect_punct(Punct::Gt)?;
        Ok(args)
    }

    fn parse_template_argument_list(&mut self) -> Result<Vec<TemplateArgument>, ParseError> {
        let mut args = Vec::new();
        {
            let tok = self.tokens.peek0()?;
            if tok.is_punct(Punct::Gt) || tok.is_punct(Punct::GtGt) {
                return Ok(args);
            }
        }
        loop {
            args.push(self.parse_template_argument()?);
            if self.tokens.eat_punct(Punct::Comma)? {
                continue;
            }
            break;
        }
        Ok(args)
    }

    /// Spec §9 open question on non-type vs. type template arguments: a
    /// bare value argument (`Array<T, N>`'s `N`) cannot be told apart from
    /// a type argument without name lookup, which is out of scope (spec
    /// §1). We attempt a type parse first and fall back to an opaque
    /// expression run only when that fails outright.
    fn parse_template_argument(&mut self) -> Result<TemplateArgument, ParseError> {
        let mark = self.tokens.mark();
        match self.parse_type_only(TypeContext::TemplateArgument) {
            Ok(ty) => {
                let loc = ty.location.clone();
                let ty = if self.tokens.eat_punct(Punct::Ellipsis)? {
                    Type::new(TypeKind::Pack(Box::new(ty)), loc)
                } else {
                    ty
                };
                Ok(TemplateArgument::Type(Box::new(ty)))
            }
            Err(_) => {
                self.tokens.rewind(mark);
                let toks = self.collect_until_top_level(&[Punct::Comma, Punct::Gt, Punct::GtGt])?;
                Ok(TemplateArgument::Expression(toks))
            }
        }
    }

    /// Parse a declarator around `base` and apply it, producing the final
    /// [`Type`] plus whatever name/function-signature it bound (spec §4.2
    /// step 2-3).
    pub(crate) fn parse_declarator(&mut self, base: Type, ctx: TypeContext) -> Result<DeclaratorResult, ParseError> {
        let node = self.parse_ptr_declarator(ctx)?;
        let (type_, name, function) = apply_declarator(base, node);
        Ok(DeclaratorResult { type_, name, function })
    }

    fn parse_ptr_declarator(&mut self, ctx: TypeContext) -> Result<DeclNode, ParseError> {
        let tok = self.tokens.peek0()?.clone();
        match &tok.kind {
            TokenKind::Punct(Punct::Star) => {
                self.tokens.bump()?;
                let cv = self.parse_trailing_cv()?;
                let inner = self.parse_ptr_declarator(ctx)?;
                Ok(DeclNode::Pointer { cv, inner: Box::new(inner) })
            }
            TokenKind::Punct(Punct::Amp) => {
                self.tokens.bump()?;
                let inner = self.parse_ptr_declarator(ctx)?;
                Ok(DeclNode::Reference { kind: RefKind::Lvalue, inner: Box::new(inner) })
            }
            TokenKind::Punct(Punct::AmpAmp) => {
                self.tokens.bump()?;
                let inner = self.parse_ptr_declarator(ctx)?;
                Ok(DeclNode::Reference { kind: RefKind::Rvalue, inner: Box::new(inner) })
            }
            TokenKind::Identifier => {
                // `ClassName::*` — a pointer-to-member declarator.
                let mark = self.tokens.mark();
                if let Ok(qn) = self.parse_qualified_name(false) {
                    if self.tokens.eat_punct(Punct::Star)? {
                        let class_type = Type::new(
                            TypeKind::Named { name: qn, is_typename: false, elaborated: None },
                            tok.location.clone(),
                        );
                        let cv = self.parse_trailing_cv()?;
                        let inner = self.parse_ptr_declarator(ctx)?;
                        return Ok(DeclNode::MemberPointer {
                            class_type: Box::new(class_type),
                            cv,
                            inner: Box::new(inner),
                        });
                    }
                }
                self.tokens.rewind(mark);
                self.parse_direct_declarator(ctx)
            }
            _ => self.parse_direct_declarator(ctx),
        }
    }

    fn parse_trailing_cv(&mut self) -> Result<CvQualifiers, ParseError> {
        let mut cv = CvQualifiers::none();
        loop {
            if self.tokens.eat_keyword(Keyword::Const)? {
                cv.is_const = true;
            } else if self.tokens.eat_keyword(Keyword::Volatile)? {
                cv.is_volatile = true;
            } else {
                break;
            }
        }
        Ok(cv)
    }

    fn parse_direct_declarator(&mut self, ctx: TypeContext) -> Result<DeclNode, ParseError> {
        let mut node = if self.tokens.peek0()?.is_punct(Punct::LParen) {
            // Disambiguate a grouped nested declarator (`(*fp)`, `(&r)`)
            // from the parameter list of an abstract/unnamed declarator —
            // grouping is recognized only when `(` is immediately followed
            // by a pointer/reference operator (spec §9: heuristic
            // disambiguation is accepted where full backtracking would be
            // disproportionate).
            let opens_group = matches!(
                self.tokens.peek(1)?.kind,
                TokenKind::Punct(Punct::Star) | TokenKind::Punct(Punct::Amp) | TokenKind::Punct(Punct::AmpAmp)
            );
            if opens_group {
                self.tokens.bump()?;
                let inner = self.parse_ptr_declarator(ctx)?;
                self.tokens.expect_punct(Punct::RParen)?;
                inner
            } else {
                DeclNode::Abstract
            }
        } else if ctx != TypeContext::TemplateArgument && ctx != TypeContext::TrailingReturn && self.next_starts_declarator_id() {
            DeclNode::Name(self.parse_qualified_name(true)?)
        } else {
            DeclNode::Abstract
        };

        loop {
            if self.tokens.eat_punct(Punct::LBracket)? {
                let size_tokens = if self.tokens.peek0()?.is_punct(Punct::RBracket) {
                    None
                } else {
                    Some(self.collect_until_top_level(&[Punct::RBracket])?)
                };
                self.tokens.expect_punct(Punct::RBracket)?;
                node = DeclNode::Array { size_tokens, inner: Box::new(node) };
            } else if self.tokens.eat_punct(Punct::LParen)? {
                let shape = self.parse_function_shape()?;
                node = DeclNode::Function { shape, inner: Box::new(node) };
            } else {
                break;
            }
        }
        Ok(node)
    }

    fn next_starts_declarator_id(&mut self) -> bool {
        matches!(
            self.tokens.peek0().map(|t| &t.kind),
            Ok(TokenKind::Identifier) | Ok(TokenKind::Punct(Punct::ColonColon)) | Ok(TokenKind::Punct(Punct::Tilde))
        ) || matches!(self.tokens.peek0().map(|t| t.is_keyword(Keyword::Operator)), Ok(true))
    }

    /// Everything after a declarator's opening `(` through the final
    /// trailing-return clause: parameters, cv/ref qualifiers, `noexcept`,
    /// and `-> T` (spec §4.3 "Function signatures").
    fn parse_function_shape(&mut self) -> Result<FunctionShape, ParseError> {
        let (parameters, is_variadic) = self.parse_parameter_list()?;
        self.tokens.expect_punct(Punct::RParen)?;

        let cv = self.parse_trailing_cv()?;
        let ref_qual = if self.tokens.eat_punct(Punct::Amp)? {
            Some(RefKind::Lvalue)
        } else if self.tokens.eat_punct(Punct::AmpAmp)? {
            Some(RefKind::Rvalue)
        } else {
            None
        };

        let noexcept = if self.tokens.eat_keyword(Keyword::Noexcept)? {
            if self.tokens.eat_punct(Punct::LParen)? {
                let mut toks = self.tokens.collect_balanced(Punct::LParen, Punct::RParen)?;
                toks.pop();
                NoexceptSpec::Condition(toks)
            } else {
                NoexceptSpec::Bare
            }
        } else {
            NoexceptSpec::None
        };

        // `requires` clauses attached directly to a function parameter
        // list (rather than the template head) are captured as opaque
        // tokens here; the Declaration Parser captures the template-head
        // form separately.
        let requires_clause = if self.tokens.peek0()?.is_keyword(Keyword::Requires) {
            self.tokens.bump()?;
            Some(self.collect_until_top_level(&[
                Punct::LBrace,
                Punct::Semi,
                Punct::Eq,
                Punct::Arrow,
            ])?)
        } else {
            None
        };

        let trailing_return = if self.tokens.eat_punct(Punct::Arrow)? {
            Some(self.parse_type_only(TypeContext::TrailingReturn)?)
        } else {
            None
        };

        Ok(FunctionShape {
            parameters,
            is_variadic,
            cv,
            ref_qual,
            noexcept,
            trailing_return,
            requires_clause,
        })
    }

    fn parse_parameter_list(&mut self) -> Result<(Vec<Parameter>, bool), ParseError> {
        let mut params = Vec::new();
        if self.tokens.peek0()?.is_punct(Punct::RParen) {
            return Ok((params, false));
        }
        if self.tokens.peek0()?.is_keyword(Keyword::Void) && self.tokens.peek(1)?.is_punct(Punct::RParen) {
            self.tokens.bump()?;
            return Ok((params, false));
        }
        let mut variadic = false;
        loop {
            if self.tokens.eat_punct(Punct::Ellipsis)? {
                variadic = true;
                break;
            }
            params.push(self.parse_parameter()?);
            if !self.tokens.eat_punct(Punct::Comma)? {
                break;
            }
        }
        Ok((params, variadic))
    }

    fn parse_parameter(&mut self) -> Result<Parameter, ParseError> {
        let loc = self.tokens.peek0()?.location.clone();
        let leading_attrs = self.parse_attribute_seq()?;
        let specs = self.parse_decl_specifier_seq(TypeContext::Parameter)?;
        let is_pack = self.tokens.eat_punct(Punct::Ellipsis)?;
        let result = self.parse_declarator(specs.type_, TypeContext::Parameter)?;
        let mut attributes = leading_attrs;
        attributes.extend(self.parse_attribute_seq()?);
        let default_value_tokens = if self.tokens.eat_punct(Punct::Eq)? {
            Some(self.collect_until_top_level(&[Punct::Comma, Punct::RParen])?)
        } else {
            None
        };
        Ok(Parameter {
            type_: result.type_,
            name: result.name.and_then(|n| n.last_identifier().map(str::to_string)),
            default_value_tokens,
            attributes,
            is_pack,
            location: loc,
        })
    }
}

/// Apply a parsed declarator onto `base`, producing the final type and
/// whatever name/function-shape it carried. The innermost derivation
/// (closest to the name) binds tightest, matching the right-to-left
/// reading of a C declarator.
fn apply_declarator(base: Type, node: DeclNode) -> (Type, Option<QualifiedName>, Option<FunctionShape>) {
    match node {
        DeclNode::Name(qn) => (base, Some(qn), None),
        DeclNode::Abstract => (base, None, None),
        DeclNode::Pointer { cv, inner } => {
            let (inner_type, name, func) = apply_declarator(base, *inner);
            let loc = inner_type.location.clone();
            (Type::new(TypeKind::Pointer(Box::new(inner_type)), loc).with_cv(cv), name, func)
        }
        DeclNode::Reference { kind, inner } => {
            let (inner_type, name, func) = apply_declarator(base, *inner);
            let loc = inner_type.location.clone();
            (
                Type::new(TypeKind::Reference { inner: Box::new(inner_type), kind }, loc),
                name,
                func,
            )
        }
        DeclNode::MemberPointer { class_type, cv, inner } => {
            let (inner_type, name, func) = apply_declarator(base, *inner);
            let loc = inner_type.location.clone();
            (
                Type::new(TypeKind::MemberPointer { class_type, inner: Box::new(inner_type) }, loc).with_cv(cv),
                name,
                func,
            )
        }
        DeclNode::Array { size_tokens, inner } => {
            let (inner_type, name, func) = apply_declarator(base, *inner);
            let loc = inner_type.location.clone();
            (
                Type::new(TypeKind::Array { inner: Box::new(inner_type), size_tokens }, loc),
                name,
                func,
            )
        }
        DeclNode::Function { shape, inner } => {
            let (inner_type, name, _) = apply_declarator(base, *inner);
            let loc = inner_type.location.clone();
            let func_type = Type::new(
                TypeKind::Function(Box::new(FunctionType {
                    return_type: Box::new(inner_type),
                    parameters: shape.parameters.clone(),
                    is_variadic: shape.is_variadic,
                    cv: shape.cv,
                    ref_qual: shape.ref_qual,
                    noexcept: shape.noexcept.clone(),
                    trailing_return: shape.trailing_return.clone().map(Box::new),
                })),
                loc,
            );
            (func_type, name, Some(shape))
        }
    }
}

fn canonicalize_fundamental(words: &[Keyword]) -> String {
    let mut signedness: Option<&str> = None;
    let mut size: Vec<&str> = Vec::new();
    let mut base: Option<&str> = None;
    for w in words {
        match w {
            Keyword::Signed => signedness = Some("signed"),
            Keyword::Unsigned => signedness = Some("unsigned"),
            Keyword::Short => size.push("short"),
            Keyword::Long => size.push("long"),
            Keyword::Int => base = Some("int"),
            Keyword::Char => base = Some("char"),
            Keyword::Char8_t => base = Some("char8_t"),
            Keyword::Char16_t => base = Some("char16_t"),
            Keyword::Char32_t => base = Some("char32_t"),
            Keyword::Wchar_t => base = Some("wchar_t"),
            Keyword::Bool => base = Some("bool"),
            Keyword::Void => base = Some("void"),
            Keyword::Float => base = Some("float"),
            Keyword::Double => base = Some("double"),
            _ => {}
        }
    }
    let mut parts: Vec<&str> = Vec::new();
    if let Some(s) = signedness {
        parts.push(s);
    }
    parts.extend(size);
    match base {
        Some(b) => parts.push(b),
        None => parts.push("int"),
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use crate::ast::{Declaration, NameSegment, TemplateArgument, TypeKind};
    use crate::options::Options;
    use crate::parse;

    #[test]
    fn template_argument_pack_wraps_in_pack_type() {
        let (ast, diagnostics) = parse(
            "pack.h",
            "template<typename... Args> using Tuple = Base<Args...>;",
            Options::default(),
        )
        .unwrap();
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let Declaration::Using { type_, .. } = &ast.declarations[0] else {
            panic!("expected a using-alias declaration");
        };
        let TypeKind::Named { name, .. } = &type_.kind else {
            panic!("expected a named type, got {:?}", type_.kind);
        };
        let NameSegment::TemplateId { arguments, .. } = name.segments.last().unwrap() else {
            panic!("expected a template-id segment");
        };
        match &arguments[0] {
            TemplateArgument::Type(inner) => assert!(matches!(inner.kind, TypeKind::Pack(_))),
            other => panic!("expected a type argument, got {other:?}"),
        }
    }

    #[test]
    fn function_parameter_list_requires_clause_is_captured() {
        let (ast, diagnostics) = parse(
            "req.h",
            "template<typename T> void f(T x) requires true;",
            Options::default(),
        )
        .unwrap();
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let Declaration::Function(f) = &ast.declarations[0] else {
            panic!("expected a function declaration");
        };
        assert!(f.requires_clause.is_some());
    }
}
