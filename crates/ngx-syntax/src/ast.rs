//! Typed views over the untyped tree and the node visitor.
//!
//! Every wrapper is a `Copy` newtype around a [`SyntaxNode`]; accessors are
//! filtered passes over the node's children in source order.

use std::marker::PhantomData;

use crate::{Children, NodeOrToken, SyntaxKind, SyntaxNode, SyntaxToken};

pub trait AstNode<'a>: Copy {
    fn can_cast(kind: SyntaxKind) -> bool;

    fn cast(syntax: SyntaxNode<'a>) -> Option<Self>;

    fn syntax(self) -> SyntaxNode<'a>;

    /// Dispatches to the visitor method for this node's kind.
    fn accept<V: Visitor<'a> + ?Sized>(self, visitor: &mut V) {
        accept(self.syntax(), visitor);
    }
}

macro_rules! ast_nodes {
    ($($(#[$meta:meta])* $name:ident => $kind:ident, $visit:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $name<'a>(SyntaxNode<'a>);

            impl<'a> AstNode<'a> for $name<'a> {
                #[inline]
                fn can_cast(kind: SyntaxKind) -> bool {
                    kind == SyntaxKind::$kind
                }

                #[inline]
                fn cast(syntax: SyntaxNode<'a>) -> Option<Self> {
                    Self::can_cast(syntax.kind()).then_some(Self(syntax))
                }

                #[inline]
                fn syntax(self) -> SyntaxNode<'a> {
                    self.0
                }
            }
        )*

        /// Tree visitor with one method per node kind.
        ///
        /// Every method defaults to visiting the node's children, so an
        /// implementation only overrides the kinds it cares about and still
        /// reaches everything below them. Call [`walk`] from an override to
        /// keep descending.
        pub trait Visitor<'a> {
            fn visit_token(&mut self, _token: SyntaxToken<'a>) {}

            $(
                fn $visit(&mut self, node: $name<'a>) {
                    walk(self, node.syntax());
                }
            )*
        }

        /// Calls the visitor method matching `node`'s kind.
        pub fn accept<'a, V: Visitor<'a> + ?Sized>(node: SyntaxNode<'a>, visitor: &mut V) {
            match node.kind() {
                $(SyntaxKind::$kind => visitor.$visit($name(node)),)*
                _ => walk(visitor, node),
            }
        }
    };
}

ast_nodes! {
    SourceFile => SOURCE_FILE, visit_source_file;
    BlockStmt => BLOCK_STMT, visit_block_stmt;
    DirectiveStmt => DIRECTIVE_STMT, visit_directive_stmt;
    ConditionStmt => CONDITION_STMT, visit_condition_stmt;
    ConditionExpr => CONDITION_EXPR, visit_condition_expr;
    VariableStmt => VARIABLE_STMT, visit_variable_stmt;
    IncludeDirectiveStmt => INCLUDE_DIRECTIVE_STMT, visit_include_directive_stmt;
    GeoStmt => GEO_STMT, visit_geo_stmt;
    GeoBlockStmt => GEO_BLOCK_STMT, visit_geo_block_stmt;
    /// One `;`-terminated entry of a geo block.
    GeoBlockContent => GEO_BLOCK_CONTENT, visit_geo_block_content;
    GeoDefaultStmt => GEO_DEFAULT_STMT, visit_geo_default_stmt;
    GeoDeleteStmt => GEO_DELETE_STMT, visit_geo_delete_stmt;
    GeoIncludeStmt => GEO_INCLUDE_STMT, visit_geo_include_stmt;
    /// `proxy <address>` or `proxy_recursive`.
    GeoProxyStmt => GEO_PROXY_STMT, visit_geo_proxy_stmt;
    GeoRangesStmt => GEO_RANGES_STMT, visit_geo_ranges_stmt;
    GeoValueStmt => GEO_VALUE_STMT, visit_geo_value_stmt;
    AccessByLuaBlockStmt => ACCESS_BY_LUA_BLOCK_STMT, visit_access_by_lua_block_stmt;
    ContentByLuaBlockStmt => CONTENT_BY_LUA_BLOCK_STMT, visit_content_by_lua_block_stmt;
    RewriteByLuaBlockStmt => REWRITE_BY_LUA_BLOCK_STMT, visit_rewrite_by_lua_block_stmt;
    SetByLuaBlockStmt => SET_BY_LUA_BLOCK_STMT, visit_set_by_lua_block_stmt;
    SslCertificateByLuaBlockStmt => SSL_CERTIFICATE_BY_LUA_BLOCK_STMT,
        visit_ssl_certificate_by_lua_block_stmt;
    /// Any other `*_by_lua_block` directive.
    LuaBlockStmt => LUA_BLOCK_STMT, visit_lua_block_stmt;
    /// Span the parser could not make sense of.
    ErrorNode => ERROR, visit_error;
}

/// Visits the children of `node` in source order.
pub fn walk<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, node: SyntaxNode<'a>) {
    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(node) => accept(node, visitor),
            NodeOrToken::Token(token) => visitor.visit_token(token),
        }
    }
}

/// Typed child nodes of one kind, in source order.
#[derive(Clone)]
pub struct AstChildren<'a, N> {
    inner: Children<'a>,
    _marker: PhantomData<N>,
}

impl<'a, N: AstNode<'a>> Iterator for AstChildren<'a, N> {
    type Item = N;

    #[inline]
    fn next(&mut self) -> Option<N> {
        self.inner.find_map(N::cast)
    }
}

impl<'a> SyntaxNode<'a> {
    /// Child nodes that cast to `N`, in source order.
    #[inline]
    pub fn children_of<N: AstNode<'a>>(self) -> AstChildren<'a, N> {
        AstChildren { inner: self.children(), _marker: PhantomData }
    }
}

fn token(node: SyntaxNode<'_>, kind: SyntaxKind) -> Option<SyntaxToken<'_>> {
    node.child_tokens().find(|token| token.kind() == kind)
}

fn values(node: SyntaxNode<'_>) -> impl Iterator<Item = SyntaxToken<'_>> {
    node.child_tokens().filter(|token| token.kind().is_value())
}

/// Anything that can stand in a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stmt<'a> {
    Directive(DirectiveStmt<'a>),
    Condition(ConditionStmt<'a>),
    Variable(VariableStmt<'a>),
    Include(IncludeDirectiveStmt<'a>),
    Geo(GeoStmt<'a>),
    LuaBlock(AnyLuaBlock<'a>),
}

impl<'a> AstNode<'a> for Stmt<'a> {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::DIRECTIVE_STMT
                | SyntaxKind::CONDITION_STMT
                | SyntaxKind::VARIABLE_STMT
                | SyntaxKind::INCLUDE_DIRECTIVE_STMT
                | SyntaxKind::GEO_STMT
        ) || kind.is_lua_block()
    }

    fn cast(syntax: SyntaxNode<'a>) -> Option<Self> {
        let stmt = match syntax.kind() {
            SyntaxKind::DIRECTIVE_STMT => Self::Directive(DirectiveStmt(syntax)),
            SyntaxKind::CONDITION_STMT => Self::Condition(ConditionStmt(syntax)),
            SyntaxKind::VARIABLE_STMT => Self::Variable(VariableStmt(syntax)),
            SyntaxKind::INCLUDE_DIRECTIVE_STMT => Self::Include(IncludeDirectiveStmt(syntax)),
            SyntaxKind::GEO_STMT => Self::Geo(GeoStmt(syntax)),
            kind if kind.is_lua_block() => Self::LuaBlock(AnyLuaBlock(syntax)),
            _ => return None,
        };
        Some(stmt)
    }

    fn syntax(self) -> SyntaxNode<'a> {
        match self {
            Self::Directive(it) => it.0,
            Self::Condition(it) => it.0,
            Self::Variable(it) => it.0,
            Self::Include(it) => it.0,
            Self::Geo(it) => it.0,
            Self::LuaBlock(it) => it.0,
        }
    }
}

impl<'a> SourceFile<'a> {
    pub fn statements(self) -> AstChildren<'a, Stmt<'a>> {
        self.0.children_of()
    }

    pub fn errors(self) -> AstChildren<'a, ErrorNode<'a>> {
        self.0.children_of()
    }
}

impl<'a> BlockStmt<'a> {
    pub fn statements(self) -> AstChildren<'a, Stmt<'a>> {
        self.0.children_of()
    }

    pub fn l_brace(self) -> Option<SyntaxToken<'a>> {
        token(self.0, SyntaxKind::LEFT_BRACE)
    }

    pub fn r_brace(self) -> Option<SyntaxToken<'a>> {
        token(self.0, SyntaxKind::RIGHT_BRACE)
    }
}

impl<'a> DirectiveStmt<'a> {
    pub fn name(self) -> Option<SyntaxToken<'a>> {
        values(self.0).next()
    }

    pub fn args(self) -> impl Iterator<Item = SyntaxToken<'a>> {
        values(self.0).skip(1)
    }

    pub fn block(self) -> Option<BlockStmt<'a>> {
        self.0.children_of().next()
    }

    pub fn semicolon(self) -> Option<SyntaxToken<'a>> {
        token(self.0, SyntaxKind::SEMICOLON)
    }
}

impl<'a> ConditionStmt<'a> {
    /// Expressions between the parentheses, left to right.
    pub fn conditions(self) -> AstChildren<'a, ConditionExpr<'a>> {
        self.0.children_of()
    }

    pub fn l_paren(self) -> Option<SyntaxToken<'a>> {
        token(self.0, SyntaxKind::LEFT_PAREN)
    }

    pub fn r_paren(self) -> Option<SyntaxToken<'a>> {
        token(self.0, SyntaxKind::RIGHT_PAREN)
    }

    pub fn block(self) -> Option<BlockStmt<'a>> {
        self.0.children_of().next()
    }
}

impl<'a> ConditionExpr<'a> {
    pub fn operator(self) -> Option<SyntaxToken<'a>> {
        token(self.0, SyntaxKind::OPERATOR)
    }

    /// `$a` in `$a = b`, or `None` for a prefix test like `-f $file`.
    pub fn lhs(self) -> Option<SyntaxToken<'a>> {
        let first = self.0.child_tokens().next()?;
        first.kind().is_value().then_some(first)
    }

    pub fn rhs(self) -> Option<SyntaxToken<'a>> {
        self.operator()?;
        self.0.child_tokens().skip_while(|token| token.kind() != SyntaxKind::OPERATOR).nth(1)
    }
}

impl<'a> VariableStmt<'a> {
    pub fn name(self) -> Option<SyntaxToken<'a>> {
        values(self.0).next()
    }

    pub fn value(self) -> Option<SyntaxToken<'a>> {
        values(self.0).nth(1)
    }
}

impl<'a> IncludeDirectiveStmt<'a> {
    pub fn path(self) -> Option<SyntaxToken<'a>> {
        values(self.0).next()
    }
}

impl<'a> GeoStmt<'a> {
    /// The optional source address, `$remote_addr` when omitted.
    pub fn address(self) -> Option<SyntaxToken<'a>> {
        let mut values = values(self.0);
        let first = values.next()?;
        values.next().map(|_| first)
    }

    /// The variable that receives the mapped value.
    pub fn variable(self) -> Option<SyntaxToken<'a>> {
        values(self.0).take(2).last()
    }

    pub fn block(self) -> Option<GeoBlockStmt<'a>> {
        self.0.children_of().next()
    }
}

impl<'a> GeoBlockStmt<'a> {
    pub fn entries(self) -> AstChildren<'a, GeoBlockContent<'a>> {
        self.0.children_of()
    }

    pub fn l_brace(self) -> Option<SyntaxToken<'a>> {
        token(self.0, SyntaxKind::LEFT_BRACE)
    }

    pub fn r_brace(self) -> Option<SyntaxToken<'a>> {
        token(self.0, SyntaxKind::RIGHT_BRACE)
    }
}

/// The single statement a geo entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoEntry<'a> {
    Default(GeoDefaultStmt<'a>),
    Delete(GeoDeleteStmt<'a>),
    Include(GeoIncludeStmt<'a>),
    Proxy(GeoProxyStmt<'a>),
    Ranges(GeoRangesStmt<'a>),
    Value(GeoValueStmt<'a>),
}

impl<'a> AstNode<'a> for GeoEntry<'a> {
    fn can_cast(kind: SyntaxKind) -> bool {
        kind.is_geo_entry()
    }

    fn cast(syntax: SyntaxNode<'a>) -> Option<Self> {
        let entry = match syntax.kind() {
            SyntaxKind::GEO_DEFAULT_STMT => Self::Default(GeoDefaultStmt(syntax)),
            SyntaxKind::GEO_DELETE_STMT => Self::Delete(GeoDeleteStmt(syntax)),
            SyntaxKind::GEO_INCLUDE_STMT => Self::Include(GeoIncludeStmt(syntax)),
            SyntaxKind::GEO_PROXY_STMT => Self::Proxy(GeoProxyStmt(syntax)),
            SyntaxKind::GEO_RANGES_STMT => Self::Ranges(GeoRangesStmt(syntax)),
            SyntaxKind::GEO_VALUE_STMT => Self::Value(GeoValueStmt(syntax)),
            _ => return None,
        };
        Some(entry)
    }

    fn syntax(self) -> SyntaxNode<'a> {
        match self {
            Self::Default(it) => it.0,
            Self::Delete(it) => it.0,
            Self::Include(it) => it.0,
            Self::Proxy(it) => it.0,
            Self::Ranges(it) => it.0,
            Self::Value(it) => it.0,
        }
    }
}

impl<'a> GeoBlockContent<'a> {
    /// The authoritative statement of this entry.
    ///
    /// Surplus statements the parser found before the `;` sit inside an
    /// error node and are not returned.
    pub fn entry(self) -> Option<GeoEntry<'a>> {
        self.0.children_of().next()
    }
}

impl<'a> GeoDefaultStmt<'a> {
    pub fn value(self) -> Option<SyntaxToken<'a>> {
        values(self.0).nth(1)
    }
}

impl<'a> GeoDeleteStmt<'a> {
    pub fn network(self) -> Option<SyntaxToken<'a>> {
        values(self.0).nth(1)
    }
}

impl<'a> GeoIncludeStmt<'a> {
    pub fn path(self) -> Option<SyntaxToken<'a>> {
        values(self.0).next()
    }
}

impl<'a> GeoProxyStmt<'a> {
    pub fn is_recursive(self) -> bool {
        values(self.0).next().is_some_and(|token| token.text_trimmed() == "proxy_recursive")
    }

    pub fn address(self) -> Option<SyntaxToken<'a>> {
        values(self.0).nth(1)
    }
}

impl<'a> GeoValueStmt<'a> {
    pub fn network(self) -> Option<SyntaxToken<'a>> {
        values(self.0).next()
    }

    pub fn value(self) -> Option<SyntaxToken<'a>> {
        values(self.0).nth(1)
    }
}

/// Any `*_by_lua_block` statement, regardless of its concrete kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnyLuaBlock<'a>(SyntaxNode<'a>);

impl<'a> AstNode<'a> for AnyLuaBlock<'a> {
    fn can_cast(kind: SyntaxKind) -> bool {
        kind.is_lua_block()
    }

    fn cast(syntax: SyntaxNode<'a>) -> Option<Self> {
        Self::can_cast(syntax.kind()).then_some(Self(syntax))
    }

    fn syntax(self) -> SyntaxNode<'a> {
        self.0
    }
}

impl<'a> AnyLuaBlock<'a> {
    pub fn name(self) -> Option<SyntaxToken<'a>> {
        token(self.0, SyntaxKind::LUA_BLOCK_KW)
    }

    /// Arguments before the body, like the target variable of `set_by_lua_block`.
    pub fn args(self) -> impl Iterator<Item = SyntaxToken<'a>> {
        values(self.0)
    }

    /// The raw script between the braces; `None` for an empty body.
    pub fn lua_code(self) -> Option<SyntaxToken<'a>> {
        token(self.0, SyntaxKind::LUA_CODE)
    }

    pub fn l_brace(self) -> Option<SyntaxToken<'a>> {
        token(self.0, SyntaxKind::LEFT_BRACE)
    }

    pub fn r_brace(self) -> Option<SyntaxToken<'a>> {
        token(self.0, SyntaxKind::RIGHT_BRACE)
    }
}
