#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[repr(u8)]
pub enum SyntaxKind {
    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACE,
    RIGHT_BRACE,
    SEMICOLON,

    IF_KW,
    SET_KW,
    INCLUDE_KW,
    GEO_KW,
    /// Any word ending in `_by_lua_block`.
    LUA_BLOCK_KW,

    WORD,
    VARIABLE,
    STRING,
    OPERATOR,
    LUA_CODE,

    WHITESPACE,
    NEWLINE,
    COMMENT,

    /// Malformed input the lexer gave up on (unterminated string or Lua body).
    ERROR_TOKEN,
    EOF,

    SOURCE_FILE,
    BLOCK_STMT,
    DIRECTIVE_STMT,
    CONDITION_STMT,
    CONDITION_EXPR,
    VARIABLE_STMT,
    INCLUDE_DIRECTIVE_STMT,
    GEO_STMT,
    GEO_BLOCK_STMT,
    GEO_BLOCK_CONTENT,
    GEO_DEFAULT_STMT,
    GEO_DELETE_STMT,
    GEO_INCLUDE_STMT,
    GEO_PROXY_STMT,
    GEO_RANGES_STMT,
    GEO_VALUE_STMT,
    ACCESS_BY_LUA_BLOCK_STMT,
    CONTENT_BY_LUA_BLOCK_STMT,
    REWRITE_BY_LUA_BLOCK_STMT,
    SET_BY_LUA_BLOCK_STMT,
    SSL_CERTIFICATE_BY_LUA_BLOCK_STMT,
    LUA_BLOCK_STMT,
    ERROR,
    TOMBSTONE,
}

impl SyntaxKind {
    /// Whitespace, newlines and comments.
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::NEWLINE | Self::COMMENT)
    }

    /// Tokens usable as a directive name or argument.
    #[inline]
    pub fn is_value(self) -> bool {
        matches!(self, Self::WORD | Self::VARIABLE | Self::STRING)
    }

    #[inline]
    pub fn is_token(self) -> bool {
        (self as u8) <= (Self::EOF as u8)
    }

    pub fn is_lua_block(self) -> bool {
        matches!(
            self,
            Self::ACCESS_BY_LUA_BLOCK_STMT
                | Self::CONTENT_BY_LUA_BLOCK_STMT
                | Self::REWRITE_BY_LUA_BLOCK_STMT
                | Self::SET_BY_LUA_BLOCK_STMT
                | Self::SSL_CERTIFICATE_BY_LUA_BLOCK_STMT
                | Self::LUA_BLOCK_STMT
        )
    }

    pub fn is_geo_entry(self) -> bool {
        matches!(
            self,
            Self::GEO_DEFAULT_STMT
                | Self::GEO_DELETE_STMT
                | Self::GEO_INCLUDE_STMT
                | Self::GEO_PROXY_STMT
                | Self::GEO_RANGES_STMT
                | Self::GEO_VALUE_STMT
        )
    }

    /// Picks the statement kind for a `*_by_lua_block` directive name.
    pub fn lua_block_stmt(name: &str) -> Self {
        match name {
            "access_by_lua_block" => Self::ACCESS_BY_LUA_BLOCK_STMT,
            "content_by_lua_block" => Self::CONTENT_BY_LUA_BLOCK_STMT,
            "rewrite_by_lua_block" => Self::REWRITE_BY_LUA_BLOCK_STMT,
            "set_by_lua_block" => Self::SET_BY_LUA_BLOCK_STMT,
            "ssl_certificate_by_lua_block" => Self::SSL_CERTIFICATE_BY_LUA_BLOCK_STMT,
            _ => Self::LUA_BLOCK_STMT,
        }
    }
}
