//! Token types produced by the lexer.

use quickc_core::Span;
use std::fmt;

/// A token from the source code.
///
/// The lexeme is copied into the arena, so tokens outlive the source string.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    pub kind: TokenKind,
    pub lexeme: &'ast str,
    pub span: Span,
}

impl<'ast> Token<'ast> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }

    /// How the token reads in an error message.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Identifier => format!("'{}'", self.lexeme),
            TokenKind::Eof | TokenKind::Error => self.kind.description().to_string(),
            k if k.is_literal() => format!("{} {}", k.description(), self.lexeme),
            k => k.description().to_string(),
        }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Literals
    // =========================================
    /// `42`
    IntLiteral,
    /// `42L`
    LongLiteral,
    /// `3.14`, `1e10`, `2d`
    DoubleLiteral,
    /// `"hello"`, `@"C:\path"`
    StringLiteral,

    Identifier,

    // =========================================
    // Keywords - Types
    // =========================================
    Void,
    Int,
    Long,
    Double,
    Bool,
    String,
    Var,

    // =========================================
    // Keywords - Values
    // =========================================
    True,
    False,
    This,

    // =========================================
    // Keywords - Control Flow
    // =========================================
    If,
    Else,
    While,
    Do,
    For,
    Break,
    Continue,
    Return,

    // =========================================
    // Keywords - Declarations
    // =========================================
    Using,
    Namespace,
    Class,
    Public,
    Private,
    Protected,
    Internal,
    Static,
    Readonly,

    // =========================================
    // Operators
    // =========================================
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Equal,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    EqualEqual,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    AmpAmp,
    PipePipe,
    Bang,
    PlusPlus,
    MinusMinus,
    Question,
    Colon,
    Dot,
    /// `=>`
    Arrow,

    // =========================================
    // Delimiters
    // =========================================
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Semicolon,
    Comma,

    Eof,
    /// Unrecognized input; the error was recorded by the lexer.
    Error,
}

impl TokenKind {
    pub fn is_literal(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            IntLiteral | LongLiteral | DoubleLiteral | StringLiteral | True | False
        )
    }

    /// Keywords that name a primitive type.
    pub fn is_primitive_type(self) -> bool {
        use TokenKind::*;
        matches!(self, Void | Int | Long | Double | Bool | String)
    }

    pub fn is_modifier(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Public | Private | Protected | Internal | Static | Readonly
        )
    }

    pub fn description(self) -> &'static str {
        use TokenKind::*;
        match self {
            IntLiteral => "integer literal",
            LongLiteral => "long literal",
            DoubleLiteral => "double literal",
            StringLiteral => "string literal",
            Identifier => "identifier",
            Void => "'void'",
            Int => "'int'",
            Long => "'long'",
            Double => "'double'",
            Bool => "'bool'",
            String => "'string'",
            Var => "'var'",
            True => "'true'",
            False => "'false'",
            This => "'this'",
            If => "'if'",
            Else => "'else'",
            While => "'while'",
            Do => "'do'",
            For => "'for'",
            Break => "'break'",
            Continue => "'continue'",
            Return => "'return'",
            Using => "'using'",
            Namespace => "'namespace'",
            Class => "'class'",
            Public => "'public'",
            Private => "'private'",
            Protected => "'protected'",
            Internal => "'internal'",
            Static => "'static'",
            Readonly => "'readonly'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Percent => "'%'",
            Equal => "'='",
            PlusEqual => "'+='",
            MinusEqual => "'-='",
            StarEqual => "'*='",
            SlashEqual => "'/='",
            PercentEqual => "'%='",
            EqualEqual => "'=='",
            BangEqual => "'!='",
            Less => "'<'",
            LessEqual => "'<='",
            Greater => "'>'",
            GreaterEqual => "'>='",
            AmpAmp => "'&&'",
            PipePipe => "'||'",
            Bang => "'!'",
            PlusPlus => "'++'",
            MinusMinus => "'--'",
            Question => "'?'",
            Colon => "':'",
            Dot => "'.'",
            Arrow => "'=>'",
            LeftParen => "'('",
            RightParen => "')'",
            LeftBracket => "'['",
            RightBracket => "']'",
            LeftBrace => "'{'",
            RightBrace => "'}'",
            Semicolon => "';'",
            Comma => "','",
            Eof => "end of file",
            Error => "invalid token",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Map a keyword string to its [`TokenKind`].
///
/// `var` is contextual in the language but reserved here; it cannot name a
/// local or member.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match ident {
        "void" => Void,
        "int" => Int,
        "long" => Long,
        "double" => Double,
        "bool" => Bool,
        "string" => String,
        "var" => Var,

        "true" => True,
        "false" => False,
        "this" => This,

        "if" => If,
        "else" => Else,
        "while" => While,
        "do" => Do,
        "for" => For,
        "break" => Break,
        "continue" => Continue,
        "return" => Return,

        "using" => Using,
        "namespace" => Namespace,
        "class" => Class,
        "public" => Public,
        "private" => Private,
        "protected" => Protected,
        "internal" => Internal,
        "static" => Static,
        "readonly" => Readonly,

        _ => return None,
    })
}
