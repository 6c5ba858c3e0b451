//! The [`Lexer`] converts source text into a stream of [`Token`]s.
//!
//! Lexemes are copied into the arena so the source string can be dropped
//! once lexing completes. String literal tokens carry their *decoded* text
//! as the lexeme (escapes resolved, quotes stripped); their span still
//! covers the quoted source.

use bumpalo::Bump;
use quickc_core::{LexError, Span};

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, lookup_keyword};

pub struct Lexer<'src, 'ast> {
    cursor: Cursor<'src>,
    arena: &'ast Bump,
    errors: Vec<LexError>,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
            errors: Vec::new(),
        }
    }

    /// Take accumulated errors, leaving an empty vec.
    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn next_token(&mut self) -> Token<'ast> {
        loop {
            self.skip_whitespace();

            let Some(c) = self.cursor.peek() else {
                return self.make_eof();
            };

            let start_line = self.cursor.line();
            let start_col = self.cursor.column();
            let start_offset = self.cursor.offset();

            if c == '/' {
                match self.cursor.peek_nth(1) {
                    Some('/') => {
                        self.skip_line_comment();
                        continue;
                    }
                    Some('*') => {
                        if self.skip_block_comment(start_line, start_col, start_offset) {
                            continue;
                        }
                        return self.make_eof();
                    }
                    _ => {}
                }
            }

            return match c {
                '"' => self.scan_string(start_line, start_col, start_offset),
                '@' if self.cursor.peek_nth(1) == Some('"') => {
                    self.scan_verbatim_string(start_line, start_col, start_offset)
                }
                c if c.is_ascii_digit() => self.scan_number(start_line, start_col, start_offset),
                '.' if self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                    self.scan_number(start_line, start_col, start_offset)
                }
                c if is_ident_start(c) => {
                    self.scan_identifier(start_line, start_col, start_offset)
                }
                _ => self.scan_operator(start_line, start_col, start_offset),
            };
        }
    }

    // =========================================
    // Internal: helpers
    // =========================================

    fn skip_whitespace(&mut self) {
        self.cursor.eat('\u{FEFF}');
        self.cursor.eat_while(char::is_whitespace);
    }

    fn skip_line_comment(&mut self) {
        self.cursor.eat_while(|c| c != '\n');
    }

    /// Returns false when the comment runs to end of file.
    fn skip_block_comment(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> bool {
        self.cursor.advance();
        self.cursor.advance();
        loop {
            match self.cursor.advance() {
                None => {
                    let len = self.cursor.offset() - start_offset;
                    self.errors.push(LexError::UnterminatedComment {
                        span: Span::new(start_line, start_col, len),
                    });
                    return false;
                }
                Some('*') if self.cursor.eat('/') => return true,
                Some(_) => {}
            }
        }
    }

    fn make_eof(&self) -> Token<'ast> {
        Token::new(
            TokenKind::Eof,
            "",
            Span::point(self.cursor.line(), self.cursor.column()),
        )
    }

    fn span_from(&self, start_line: u32, start_col: u32, start_offset: u32) -> Span {
        let len = self.cursor.offset() - start_offset;
        if self.cursor.line() == start_line {
            Span::new(start_line, start_col, len)
        } else {
            Span::new(start_line, start_col, len.min(1))
        }
    }

    fn make_token(&self, kind: TokenKind, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        let span = self.span_from(start_line, start_col, start_offset);
        let lexeme = self.arena.alloc_str(self.cursor.slice_from(start_offset));
        Token::new(kind, lexeme, span)
    }

    fn make_error(&mut self, error: LexError) -> Token<'ast> {
        let span = error.span();
        self.errors.push(error);
        Token::new(TokenKind::Error, "", span)
    }

    // =========================================
    // Scanning: Strings
    // =========================================

    fn scan_string(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        self.cursor.advance();
        let mut text = String::new();

        loop {
            match self.cursor.peek() {
                None | Some('\n') | Some('\r') => {
                    let span = self.span_from(start_line, start_col, start_offset);
                    return self.make_error(LexError::UnterminatedString { span });
                }
                Some('"') => {
                    self.cursor.advance();
                    let span = self.span_from(start_line, start_col, start_offset);
                    return Token::new(TokenKind::StringLiteral, self.arena.alloc_str(&text), span);
                }
                Some('\\') => {
                    let esc_line = self.cursor.line();
                    let esc_col = self.cursor.column();
                    self.cursor.advance();
                    match self.scan_escape() {
                        Ok(ch) => text.push(ch),
                        Err(ch) => self.errors.push(LexError::InvalidEscape {
                            ch,
                            span: Span::new(esc_line, esc_col, 2),
                        }),
                    }
                }
                Some(c) => {
                    self.cursor.advance();
                    text.push(c);
                }
            }
        }
    }

    /// Decode the escape after a backslash. `Err` carries the offending char.
    fn scan_escape(&mut self) -> Result<char, char> {
        let Some(c) = self.cursor.peek() else {
            return Err(' ');
        };
        if c == '\n' {
            return Err(c);
        }
        self.cursor.advance();
        Ok(match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0C}',
            'v' => '\u{0B}',
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            'u' => {
                let mut code = 0u32;
                for _ in 0..4 {
                    let digit = self.cursor.peek().and_then(|d| d.to_digit(16)).ok_or('u')?;
                    self.cursor.advance();
                    code = code * 16 + digit;
                }
                char::from_u32(code).ok_or('u')?
            }
            other => return Err(other),
        })
    }

    /// `@"..."`: no escapes except `""`, may span lines.
    fn scan_verbatim_string(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        self.cursor.advance();
        self.cursor.advance();
        let mut text = String::new();

        loop {
            match self.cursor.advance() {
                None => {
                    let span = Span::new(start_line, start_col, 2);
                    return self.make_error(LexError::UnterminatedString { span });
                }
                Some('"') if self.cursor.eat('"') => text.push('"'),
                Some('"') => {
                    let span = self.span_from(start_line, start_col, start_offset);
                    return Token::new(TokenKind::StringLiteral, self.arena.alloc_str(&text), span);
                }
                Some(c) => text.push(c),
            }
        }
    }

    // =========================================
    // Scanning: Numbers
    // =========================================

    fn scan_number(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        self.cursor.eat_while(|c| c.is_ascii_digit());
        let mut is_real = false;

        if self.cursor.peek() == Some('.') && self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
            is_real = true;
        }

        if matches!(self.cursor.peek(), Some('e' | 'E')) {
            let signed = matches!(self.cursor.peek_nth(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.cursor.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                self.cursor.advance();
                if signed {
                    self.cursor.advance();
                }
                self.cursor.eat_while(|c| c.is_ascii_digit());
                is_real = true;
            }
        }

        let kind = match self.cursor.peek() {
            Some('d' | 'D') => {
                self.cursor.advance();
                TokenKind::DoubleLiteral
            }
            Some('L' | 'l') if !is_real => {
                self.cursor.advance();
                TokenKind::LongLiteral
            }
            _ if is_real => TokenKind::DoubleLiteral,
            _ => TokenKind::IntLiteral,
        };

        if self.cursor.check(is_ident_continue) {
            self.cursor.eat_while(is_ident_continue);
            let text = self.cursor.slice_from(start_offset).to_string();
            let span = self.span_from(start_line, start_col, start_offset);
            return self.make_error(LexError::InvalidReal { text, span });
        }

        self.make_token(kind, start_line, start_col, start_offset)
    }

    // =========================================
    // Scanning: Identifiers and keywords
    // =========================================

    fn scan_identifier(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        let lexeme = self.cursor.eat_while(is_ident_continue);
        let kind = lookup_keyword(lexeme).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start_line, start_col, start_offset)
    }

    // =========================================
    // Scanning: Operators
    // =========================================

    fn scan_operator(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'ast> {
        let Some(c) = self.cursor.advance() else {
            return self.make_eof();
        };
        let next = self.cursor.peek();

        let kind = match (c, next) {
            ('(', _) => TokenKind::LeftParen,
            (')', _) => TokenKind::RightParen,
            ('[', _) => TokenKind::LeftBracket,
            (']', _) => TokenKind::RightBracket,
            ('{', _) => TokenKind::LeftBrace,
            ('}', _) => TokenKind::RightBrace,
            (';', _) => TokenKind::Semicolon,
            (',', _) => TokenKind::Comma,
            ('?', _) => TokenKind::Question,
            (':', _) => TokenKind::Colon,
            ('.', _) => TokenKind::Dot,

            ('+', Some('+')) => { self.cursor.advance(); TokenKind::PlusPlus }
            ('+', Some('=')) => { self.cursor.advance(); TokenKind::PlusEqual }
            ('+', _) => TokenKind::Plus,

            ('-', Some('-')) => { self.cursor.advance(); TokenKind::MinusMinus }
            ('-', Some('=')) => { self.cursor.advance(); TokenKind::MinusEqual }
            ('-', _) => TokenKind::Minus,

            ('*', Some('=')) => { self.cursor.advance(); TokenKind::StarEqual }
            ('*', _) => TokenKind::Star,

            ('/', Some('=')) => { self.cursor.advance(); TokenKind::SlashEqual }
            ('/', _) => TokenKind::Slash,

            ('%', Some('=')) => { self.cursor.advance(); TokenKind::PercentEqual }
            ('%', _) => TokenKind::Percent,

            ('=', Some('=')) => { self.cursor.advance(); TokenKind::EqualEqual }
            ('=', Some('>')) => { self.cursor.advance(); TokenKind::Arrow }
            ('=', _) => TokenKind::Equal,

            ('!', Some('=')) => { self.cursor.advance(); TokenKind::BangEqual }
            ('!', _) => TokenKind::Bang,

            ('<', Some('=')) => { self.cursor.advance(); TokenKind::LessEqual }
            ('<', _) => TokenKind::Less,

            ('>', Some('=')) => { self.cursor.advance(); TokenKind::GreaterEqual }
            ('>', _) => TokenKind::Greater,

            ('&', Some('&')) => { self.cursor.advance(); TokenKind::AmpAmp }
            ('|', Some('|')) => { self.cursor.advance(); TokenKind::PipePipe }

            _ => {
                let span = self.span_from(start_line, start_col, start_offset);
                return self.make_error(LexError::UnexpectedChar { ch: c, span });
            }
        };

        self.make_token(kind, start_line, start_col, start_offset)
    }
}

impl<'src, 'ast> Iterator for Lexer<'src, 'ast> {
    type Item = Token<'ast>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> Vec<(TokenKind, String)> {
        let arena = Bump::new();
        Lexer::new(source, &arena)
            .map(|t| (t.kind, t.lexeme.to_string()))
            .collect()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|(k, _)| k).collect()
    }

    fn errors(source: &str) -> Vec<LexError> {
        let arena = Bump::new();
        let mut lexer = Lexer::new(source, &arena);
        while lexer.next_token().kind != TokenKind::Eof {}
        lexer.take_errors()
    }

    #[test]
    fn empty_and_whitespace() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  \n\t\r\n").is_empty());
        assert!(tokenize("\u{FEFF}").is_empty());
    }

    #[test]
    fn keywords_and_identifiers() {
        use TokenKind::*;
        assert_eq!(
            kinds("public class Writer { void Write(string message) }"),
            [Public, Class, Identifier, LeftBrace, Void, Identifier, LeftParen, String, Identifier, RightParen, RightBrace]
        );
    }

    #[test]
    fn numeric_literals() {
        use TokenKind::*;
        assert_eq!(
            kinds("42 42L 3.14 1e3 2d .5"),
            [IntLiteral, LongLiteral, DoubleLiteral, DoubleLiteral, DoubleLiteral, DoubleLiteral]
        );
    }

    #[test]
    fn member_access_on_integer_is_not_a_real() {
        use TokenKind::*;
        assert_eq!(kinds("5.ToString()"), [IntLiteral, Dot, Identifier, LeftParen, RightParen]);
    }

    #[test]
    fn string_escapes_are_decoded() {
        let toks = tokenize(r#""a\tb\"c\u0041""#);
        assert_eq!(toks, [(TokenKind::StringLiteral, "a\tb\"cA".to_string())]);
    }

    #[test]
    fn verbatim_strings() {
        let toks = tokenize("@\"C:\\dir\\\"\"x\"\"\"");
        assert_eq!(toks, [(TokenKind::StringLiteral, "C:\\dir\\\"x\"".to_string())]);
    }

    #[test]
    fn unterminated_string_stops_at_newline() {
        let errs = errors("\"abc\nint");
        assert!(matches!(errs[0], LexError::UnterminatedString { .. }));
        assert_eq!(kinds("\"abc\nint").last(), Some(&TokenKind::Int));
    }

    #[test]
    fn invalid_escape_is_reported() {
        let errs = errors(r#""\q""#);
        assert!(matches!(errs[0], LexError::InvalidEscape { ch: 'q', .. }));
    }

    #[test]
    fn comments_are_skipped() {
        use TokenKind::*;
        assert_eq!(kinds("a // x\n/* y\n z */ b"), [Identifier, Identifier]);
        assert!(matches!(errors("/* open")[0], LexError::UnterminatedComment { .. }));
    }

    #[test]
    fn operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("+= ++ => == != <= >= && || ! % ?:"),
            [PlusEqual, PlusPlus, Arrow, EqualEqual, BangEqual, LessEqual, GreaterEqual, AmpAmp, PipePipe, Bang, Percent, Question, Colon]
        );
    }

    #[test]
    fn unexpected_character() {
        assert_eq!(kinds("a # b"), [TokenKind::Identifier, TokenKind::Error, TokenKind::Identifier]);
        assert!(matches!(errors("#")[0], LexError::UnexpectedChar { ch: '#', .. }));
    }

    #[test]
    fn spans_are_one_indexed() {
        let arena = Bump::new();
        let toks: Vec<_> = Lexer::new("x\n  foo", &arena).collect();
        assert_eq!(toks[1].span, Span::new(2, 3, 3));
    }
}
