//! Parser infrastructure: token buffer, navigation, error recovery and the
//! nesting guard.

use bumpalo::Bump;
use quickc_core::{ParseError, ParseErrorKind, ParseErrors, Span};

use crate::ast::{Ident, Script};
use crate::lexer::{Lexer, Token, TokenKind};

/// Deepest nesting of blocks and expressions the parser accepts.
///
/// Class bodies, statements and every operand that is not the left side of
/// a binary operator count one level each. The bound keeps both the parser
/// and the compiler's recursive walks within a default 2 MiB thread stack in
/// unoptimized builds.
pub const MAX_NESTING: u32 = 64;

/// A parsed script plus the syntax errors recovered from along the way.
#[derive(Debug)]
pub struct ParseOutput<'ast> {
    pub script: Script<'ast>,
    pub errors: ParseErrors,
}

/// Recursive-descent parser over an eagerly tokenized buffer.
///
/// AST nodes and token lexemes live in `'ast`; the source string is only
/// needed during [`Parser::new`].
pub struct Parser<'ast> {
    pub(super) buffer: Vec<Token<'ast>>,
    pub(super) position: usize,
    pub(super) errors: ParseErrors,
    pub(super) arena: &'ast Bump,
    depth: u32,
    /// Set once the nesting guard trips; parsing unwinds without recovery.
    fatal: Option<ParseError>,
}

impl<'ast> Parser<'ast> {
    pub fn new(source: &str, arena: &'ast Bump) -> Self {
        let mut lexer = Lexer::new(source, arena);
        let mut buffer = Vec::with_capacity((source.len() / 6).clamp(64, 16384));
        let mut errors = ParseErrors::new();

        loop {
            let token = lexer.next_token();

            for lex_error in lexer.take_errors() {
                errors.push(lex_error.into());
            }

            match token.kind {
                // Already reported; the parser never sees these.
                TokenKind::Error => continue,
                TokenKind::Eof => {
                    buffer.push(token);
                    break;
                }
                _ => buffer.push(token),
            }
        }

        Self {
            buffer,
            position: 0,
            errors,
            arena,
            depth: 0,
            fatal: None,
        }
    }

    /// Parse a complete source text.
    ///
    /// Ordinary syntax errors are recovered from and returned in
    /// [`ParseOutput::errors`]. `Err` means the source could not be parsed at
    /// all: it is larger than spans can address, or nesting exceeded
    /// [`MAX_NESTING`].
    pub fn parse(source: &str, arena: &'ast Bump) -> Result<ParseOutput<'ast>, ParseError> {
        #[cfg(feature = "profiling")]
        profiling::scope!("Parser::parse");

        if u32::try_from(source.len()).is_err() {
            return Err(ParseError::new(
                ParseErrorKind::SourceTooLarge,
                Span::default(),
                format!("source of {} bytes is too large to compile", source.len()),
            ));
        }

        let mut parser = Parser::new(source, arena);
        let script = parser.parse_script();

        if let Some(fatal) = parser.fatal.take() {
            return Err(fatal);
        }

        tracing::trace!(
            tokens = parser.buffer.len(),
            errors = parser.errors.len(),
            "parsed source"
        );

        Ok(ParseOutput {
            script,
            errors: parser.take_errors(),
        })
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn take_errors(&mut self) -> ParseErrors {
        std::mem::take(&mut self.errors)
    }

    // ========================================================================
    // Token Navigation
    // ========================================================================

    #[inline]
    pub fn peek(&self) -> Token<'ast> {
        self.peek_nth(0)
    }

    /// Peek ahead n tokens; past the end this keeps returning EOF.
    pub fn peek_nth(&self, n: usize) -> Token<'ast> {
        let index = (self.position + n).min(self.buffer.len().saturating_sub(1));
        match self.buffer.get(index) {
            Some(token) => *token,
            None => Token::new(TokenKind::Eof, "", Span::default()),
        }
    }

    /// Return the current token and move past it. EOF is never consumed.
    pub fn advance(&mut self) -> Token<'ast> {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    /// The most recently consumed token.
    pub fn previous(&self) -> Token<'ast> {
        match self.position.checked_sub(1).and_then(|i| self.buffer.get(i)) {
            Some(token) => *token,
            None => self.peek(),
        }
    }

    #[inline]
    pub fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    pub fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub fn expect(&mut self, kind: TokenKind) -> Result<Token<'ast>, ParseError> {
        if self.check(kind) {
            return Ok(self.advance());
        }

        let found = self.peek();
        Err(match kind {
            TokenKind::Semicolon => {
                // Point just past the previous token, where the `;` belongs.
                let prev = self.previous();
                ParseError::new(
                    ParseErrorKind::MissingSemicolon,
                    Span::point(prev.span.line, prev.span.col + prev.span.len),
                    "; expected",
                )
            }
            TokenKind::Identifier => ParseError::expected_identifier(found.span, &found.describe()),
            TokenKind::RightBrace if found.kind == TokenKind::Eof => {
                ParseError::new(ParseErrorKind::UnexpectedEof, found.span, "} expected")
            }
            _ => ParseError::expected_token(found.span, kind.description(), &found.describe()),
        })
    }

    /// Expect the `;` ending a statement. A missing one is reported and
    /// parsing continues as if it were there.
    pub fn expect_semicolon(&mut self) {
        if let Err(err) = self.expect(TokenKind::Semicolon) {
            self.report(err);
        }
    }

    pub fn expect_ident(&mut self) -> Result<Ident<'ast>, ParseError> {
        let token = self.expect(TokenKind::Identifier)?;
        Ok(Ident::new(token.lexeme, token.span))
    }

    /// Span from `start` through the last consumed token.
    pub fn span_from(&self, start: Span) -> Span {
        start.merge(self.previous().span)
    }

    // ========================================================================
    // Nesting Guard
    // ========================================================================

    /// Enter one level of nesting. Fails, and marks the parse fatal, past
    /// [`MAX_NESTING`].
    pub fn enter(&mut self) -> Result<(), ParseError> {
        if let Some(fatal) = &self.fatal {
            return Err(fatal.clone());
        }
        self.depth += 1;
        if self.depth > MAX_NESTING {
            let error = ParseError::new(
                ParseErrorKind::NestingTooDeep,
                self.peek().span,
                format!("nesting exceeds {MAX_NESTING} levels"),
            );
            self.fatal = Some(error.clone());
            return Err(error);
        }
        Ok(())
    }

    #[inline]
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Run `f` one nesting level deeper.
    pub fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.enter()?;
        let result = f(self);
        self.leave();
        result
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.fatal.is_some()
    }

    // ========================================================================
    // Error Handling
    // ========================================================================

    /// Record a recoverable error. Fatal errors are held separately.
    pub fn report(&mut self, error: ParseError) {
        if !self.is_fatal() {
            self.errors.push(error);
        }
    }

    /// Skip to a statement boundary: past the next `;`, or up to a `}` or a
    /// token that starts a statement. Always consumes at least one token
    /// unless already at `}` or EOF.
    pub fn synchronize_statement(&mut self) {
        let start = self.position;
        while !self.is_eof() {
            match self.peek().kind {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RightBrace => return,
                TokenKind::If
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::For
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::LeftBrace
                    if self.position > start =>
                {
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip to the start of the next class member or the class's `}`.
    ///
    /// Braced regions are skipped whole so a broken method body does not
    /// end the class early.
    pub fn synchronize_member(&mut self) {
        let start = self.position;
        while !self.is_eof() {
            match self.peek().kind {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::LeftBrace => {
                    self.skip_braced();
                    return;
                }
                TokenKind::RightBrace => return,
                k if (k.is_modifier() || k == TokenKind::Class) && self.position > start => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip a `{ ... }` region including nested braces.
    pub fn skip_braced(&mut self) {
        let mut depth = 0usize;
        while !self.is_eof() {
            match self.advance().kind {
                TokenKind::LeftBrace => depth += 1,
                TokenKind::RightBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_errors_are_collected() {
        let arena = Bump::new();
        let parser = Parser::new("int # x", &arena);
        assert!(parser.has_errors());
        assert_eq!(parser.buffer.len(), 3);
    }

    #[test]
    fn peek_past_end_returns_eof() {
        let arena = Bump::new();
        let mut parser = Parser::new("x", &arena);
        assert_eq!(parser.peek_nth(5).kind, TokenKind::Eof);
        parser.advance();
        parser.advance();
        assert!(parser.is_eof());
    }

    #[test]
    fn missing_semicolon_points_after_previous_token() {
        let arena = Bump::new();
        let mut parser = Parser::new("foo bar", &arena);
        parser.advance();
        let err = parser.expect(TokenKind::Semicolon).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingSemicolon);
        assert_eq!(err.span, Span::point(1, 4));
    }

    #[test]
    fn nesting_guard_trips_once() {
        let arena = Bump::new();
        let mut parser = Parser::new("", &arena);
        for _ in 0..MAX_NESTING {
            parser.enter().unwrap();
        }
        let err = parser.enter().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NestingTooDeep);
        assert!(parser.is_fatal());
    }
}
