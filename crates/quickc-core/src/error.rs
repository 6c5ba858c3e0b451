//! Error types shared by every stage of the toolchain.
//!
//! ## Error Hierarchy
//!
//! ```text
//! LexError          - tokenization faults, surfaced as ParseErrors
//! ParseError        - syntax errors (with ParseErrorKind)
//! CompilationError  - semantic errors found while generating code
//! NativeError       - failures raised by reference-library functions
//! RuntimeError      - faults raised while executing bytecode
//! ```
//!
//! Syntax and semantic errors are never returned to callers directly; they
//! are converted into [`Diagnostic`](crate::Diagnostic)s, each carrying a
//! stable `QC` code.

use thiserror::Error;

use crate::Span;

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors that occur during tokenization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}'")]
    UnexpectedChar { ch: char, span: Span },

    #[error("newline in constant")]
    UnterminatedString { span: Span },

    #[error("end-of-file found, '*/' expected")]
    UnterminatedComment { span: Span },

    #[error("unrecognized escape sequence '\\{ch}'")]
    InvalidEscape { ch: char, span: Span },

    #[error("integral constant is too large")]
    IntegerTooLarge { span: Span },

    #[error("invalid real literal '{text}'")]
    InvalidReal { text: String, span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::UnterminatedComment { span }
            | LexError::InvalidEscape { span, .. }
            | LexError::IntegerTooLarge { span }
            | LexError::InvalidReal { span, .. } => *span,
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        match self {
            LexError::UnexpectedChar { .. } => ParseErrorKind::UnexpectedChar,
            LexError::UnterminatedString { .. } => ParseErrorKind::UnterminatedString,
            LexError::UnterminatedComment { .. } => ParseErrorKind::UnterminatedComment,
            LexError::InvalidEscape { .. } => ParseErrorKind::InvalidEscapeSequence,
            LexError::IntegerTooLarge { .. } | LexError::InvalidReal { .. } => {
                ParseErrorKind::InvalidLiteral
            }
        }
    }
}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        ParseError::new(error.kind(), error.span(), error.to_string())
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of syntax errors, each mapped to one diagnostic code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    ExpectedToken,
    MissingSemicolon,
    ExpectedIdentifier,
    ExpectedExpression,
    ExpectedType,
    ExpectedClassMember,
    ExpectedDeclaration,
    InvalidDeclaration,
    InvalidModifier,
    DuplicateModifier,
    MultipleAccessModifiers,
    UnexpectedEof,
    UnexpectedChar,
    UnterminatedString,
    UnterminatedComment,
    InvalidEscapeSequence,
    InvalidLiteral,
    /// Nesting guard exceeded; the parser gives up on the whole source.
    NestingTooDeep,
    /// Source too large for spans to address.
    SourceTooLarge,
}

impl ParseErrorKind {
    /// The diagnostic code reported for this kind of error.
    pub fn code(self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedToken => "QC1003",
            ParseErrorKind::MissingSemicolon => "QC1002",
            ParseErrorKind::ExpectedIdentifier => "QC1001",
            ParseErrorKind::ExpectedExpression => "QC1525",
            ParseErrorKind::ExpectedType => "QC1031",
            ParseErrorKind::ExpectedClassMember => "QC1519",
            ParseErrorKind::ExpectedDeclaration => "QC1022",
            ParseErrorKind::InvalidDeclaration => "QC1520",
            ParseErrorKind::InvalidModifier => "QC0106",
            ParseErrorKind::DuplicateModifier => "QC1004",
            ParseErrorKind::MultipleAccessModifiers => "QC0107",
            ParseErrorKind::UnexpectedEof => "QC1513",
            ParseErrorKind::UnexpectedChar => "QC1056",
            ParseErrorKind::UnterminatedString => "QC1010",
            ParseErrorKind::UnterminatedComment => "QC1035",
            ParseErrorKind::InvalidEscapeSequence => "QC1009",
            ParseErrorKind::InvalidLiteral => "QC1021",
            ParseErrorKind::NestingTooDeep => "QC8078",
            ParseErrorKind::SourceTooLarge => "QC8079",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::MissingSemicolon => "missing semicolon",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::ExpectedExpression => "expected expression",
            ParseErrorKind::ExpectedType => "expected type",
            ParseErrorKind::ExpectedClassMember => "expected class member",
            ParseErrorKind::ExpectedDeclaration => "expected declaration",
            ParseErrorKind::InvalidDeclaration => "invalid declaration",
            ParseErrorKind::InvalidModifier => "invalid modifier",
            ParseErrorKind::DuplicateModifier => "duplicate modifier",
            ParseErrorKind::MultipleAccessModifiers => "more than one protection modifier",
            ParseErrorKind::UnexpectedEof => "unexpected end of file",
            ParseErrorKind::UnexpectedChar => "unexpected character",
            ParseErrorKind::UnterminatedString => "unterminated string",
            ParseErrorKind::UnterminatedComment => "unterminated comment",
            ParseErrorKind::InvalidEscapeSequence => "invalid escape sequence",
            ParseErrorKind::InvalidLiteral => "invalid literal",
            ParseErrorKind::NestingTooDeep => "nesting too deep",
            ParseErrorKind::SourceTooLarge => "source too large",
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A syntax error with location and message.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn expected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedToken,
            span,
            format!("{expected} expected, found {found}"),
        )
    }

    pub fn expected_identifier(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedIdentifier,
            span,
            format!("identifier expected, found {found}"),
        )
    }

    pub fn expected_expression(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedExpression,
            span,
            format!("invalid expression term {found}"),
        )
    }

    pub fn expected_type(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedType,
            span,
            format!("type expected, found {found}"),
        )
    }

    /// Render the error with the offending source line and a caret.
    pub fn display_with_source(&self, source: &str) -> String {
        let mut output = format!(
            "error {} at {}:{}: {}\n",
            self.kind.code(),
            self.span.line,
            self.span.col,
            self.message
        );

        if let Some(line_text) = source.lines().nth(self.span.line.saturating_sub(1) as usize) {
            output.push_str(&format!("{:>4} | {}\n", self.span.line, line_text));
            let indent = " ".repeat(self.span.col.saturating_sub(1) as usize);
            let underline = "^".repeat(self.span.len.max(1) as usize);
            output.push_str(&format!("     | {indent}{underline}\n"));
        }

        output
    }
}

/// Syntax errors accumulated while the parser recovers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }

    pub fn into_vec(self) -> Vec<ParseError> {
        self.errors
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl From<ParseError> for ParseErrors {
    fn from(error: ParseError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl std::fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} {}", error.span, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

// ============================================================================
// Compilation Errors
// ============================================================================

/// Semantic errors found while checking and generating code.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    #[error("the name '{name}' does not exist in the current context")]
    UnknownName { name: String, span: Span },

    #[error("the type or namespace name '{name}' could not be found (are you missing a using directive or a reference?)")]
    UnknownType { name: String, span: Span },

    #[error("metadata file '{name}' could not be found")]
    MissingReference { name: String, span: Span },

    #[error("cannot implicitly convert type '{from}' to '{to}'")]
    TypeMismatch {
        from: String,
        to: String,
        span: Span,
    },

    #[error("operator '{op}' cannot be applied to operands of type '{left}' and '{right}'")]
    InvalidBinaryOperands {
        op: String,
        left: String,
        right: String,
        span: Span,
    },

    #[error("operator '{op}' cannot be applied to operand of type '{operand}'")]
    InvalidUnaryOperand {
        op: String,
        operand: String,
        span: Span,
    },

    #[error("since '{method}' returns void, a return keyword must not be followed by an object expression")]
    VoidReturnsValue { method: String, span: Span },

    #[error("an object of a type convertible to '{expected}' is required")]
    MissingReturnValue { expected: String, span: Span },

    #[error("'{method}': not all code paths return a value")]
    NotAllPathsReturn { method: String, span: Span },

    #[error("'{type_name}' does not contain a definition for '{member}'")]
    UnknownMember {
        type_name: String,
        member: String,
        span: Span,
    },

    #[error("no overload for method '{name}' takes {count} arguments")]
    NoOverload {
        name: String,
        count: usize,
        span: Span,
    },

    #[error("argument {index}: cannot convert from '{from}' to '{to}'")]
    ArgumentMismatch {
        index: usize,
        from: String,
        to: String,
        span: Span,
    },

    #[error("the call is ambiguous between the following methods: '{first}' and '{second}'")]
    AmbiguousCall {
        first: String,
        second: String,
        span: Span,
    },

    #[error("type '{type_name}' already defines a member called '{member}' with the same parameter types")]
    DuplicateMember {
        type_name: String,
        member: String,
        span: Span,
    },

    #[error("the namespace '{namespace}' already contains a definition for '{name}'")]
    DuplicateType {
        namespace: String,
        name: String,
        span: Span,
    },

    #[error("a local variable named '{name}' is already defined in this scope")]
    DuplicateLocal { name: String, span: Span },

    #[error("no enclosing loop out of which to break or continue")]
    NoEnclosingLoop { span: Span },

    #[error("the left-hand side of an assignment must be a variable, property or indexer")]
    InvalidAssignmentTarget { span: Span },

    #[error("implicitly-typed variables must be initialized")]
    UninitializedImplicitLocal { span: Span },

    #[error("cannot assign void to an implicitly-typed variable")]
    VoidImplicitLocal { span: Span },

    #[error("division by constant zero")]
    DivisionByConstantZero { span: Span },

    #[error("the operation overflows at compile time in checked mode")]
    ConstantOverflow { span: Span },

    #[error("an object reference is required for the non-static field, method, or property '{member}'")]
    InstanceMemberFromStatic { member: String, span: Span },

    #[error("a readonly field cannot be assigned to (except in a constructor)")]
    ReadonlyAssignment { name: String, span: Span },

    #[error("non-invocable member '{name}' cannot be used like a method")]
    NotInvocable { name: String, span: Span },

    #[error("cannot convert method group '{name}' to non-delegate type")]
    MethodGroupAsValue { name: String, span: Span },

    #[error("only assignment, call, increment, decrement, and new object expressions can be used as a statement")]
    InvalidStatement { span: Span },

    #[error("type of conditional expression cannot be determined because there is no implicit conversion between '{first}' and '{second}'")]
    ConditionalTypeMismatch {
        first: String,
        second: String,
        span: Span,
    },

    #[error("'{name}': member names cannot be the same as their enclosing type")]
    MemberNamedLikeType { name: String, span: Span },

    #[error("the type '{type_name}' may not declare a field of type 'void'")]
    VoidField { type_name: String, span: Span },

    #[error("'{name}' is a namespace but is used like a variable")]
    NamespaceAsValue { name: String, span: Span },

    #[error("'{name}' is a type, which is not valid in the given context")]
    TypeAsValue { name: String, span: Span },

    #[error("the type '{type_name}' already contains a definition for '{member}'")]
    DuplicateDefinition {
        type_name: String,
        member: String,
        span: Span,
    },

    #[error("'{name}' is inaccessible due to its protection level")]
    Inaccessible { name: String, span: Span },

    #[error("'{type_name}': cannot declare instance members in a static class")]
    InstanceMemberInStaticClass { type_name: String, span: Span },

    #[error("{feature} is not supported")]
    Unsupported { feature: String, span: Span },

    #[error("an expression is too long or complex to compile")]
    ExpressionTooComplex { span: Span },
}

impl CompilationError {
    pub fn span(&self) -> Span {
        use CompilationError::*;
        match self {
            UnknownName { span, .. }
            | UnknownType { span, .. }
            | MissingReference { span, .. }
            | TypeMismatch { span, .. }
            | InvalidBinaryOperands { span, .. }
            | InvalidUnaryOperand { span, .. }
            | VoidReturnsValue { span, .. }
            | MissingReturnValue { span, .. }
            | NotAllPathsReturn { span, .. }
            | UnknownMember { span, .. }
            | NoOverload { span, .. }
            | ArgumentMismatch { span, .. }
            | AmbiguousCall { span, .. }
            | DuplicateMember { span, .. }
            | DuplicateType { span, .. }
            | DuplicateLocal { span, .. }
            | NoEnclosingLoop { span }
            | InvalidAssignmentTarget { span }
            | UninitializedImplicitLocal { span }
            | VoidImplicitLocal { span }
            | DivisionByConstantZero { span }
            | ConstantOverflow { span }
            | InstanceMemberFromStatic { span, .. }
            | ReadonlyAssignment { span, .. }
            | NotInvocable { span, .. }
            | MethodGroupAsValue { span, .. }
            | InvalidStatement { span }
            | ConditionalTypeMismatch { span, .. }
            | MemberNamedLikeType { span, .. }
            | VoidField { span, .. }
            | NamespaceAsValue { span, .. }
            | TypeAsValue { span, .. }
            | DuplicateDefinition { span, .. }
            | Inaccessible { span, .. }
            | InstanceMemberInStaticClass { span, .. }
            | Unsupported { span, .. } => *span,
            ExpressionTooComplex { span } => *span,
        }
    }

    /// The diagnostic code reported for this error.
    pub fn code(&self) -> &'static str {
        use CompilationError::*;
        match self {
            UnknownName { .. } => "QC0103",
            UnknownType { .. } => "QC0246",
            MissingReference { .. } => "QC0006",
            TypeMismatch { .. } => "QC0029",
            InvalidBinaryOperands { .. } => "QC0019",
            InvalidUnaryOperand { .. } => "QC0023",
            VoidReturnsValue { .. } => "QC0127",
            MissingReturnValue { .. } => "QC0126",
            NotAllPathsReturn { .. } => "QC0161",
            UnknownMember { .. } => "QC0117",
            NoOverload { .. } => "QC1501",
            ArgumentMismatch { .. } => "QC1503",
            AmbiguousCall { .. } => "QC0121",
            DuplicateMember { .. } => "QC0111",
            DuplicateType { .. } => "QC0101",
            DuplicateLocal { .. } => "QC0128",
            NoEnclosingLoop { .. } => "QC0139",
            InvalidAssignmentTarget { .. } => "QC0131",
            UninitializedImplicitLocal { .. } => "QC0818",
            VoidImplicitLocal { .. } => "QC0815",
            DivisionByConstantZero { .. } => "QC0020",
            ConstantOverflow { .. } => "QC0220",
            InstanceMemberFromStatic { .. } => "QC0120",
            ReadonlyAssignment { .. } => "QC0191",
            NotInvocable { .. } => "QC1955",
            MethodGroupAsValue { .. } => "QC0428",
            InvalidStatement { .. } => "QC0201",
            ConditionalTypeMismatch { .. } => "QC0173",
            MemberNamedLikeType { .. } => "QC0542",
            VoidField { .. } => "QC0670",
            NamespaceAsValue { .. } => "QC0118",
            TypeAsValue { .. } => "QC0119",
            DuplicateDefinition { .. } => "QC0102",
            Inaccessible { .. } => "QC0122",
            InstanceMemberInStaticClass { .. } => "QC0708",
            Unsupported { .. } => "QC8000",
            ExpressionTooComplex { .. } => "QC8078",
        }
    }
}

// ============================================================================
// Native Errors
// ============================================================================

/// Failures raised by reference-library functions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NativeError {
    #[error("argument {index}: expected {expected}, found {found}")]
    ArgumentType {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("argument {index} is missing")]
    MissingArgument { index: usize },

    #[error("{0}")]
    InvalidArgument(String),

    #[error("input string was not in a correct format: '{0}'")]
    Format(String),

    #[error("value was either too large or too small")]
    Overflow,

    #[error("output error: {0}")]
    Output(String),
}

// ============================================================================
// Runtime Errors
// ============================================================================

/// Faults raised while executing bytecode.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("arithmetic operation resulted in an overflow")]
    Overflow,

    #[error("attempted to divide by zero")]
    DivideByZero,

    #[error("call depth exceeded {limit} frames")]
    CallDepthExceeded { limit: usize },

    #[error("call to '{function}' failed: {source}")]
    Native {
        function: String,
        #[source]
        source: NativeError,
    },

    #[error("invalid bytecode at offset {offset}: {detail}")]
    InvalidBytecode { offset: usize, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_errors_become_parse_errors_with_codes() {
        let err: ParseError = LexError::UnterminatedString {
            span: Span::new(2, 7, 1),
        }
        .into();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedString);
        assert_eq!(err.kind.code(), "QC1010");
        assert_eq!(err.span.line, 2);
    }

    #[test]
    fn display_with_source_points_at_column() {
        let err = ParseError::new(
            ParseErrorKind::MissingSemicolon,
            Span::new(1, 9, 1),
            "; expected",
        );
        let rendered = err.display_with_source("int x = 1\n");
        assert!(rendered.contains("QC1002"));
        assert!(rendered.contains("        ^"));
    }

    #[test]
    fn compilation_error_codes_and_messages() {
        let err = CompilationError::VoidReturnsValue {
            method: "Bad.M()".into(),
            span: Span::new(1, 30, 9),
        };
        assert_eq!(err.code(), "QC0127");
        assert_eq!(err.span(), Span::new(1, 30, 9));
        assert!(err.to_string().starts_with("since 'Bad.M()' returns void"));
    }

    #[test]
    fn parse_errors_display_each_error() {
        let mut errors = ParseErrors::new();
        errors.push(ParseError::expected_identifier(Span::new(1, 1, 1), "'{'"));
        errors.push(ParseError::expected_type(Span::new(2, 3, 1), "'('"));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.to_string().lines().count(), 2);
    }
}
