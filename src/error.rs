use std::fmt;
use thiserror::Error;

/// A malformed template construct, attributed to the line the token stream was on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    /// 1-based line; `None` when raised at render time outside any token stream.
    pub line: Option<usize>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
        }
    }

    pub fn detached(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
        }
    }

    pub fn line_number(&self) -> Option<usize> {
        self.line
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} (line {})", self.message, line),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for SyntaxError {}

/// Errors raised while parsing or rendering a template.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("Argument error: {0}")]
    Argument(String),
    #[error("Error: {0}")]
    Standard(String),
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Argument,
    Standard,
    Fatal,
}

impl Error {
    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        Error::Syntax(SyntaxError::new(message, line))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Syntax(_) => ErrorKind::Syntax,
            Error::Argument(_) => ErrorKind::Argument,
            Error::Standard(_) => ErrorKind::Standard,
            Error::Fatal(_) => ErrorKind::Fatal,
        }
    }

    /// Recoverable errors are absorbed into the output by the render loop;
    /// everything else aborts the render.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Fatal(_))
    }

    /// The bare message, without kind prefix or line suffix.
    pub fn message(&self) -> &str {
        match self {
            Error::Syntax(e) => &e.message,
            Error::Argument(m) | Error::Standard(m) | Error::Fatal(m) => m,
        }
    }

    /// Line number for syntax errors raised during parsing.
    pub fn line_number(&self) -> Option<usize> {
        match self {
            Error::Syntax(e) => e.line,
            _ => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Argument(msg.to_string())
    }
}
