use std::fmt::Display;
use thiserror::Error;

/// The coarse error classification the original tokenizer keeps around as a
/// plain `code` field, so callers that only care "did it work" don't have to
/// match on the richer [`Error`] enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorCode {
    #[default]
    NoError,
    InvalidLine,
    TooManyCols,
    NotEnoughCols,
    ConversionError,
    OverflowError,
}

impl ErrorCode {
    pub fn is_ok(self) -> bool {
        self == ErrorCode::NoError
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCode::NoError => "no error",
            ErrorCode::InvalidLine => "invalid line",
            ErrorCode::TooManyCols => "too many columns",
            ErrorCode::NotEnoughCols => "not enough columns",
            ErrorCode::ConversionError => "conversion error",
            ErrorCode::OverflowError => "overflow error",
        };
        write!(f, "{}", s)
    }
}

#[derive(Error, Debug, PartialEq, Clone)]
pub enum TokenizeErrorKind {
    #[error("required header line not found before end of input")]
    InvalidLine,
    #[error("row #{row} has more fields than the configured column count ({num_cols})")]
    TooManyCols { row: usize, num_cols: usize },
    #[error("row #{row} has {found} field(s), expected {num_cols} and fill_extra_cols is disabled")]
    NotEnoughCols {
        row: usize,
        found: usize,
        num_cols: usize,
    },
}

impl TokenizeErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            TokenizeErrorKind::InvalidLine => ErrorCode::InvalidLine,
            TokenizeErrorKind::TooManyCols { .. } => ErrorCode::TooManyCols,
            TokenizeErrorKind::NotEnoughCols { .. } => ErrorCode::NotEnoughCols,
        }
    }
}

#[derive(Error, Debug, PartialEq, Clone)]
pub enum ConversionErrorKind {
    #[error("can't convert '{input}' to an integer; trailing or non-numeric content")]
    Invalid { input: String },
    #[error("can't convert '{input}' to a floating point number; trailing or non-numeric content")]
    InvalidFloat { input: String },
    #[error("'{input}' is out of range for the target numeric type")]
    Overflow { input: String },
}

impl ConversionErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConversionErrorKind::Invalid { .. } | ConversionErrorKind::InvalidFloat { .. } => {
                ErrorCode::ConversionError
            }
            ConversionErrorKind::Overflow { .. } => ErrorCode::OverflowError,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    Tokenize(TokenizeErrorKind),
    Conversion(ConversionErrorKind),
    Config { msg: String },
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Tokenize(te) => te.fmt(f),
            Error::Conversion(ce) => ce.fmt(f),
            Error::Config { msg } => write!(f, "invalid configuration: {:?}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<TokenizeErrorKind> for Error {
    fn from(e: TokenizeErrorKind) -> Self {
        Error::Tokenize(e)
    }
}

impl From<ConversionErrorKind> for Error {
    fn from(e: ConversionErrorKind) -> Self {
        Error::Conversion(e)
    }
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Tokenize(te) => te.code(),
            Error::Conversion(ce) => ce.code(),
            Error::Config { .. } => ErrorCode::NoError,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
