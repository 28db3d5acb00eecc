//! Scan errors carried by [`TokenKind::Error`](crate::TokenKind::Error) tokens.

use thiserror::Error;
use yeva_types::ErrorCode;

/// A malformed lexeme or indentation problem.
///
/// The scanner never stops on these: it hands them to the parser as an
/// error token and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("unterminated string")]
    UnterminatedString,
    #[error("invalid escape '\\{0}'")]
    InvalidEscape(char),
    #[error("double underscore in number literal")]
    DoubleUnderscore,
    #[error("number literal ends with underscore")]
    TrailingUnderscore,
    #[error("invalid digit '{digit}' in base {radix} literal")]
    InvalidDigit { digit: char, radix: u32 },
    #[error("missing digits in base {0} literal")]
    MissingDigits(u32),
    #[error("integer literal too large")]
    IntegerOverflow,
    #[error("bad dedent")]
    BadDedent,
    #[error("mixed tabs and spaces")]
    MixedIndentation,
}

impl ScanError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnexpectedCharacter(_) => ErrorCode::UNEXPECTED_CHARACTER,
            Self::UnterminatedString => ErrorCode::UNTERMINATED_STRING,
            Self::InvalidEscape(_) => ErrorCode::INVALID_ESCAPE,
            Self::DoubleUnderscore
            | Self::TrailingUnderscore
            | Self::InvalidDigit { .. }
            | Self::MissingDigits(_)
            | Self::IntegerOverflow => ErrorCode::INVALID_NUMBER,
            Self::BadDedent => ErrorCode::BAD_DEDENT,
            Self::MixedIndentation => ErrorCode::MIXED_INDENTATION,
        }
    }
}
