//! Interpreter errors.
//!
//! There are exactly three kinds. `Syntax` covers token streams that do not
//! form one well-shaped expression, `Name` covers lookups of unbound symbols,
//! and `Evaluation` covers everything else (arity, calling a non-function,
//! malformed special forms, bad operand types).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    Name,
    Evaluation,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LispError {
    #[error("SyntaxError: {0}")]
    Syntax(String),

    #[error("NameError: {0}")]
    Name(String),

    #[error("EvaluationError: {0}")]
    Evaluation(String),
}

impl LispError {
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax(message.into())
    }

    pub fn name(message: impl Into<String>) -> Self {
        Self::Name(message.into())
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation(message.into())
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Syntax(_) => ErrorKind::Syntax,
            Self::Name(_) => ErrorKind::Name,
            Self::Evaluation(_) => ErrorKind::Evaluation,
        }
    }
}

pub type Result<T> = std::result::Result<T, LispError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_message() {
        let err = LispError::name("x is not bound");
        assert_eq!(err.kind(), ErrorKind::Name);
        assert_eq!(err.to_string(), "NameError: x is not bound");
        assert_eq!(LispError::syntax("").kind(), ErrorKind::Syntax);
        assert_eq!(LispError::evaluation("").kind(), ErrorKind::Evaluation);
    }
}
