#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Named boolean literals.
//!
//! A literal is a variable name paired with a polarity. Two literals refer to
//! the same variable iff their names match, and are complementary iff the
//! names match and the polarities differ.

use std::fmt::{self, Display};
use std::rc::Rc;
use std::str::FromStr;

/// The name of a propositional variable. Shared so clones are a refcount bump.
pub type Variable = Rc<str>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    variable: Variable,
    polarity: bool,
}

impl Literal {
    pub fn new(variable: impl Into<Variable>, polarity: bool) -> Self {
        Self {
            variable: variable.into(),
            polarity,
        }
    }

    #[must_use]
    pub const fn variable(&self) -> &Variable {
        &self.variable
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.variable
    }

    #[must_use]
    pub const fn polarity(&self) -> bool {
        self.polarity
    }

    #[must_use]
    pub const fn is_negated(&self) -> bool {
        !self.polarity
    }

    #[must_use]
    pub fn negated(&self) -> Self {
        Self {
            variable: Rc::clone(&self.variable),
            polarity: !self.polarity,
        }
    }

    #[must_use]
    pub fn same_variable(&self, other: &Self) -> bool {
        self.variable == other.variable
    }

    #[must_use]
    pub fn is_complement_of(&self, other: &Self) -> bool {
        self.same_variable(other) && self.polarity != other.polarity
    }

    /// DIMACS style integer literal: the variable is named by `|value|`.
    #[must_use]
    pub fn from_i32(value: i32) -> Self {
        Self::new(value.unsigned_abs().to_string(), value.is_positive())
    }
}

impl<S: Into<Variable>> From<(S, bool)> for Literal {
    fn from((variable, polarity): (S, bool)) -> Self {
        Self::new(variable, polarity)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Self::from_i32(value)
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.polarity {
            write!(f, "{}", self.variable)
        } else {
            write!(f, "-{}", self.variable)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid literal '{0}'")]
pub struct ParseLiteralError(pub String);

impl FromStr for Literal {
    type Err = ParseLiteralError;

    /// Accepts `name`, `-name` and `!name`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, polarity) = match s.strip_prefix(['-', '!']) {
            Some(rest) => (rest, false),
            None => (s, true),
        };

        if name.is_empty() || name.starts_with(['-', '!']) || name.contains(char::is_whitespace)
        {
            return Err(ParseLiteralError(s.to_string()));
        }

        Ok(Self::new(name, polarity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_neg() {
        assert_eq!(Literal::new("a", true).negated(), Literal::new("a", false));
        assert_eq!(Literal::new("a", false).negated(), Literal::new("a", true));
    }

    #[test]
    fn test_complement() {
        let a = Literal::new("a", true);
        assert!(a.is_complement_of(&a.negated()));
        assert!(!a.is_complement_of(&a));
        assert!(!a.is_complement_of(&Literal::new("b", false)));
    }

    #[test]
    fn test_from_i32() {
        assert_eq!(Literal::from_i32(-3), Literal::new("3", false));
        assert_eq!(Literal::from(7), Literal::new("7", true));
    }

    #[test]
    fn test_parse() {
        assert_eq!("x".parse(), Ok(Literal::new("x", true)));
        assert_eq!("-x".parse(), Ok(Literal::new("x", false)));
        assert_eq!("!1@0,0".parse(), Ok(Literal::new("1@0,0", false)));
        assert!("-".parse::<Literal>().is_err());
        assert!("--x".parse::<Literal>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Literal::new("a", false).to_string(), "-a");
        assert_eq!(Literal::new("a", true).to_string(), "a");
    }
}
