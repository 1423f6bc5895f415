use std::fmt;

use serde::Serialize;

/// Failure conditions signalled by synthesized operator code.
///
/// These are raised at run time by the materializing operators, never by
/// the generator itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QueryError {
    /// An unpredicated search over an empty sequence.
    NoElements,
    /// A predicated search found nothing.
    NoMatch,
    /// `Single`/`SingleOrDefault` saw a second (matching) element.
    MoreThanOneElement,
    /// `ToDictionary` produced the same key twice.
    DuplicateKey,
}

impl QueryError {
    /// The name used in rendered `fail` statements.
    pub fn name(self) -> &'static str {
        match self {
            QueryError::NoElements => "NoElements",
            QueryError::NoMatch => "NoMatch",
            QueryError::MoreThanOneElement => "MoreThanOneElement",
            QueryError::DuplicateKey => "DuplicateKey",
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::NoElements => write!(f, "Sequence contains no elements"),
            QueryError::NoMatch => write!(f, "Sequence contains no matching element"),
            QueryError::MoreThanOneElement => {
                write!(f, "Sequence contains more than one element")
            }
            QueryError::DuplicateKey => {
                write!(f, "An item with the same key has already been added")
            }
        }
    }
}

impl std::error::Error for QueryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            QueryError::NoElements.to_string(),
            "Sequence contains no elements"
        );
        assert_eq!(
            QueryError::NoMatch.to_string(),
            "Sequence contains no matching element"
        );
        assert_eq!(
            QueryError::MoreThanOneElement.to_string(),
            "Sequence contains more than one element"
        );
        assert_eq!(
            QueryError::DuplicateKey.to_string(),
            "An item with the same key has already been added"
        );
    }
}
