//! The fixed operator catalog.

use std::fmt;

use serde::Serialize;

/// A query operator the generator knows how to synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Method {
    Select,
    Where,
    ToList,
    ToArray,
    ToDictionary,
    Skip,
    Take,
    Count,
    Any,
    First,
    FirstOrDefault,
    Single,
    SingleOrDefault,
    All,
    Last,
    LastOrDefault,
    Reverse,
    Contains,
}

impl Method {
    pub const ALL: [Method; 18] = [
        Method::Select,
        Method::Where,
        Method::ToList,
        Method::ToArray,
        Method::ToDictionary,
        Method::Skip,
        Method::Take,
        Method::Count,
        Method::Any,
        Method::First,
        Method::FirstOrDefault,
        Method::Single,
        Method::SingleOrDefault,
        Method::All,
        Method::Last,
        Method::LastOrDefault,
        Method::Reverse,
        Method::Contains,
    ];

    /// Look up a catalog entry by its host-visible name.
    pub fn from_name(name: &str) -> Option<Method> {
        Method::ALL.into_iter().find(|m| m.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Method::Select => "Select",
            Method::Where => "Where",
            Method::ToList => "ToList",
            Method::ToArray => "ToArray",
            Method::ToDictionary => "ToDictionary",
            Method::Skip => "Skip",
            Method::Take => "Take",
            Method::Count => "Count",
            Method::Any => "Any",
            Method::First => "First",
            Method::FirstOrDefault => "FirstOrDefault",
            Method::Single => "Single",
            Method::SingleOrDefault => "SingleOrDefault",
            Method::All => "All",
            Method::Last => "Last",
            Method::LastOrDefault => "LastOrDefault",
            Method::Reverse => "Reverse",
            Method::Contains => "Contains",
        }
    }

    /// Whether the operator yields a new sequence rather than a value.
    pub fn produces_sequence(self) -> bool {
        matches!(
            self,
            Method::Select | Method::Where | Method::Skip | Method::Take | Method::Reverse
        )
    }

    /// Skip and Take, the only operators with an in-place strategy.
    pub fn is_slice(self) -> bool {
        matches!(self, Method::Skip | Method::Take)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for method in Method::ALL {
            assert_eq!(Method::from_name(method.name()), Some(method));
        }
    }

    #[test]
    fn unknown_names() {
        assert_eq!(Method::from_name("select"), None);
        assert_eq!(Method::from_name("Length"), None);
        assert_eq!(Method::from_name("Aggregate"), None);
    }

    #[test]
    fn sequence_producers() {
        let producers: Vec<Method> = Method::ALL
            .into_iter()
            .filter(|m| m.produces_sequence())
            .collect();
        assert_eq!(
            producers,
            vec![
                Method::Select,
                Method::Where,
                Method::Skip,
                Method::Take,
                Method::Reverse
            ]
        );
    }
}
