// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The outcome of a single strategy in a fallback chain.

/// The outcome of trying to resolve a value from one source.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Resolution<T> {
    Resolved(T),
    Unresolved,
}

impl<T> Resolution<T> {
    pub(crate) fn resolved(self) -> Option<T> {
        match self {
            Resolution::Resolved(value) => Some(value),
            Resolution::Unresolved => None,
        }
    }
}

impl<T> From<Option<T>> for Resolution<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Resolution::Resolved(value),
            None => Resolution::Unresolved,
        }
    }
}
