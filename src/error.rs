// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The `Error` type of the engine, and the `ErrorKind`s it is made of.
//!
//! Structural errors come from addressing slots, systems or sections that
//! don't exist.  Collaborator errors are returned by implementations of the
//! lookup and persistence traits, which is why the constructors are public.

/// Generates the `ErrorKind` enum with its `Display` implementation, and
/// one constructor on [`Error`] per kind.
macro_rules! ErrorKind {
    ($(
        ($kind:ident, $ctor:ident)
    ),*) => {
        /// The kind of error that occurred.
        #[derive(Clone, Copy, Debug, PartialEq)]
        pub(crate) enum ErrorKind {
            $(
                $kind,
            )*
        }

        impl std::fmt::Display for ErrorKind {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$kind => write!(f, "{}", stringify!($kind)),
                    )*
                }
            }
        }

        impl Error {
            $(
                #[doc = concat!(
                    "Creates a new [`Error`] of kind `",
                    stringify!($kind),
                    "`."
                )]
                pub fn $ctor(desc: impl Into<String>) -> crate::Error {
                    Self {
                        kind: ErrorKind::$kind,
                        desc: desc.into(),
                    }
                }
            )*
        }
    };
}

ErrorKind!(
    (Internal, internal),
    (InvalidOrdering, invalid_ordering),
    (InvalidSection, invalid_section),
    (InvalidSlot, invalid_slot),
    (InvalidSystem, invalid_system),
    (LookupFailed, lookup_failed),
    (SaveFailed, save_failed)
);

/// An error from extracting equipment state, mapping slot fields or one of
/// the external collaborators.
#[derive(Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    desc: String,
}

impl Error {
    pub fn description(&self) -> &str {
        &self.desc
    }

    /// Whether the error came from a lookup or persistence collaborator,
    /// rather than from the input the engine was given.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(self.kind, ErrorKind::LookupFailed | ErrorKind::SaveFailed)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.desc)
    }
}

impl std::error::Error for Error {}
