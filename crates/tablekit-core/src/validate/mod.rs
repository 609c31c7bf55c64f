//! Allow-lists for text that is spliced into SQL.
//!
//! SQLite cannot bind identifiers as parameters, so table and column names
//! are interpolated. Everything interpolated passes through here first.

mod reserved;

use crate::MAX_IDENTIFIER_LEN;
use std::fmt;

pub use reserved::is_reserved_word;

///
/// IdentifierIssue
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IdentifierIssue {
    Empty,
    TooLong { len: usize },
    InvalidStart(char),
    InvalidChar(char),
    Reserved,
    InternalPrefix,
}

impl fmt::Display for IdentifierIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "identifier is empty"),
            Self::TooLong { len } => {
                write!(f, "length {len} exceeds max length {MAX_IDENTIFIER_LEN}")
            }
            Self::InvalidStart(c) => write!(f, "must start with a letter or '_', found {c:?}"),
            Self::InvalidChar(c) => write!(f, "invalid character {c:?}"),
            Self::Reserved => write!(f, "the word is reserved"),
            Self::InternalPrefix => write!(f, "the 'sqlite_' prefix is reserved for the engine"),
        }
    }
}

/// Validate a table or column identifier.
///
/// Accepts `[A-Za-z_][A-Za-z0-9_]*` up to `MAX_IDENTIFIER_LEN` bytes that is
/// neither an SQLite keyword nor in the engine's `sqlite_` namespace.
pub fn validate_identifier(name: &str) -> Result<(), IdentifierIssue> {
    let mut chars = name.chars();

    let Some(first) = chars.next() else {
        return Err(IdentifierIssue::Empty);
    };

    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(IdentifierIssue::TooLong { len: name.len() });
    }

    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(IdentifierIssue::InvalidStart(first));
    }

    if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        return Err(IdentifierIssue::InvalidChar(bad));
    }

    if is_reserved_word(name) {
        return Err(IdentifierIssue::Reserved);
    }

    if name.len() >= 7 && name[..7].eq_ignore_ascii_case("sqlite_") {
        return Err(IdentifierIssue::InternalPrefix);
    }

    Ok(())
}

/// Validate a column type declaration such as `VARCHAR(30)` or
/// `INTEGER PRIMARY KEY AUTOINCREMENT`.
///
/// The declaration is interpolated verbatim, so only words, digits, spaces,
/// parentheses and commas are allowed. An empty declaration is valid SQLite.
#[must_use]
pub fn is_valid_type_decl(decl: &str) -> bool {
    decl.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '(' | ')' | ','))
}

///
/// TESTS
///
