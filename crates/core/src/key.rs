//! Catalog keys.
//!
//! A key is `namespace:name`. Item packs and commands usually write the bare
//! name, which lands in the `bunker` namespace. Keys are folded to lowercase so
//! `Duct_Tape` typed at the console finds the authored `duct_tape`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const BUNKER_NAMESPACE: &str = "bunker";

/// Why a string is not a usable item key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemKeyError {
    /// Nothing but whitespace.
    #[error("item key is empty")]
    Empty,
    /// `namespace:` or `:name` with one side missing.
    #[error("item key `{0}` is missing its namespace or name")]
    MissingPart(String),
    /// A character outside `a-z`, `0-9`, `_` (and `/` in the name).
    #[error("item key `{key}` contains `{found}`")]
    InvalidChar {
        /// Key after case folding.
        key: String,
        /// First rejected character.
        found: char,
    },
}

/// Identifier of an item definition in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey {
    namespace: String,
    name: String,
}

impl ItemKey {
    /// Parse `namespace:name` or a bare `name`.
    pub fn parse(input: &str) -> Result<Self, ItemKeyError> {
        let folded = input.trim().to_ascii_lowercase();
        if folded.is_empty() {
            return Err(ItemKeyError::Empty);
        }
        let (namespace, name) = folded
            .split_once(':')
            .unwrap_or((BUNKER_NAMESPACE, folded.as_str()));
        if namespace.is_empty() || name.is_empty() {
            return Err(ItemKeyError::MissingPart(folded.clone()));
        }

        let bad = namespace
            .chars()
            .find(|&c| !is_key_char(c))
            .or_else(|| name.chars().find(|&c| !is_key_char(c) && c != '/'));
        if let Some(found) = bad {
            return Err(ItemKeyError::InvalidChar { key: folded, found });
        }

        Ok(Self {
            namespace: namespace.to_owned(),
            name: name.to_owned(),
        })
    }

    /// Namespace part, `bunker` for bare keys.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Name part.
    pub fn path(&self) -> &str {
        &self.name
    }
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

impl FromStr for ItemKey {
    type Err = ItemKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
