use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::MAX_NAME_BYTES;

/// Namespace assumed for names written without one, e.g. `"iron"`
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Errors that can occur while parsing a qualified tier name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TierNameError {
    /// Namespace or path is empty
    #[error("Tier name '{name}' has an empty namespace or path. Names must look like 'namespace:path'")]
    Empty { name: String },

    /// Namespace contains a character outside of [a-z0-9_.-]
    #[error("Tier name '{name}' contains invalid character '{character}' in its namespace. Allowed characters are [a-z0-9_.-]")]
    InvalidNamespace { name: String, character: char },

    /// Path contains a character outside of [a-z0-9_.-/]
    #[error("Tier name '{name}' contains invalid character '{character}' in its path. Allowed characters are [a-z0-9_.-/]")]
    InvalidPath { name: String, character: char },

    /// Full `namespace:path` form is longer than a sync message can carry
    #[error("Tier name '{name}' is {length} bytes long. Names are limited to {max} bytes")]
    TooLong {
        name: String,
        length: usize,
        max: usize,
    },
}

/// A namespaced identifier (`namespace:path`) uniquely naming a registered tier
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TierName {
    namespace: String,
    path: String,
}

impl TierName {
    pub fn new(namespace: &str, path: &str) -> Result<Self, TierNameError> {
        let full = || format!("{}:{}", namespace, path);
        if namespace.is_empty() || path.is_empty() {
            return Err(TierNameError::Empty { name: full() });
        }
        let length = namespace.len() + 1 + path.len();
        if length > MAX_NAME_BYTES {
            return Err(TierNameError::TooLong {
                name: full(),
                length,
                max: MAX_NAME_BYTES,
            });
        }
        if let Some(character) = namespace.chars().find(|c| !is_namespace_char(*c)) {
            return Err(TierNameError::InvalidNamespace {
                name: full(),
                character,
            });
        }
        if let Some(character) = path.chars().find(|c| !is_path_char(*c)) {
            return Err(TierNameError::InvalidPath {
                name: full(),
                character,
            });
        }
        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// Parses `namespace:path`, or `path` alone in the default namespace
    pub fn parse(input: &str) -> Result<Self, TierNameError> {
        match input.split_once(':') {
            Some((namespace, path)) => Self::new(namespace, path),
            None => Self::new(DEFAULT_NAMESPACE, input),
        }
    }

    /// Name in the default namespace, for paths known to be valid
    pub(crate) fn builtin(path: &'static str) -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            path: path.to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

fn is_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '.' | '-')
}

fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}

impl fmt::Display for TierName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl fmt::Debug for TierName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TierName({})", self)
    }
}

impl FromStr for TierName {
    type Err = TierNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for TierName {
    type Error = TierNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

pub(crate) fn join_names(names: &[TierName]) -> String {
    names
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
