use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

pub const MAX_NAME_LENGTH: usize = 100;

static ALLOWED_CHARACTERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}\p{N} _.,()#&'\-]+$").expect("name pattern is a valid regex")
});

// A leading one of these turns the cell into a formula.
const FORMULA_PREFIXES: [char; 4] = ['=', '+', '-', '@'];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApartmentNameError {
    #[error("Name must not be empty")]
    Empty,
    #[error("Name must be at most {MAX_NAME_LENGTH} characters long")]
    TooLong,
    #[error("Name may only contain letters, digits, spaces and _ - . , ( ) # & '")]
    ForbiddenCharacter,
    #[error("Name must not start with '{0}'")]
    FormulaPrefix(char),
    #[error("Name must not contain '..'")]
    PathTraversal,
}

/// Key of a saved record. Surrounding whitespace is trimmed; comparison is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ApartmentName(String);

impl ApartmentName {
    pub fn parse(raw: &str) -> Result<Self, ApartmentNameError> {
        let name = raw.trim();

        if name.is_empty() {
            return Err(ApartmentNameError::Empty);
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(ApartmentNameError::TooLong);
        }
        if let Some(prefix) = name.chars().next().filter(|c| FORMULA_PREFIXES.contains(c)) {
            return Err(ApartmentNameError::FormulaPrefix(prefix));
        }
        if !ALLOWED_CHARACTERS.is_match(name) {
            return Err(ApartmentNameError::ForbiddenCharacter);
        }
        if name.contains("..") {
            return Err(ApartmentNameError::PathTraversal);
        }

        Ok(ApartmentName(name.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ApartmentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ApartmentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
