//! Core label domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, UserId, database_id::LabelId};

/// A validated, non-empty label name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(try_from = "String")]
pub struct LabelName(String);

impl LabelName {
    /// Create a label name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyName] if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a label name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl TryFrom<String> for LabelName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        LabelName::new(&value)
    }
}

impl AsRef<str> for LabelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for LabelName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LabelName::new(s)
    }
}

impl Display for LabelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A free-form label attached to transactions (e.g., 'Holiday', 'Tax deductible').
///
/// Unlike categories, a transaction may carry any number of labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Label {
    pub id: LabelId,
    pub user_id: UserId,
    pub name: LabelName,
}

/// Request body for label creation.
#[derive(Debug, Serialize, Deserialize)]
pub struct LabelData {
    pub name: LabelName,
}
