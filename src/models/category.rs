//! Testing categories
//!
//! E2E and component tests keep separate statistics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Kind of test a file belongs to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    E2e,
    Component,
}

impl Category {
    /// Key used in the persisted document
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::E2e => "e2e",
            Category::Component => "component",
        }
    }

    /// Both categories, in document order
    pub fn all() -> [Category; 2] {
        [Category::E2e, Category::Component]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown testing type '{0}'. Expected one of: e2e, component")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "e2e" => Ok(Category::E2e),
            "component" => Ok(Category::Component),
            _ => Err(ParseCategoryError(s.to_string())),
        }
    }
}
