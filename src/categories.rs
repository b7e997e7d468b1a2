// 🏷️ Category Resolver - "Master Category/Category" paths to entity ids

use crate::budget::{BudgetDocument, MasterCategory};
use crate::error::{Result, SplitterError};
use regex::Regex;
use std::str::FromStr;
use std::sync::OnceLock;

fn path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<master>[\w\s]+)/(?P<category>[\w\s]+)$").expect("category path pattern is valid")
    })
}

/// A two-level category path such as `Shared Expenses/Groceries`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPath {
    pub master: String,
    pub category: String,
}

impl FromStr for CategoryPath {
    type Err = SplitterError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = path_pattern()
            .captures(s)
            .ok_or_else(|| SplitterError::format("category path (expected \"Master Category/Category\")", s))?;
        Ok(CategoryPath {
            master: caps["master"].to_string(),
            category: caps["category"].to_string(),
        })
    }
}

pub struct CategoryResolver {
    masters: Vec<MasterCategory>,
}

impl CategoryResolver {
    pub fn new(masters: Vec<MasterCategory>) -> Self {
        CategoryResolver { masters }
    }

    pub fn from_document(document: &BudgetDocument) -> Result<Self> {
        Ok(CategoryResolver::new(document.master_categories()?))
    }

    /// Entity id of the category at `path`. Matching is exact and skips
    /// tombstoned entries; with duplicates the first in document order wins.
    pub fn resolve(&self, path: &str) -> Result<String> {
        let parsed: CategoryPath = path.parse()?;

        let master = self
            .masters
            .iter()
            .find(|m| m.is_live() && m.name == parsed.master)
            .ok_or_else(|| SplitterError::not_found("master category", parsed.master.clone()))?;

        master
            .sub_categories()
            .iter()
            .find(|c| c.is_live() && c.name == parsed.category)
            .map(|c| c.entity_id.clone())
            .ok_or_else(|| SplitterError::not_found("category", path))
    }

    /// Like `resolve`, but an unset path resolves to no category.
    pub fn resolve_optional(&self, path: Option<&str>) -> Result<Option<String>> {
        match path {
            None | Some("") => Ok(None),
            Some(path) => self.resolve(path).map(Some),
        }
    }
}
