// ⚙️ Configuration - One JSON file describes where the budget lives and how to split

use crate::error::{Result, SplitterError};
use crate::ledger::LedgerTemplate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "ynabsplitter.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Root folder holding the budgets (macOS and other unix systems)
    pub mac_ynab_dir: Option<PathBuf>,

    /// Root folder holding the budgets (Windows)
    pub windows_ynab_dir: Option<PathBuf>,

    /// Budget folder name under the root
    pub budget_name: String,

    /// The smaller part of each split is `amount / smallerSplitDenominator`
    pub smaller_split_denominator: u32,

    /// `Master Category/Category` holding the transactions to split
    pub to_split_category_path: String,

    pub smaller_split_category_path: Option<String>,

    pub larger_split_category_path: Option<String>,

    /// Template for ledger lines, e.g. `{txDate}\t{payee}\t{splitAmount}`
    pub ledger_output_format: Option<String>,
}

impl Config {
    /// Load and validate a config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| SplitterError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| SplitterError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value that can be checked without touching the budget.
    pub fn validate(&self) -> Result<()> {
        if self.smaller_split_denominator < 2 {
            return Err(SplitterError::Config(format!(
                "smallerSplitDenominator must be at least 2, got {}",
                self.smaller_split_denominator
            )));
        }
        if self.budget_name.trim().is_empty() {
            return Err(SplitterError::Config("budgetName is empty".to_string()));
        }
        self.ledger_template()?;
        self.ynab_dir()?;
        Ok(())
    }

    /// Root folder for the current OS
    pub fn ynab_dir(&self) -> Result<&Path> {
        let (key, dir) = if cfg!(windows) {
            ("windowsYnabDir", &self.windows_ynab_dir)
        } else {
            ("macYnabDir", &self.mac_ynab_dir)
        };
        dir.as_deref()
            .ok_or_else(|| SplitterError::Config(format!("{} is not set", key)))
    }

    pub fn budget_dir(&self) -> Result<PathBuf> {
        Ok(self.ynab_dir()?.join(&self.budget_name))
    }

    /// Parsed ledger template; `None` when ledger output is disabled
    pub fn ledger_template(&self) -> Result<Option<LedgerTemplate>> {
        match self.ledger_output_format.as_deref() {
            None | Some("") => Ok(None),
            Some(format) => LedgerTemplate::parse(format).map(Some),
        }
    }
}
