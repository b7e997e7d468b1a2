// YNAB Splitter - Core Library
// Splits transactions of one category in a local YNAB budget and records the
// change the way the host application's own sync engine would.

pub mod error;
pub mod money;
pub mod knowledge;
pub mod sequencer;
pub mod config;
pub mod device;
pub mod budget;
pub mod categories;
pub mod splitter;
pub mod changelog;
pub mod ledger;
pub mod run;

// Re-export commonly used types
pub use error::{Result, SplitterError};
pub use knowledge::{EntityVersion, Knowledge};
pub use sequencer::VersionSequencer;
pub use config::{Config, DEFAULT_CONFIG_FILE};
pub use device::{load_devices, select_device, Device};
pub use budget::{
    BudgetDocument, BudgetLayout, MasterCategory, SubCategory, Payee,
    Transaction, SubTransaction,
};
pub use categories::{CategoryPath, CategoryResolver};
pub use splitter::{split_amount, SplitOutcome, SplitTargets, TransactionSplitter, SPLIT_CATEGORY_ID};
pub use changelog::{ChangeItem, ChangeLogBuilder, ChangeLogUnit, SubTransactionItem};
pub use ledger::{LedgerEntry, LedgerRecorder, LedgerTemplate};
pub use run::{run, RunOptions, RunReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
