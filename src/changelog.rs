// 🔄 Change Log - Sync artifacts in the host application's own diff format
//
// A change-log unit covers the version range [startVersion, endVersion) of a
// single device. The host's sync engine expects every field of an item to be
// present, so fields this tool never sets are written out as null.

use crate::device::Device;
use crate::knowledge::{EntityVersion, Knowledge};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Data version the host writes into its diffs
pub const DATA_VERSION: &str = "4.2";

// ============================================================================
// CHANGE ITEMS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTransactionItem {
    pub target_account_id: Option<String>,
    pub transfer_transaction_id: Option<String>,
    pub category_id: Option<String>,
    pub entity_version: EntityVersion,
    pub is_tombstone: bool,
    pub is_resolved_conflict: bool,
    #[serde(with = "crate::money")]
    pub amount: Decimal,
    pub made_with_knowledge: Option<String>,
    pub memo: Option<String>,
    pub parent_transaction_id: String,
    pub entity_id: String,
    pub entity_type: String,
    pub check_number: Option<String>,
}

/// New state of one transaction, in the host's diff schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeItem {
    pub flag: Option<String>,
    pub imported_payee: Option<String>,
    pub date: String,
    pub sub_transactions: Vec<SubTransactionItem>,
    pub matched_transactions: Option<Vec<Value>>,
    #[serde(rename = "YNABID")]
    pub ynab_id: Option<String>,
    #[serde(rename = "FITID")]
    pub fit_id: Option<String>,
    pub source: Option<String>,
    pub entity_id: String,
    pub entity_type: String,
    pub target_account_id: Option<String>,
    pub transfer_transaction_id: Option<String>,
    pub category_id: Option<String>,
    pub payee_id: Option<String>,
    pub entity_version: EntityVersion,
    pub parent_transaction_id_if_matched: Option<String>,
    pub is_tombstone: bool,
    pub is_resolved_conflict: bool,
    #[serde(with = "crate::money")]
    pub amount: Decimal,
    pub account_id: Option<String>,
    pub memo: Option<String>,
    pub made_with_knowledge: Option<String>,
    pub cleared: String,
    pub date_entered_from_schedule: Option<String>,
    pub accepted: bool,
    pub check_number: Option<String>,
}

// ============================================================================
// CHANGE LOG UNIT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogUnit {
    #[serde(rename = "deviceGUID")]
    pub device_guid: String,
    pub short_device_id: String,
    pub format_version: Option<String>,
    pub data_version: String,
    pub start_version: Knowledge,
    pub end_version: Knowledge,
    #[serde(rename = "budgetDataGUID")]
    pub budget_data_guid: Option<String>,
    pub items: Vec<ChangeItem>,
    pub publish_time: String,
}

impl ChangeLogUnit {
    /// The host names diff files after their start version.
    pub fn file_name(&self) -> String {
        self.start_version.to_string()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

#[derive(Debug, Default)]
pub struct ChangeLogBuilder {
    items: Vec<ChangeItem>,
}

impl ChangeLogBuilder {
    pub fn new() -> Self {
        ChangeLogBuilder::default()
    }

    pub fn push(&mut self, item: ChangeItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Assemble the unit. `start_knowledge` is the device's knowledge before
    /// the run; the end version is the same knowledge with the device's own
    /// mark moved to `final_version`. Returns `None` when nothing changed.
    pub fn finalize(
        self,
        device: &Device,
        start_knowledge: &Knowledge,
        final_version: &EntityVersion,
    ) -> Option<ChangeLogUnit> {
        if self.items.is_empty() {
            return None;
        }

        Some(ChangeLogUnit {
            device_guid: device.device_guid.clone(),
            short_device_id: device.short_device_id.clone(),
            format_version: None,
            data_version: DATA_VERSION.to_string(),
            start_version: start_knowledge.clone(),
            end_version: start_knowledge.with_version(final_version),
            budget_data_guid: None,
            items: self.items,
            publish_time: String::new(),
        })
    }
}
