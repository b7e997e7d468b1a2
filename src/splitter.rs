// ✂️ Transaction Splitter - One transaction becomes two sub-transactions
//
// The smaller part is `amount / R`, the larger part is whatever remains, so
// the two always add back to the original amount. Versions are issued in a
// fixed order: smaller child, larger child, then the parent itself.

use crate::budget::{SubTransaction, Transaction};
use crate::changelog::{ChangeItem, SubTransactionItem};
use crate::error::{Result, SplitterError};
use crate::knowledge::EntityVersion;
use crate::sequencer::VersionSequencer;
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

/// Host sentinel category for transactions that have sub-transactions
pub const SPLIT_CATEGORY_ID: &str = "Category/__Split__";

const TRANSACTION_ENTITY: &str = "transaction";
const SUB_TRANSACTION_ENTITY: &str = "subTransaction";
const DEFAULT_CLEARED: &str = "Uncleared";

/// Split `amount` into `(amount / denominator, amount - amount / denominator)`.
///
/// If the remainder had to be rounded to fit the decimal type, the smaller
/// part is recomputed from it so the parts still sum to `amount` exactly.
pub fn split_amount(amount: Decimal, denominator: u32) -> (Decimal, Decimal) {
    let mut smaller = amount / Decimal::from(denominator);
    let larger = amount - smaller;
    if smaller + larger != amount {
        smaller = amount - larger;
    }
    (smaller, larger)
}

/// Host-style entity id: an upper-case v4 UUID
pub fn generate_entity_id() -> String {
    Uuid::new_v4().to_string().to_uppercase()
}

/// Where split parts go
#[derive(Debug, Clone, PartialEq)]
pub struct SplitTargets {
    /// Category the parent is moved to
    pub split_category_id: String,
    pub smaller_category_id: Option<String>,
    pub larger_category_id: Option<String>,
    pub denominator: u32,
}

/// Result of splitting one transaction
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    pub smaller: Decimal,
    pub larger: Decimal,
    pub change: ChangeItem,
}

pub struct TransactionSplitter {
    targets: SplitTargets,
}

impl TransactionSplitter {
    pub fn new(targets: SplitTargets) -> Result<Self> {
        if targets.denominator < 2 {
            return Err(SplitterError::Config(format!(
                "split denominator must be at least 2, got {}",
                targets.denominator
            )));
        }
        Ok(TransactionSplitter { targets })
    }

    /// Split `tx` in place. Returns `None`, issuing no versions, when the
    /// transaction already sits in the split category.
    pub fn split(&self, tx: &mut Transaction, versions: &mut VersionSequencer) -> Option<SplitOutcome> {
        if tx.category_id.as_deref() == Some(self.targets.split_category_id.as_str()) {
            info!("transaction {} is already split, skipping", tx.entity_id);
            return None;
        }

        let (smaller, larger) = split_amount(tx.amount, self.targets.denominator);

        let smaller_sub = self.sub_transaction(tx, self.targets.smaller_category_id.clone(), smaller, versions.next());
        let larger_sub = self.sub_transaction(tx, self.targets.larger_category_id.clone(), larger, versions.next());

        tx.category_id = Some(self.targets.split_category_id.clone());
        tx.sub_transactions = Some(vec![smaller_sub, larger_sub]);
        tx.entity_version = versions.next();

        debug!(
            "split {} ({}) into {} and {}, now at {}",
            tx.entity_id, tx.amount, smaller, larger, tx.entity_version
        );

        Some(SplitOutcome {
            smaller,
            larger,
            change: change_item(tx),
        })
    }

    fn sub_transaction(
        &self,
        parent: &Transaction,
        category_id: Option<String>,
        amount: Decimal,
        version: EntityVersion,
    ) -> SubTransaction {
        SubTransaction {
            entity_type: SUB_TRANSACTION_ENTITY.to_string(),
            category_id,
            amount,
            entity_version: version,
            entity_id: generate_entity_id(),
            parent_transaction_id: parent.entity_id.clone(),
        }
    }
}

fn sub_transaction_item(sub: &SubTransaction) -> SubTransactionItem {
    SubTransactionItem {
        target_account_id: None,
        transfer_transaction_id: None,
        category_id: sub.category_id.clone(),
        entity_version: sub.entity_version.clone(),
        is_tombstone: false,
        is_resolved_conflict: false,
        amount: sub.amount,
        made_with_knowledge: None,
        memo: None,
        parent_transaction_id: sub.parent_transaction_id.clone(),
        entity_id: sub.entity_id.clone(),
        entity_type: sub.entity_type.clone(),
        check_number: None,
    }
}

/// Full diff entry for the transaction's current state
pub fn change_item(tx: &Transaction) -> ChangeItem {
    ChangeItem {
        flag: tx.flag.clone(),
        imported_payee: None,
        date: tx.date.clone(),
        sub_transactions: tx
            .sub_transactions
            .iter()
            .flatten()
            .map(sub_transaction_item)
            .collect(),
        matched_transactions: None,
        ynab_id: None,
        fit_id: None,
        source: None,
        entity_id: tx.entity_id.clone(),
        entity_type: TRANSACTION_ENTITY.to_string(),
        target_account_id: None,
        transfer_transaction_id: None,
        category_id: tx.category_id.clone(),
        payee_id: tx.payee_id.clone(),
        entity_version: tx.entity_version.clone(),
        parent_transaction_id_if_matched: None,
        is_tombstone: false,
        is_resolved_conflict: false,
        amount: tx.amount,
        account_id: tx.account_id.clone(),
        memo: tx.memo.clone(),
        made_with_knowledge: None,
        cleared: tx.cleared.clone().unwrap_or_else(|| DEFAULT_CLEARED.to_string()),
        date_entered_from_schedule: None,
        accepted: tx.accepted.unwrap_or(true),
        check_number: tx.check_number.clone(),
    }
}
