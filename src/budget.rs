// 📚 Budget Document - The host ledger file and its on-disk layout
//
// The document is kept as a JSON tree so fields this tool does not model
// survive a rewrite untouched. Typed views (categories, payees, transactions)
// are decoded from the tree on demand; mutated transactions are written back
// field by field.

use crate::error::{Result, SplitterError};
use crate::knowledge::{EntityVersion, Knowledge};
use crate::money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

pub const META_FILE: &str = "Budget.ymeta";
pub const BUDGET_FILE: &str = "Budget.yfull";
pub const DEVICES_DIR: &str = "devices";

// ============================================================================
// ON-DISK LAYOUT
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BudgetMeta {
    relative_data_folder_name: String,
}

/// Where one budget's files live
#[derive(Debug, Clone)]
pub struct BudgetLayout {
    pub budget_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl BudgetLayout {
    /// Resolve the data folder through the budget's `Budget.ymeta`.
    pub fn open<P: AsRef<Path>>(budget_dir: P) -> Result<Self> {
        let budget_dir = budget_dir.as_ref().to_path_buf();
        let meta_path = budget_dir.join(META_FILE);
        let meta: BudgetMeta = read_json(&meta_path)?;
        let data_dir = budget_dir.join(meta.relative_data_folder_name);
        Ok(BudgetLayout { budget_dir, data_dir })
    }

    pub fn devices_dir(&self) -> PathBuf {
        self.data_dir.join(DEVICES_DIR)
    }

    /// Folder holding a device's full budget and its change-log files
    pub fn device_dir(&self, device_guid: &str) -> PathBuf {
        self.data_dir.join(device_guid)
    }

    pub fn budget_file(&self, device_guid: &str) -> PathBuf {
        self.device_dir(device_guid).join(BUDGET_FILE)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| SplitterError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| SplitterError::json(path, e))
}

/// Pretty-print with the host's 4-space indent.
pub fn to_pretty_json<T: Serialize>(value: &T) -> std::result::Result<String, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Write through a sibling temp file and rename over the target.
pub fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    fs::write(&tmp, contents).map_err(|e| SplitterError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| SplitterError::io(path, e))
}

// ============================================================================
// TYPED VIEWS
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategory {
    pub entity_id: String,
    pub name: String,
    #[serde(default)]
    pub is_tombstone: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterCategory {
    pub entity_id: String,
    pub name: String,
    #[serde(default)]
    pub is_tombstone: Option<bool>,
    #[serde(default)]
    pub sub_categories: Option<Vec<SubCategory>>,
}

impl SubCategory {
    pub fn is_live(&self) -> bool {
        !self.is_tombstone.unwrap_or(false)
    }
}

impl MasterCategory {
    pub fn is_live(&self) -> bool {
        !self.is_tombstone.unwrap_or(false)
    }

    pub fn sub_categories(&self) -> &[SubCategory] {
        self.sub_categories.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payee {
    pub entity_id: String,
    pub name: String,
}

/// Child of a split transaction. Only ever created by a split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTransaction {
    pub entity_type: String,
    pub category_id: Option<String>,
    #[serde(with = "crate::money")]
    pub amount: Decimal,
    pub entity_version: EntityVersion,
    pub entity_id: String,
    pub parent_transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub entity_id: String,
    #[serde(with = "crate::money")]
    pub amount: Decimal,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub payee_id: Option<String>,
    pub date: String,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    pub entity_version: EntityVersion,
    #[serde(default)]
    pub cleared: Option<String>,
    #[serde(default)]
    pub accepted: Option<bool>,
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default)]
    pub check_number: Option<String>,
    #[serde(default)]
    pub is_tombstone: Option<bool>,
    #[serde(default)]
    pub sub_transactions: Option<Vec<SubTransaction>>,
}

impl Transaction {
    pub fn is_live(&self) -> bool {
        !self.is_tombstone.unwrap_or(false)
    }
}

// ============================================================================
// DOCUMENT
// ============================================================================

#[derive(Debug, Clone)]
pub struct BudgetDocument {
    source: PathBuf,
    root: Value,
}

impl BudgetDocument {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let root: Value = read_json(path)?;
        Ok(BudgetDocument {
            source: path.to_path_buf(),
            root,
        })
    }

    pub fn from_value(root: Value) -> Self {
        BudgetDocument {
            source: PathBuf::from("<memory>"),
            root,
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    fn decode<T: serde::de::DeserializeOwned>(&self, value: &Value) -> Result<T> {
        T::deserialize(value).map_err(|e| SplitterError::json(&self.source, e))
    }

    fn list(&self, key: &'static str) -> &[Value] {
        self.root
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn list_mut(&mut self, key: &'static str) -> Result<&mut Vec<Value>> {
        let source = self.source.clone();
        self.root
            .get_mut(key)
            .and_then(Value::as_array_mut)
            .ok_or_else(|| SplitterError::format("budget document", format!("{} has no {} list", source.display(), key)))
    }

    pub fn master_categories(&self) -> Result<Vec<MasterCategory>> {
        self.list("masterCategories").iter().map(|v| self.decode(v)).collect()
    }

    /// Name of the payee with the given id
    pub fn payee_name(&self, payee_id: &str) -> Result<String> {
        for value in self.list("payees") {
            if value.get("entityId").and_then(Value::as_str) == Some(payee_id) {
                let payee: Payee = self.decode(value)?;
                return Ok(payee.name);
            }
        }
        Err(SplitterError::not_found("payee", payee_id))
    }

    /// Transactions whose raw `categoryId` equals `category_id`, in document
    /// order. Only these are decoded, so a malformed transaction elsewhere in
    /// the document does not get in the way.
    pub fn transactions_in_category(&self, category_id: &str) -> Result<Vec<Transaction>> {
        self.list("transactions")
            .iter()
            .filter(|v| v.get("categoryId").and_then(Value::as_str) == Some(category_id))
            .map(|v| self.decode(v))
            .collect()
    }

    /// Write a mutated transaction's category, version and sub-transactions
    /// back into the tree. Every other field is left as loaded.
    pub fn store_transaction(&mut self, tx: &Transaction) -> Result<()> {
        let source = self.source.clone();
        let node = self
            .list_mut("transactions")?
            .iter_mut()
            .find(|v| v.get("entityId").and_then(Value::as_str) == Some(tx.entity_id.as_str()))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| SplitterError::not_found("transaction", tx.entity_id.clone()))?;

        node.insert("categoryId".to_string(), tx.category_id.clone().map_or(Value::Null, Value::String));
        node.insert("entityVersion".to_string(), Value::String(tx.entity_version.to_string()));
        if let Some(subs) = &tx.sub_transactions {
            let subs = serde_json::to_value(subs).map_err(|e| SplitterError::json(&source, e))?;
            node.insert("subTransactions".to_string(), subs);
        }
        Ok(())
    }

    pub fn current_knowledge(&self) -> Result<Knowledge> {
        self.root
            .pointer("/fileMetaData/currentKnowledge")
            .and_then(Value::as_str)
            .ok_or_else(|| SplitterError::format("budget document", "missing fileMetaData.currentKnowledge"))?
            .parse()
    }

    pub fn set_current_knowledge(&mut self, knowledge: &Knowledge) -> Result<()> {
        let meta = self
            .root
            .get_mut("fileMetaData")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| SplitterError::format("budget document", "missing fileMetaData"))?;
        meta.insert("currentKnowledge".to_string(), Value::String(knowledge.to_string()));
        Ok(())
    }

    /// Re-emit every monetary value with two places: transaction and
    /// scheduled transaction amounts (with their sub-transactions) and
    /// monthly sub-category `budgeted` values.
    pub fn normalize_amounts(&mut self) -> Result<()> {
        let source = self.source.clone();
        for list in ["transactions", "scheduledTransactions"] {
            for tx in objects_mut(self.root.get_mut(list)) {
                normalize_field(tx, "amount", &source)?;
                for sub in objects_mut(tx.get_mut("subTransactions")) {
                    normalize_field(sub, "amount", &source)?;
                }
            }
        }
        for month in objects_mut(self.root.get_mut("monthlyBudgets")) {
            for budget in objects_mut(month.get_mut("monthlySubCategoryBudgets")) {
                normalize_field(budget, "budgeted", &source)?;
            }
        }
        Ok(())
    }

    pub fn to_pretty_string(&self) -> Result<String> {
        to_pretty_json(&self.root).map_err(|e| SplitterError::json(&self.source, e))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_atomically(path.as_ref(), &self.to_pretty_string()?)
    }
}

/// Object elements of an optional JSON array
fn objects_mut<'a>(list: Option<&'a mut Value>) -> impl Iterator<Item = &'a mut Map<String, Value>> {
    list.and_then(Value::as_array_mut)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object_mut)
}

fn normalize_field(node: &mut Map<String, Value>, key: &str, source: &Path) -> Result<()> {
    let amount = match node.get(key) {
        Some(Value::Number(number)) => money::from_number(number)?,
        _ => return Ok(()),
    };
    let number = money::to_number(amount).map_err(|e| SplitterError::json(source, e))?;
    node.insert(key.to_string(), Value::Number(number));
    Ok(())
}
