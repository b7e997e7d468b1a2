// 🚀 Split Run - Resolve, split, log the change, commit
//
// Everything happens in memory first. Files are written only after every
// transaction has been processed and only if at least one was split: the
// change-log unit first, then the budget document.

use crate::budget::{to_pretty_json, write_atomically, BudgetDocument, BudgetLayout};
use crate::categories::CategoryResolver;
use crate::changelog::{ChangeLogBuilder, ChangeLogUnit};
use crate::config::Config;
use crate::device::{load_devices, select_device, Device};
use crate::error::{Result, SplitterError};
use crate::knowledge::EntityVersion;
use crate::ledger::LedgerRecorder;
use crate::sequencer::VersionSequencer;
use crate::splitter::{SplitTargets, TransactionSplitter, SPLIT_CATEGORY_ID};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Compute everything, write nothing
    pub dry_run: bool,
}

/// What a run did
#[derive(Debug, Clone)]
pub struct RunReport {
    pub device: Device,
    pub split_count: usize,
    pub final_version: EntityVersion,
    /// Where the change-log unit was (or, in a dry run, would be) written
    pub change_log_path: Option<PathBuf>,
    pub change_log: Option<ChangeLogUnit>,
    /// Rendered ledger lines, if a ledger format is configured
    pub ledger_output: Option<String>,
}

pub fn run(config: &Config, options: RunOptions) -> Result<RunReport> {
    config.validate()?;
    let ledger_template = config.ledger_template()?;

    let layout = BudgetLayout::open(config.budget_dir()?)?;
    info!("budget data dir is {}", layout.data_dir.display());

    let devices = load_devices(layout.devices_dir())?;
    let device = select_device(&devices)?.clone();
    info!("acting as device {} (knowledge {})", device.short_device_id, device.knowledge);

    let start_knowledge = device.parsed_knowledge()?;
    let seed = device.current_version()?;
    info!("current entity version is {}", seed);
    let mut versions = VersionSequencer::from_version(seed)?;

    let budget_path = layout.budget_file(&device.device_guid);
    info!("reading budget from {}", budget_path.display());
    let mut document = BudgetDocument::load(&budget_path)?;

    let resolver = CategoryResolver::from_document(&document)?;
    let to_split_id = resolver.resolve(&config.to_split_category_path)?;
    let targets = SplitTargets {
        split_category_id: SPLIT_CATEGORY_ID.to_string(),
        smaller_category_id: resolver.resolve_optional(config.smaller_split_category_path.as_deref())?,
        larger_category_id: resolver.resolve_optional(config.larger_split_category_path.as_deref())?,
        denominator: config.smaller_split_denominator,
    };
    info!("\"to split\" category is {}", to_split_id);
    info!("\"smaller split\" category is {:?}", targets.smaller_category_id);
    info!("\"larger split\" category is {:?}", targets.larger_category_id);
    let splitter = TransactionSplitter::new(targets)?;

    let candidates: Vec<_> = document
        .transactions_in_category(&to_split_id)?
        .into_iter()
        .filter(|tx| tx.is_live())
        .collect();
    info!("there are {} transactions to split", candidates.len());

    let mut builder = ChangeLogBuilder::new();
    let mut recorder = LedgerRecorder::new();
    for mut tx in candidates {
        info!("splitting transaction {} on {} for {}", tx.entity_id, tx.date, tx.amount);
        let total = tx.amount;
        let Some(outcome) = splitter.split(&mut tx, &mut versions) else {
            continue;
        };

        let payee = match tx.payee_id.as_deref() {
            Some(id) => document.payee_name(id)?,
            None => String::new(),
        };
        recorder.record(outcome.smaller, total, &tx.date, tx.memo.as_deref().unwrap_or(""), &payee);

        document.store_transaction(&tx)?;
        builder.push(outcome.change);
    }

    let split_count = builder.len();
    let final_version = versions.current().clone();
    info!("final entity version is {}", final_version);

    let device_dir = layout.device_dir(&device.device_guid);
    let change_log = builder.finalize(&device, &start_knowledge, &final_version);
    let mut change_log_path = None;

    if let Some(unit) = &change_log {
        let knowledge = document.current_knowledge()?.with_version(&final_version);
        document.set_current_knowledge(&knowledge)?;
        document.normalize_amounts()?;
        info!("file metadata knowledge updated to {}", knowledge);

        let path = device_dir.join(unit.file_name());
        let diff = to_pretty_json(unit).map_err(|e| SplitterError::json(&path, e))?;
        if options.dry_run {
            info!("dry run: skipping change-log write to {}", path.display());
            debug!("{}", diff);
            info!("dry run: skipping budget write to {}", budget_path.display());
        } else {
            info!("writing change-log to {}", path.display());
            write_atomically(&path, &diff)?;
            info!("writing updated budget to {}", budget_path.display());
            document.save(&budget_path)?;
        }
        change_log_path = Some(path);
    } else {
        info!("nothing to do");
    }

    let ledger_output = ledger_template.map(|template| recorder.render_with(&template));

    Ok(RunReport {
        device,
        split_count,
        final_version,
        change_log_path,
        change_log,
        ledger_output,
    })
}
