// End-to-end runs against a budget folder laid out the way the host writes it

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use ynab_splitter::{run, Config, RunOptions, SplitterError, SPLIT_CATEGORY_ID};

const BUDGET: &str = "Household~1A2B";
const DATA: &str = "data1~5C6D";
const GUID: &str = "DEVICE-B-GUID";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let fixture = Fixture {
            dir: tempfile::tempdir().unwrap(),
        };
        fs::create_dir_all(fixture.data_dir().join("devices")).unwrap();
        fs::create_dir_all(fixture.device_dir()).unwrap();
        fs::write(
            fixture.budget_dir().join("Budget.ymeta"),
            json!({"formatVersion": "1.2", "relativeDataFolderName": DATA}).to_string(),
        )
        .unwrap();
        fixture
    }

    fn budget_dir(&self) -> PathBuf {
        self.dir.path().join(BUDGET)
    }

    fn data_dir(&self) -> PathBuf {
        self.budget_dir().join(DATA)
    }

    fn device_dir(&self) -> PathBuf {
        self.data_dir().join(GUID)
    }

    fn budget_file(&self) -> PathBuf {
        self.device_dir().join("Budget.yfull")
    }

    fn add_device(&self, file: &str, short_id: &str, guid: &str, knowledge: &str) {
        fs::write(
            self.data_dir().join("devices").join(file),
            json!({"shortDeviceId": short_id, "deviceGUID": guid, "knowledge": knowledge}).to_string(),
        )
        .unwrap();
    }

    fn write_budget(&self, text: &str) {
        fs::write(self.budget_file(), text).unwrap();
    }

    fn read_budget(&self) -> Value {
        serde_json::from_str(&fs::read_to_string(self.budget_file()).unwrap()).unwrap()
    }

    fn config(&self) -> Config {
        Config {
            mac_ynab_dir: Some(self.dir.path().to_path_buf()),
            windows_ynab_dir: Some(self.dir.path().to_path_buf()),
            budget_name: BUDGET.to_string(),
            smaller_split_denominator: 4,
            to_split_category_path: "Shared/To Split".to_string(),
            smaller_split_category_path: Some("Shared/Mine".to_string()),
            larger_split_category_path: Some("Shared/Theirs".to_string()),
            ledger_output_format: Some("{splitAmount}\t{totalAmount}\t{txDate}\t{payee}\t{memo}".to_string()),
        }
    }
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

const BUDGET_TEXT: &str = r#"{
    "fileMetaData": {"currentKnowledge": "A-40,B-7", "budgetDataVersion": "4.2"},
    "masterCategories": [
        {"entityId": "M1", "name": "Shared", "subCategories": [
            {"entityId": "X", "name": "To Split"},
            {"entityId": "S", "name": "Mine"},
            {"entityId": "L", "name": "Theirs"}
        ]}
    ],
    "payees": [{"entityId": "P1", "name": "Market"}],
    "transactions": [
        {"entityId": "T1", "amount": -100.00, "categoryId": "X", "payeeId": "P1",
         "date": "2024-03-01", "accountId": "ACC", "entityVersion": "A-12", "memo": "weekly"},
        {"entityId": "T2", "amount": -12.5, "categoryId": "OTHER", "payeeId": "P1",
         "date": "2024-03-02", "accountId": "ACC", "entityVersion": "B-3"}
    ]
}"#;

#[test]
fn test_split_run_writes_change_log_and_budget() {
    let fx = Fixture::new();
    fx.add_device("A.ydevice", "A", "DEVICE-A-GUID", "A-40");
    fx.add_device("B.ydevice", "B", GUID, "A-40,B-7");
    fx.write_budget(BUDGET_TEXT);

    let report = run(&fx.config(), RunOptions::default()).unwrap();
    assert_eq!(report.device.short_device_id, "B");
    assert_eq!(report.split_count, 1);
    assert_eq!(report.final_version.to_string(), "B-10");
    assert_eq!(
        report.ledger_output.as_deref(),
        Some("25.00\t100.00\t2024-03-01\tMarket\tweekly")
    );

    // Budget document
    let budget = fx.read_budget();
    assert_eq!(budget["fileMetaData"]["currentKnowledge"], "A-40,B-10");
    let tx = &budget["transactions"][0];
    assert_eq!(tx["categoryId"], SPLIT_CATEGORY_ID);
    assert_eq!(tx["entityVersion"], "B-10");
    assert_eq!(tx["memo"], "weekly");
    let subs = tx["subTransactions"].as_array().unwrap();
    assert_eq!(subs[0]["amount"].to_string(), "-25.00");
    assert_eq!(subs[0]["categoryId"], "S");
    assert_eq!(subs[0]["entityVersion"], "B-8");
    assert_eq!(subs[1]["amount"].to_string(), "-75.00");
    assert_eq!(subs[1]["categoryId"], "L");
    assert_eq!(subs[1]["entityVersion"], "B-9");
    assert_eq!(budget["transactions"][1]["amount"].to_string(), "-12.50");
    assert_eq!(budget["transactions"][1]["categoryId"], "OTHER");

    // Change-log unit, named after the start version
    assert_eq!(files_in(&fx.device_dir()), vec!["A-40,B-7", "Budget.yfull"]);
    let diff: Value =
        serde_json::from_str(&fs::read_to_string(fx.device_dir().join("A-40,B-7")).unwrap()).unwrap();
    assert_eq!(diff["deviceGUID"], GUID);
    assert_eq!(diff["shortDeviceId"], "B");
    assert_eq!(diff["startVersion"], "A-40,B-7");
    assert_eq!(diff["endVersion"], "A-40,B-10");
    assert_eq!(diff["dataVersion"], "4.2");
    assert_eq!(diff["formatVersion"], Value::Null);
    assert_eq!(diff["items"].as_array().unwrap().len(), 1);
    assert_eq!(diff["items"][0]["amount"].to_string(), "-100.00");
    assert_eq!(diff["items"][0]["subTransactions"][1]["amount"].to_string(), "-75.00");
}

#[test]
fn test_versions_run_on_across_transactions() {
    let fx = Fixture::new();
    fx.add_device("B.ydevice", "B", GUID, "A-40,B-7");
    let text = BUDGET_TEXT.replace(
        r#""entityVersion": "B-3"}"#,
        r#""entityVersion": "B-3"},
        {"entityId": "T3", "amount": -40.00, "categoryId": "X", "payeeId": "P1",
         "date": "2024-03-05", "accountId": "ACC", "entityVersion": "A-20"}"#,
    );
    fx.write_budget(&text);

    let report = run(&fx.config(), RunOptions::default()).unwrap();
    assert_eq!(report.split_count, 2);
    assert_eq!(report.final_version.to_string(), "B-13");
    assert_eq!(
        report.ledger_output.as_deref(),
        Some("25.00\t100.00\t2024-03-01\tMarket\tweekly\n10.00\t40.00\t2024-03-05\tMarket\t")
    );

    let budget = fx.read_budget();
    let versions = |tx: &Value| {
        let subs = tx["subTransactions"].as_array().unwrap();
        vec![
            subs[0]["entityVersion"].as_str().unwrap().to_string(),
            subs[1]["entityVersion"].as_str().unwrap().to_string(),
            tx["entityVersion"].as_str().unwrap().to_string(),
        ]
    };
    assert_eq!(versions(&budget["transactions"][0]), vec!["B-8", "B-9", "B-10"]);
    assert_eq!(budget["transactions"][1]["entityVersion"], "B-3");
    assert_eq!(versions(&budget["transactions"][2]), vec!["B-11", "B-12", "B-13"]);
    assert_eq!(budget["fileMetaData"]["currentKnowledge"], "A-40,B-13");

    let diff: Value =
        serde_json::from_str(&fs::read_to_string(fx.device_dir().join("A-40,B-7")).unwrap()).unwrap();
    let items = diff["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["entityId"], "T1");
    assert_eq!(items[1]["entityId"], "T3");
    assert_eq!(versions(&items[0]), vec!["B-8", "B-9", "B-10"]);
    assert_eq!(versions(&items[1]), vec!["B-11", "B-12", "B-13"]);
    assert_eq!(items[1]["subTransactions"][0]["amount"].to_string(), "-10.00");
    assert_eq!(diff["startVersion"], "A-40,B-7");
    assert_eq!(diff["endVersion"], "A-40,B-13");
}

#[test]
fn test_second_run_is_a_no_op() {
    let fx = Fixture::new();
    fx.add_device("B.ydevice", "B", GUID, "A-40,B-7");
    fx.write_budget(BUDGET_TEXT);
    run(&fx.config(), RunOptions::default()).unwrap();
    let after_first = fs::read_to_string(fx.budget_file()).unwrap();

    // The split parent now sits in the split category, so "To Split" is empty.
    let report = run(&fx.config(), RunOptions::default()).unwrap();
    assert_eq!(report.split_count, 0);
    assert!(report.change_log.is_none());
    assert_eq!(report.final_version.to_string(), "B-7");
    assert_eq!(fs::read_to_string(fx.budget_file()).unwrap(), after_first);
    assert_eq!(files_in(&fx.device_dir()).len(), 2);
}

#[test]
fn test_dry_run_writes_nothing() {
    let fx = Fixture::new();
    fx.add_device("B.ydevice", "B", GUID, "A-40,B-7");
    fx.write_budget(BUDGET_TEXT);

    let report = run(&fx.config(), RunOptions { dry_run: true }).unwrap();
    assert_eq!(report.split_count, 1);
    assert!(report.change_log.is_some());
    assert_eq!(fs::read_to_string(fx.budget_file()).unwrap(), BUDGET_TEXT);
    assert_eq!(files_in(&fx.device_dir()), vec!["Budget.yfull"]);
}

#[test]
fn test_longest_knowledge_device_is_chosen() {
    let fx = Fixture::new();
    fx.add_device("1.ydevice", "C", "DEVICE-C-GUID", "C-999");
    fx.add_device("2.ydevice", "D", "DEVICE-D-GUID", "D-999");
    fx.add_device("3.ydevice", "B", GUID, "A-40,B-7,C-1");
    fx.write_budget(&BUDGET_TEXT.replace("\"A-40,B-7\"", "\"A-40,B-7,C-1\""));

    let report = run(&fx.config(), RunOptions { dry_run: true }).unwrap();
    assert_eq!(report.device.device_guid, GUID);
    let unit = report.change_log.unwrap();
    assert_eq!(unit.end_version.to_string(), "A-40,B-10,C-1");
}

#[test]
fn test_no_devices_fails_before_budget_is_read() {
    let fx = Fixture::new();
    // No budget file either: the device check must trip first.
    let err = run(&fx.config(), RunOptions::default()).unwrap_err();
    assert!(matches!(err, SplitterError::NoDevice(_)), "{err}");
}

#[test]
fn test_missing_category_aborts_without_writes() {
    let fx = Fixture::new();
    fx.add_device("B.ydevice", "B", GUID, "A-40,B-7");
    fx.write_budget(BUDGET_TEXT);
    let mut config = fx.config();
    config.larger_split_category_path = Some("Shared/Nobody".to_string());

    let err = run(&config, RunOptions::default()).unwrap_err();
    assert!(matches!(err, SplitterError::NotFound { .. }), "{err}");
    assert_eq!(fs::read_to_string(fx.budget_file()).unwrap(), BUDGET_TEXT);
    assert_eq!(files_in(&fx.device_dir()), vec!["Budget.yfull"]);
}

#[test]
fn test_bad_ledger_format_aborts_first() {
    let fx = Fixture::new();
    let mut config = fx.config();
    config.ledger_output_format = Some("{payee} - {splitAmount}".to_string());

    let err = run(&config, RunOptions::default()).unwrap_err();
    assert!(matches!(err, SplitterError::Format { .. }), "{err}");
}
