// 📒 Ledger Recorder - Human-readable lines for each split
//
// Every split adds one entry. Entries are rendered through a template such
// as `{txDate}\t{payee}\t{splitAmount}`; the result goes to the clipboard.
// Amounts are recorded as unsigned magnitudes whatever the transaction's sign.

use crate::error::{Result, SplitterError};
use crate::money::format_amount;
use chrono::{Local, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;

/// Placeholder names a template may use
pub const LEDGER_FIELDS: [&str; 6] = ["splitAmount", "totalAmount", "txDate", "memo", "date", "payee"];

fn template_grammar() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\{\w+\}(\s*\{\w+\})*$").expect("template grammar is valid"))
}

fn placeholder() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\w+\}").expect("placeholder pattern is valid"))
}

// ============================================================================
// TEMPLATE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Field(String),
    Separator(String),
}

/// A validated ledger output template
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerTemplate {
    pieces: Vec<Piece>,
}

impl LedgerTemplate {
    /// Parse a template: one or more `{field}` tokens, optionally separated
    /// by whitespace, each naming a known field.
    pub fn parse(template: &str) -> Result<Self> {
        if !template_grammar().is_match(template) {
            return Err(SplitterError::format("ledger output format", template));
        }

        let mut pieces = Vec::new();
        let mut last = 0;
        for token in placeholder().find_iter(template) {
            if token.start() > last {
                pieces.push(Piece::Separator(template[last..token.start()].to_string()));
            }
            let name = &template[token.start() + 1..token.end() - 1];
            if !LEDGER_FIELDS.contains(&name) {
                return Err(SplitterError::format("ledger field", name));
            }
            pieces.push(Piece::Field(name.to_string()));
            last = token.end();
        }
        Ok(LedgerTemplate { pieces })
    }

    fn render_entry(&self, entry: &LedgerEntry) -> String {
        self.pieces
            .iter()
            .map(|piece| match piece {
                Piece::Field(name) => entry.field(name).unwrap_or_default(),
                Piece::Separator(text) => text.clone(),
            })
            .collect()
    }
}

// ============================================================================
// RECORDER
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub split_amount: Decimal,
    pub total_amount: Decimal,
    pub tx_date: String,
    pub memo: String,
    /// Day the split was recorded
    pub date: NaiveDate,
    pub payee: String,
}

impl LedgerEntry {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "splitAmount" => Some(format_amount(self.split_amount)),
            "totalAmount" => Some(format_amount(self.total_amount)),
            "txDate" => Some(self.tx_date.clone()),
            "memo" => Some(self.memo.clone()),
            "date" => Some(self.date.format("%Y-%m-%d").to_string()),
            "payee" => Some(self.payee.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct LedgerRecorder {
    entries: Vec<LedgerEntry>,
}

impl LedgerRecorder {
    pub fn new() -> Self {
        LedgerRecorder::default()
    }

    /// Record one split, stamped with today's date.
    pub fn record(&mut self, split_amount: Decimal, total_amount: Decimal, tx_date: &str, memo: &str, payee: &str) {
        self.record_on(Local::now().date_naive(), split_amount, total_amount, tx_date, memo, payee);
    }

    pub fn record_on(
        &mut self,
        date: NaiveDate,
        split_amount: Decimal,
        total_amount: Decimal,
        tx_date: &str,
        memo: &str,
        payee: &str,
    ) {
        self.entries.push(LedgerEntry {
            split_amount: split_amount.abs(),
            total_amount: total_amount.abs(),
            tx_date: tx_date.to_string(),
            memo: memo.to_string(),
            date,
            payee: payee.to_string(),
        });
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// One line per entry, joined by newlines.
    pub fn render(&self, template: &str) -> Result<String> {
        let template = LedgerTemplate::parse(template)?;
        Ok(self.render_with(&template))
    }

    pub fn render_with(&self, template: &LedgerTemplate) -> String {
        self.entries
            .iter()
            .map(|entry| template.render_entry(entry))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_render_substitutes_every_field() {
        let mut recorder = LedgerRecorder::new();
        recorder.record_on(day(), dec("-25"), dec("-100.00"), "2024-03-01", "groceries", "Market");

        let out = recorder
            .render("{splitAmount}\t{totalAmount}\t{txDate}\t{memo}\t{date}\t{payee}")
            .unwrap();
        assert_eq!(out, "25.00\t100.00\t2024-03-01\tgroceries\t2024-03-09\tMarket");
    }

    #[test]
    fn test_lines_joined_by_newline() {
        let mut recorder = LedgerRecorder::new();
        recorder.record_on(day(), dec("1.5"), dec("3"), "2024-01-01", "", "A");
        recorder.record_on(day(), dec("2"), dec("8"), "2024-01-02", "", "B");

        assert_eq!(recorder.render("{payee} {splitAmount}").unwrap(), "A 1.50\nB 2.00");
    }

    #[test]
    fn test_amounts_are_unsigned() {
        let mut recorder = LedgerRecorder::new();
        recorder.record_on(day(), dec("12.345"), dec("-49.38"), "2024-01-01", "", "A");
        let entry = &recorder.entries()[0];
        assert_eq!(entry.split_amount, dec("12.345"));
        assert_eq!(entry.total_amount, dec("49.38"));
        assert_eq!(recorder.render("{splitAmount}").unwrap(), "12.34");
    }

    #[test]
    fn test_unknown_field_is_format_error() {
        let recorder = LedgerRecorder::new();
        let err = recorder.render("{amount}").unwrap_err();
        assert!(matches!(err, SplitterError::Format { .. }));
    }

    #[test]
    fn test_template_grammar() {
        assert!(LedgerTemplate::parse("{payee}").is_ok());
        assert!(LedgerTemplate::parse("{payee}{memo}").is_ok());
        assert!(LedgerTemplate::parse("{payee} \t {memo}").is_ok());

        assert!(LedgerTemplate::parse("").is_err());
        assert!(LedgerTemplate::parse("payee").is_err());
        assert!(LedgerTemplate::parse("{payee}, {memo}").is_err());
        assert!(LedgerTemplate::parse(" {payee}").is_err());
    }

    #[test]
    fn test_empty_recorder_renders_nothing() {
        assert_eq!(LedgerRecorder::new().render("{payee}").unwrap(), "");
    }
}
