use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// One accounting entry, attributed to a sport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    pub sport_id: String,
    pub amount: i64,
    pub description: String,
    pub date: String,
    pub category: String,
}

/// Per-sport rollup for the accounting view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SportSummary {
    pub sport_id: String,
    pub income: i64,
    pub expense: i64,
    pub net: i64,
}

/// In-memory transaction ledger backing the admin accounting view.
pub struct TransactionLedger {
    entries: Vec<Transaction>,
    next_seq: u64,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 1,
        }
    }

    pub fn with_entries(entries: Vec<Transaction>) -> Self {
        let next_seq = entries.len() as u64 + 1;
        Self { entries, next_seq }
    }

    /// Record a new transaction and return it with an assigned id.
    pub fn record(
        &mut self,
        kind: TransactionKind,
        sport_id: &str,
        amount: i64,
        description: &str,
        date: &str,
        category: &str,
    ) -> &Transaction {
        let txn = Transaction {
            id: format!("txn-{}", self.next_seq),
            kind,
            sport_id: sport_id.to_string(),
            amount,
            description: description.to_string(),
            date: date.to_string(),
            category: category.to_string(),
        };
        self.next_seq += 1;
        self.entries.push(txn);
        self.entries.last().expect("entry just pushed")
    }

    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn entries_for_sport(&self, sport_id: &str) -> Vec<&Transaction> {
        self.entries
            .iter()
            .filter(|t| t.sport_id == sport_id)
            .collect()
    }

    /// Aggregate income/expense per sport, sorted by sport id for a
    /// stable response order.
    pub fn summarize(&self) -> Vec<SportSummary> {
        let mut by_sport: HashMap<&str, (i64, i64)> = HashMap::new();
        for txn in &self.entries {
            let entry = by_sport.entry(txn.sport_id.as_str()).or_insert((0, 0));
            match txn.kind {
                TransactionKind::Income => entry.0 += txn.amount,
                TransactionKind::Expense => entry.1 += txn.amount,
            }
        }

        let mut summaries: Vec<SportSummary> = by_sport
            .into_iter()
            .map(|(sport_id, (income, expense))| SportSummary {
                sport_id: sport_id.to_string(),
                income,
                expense,
                net: income - expense,
            })
            .collect();
        summaries.sort_by(|a, b| a.sport_id.cmp(&b.sport_id));
        summaries
    }
}

impl Default for TransactionLedger {
    fn default() -> Self {
        Self::new()
    }
}
