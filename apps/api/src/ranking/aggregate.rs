//! Unifies heterogeneous candidate records into one ranked table.

use std::cmp::Ordering;
use std::collections::HashSet;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::errors::PipelineError;
use crate::models::candidate::CANDIDATE_NAME;
use crate::models::CandidateRecord;

/// Candidate records sorted by `total_score`, with a column set covering every record.
#[derive(Debug, Clone)]
pub struct RankedTable {
    columns: Vec<String>,
    rows: Vec<CandidateRecord>,
}

impl RankedTable {
    /// Builds the table from records given in submission order.
    ///
    /// Columns are the union of all keys in first-seen order, `candidate_name` first.
    /// Rows sort by numeric `total_score` descending; ties keep submission order and
    /// rows without a score go last. Nothing is filtered or normalized.
    pub fn from_records(records: Vec<CandidateRecord>) -> Result<Self, PipelineError> {
        let mut columns = vec![CANDIDATE_NAME.to_string()];
        let mut seen: HashSet<String> = columns.iter().cloned().collect();
        for record in &records {
            for key in record.keys() {
                if seen.insert(key.to_string()) {
                    columns.push(key.to_string());
                }
            }
        }

        let mut keyed = records
            .into_iter()
            .map(|record| Ok((record.total_score()?, record)))
            .collect::<Result<Vec<_>, PipelineError>>()?;

        // `sort_by` is stable, which keeps submission order among equal scores.
        keyed.sort_by(|(a, _), (b, _)| match (a, b) {
            (Some(a), Some(b)) => b.total_cmp(a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        Ok(Self {
            columns,
            rows: keyed.into_iter().map(|(_, record)| record).collect(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[CandidateRecord] {
        &self.rows
    }

    /// Serializes the table as UTF-8 CSV with a header row.
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;

        for row in &self.rows {
            writer.write_record(self.columns.iter().map(|c| render_cell(row.get(c))))?;
        }

        writer
            .into_inner()
            .map_err(|e| e.into_error())
            .context("Failed to flush CSV output")
    }
}

fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
