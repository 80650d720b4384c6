//! Named, index-aligned columns and row-oriented views.

use serde::Serialize;
use tracing::debug;

use reeltab_shared::{ReeltabError, Result, Value};

/// One named column of aligned values.
#[derive(Debug, Clone, Serialize)]
struct Column {
    name: String,
    values: Vec<Value>,
}

/// An ordered collection of equal-length named columns.
///
/// Row `i` across all columns denotes the same movie; the assembly check
/// makes violating that a construction error rather than a latent bug.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    /// Assemble a dataset from named columns, preserving their order.
    ///
    /// Fails with [`LengthMismatch`] when the columns disagree in length and
    /// with [`Validation`] on duplicate names.
    ///
    /// [`LengthMismatch`]: ReeltabError::LengthMismatch
    /// [`Validation`]: ReeltabError::Validation
    pub fn assemble(columns: Vec<(String, Vec<Value>)>) -> Result<Self> {
        if columns.is_empty() {
            return Err(ReeltabError::validation("cannot assemble an empty dataset"));
        }

        let expected = columns[0].1.len();
        for (name, values) in &columns {
            if values.len() != expected {
                return Err(ReeltabError::length_mismatch(format!(
                    "column '{name}' has {} records, column '{}' has {expected}",
                    values.len(),
                    columns[0].0,
                )));
            }
        }

        let mut seen: Vec<&str> = Vec::with_capacity(columns.len());
        for (name, _) in &columns {
            if seen.contains(&name.as_str()) {
                return Err(ReeltabError::validation(format!(
                    "duplicate column name '{name}'"
                )));
            }
            seen.push(name);
        }

        debug!(columns = columns.len(), records = expected, "dataset assembled");

        Ok(Self {
            columns: columns
                .into_iter()
                .map(|(name, values)| Column { name, values })
                .collect(),
        })
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// Whether the dataset holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column names in assembly order.
    pub fn field_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// The exact values of the named column, if it exists.
    pub fn field(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Drop record `index` (0-based) from every column in lockstep.
    pub fn remove_record(&mut self, index: usize) -> Result<()> {
        if index >= self.len() {
            return Err(ReeltabError::InvalidPosition {
                position: index,
                len: self.len(),
            });
        }

        for column in &mut self.columns {
            column.values.remove(index);
        }

        debug!(index, remaining = self.len(), "record removed");
        Ok(())
    }

    /// Iterate over row views in record order.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        (0..self.len()).map(move |row| Record { dataset: self, row })
    }
}

/// A borrowed view of one record (row) across all columns.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    dataset: &'a Dataset,
    row: usize,
}

impl<'a> Record<'a> {
    /// The record's 0-based index.
    pub fn index(&self) -> usize {
        self.row
    }

    /// The value of the named field for this record.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.dataset.field(name).map(|values| &values[self.row])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(ns: &[f64]) -> Vec<Value> {
        ns.iter().map(|n| Value::Number(*n)).collect()
    }

    fn texts(ts: &[&str]) -> Vec<Value> {
        ts.iter().map(|t| Value::Text((*t).to_string())).collect()
    }

    fn sample() -> Dataset {
        Dataset::assemble(vec![
            ("title".into(), texts(&["Harbor Lights", "Glass Meridian", "Last Ember"])),
            ("rating".into(), numbers(&[8.1, 7.4, 6.8])),
            (
                "metascore".into(),
                vec![Value::Number(76.0), Value::Missing, Value::Number(54.0)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn assemble_and_round_trip_fields() {
        let ds = sample();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.field_names(), vec!["title", "rating", "metascore"]);

        let ratings = ds.field("rating").expect("rating column");
        assert_eq!(ratings, numbers(&[8.1, 7.4, 6.8]).as_slice());

        let metascores = ds.field("metascore").expect("metascore column");
        assert!(metascores[1].is_missing());

        assert!(ds.field("gross").is_none());
    }

    #[test]
    fn assemble_rejects_unequal_lengths() {
        let err = Dataset::assemble(vec![
            ("title".into(), texts(&["a", "b", "c"])),
            ("rating".into(), numbers(&[8.1, 7.4])),
        ])
        .unwrap_err();

        assert!(matches!(err, ReeltabError::LengthMismatch { .. }));
        assert!(err.to_string().contains("rating"));
    }

    #[test]
    fn assemble_rejects_duplicate_names() {
        let err = Dataset::assemble(vec![
            ("title".into(), texts(&["a"])),
            ("title".into(), texts(&["b"])),
        ])
        .unwrap_err();

        assert!(matches!(err, ReeltabError::Validation { .. }));
    }

    #[test]
    fn assemble_rejects_no_columns() {
        let err = Dataset::assemble(vec![]).unwrap_err();
        assert!(matches!(err, ReeltabError::Validation { .. }));
    }

    #[test]
    fn remove_record_is_lockstep() {
        let mut ds = sample();
        ds.remove_record(1).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(
            ds.field("title").unwrap(),
            texts(&["Harbor Lights", "Last Ember"]).as_slice()
        );
        assert_eq!(ds.field("rating").unwrap(), numbers(&[8.1, 6.8]).as_slice());
        // The Missing cell went with its row.
        assert!(ds.field("metascore").unwrap().iter().all(|v| !v.is_missing()));
    }

    #[test]
    fn remove_record_out_of_range() {
        let mut ds = sample();
        let err = ds.remove_record(3).unwrap_err();
        assert!(matches!(
            err,
            ReeltabError::InvalidPosition { position: 3, len: 3 }
        ));
    }

    #[test]
    fn records_view_indexes_all_columns() {
        let ds = sample();
        let rows: Vec<_> = ds.records().collect();
        assert_eq!(rows.len(), 3);

        assert_eq!(
            rows[0].get("title"),
            Some(&Value::Text("Harbor Lights".into()))
        );
        assert_eq!(rows[2].get("rating"), Some(&Value::Number(6.8)));
        assert_eq!(rows[1].get("metascore"), Some(&Value::Missing));
        assert!(rows[1].get("gross").is_none());
        assert_eq!(rows[1].index(), 1);
    }
}
