//! Exact table snapshots from observed column statistics.
//!
//! The profiler never reads data. Whoever scanned the data hands over one
//! [`ColumnStatistics`] per column and receives a snapshot whose facts are
//! all `Equal`, except where a cap forces them wider.

use crate::column::{Category, ColumnBuilder, ColumnType, NumericRange, ObjectRange, ObjectValue};
use crate::config::Settings;
use crate::error::{Result, ResultExt as _};
use crate::facts::{SetRelation, UncertainCount};
use crate::table::{TableBuilder, TableSnapshot};
use serde::{Deserialize, Serialize};

/// What a scan observed in one column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    /// Detected type; `None` if the scan could not tell
    pub column_type: Option<ColumnType>,
    /// Distinct non-missing values of a nominal column, in first-seen order
    #[serde(default)]
    pub distinct_values: Vec<String>,
    /// Smallest numeric value, if any value was present
    pub min: Option<f64>,
    /// Largest numeric value, if any value was present
    pub max: Option<f64>,
    pub object_min: Option<ObjectValue>,
    pub object_max: Option<ObjectValue>,
    /// Number of missing cells
    #[serde(default)]
    pub missing: u64,
}

impl ColumnStatistics {
    pub fn nominal<I, S>(values: I, missing: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column_type: Some(ColumnType::Nominal),
            distinct_values: values.into_iter().map(Into::into).collect(),
            missing,
            ..Self::default()
        }
    }

    pub fn numeric(column_type: ColumnType, min: f64, max: f64, missing: u64) -> Self {
        Self {
            column_type: Some(column_type),
            min: Some(min),
            max: Some(max),
            missing,
            ..Self::default()
        }
    }

    pub fn object(column_type: ColumnType, min: ObjectValue, max: ObjectValue, missing: u64) -> Self {
        Self {
            column_type: Some(column_type),
            object_min: Some(min),
            object_max: Some(max),
            missing,
            ..Self::default()
        }
    }

    /// A column whose every cell was missing.
    pub fn empty(column_type: ColumnType, rows: u64) -> Self {
        Self {
            column_type: Some(column_type),
            missing: rows,
            ..Self::default()
        }
    }

    /// Missing count as a fact; more missing cells than rows only bounds it by the rows.
    fn missing_values(&self, rows: u64) -> UncertainCount {
        if self.missing > rows {
            UncertainCount::at_most(rows)
        } else {
            UncertainCount::equal(self.missing)
        }
    }

    fn to_column(&self, rows: u64, settings: &Settings) -> Result<ColumnBuilder> {
        let Some(column_type) = self.column_type else {
            let mut builder = ColumnBuilder::unknown();
            builder.set_missing_values(self.missing_values(rows));
            return Ok(builder);
        };
        let mut builder = ColumnBuilder::new(column_type).with_settings(&**settings);
        builder.set_missing_values(self.missing_values(rows));
        match column_type.category() {
            Category::Nominal => {
                builder.set_dictionary_values(self.distinct_values.iter().cloned(), SetRelation::Equal);
            }
            Category::Numeric => {
                let range = match (self.min, self.max) {
                    (Some(min), Some(max)) => NumericRange::new(min, max),
                    _ => None,
                };
                builder.set_numeric_range(range, SetRelation::Equal);
            }
            Category::Object => {
                let range = match (&self.object_min, &self.object_max) {
                    (Some(min), Some(max)) => Some(ObjectRange::new(min.clone(), max.clone())?),
                    _ => None,
                };
                builder.set_object_range(range, SetRelation::Equal)?;
            }
        }
        Ok(builder)
    }
}

/// Builds the snapshot of a scanned table with `rows` rows.
///
/// Columns beyond the column cap are dropped and widen the column set to
/// `Superset`; dictionaries beyond the nominal cap widen their value set the
/// same way.
///
/// # Errors
///
/// Fails if a column's object bounds are not of its declared type, or the
/// lower bound exceeds the upper one.
pub fn snapshot_from_statistics<I, L>(rows: u64, columns: I, settings: &Settings) -> Result<TableSnapshot>
where
    I: IntoIterator<Item = (L, ColumnStatistics)>,
    L: Into<String>,
{
    let mut table = TableBuilder::new(UncertainCount::equal(rows)).with_settings(settings.clone());
    for (label, statistics) in columns {
        let label = label.into();
        if statistics.missing > rows {
            log::warn!(
                "Column '{label}' reports {} missing cells in {rows} rows; bounding by the row count",
                statistics.missing
            );
        }
        let column = statistics
            .to_column(rows, settings)
            .with_context(|| format!("Failed to profile column '{label}'"))?;
        table.add(label, column.build());
    }
    let table = table.build();
    log::debug!(
        "Profiled {} columns over {rows} rows ({})",
        table.column_count(),
        table.column_set_relation()
    );
    Ok(table)
}
