//! Per-region climate statistics.
//!
//! Each metric comes as its own table: the header row lists years, each
//! following row is one region, labelled by a name that starts with the
//! region number (`"12 - Montérégie"`). Empty cells mean no value.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::ClimateError;

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)").expect("valid regex"));

/// Region id -> metric name -> value.
pub type RegionValues = BTreeMap<u32, BTreeMap<String, f64>>;

/// Climate statistics: year -> region id -> metric name -> value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionStatistics {
    years: BTreeMap<i32, RegionValues>,
}

impl RegionStatistics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one value.
    pub fn insert(&mut self, year: i32, region: u32, metric: &str, value: f64) {
        self.years
            .entry(year)
            .or_default()
            .entry(region)
            .or_default()
            .insert(metric.to_string(), value);
    }

    /// Years with at least one value, ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    #[must_use]
    pub fn for_year(&self, year: i32) -> Option<&RegionValues> {
        self.years.get(&year)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Reads one metric table into these statistics.
    ///
    /// Header cells and row labels without a leading number are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateError`] on CSV errors or a non-empty cell that is
    /// not a number.
    pub fn read_metric(
        &mut self,
        metric: &str,
        reader: impl Read,
        label: &str,
    ) -> Result<(), ClimateError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let years: Vec<Option<i32>> = reader
            .headers()?
            .iter()
            .skip(1)
            .map(|cell| leading_number(cell).and_then(|n| i32::try_from(n).ok()))
            .collect();

        for (i, result) in reader.records().enumerate() {
            let row = result?;
            let Some(region) = row.get(0).and_then(leading_number) else {
                continue;
            };

            for (cell, year) in row.iter().skip(1).zip(&years) {
                let (Some(year), cell) = (year, cell.trim()) else {
                    continue;
                };
                if cell.is_empty() {
                    continue;
                }
                let value = cell
                    .replace(',', ".")
                    .parse::<f64>()
                    .map_err(|_| ClimateError::Malformed {
                        source_name: label.to_string(),
                        row: i + 1,
                        message: format!("invalid {metric} value {cell:?}"),
                    })?;
                self.insert(*year, region, metric, value);
            }
        }

        Ok(())
    }

    /// Loads every metric table, resolving relative paths against
    /// `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateError`] if a table is missing or malformed.
    pub fn load(
        data_dir: &Path,
        tables: &BTreeMap<String, std::path::PathBuf>,
    ) -> Result<Self, ClimateError> {
        let mut statistics = Self::new();
        for (metric, file) in tables {
            let path = data_dir.join(file);
            let reader = File::open(&path).map_err(|e| ClimateError::io(&path, e))?;
            statistics.read_metric(metric, BufReader::new(reader), &path.display().to_string())?;
            log::debug!("Loaded {metric} from {}", path.display());
        }
        log::info!(
            "Loaded {} climate metrics over {} years",
            tables.len(),
            statistics.years.len()
        );
        Ok(statistics)
    }
}

fn leading_number(cell: &str) -> Option<u32> {
    LEADING_NUMBER
        .captures(cell)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
