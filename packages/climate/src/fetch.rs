//! Daily station readings download.
//!
//! Readings are published as one CSV per station and month. A station's
//! months are concatenated, header rows stripped, into `<climate_id>.csv`.
//! The file is written as `<climate_id>.csv.part` and renamed once every
//! month has been fetched, so an existing `.csv` is always complete and is
//! not fetched again. An interrupted `.part` file resumes from its last
//! month, which is fetched again in case it was cut short.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use climate_map_source::progress::ProgressCallback;
use futures::stream::{self, StreamExt as _, TryStreamExt as _};
use tokio::io::AsyncWriteExt as _;

use crate::retry;
use crate::stations::Station;

/// Monthly daily-data file published by Environment and Climate Change
/// Canada.
pub const DEFAULT_URL_TEMPLATE: &str = "https://dd.weather.gc.ca/climate/observations/daily/csv/QC/climate_daily_QC_{station}_{year}-{month}_P1D.csv";

const USER_AGENT: &str = "Mozilla/5.0 (compatible; climate-map/0.1)";

/// Errors that can occur while downloading station readings.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an unexpected status.
    #[error("HTTP {status} for {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// A local file could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Download settings.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// URL with `{station}`, `{year}` and `{month}` (two digits)
    /// placeholders.
    pub url_template: String,
    /// Stations downloaded at the same time.
    pub concurrency: usize,
    /// Retries per month on transient failures.
    pub max_retries: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            concurrency: 8,
            max_retries: retry::MAX_RETRIES,
        }
    }
}

/// How a monthly response is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthResponse {
    /// The body is appended to the station file.
    Append,
    /// No file was published for this month.
    Missing,
    /// The download fails.
    Failed,
}

impl MonthResponse {
    #[must_use]
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        if status == reqwest::StatusCode::NOT_FOUND {
            Self::Missing
        } else if status.is_success() {
            Self::Append
        } else {
            Self::Failed
        }
    }
}

/// Outcome of one station download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationFetch {
    /// The complete file already existed.
    Skipped,
    /// Months were downloaded; `missing` months had no published file.
    Downloaded { months: usize, missing: usize },
}

/// Totals over a whole download.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub missing_months: usize,
}

/// Downloads every station's readings into `climate_dir`.
///
/// # Errors
///
/// Returns [`FetchError`] on the first station that fails. Files already
/// completed stay in place.
pub async fn fetch_all(
    stations: &[Station],
    climate_dir: &Path,
    options: &FetchOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<FetchSummary, FetchError> {
    tokio::fs::create_dir_all(climate_dir)
        .await
        .map_err(|e| io_error(climate_dir, e))?;

    let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

    progress.set_total(stations.len() as u64);
    progress.set_message(format!("Downloading {} stations", stations.len()));
    log::info!(
        "Downloading readings for {} stations (concurrency={})...",
        stations.len(),
        options.concurrency
    );

    let outcomes: Vec<StationFetch> = stream::iter(stations.iter().map(|station| {
        let client = &client;
        async move {
            let outcome = fetch_station(client, options, station, climate_dir).await;
            progress.inc(1);
            outcome
        }
    }))
    .buffer_unordered(options.concurrency.max(1))
    .try_collect()
    .await?;

    let mut summary = FetchSummary::default();
    for outcome in outcomes {
        match outcome {
            StationFetch::Skipped => summary.skipped += 1,
            StationFetch::Downloaded { missing, .. } => {
                summary.downloaded += 1;
                summary.missing_months += missing;
            }
        }
    }

    progress.finish(format!(
        "{} stations downloaded, {} already present",
        summary.downloaded, summary.skipped
    ));
    log::info!(
        "Download complete: {} stations, {} skipped, {} months without data",
        summary.downloaded,
        summary.skipped,
        summary.missing_months
    );
    Ok(summary)
}

/// Downloads one station's readings.
///
/// # Errors
///
/// Returns [`FetchError`] on HTTP failures other than 404 and on file
/// errors.
#[allow(clippy::future_not_send)]
pub async fn fetch_station(
    client: &reqwest::Client,
    options: &FetchOptions,
    station: &Station,
    climate_dir: &Path,
) -> Result<StationFetch, FetchError> {
    let final_path = climate_dir.join(format!("{}.csv", station.climate_id));
    if tokio::fs::try_exists(&final_path)
        .await
        .map_err(|e| io_error(&final_path, e))?
    {
        log::debug!("Station {} already downloaded", station.climate_id);
        return Ok(StationFetch::Skipped);
    }

    let part_path = climate_dir.join(format!("{}.csv.part", station.climate_id));
    let resume_from = match tokio::fs::read_to_string(&part_path).await {
        Ok(existing) => {
            let (kept, resume_from) = prepare_resume(&existing);
            tokio::fs::write(&part_path, kept)
                .await
                .map_err(|e| io_error(&part_path, e))?;
            if let Some((year, month)) = resume_from {
                log::info!(
                    "Resuming station {} at {year}-{month:02}",
                    station.climate_id
                );
            }
            resume_from
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(io_error(&part_path, e)),
    };

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&part_path)
        .await
        .map_err(|e| io_error(&part_path, e))?;

    let months = months(station.first_year, station.last_year, resume_from);
    let mut missing = 0;
    for &(year, month) in &months {
        let url = month_url(&options.url_template, &station.climate_id, year, month);
        let response = retry::send(|| client.get(&url), options.max_retries).await?;

        let status = response.status();
        match MonthResponse::from_status(status) {
            MonthResponse::Append => {}
            MonthResponse::Missing => {
                missing += 1;
                continue;
            }
            MonthResponse::Failed => {
                return Err(FetchError::Status {
                    url,
                    status: status.as_u16(),
                });
            }
        }

        let body = decode_latin1(&response.bytes().await?);
        file.write_all(strip_header(&body).as_bytes())
            .await
            .map_err(|e| io_error(&part_path, e))?;
    }

    file.flush().await.map_err(|e| io_error(&part_path, e))?;
    drop(file);
    tokio::fs::rename(&part_path, &final_path)
        .await
        .map_err(|e| io_error(&final_path, e))?;

    log::debug!(
        "Station {}: {} months, {missing} without data",
        station.climate_id,
        months.len()
    );
    Ok(StationFetch::Downloaded {
        months: months.len(),
        missing,
    })
}

/// Fills the URL template.
#[must_use]
pub fn month_url(template: &str, climate_id: &str, year: i32, month: u32) -> String {
    template
        .replace("{station}", climate_id)
        .replace("{year}", &year.to_string())
        .replace("{month}", &format!("{month:02}"))
}

/// Every `(year, month)` from January of `first_year` to December of
/// `last_year`, starting at `resume_from` when given.
#[must_use]
pub fn months(first_year: i32, last_year: i32, resume_from: Option<(i32, u32)>) -> Vec<(i32, u32)> {
    (first_year..=last_year)
        .flat_map(|year| (1..=12).map(move |month| (year, month)))
        .filter(|&ym| resume_from.is_none_or(|from| ym >= from))
        .collect()
}

/// The published files are Latin-1 encoded.
#[must_use]
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

/// Drops the first line.
#[must_use]
pub fn strip_header(text: &str) -> &str {
    text.find('\n').map_or("", |i| &text[i + 1..])
}

/// Splits a partial download into the lines to keep and the month to
/// resume from. The last month present and any incomplete trailing line
/// are dropped.
#[must_use]
pub fn prepare_resume(existing: &str) -> (String, Option<(i32, u32)>) {
    let lines: Vec<(&str, Option<(i32, u32)>)> = existing
        .split_inclusive('\n')
        .filter(|line| line.ends_with('\n'))
        .map(|line| (line, line_month(line)))
        .collect();

    let Some(last) = lines.iter().filter_map(|(_, ym)| *ym).max() else {
        return (String::new(), None);
    };

    let kept = lines
        .iter()
        .filter(|(_, ym)| ym.is_some_and(|ym| ym < last))
        .map(|(line, _)| *line)
        .collect();
    (kept, Some(last))
}

fn line_month(line: &str) -> Option<(i32, u32)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    let record = reader.records().next()?.ok()?;
    let year = record.get(5)?.trim().parse().ok()?;
    let month = record.get(6)?.trim().parse().ok()?;
    Some((year, month))
}

fn io_error(path: &Path, source: std::io::Error) -> FetchError {
    FetchError::Io {
        path: path.to_path_buf(),
        source,
    }
}
