//! Run-length extraction over chronologically sorted readings.
//!
//! The scan compares each item with its predecessor, starting from the
//! second item. An item extends the current run when it is contiguous
//! with its predecessor and qualifies on its own; anything else closes the
//! run. The first item therefore never opens a run, and neither does an
//! item right after a gap. Runs still open at the end are flushed.

use chrono::NaiveDate;

use crate::readings::DailyReading;

/// Daily maximum temperature, in °C, a heat-wave day must reach.
pub const HEAT_WAVE_MIN_TEMP: f64 = 30.0;

/// Minimum number of days in a heat wave.
pub const HEAT_WAVE_MIN_DAYS: usize = 3;

/// Largest gap between consecutive readings, in days, that keeps a run
/// going. Repeated dates (gap 0) also continue it.
const MAX_GAP_DAYS: i64 = 1;

/// A run of items, as indices into the scanned slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub start: usize,
    pub length: usize,
}

/// A heat wave detected in a station's readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatWaveRun {
    pub start: NaiveDate,
    pub length: u32,
}

/// Emits every maximal run of at least `min_length` items.
///
/// `is_contiguous(previous, current)` decides whether `current` may follow
/// `previous` in the same run and `is_qualifying(current)` whether it
/// belongs in a run at all.
pub fn extract_runs<T>(
    items: &[T],
    is_qualifying: impl Fn(&T) -> bool,
    is_contiguous: impl Fn(&T, &T) -> bool,
    min_length: usize,
) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut length = 0;

    for (i, pair) in items.windows(2).enumerate() {
        let (previous, current) = (&pair[0], &pair[1]);

        if is_contiguous(previous, current) && is_qualifying(current) {
            if length == 0 {
                start = i + 1;
            }
            length += 1;
        } else {
            if length >= min_length {
                runs.push(Run { start, length });
            }
            length = 0;
        }
    }

    if length >= min_length {
        runs.push(Run { start, length });
    }

    runs
}

/// Finds heat waves in readings sorted by date.
#[must_use]
pub fn heat_wave_runs(readings: &[DailyReading]) -> Vec<HeatWaveRun> {
    extract_runs(
        readings,
        |r| r.max_temp >= HEAT_WAVE_MIN_TEMP,
        |a, b| (b.date - a.date).num_days().abs() <= MAX_GAP_DAYS,
        HEAT_WAVE_MIN_DAYS,
    )
    .into_iter()
    .map(|run| HeatWaveRun {
        start: readings[run.start].date,
        length: u32::try_from(run.length).unwrap_or(u32::MAX),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings(start: NaiveDate, temps: &[f64]) -> Vec<DailyReading> {
        temps
            .iter()
            .zip(start.iter_days())
            .map(|(&max_temp, date)| DailyReading { date, max_temp })
            .collect()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 7, d).unwrap()
    }

    #[test]
    fn short_run_then_long_run() {
        let readings = readings(day(1), &[30.1, 31.0, 29.9, 30.5, 30.2, 30.6]);
        assert_eq!(
            heat_wave_runs(&readings),
            vec![HeatWaveRun {
                start: day(4),
                length: 3,
            }]
        );
    }

    #[test]
    fn first_reading_never_opens_a_run() {
        let readings = readings(day(1), &[32.0, 32.0, 32.0, 32.0]);
        assert_eq!(
            heat_wave_runs(&readings),
            vec![HeatWaveRun {
                start: day(2),
                length: 3,
            }]
        );
    }

    #[test]
    fn gap_breaks_run() {
        let mut readings = readings(day(1), &[25.0, 31.0, 31.0, 31.0]);
        readings.extend(self::readings(day(6), &[31.0, 31.0, 31.0, 31.0]));

        let runs = heat_wave_runs(&readings);
        assert_eq!(runs, vec![
            HeatWaveRun {
                start: day(2),
                length: 3,
            },
            HeatWaveRun {
                start: day(7),
                length: 3,
            },
        ]);
    }

    #[test]
    fn repeated_date_extends_run() {
        let readings = vec![
            DailyReading { date: day(1), max_temp: 20.0 },
            DailyReading { date: day(2), max_temp: 30.0 },
            DailyReading { date: day(2), max_temp: 30.5 },
            DailyReading { date: day(3), max_temp: 31.0 },
        ];
        assert_eq!(heat_wave_runs(&readings), vec![HeatWaveRun {
            start: day(2),
            length: 3,
        }]);
    }

    #[test]
    fn runs_hold_only_qualifying_contiguous_days() {
        let temps: Vec<f64> = (0..120)
            .map(|i| if (i / 5) % 3 == 0 { 28.0 } else { 30.0 + f64::from(i % 4) })
            .collect();
        let readings = readings(day(1), &temps);

        for run in extract_runs(
            &readings,
            |r| r.max_temp >= HEAT_WAVE_MIN_TEMP,
            |a, b| (b.date - a.date).num_days() <= MAX_GAP_DAYS,
            HEAT_WAVE_MIN_DAYS,
        ) {
            assert!(run.length >= HEAT_WAVE_MIN_DAYS);
            let slice = &readings[run.start..run.start + run.length];
            assert!(slice.iter().all(|r| r.max_temp >= HEAT_WAVE_MIN_TEMP));
            for pair in slice.windows(2) {
                assert_eq!((pair[1].date - pair[0].date).num_days(), 1);
            }
        }
    }

    #[test]
    fn empty_and_single_inputs() {
        assert!(heat_wave_runs(&[]).is_empty());
        assert!(heat_wave_runs(&readings(day(1), &[35.0])).is_empty());
    }
}
