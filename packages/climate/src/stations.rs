//! Weather station catalogue.
//!
//! The station list is the national inventory (16 columns). Stations are
//! kept when they are in the configured province and report daily data up
//! to at least the first year of interest. Each kept station is labelled
//! with the first municipality whose folded name prefixes the station name.

use std::io::Read;

use climate_map_catastrophe_models::LngLat;
use serde::Deserialize;
use unicode_normalization::UnicodeNormalization as _;

use crate::ClimateError;

/// A station with daily readings in the years of interest.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// Climate identifier, used in download URLs and file names.
    pub climate_id: String,
    /// Matched municipality, empty when none matched.
    pub name: String,
    pub location: LngLat,
    /// First year to fetch.
    pub first_year: i32,
    /// Last year with daily data.
    pub last_year: i32,
}

/// Which stations to keep.
#[derive(Debug, Clone)]
pub struct StationFilter {
    /// Province name as spelled in the inventory (`"QUEBEC"`).
    pub province: String,
    /// First year of interest.
    pub min_year: i32,
}

/// Inventory row, deserialized by position.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct StationRow {
    name: String,
    province: String,
    latitude: String,
    longitude: String,
    elevation: String,
    climate_id: String,
    wmo_id: String,
    tc_id: String,
    first_year: String,
    last_year: String,
    hly_first_year: String,
    hly_last_year: String,
    dly_first_year: String,
    dly_last_year: String,
    mly_first_year: String,
    mly_last_year: String,
}

/// Municipality display names keyed by their folded form, in file order.
#[derive(Debug, Clone, Default)]
pub struct Municipalities {
    names: Vec<(String, String)>,
}

impl Municipalities {
    /// Reads the municipality list (header row, name in the second column).
    ///
    /// # Errors
    ///
    /// Returns [`ClimateError::Csv`] on CSV errors.
    pub fn read(reader: impl Read) -> Result<Self, ClimateError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut names = Vec::new();
        for result in reader.records() {
            let row = result?;
            if let Some(name) = row.get(1) {
                names.push(name.to_string());
            }
        }
        Ok(Self::new(names))
    }

    /// Builds the lookup. Names with no Latin letter are ignored: their
    /// folded form is empty and would prefix everything.
    #[must_use]
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            names: names
                .into_iter()
                .map(|name| (fold(&name), name))
                .filter(|(folded, _)| !folded.is_empty())
                .collect(),
        }
    }

    /// First municipality whose folded name prefixes the lowercased
    /// station name.
    #[must_use]
    pub fn match_station(&self, station_name: &str) -> Option<&str> {
        let station_name = station_name.to_lowercase();
        self.names
            .iter()
            .find(|(folded, _)| station_name.starts_with(folded.as_str()))
            .map(|(_, name)| name.as_str())
    }
}

/// Strips accents (NFKD) and keeps only ASCII letters, lowercased.
/// `"Saint-Jérôme"` folds to `"saintjerome"`.
#[must_use]
pub fn fold(name: &str) -> String {
    name.nfkd()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Reads the station inventory and keeps the stations matching `filter`.
///
/// # Errors
///
/// Returns [`ClimateError`] on CSV errors or unparseable coordinates and
/// years in a kept row.
pub fn read_station_list(
    reader: impl Read,
    filter: &StationFilter,
    municipalities: &Municipalities,
) -> Result<Vec<Station>, ClimateError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let mut stations = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row: StationRow = result?.deserialize(None)?;
        if row.province != filter.province {
            continue;
        }
        let (first, last) = (row.dly_first_year.trim(), row.dly_last_year.trim());
        if first.is_empty() || last.is_empty() {
            continue;
        }

        let malformed = |message: String| ClimateError::Malformed {
            source_name: "station list".to_string(),
            row: i + 1,
            message,
        };
        let parse_year = |s: &str| {
            s.parse::<i32>()
                .map_err(|_| malformed(format!("invalid year {s:?}")))
        };
        let parse_coord = |s: &str| {
            s.trim()
                .parse::<f64>()
                .map_err(|_| malformed(format!("invalid coordinate {s:?}")))
        };

        let last_year = parse_year(last)?;
        if last_year < filter.min_year {
            continue;
        }

        stations.push(Station {
            name: municipalities
                .match_station(&row.name)
                .unwrap_or_default()
                .to_string(),
            location: LngLat::new(parse_coord(&row.longitude)?, parse_coord(&row.latitude)?),
            first_year: parse_year(first)?.max(filter.min_year),
            last_year,
            climate_id: row.climate_id.trim().to_string(),
        });
    }

    log::info!(
        "Kept {} stations in {} with daily data since {}",
        stations.len(),
        filter.province,
        filter.min_year
    );
    Ok(stations)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Name,Province,Latitude,Longitude,Elevation,Climate ID,WMO ID,TC ID,\
        First Year,Last Year,HLY First Year,HLY Last Year,DLY First Year,DLY Last Year,\
        MLY First Year,MLY Last Year\n";

    fn municipalities() -> Municipalities {
        Municipalities::new(
            ["Montréal", "Mont-Laurier", "Québec", "Île-d'Orléans"]
                .into_iter()
                .map(String::from),
        )
    }

    #[test]
    fn folds_accents() {
        assert_eq!(fold("Saint-Jérôme"), "saintjerome");
        assert_eq!(fold("Île-d'Orléans"), "iledorleans");
        assert_eq!(fold("Lac-Mégantic"), "lacmegantic");
        assert_eq!(fold("Ōtsuki"), "otsuki");
        assert_eq!(fold("ﬁnlay"), "finlay");
    }

    #[test]
    fn matches_station_names() {
        let municipalities = municipalities();
        assert_eq!(municipalities.match_station("MONTREAL INTL A"), Some("Montréal"));
        assert_eq!(municipalities.match_station("QUEBEC/JEAN LESAGE"), Some("Québec"));
        assert_eq!(municipalities.match_station("CHIBOUGAMAU"), None);
    }

    #[test]
    fn filters_station_list() {
        let csv = format!(
            "{HEADER}\
             MONTREAL INTL A,QUEBEC,45.47,-73.74,36,7025250,71627,YUL,1941,2013,1953,2013,1941,2013,1941,2013\n\
             QUEBEC/JEAN LESAGE,QUEBEC,46.79,-71.38,74,7016294,71714,YQB,1943,2024,1953,2024,1943,2024,1943,2017\n\
             OLD STATION,QUEBEC,46.0,-72.0,10,7000001,,,1900,1985,,,1900,1985,1900,1985\n\
             NO DAILY,QUEBEC,46.0,-72.0,10,7000002,,,1900,2020,1990,2020,,,,\n\
             TORONTO CITY,ONTARIO,43.67,-79.4,113,6158355,71508,XTO,1840,2024,,,1840,2024,1840,2006\n"
        );

        let filter = StationFilter {
            province: "QUEBEC".to_string(),
            min_year: 1990,
        };
        let stations = read_station_list(csv.as_bytes(), &filter, &municipalities()).unwrap();
        assert_eq!(stations.len(), 2);

        assert_eq!(stations[0].climate_id, "7025250");
        assert_eq!(stations[0].name, "Montréal");
        assert_eq!(stations[0].first_year, 1990);
        assert_eq!(stations[0].last_year, 2013);
        assert_eq!(stations[0].location, LngLat::new(-73.74, 45.47));

        assert_eq!(stations[1].name, "Québec");
        assert_eq!(stations[1].last_year, 2024);
    }
}
