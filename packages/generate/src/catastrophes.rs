//! Catastrophe collection: every configured registry is read and
//! normalized, then each event is assigned its district.

use std::path::Path;

use climate_map_catastrophe_models::Event;
use climate_map_source::dialects::load_source;
use climate_map_source::vocabulary::Vocabulary;
use climate_map_source::{Classifier, Normalizer, SourceError};
use climate_map_source_models::SourceDefinition;
use climate_map_spatial::{DistrictIndex, assign_all};
use rayon::prelude::*;

use crate::{GenerateError, PipelineConfig, output, read_feature_collection};

/// Builds the classifier from the configured vocabulary, or the built-in
/// one.
///
/// # Errors
///
/// Returns [`GenerateError`] if the vocabulary file cannot be read or is
/// inconsistent.
pub fn load_classifier(config: &PipelineConfig) -> Result<Classifier, GenerateError> {
    let vocabulary = match &config.vocabulary {
        Some(path) => {
            let path = config.data_path(path);
            let text = std::fs::read_to_string(&path).map_err(|e| GenerateError::io(&path, e))?;
            log::info!("Using vocabulary from {}", path.display());
            Vocabulary::from_toml_str(&text)?
        }
        None => Vocabulary::builtin(),
    };
    Ok(Classifier::new(vocabulary)?)
}

/// Reads the district map written by the map step.
///
/// # Errors
///
/// Returns [`GenerateError`] if the map is missing or a feature has no
/// usable id.
pub fn load_district_index(output_dir: &Path) -> Result<DistrictIndex, GenerateError> {
    let path = output_dir.join(output::MAP_FILE);
    let index = DistrictIndex::from_feature_collection(&read_feature_collection(&path)?)?;
    log::info!("Loaded {} districts from {}", index.len(), path.display());
    Ok(index)
}

/// Reads and normalizes every source in parallel. Events keep the source
/// order, then the row order within each source.
///
/// # Errors
///
/// Returns [`SourceError`] for the first source that cannot be read.
pub fn normalize_sources(
    sources: &[SourceDefinition],
    data_dir: &Path,
    normalizer: Normalizer<'_>,
) -> Result<Vec<Event>, SourceError> {
    let per_source: Vec<Vec<Event>> = sources
        .par_iter()
        .map(|def| {
            let records = load_source(def, data_dir)?;
            let events = normalizer.normalize_all(&records);
            log::info!(
                "{} ({}): kept {} of {} records",
                def.id,
                def.dialect,
                events.len(),
                records.len()
            );
            Ok(events)
        })
        .collect::<Result<_, SourceError>>()?;

    Ok(per_source.into_iter().flatten().collect())
}

/// Normalizes every configured source and assigns districts from the
/// written map.
///
/// # Errors
///
/// Returns [`GenerateError`] if the vocabulary, a source or the district
/// map cannot be read.
pub fn collect_events(config: &PipelineConfig) -> Result<Vec<Event>, GenerateError> {
    let classifier = load_classifier(config)?;
    let normalizer = Normalizer::new(&classifier, config.min_year);
    let events = normalize_sources(&config.sources, &config.data_dir, normalizer)?;

    let index = load_district_index(&config.output_dir)?;
    let events = assign_all(events, &index);
    log::info!("Collected {} catastrophes", events.len());
    Ok(events)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use climate_map_catastrophe_models::{DistrictId, EventType, Severity};
    use climate_map_source_models::Dialect;

    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("climate_map_{name}_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const HEAT_WAVES: &str = "name,station_id,longitude,latitude,start_date,duration_days\n\
        Montréal,7025250,-73.5,45.5,2018-07-01,6\n\
        Montréal,7025250,-73.5,45.5,2018-08-01,3\n\
        ,7016294,-60.0,50.0,2019-07-01,5\n\
        Québec,7016294,-71.2,46.8,1985-07-01,9\n";

    const CURRENT: &str = "code_alea,alea,code_municipalite,municipalite,precision_localisation,\
        nom_cours_eau,severite,date_signalement,date_debut,date_fin,commentaire,source,coord_x,coord_y\n\
        8,Inondation,66023,Montréal,Imprécise,,Menace importante,2021-04-10,2021-04-09,,,,-73.6,45.6\n\
        8,Inondation,66023,Montréal,Précise,,Menace faible,2021-04-10,,,,,-73.6,45.6\n";

    const MAP: &str = r#"{"type":"FeatureCollection","features":[{"type":"Feature",
        "properties":{"id":101,"name":"Centre"},
        "geometry":{"type":"Polygon","coordinates":[[[-74,45],[-73,45],[-73,46],[-74,46],[-74,45]]]}}]}"#;

    #[test]
    fn collects_and_assigns_events() {
        let dir = temp_dir("collect");
        std::fs::write(dir.join("heat_waves.csv"), HEAT_WAVES).unwrap();
        std::fs::write(dir.join("current.csv"), CURRENT).unwrap();
        std::fs::write(dir.join(output::MAP_FILE), MAP).unwrap();

        let config = PipelineConfig {
            data_dir: dir.clone(),
            output_dir: dir.clone(),
            sources: vec![
                SourceDefinition {
                    id: "heat".to_string(),
                    dialect: Dialect::HeatWave,
                    path: PathBuf::from("heat_waves.csv"),
                },
                SourceDefinition {
                    id: "current".to_string(),
                    dialect: Dialect::Current,
                    path: PathBuf::from("current.csv"),
                },
            ],
            ..PipelineConfig::default()
        };

        let events = collect_events(&config).unwrap();
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["7025250_20180701", "7016294_20190701", "86602320210409"]);

        assert_eq!(events[0].event_type, EventType::HeatWave);
        assert_eq!(events[0].severity, Severity::Extreme);
        assert_eq!(events[0].district, DistrictId(101));
        assert_eq!(events[1].district, DistrictId::UNASSIGNED);
        assert_eq!(events[1].city, None);
        assert_eq!(events[2].event_type, EventType::Flood);
        assert!(events[2].loc_approx);
        assert_eq!(events[2].district, DistrictId(101));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_source_is_fatal() {
        let dir = temp_dir("missing_source");
        let sources = [SourceDefinition {
            id: "gone".to_string(),
            dialect: Dialect::Current,
            path: PathBuf::from("gone.csv"),
        }];
        let classifier = Classifier::new(Vocabulary::builtin()).unwrap();

        let err = normalize_sources(&sources, &dir, Normalizer::new(&classifier, 1990)).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }), "{err}");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
