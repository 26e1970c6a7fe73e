//! District map assembly from boundary features.

use std::collections::BTreeMap;

use climate_map_catastrophe_models::DistrictId;
use climate_map_geography_models::SplitRule;
use climate_map_spatial::DistrictShape;
use geojson::{Feature, FeatureCollection, JsonObject};

use crate::split::split_north;
use crate::{DistrictDirectory, MapError};

/// One district of the map.
#[derive(Debug, Clone, PartialEq)]
pub struct District {
    pub name: String,
    pub shape: DistrictShape,
}

/// Every district keyed by id, in ascending id order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistrictMap {
    districts: BTreeMap<DistrictId, District>,
}

impl DistrictMap {
    #[must_use]
    pub fn from_districts(districts: impl IntoIterator<Item = (DistrictId, District)>) -> Self {
        Self {
            districts: districts.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn get(&self, id: DistrictId) -> Option<&District> {
        self.districts.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DistrictId, &District)> {
        self.districts.iter().map(|(id, d)| (*id, d))
    }

    /// Owned shapes, for building a spatial index.
    pub fn shapes(&self) -> impl Iterator<Item = (DistrictId, DistrictShape)> + '_ {
        self.districts.iter().map(|(id, d)| (*id, d.shape.clone()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.districts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }

    /// One feature per district with `id` and `name` properties.
    #[must_use]
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let features = self
            .districts
            .iter()
            .map(|(id, district)| {
                let mut properties = JsonObject::new();
                properties.insert("id".to_string(), serde_json::Value::from(id.0));
                properties.insert(
                    "name".to_string(),
                    serde_json::Value::from(district.name.clone()),
                );
                Feature {
                    bbox: None,
                    geometry: Some(geojson::Geometry::new(geojson::Value::from(
                        &district.shape.to_geometry(),
                    ))),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    /// Divides a district, giving the northern part a new id and name.
    fn apply_split(
        &mut self,
        directory: &DistrictDirectory,
        rule: &SplitRule,
    ) -> Result<(), MapError> {
        let target = directory
            .id_of(&rule.district)
            .ok_or_else(|| MapError::UnknownDistrict {
                name: rule.district.trim().to_string(),
            })?;
        if self.districts.contains_key(&rule.new_id) {
            return Err(MapError::DuplicateDistrict {
                id: rule.new_id,
                name: rule.new_name.clone(),
            });
        }
        let district = self
            .districts
            .get_mut(&target)
            .ok_or_else(|| MapError::MissingDistrict {
                id: target,
                name: rule.district.clone(),
            })?;

        let (north, south) = split_north(&rule.district, &district.shape.to_multi_polygon(), &rule.cut)?;
        let invalid = |message: &str| MapError::InvalidSplit {
            district: rule.district.clone(),
            message: message.to_string(),
        };
        let north = DistrictShape::from_geometry(north.into())
            .ok_or_else(|| invalid("nothing lies north of the cut"))?;
        let south = DistrictShape::from_geometry(south.into())
            .ok_or_else(|| invalid("nothing lies south of the cut"))?;

        district.shape = south;
        self.districts.insert(
            rule.new_id,
            District {
                name: rule.new_name.trim().to_string(),
                shape: north,
            },
        );

        log::info!(
            "Split {} ({target}) and created {} ({})",
            rule.district,
            rule.new_name,
            rule.new_id
        );
        Ok(())
    }
}

/// Builds the district map from boundary features.
///
/// Each feature's trimmed `name` property is resolved against the
/// reference list. Features sharing a name merge into one multi-piece
/// district. Split rules are applied in order afterwards.
///
/// # Errors
///
/// Returns [`MapError::UnknownDistrict`] for a name missing from the
/// reference list, [`MapError::MissingDistrict`] for a reference district
/// without any feature, and [`MapError`] for unusable features or splits.
pub fn build_district_map(
    features: &FeatureCollection,
    directory: &DistrictDirectory,
    splits: &[SplitRule],
) -> Result<DistrictMap, MapError> {
    let mut pieces: BTreeMap<DistrictId, Vec<DistrictShape>> = BTreeMap::new();

    for (index, feature) in features.features.iter().enumerate() {
        let invalid = |message: &str| MapError::InvalidFeature {
            index,
            message: message.to_string(),
        };

        let name = feature
            .property("name")
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .ok_or_else(|| invalid("missing \"name\" property"))?;
        let id = directory
            .id_of(name)
            .ok_or_else(|| MapError::UnknownDistrict {
                name: name.to_string(),
            })?;

        let geometry = feature
            .geometry
            .clone()
            .ok_or_else(|| invalid("missing geometry"))?;
        let shape = DistrictShape::from_geometry(geometry.try_into()?)
            .ok_or_else(|| invalid("geometry has no polygon area"))?;

        pieces.entry(id).or_default().push(shape);
    }

    // Districts created by a split have no boundary feature of their own.
    let split_ids: Vec<DistrictId> = splits.iter().map(|rule| rule.new_id).collect();
    if let Some((id, name)) = directory
        .iter()
        .find(|(id, _)| !pieces.contains_key(id) && !split_ids.contains(id))
    {
        return Err(MapError::MissingDistrict {
            id,
            name: name.to_string(),
        });
    }
    for rule in splits {
        if let Some(name) = directory.name_of(rule.new_id)
            && name != rule.new_name.trim()
        {
            return Err(MapError::DuplicateDistrict {
                id: rule.new_id,
                name: name.to_string(),
            });
        }
    }

    let mut map = DistrictMap::from_districts(pieces.into_iter().filter_map(|(id, pieces)| {
        let name = directory.name_of(id)?.to_string();
        let shape = DistrictShape::collection(pieces)?;
        Some((id, District { name, shape }))
    }));

    for rule in splits {
        map.apply_split(directory, rule)?;
    }

    log::info!("Built district map with {} districts", map.len());
    Ok(map)
}
