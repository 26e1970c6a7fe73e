//! Reference district list.
//!
//! A `;`-delimited CSV with a header row and `id;name` columns.

use std::collections::BTreeMap;
use std::io::Read;

use climate_map_catastrophe_models::DistrictId;
use climate_map_geography_models::DistrictRecord;

use crate::MapError;

/// Bidirectional name/id lookup over the reference list.
#[derive(Debug, Clone, Default)]
pub struct DistrictDirectory {
    by_name: BTreeMap<String, DistrictId>,
    by_id: BTreeMap<DistrictId, String>,
}

impl DistrictDirectory {
    /// Builds a directory. Names are trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::DuplicateDistrict`] if a name or id repeats.
    pub fn new(records: impl IntoIterator<Item = DistrictRecord>) -> Result<Self, MapError> {
        let mut directory = Self::default();
        for record in records {
            directory.insert(record.id, record.name.trim().to_string())?;
        }
        Ok(directory)
    }

    /// Reads a reference list.
    ///
    /// # Errors
    ///
    /// Returns [`MapError`] on CSV errors, non-numeric ids and duplicates.
    pub fn read(reader: impl Read) -> Result<Self, MapError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .from_reader(reader);

        let mut records = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let row = result?;
            let raw_id = row.get(0).unwrap_or_default().trim();
            let id = raw_id
                .parse::<u32>()
                .map_err(|_| MapError::InvalidReference {
                    row: index + 1,
                    value: raw_id.to_string(),
                })?;
            records.push(DistrictRecord {
                id: DistrictId(id),
                name: row.get(1).unwrap_or_default().to_string(),
            });
        }

        let directory = Self::new(records)?;
        log::info!("Loaded {} reference districts", directory.len());
        Ok(directory)
    }

    /// Adds a district.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::DuplicateDistrict`] if the name or id is taken.
    pub fn insert(&mut self, id: DistrictId, name: String) -> Result<(), MapError> {
        if self.by_id.contains_key(&id) || self.by_name.contains_key(&name) {
            return Err(MapError::DuplicateDistrict { id, name });
        }
        self.by_name.insert(name.clone(), id);
        self.by_id.insert(id, name);
        Ok(())
    }

    /// Exact-match lookup of a trimmed name.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<DistrictId> {
        self.by_name.get(name.trim()).copied()
    }

    #[must_use]
    pub fn name_of(&self, id: DistrictId) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// Districts in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (DistrictId, &str)> {
        self.by_id.iter().map(|(id, name)| (*id, name.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_semicolon_list() {
        let csv = "id;nom\n101;Abitibi-Est\n125; Ungava \n";
        let directory = DistrictDirectory::read(csv.as_bytes()).unwrap();
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.id_of("Ungava"), Some(DistrictId(125)));
        assert_eq!(directory.id_of("  Abitibi-Est"), Some(DistrictId(101)));
        assert_eq!(directory.id_of("abitibi-est"), None);
        assert_eq!(directory.name_of(DistrictId(125)), Some("Ungava"));
    }

    #[test]
    fn rejects_duplicates() {
        let csv = "id;nom\n101;Abitibi-Est\n102;Abitibi-Est\n";
        assert!(matches!(
            DistrictDirectory::read(csv.as_bytes()),
            Err(MapError::DuplicateDistrict { .. })
        ));

        let csv = "id;nom\n101;Abitibi-Est\n101;Abitibi-Ouest\n";
        assert!(DistrictDirectory::read(csv.as_bytes()).is_err());
    }

    #[test]
    fn rejects_non_numeric_id() {
        let csv = "id;nom\nA1;Abitibi-Est\n";
        assert!(DistrictDirectory::read(csv.as_bytes()).is_err());
    }
}
