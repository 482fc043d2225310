use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::AreaKey;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("area name cannot be empty")]
    EmptyName,

    #[error("area {name:?} has no backing file")]
    MissingFile { name: String },

    #[error("short name {key} is used by more than one area")]
    DuplicateShortName { key: AreaKey },
}

/// How the questions of an area are answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuizType {
    #[serde(rename = "True False")]
    TrueFalse,
    #[serde(rename = "Multiple Choice")]
    MultipleChoice,
}

impl QuizType {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            QuizType::TrueFalse => "True False",
            QuizType::MultipleChoice => "Multiple Choice",
        }
    }
}

/// Area entry as it appears in the catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRecord {
    pub area: String,
    pub file: String,
    #[serde(rename = "type")]
    pub quiz_type: QuizType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
}

/// A selectable study area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    name: String,
    file: String,
    quiz_type: QuizType,
    key: AreaKey,
}

impl Area {
    /// Builds an area, deriving the key from the file stem when no short name is given.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyName` or `CatalogError::MissingFile` for blank fields.
    pub fn from_record(record: AreaRecord) -> Result<Self, CatalogError> {
        if record.area.trim().is_empty() {
            return Err(CatalogError::EmptyName);
        }
        if record.file.trim().is_empty() {
            return Err(CatalogError::MissingFile { name: record.area });
        }
        let key = match record.short_name {
            Some(short) if !short.trim().is_empty() => AreaKey::new(short.trim()),
            _ => AreaKey::from_file(&record.file),
        };
        Ok(Self {
            name: record.area,
            file: record.file,
            quiz_type: record.quiz_type,
            key,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    #[must_use]
    pub fn quiz_type(&self) -> QuizType {
        self.quiz_type
    }

    #[must_use]
    pub fn key(&self) -> &AreaKey {
        &self.key
    }
}

/// Ordered list of areas with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    areas: Vec<Area>,
}

impl Catalog {
    /// # Errors
    ///
    /// Returns `CatalogError` if a record is invalid or two areas share a key.
    pub fn from_records(records: Vec<AreaRecord>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        let mut areas = Vec::with_capacity(records.len());
        for record in records {
            let area = Area::from_record(record)?;
            if !seen.insert(area.key().clone()) {
                return Err(CatalogError::DuplicateShortName {
                    key: area.key().clone(),
                });
            }
            areas.push(area);
        }
        Ok(Self { areas })
    }

    #[must_use]
    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    #[must_use]
    pub fn get(&self, key: &AreaKey) -> Option<&Area> {
        self.areas.iter().find(|a| a.key() == key)
    }

    /// Area at a 1-based display position (the digit shortcut).
    #[must_use]
    pub fn by_position(&self, position: usize) -> Option<&Area> {
        position.checked_sub(1).and_then(|i| self.areas.get(i))
    }

    #[must_use]
    pub fn first(&self) -> Option<&Area> {
        self.areas.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, file: &str, short: Option<&str>) -> AreaRecord {
        AreaRecord {
            area: name.into(),
            file: file.into(),
            quiz_type: QuizType::TrueFalse,
            short_name: short.map(Into::into),
        }
    }

    #[test]
    fn parses_catalog_json() {
        let raw = r#"[
            {"area":"Lógica I","file":"questions.json","type":"True False","shortName":"log1"},
            {"area":"IPC","file":"ipc.json","type":"Multiple Choice"}
        ]"#;
        let records: Vec<AreaRecord> = serde_json::from_str(raw).unwrap();
        let catalog = Catalog::from_records(records).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.by_position(1).unwrap().key().as_str(), "log1");
        assert_eq!(catalog.by_position(2).unwrap().key().as_str(), "ipc");
        assert_eq!(
            catalog.by_position(2).unwrap().quiz_type(),
            QuizType::MultipleChoice
        );
        assert!(catalog.by_position(0).is_none());
        assert!(catalog.by_position(3).is_none());
    }

    #[test]
    fn duplicate_short_names_rejected() {
        let err = Catalog::from_records(vec![
            record("A", "a.json", Some("same")),
            record("B", "b.json", Some("same")),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicateShortName {
                key: AreaKey::new("same")
            }
        );
    }

    #[test]
    fn derived_key_collides_with_explicit_one() {
        let err = Catalog::from_records(vec![
            record("A", "logic.json", None),
            record("B", "other.json", Some("logic")),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateShortName { .. }));
    }

    #[test]
    fn blank_name_rejected() {
        let err = Area::from_record(record(" ", "a.json", None)).unwrap_err();
        assert_eq!(err, CatalogError::EmptyName);
    }
}
