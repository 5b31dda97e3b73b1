use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::cmp::Ordering;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::domain::{CTError, CollegeField, SortDirection};

const BUNDLED_DATASET: &str = include_str!("../data/colleges.json");

/// A single row of the dataset.
///
/// Nothing is validated: a field that is missing or has the wrong type is
/// kept as `None` and rendered as an empty cell.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct College {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub collegedunia_rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub fees: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub user_review_rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub ranking: Option<f64>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub featured: Option<bool>,
}

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.and_then(|v| v.as_str().map(str::to_string)))
}

fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.and_then(|v| v.as_f64()))
}

fn lenient_flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.and_then(|v| v.as_bool()))
}

/// Borrowed value of one field, used for comparing and rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
    Flag(bool),
    Missing,
}

impl College {
    #[cfg(test)]
    pub fn named(name: &str) -> Self {
        College {
            name: Some(name.to_string()),
            ..College::default()
        }
    }

    pub fn value(&self, field: CollegeField) -> FieldValue<'_> {
        let number = |n: Option<f64>| n.map_or(FieldValue::Missing, FieldValue::Number);
        match field {
            CollegeField::Name => self
                .name
                .as_deref()
                .map_or(FieldValue::Missing, FieldValue::Text),
            CollegeField::CollegeduniaRating => number(self.collegedunia_rating),
            CollegeField::Fees => number(self.fees),
            CollegeField::UserReviewRating => number(self.user_review_rating),
            CollegeField::Ranking => number(self.ranking),
            CollegeField::Featured => self
                .featured
                .map_or(FieldValue::Missing, FieldValue::Flag),
        }
    }

    pub fn is_featured(&self) -> bool {
        self.featured.unwrap_or(false)
    }

    /// Text shown in the table cell of `field`
    pub fn cell(&self, field: CollegeField) -> String {
        match self.value(field) {
            FieldValue::Text(s) => s.to_string(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Flag(true) => "Yes".to_string(),
            FieldValue::Flag(false) => "No".to_string(),
            FieldValue::Missing if field == CollegeField::Featured => "No".to_string(),
            FieldValue::Missing => String::new(),
        }
    }
}

/// Three way comparison of two field values.
///
/// Missing values are placed after all present values, independent of the direction.
pub fn compare_values(a: FieldValue, b: FieldValue, direction: SortDirection) -> Ordering {
    let ordering = match (a, b) {
        (FieldValue::Missing, FieldValue::Missing) => return Ordering::Equal,
        (FieldValue::Missing, _) => return Ordering::Greater,
        (_, FieldValue::Missing) => return Ordering::Less,
        (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
        (FieldValue::Number(a), FieldValue::Number(b)) => a.total_cmp(&b),
        (FieldValue::Flag(a), FieldValue::Flag(b)) => a.cmp(&b),
        // A field always yields the same kind of value
        _ => Ordering::Equal,
    };
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// The immutable source collection of the table.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    name: String,
    records: Arc<Vec<College>>,
}

impl Dataset {
    pub fn from_records(name: &str, records: Vec<College>) -> Self {
        Dataset {
            name: name.to_string(),
            records: Arc::new(records),
        }
    }

    /// Dataset compiled into the binary. Never fails, a broken dataset is empty.
    pub fn bundled() -> Self {
        match Self::parse(BUNDLED_DATASET) {
            Ok(records) => Self::from_records("colleges", records),
            Err(e) => {
                error!("Bundled dataset is broken: {e:?}");
                Self::from_records("colleges", Vec::new())
            }
        }
    }

    pub fn load(path: PathBuf) -> Result<Self, CTError> {
        let start_time = Instant::now();
        let path = Self::check_file(path)?;
        let content = fs::read_to_string(&path)?;
        let records = match Self::parse(&content) {
            Ok(records) => records,
            Err(CTError::LoadingFailed(msg)) => {
                error!("Dataset {} is not usable: {msg}", path.display());
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("???")
            .to_string();
        info!(
            "Loaded {} records from {} in {}ms",
            records.len(),
            path.display(),
            start_time.elapsed().as_millis()
        );
        Ok(Self::from_records(&name, records))
    }

    fn check_file(path: PathBuf) -> Result<PathBuf, CTError> {
        let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CTError::FileNotFound,
            ErrorKind::PermissionDenied => CTError::PermissionDenied,
            _ => CTError::IoError(e),
        })?;
        if !metadata.is_file() {
            return Err(CTError::LoadingFailed("Not a file!".into()));
        }
        match Self::extension(&path).as_deref() {
            Some("JSON") => Ok(path),
            _ => Err(CTError::UnknownFileType),
        }
    }

    fn extension(path: &Path) -> Option<String> {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_uppercase())
    }

    // Invalid JSON is an error, valid JSON that is not a list of records is LoadingFailed.
    fn parse(content: &str) -> Result<Vec<College>, CTError> {
        let value: Value = serde_json::from_str(content)?;
        let Value::Array(items) = value else {
            return Err(CTError::LoadingFailed(
                "Expected a list of college records".into(),
            ));
        };
        let records = items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                serde_json::from_value::<College>(item).unwrap_or_else(|e| {
                    warn!("Record {idx} is malformed, rendering it empty: {e}");
                    College::default()
                })
            })
            .collect::<Vec<College>>();
        debug!("Parsed {} records", records.len());
        Ok(records)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[College] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
