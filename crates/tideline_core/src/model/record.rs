//! Survey record domain model.
//!
//! # Responsibility
//! - Define the canonical row shape for one intertidal survey observation.
//! - Keep field values as raw text exactly as they appear in the source.
//!
//! # Invariants
//! - `id` is `None` until a store accepts the record, then stable forever.
//! - All six data fields are always present (empty string, never absent).
//! - `year` and `count` are stored as raw text, never coerced to numbers.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Store-assigned identity for a persisted record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type RecordId = i64;

/// One survey observation: six text columns plus an optional durable identity.
///
/// Records are constructed transient (no identity) by CSV ingest or by user
/// input, and gain an `id` only when a store accepts them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyRecord {
    /// Durable identity. `None` for transient records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Survey site identification.
    pub site: String,
    /// Survey year, raw text.
    pub year: String,
    /// Transect identifier within the site.
    pub transect: String,
    /// Quadrat identifier within the transect.
    pub quadrat: String,
    /// Species common name.
    pub species: String,
    /// Specimen count, raw text.
    pub count: String,
}

impl SurveyRecord {
    /// Creates a transient record from the six data fields.
    pub fn new(
        site: impl Into<String>,
        year: impl Into<String>,
        transect: impl Into<String>,
        quadrat: impl Into<String>,
        species: impl Into<String>,
        count: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            site: site.into(),
            year: year.into(),
            transect: transect.into(),
            quadrat: quadrat.into(),
            species: species.into(),
            count: count.into(),
        }
    }

    /// Creates a record carrying an already-assigned identity.
    ///
    /// Used by store read paths where the identity exists in durable state.
    pub fn with_id(
        id: RecordId,
        site: impl Into<String>,
        year: impl Into<String>,
        transect: impl Into<String>,
        quadrat: impl Into<String>,
        species: impl Into<String>,
        count: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id),
            ..Self::new(site, year, transect, quadrat, species, count)
        }
    }

    /// Returns the six data fields in source column order.
    pub fn field_values(&self) -> [&str; 6] {
        [
            &self.site,
            &self.year,
            &self.transect,
            &self.quadrat,
            &self.species,
            &self.count,
        ]
    }
}

impl Display for SurveyRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Site: {}, Year: {}, Transect: {}, Quadrat: {}, Species: {}, Count: {}",
            self.site, self.year, self.transect, self.quadrat, self.species, self.count
        )
    }
}
