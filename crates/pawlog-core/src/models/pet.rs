//! Pet profile model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ModelError, ModelResult};

/// A pet whose health journal is being kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pet {
    /// Local UUID - always present, generated locally
    pub id: String,
    /// Display name, used in insight recommendations
    pub name: String,
    /// Species (e.g., "dog", "cat", "rabbit")
    pub species: String,
    /// Breed
    pub breed: Option<String>,
    /// Date of birth
    pub birth_date: Option<NaiveDate>,
    /// Weight in kg
    pub weight_kg: Option<f64>,
    /// Free-form owner notes
    pub notes: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Pet {
    /// Create a new pet with required fields.
    pub fn new(name: String, species: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            species,
            breed: None,
            birth_date: None,
            weight_kg: None,
            notes: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Check required fields before persisting.
    pub fn validate(&self) -> ModelResult<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::MissingField("name"));
        }
        if let Some(weight) = self.weight_kg {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(ModelError::OutOfRange {
                    field: "weight_kg",
                    value: weight.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Age in whole years on the given day, if the birth date is known.
    pub fn age_years(&self, today: NaiveDate) -> Option<u32> {
        let birth = self.birth_date?;
        today.years_since(birth)
    }
}
