//! Structured pet context sent alongside assistant prompts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pawlog_core::models::{EventCategory, HealthEvent, Pet};

/// Default number of recent events included with a prompt.
pub const DEFAULT_EVENT_LIMIT: usize = 20;

/// Pet profile fields the assistant may use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PetProfile {
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub age_years: Option<u32>,
    pub weight_kg: Option<f64>,
}

/// A snapshot of the pet and its most recent journal entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantContext {
    pub profile: PetProfile,
    /// One compact line per event, newest first
    pub recent_events: Vec<String>,
}

impl AssistantContext {
    /// Build a context from a pet and up to `limit` of its newest events.
    ///
    /// Events belonging to other pets are ignored.
    pub fn from_pet(pet: &Pet, events: &[HealthEvent], limit: usize, today: NaiveDate) -> Self {
        let mut own: Vec<&HealthEvent> = events.iter().filter(|e| e.pet_id == pet.id).collect();
        own.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));

        Self {
            profile: PetProfile {
                name: pet.name.clone(),
                species: pet.species.clone(),
                breed: pet.breed.clone(),
                age_years: pet.age_years(today),
                weight_kg: pet.weight_kg,
            },
            recent_events: own.into_iter().take(limit).map(describe_event).collect(),
        }
    }

    /// Plain-text rendering for inclusion in a prompt.
    pub fn render(&self) -> String {
        let profile = &self.profile;
        let mut out = format!("Pet: {} ({})", profile.name, profile.species);
        if let Some(breed) = &profile.breed {
            out.push_str(&format!(", {}", breed));
        }
        if let Some(age) = profile.age_years {
            out.push_str(&format!(", {} years old", age));
        }
        if let Some(weight) = profile.weight_kg {
            out.push_str(&format!(", {:.1} kg", weight));
        }
        out.push('\n');

        if self.recent_events.is_empty() {
            out.push_str("Recent events: none logged\n");
        } else {
            out.push_str("Recent events:\n");
            for line in &self.recent_events {
                out.push_str("- ");
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}

/// One-line summary of an event: timestamp, category, then the fields that
/// matter for that category.
pub fn describe_event(event: &HealthEvent) -> String {
    let mut line = format!(
        "{} {}",
        event.timestamp.format("%Y-%m-%d %H:%M"),
        event.category.as_str()
    );

    let detail = match event.category {
        EventCategory::Meal => event.meal_type.map(|m| m.as_str().to_string()),
        EventCategory::Walk | EventCategory::Playtime => event
            .duration_minutes
            .as_deref()
            .map(|d| format!("{} min", d.trim())),
        EventCategory::Symptom => {
            let kind = event.symptom_type.as_deref().unwrap_or("unspecified");
            Some(match event.severity_level {
                Some(level) => format!("{}, severity {}/5", kind, level),
                None => kind.to_string(),
            })
        }
        EventCategory::Mood => event.mood_level.map(|m| format!("{}/5", m)),
        EventCategory::Digestion => event.digestion_quality.clone(),
        EventCategory::Water => event.water_amount.clone(),
        EventCategory::Appointment => event.appointment_type.clone(),
        _ => event.amount.clone(),
    };

    if let Some(detail) = detail.filter(|d| !d.trim().is_empty()) {
        line.push_str(": ");
        line.push_str(&detail);
    }
    let notes = event.notes.trim();
    if !notes.is_empty() {
        line.push_str(&format!(" ({})", notes));
    }
    line
}
