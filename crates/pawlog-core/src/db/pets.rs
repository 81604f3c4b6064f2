//! Pet database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_optional_date, Database, DbError, DbResult};
use crate::models::Pet;

const PET_COLUMNS: &str = "id, name, species, breed, birth_date, weight_kg, notes, created_at, updated_at";

/// Raw pet row before date parsing.
struct PetRow {
    id: String,
    name: String,
    species: String,
    breed: Option<String>,
    birth_date: Option<String>,
    weight_kg: Option<f64>,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
}

impl PetRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            species: row.get(2)?,
            breed: row.get(3)?,
            birth_date: row.get(4)?,
            weight_kg: row.get(5)?,
            notes: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

impl TryFrom<PetRow> for Pet {
    type Error = DbError;

    fn try_from(row: PetRow) -> Result<Self, Self::Error> {
        Ok(Pet {
            id: row.id,
            name: row.name,
            species: row.species,
            breed: row.breed,
            birth_date: parse_optional_date(row.birth_date)?,
            weight_kg: row.weight_kg,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl Database {
    /// Insert a new pet.
    pub fn insert_pet(&self, pet: &Pet) -> DbResult<()> {
        pet.validate()
            .map_err(|e| DbError::Constraint(e.to_string()))?;

        self.conn.execute(
            r#"
            INSERT INTO pets (
                id, name, species, breed, birth_date, weight_kg,
                notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                pet.id,
                pet.name,
                pet.species,
                pet.breed,
                pet.birth_date.map(|d| d.to_string()),
                pet.weight_kg,
                pet.notes,
                pet.created_at,
                pet.updated_at,
            ],
        )?;
        tracing::info!(pet_id = %pet.id, "pet created");
        Ok(())
    }

    /// Update an existing pet.
    pub fn update_pet(&self, pet: &Pet) -> DbResult<bool> {
        pet.validate()
            .map_err(|e| DbError::Constraint(e.to_string()))?;

        let rows_affected = self.conn.execute(
            r#"
            UPDATE pets SET
                name = ?2,
                species = ?3,
                breed = ?4,
                birth_date = ?5,
                weight_kg = ?6,
                notes = ?7,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                pet.id,
                pet.name,
                pet.species,
                pet.breed,
                pet.birth_date.map(|d| d.to_string()),
                pet.weight_kg,
                pet.notes,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a pet by ID.
    pub fn get_pet(&self, id: &str) -> DbResult<Option<Pet>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM pets WHERE id = ?", PET_COLUMNS),
                [id],
                PetRow::from_row,
            )
            .optional()?
            .map(Pet::try_from)
            .transpose()
    }

    /// List all pets by name.
    pub fn list_pets(&self) -> DbResult<Vec<Pet>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM pets ORDER BY name", PET_COLUMNS))?;

        let rows = stmt.query_map([], PetRow::from_row)?;

        let mut pets = Vec::new();
        for row in rows {
            pets.push(row?.try_into()?);
        }
        Ok(pets)
    }

    /// Delete a pet along with its journal and medications.
    pub fn delete_pet(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM pets WHERE id = ?", [id])?;
        if rows_affected > 0 {
            tracing::info!(pet_id = %id, "pet deleted");
        }
        Ok(rows_affected > 0)
    }
}
