use crate::models;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ExerciseForm {
    #[validate(min_length = 1)]
    #[validate(max_length = 255)]
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub details: models::ExerciseDetails,
}

impl ExerciseForm {
    pub fn into_exercise(self, workout_id: i64) -> models::Exercise {
        let now = Utc::now();
        models::Exercise {
            id: 0,
            workout_id,
            name: self.name,
            notes: self.notes,
            details: self.details,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the form onto a stored exercise. Its type is fixed at creation.
    pub fn update(self, exercise: &mut models::Exercise) -> Result<(), String> {
        if self.details.kind() != exercise.details.kind() {
            return Err(format!(
                "exercise type cannot change from {} to {}",
                exercise.details.kind(),
                self.details.kind()
            ));
        }
        exercise.name = self.name;
        exercise.notes = self.notes;
        exercise.details = self.details;
        Ok(())
    }
}
