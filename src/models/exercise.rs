use crate::validators::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    Cardio,
    Weights,
}

impl ExerciseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseType::Cardio => "cardio",
            ExerciseType::Weights => "weights",
        }
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type specific measurements. Serialized flat next to the common exercise fields,
/// discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExerciseDetails {
    Cardio { distance: f64, duration: i32 },
    Weights { sets: i32, reps: i32, weight: f64 },
}

impl ExerciseDetails {
    pub fn kind(&self) -> ExerciseType {
        match self {
            ExerciseDetails::Cardio { .. } => ExerciseType::Cardio,
            ExerciseDetails::Weights { .. } => ExerciseType::Weights,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub workout_id: i64,
    pub name: String,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub details: ExerciseDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storage shape of an exercise: one row with nullable columns for every type.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExerciseRow {
    pub id: i64,
    pub workout_id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub notes: Option<String>,
    pub distance: Option<f64>,
    pub duration: Option<i32>,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ExerciseRow> for Exercise {
    type Error = ValidationError;

    fn try_from(row: ExerciseRow) -> Result<Self, Self::Error> {
        let missing = |column: &str| {
            ValidationError::new(format!(
                "exercise {} of type {} has no {column}",
                row.id, row.kind
            ))
        };

        let details = match row.kind.as_str() {
            "cardio" => ExerciseDetails::Cardio {
                distance: row.distance.ok_or_else(|| missing("distance"))?,
                duration: row.duration.ok_or_else(|| missing("duration"))?,
            },
            "weights" => ExerciseDetails::Weights {
                sets: row.sets.ok_or_else(|| missing("sets"))?,
                reps: row.reps.ok_or_else(|| missing("reps"))?,
                weight: row.weight.ok_or_else(|| missing("weight"))?,
            },
            other => {
                return Err(ValidationError::new(format!(
                    "unknown exercise type `{other}`"
                )))
            }
        };

        Ok(Exercise {
            id: row.id,
            workout_id: row.workout_id,
            name: row.name,
            notes: row.notes,
            details,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
