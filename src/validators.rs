//! Pure checks applied to entities before they reach the store.

use crate::models;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub fn positive_id(field: &str, id: i64) -> Result<(), ValidationError> {
    if id <= 0 {
        return Err(ValidationError::new(format!("{field} must be positive, got {id}")));
    }
    Ok(())
}

pub fn not_blank(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(format!("{field} must not be empty")));
    }
    Ok(())
}

pub fn email(value: &str) -> Result<(), ValidationError> {
    not_blank("email", value)?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::new(format!("`{value}` is not an email address"))),
    }
}

pub fn user(user: &models::User) -> Result<(), ValidationError> {
    email(&user.email)
}

pub fn workout(workout: &models::Workout) -> Result<(), ValidationError> {
    positive_id("user_id", workout.user_id)
}

pub fn exercise_details(details: &models::ExerciseDetails) -> Result<(), ValidationError> {
    match *details {
        models::ExerciseDetails::Cardio { distance, duration } => {
            if !distance.is_finite() || distance < 0.0 {
                return Err(ValidationError::new("distance must be a non-negative number"));
            }
            if duration <= 0 {
                return Err(ValidationError::new("duration must be positive"));
            }
        }
        models::ExerciseDetails::Weights { sets, reps, weight } => {
            if sets <= 0 {
                return Err(ValidationError::new("sets must be positive"));
            }
            if reps <= 0 {
                return Err(ValidationError::new("reps must be positive"));
            }
            if !weight.is_finite() || weight < 0.0 {
                return Err(ValidationError::new("weight must be a non-negative number"));
            }
        }
    }
    Ok(())
}

pub fn exercise(exercise: &models::Exercise) -> Result<(), ValidationError> {
    positive_id("workout_id", exercise.workout_id)?;
    not_blank("name", &exercise.name)?;
    exercise_details(&exercise.details)
}

pub fn conversation(conversation: &models::Conversation) -> Result<(), ValidationError> {
    positive_id("user_id", conversation.user_id)?;
    not_blank("title", &conversation.title)?;
    if conversation.title.chars().count() > 255 {
        return Err(ValidationError::new("title must be at most 255 characters"));
    }
    Ok(())
}

pub fn message(message: &models::Message) -> Result<(), ValidationError> {
    positive_id("conversation_id", message.conversation_id)?;
    positive_id("user_id", message.user_id)?;
    not_blank("content", &message.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Conversation, Exercise, ExerciseDetails, Message, MessageType};
    use chrono::Utc;

    fn exercise_with(details: ExerciseDetails) -> Exercise {
        Exercise {
            id: 0,
            workout_id: 1,
            name: "Bench press".to_string(),
            notes: None,
            details,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn ids_must_be_positive() {
        assert!(positive_id("id", 1).is_ok());
        assert!(positive_id("id", 0).is_err());
        assert!(positive_id("id", -4).is_err());
    }

    #[test]
    fn email_needs_local_part_and_domain() {
        assert!(email("a@b.c").is_ok());
        assert!(email("").is_err());
        assert!(email("   ").is_err());
        assert!(email("nobody").is_err());
        assert!(email("@example.com").is_err());
    }

    #[test]
    fn cardio_needs_positive_duration() {
        let ok = exercise_with(ExerciseDetails::Cardio {
            distance: 0.0,
            duration: 60,
        });
        assert!(exercise(&ok).is_ok());

        let zero = exercise_with(ExerciseDetails::Cardio {
            distance: 3.0,
            duration: 0,
        });
        assert!(exercise(&zero).is_err());

        let nan = exercise_with(ExerciseDetails::Cardio {
            distance: f64::NAN,
            duration: 10,
        });
        assert!(exercise(&nan).is_err());
    }

    #[test]
    fn weights_need_sets_and_reps() {
        let ok = exercise_with(ExerciseDetails::Weights {
            sets: 3,
            reps: 8,
            weight: 0.0,
        });
        assert!(exercise(&ok).is_ok());

        let no_reps = exercise_with(ExerciseDetails::Weights {
            sets: 3,
            reps: 0,
            weight: 40.0,
        });
        assert!(exercise(&no_reps).is_err());

        let mut unnamed = ok.clone();
        unnamed.name = " ".to_string();
        assert!(exercise(&unnamed).is_err());
    }

    #[test]
    fn conversation_title_is_bounded() {
        let mut conversation = Conversation {
            user_id: 2,
            title: "Leg day".to_string(),
            ..Default::default()
        };
        assert!(super::conversation(&conversation).is_ok());

        conversation.title = "x".repeat(256);
        assert!(super::conversation(&conversation).is_err());

        conversation.title = String::new();
        assert!(super::conversation(&conversation).is_err());
    }

    #[test]
    fn message_content_must_not_be_blank() {
        let message = Message::draft(7, 2, "hello".to_string(), MessageType::User);
        assert!(super::message(&message).is_ok());

        let blank = Message::draft(7, 2, "\n ".to_string(), MessageType::User);
        assert!(super::message(&blank).is_err());

        let orphan = Message::draft(0, 2, "hello".to_string(), MessageType::User);
        assert!(super::message(&orphan).is_err());
    }
}
