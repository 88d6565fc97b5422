use crate::validators::ValidationError;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Workout {
    pub id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Calendar filter for workout listings, matched against `created_at` in UTC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct WorkoutFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl WorkoutFilter {
    /// Half-open `[start, end)` range selected by the filter, `None` when nothing is set.
    pub fn range(&self) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, ValidationError> {
        let (start, end) = match (self.year, self.month, self.day) {
            (None, None, None) => return Ok(None),
            (Some(year), None, None) => {
                let start = date(year, 1, 1)?;
                (start, date(year + 1, 1, 1)?)
            }
            (Some(year), Some(month), None) => {
                let start = date(year, month, 1)?;
                (start, first_of_next_month(start)?)
            }
            (Some(year), Some(month), Some(day)) => {
                let start = date(year, month, day)?;
                let end = start
                    .succ_opt()
                    .ok_or_else(|| ValidationError::new("day is out of range"))?;
                (start, end)
            }
            (None, _, _) => return Err(ValidationError::new("month and day require a year")),
            (Some(_), None, Some(_)) => return Err(ValidationError::new("day requires a month")),
        };

        Ok(Some((midnight(start), midnight(end))))
    }
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate, ValidationError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        ValidationError::new(format!("{year:04}-{month:02}-{day:02} is not a calendar date"))
    })
}

fn first_of_next_month(start: NaiveDate) -> Result<NaiveDate, ValidationError> {
    if start.month() == 12 {
        date(start.year() + 1, 1, 1)
    } else {
        date(start.year(), start.month() + 1, 1)
    }
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN))
}
