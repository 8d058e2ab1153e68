use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A time-bound fractional commitment of an engineer to a project.
///
/// `end_date` is optional in storage but required by write-time validation;
/// an assignment without one has no defined activity window and is excluded
/// from every active-sum computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub engineer_id: String,
    pub project_id: String,
    /// Fraction of the engineer's working capacity committed here, 0-100.
    pub allocation_percentage: i32,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Free-text description of the engineer's function on the project.
    pub role: String,
}

impl Assignment {
    pub fn new(
        id: impl Into<String>,
        engineer_id: impl Into<String>,
        project_id: impl Into<String>,
        allocation_percentage: i32,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            engineer_id: engineer_id.into(),
            project_id: project_id.into(),
            allocation_percentage,
            start_date,
            end_date: Some(end_date),
            role: String::new(),
        }
    }

    /// Whether the assignment window contains `date`, both ends inclusive.
    /// Open-ended assignments are never considered active.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        match self.end_date {
            Some(end) => self.start_date <= date && date <= end,
            None => false,
        }
    }
}
