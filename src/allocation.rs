//! The allocation engine: pure, total functions over in-memory collections.
//!
//! Every function takes an explicit `reference_date`; nothing here reads the
//! clock. Business conditions (overload, zero capacity) are data, not
//! errors, so none of these functions fail on well-formed input.

use crate::assignment::Assignment;
use crate::user::User;
use chrono::{Duration, NaiveDate};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Utilization bands, highest first. Drives UI color; the thresholds are a
/// user-visible contract and must not drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilizationBand {
    VeryLow,
    Low,
    Moderate,
    Warning,
    High,
    Critical,
}

impl UtilizationBand {
    pub fn label(&self) -> &'static str {
        match self {
            UtilizationBand::Critical => "overloaded/critical",
            UtilizationBand::High => "nearing overload",
            UtilizationBand::Warning => "warning",
            UtilizationBand::Moderate => "moderate",
            UtilizationBand::Low => "ample/good",
            UtilizationBand::VeryLow => "very low / ample",
        }
    }
}

/// When an engineer next has any capacity window open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Immediately,
    From(NaiveDate),
}

impl Availability {
    pub fn is_immediate(&self) -> bool {
        matches!(self, Availability::Immediately)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Immediately => write!(f, "immediately"),
            Availability::From(date) => write!(f, "{date}"),
        }
    }
}

// Reporting consumers receive either an ISO calendar date or the literal
// sentinel string "immediately".
impl Serialize for Availability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Availability::Immediately => serializer.serialize_str("immediately"),
            Availability::From(date) => date.serialize(serializer),
        }
    }
}

/// Zero-capacity denominator. Never escapes this module: callers of
/// [`utilization_percent`] see 0% instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DivisionGuard {
    pub engineer_id: String,
}

impl fmt::Display for DivisionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "engineer '{}' has zero max capacity; utilization is undefined",
            self.engineer_id
        )
    }
}

/// Assignments belonging to `engineer_id` whose window contains
/// `reference_date`, most recent start first.
pub fn active_assignments_for(
    engineer_id: &str,
    assignments: &[Assignment],
    reference_date: NaiveDate,
) -> Vec<Assignment> {
    let mut active: Vec<Assignment> = assignments
        .iter()
        .filter(|a| a.engineer_id == engineer_id && a.is_active_on(reference_date))
        .cloned()
        .collect();
    // Display contract: descending start date, stable for equal starts.
    active.sort_by(|a, b| b.start_date.cmp(&a.start_date));
    active
}

/// Uncapped sum of active allocation percentages. May exceed 100 when
/// windows overlap beyond capacity; that excess is the overload signal.
pub fn current_allocation(
    engineer_id: &str,
    assignments: &[Assignment],
    reference_date: NaiveDate,
) -> i32 {
    assignments
        .iter()
        .filter(|a| a.engineer_id == engineer_id && a.is_active_on(reference_date))
        .map(|a| a.allocation_percentage)
        .sum()
}

/// Remaining headroom against the engineer's ceiling. Negative when
/// overloaded; never clamped so downstream classification can tell "no
/// room" from "overloaded".
pub fn available_capacity(
    engineer: &User,
    assignments: &[Assignment],
    reference_date: NaiveDate,
) -> i32 {
    engineer.max_capacity - current_allocation(&engineer.id, assignments, reference_date)
}

fn utilization_ratio(
    engineer: &User,
    assignments: &[Assignment],
    reference_date: NaiveDate,
) -> Result<f64, DivisionGuard> {
    if engineer.max_capacity == 0 {
        return Err(DivisionGuard {
            engineer_id: engineer.id.clone(),
        });
    }
    let allocated = current_allocation(&engineer.id, assignments, reference_date);
    Ok(f64::from(allocated) / f64::from(engineer.max_capacity))
}

/// Current allocation as a percentage of max capacity. A zero-capacity
/// engineer has no meaningful utilization and reports 0 rather than failing.
pub fn utilization_percent(
    engineer: &User,
    assignments: &[Assignment],
    reference_date: NaiveDate,
) -> f64 {
    match utilization_ratio(engineer, assignments, reference_date) {
        Ok(ratio) => ratio * 100.0,
        Err(_) => 0.0,
    }
}

/// Bands a utilization percentage. Evaluated from the highest band downward
/// with inclusive lower bounds, so a value satisfying several bands resolves
/// to the highest.
pub fn classify_utilization(percent: f64) -> UtilizationBand {
    if percent >= 100.0 {
        UtilizationBand::Critical
    } else if percent > 90.0 {
        UtilizationBand::High
    } else if percent > 70.0 {
        UtilizationBand::Warning
    } else if percent > 50.0 {
        UtilizationBand::Moderate
    } else if percent > 30.0 {
        UtilizationBand::Low
    } else {
        UtilizationBand::VeryLow
    }
}

/// The day after the latest active window closes, or the "immediately"
/// sentinel when nothing is active. Derived on every query, never persisted.
pub fn next_available_date(
    engineer: &User,
    assignments: &[Assignment],
    reference_date: NaiveDate,
) -> Availability {
    let latest_end = assignments
        .iter()
        .filter(|a| a.engineer_id == engineer.id && a.is_active_on(reference_date))
        .filter_map(|a| a.end_date)
        .max();

    match latest_end {
        Some(end) => Availability::From(end + Duration::days(1)),
        None => Availability::Immediately,
    }
}
