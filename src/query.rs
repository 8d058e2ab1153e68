//! Read-only composition of the allocation engine over full collections for
//! dashboard-style reporting. All mutation lives behind the persistence
//! collaborator; nothing here writes.

use crate::allocation::{
    Availability, UtilizationBand, active_assignments_for, available_capacity,
    classify_utilization, current_allocation, next_available_date, utilization_percent,
};
use crate::assignment::Assignment;
use crate::project::{Project, ProjectStatus};
use crate::user::User;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// A referenced entity was missing while joining collections. Dangling
/// references are a data-integrity error, not a business condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    NotFound { entity: &'static str, id: String },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::NotFound { entity, id } => {
                write!(f, "{entity} '{id}' referenced but not found")
            }
        }
    }
}

impl std::error::Error for QueryError {}

pub type QueryResult<T> = Result<T, QueryError>;

/// An assignment with its project details resolved, as reporting surfaces
/// expect them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentDetail {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub project_name: String,
    pub project_status: ProjectStatus,
}

/// An engineer enriched with every derived utilization field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineerUtilization {
    #[serde(flatten)]
    pub engineer: User,
    pub assignments: Vec<AssignmentDetail>,
    pub active_assignments: Vec<AssignmentDetail>,
    pub current_allocation: i32,
    pub available_capacity: i32,
    pub utilization_percent: f64,
    pub utilization_band: UtilizationBand,
    pub available_from: Availability,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterMember {
    #[serde(flatten)]
    pub engineer: User,
    pub allocation_percentage: i32,
    pub assignment_role: String,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// A project enriched with its assigned engineers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRoster {
    #[serde(flatten)]
    pub project: Project,
    pub members: Vec<RosterMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtilizationRow {
    pub engineer_id: String,
    pub name: String,
    pub max_capacity: i32,
    pub current_allocation: i32,
    pub available_capacity: i32,
    pub utilization_percent: f64,
    pub utilization_band: UtilizationBand,
}

/// Per-engineer utilization rows plus the project-status distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub rows: Vec<UtilizationRow>,
    pub status_counts: HashMap<ProjectStatus, usize>,
}

fn resolve_detail(
    assignment: &Assignment,
    projects: &[Project],
) -> QueryResult<AssignmentDetail> {
    let project = projects
        .iter()
        .find(|p| p.id == assignment.project_id)
        .ok_or_else(|| QueryError::NotFound {
            entity: "project",
            id: assignment.project_id.clone(),
        })?;
    Ok(AssignmentDetail {
        assignment: assignment.clone(),
        project_name: project.name.clone(),
        project_status: project.status,
    })
}

/// Enriches one engineer with active assignments, all assignments, the
/// current allocation sum, remaining capacity, band, and next availability.
pub fn engineer_with_utilization(
    engineer: &User,
    all_assignments: &[Assignment],
    projects: &[Project],
    reference_date: NaiveDate,
) -> QueryResult<EngineerUtilization> {
    let mut own: Vec<Assignment> = all_assignments
        .iter()
        .filter(|a| a.engineer_id == engineer.id)
        .cloned()
        .collect();
    own.sort_by(|a, b| b.start_date.cmp(&a.start_date));

    let assignments = own
        .iter()
        .map(|a| resolve_detail(a, projects))
        .collect::<QueryResult<Vec<_>>>()?;
    let active_assignments = active_assignments_for(&engineer.id, all_assignments, reference_date)
        .iter()
        .map(|a| resolve_detail(a, projects))
        .collect::<QueryResult<Vec<_>>>()?;

    let allocated = current_allocation(&engineer.id, all_assignments, reference_date);
    let percent = utilization_percent(engineer, all_assignments, reference_date);

    Ok(EngineerUtilization {
        engineer: engineer.clone(),
        assignments,
        active_assignments,
        current_allocation: allocated,
        available_capacity: available_capacity(engineer, all_assignments, reference_date),
        utilization_percent: percent,
        utilization_band: classify_utilization(percent),
        available_from: next_available_date(engineer, all_assignments, reference_date),
    })
}

/// The project's roster: each assigned engineer with their per-project
/// allocation, most recent assignment first.
pub fn project_roster(
    project: &Project,
    all_assignments: &[Assignment],
    engineers: &[User],
) -> QueryResult<ProjectRoster> {
    let mut relevant: Vec<&Assignment> = all_assignments
        .iter()
        .filter(|a| a.project_id == project.id)
        .collect();
    relevant.sort_by(|a, b| b.start_date.cmp(&a.start_date));

    let mut members = Vec::with_capacity(relevant.len());
    for assignment in relevant {
        let engineer = engineers
            .iter()
            .find(|e| e.id == assignment.engineer_id)
            .ok_or_else(|| QueryError::NotFound {
                entity: "engineer",
                id: assignment.engineer_id.clone(),
            })?;
        members.push(RosterMember {
            engineer: engineer.clone(),
            allocation_percentage: assignment.allocation_percentage,
            assignment_role: assignment.role.clone(),
            start_date: assignment.start_date,
            end_date: assignment.end_date,
        });
    }

    Ok(ProjectRoster {
        project: project.clone(),
        members,
    })
}

/// Analytics rollup. Engineers with zero assignments appear as 0% /
/// VeryLow rows, never as errors or omissions.
pub fn team_utilization_summary(
    engineers: &[User],
    all_assignments: &[Assignment],
    projects: &[Project],
    reference_date: NaiveDate,
) -> TeamSummary {
    let rows = engineers
        .iter()
        .filter(|e| e.is_engineer())
        .map(|engineer| {
            let allocated = current_allocation(&engineer.id, all_assignments, reference_date);
            let percent = utilization_percent(engineer, all_assignments, reference_date);
            UtilizationRow {
                engineer_id: engineer.id.clone(),
                name: engineer.name.clone(),
                max_capacity: engineer.max_capacity,
                current_allocation: allocated,
                available_capacity: available_capacity(engineer, all_assignments, reference_date),
                utilization_percent: percent,
                utilization_band: classify_utilization(percent),
            }
        })
        .collect();

    let mut status_counts: HashMap<ProjectStatus, usize> = HashMap::new();
    for status in ProjectStatus::ALL {
        status_counts.insert(status, 0);
    }
    for project in projects {
        *status_counts.entry(project.status).or_insert(0) += 1;
    }

    TeamSummary {
        rows,
        status_counts,
    }
}
