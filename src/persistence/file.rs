use super::{StoreError, StoreResult};
use crate::assignment::Assignment;
use crate::project::Project;
use crate::user::User;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// A complete snapshot of the three entity collections, the unit of JSON
/// import/export and seeding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub users: Vec<User>,
    pub projects: Vec<Project>,
    pub assignments: Vec<Assignment>,
}

pub fn save_dataset_to_json<P: AsRef<Path>>(dataset: &Dataset, path: P) -> StoreResult<()> {
    super::validate_dataset(&dataset.users, &dataset.projects, &dataset.assignments)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, dataset)?;
    Ok(())
}

pub fn load_dataset_from_json<P: AsRef<Path>>(path: P) -> StoreResult<Dataset> {
    let file = File::open(path)?;
    let dataset: Dataset = serde_json::from_reader(file)?;
    super::validate_dataset(&dataset.users, &dataset.projects, &dataset.assignments)?;
    Ok(dataset)
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AssignmentCsvRecord {
    id: String,
    engineer_id: String,
    project_id: String,
    allocation_percentage: i32,
    start_date: String,
    end_date: String,
    role: String,
}

impl From<&Assignment> for AssignmentCsvRecord {
    fn from(assignment: &Assignment) -> Self {
        Self {
            id: assignment.id.clone(),
            engineer_id: assignment.engineer_id.clone(),
            project_id: assignment.project_id.clone(),
            allocation_percentage: assignment.allocation_percentage,
            start_date: assignment.start_date.format("%Y-%m-%d").to_string(),
            end_date: assignment
                .end_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            role: assignment.role.clone(),
        }
    }
}

impl AssignmentCsvRecord {
    fn into_assignment(self) -> StoreResult<Assignment> {
        let start_date = parse_date(&self.start_date)?.ok_or_else(|| {
            StoreError::InvalidData(format!("assignment '{}' is missing start_date", self.id))
        })?;
        Ok(Assignment {
            id: self.id,
            engineer_id: self.engineer_id,
            project_id: self.project_id,
            allocation_percentage: self.allocation_percentage,
            start_date,
            end_date: parse_date(&self.end_date)?,
            role: self.role,
        })
    }
}

pub fn export_assignments_to_csv<P: AsRef<Path>>(
    assignments: &[Assignment],
    path: P,
) -> StoreResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for assignment in assignments {
        writer.serialize(AssignmentCsvRecord::from(assignment))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn import_assignments_from_csv<P: AsRef<Path>>(path: P) -> StoreResult<Vec<Assignment>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut assignments = Vec::new();
    for record in reader.deserialize::<AssignmentCsvRecord>() {
        assignments.push(record?.into_assignment()?);
    }
    if assignments.is_empty() {
        return Err(StoreError::InvalidData(
            "CSV file contained no assignments".into(),
        ));
    }
    Ok(assignments)
}

fn parse_date(input: &str) -> StoreResult<Option<NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|e| StoreError::InvalidData(format!("invalid date '{input}': {e}")))
}
