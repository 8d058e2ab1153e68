use crate::assignment::Assignment;
use crate::project::Project;
use crate::user::User;
use crate::validation::{self, ValidationError};
use serde_json::Error as SerdeJsonError;
use std::collections::HashSet;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum StoreError {
    Validation(ValidationError),
    NotFound { entity: &'static str, id: String },
    Conflict(String),
    /// A multi-step write completed some but not all steps. Surfaced
    /// distinctly so operators can reconcile; never silently swallowed.
    PartialFailure { operation: String, detail: String },
    Serialization(SerdeJsonError),
    Io(io::Error),
    Csv(csv::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    InvalidData(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Validation(err) => write!(f, "validation error: {err}"),
            StoreError::NotFound { entity, id } => write!(f, "{entity} '{id}' not found"),
            StoreError::Conflict(msg) => write!(f, "conflict: {msg}"),
            StoreError::PartialFailure { operation, detail } => {
                write!(f, "partial failure during {operation}: {detail}")
            }
            StoreError::Serialization(err) => write!(f, "serialization error: {err}"),
            StoreError::Io(err) => write!(f, "io error: {err}"),
            StoreError::Csv(err) => write!(f, "csv error: {err}"),
            #[cfg(feature = "sqlite")]
            StoreError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            StoreError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<SerdeJsonError> for StoreError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for StoreError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for StoreError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// CRUD plus query-by-relation for the three entity kinds. Implementations
/// must reject dangling references on write and remove a project's
/// assignments when the project is deleted, atomically where the backend
/// allows it.
pub trait ResourceStore {
    fn create_user(&self, user: User) -> StoreResult<()>;
    fn get_user(&self, id: &str) -> StoreResult<User>;
    fn list_users(&self) -> StoreResult<Vec<User>>;

    fn create_project(&self, project: Project) -> StoreResult<()>;
    fn get_project(&self, id: &str) -> StoreResult<Project>;
    fn list_projects(&self) -> StoreResult<Vec<Project>>;
    fn update_project(&self, project: Project) -> StoreResult<()>;
    /// Deletes the project and every assignment referencing it. Returns the
    /// number of assignments removed.
    fn delete_project(&self, id: &str) -> StoreResult<usize>;

    fn create_assignment(&self, assignment: Assignment) -> StoreResult<()>;
    fn get_assignment(&self, id: &str) -> StoreResult<Assignment>;
    fn list_assignments(&self) -> StoreResult<Vec<Assignment>>;
    fn assignments_for_engineer(&self, engineer_id: &str) -> StoreResult<Vec<Assignment>>;
    fn assignments_for_project(&self, project_id: &str) -> StoreResult<Vec<Assignment>>;
}

/// Cross-entity integrity check used when loading a whole dataset at once:
/// unique ids, unique emails, valid entities, no dangling references.
pub fn validate_dataset(
    users: &[User],
    projects: &[Project],
    assignments: &[Assignment],
) -> StoreResult<()> {
    let mut user_ids = HashSet::with_capacity(users.len());
    let mut emails = HashSet::with_capacity(users.len());
    for user in users {
        validation::validate_user(user)?;
        if !user_ids.insert(user.id.as_str()) {
            return Err(StoreError::Conflict(format!("duplicate user id '{}'", user.id)));
        }
        if !emails.insert(user.email.as_str()) {
            return Err(StoreError::Conflict(format!(
                "duplicate email '{}'",
                user.email
            )));
        }
    }

    let mut project_ids = HashSet::with_capacity(projects.len());
    for project in projects {
        validation::validate_project(project)?;
        if !project_ids.insert(project.id.as_str()) {
            return Err(StoreError::Conflict(format!(
                "duplicate project id '{}'",
                project.id
            )));
        }
        if !user_ids.contains(project.manager_id.as_str()) {
            return Err(StoreError::NotFound {
                entity: "manager",
                id: project.manager_id.clone(),
            });
        }
    }

    let mut assignment_ids = HashSet::with_capacity(assignments.len());
    for assignment in assignments {
        validation::validate_assignment(assignment)?;
        if !assignment_ids.insert(assignment.id.as_str()) {
            return Err(StoreError::Conflict(format!(
                "duplicate assignment id '{}'",
                assignment.id
            )));
        }
        if !user_ids.contains(assignment.engineer_id.as_str()) {
            return Err(StoreError::NotFound {
                entity: "engineer",
                id: assignment.engineer_id.clone(),
            });
        }
        if !project_ids.contains(assignment.project_id.as_str()) {
            return Err(StoreError::NotFound {
                entity: "project",
                id: assignment.project_id.clone(),
            });
        }
    }

    Ok(())
}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    export_assignments_to_csv, import_assignments_from_csv, load_dataset_from_json,
    save_dataset_to_json, Dataset,
};
pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteResourceStore;
