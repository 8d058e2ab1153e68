use crate::assignment::Assignment;
use crate::project::Project;
use crate::user::{Role, User};
use std::fmt;

/// A single violated field, with enough detail for the caller to fix it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub expected: String,
    pub actual: String,
}

impl FieldViolation {
    fn new(field: &'static str, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            field,
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.field, self.expected, self.actual
        )
    }
}

/// Structural validation failure. Every field is checked and every violation
/// reported together; validation never stops at the first problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub entity: &'static str,
    pub entity_id: String,
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    fn new(entity: &'static str, entity_id: impl Into<String>, violations: Vec<FieldViolation>) -> Self {
        Self {
            entity,
            entity_id: entity_id.into(),
            violations,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} '{}': ", self.entity, self.entity_id)?;
        let rendered = self
            .violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{rendered}")
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

fn finish(entity: &'static str, id: &str, violations: Vec<FieldViolation>) -> ValidationResult {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(entity, id, violations))
    }
}

pub fn validate_user(user: &User) -> ValidationResult {
    let mut violations = Vec::new();

    if user.id.trim().is_empty() {
        violations.push(FieldViolation::new("id", "non-empty identifier", "empty"));
    }
    if user.name.trim().is_empty() {
        violations.push(FieldViolation::new("name", "non-empty name", "empty"));
    }
    if user.email.trim().is_empty() || !user.email.contains('@') {
        violations.push(FieldViolation::new(
            "email",
            "address containing '@'",
            user.email.clone(),
        ));
    }
    if user.department.trim().is_empty() {
        violations.push(FieldViolation::new(
            "department",
            "non-empty department",
            "empty",
        ));
    }
    if !(0..=100).contains(&user.max_capacity) {
        violations.push(FieldViolation::new(
            "max_capacity",
            "percentage in 0..=100",
            user.max_capacity.to_string(),
        ));
    }

    finish("user", &user.id, violations)
}

pub fn validate_project(project: &Project) -> ValidationResult {
    let mut violations = Vec::new();

    if project.id.trim().is_empty() {
        violations.push(FieldViolation::new("id", "non-empty identifier", "empty"));
    }
    if project.name.trim().is_empty() {
        violations.push(FieldViolation::new("name", "non-empty name", "empty"));
    }
    if project.team_size < 1 {
        violations.push(FieldViolation::new(
            "team_size",
            "positive headcount",
            project.team_size.to_string(),
        ));
    }
    if project.manager_id.trim().is_empty() {
        violations.push(FieldViolation::new(
            "manager_id",
            "reference to a manager",
            "empty",
        ));
    }
    if let (Some(start), Some(end)) = (project.start_date, project.end_date) {
        if start > end {
            violations.push(FieldViolation::new(
                "end_date",
                format!("date on or after start date {start}"),
                end.to_string(),
            ));
        }
    }

    finish("project", &project.id, violations)
}

pub fn validate_assignment(assignment: &Assignment) -> ValidationResult {
    let mut violations = Vec::new();

    if assignment.id.trim().is_empty() {
        violations.push(FieldViolation::new("id", "non-empty identifier", "empty"));
    }
    if assignment.engineer_id.trim().is_empty() {
        violations.push(FieldViolation::new(
            "engineer_id",
            "reference to an engineer",
            "empty",
        ));
    }
    if assignment.project_id.trim().is_empty() {
        violations.push(FieldViolation::new(
            "project_id",
            "reference to a project",
            "empty",
        ));
    }
    if !(0..=100).contains(&assignment.allocation_percentage) {
        violations.push(FieldViolation::new(
            "allocation_percentage",
            "percentage in 0..=100",
            assignment.allocation_percentage.to_string(),
        ));
    }
    if assignment.role.trim().is_empty() {
        violations.push(FieldViolation::new("role", "non-empty role", "empty"));
    }
    match assignment.end_date {
        Some(end) => {
            if assignment.start_date > end {
                violations.push(FieldViolation::new(
                    "end_date",
                    format!("date on or after start date {}", assignment.start_date),
                    end.to_string(),
                ));
            }
        }
        // Required at write time; the engine cannot derive availability
        // from an open-ended window.
        None => violations.push(FieldViolation::new("end_date", "calendar date", "missing")),
    }

    finish("assignment", &assignment.id, violations)
}

/// Expectation check used by callers that require a specific role on a user
/// record (e.g. an assignment must reference a user with the engineer role).
pub fn validate_role(user: &User, expected: Role) -> ValidationResult {
    if user.role == expected {
        return Ok(());
    }
    Err(ValidationError::new(
        "user",
        &user.id,
        vec![FieldViolation::new(
            "role",
            expected.as_str(),
            user.role.as_str(),
        )],
    ))
}
