pub mod allocation;
pub mod assignment;
pub mod identity;
pub mod persistence;
pub mod policy;
pub mod project;
pub mod query;
pub mod user;
pub mod validation;

pub use allocation::{
    Availability, UtilizationBand, active_assignments_for, available_capacity,
    classify_utilization, current_allocation, next_available_date, utilization_percent,
};
pub use assignment::Assignment;
pub use identity::{IdentityProvider, TokenIssuer};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteResourceStore;
pub use persistence::{
    Dataset, MemoryStore, ResourceStore, StoreError, export_assignments_to_csv,
    import_assignments_from_csv, load_dataset_from_json, save_dataset_to_json, validate_dataset,
};
pub use policy::{AccessError, CredentialFault, Identity};
pub use project::{Project, ProjectStatus};
pub use query::{
    EngineerUtilization, ProjectRoster, QueryError, TeamSummary, engineer_with_utilization,
    project_roster, team_utilization_summary,
};
pub use user::{Role, Seniority, User};
pub use validation::{FieldViolation, ValidationError};
