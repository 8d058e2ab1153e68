use super::{ResourceStore, StoreError, StoreResult};
use crate::assignment::Assignment;
use crate::project::Project;
use crate::user::{Role, User};
use crate::validation;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    projects: HashMap<String, Project>,
    assignments: HashMap<String, Assignment>,
}

/// In-memory store. A single lock over all three tables makes the cascade
/// delete atomic from the caller's perspective.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a pre-validated dataset, e.g. a seed snapshot.
    pub fn from_dataset(
        users: Vec<User>,
        projects: Vec<Project>,
        assignments: Vec<Assignment>,
    ) -> StoreResult<Self> {
        super::validate_dataset(&users, &projects, &assignments)?;
        let tables = Tables {
            users: users.into_iter().map(|u| (u.id.clone(), u)).collect(),
            projects: projects.into_iter().map(|p| (p.id.clone(), p)).collect(),
            assignments: assignments.into_iter().map(|a| (a.id.clone(), a)).collect(),
        };
        Ok(Self {
            tables: Mutex::new(tables),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().expect("store mutex poisoned")
    }
}

impl ResourceStore for MemoryStore {
    fn create_user(&self, user: User) -> StoreResult<()> {
        validation::validate_user(&user)?;
        let mut tables = self.lock();
        if tables.users.contains_key(&user.id) {
            return Err(StoreError::Conflict(format!("duplicate user id '{}'", user.id)));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "duplicate email '{}'",
                user.email
            )));
        }
        tables.users.insert(user.id.clone(), user);
        Ok(())
    }

    fn get_user(&self, id: &str) -> StoreResult<User> {
        self.lock()
            .users
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "user",
                id: id.to_string(),
            })
    }

    fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.lock().users.values().cloned().collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users)
    }

    fn create_project(&self, project: Project) -> StoreResult<()> {
        validation::validate_project(&project)?;
        let mut tables = self.lock();
        if tables.projects.contains_key(&project.id) {
            return Err(StoreError::Conflict(format!(
                "duplicate project id '{}'",
                project.id
            )));
        }
        let manager = tables
            .users
            .get(&project.manager_id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "manager",
                id: project.manager_id.clone(),
            })?;
        validation::validate_role(manager, Role::Manager)?;
        tables.projects.insert(project.id.clone(), project);
        Ok(())
    }

    fn get_project(&self, id: &str) -> StoreResult<Project> {
        self.lock()
            .projects
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "project",
                id: id.to_string(),
            })
    }

    fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let mut projects: Vec<Project> = self.lock().projects.values().cloned().collect();
        projects.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(projects)
    }

    fn update_project(&self, project: Project) -> StoreResult<()> {
        validation::validate_project(&project)?;
        let mut tables = self.lock();
        if !tables.projects.contains_key(&project.id) {
            return Err(StoreError::NotFound {
                entity: "project",
                id: project.id.clone(),
            });
        }
        let manager = tables
            .users
            .get(&project.manager_id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "manager",
                id: project.manager_id.clone(),
            })?;
        validation::validate_role(manager, Role::Manager)?;
        tables.projects.insert(project.id.clone(), project);
        Ok(())
    }

    fn delete_project(&self, id: &str) -> StoreResult<usize> {
        let mut tables = self.lock();
        if tables.projects.remove(id).is_none() {
            return Err(StoreError::NotFound {
                entity: "project",
                id: id.to_string(),
            });
        }
        let before = tables.assignments.len();
        tables.assignments.retain(|_, a| a.project_id != id);
        let removed = before - tables.assignments.len();
        debug!(project_id = id, removed, "deleted project with cascading assignments");
        Ok(removed)
    }

    fn create_assignment(&self, assignment: Assignment) -> StoreResult<()> {
        validation::validate_assignment(&assignment)?;
        let mut tables = self.lock();
        if tables.assignments.contains_key(&assignment.id) {
            return Err(StoreError::Conflict(format!(
                "duplicate assignment id '{}'",
                assignment.id
            )));
        }
        let engineer = tables
            .users
            .get(&assignment.engineer_id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "engineer",
                id: assignment.engineer_id.clone(),
            })?;
        validation::validate_role(engineer, Role::Engineer)?;
        if !tables.projects.contains_key(&assignment.project_id) {
            return Err(StoreError::NotFound {
                entity: "project",
                id: assignment.project_id.clone(),
            });
        }
        // Over-capacity totals are allowed at write time; overload is
        // detected and reported at read time.
        tables.assignments.insert(assignment.id.clone(), assignment);
        Ok(())
    }

    fn get_assignment(&self, id: &str) -> StoreResult<Assignment> {
        self.lock()
            .assignments
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "assignment",
                id: id.to_string(),
            })
    }

    fn list_assignments(&self) -> StoreResult<Vec<Assignment>> {
        let mut assignments: Vec<Assignment> =
            self.lock().assignments.values().cloned().collect();
        assignments.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(assignments)
    }

    fn assignments_for_engineer(&self, engineer_id: &str) -> StoreResult<Vec<Assignment>> {
        let mut assignments: Vec<Assignment> = self
            .lock()
            .assignments
            .values()
            .filter(|a| a.engineer_id == engineer_id)
            .cloned()
            .collect();
        assignments.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(assignments)
    }

    fn assignments_for_project(&self, project_id: &str) -> StoreResult<Vec<Assignment>> {
        let mut assignments: Vec<Assignment> = self
            .lock()
            .assignments
            .values()
            .filter(|a| a.project_id == project_id)
            .cloned()
            .collect();
        assignments.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(assignments)
    }
}
