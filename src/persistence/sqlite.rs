use super::{ResourceStore, StoreError, StoreResult};
use crate::assignment::Assignment;
use crate::project::Project;
use crate::user::{Role, User};
use crate::validation;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;
use tracing::debug;

/// SQLite-backed store. Entities are stored as JSON payloads keyed by id;
/// relation columns carry foreign keys so query-by-relation and the cascade
/// delete run in the database.
pub struct SqliteResourceStore {
    connection: Mutex<Connection>,
}

impl SqliteResourceStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> StoreResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> StoreResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                role TEXT NOT NULL,
                user_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                manager_id TEXT NOT NULL REFERENCES users(id),
                project_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS assignments (
                id TEXT PRIMARY KEY,
                engineer_id TEXT NOT NULL REFERENCES users(id),
                project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                assignment_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.connection.lock().expect("sqlite mutex poisoned")
    }

    fn user_by_id(conn: &Connection, id: &str) -> StoreResult<Option<User>> {
        let json: Option<String> = conn
            .prepare("SELECT user_json FROM users WHERE id = ?1")?
            .query_row(params![id], |row| row.get(0))
            .optional()?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn project_exists(conn: &Connection, id: &str) -> StoreResult<bool> {
        let found: Option<i64> = conn
            .prepare("SELECT 1 FROM projects WHERE id = ?1")?
            .query_row(params![id], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    fn collect_assignments(
        conn: &Connection,
        sql: &str,
        filter: Option<&str>,
    ) -> StoreResult<Vec<Assignment>> {
        let mut stmt = conn.prepare(sql)?;
        let rows: Vec<rusqlite::Result<String>> = match filter {
            Some(value) => stmt
                .query_map(params![value], |row| row.get::<_, String>(0))?
                .collect(),
            None => stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect(),
        };
        let mut assignments = Vec::new();
        for json in rows {
            assignments.push(serde_json::from_str(&json?)?);
        }
        Ok(assignments)
    }
}

impl ResourceStore for SqliteResourceStore {
    fn create_user(&self, user: User) -> StoreResult<()> {
        validation::validate_user(&user)?;
        let conn = self.lock();
        if Self::user_by_id(&conn, &user.id)?.is_some() {
            return Err(StoreError::Conflict(format!("duplicate user id '{}'", user.id)));
        }
        let json = serde_json::to_string(&user)?;
        conn.execute(
            "INSERT INTO users (id, email, role, user_json) VALUES (?1, ?2, ?3, ?4)",
            params![user.id, user.email, user.role.as_str(), json],
        )
        .map_err(|err| match err {
            rusqlite::Error::SqliteFailure(code, _)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Conflict(format!("duplicate email '{}'", user.email))
            }
            other => StoreError::Sqlite(other),
        })?;
        Ok(())
    }

    fn get_user(&self, id: &str) -> StoreResult<User> {
        let conn = self.lock();
        Self::user_by_id(&conn, id)?.ok_or_else(|| StoreError::NotFound {
            entity: "user",
            id: id.to_string(),
        })
    }

    fn list_users(&self) -> StoreResult<Vec<User>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT user_json FROM users ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut users = Vec::new();
        for json in rows {
            users.push(serde_json::from_str(&json?)?);
        }
        Ok(users)
    }

    fn create_project(&self, project: Project) -> StoreResult<()> {
        validation::validate_project(&project)?;
        let conn = self.lock();
        let manager =
            Self::user_by_id(&conn, &project.manager_id)?.ok_or_else(|| StoreError::NotFound {
                entity: "manager",
                id: project.manager_id.clone(),
            })?;
        validation::validate_role(&manager, Role::Manager)?;
        let json = serde_json::to_string(&project)?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO projects (id, manager_id, project_json) VALUES (?1, ?2, ?3)",
            params![project.id, project.manager_id, json],
        )?;
        if inserted == 0 {
            return Err(StoreError::Conflict(format!(
                "duplicate project id '{}'",
                project.id
            )));
        }
        Ok(())
    }

    fn get_project(&self, id: &str) -> StoreResult<Project> {
        let conn = self.lock();
        let json: Option<String> = conn
            .prepare("SELECT project_json FROM projects WHERE id = ?1")?
            .query_row(params![id], |row| row.get(0))
            .optional()?;
        match json {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Err(StoreError::NotFound {
                entity: "project",
                id: id.to_string(),
            }),
        }
    }

    fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT project_json FROM projects ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut projects = Vec::new();
        for json in rows {
            projects.push(serde_json::from_str(&json?)?);
        }
        Ok(projects)
    }

    fn update_project(&self, project: Project) -> StoreResult<()> {
        validation::validate_project(&project)?;
        let conn = self.lock();
        let manager =
            Self::user_by_id(&conn, &project.manager_id)?.ok_or_else(|| StoreError::NotFound {
                entity: "manager",
                id: project.manager_id.clone(),
            })?;
        validation::validate_role(&manager, Role::Manager)?;
        let json = serde_json::to_string(&project)?;
        let updated = conn.execute(
            "UPDATE projects SET manager_id = ?2, project_json = ?3 WHERE id = ?1",
            params![project.id, project.manager_id, json],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound {
                entity: "project",
                id: project.id.clone(),
            });
        }
        Ok(())
    }

    fn delete_project(&self, id: &str) -> StoreResult<usize> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM assignments WHERE project_id = ?1", params![id])?;
        let deleted = tx.execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        if deleted == 0 {
            // Rolls back the assignment deletions when the tx drops.
            return Err(StoreError::NotFound {
                entity: "project",
                id: id.to_string(),
            });
        }
        tx.commit()?;
        debug!(project_id = id, removed, "deleted project with cascading assignments");
        Ok(removed)
    }

    fn create_assignment(&self, assignment: Assignment) -> StoreResult<()> {
        validation::validate_assignment(&assignment)?;
        let conn = self.lock();
        let engineer = Self::user_by_id(&conn, &assignment.engineer_id)?.ok_or_else(|| {
            StoreError::NotFound {
                entity: "engineer",
                id: assignment.engineer_id.clone(),
            }
        })?;
        validation::validate_role(&engineer, Role::Engineer)?;
        if !Self::project_exists(&conn, &assignment.project_id)? {
            return Err(StoreError::NotFound {
                entity: "project",
                id: assignment.project_id.clone(),
            });
        }
        let json = serde_json::to_string(&assignment)?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO assignments (id, engineer_id, project_id, assignment_json) \
             VALUES (?1, ?2, ?3, ?4)",
            params![assignment.id, assignment.engineer_id, assignment.project_id, json],
        )?;
        if inserted == 0 {
            return Err(StoreError::Conflict(format!(
                "duplicate assignment id '{}'",
                assignment.id
            )));
        }
        Ok(())
    }

    fn get_assignment(&self, id: &str) -> StoreResult<Assignment> {
        let conn = self.lock();
        let json: Option<String> = conn
            .prepare("SELECT assignment_json FROM assignments WHERE id = ?1")?
            .query_row(params![id], |row| row.get(0))
            .optional()?;
        match json {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Err(StoreError::NotFound {
                entity: "assignment",
                id: id.to_string(),
            }),
        }
    }

    fn list_assignments(&self) -> StoreResult<Vec<Assignment>> {
        let conn = self.lock();
        Self::collect_assignments(
            &conn,
            "SELECT assignment_json FROM assignments ORDER BY id ASC",
            None,
        )
    }

    fn assignments_for_engineer(&self, engineer_id: &str) -> StoreResult<Vec<Assignment>> {
        let conn = self.lock();
        Self::collect_assignments(
            &conn,
            "SELECT assignment_json FROM assignments WHERE engineer_id = ?1 ORDER BY id ASC",
            Some(engineer_id),
        )
    }

    fn assignments_for_project(&self, project_id: &str) -> StoreResult<Vec<Assignment>> {
        let conn = self.lock();
        Self::collect_assignments(
            &conn,
            "SELECT assignment_json FROM assignments WHERE project_id = ?1 ORDER BY id ASC",
            Some(project_id),
        )
    }
}
