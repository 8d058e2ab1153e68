#![cfg(feature = "sqlite")]

use capacity_tool::{
    Assignment, Project, ProjectStatus, ResourceStore, Role, SqliteResourceStore, StoreError, User,
};
use chrono::NaiveDate;
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn seeded_store() -> (SqliteResourceStore, NamedTempFile) {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteResourceStore::new(file.path()).unwrap();

    let mut manager = User::new("m1", "Morgan", "m1@example.com", Role::Manager);
    manager.department = "Platform".into();
    store.create_user(manager).unwrap();

    let mut engineer = User::new("e1", "Asha", "e1@example.com", Role::Engineer);
    engineer.department = "Platform".into();
    store.create_user(engineer).unwrap();

    let mut project = Project::new("p1", "Billing", "m1");
    project.status = ProjectStatus::Active;
    store.create_project(project).unwrap();

    (store, file)
}

fn assignment(id: &str, project_id: &str) -> Assignment {
    let mut a = Assignment::new(id, "e1", project_id, 50, d(2025, 1, 1), d(2025, 6, 30));
    a.role = "Developer".into();
    a
}

#[test]
fn entity_round_trip_preserves_fields() {
    let (store, _file) = seeded_store();
    store.create_assignment(assignment("a1", "p1")).unwrap();

    let loaded = store.get_assignment("a1").unwrap();
    assert_eq!(loaded.engineer_id, "e1");
    assert_eq!(loaded.allocation_percentage, 50);
    assert_eq!(loaded.start_date, d(2025, 1, 1));
    assert_eq!(loaded.end_date, Some(d(2025, 6, 30)));

    assert_eq!(store.list_users().unwrap().len(), 2);
    assert_eq!(store.assignments_for_engineer("e1").unwrap().len(), 1);
    assert_eq!(store.assignments_for_project("p1").unwrap().len(), 1);
}

#[test]
fn duplicate_email_is_a_conflict() {
    let (store, _file) = seeded_store();
    let mut clashing = User::new("e2", "Blake", "e1@example.com", Role::Engineer);
    clashing.department = "Platform".into();
    assert!(matches!(
        store.create_user(clashing),
        Err(StoreError::Conflict(_))
    ));
}

#[test]
fn dangling_references_are_rejected() {
    let (store, _file) = seeded_store();
    assert!(matches!(
        store.create_assignment(assignment("a1", "ghost")),
        Err(StoreError::NotFound { entity: "project", .. })
    ));

    let orphan_project = Project::new("p2", "Search", "ghost");
    assert!(matches!(
        store.create_project(orphan_project),
        Err(StoreError::NotFound { entity: "manager", .. })
    ));
}

#[test]
fn cascade_delete_removes_dependent_assignments_atomically() {
    let (store, _file) = seeded_store();
    let mut p2 = Project::new("p2", "Search", "m1");
    p2.status = ProjectStatus::Planning;
    store.create_project(p2).unwrap();

    store.create_assignment(assignment("a1", "p1")).unwrap();
    store.create_assignment(assignment("a2", "p1")).unwrap();
    store.create_assignment(assignment("a3", "p1")).unwrap();
    store.create_assignment(assignment("a4", "p2")).unwrap();

    let removed = store.delete_project("p1").unwrap();
    assert_eq!(removed, 3);

    for id in ["a1", "a2", "a3"] {
        assert!(matches!(
            store.get_assignment(id),
            Err(StoreError::NotFound { entity: "assignment", .. })
        ));
    }
    assert!(store.get_assignment("a4").is_ok());
}

#[test]
fn deleting_missing_project_leaves_assignments_intact() {
    let (store, _file) = seeded_store();
    store.create_assignment(assignment("a1", "p1")).unwrap();

    assert!(matches!(
        store.delete_project("ghost"),
        Err(StoreError::NotFound { entity: "project", .. })
    ));
    assert!(store.get_assignment("a1").is_ok());
}

#[test]
fn store_survives_reopen() {
    let file = NamedTempFile::new().unwrap();
    {
        let store = SqliteResourceStore::new(file.path()).unwrap();
        let mut manager = User::new("m1", "Morgan", "m1@example.com", Role::Manager);
        manager.department = "Platform".into();
        store.create_user(manager).unwrap();
    }

    let reopened = SqliteResourceStore::new(file.path()).unwrap();
    assert_eq!(reopened.get_user("m1").unwrap().name, "Morgan");
}
