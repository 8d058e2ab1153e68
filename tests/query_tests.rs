use capacity_tool::{
    Assignment, Availability, Project, ProjectStatus, QueryError, Role, User, UtilizationBand,
    engineer_with_utilization, project_roster, team_utilization_summary,
};
use chrono::NaiveDate;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn engineer(id: &str, name: &str, max_capacity: i32) -> User {
    let mut user = User::new(id, name, format!("{id}@example.com"), Role::Engineer);
    user.max_capacity = max_capacity;
    user
}

fn project(id: &str, name: &str, status: ProjectStatus) -> Project {
    let mut p = Project::new(id, name, "m1");
    p.status = status;
    p
}

fn assignment(
    id: &str,
    engineer_id: &str,
    project_id: &str,
    pct: i32,
    start: NaiveDate,
    end: NaiveDate,
) -> Assignment {
    let mut a = Assignment::new(id, engineer_id, project_id, pct, start, end);
    a.role = "Developer".into();
    a
}

fn fixture() -> (Vec<User>, Vec<Project>, Vec<Assignment>) {
    let engineers = vec![
        engineer("e1", "Asha", 100),
        engineer("e2", "Blake", 50),
        engineer("e3", "Chidi", 100),
    ];
    let projects = vec![
        project("p1", "Billing", ProjectStatus::Active),
        project("p2", "Search", ProjectStatus::Planning),
        project("p3", "Archive", ProjectStatus::Completed),
    ];
    let assignments = vec![
        assignment("a1", "e1", "p1", 70, d(2025, 1, 1), d(2025, 7, 31)),
        assignment("a2", "e1", "p2", 30, d(2025, 2, 1), d(2025, 9, 30)),
        assignment("a3", "e2", "p1", 50, d(2025, 1, 1), d(2025, 6, 30)),
        // Historic assignment, inactive at the reference date.
        assignment("a4", "e1", "p3", 40, d(2024, 1, 1), d(2024, 12, 31)),
    ];
    (engineers, projects, assignments)
}

#[test]
fn enriches_engineer_with_all_derived_fields() {
    let (engineers, projects, assignments) = fixture();
    let at = d(2025, 6, 1);

    let enriched =
        engineer_with_utilization(&engineers[0], &assignments, &projects, at).unwrap();

    assert_eq!(enriched.assignments.len(), 3);
    assert_eq!(enriched.active_assignments.len(), 2);
    assert_eq!(enriched.current_allocation, 100);
    assert_eq!(enriched.available_capacity, 0);
    assert_eq!(enriched.utilization_band, UtilizationBand::Critical);
    assert_eq!(enriched.available_from, Availability::From(d(2025, 10, 1)));

    // Most recent start first, with project details resolved.
    assert_eq!(enriched.active_assignments[0].assignment.id, "a2");
    assert_eq!(enriched.active_assignments[0].project_name, "Search");
    assert_eq!(enriched.active_assignments[1].project_status, ProjectStatus::Active);
}

#[test]
fn dangling_project_reference_is_a_query_error() {
    let (engineers, _, assignments) = fixture();
    let err = engineer_with_utilization(&engineers[0], &assignments, &[], d(2025, 6, 1))
        .unwrap_err();
    assert!(matches!(err, QueryError::NotFound { entity: "project", .. }));
}

#[test]
fn roster_lists_assigned_engineers_with_per_project_allocation() {
    let (engineers, projects, assignments) = fixture();

    let roster = project_roster(&projects[0], &assignments, &engineers).unwrap();
    assert_eq!(roster.members.len(), 2);
    let ids: Vec<&str> = roster.members.iter().map(|m| m.engineer.id.as_str()).collect();
    assert!(ids.contains(&"e1"));
    assert!(ids.contains(&"e2"));
    for member in &roster.members {
        assert_eq!(member.allocation_percentage, if member.engineer.id == "e1" { 70 } else { 50 });
        assert_eq!(member.assignment_role, "Developer");
    }
}

#[test]
fn roster_with_unknown_engineer_is_a_query_error() {
    let (_, projects, assignments) = fixture();
    let err = project_roster(&projects[0], &assignments, &[]).unwrap_err();
    assert!(matches!(err, QueryError::NotFound { entity: "engineer", .. }));
}

#[test]
fn team_summary_covers_every_engineer_and_counts_statuses() {
    let (engineers, projects, assignments) = fixture();
    let at = d(2025, 6, 1);

    let summary = team_utilization_summary(&engineers, &assignments, &projects, at);

    assert_eq!(summary.rows.len(), 3);
    let e3 = summary.rows.iter().find(|r| r.engineer_id == "e3").unwrap();
    assert_eq!(e3.current_allocation, 0);
    assert_eq!(e3.utilization_percent, 0.0);
    assert_eq!(e3.utilization_band, UtilizationBand::VeryLow);

    let e2 = summary.rows.iter().find(|r| r.engineer_id == "e2").unwrap();
    assert_eq!(e2.current_allocation, 50);
    assert_eq!(e2.utilization_band, UtilizationBand::Critical);

    assert_eq!(summary.status_counts[&ProjectStatus::Planning], 1);
    assert_eq!(summary.status_counts[&ProjectStatus::Active], 1);
    assert_eq!(summary.status_counts[&ProjectStatus::Completed], 1);
}

#[test]
fn team_summary_excludes_managers_from_rows() {
    let (mut engineers, projects, assignments) = fixture();
    engineers.push(User::new("m1", "Morgan", "m1@example.com", Role::Manager));

    let summary = team_utilization_summary(&engineers, &assignments, &projects, d(2025, 6, 1));
    assert!(summary.rows.iter().all(|r| r.engineer_id != "m1"));
}

#[test]
fn enriched_engineer_serializes_numeric_percentages() {
    let (engineers, projects, assignments) = fixture();
    let enriched =
        engineer_with_utilization(&engineers[1], &assignments, &projects, d(2025, 6, 1)).unwrap();

    let value = serde_json::to_value(&enriched).unwrap();
    assert!(value["utilization_percent"].is_number());
    assert!(value["current_allocation"].is_number());
    assert_eq!(value["utilization_band"], serde_json::json!("critical"));
}
