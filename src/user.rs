use serde::{Deserialize, Serialize};

/// Role carried by every user record and by every issued credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Engineer,
    Manager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Engineer => "engineer",
            Role::Manager => "manager",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "engineer" => Some(Role::Engineer),
            "manager" => Some(Role::Manager),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seniority {
    Junior,
    Mid,
    Senior,
}

impl Seniority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Seniority::Junior => "junior",
            Seniority::Mid => "mid",
            Seniority::Senior => "senior",
        }
    }
}

/// A user of the system. Engineers participate in allocation math via
/// `max_capacity`; managers only carry organizational metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub role: Role,
    pub seniority: Seniority,
    /// Ceiling on total concurrent allocation, 0-100 (e.g. 50 for part-time).
    pub max_capacity: i32,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            department: String::new(),
            role,
            seniority: Seniority::Mid,
            max_capacity: 100,
            skills: Vec::new(),
        }
    }

    pub fn is_engineer(&self) -> bool {
        self.role == Role::Engineer
    }

    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }
}
