use serde::{Deserialize, Serialize};

/// A tracked project. `root_path` is where its files live on this machine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub root_path: Option<String>,
}

/// A shot, asset or other production entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entity {
    pub id: i64,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub code: String,
    pub project_id: Option<i64>,
}

/// A pipeline step assignment on an entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: i64,
    pub content: String,
    pub entity_id: Option<i64>,
    pub project_id: Option<i64>,
}

/// Input for creating a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectInput {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub root_path: Option<String>,
}

/// Input for creating a production entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEntityInput {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub code: String,
    #[serde(default)]
    pub project_id: Option<i64>,
}

/// Input for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskInput {
    #[serde(default)]
    pub id: Option<i64>,
    pub content: String,
    #[serde(default)]
    pub entity_id: Option<i64>,
    #[serde(default)]
    pub project_id: Option<i64>,
}
