use serde::{Deserialize, Serialize};

use super::EntityRef;

/// Production-tracking coordinates handed to launcher apps.
///
/// Any level may be missing: a context inferred from a path outside every
/// project root is empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LaunchContext {
    pub project: Option<NamedRef>,
    pub entity: Option<NamedRef>,
    pub task: Option<NamedRef>,
}

/// An entity link together with its display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamedRef {
    #[serde(flatten)]
    pub entity: EntityRef,
    pub name: String,
}

impl NamedRef {
    pub fn new(entity_type: impl Into<String>, id: i64, name: impl Into<String>) -> Self {
        Self {
            entity: EntityRef::new(entity_type, id),
            name: name.into(),
        }
    }

    pub fn id(&self) -> i64 {
        self.entity.id
    }
}

impl LaunchContext {
    pub fn is_empty(&self) -> bool {
        self.project.is_none() && self.entity.is_none() && self.task.is_none()
    }
}

impl std::fmt::Display for LaunchContext {
    /// Renders as `Project, Shot sh010, Task comp` style text.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("Empty Context");
        }
        let parts: Vec<String> = [&self.project, &self.entity, &self.task]
            .into_iter()
            .flatten()
            .map(|r| format!("{} {}", r.entity.entity_type, r.name))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_each_known_level() {
        let ctx = LaunchContext {
            project: Some(NamedRef::new("Project", 1, "big_buck")),
            entity: Some(NamedRef::new("Shot", 2, "sh010")),
            task: Some(NamedRef::new("Task", 3, "comp")),
        };
        assert_eq!(ctx.to_string(), "Project big_buck, Shot sh010, Task comp");
    }

    #[test]
    fn displays_empty_context() {
        assert_eq!(LaunchContext::default().to_string(), "Empty Context");
    }
}
