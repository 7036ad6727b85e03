use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::Database;
use crate::models::*;

/// A JSON export of tracking records, loaded in dependency order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingSnapshot {
    pub projects: Vec<CreateProjectInput>,
    pub entities: Vec<CreateEntityInput>,
    pub tasks: Vec<CreateTaskInput>,
    pub published_files: Vec<CreatePublishedFileInput>,
    pub versions: Vec<CreateVersionInput>,
}

/// How many records of each kind an import wrote.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportSummary {
    pub projects: usize,
    pub entities: usize,
    pub tasks: usize,
    pub published_files: usize,
    pub versions: usize,
}

impl Database {
    pub fn import_snapshot(&self, snapshot: TrackingSnapshot) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();

        for project in snapshot.projects {
            let name = project.name.clone();
            self.create_project(project)
                .with_context(|| format!("Failed to import project '{}'", name))?;
            summary.projects += 1;
        }
        for entity in snapshot.entities {
            let label = format!("{} '{}'", entity.entity_type, entity.code);
            self.create_entity(entity)
                .with_context(|| format!("Failed to import {}", label))?;
            summary.entities += 1;
        }
        for task in snapshot.tasks {
            let content = task.content.clone();
            self.create_task(task)
                .with_context(|| format!("Failed to import task '{}'", content))?;
            summary.tasks += 1;
        }
        for publish in snapshot.published_files {
            let id = publish.id;
            self.create_published_file(publish)
                .with_context(|| format!("Failed to import published file {:?}", id))?;
            summary.published_files += 1;
        }
        for version in snapshot.versions {
            let id = version.id;
            self.create_version(version)
                .with_context(|| format!("Failed to import version {:?}", id))?;
            summary.versions += 1;
        }

        tracing::info!(
            "Imported {} projects, {} entities, {} tasks, {} published files, {} versions",
            summary.projects,
            summary.entities,
            summary.tasks,
            summary.published_files,
            summary.versions
        );
        Ok(summary)
    }

    pub fn import_json(&self, json: &str) -> Result<ImportSummary> {
        let snapshot: TrackingSnapshot =
            serde_json::from_str(json).context("Failed to parse tracking snapshot")?;
        self.import_snapshot(snapshot)
    }
}
