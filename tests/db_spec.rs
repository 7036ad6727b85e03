use publish_launcher::db::Database;
use publish_launcher::models::*;
use publish_launcher::tracker::{ContextResolver, StructureCreator, Tracker};
use speculate2::speculate;

fn create_project(db: &Database, root: Option<&str>) -> Project {
    db.create_project(CreateProjectInput {
        id: None,
        name: "big_buck".to_string(),
        root_path: root.map(str::to_string),
    })
    .expect("Failed to create project")
}

fn create_shot(db: &Database, project_id: i64) -> Entity {
    db.create_entity(CreateEntityInput {
        id: None,
        entity_type: "Shot".to_string(),
        code: "sh010".to_string(),
        project_id: Some(project_id),
    })
    .expect("Failed to create shot")
}

fn create_comp_task(db: &Database, shot: &Entity) -> Task {
    db.create_task(CreateTaskInput {
        id: None,
        content: "comp".to_string(),
        entity_id: Some(shot.id),
        project_id: shot.project_id,
    })
    .expect("Failed to create task")
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "published files" {
        it "round trips the path, task and entity links" {
            let project = create_project(&db, None);
            let shot = create_shot(&db, project.id);
            let task = create_comp_task(&db, &shot);

            let created = db.create_published_file(CreatePublishedFileInput {
                id: Some(1001),
                kind: PublishedFileType::PublishedFile,
                code: Some("comp_v003".to_string()),
                path: PathDescriptor::local("/proj/sh010/comp_v003.nk"),
                task_id: Some(task.id),
                entity: Some(EntityRef::new("Shot", shot.id)),
                project_id: Some(project.id),
            }).expect("Failed to create publish");
            assert_eq!(created.id, 1001);

            let found = db
                .find_published_file(PublishedFileType::PublishedFile, 1001)
                .expect("Query failed")
                .expect("Publish missing");
            assert_eq!(found, created);
            assert_eq!(found.task, Some(EntityRef::new("Task", task.id)));
        }

        it "skips unknown ids and keeps request order" {
            let ids: Vec<i64> = ["/a.ma", "/b.ma"]
                .iter()
                .map(|p| {
                    db.create_published_file(CreatePublishedFileInput {
                        id: None,
                        kind: PublishedFileType::PublishedFile,
                        code: None,
                        path: PathDescriptor::local(*p),
                        task_id: None,
                        entity: None,
                        project_id: None,
                    })
                    .expect("Failed to create publish")
                    .id
                })
                .collect();

            let found = db
                .find_published_files(PublishedFileType::PublishedFile, &[ids[1], 999, ids[0]])
                .expect("Query failed");
            assert_eq!(found.iter().map(|p| p.id).collect::<Vec<_>>(), vec![ids[1], ids[0]]);
        }
    }

    describe "versions" {
        it "returns links in position order" {
            let v = db.create_version(CreateVersionInput {
                id: None,
                code: None,
                project_id: None,
                published_files: vec![30, 10, 20],
                tank_published_file: None,
            }).expect("Failed to create version");

            let found = db.find_version(v.id).expect("Query failed").expect("Version missing");
            assert_eq!(found.published_files, vec![30, 10, 20]);
        }

        it "appends new links once" {
            let v = db.create_version(CreateVersionInput {
                id: None,
                code: None,
                project_id: None,
                published_files: vec![5],
                tank_published_file: None,
            }).expect("Failed to create version");

            assert!(db.link_published_file(v.id, 6).expect("Link failed"));
            assert!(!db.link_published_file(v.id, 6).expect("Link failed"));

            let found = db.find_version(v.id).expect("Query failed").expect("Version missing");
            assert_eq!(found.published_files, vec![5, 6]);
        }

        it "stores the legacy single link" {
            let v = db.create_version(CreateVersionInput {
                id: None,
                code: None,
                project_id: None,
                published_files: vec![],
                tank_published_file: None,
            }).expect("Failed to create version");

            assert!(db.set_tank_published_file(v.id, Some(44)).expect("Update failed"));

            let found = db.find_version(v.id).expect("Query failed").expect("Version missing");
            assert_eq!(found.tank_published_file, Some(44));
            assert_eq!(found.linked_ids(PublishedFileType::TankPublishedFile), vec![44]);
        }

        it "returns None for unknown versions" {
            assert!(db.find_version(12345).expect("Query failed").is_none());
        }
    }

    describe "contexts" {
        it "builds a full context from a task" {
            let project = create_project(&db, None);
            let shot = create_shot(&db, project.id);
            let task = create_comp_task(&db, &shot);

            let ctx = db.context_from_entity("Task", task.id).expect("Context failed");
            assert_eq!(ctx.project, Some(NamedRef::new("Project", project.id, "big_buck")));
            assert_eq!(ctx.entity, Some(NamedRef::new("Shot", shot.id, "sh010")));
            assert_eq!(ctx.task, Some(NamedRef::new("Task", task.id, "comp")));
        }

        it "builds an entity context without a task" {
            let project = create_project(&db, None);
            let shot = create_shot(&db, project.id);

            let ctx = db.context_from_entity("Shot", shot.id).expect("Context failed");
            assert!(ctx.task.is_none());
            assert_eq!(ctx.entity.unwrap().name, "sh010");
            assert_eq!(ctx.project.unwrap().id(), project.id);
        }

        it "errors for an unknown task" {
            assert!(db.context_from_entity("Task", 999).is_err());
        }

        it "infers the project from the deepest matching root" {
            create_project(&db, Some("/mnt/projects"));
            let nested = db.create_project(CreateProjectInput {
                id: None,
                name: "nested".to_string(),
                root_path: Some("/mnt/projects/nested".to_string()),
            }).expect("Failed to create project");

            let ctx = db.context_from_path("/mnt/projects/nested/shots/a.ma").expect("Context failed");
            assert_eq!(ctx.project.unwrap().id(), nested.id);
        }

        it "does not match partial directory names" {
            create_project(&db, Some("/mnt/proj"));

            let ctx = db.context_from_path("/mnt/project_other/a.ma").expect("Context failed");
            assert!(ctx.is_empty());
        }
    }

    describe "folder creation" {
        it "creates task folders under the project root and can repeat" {
            let root = tempfile::tempdir().expect("tempdir");
            let project = create_project(&db, Some(root.path().to_str().unwrap()));
            let shot = create_shot(&db, project.id);
            let task = create_comp_task(&db, &shot);

            db.create_structure("Task", task.id, "tk-nuke").expect("Create failed");
            db.create_structure("Task", task.id, "tk-nuke").expect("Repeat failed");

            assert!(root.path().join("Shot").join("sh010").join("comp").is_dir());
        }

        it "creates entity folders" {
            let root = tempfile::tempdir().expect("tempdir");
            let project = create_project(&db, Some(root.path().to_str().unwrap()));
            let shot = create_shot(&db, project.id);

            db.create_structure("Shot", shot.id, "tk-maya").expect("Create failed");

            assert!(root.path().join("Shot").join("sh010").is_dir());
        }

        it "skips entities without a project root" {
            let project = create_project(&db, None);
            let shot = create_shot(&db, project.id);

            assert!(db.create_structure("Shot", shot.id, "tk-maya").is_ok());
        }

        it "errors for an unknown entity" {
            assert!(db.create_structure("Asset", 404, "tk-maya").is_err());
        }
    }

    describe "import" {
        it "loads a snapshot in dependency order" {
            let summary = db.import_json(r#"{
                "projects": [{ "id": 1, "name": "big_buck", "root_path": "/mnt/big_buck" }],
                "entities": [{ "id": 2, "type": "Shot", "code": "sh010", "project_id": 1 }],
                "tasks": [{ "id": 3, "content": "comp", "entity_id": 2, "project_id": 1 }],
                "published_files": [
                    { "id": 10, "type": "PublishedFile", "path": { "local_path": "/mnt/big_buck/sh010.mov" }, "task_id": 3,
                      "entity": { "type": "Shot", "id": 2 } },
                    { "id": 11, "path": { "url": "file:///mnt/big_buck/sh010.jpg" } }
                ],
                "versions": [{ "id": 20, "published_files": [11, 10] }]
            }"#).expect("Import failed");

            assert_eq!(summary.projects, 1);
            assert_eq!(summary.published_files, 2);
            assert_eq!(summary.versions, 1);

            let version = db.find_version(20).expect("Query failed").expect("Version missing");
            assert_eq!(version.published_files, vec![11, 10]);

            let publish = db
                .find_published_file(PublishedFileType::PublishedFile, 10)
                .expect("Query failed")
                .expect("Publish missing");
            assert_eq!(publish.entity, Some(EntityRef::new("Shot", 2)));
        }

        it "rejects malformed snapshots" {
            assert!(db.import_json("{ \"projects\": 3 }").is_err());
        }
    }
}
