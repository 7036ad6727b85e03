//! Dispatch chain and full pipeline tests with recording collaborators.

use std::cell::RefCell;

use publish_launcher::config::{ExtensionPolicy, LauncherConfig};
use publish_launcher::db::Database;
use publish_launcher::launch::*;
use publish_launcher::models::*;
use publish_launcher::pipeline::PublishLauncher;
use publish_launcher::tracker::ContextResolver;
use publish_launcher::LaunchError;

#[derive(Default)]
struct RecordingShell {
    commands: RefCell<Vec<String>>,
    exit_code: i32,
}

impl ShellRunner for RecordingShell {
    fn run_shell(&self, command: &str) -> Result<i32, LaunchError> {
        self.commands.borrow_mut().push(command.to_string());
        Ok(self.exit_code)
    }
}

#[derive(Default)]
struct RecordingContexts {
    calls: RefCell<Vec<String>>,
}

impl ContextResolver for RecordingContexts {
    fn context_from_entity(&self, entity_type: &str, id: i64) -> anyhow::Result<LaunchContext> {
        self.calls.borrow_mut().push(format!("entity {} {}", entity_type, id));
        Ok(LaunchContext {
            task: Some(NamedRef::new(entity_type, id, "comp")),
            ..Default::default()
        })
    }

    fn context_from_path(&self, path: &str) -> anyhow::Result<LaunchContext> {
        self.calls.borrow_mut().push(format!("path {}", path));
        Ok(LaunchContext::default())
    }
}

enum HookReply {
    Launched,
    Declined,
    Fails,
}

struct RecordingHook {
    reply: HookReply,
    calls: RefCell<Vec<(String, LaunchContext, Option<EntityRef>)>>,
}

impl RecordingHook {
    fn new(reply: HookReply) -> Self {
        Self {
            reply,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl LaunchHook for RecordingHook {
    fn launch(
        &self,
        path: &str,
        context: &LaunchContext,
        associated_entity: Option<&EntityRef>,
    ) -> Result<bool, LaunchError> {
        self.calls.borrow_mut().push((
            path.to_string(),
            context.clone(),
            associated_entity.cloned(),
        ));
        match self.reply {
            HookReply::Launched => Ok(true),
            HookReply::Declined => Ok(false),
            HookReply::Fails => Err(LaunchError::CollaboratorLaunch(
                "the tk-shotgun-launchnuke app could not be found in the environment".to_string(),
            )),
        }
    }
}

fn publish_at(path: &str) -> PublishedFile {
    PublishedFile {
        id: 1,
        kind: PublishedFileType::PublishedFile,
        code: None,
        path: PathDescriptor::local(path),
        task: None,
        entity: None,
    }
}

fn existing_file(dir: &tempfile::TempDir, name: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, b"").expect("Failed to write file");
    path.to_string_lossy().into_owned()
}

fn chain<'a>(
    extensions: &'a ExtensionPolicy,
    viewer_path: Option<&'a str>,
    shell: &'a RecordingShell,
    contexts: &'a RecordingContexts,
    hook: &'a RecordingHook,
) -> DispatchChain<'a> {
    DispatchChain {
        platform: Platform::Linux,
        viewer_extensions: extensions,
        viewer_path,
        shell,
        contexts,
        hook,
    }
}

mod viewer {
    use super::*;

    #[test]
    fn launches_viewer_without_checking_existence() {
        let extensions = ExtensionPolicy::new(["exr", "jpg"]);
        let shell = RecordingShell::default();
        let contexts = RecordingContexts::default();
        let hook = RecordingHook::new(HookReply::Launched);

        let path = "/does/not/exist/sh010.%04d.exr";
        let outcome = chain(&extensions, Some("/opt/rv/bin/rv"), &shell, &contexts, &hook)
            .dispatch(path, &publish_at(path))
            .expect("dispatch failed");

        assert_eq!(outcome, LaunchOutcome::Viewer);
        assert_eq!(
            *shell.commands.borrow(),
            vec!["/opt/rv/bin/rv \"/does/not/exist/sh010.%04d.exr\" &".to_string()]
        );
        assert!(hook.calls.borrow().is_empty());
        assert!(contexts.calls.borrow().is_empty());
    }

    #[test]
    fn missing_viewer_configuration_is_an_error() {
        let extensions = ExtensionPolicy::new(["exr"]);
        let shell = RecordingShell::default();
        let contexts = RecordingContexts::default();
        let hook = RecordingHook::new(HookReply::Launched);

        let err = chain(&extensions, None, &shell, &contexts, &hook)
            .dispatch("/s/a.exr", &publish_at("/s/a.exr"))
            .unwrap_err();

        assert!(matches!(err, LaunchError::MissingViewerConfiguration(_)));
        assert!(shell.commands.borrow().is_empty());
    }

    #[test]
    fn non_zero_exit_code_keeps_the_outcome() {
        let extensions = ExtensionPolicy::new(["exr"]);
        let shell = RecordingShell {
            exit_code: 127,
            ..Default::default()
        };
        let contexts = RecordingContexts::default();
        let hook = RecordingHook::new(HookReply::Launched);

        let outcome = chain(&extensions, Some("/bad/rv"), &shell, &contexts, &hook)
            .dispatch("/s/a.exr", &publish_at("/s/a.exr"))
            .expect("dispatch failed");

        assert_eq!(outcome, LaunchOutcome::Viewer);
    }
}

mod existence {
    use super::*;

    #[test]
    fn missing_file_never_reaches_the_hook() {
        let extensions = ExtensionPolicy::new(["exr"]);
        let shell = RecordingShell::default();
        let contexts = RecordingContexts::default();
        let hook = RecordingHook::new(HookReply::Launched);

        let outcome = chain(&extensions, Some("/opt/rv"), &shell, &contexts, &hook)
            .dispatch("/does/not/exist/comp.nk", &publish_at("/does/not/exist/comp.nk"))
            .expect("dispatch failed");

        assert_eq!(outcome, LaunchOutcome::MissingOnDisk);
        assert!(!outcome.launched());
        assert!(hook.calls.borrow().is_empty());
        assert!(shell.commands.borrow().is_empty());
    }
}

mod hook {
    use super::*;

    #[test]
    fn hook_launch_ends_the_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = existing_file(&dir, "comp.nk");
        let extensions = ExtensionPolicy::new(["exr"]);
        let shell = RecordingShell::default();
        let contexts = RecordingContexts::default();
        let hook = RecordingHook::new(HookReply::Launched);

        let mut publish = publish_at(&path);
        publish.task = Some(EntityRef::new("Task", 55));
        publish.entity = Some(EntityRef::new("Shot", 9));

        let outcome = chain(&extensions, None, &shell, &contexts, &hook)
            .dispatch(&path, &publish)
            .expect("dispatch failed");

        assert_eq!(outcome, LaunchOutcome::Hook);
        assert!(shell.commands.borrow().is_empty());
        assert_eq!(*contexts.calls.borrow(), vec!["entity Task 55".to_string()]);

        let calls = hook.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, path);
        assert_eq!(calls[0].1.task.as_ref().unwrap().entity.id, 55);
        assert_eq!(calls[0].2, Some(EntityRef::new("Shot", 9)));
    }

    #[test]
    fn context_falls_back_to_the_path_without_a_task() {
        let dir = tempfile::tempdir().unwrap();
        let path = existing_file(&dir, "comp.nk");
        let extensions = ExtensionPolicy::default();
        let shell = RecordingShell::default();
        let contexts = RecordingContexts::default();
        let hook = RecordingHook::new(HookReply::Launched);

        chain(&extensions, None, &shell, &contexts, &hook)
            .dispatch(&path, &publish_at(&path))
            .expect("dispatch failed");

        assert_eq!(*contexts.calls.borrow(), vec![format!("path {}", path)]);
    }

    #[test]
    fn declined_hook_falls_back_to_default_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = existing_file(&dir, "notes.pdf");
        let extensions = ExtensionPolicy::new(["exr"]);
        let shell = RecordingShell::default();
        let contexts = RecordingContexts::default();
        let hook = RecordingHook::new(HookReply::Declined);

        let outcome = chain(&extensions, None, &shell, &contexts, &hook)
            .dispatch(&path, &publish_at(&path))
            .expect("dispatch failed");

        assert_eq!(outcome, LaunchOutcome::DefaultOpen);
        assert_eq!(*shell.commands.borrow(), vec![format!("xdg-open \"{}\"", path)]);
    }

    #[test]
    fn hook_errors_are_surfaced_without_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = existing_file(&dir, "comp.nk");
        let extensions = ExtensionPolicy::new(["exr"]);
        let shell = RecordingShell::default();
        let contexts = RecordingContexts::default();
        let hook = RecordingHook::new(HookReply::Fails);

        let err = chain(&extensions, None, &shell, &contexts, &hook)
            .dispatch(&path, &publish_at(&path))
            .unwrap_err();

        assert!(matches!(err, LaunchError::CollaboratorLaunch(_)));
        assert!(shell.commands.borrow().is_empty());
    }
}

mod pipeline {
    use super::*;

    fn seeded_db() -> Database {
        let db = Database::open_memory().expect("Failed to create database");
        db.migrate().expect("Failed to migrate");
        db
    }

    #[test]
    fn selection_errors_abort_before_any_launch() {
        let db = seeded_db();
        let config = LauncherConfig::default();
        let shell = RecordingShell::default();
        let contexts = RecordingContexts::default();
        let hook = RecordingHook::new(HookReply::Launched);

        let launcher = PublishLauncher {
            config: &config,
            platform: Platform::Linux,
            tracker: &db,
            contexts: &contexts,
            shell: &shell,
            hook: &hook,
        };

        let err = launcher.launch_publish("Version", &[1, 2]).unwrap_err();
        assert!(matches!(err, LaunchError::UnsupportedBatchSize(2)));
        assert!(shell.commands.borrow().is_empty());
        assert!(hook.calls.borrow().is_empty());
    }

    #[test]
    fn version_with_review_media_opens_in_the_viewer() {
        let db = seeded_db();
        let mov = db
            .create_published_file(CreatePublishedFileInput {
                id: None,
                kind: PublishedFileType::PublishedFile,
                code: None,
                path: PathDescriptor::url("file:///proj/review%20cut.mov"),
                task_id: None,
                entity: None,
                project_id: None,
            })
            .unwrap();
        let nk = db
            .create_published_file(CreatePublishedFileInput {
                id: None,
                kind: PublishedFileType::PublishedFile,
                code: None,
                path: PathDescriptor::local("/proj/comp.nk"),
                task_id: None,
                entity: None,
                project_id: None,
            })
            .unwrap();
        let version = db
            .create_version(CreateVersionInput {
                id: None,
                code: None,
                project_id: None,
                published_files: vec![nk.id, mov.id],
                tank_published_file: None,
            })
            .unwrap();

        let config = LauncherConfig {
            viewer_path_linux: Some("/opt/rv/bin/rv".to_string()),
            ..Default::default()
        };
        let shell = RecordingShell::default();
        let contexts = RecordingContexts::default();
        let hook = RecordingHook::new(HookReply::Launched);

        let launcher = PublishLauncher {
            config: &config,
            platform: Platform::Linux,
            tracker: &db,
            contexts: &contexts,
            shell: &shell,
            hook: &hook,
        };

        let report = launcher
            .launch_publish("Version", &[version.id])
            .expect("launch failed");

        assert_eq!(report.publish_id, mov.id);
        assert_eq!(report.path, "/proj/review cut.mov");
        assert_eq!(report.outcome, LaunchOutcome::Viewer);
        assert_eq!(
            *shell.commands.borrow(),
            vec!["/opt/rv/bin/rv \"/proj/review cut.mov\" &".to_string()]
        );
    }
}
