mod common;

use common::{at, project, prompt, task, Harness, MockGateway};
use promptlog_core::Severity;
use promptlog_tui::context::{EditState, PromptDraft, Selection};
use promptlog_tui::controller::NEW_PROMPT_TITLE;
use promptlog_types::{SearchResult, EMPTY_CONTENT_PLACEHOLDER};

fn seeded() -> MockGateway {
    MockGateway::new()
        .with_projects(vec![project(1, "Docs"), project(2, "Blog")])
        .with_tasks(vec![task(10, 1, "Intro"), task(11, 1, "Outro"), task(20, 2, "Draft")])
        .with_prompts(vec![prompt(100, 10, "write an intro"), prompt(101, 10, "shorter")])
}

#[tokio::test]
async fn test_load_projects_fills_store_and_clears_loading() {
    let h = Harness::new(seeded(), &[]);
    assert!(h.controller.load_projects().await);

    let state = h.store().snapshot();
    assert_eq!(state.projects.len(), 2);
    assert!(!state.loading);
    assert!(!state.has_tasks_loaded(1));
}

#[tokio::test]
async fn test_failed_create_leaves_store_untouched_and_reports() {
    let h = Harness::new(seeded(), &[]);
    h.controller.load_projects().await;
    let before = h.store().snapshot();

    h.gateway.fail("create_project");
    assert!(h.controller.create_project("Notes").await.is_none());

    assert_eq!(h.store().snapshot(), before);
    let notes = h.notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].severity, Severity::Error);
    assert!(notes[0].message.starts_with("Failed to create project"));
}

#[tokio::test]
async fn test_failed_rename_keeps_old_name() {
    let h = Harness::new(seeded(), &[]);
    h.controller.load_projects().await;
    h.gateway.fail("update_project");

    assert!(!h.controller.rename_project(1, "Manual").await);
    assert_eq!(h.store().read(|s| s.project(1).map(|p| p.name.clone())), Some("Docs".to_string()));
    assert_eq!(h.notifications()[0].severity, Severity::Error);
}

#[tokio::test]
async fn test_blank_names_never_reach_the_backend() {
    let h = Harness::new(seeded(), &[]);

    assert!(h.controller.create_project("   ").await.is_none());
    assert!(!h.controller.rename_project(1, "").await);
    assert!(h.controller.create_task(1, " \t", None).await.is_none());
    assert!(!h.controller.rename_task(10, "  ").await);

    assert!(h.gateway.calls().is_empty());
    assert!(h.notifications().is_empty());
}

#[tokio::test]
async fn test_create_project_selects_and_expands_it() {
    let h = Harness::new(seeded(), &[]);
    h.controller.load_projects().await;

    let created = h.controller.create_project("  Notes  ").await.unwrap();
    assert_eq!(created.name, "Notes");

    let state = h.store().snapshot();
    assert_eq!(state.selection.project, Some(created.id));
    assert!(state.has_tasks_loaded(created.id));
    assert!(h.controller.is_expanded(created.id));
    assert_eq!(h.notifications().last().map(|n| n.message.as_str()), Some("Project created"));
}

#[tokio::test]
async fn test_rename_task_mirrors_with_timestamp() {
    let h = Harness::new(seeded(), &[]);
    h.controller.load_projects().await;
    h.controller.select_project(1).await;

    assert!(h.controller.rename_task(10, " Opening ").await);
    let renamed = h.store().read(|s| s.task(10).cloned()).unwrap();
    assert_eq!(renamed.name, "Opening");
    assert!(renamed.updated_at.is_some());
}

#[tokio::test]
async fn test_declined_delete_makes_no_call() {
    let h = Harness::new(seeded(), &[false]);
    h.controller.load_projects().await;
    h.gateway.clear_calls();

    assert!(!h.controller.delete_project(1).await);

    assert_eq!(h.gateway.calls_to("delete_project"), 0);
    assert_eq!(h.confirmer.asked().len(), 1);
    assert!(h.notifications().is_empty());
    assert!(h.store().read(|s| s.has_project(1)));
}

#[tokio::test]
async fn test_confirmed_project_delete_cascades_selection() {
    let h = Harness::new(seeded(), &[true]);
    h.controller.load_projects().await;
    h.controller.select_project(1).await;
    h.controller.select_task(10).await;
    h.controller.select_prompt(Some(100));

    assert!(h.controller.delete_project(1).await);

    let state = h.store().snapshot();
    assert!(!state.has_project(1));
    assert!(!state.has_tasks_loaded(1));
    assert!(!state.has_prompts_loaded(10));
    assert_eq!(state.selection, Selection::default());
    assert!(!h.controller.is_expanded(1));
    assert_eq!(h.notifications()[0].severity, Severity::Success);
}

#[tokio::test]
async fn test_failed_delete_after_confirmation_keeps_task() {
    let h = Harness::new(seeded(), &[true]);
    h.controller.load_projects().await;
    h.controller.select_project(1).await;
    h.gateway.fail("delete_task");

    assert!(!h.controller.delete_task(10).await);
    assert!(h.store().read(|s| s.task(10).is_some()));
    assert_eq!(h.notifications()[0].severity, Severity::Error);
}

#[tokio::test]
async fn test_select_project_loads_tasks_once() {
    let h = Harness::new(seeded(), &[]);
    h.controller.load_projects().await;

    h.controller.select_project(1).await;
    h.controller.select_project(2).await;
    h.controller.select_project(1).await;

    assert_eq!(h.gateway.calls_to("get_tasks"), 2);
    assert_eq!(h.store().read(|s| s.tasks_for(1).len()), 2);
}

#[tokio::test]
async fn test_select_task_moves_project_selection() {
    let h = Harness::new(seeded(), &[]);
    h.controller.load_projects().await;
    h.controller.load_tasks(1).await;
    h.controller.load_tasks(2).await;
    h.controller.select_project(2).await;

    h.controller.select_task(10).await;

    let selection = h.store().selection();
    assert_eq!(selection.project, Some(1));
    assert_eq!(selection.task, Some(10));
    assert!(h.store().read(|s| s.has_prompts_loaded(10)));
}

#[tokio::test]
async fn test_create_task_in_unloaded_project_fetches_whole_list() {
    let h = Harness::new(seeded(), &[]);
    h.controller.load_projects().await;

    let created = h.controller.create_task(1, "Summary", Some("  ")).await.unwrap();

    assert_eq!(created.description, None);
    let ids: Vec<i64> = h.store().read(|s| s.tasks_for(1).iter().map(|t| t.id).collect());
    assert_eq!(ids, vec![10, 11, created.id]);
    let selection = h.store().selection();
    assert_eq!(selection.project, Some(1));
    assert_eq!(selection.task, Some(created.id));
    assert!(h.controller.is_expanded(1));
}

#[tokio::test]
async fn test_create_prompt_uses_placeholder_and_selects_it() {
    let h = Harness::new(seeded(), &[]);
    h.controller.load_projects().await;
    h.controller.select_project(1).await;
    h.controller.select_task(10).await;

    let entry = h.controller.create_prompt(10).await.unwrap();

    assert_eq!(entry.title.as_deref(), Some(NEW_PROMPT_TITLE));
    assert_eq!(entry.content, EMPTY_CONTENT_PLACEHOLDER);
    assert_eq!(h.store().selection().prompt, Some(entry.id));
    assert_eq!(h.store().read(|s| s.prompts_for(10).len()), 3);
}

#[tokio::test]
async fn test_save_prompt_is_silent_and_substitutes_placeholder() {
    let h = Harness::new(seeded(), &[]);
    h.controller.load_projects().await;
    h.controller.select_project(1).await;
    h.controller.select_task(10).await;

    let entry = h.store().read(|s| s.prompt(100).cloned()).unwrap();
    let mut draft = PromptDraft::from_entry(&entry);
    draft.title = "Intro prompt".to_string();
    draft.content.clear();
    draft.tags = "docs, , intro".to_string();

    assert!(h.controller.save_prompt(100, &draft).await);

    let saved = h.store().read(|s| s.prompt(100).cloned()).unwrap();
    assert_eq!(saved.title.as_deref(), Some("Intro prompt"));
    assert_eq!(saved.content, EMPTY_CONTENT_PLACEHOLDER);
    assert_eq!(saved.tags, Some(vec!["docs".to_string(), "intro".to_string()]));
    assert!(saved.updated_at.is_some());
    assert!(h.notifications().is_empty());
}

#[tokio::test]
async fn test_leaving_the_editor_saves_the_open_draft() {
    let h = Harness::new(seeded(), &[]);
    h.controller.load_projects().await;
    h.controller.select_project(1).await;
    h.controller.select_task(10).await;
    h.controller.select_prompt(Some(100));

    let entry = h.store().read(|s| s.prompt(100).cloned()).unwrap();
    let mut edit = EditState::new();
    edit.begin(entry.id, PromptDraft::from_entry(&entry));
    edit.draft_mut().unwrap().content = "edited before switching".to_string();

    // The user moves to another prompt while the draft is open.
    let save = h.controller.blur_prompt_edit(&mut edit).unwrap();
    h.controller.select_prompt(Some(101));
    assert!(!edit.is_active());
    assert!(save.await);

    assert_eq!(h.gateway.calls_to("update_prompt_entry"), 1);
    assert_eq!(
        h.store().read(|s| s.prompt(100).map(|p| p.content.clone())),
        Some("edited before switching".to_string())
    );
    assert_eq!(h.store().selection().prompt, Some(101));
    assert!(h.controller.blur_prompt_edit(&mut edit).is_none());
}

#[tokio::test]
async fn test_failed_save_reports_error() {
    let h = Harness::new(seeded(), &[]);
    h.controller.load_projects().await;
    h.controller.select_project(1).await;
    h.controller.select_task(10).await;
    h.gateway.fail("update_prompt_entry");

    let entry = h.store().read(|s| s.prompt(100).cloned()).unwrap();
    let mut draft = PromptDraft::from_entry(&entry);
    draft.content = "changed".to_string();

    assert!(!h.controller.save_prompt(100, &draft).await);
    assert_eq!(h.store().read(|s| s.prompt(100).cloned()), Some(entry));
    assert_eq!(h.notifications()[0].severity, Severity::Error);
}

#[tokio::test]
async fn test_focus_search_result_loads_each_level_in_order() {
    let h = Harness::new(seeded(), &[]);
    h.controller.load_projects().await;
    h.gateway.clear_calls();

    let hit = SearchResult {
        project_id: 1,
        task_id: 10,
        prompt_id: 101,
        project_name: "Docs".into(),
        task_name: "Intro".into(),
        snippet: "shorter".into(),
        created_at: at(101),
    };
    h.controller.focus_search_result(&hit).await;

    assert_eq!(h.gateway.calls(), vec!["get_tasks", "get_prompt_entries"]);
    let state = h.store().snapshot();
    assert_eq!(
        state.selection,
        Selection {
            project: Some(1),
            task: Some(10),
            prompt: Some(101),
        }
    );
    assert!(!state.search_open);
    assert!(h.controller.is_expanded(1));

    h.gateway.clear_calls();
    h.controller.focus_search_result(&hit).await;
    assert!(h.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_import_resets_then_reloads() {
    let h = Harness::new(seeded(), &[true]);
    h.controller.load_projects().await;
    h.controller.select_project(1).await;
    h.controller.select_task(10).await;
    h.gateway.clear_calls();

    assert!(h.controller.import_data("/tmp/backup.json").await);

    assert_eq!(h.gateway.calls(), vec!["import_data", "get_projects"]);
    let state = h.store().snapshot();
    assert_eq!(state.projects.len(), 2);
    assert!(state.tasks_by_project.is_empty());
    assert_eq!(state.selection, Selection::default());
    assert!(h.controller.expanded_projects().is_empty());
}

#[tokio::test]
async fn test_declined_import_is_silent() {
    let h = Harness::new(seeded(), &[false]);

    assert!(!h.controller.import_data("/tmp/backup.json").await);
    assert!(h.gateway.calls().is_empty());
    assert!(h.notifications().is_empty());
}

#[tokio::test]
async fn test_export_reports_target_path() {
    let h = Harness::new(seeded(), &[]);

    assert!(h.controller.export_data(" /tmp/out.json ").await);
    assert_eq!(
        h.notifications()[0].message,
        "Exported to /tmp/out.json"
    );
    assert!(!h.controller.export_data("  ").await);
    assert_eq!(h.gateway.calls_to("export_data"), 1);
}
