use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use promptlog_config::Config;
use promptlog_core::{Bus, Notifier, Severity};
use promptlog_tui::api::SearchRequest;
use promptlog_tui::controller::IMPORT_CONFIRMATION;
use promptlog_tui::search::highlight;
use promptlog_tui::{AssumeYes, Confirmer, Controller, Gateway, Store};
use promptlog_types::{Project, SearchResult};

use crate::cli::OutputFormat;

const ANSI_RESET: &str = "\x1b[0m";
const ANSI_BOLD_YELLOW: &str = "\x1b[1;33m";
const ANSI_DIM: &str = "\x1b[90m";

pub(crate) async fn list_projects(gateway: Arc<dyn Gateway>, format: OutputFormat) -> anyhow::Result<()> {
    let projects = gateway.list_projects().await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&projects)?),
        OutputFormat::Table => print!("{}", project_table(&projects)),
    }
    Ok(())
}

fn project_table(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "No projects.\n".to_string();
    }
    let mut out = format!("{:<8} {:<40} {}\n", "ID", "Name", "Created");
    for project in projects {
        out.push_str(&format!(
            "{:<8} {:<40} {}\n",
            project.id,
            project.name,
            project.created_at.format("%Y-%m-%d %H:%M")
        ));
    }
    out
}

pub(crate) async fn search(
    gateway: Arc<dyn Gateway>,
    config: &Config,
    keyword: &str,
    project_id: Option<i64>,
    task_id: Option<i64>,
    limit: Option<u32>,
) -> anyhow::Result<()> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        anyhow::bail!("Search keyword must not be empty");
    }
    let request = SearchRequest {
        keyword: keyword.to_string(),
        project_id,
        task_id,
        limit: Some(limit.unwrap_or_else(|| config.search_limit())),
    };
    let results = gateway.search_prompt_entries(request).await?;
    if results.is_empty() {
        println!("No matches for \"{keyword}\".");
        return Ok(());
    }
    let color = io::stdout().is_terminal();
    for result in &results {
        println!("{}", format_result(result, keyword, color));
    }
    Ok(())
}

fn format_result(result: &SearchResult, keyword: &str, color: bool) -> String {
    let header = format!(
        "#{} {} · {}",
        result.prompt_id,
        result.breadcrumb(),
        result.created_at.format("%Y-%m-%d")
    );
    let snippet: String = highlight(&result.snippet.replace('\n', " "), keyword)
        .into_iter()
        .map(|span| match (span.matched, color) {
            (true, true) => format!("{ANSI_BOLD_YELLOW}{}{ANSI_RESET}", span.text),
            (true, false) => format!("[{}]", span.text),
            (false, _) => span.text,
        })
        .collect();
    if color {
        format!("{ANSI_DIM}{header}{ANSI_RESET}\n  {snippet}")
    } else {
        format!("{header}\n  {snippet}")
    }
}

pub(crate) async fn database_path(gateway: Arc<dyn Gateway>) -> anyhow::Result<()> {
    println!("{}", gateway.get_database_path().await?);
    Ok(())
}

/// Asks on stderr and reads the answer from stdin. Anything but y/yes is no.
struct StdinConfirmer;

#[async_trait]
impl Confirmer for StdinConfirmer {
    async fn confirm(&self, message: &str) -> bool {
        let message = message.to_string();
        let answer = tokio::task::spawn_blocking(move || -> io::Result<String> {
            let mut stderr = io::stderr();
            write!(stderr, "{message} [y/N] ")?;
            stderr.flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            Ok(line)
        })
        .await;
        match answer {
            Ok(Ok(line)) => is_yes(&line),
            Ok(Err(err)) => {
                tracing::warn!(%err, "failed to read confirmation");
                false
            }
            Err(err) => {
                tracing::warn!(%err, "confirmation prompt aborted");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Runs `job` against a controller whose notifications are printed to stderr.
async fn with_controller<F, Fut>(
    gateway: Arc<dyn Gateway>,
    confirmer: Arc<dyn Confirmer>,
    job: F,
) -> bool
where
    F: FnOnce(Controller) -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let notifier = Notifier::new(Bus::new());
    let subscription = notifier.on_notification(|n| match n.severity {
        Severity::Success => eprintln!("{}", n.message),
        Severity::Warning => eprintln!("warning: {}", n.message),
        Severity::Error => eprintln!("error: {}", n.message),
    });
    let controller = Controller::new(gateway, Store::new(), notifier, confirmer);
    let ok = job(controller).await;
    subscription.unsubscribe();
    ok
}

pub(crate) async fn export(gateway: Arc<dyn Gateway>, path: &Path) -> anyhow::Result<()> {
    let target = path.to_string_lossy().to_string();
    let ok = with_controller(gateway, Arc::new(AssumeYes), |c| async move {
        c.export_data(&target).await
    })
    .await;
    if !ok {
        anyhow::bail!("Export to {} failed", path.display());
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum ImportOutcome {
    Applied,
    Declined,
}

pub(crate) async fn import(gateway: Arc<dyn Gateway>, path: &Path, yes: bool) -> anyhow::Result<()> {
    let confirmer: Arc<dyn Confirmer> = if yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(StdinConfirmer)
    };
    if import_with(gateway, path, confirmer.as_ref()).await? == ImportOutcome::Declined {
        eprintln!("Import not applied.");
    }
    Ok(())
}

/// Asks first, so a declined prompt and a failed import stay distinguishable.
async fn import_with(
    gateway: Arc<dyn Gateway>,
    path: &Path,
    confirmer: &dyn Confirmer,
) -> anyhow::Result<ImportOutcome> {
    if !path.exists() {
        anyhow::bail!("Backup file not found: {}", path.display());
    }
    if !confirmer.confirm(IMPORT_CONFIRMATION).await {
        return Ok(ImportOutcome::Declined);
    }
    let source = path.to_string_lossy().to_string();
    let ok = with_controller(gateway, Arc::new(AssumeYes), |c| async move {
        c.import_data(&source).await
    })
    .await;
    if !ok {
        anyhow::bail!("Import from {} failed", path.display());
    }
    Ok(ImportOutcome::Applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use promptlog_tui::api::{
        CreatePromptRequest, CreateTaskRequest, GatewayResult, ListPromptsRequest,
        UpdatePromptRequest, UpdateTaskRequest,
    };
    use promptlog_tui::GatewayError;
    use promptlog_types::{PromptEntry, Task};
    use std::sync::Mutex;

    /// Backend double for the backup commands; everything else is unreachable.
    #[derive(Default)]
    struct BackupBackend {
        reject_import: bool,
        calls: Mutex<Vec<&'static str>>,
    }

    impl BackupBackend {
        fn rejecting_import() -> Arc<Self> {
            Arc::new(Self {
                reject_import: true,
                ..Self::default()
            })
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, command: &'static str) {
            self.calls.lock().unwrap().push(command);
        }
    }

    fn unused<T>(command: &str) -> GatewayResult<T> {
        Err(GatewayError::backend("UNUSED", format!("{command} not expected")))
    }

    #[async_trait]
    impl Gateway for BackupBackend {
        async fn list_projects(&self) -> GatewayResult<Vec<Project>> {
            self.record("get_projects");
            Ok(Vec::new())
        }
        async fn create_project(&self, _name: &str) -> GatewayResult<Project> {
            unused("create_project")
        }
        async fn update_project(&self, _id: i64, _name: &str) -> GatewayResult<()> {
            unused("update_project")
        }
        async fn delete_project(&self, _id: i64) -> GatewayResult<()> {
            unused("delete_project")
        }
        async fn list_tasks(&self, _project_id: i64) -> GatewayResult<Vec<Task>> {
            unused("get_tasks")
        }
        async fn create_task(&self, _request: CreateTaskRequest) -> GatewayResult<Task> {
            unused("create_task")
        }
        async fn update_task(&self, _request: UpdateTaskRequest) -> GatewayResult<()> {
            unused("update_task")
        }
        async fn delete_task(&self, _id: i64) -> GatewayResult<()> {
            unused("delete_task")
        }
        async fn list_prompt_entries(&self, _request: ListPromptsRequest) -> GatewayResult<Vec<PromptEntry>> {
            unused("get_prompt_entries")
        }
        async fn create_prompt_entry(&self, _request: CreatePromptRequest) -> GatewayResult<PromptEntry> {
            unused("create_prompt_entry")
        }
        async fn update_prompt_entry(&self, _request: UpdatePromptRequest) -> GatewayResult<()> {
            unused("update_prompt_entry")
        }
        async fn delete_prompt_entry(&self, _id: i64) -> GatewayResult<()> {
            unused("delete_prompt_entry")
        }
        async fn search_prompt_entries(&self, _request: SearchRequest) -> GatewayResult<Vec<SearchResult>> {
            unused("search_prompt_entries")
        }
        async fn get_database_path(&self) -> GatewayResult<String> {
            unused("get_database_path")
        }
        async fn export_data(&self, _target_path: &str) -> GatewayResult<()> {
            self.record("export_data");
            Ok(())
        }
        async fn import_data(&self, _source_path: &str) -> GatewayResult<()> {
            self.record("import_data");
            if self.reject_import {
                return Err(GatewayError::backend("IMPORT_ERROR", "backup is corrupt"));
            }
            Ok(())
        }
    }

    struct Answer(bool);

    #[async_trait]
    impl Confirmer for Answer {
        async fn confirm(&self, _message: &str) -> bool {
            self.0
        }
    }

    fn backup_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{}").unwrap();
        file
    }

    #[tokio::test]
    async fn test_import_rejected_by_backend_is_an_error() {
        let backend = BackupBackend::rejecting_import();
        let file = backup_file();

        let err = import_with(backend.clone(), file.path(), &Answer(true))
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("Import from"));
        assert_eq!(backend.calls(), vec!["import_data"]);
    }

    #[tokio::test]
    async fn test_declined_import_is_not_an_error() {
        let backend = Arc::new(BackupBackend::default());
        let file = backup_file();

        let outcome = import_with(backend.clone(), file.path(), &Answer(false))
            .await
            .unwrap();

        assert_eq!(outcome, ImportOutcome::Declined);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_confirmed_import_reloads_projects() {
        let backend = Arc::new(BackupBackend::default());
        let file = backup_file();

        let outcome = import_with(backend.clone(), file.path(), &Answer(true))
            .await
            .unwrap();

        assert_eq!(outcome, ImportOutcome::Applied);
        assert_eq!(backend.calls(), vec!["import_data", "get_projects"]);
    }

    #[tokio::test]
    async fn test_import_of_missing_file_makes_no_call() {
        let backend = Arc::new(BackupBackend::default());
        let dir = tempfile::tempdir().unwrap();

        assert!(import_with(backend.clone(), &dir.path().join("absent.json"), &Answer(true))
            .await
            .is_err());
        assert!(backend.calls().is_empty());
    }

    fn result() -> SearchResult {
        SearchResult {
            project_id: 1,
            task_id: 2,
            prompt_id: 3,
            project_name: "Docs".into(),
            task_name: "Intro".into(),
            snippet: "Write a foo\nthen FOO again".into(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_plain_output_brackets_matches() {
        assert_eq!(
            format_result(&result(), "foo", false),
            "#3 Docs / Intro · 2024-03-05\n  Write a [foo] then [FOO] again"
        );
    }

    #[test]
    fn test_colored_output_wraps_matches() {
        let out = format_result(&result(), "foo", true);
        assert!(out.contains(&format!("{ANSI_BOLD_YELLOW}foo{ANSI_RESET}")));
        assert!(out.contains(&format!("{ANSI_BOLD_YELLOW}FOO{ANSI_RESET}")));
    }

    #[test]
    fn test_confirmation_answers() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("nope"));
    }

    #[test]
    fn test_project_table() {
        assert_eq!(project_table(&[]), "No projects.\n");
        let table = project_table(&[Project {
            id: 7,
            name: "Docs".into(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap(),
            updated_at: None,
        }]);
        assert!(table.lines().nth(1).unwrap().starts_with("7        Docs"));
    }
}
