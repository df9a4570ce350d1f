use std::time::Duration;

use doable_core::config::TOKEN_ENV_VAR;
use doable_core::{AppError, Config, ConfigError};
use doable_services::{TaskMirror, TaskServiceClient};
use doable_store::TaskStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    doable_core::init()?;

    if let Err(e) = run().await {
        tracing::error!("Doable stopped: {}", e);
        eprintln!("{}", e.user_message());
        return Err(e.into());
    }

    Ok(())
}

fn load_config() -> Result<Config, AppError> {
    let (config, _validation) = Config::load_validated().map_err(|e| {
        match e.downcast::<ConfigError>() {
            Ok(config_error) => AppError::Config(config_error),
            Err(other) => AppError::Other(other),
        }
    })?;
    Ok(config)
}

async fn run() -> Result<(), AppError> {
    let config = load_config()?;
    let token = config
        .api
        .resolved_token()
        .ok_or(ConfigError::MissingToken(TOKEN_ENV_VAR))?;

    let client = TaskServiceClient::with_timeout(
        &config.api.base_url,
        token,
        Duration::from_secs(config.api.timeout_secs),
    )?;
    let mirror = TaskMirror::open_or_memory(config.mirror_path())?;
    let store = TaskStore::new(client, mirror, config.projects.clone().into());

    tracing::info!("Doable started against {}", config.api.base_url);

    let mut loading = store.loader().subscribe();
    tokio::spawn(async move {
        while loading.changed().await.is_ok() {
            let visible = *loading.borrow();
            tracing::debug!("Loader visible: {}", visible);
        }
    });

    let mut notifications = store.notifier().subscribe();
    let printer = tokio::spawn(async move {
        // Ends once the store, and with it the sender, is dropped.
        while let Ok(notice) = notifications.recv().await {
            println!("[{:?}] {} {}", notice.severity, notice.title, notice.body);
        }
    });

    let result = sync(&store).await;

    drop(store);
    if let Err(e) = printer.await {
        tracing::warn!("Notification printer stopped early: {}", e);
    }

    result
}

async fn sync(store: &TaskStore) -> Result<(), AppError> {
    store.fetch_projects().await?;
    store.fetch_all_tasks().await?;

    println!("Doable");
    println!("  Projects: {}", store.projects().len());
    println!("  Tasks:    {}", store.tasks().len());

    let today = store.due_today();
    println!("\nToday ({}):", today.len());
    for task in &today {
        let mark = if task.completed { "x" } else { " " };
        println!("  [{}] {}", mark, task.content);
    }

    let upcoming = store.upcoming();
    println!("\nUpcoming ({}):", upcoming.len());
    for task in &upcoming {
        let label = store.due_label(task).unwrap_or_default();
        println!("  {:<12} {}", label, task.content);
    }

    let orphans = store.orphaned_tasks();
    if !orphans.is_empty() {
        tracing::warn!("{} tasks belong to projects that no longer exist", orphans.len());
    }

    Ok(())
}
