//! `stackview` entry point
//!
//! Replays a scripted navigation session against the in-memory catalog and
//! prints the breadcrumb after every step. Logs go to stderr; set `RUST_LOG`
//! to change verbosity.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use serde_json::json;
use stackview_app::adapters::{InMemoryObjectStore, LogSurface, SessionHistory};
use stackview_app::{demo, AppState, AppStateBuilder, HostConfig};
use stackview_core::types::{Domain, FieldValues, Purpose, Record, ScreenDescriptor, ScreenResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(HostConfig::default_path);
    let config = match config_path {
        Some(path) => HostConfig::load(&path).await?,
        None => HostConfig::default(),
    };
    tracing::info!(
        "Navigation mode {:?}, language {}",
        config.navigation_mode,
        config.language
    );

    let store = Arc::new(InMemoryObjectStore::new());
    demo::seed(&store).await?;
    let history = Arc::new(SessionHistory::new());
    let surface = Arc::new(LogSurface::new(config.breadcrumb_separator.clone()));

    let mut app = AppStateBuilder::new()
        .config(config)
        .object_store(store.clone())
        .history(history.clone())
        .surface(surface.clone())
        .build()?;

    let step = |name: &str| println!("{name:<10} {}", surface.breadcrumb());

    app.start(ScreenDescriptor::new("home").with_view_name("Dashboard"))
        .await
        .context("Failed to open the first screen")?;
    step("start");

    app.navigation
        .open(ScreenDescriptor::new("product").with_view_name("Products"))
        .await?;
    step("open");

    let picker = app
        .navigation
        .open(
            ScreenDescriptor::new("category")
                .with_view_name("Categories")
                .with_purpose(Purpose::Select),
        )
        .await?;
    step("select");
    app.navigation.close(ScreenResult::selection(vec![5]), false).await;
    let picked = picker.result.await.context("Category picker was destroyed")?;
    let category = picked
        .selection
        .first()
        .copied()
        .context("No category picked")?;
    step("picked");

    let draft = app
        .navigation
        .open(
            ScreenDescriptor::new("product")
                .form()
                .with_view_name("New product")
                .with_purpose(Purpose::Create)
                .with_domain(Domain::from_condition("category_id", "=", json!(category))),
        )
        .await?;
    step("create");
    edit_draft(&app).await;
    app.navigation.close(ScreenResult::default(), false).await;
    if draft.result.await.is_ok() {
        tracing::info!("Draft form closed");
    }
    step("saved");

    replay_history(&mut app, &history).await;

    app.navigation.resize(24);
    app.navigation.flush_resize().await;
    step("narrow");

    tracing::info!(
        "{} product(s) in store",
        store.records("product").await?.len()
    );
    app.shutdown();
    Ok(())
}

/// Fill in the draft on the active screen and print what would be written
async fn edit_draft(app: &AppState) {
    let Some(screen) = app.navigation.current() else {
        return;
    };
    let ids: Vec<i64> = screen
        .model()
        .get(&[])
        .await
        .iter()
        .filter_map(Record::id)
        .collect();

    let mut values = FieldValues::new();
    values.insert("name".to_string(), json!("Monitor arm"));
    values.insert("launch_date".to_string(), json!(""));
    screen.change(&ids, &values).await;

    for record in screen.model().get_changes(&ids).await {
        println!("{:<10} {}", "changes", serde_json::Value::Object(record.into_fields()));
    }
}

/// Walk back two entries and forward again, the way a browser would
async fn replay_history(app: &mut AppState, history: &SessionHistory) {
    for _ in 0..2 {
        if let Some(state) = history.back() {
            let outcome = app.history_popped(&state).await;
            tracing::info!("Back: {outcome:?}");
            println!("{:<10} {}", "back", breadcrumb(app));
        }
    }
    if let Some(state) = history.forward() {
        let outcome = app.history_popped(&state).await;
        tracing::info!("Forward: {outcome:?}");
        println!("{:<10} {}", "forward", breadcrumb(app));
    }
}

fn breadcrumb(app: &AppState) -> String {
    app.navigation
        .breadcrumb()
        .render(&app.config.breadcrumb_separator)
}
