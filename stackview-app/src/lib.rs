//! Application bootstrap for Stackview.
//!
//! Provides `HostConfig` (host settings), `AppStateBuilder` (adapter injection),
//! `AppState` (the running navigation stack) and in-memory adapters.

pub mod adapters;
pub mod config;
pub mod demo;

use std::sync::Arc;

use anyhow::anyhow;
use stackview_core::error::CoreResult;
use stackview_core::types::{HistoryState, ScreenDescriptor};
use stackview_core::{
    DisplaySurface, HistoryBoundary, IdGenerator, NavigationContext, NavigationStack,
    ObjectStore, OpenedScreen, ReconcileOutcome, TextMeasure,
};

use adapters::{CellWidthMeasure, LogSurface, SessionHistory};
pub use config::HostConfig;

/// Running application: configuration plus the navigation stack.
///
/// Every host constructs this once at startup via `AppStateBuilder`.
pub struct AppState {
    pub config: HostConfig,
    pub navigation: NavigationStack,
}

impl AppState {
    /// Open the first screen on top of the host root. Its language falls back
    /// to the configured one.
    pub async fn start(&mut self, first: ScreenDescriptor) -> CoreResult<OpenedScreen> {
        log::info!("Starting with screen {}", first.label());
        self.navigation.open(first).await
    }

    /// Hand a popped history entry to the navigation stack.
    ///
    /// Reconciliation failures are logged and reported as ignored so that a
    /// broken entry cannot wedge back/forward navigation.
    pub async fn history_popped(&mut self, state: &HistoryState) -> ReconcileOutcome {
        match self.navigation.on_history_pop(state).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Failed to reconcile history entry: {e}");
                ReconcileOutcome::Ignored
            }
        }
    }

    /// Destroy every open screen; openers get no results
    pub fn shutdown(self) {
        self.navigation.teardown();
    }
}

/// Builder for constructing `AppState` with host-specific adapters.
///
/// # Required adapters
/// - `object_store`: where records and schemas come from
///
/// # Optional
/// - `history`: defaults to `SessionHistory`
/// - `surface`: defaults to `LogSurface`
/// - `measure`: defaults to `CellWidthMeasure`
/// - `id_generator`: defaults to a fresh `IdGenerator`
/// - `config`: defaults to `HostConfig::default()`
pub struct AppStateBuilder {
    config: Option<HostConfig>,
    object_store: Option<Arc<dyn ObjectStore>>,
    history: Option<Arc<dyn HistoryBoundary>>,
    surface: Option<Arc<dyn DisplaySurface>>,
    measure: Option<Arc<dyn TextMeasure>>,
    id_generator: Option<Arc<IdGenerator>>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: None,
            object_store: None,
            history: None,
            surface: None,
            measure: None,
            id_generator: None,
        }
    }

    #[must_use]
    pub fn config(mut self, config: HostConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn object_store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.object_store = Some(store);
        self
    }

    #[must_use]
    pub fn history(mut self, history: Arc<dyn HistoryBoundary>) -> Self {
        self.history = Some(history);
        self
    }

    #[must_use]
    pub fn surface(mut self, surface: Arc<dyn DisplaySurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    #[must_use]
    pub fn measure(mut self, measure: Arc<dyn TextMeasure>) -> Self {
        self.measure = Some(measure);
        self
    }

    #[must_use]
    pub fn id_generator(mut self, ids: Arc<IdGenerator>) -> Self {
        self.id_generator = Some(ids);
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Fails if the object store is missing.
    pub fn build(self) -> anyhow::Result<AppState> {
        let object_store = self
            .object_store
            .ok_or_else(|| anyhow!("object_store is required"))?;
        let config = self.config.unwrap_or_default();
        let history = self
            .history
            .unwrap_or_else(|| Arc::new(SessionHistory::new()));
        let surface = self
            .surface
            .unwrap_or_else(|| Arc::new(LogSurface::new(config.breadcrumb_separator.clone())));
        let measure = self.measure.unwrap_or_else(|| Arc::new(CellWidthMeasure));
        let ids = self
            .id_generator
            .unwrap_or_else(|| Arc::new(IdGenerator::new()));

        let ctx = Arc::new(NavigationContext::new(
            object_store,
            history,
            surface,
            measure,
            ids,
        ));
        let navigation = NavigationStack::new(ctx, config.to_navigation_config());

        Ok(AppState { config, navigation })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
