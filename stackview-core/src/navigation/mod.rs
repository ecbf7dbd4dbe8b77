//! Navigation stack
//!
//! Owns the ordered screen stack, mirrors it into browser history and
//! reconciles it when the host pops a history entry.
//!
//! Layout: `stack[0]` is the host root, a slot that holds no screen and is
//! pushed by the first `open`. `stack[1..]` are suspended screens and
//! `current` is the single visible screen. Every mutation pushes one history
//! entry carrying the projections of all screens above the root, bottom first.

mod breadcrumb;
mod reconcile;

pub use breadcrumb::{layout as layout_breadcrumb, Breadcrumb, Crumb, ELLIPSIS};
pub use reconcile::{plan as plan_reconcile, ReconcilePlan};

use std::iter;
use std::mem;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, oneshot};

use crate::context::NavigationContext;
use crate::error::{CoreError, CoreResult};
use crate::screen::Screen;
use crate::types::{
    Domain, HistoryState, Purpose, ScreenDescriptor, ScreenResult, ViewMode, HISTORY_MARKER,
};
use crate::utils::{Debouncer, ScreenId};

/// How the host wires navigation to browser history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationMode {
    /// Screens stack up and are mirrored into history
    #[default]
    Stacked,
    /// History is left alone
    Single,
}

/// Navigation stack configuration
#[derive(Debug, Clone)]
pub struct NavigationConfig {
    /// URL of this frame; history entries from other URLs are ignored
    pub frame_url: String,
    pub mode: NavigationMode,
    /// Language used when neither the active screen nor the descriptor has one
    pub default_lang: String,
    pub breadcrumb_separator: String,
    /// Quiet period before a viewport resize recomputes the breadcrumb
    pub resize_debounce: Duration,
    /// Initial available breadcrumb width
    pub viewport_width: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            frame_url: String::new(),
            mode: NavigationMode::Stacked,
            default_lang: "en".to_string(),
            breadcrumb_separator: " / ".to_string(),
            resize_debounce: Duration::from_millis(150),
            viewport_width: 80,
        }
    }
}

/// Notifications for the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    /// The stack or the breadcrumb changed
    Updated,
    Opened(ScreenId),
    Closed(ScreenId),
    /// A popped history entry was applied
    Reconciled { closed: usize, opened: usize },
}

/// Handle returned to the opener of a screen
#[derive(Debug)]
pub struct OpenedScreen {
    pub id: ScreenId,
    /// Fulfilled once when the screen closes; errors if it is destroyed instead
    pub result: oneshot::Receiver<ScreenResult>,
}

/// What a popped history entry did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Entry did not belong to this stack
    Ignored,
    Applied { closed: usize, opened: usize },
}

/// One position of the stack
enum Slot {
    /// The host page underneath every screen
    Root,
    Screen(Screen),
}

impl Slot {
    fn screen(&self) -> Option<&Screen> {
        match self {
            Self::Root => None,
            Self::Screen(screen) => Some(screen),
        }
    }

    fn screen_mut(&mut self) -> Option<&mut Screen> {
        match self {
            Self::Root => None,
            Self::Screen(screen) => Some(screen),
        }
    }
}

/// Ordered stack of screens
pub struct NavigationStack {
    ctx: Arc<NavigationContext>,
    config: NavigationConfig,
    stack: Vec<Slot>,
    current: Slot,
    history_enabled: bool,
    width: usize,
    resize: Debouncer<usize>,
    breadcrumb: Breadcrumb,
    events: broadcast::Sender<NavigationEvent>,
}

impl NavigationStack {
    /// Create an empty stack showing only the host root
    #[must_use]
    pub fn new(ctx: Arc<NavigationContext>, config: NavigationConfig) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            ctx,
            width: config.viewport_width,
            resize: Debouncer::new(config.resize_debounce),
            config,
            stack: Vec::new(),
            current: Slot::Root,
            history_enabled: true,
            breadcrumb: Breadcrumb::default(),
            events,
        }
    }

    #[must_use]
    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// Subscribe to navigation notifications
    pub fn subscribe(&self) -> broadcast::Receiver<NavigationEvent> {
        self.events.subscribe()
    }

    /// Number of slots below the active screen, the host root included.
    ///
    /// Equals completed opens minus completed closes.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Active screen; `None` while the host root is showing
    #[must_use]
    pub fn current(&self) -> Option<&Screen> {
        self.current.screen()
    }

    /// Screens below the active one, bottom first
    #[must_use]
    pub fn suspended(&self) -> Vec<&Screen> {
        self.stack.iter().filter_map(Slot::screen).collect()
    }

    #[must_use]
    pub fn breadcrumb(&self) -> &Breadcrumb {
        &self.breadcrumb
    }

    /// Projections of every screen above the root, bottom first
    #[must_use]
    pub fn projections(&self) -> Vec<ScreenDescriptor> {
        self.stack
            .iter()
            .chain(iter::once(&self.current))
            .filter_map(Slot::screen)
            .map(Screen::projection)
            .collect()
    }

    /// Open a screen on top of the stack.
    ///
    /// The busy indicator is shown for the whole call. On failure nothing on the
    /// stack changes.
    pub async fn open(&mut self, descriptor: ScreenDescriptor) -> CoreResult<OpenedScreen> {
        self.open_with(descriptor, true).await
    }

    async fn open_with(
        &mut self,
        descriptor: ScreenDescriptor,
        inherit_lang: bool,
    ) -> CoreResult<OpenedScreen> {
        self.ctx.surface.set_busy(true);
        let outcome = self.open_screen(descriptor, inherit_lang).await;
        self.ctx.surface.set_busy(false);

        if let Err(e) = &outcome {
            e.log("Failed to open screen");
        }
        outcome
    }

    async fn open_screen(
        &mut self,
        mut descriptor: ScreenDescriptor,
        inherit_lang: bool,
    ) -> CoreResult<OpenedScreen> {
        if descriptor.entity.trim().is_empty() {
            return Err(CoreError::InvalidDescriptor(
                "entity cannot be empty".to_string(),
            ));
        }

        let inherited = self
            .current
            .screen()
            .filter(|_| inherit_lang)
            .map(|screen| screen.descriptor().lang.clone());
        descriptor.normalize(inherited.as_deref(), &self.config.default_lang);

        let schema = self
            .ctx
            .store
            .schema(&descriptor.entity)
            .await
            .map_err(|e| match e {
                CoreError::EntityNotFound(_) => e,
                other => CoreError::SchemaUnavailable {
                    entity: descriptor.entity.clone(),
                    message: other.to_string(),
                },
            })?;

        if descriptor.purpose == Purpose::Create {
            let draft_id = self.provision_draft(&descriptor).await?;
            descriptor.domain = Domain::by_id(draft_id);
        }

        let id = self.ctx.ids.next_screen_id();
        let (mut screen, result) = Screen::new(
            id,
            descriptor,
            Arc::new(schema),
            Arc::clone(&self.ctx.store),
        );
        screen.load().await;

        let mut previous = mem::replace(&mut self.current, Slot::Root);
        if let Some(previous) = previous.screen_mut() {
            previous.suspend();
        }
        self.stack.push(previous);
        screen.activate();
        log::info!(
            "Opened {id} ({} {:?}, purpose {:?}) at depth {}",
            screen.descriptor().entity,
            screen.descriptor().view_kind,
            screen.descriptor().purpose,
            self.stack.len()
        );
        self.current = Slot::Screen(screen);

        for suspended in self.stack.iter().filter_map(Slot::screen) {
            self.ctx.surface.hide(suspended.id());
        }
        self.ctx.surface.show(id);
        self.push_history();
        self.recompute_breadcrumb();

        self.emit(NavigationEvent::Opened(id));
        self.emit(NavigationEvent::Updated);
        Ok(OpenedScreen { id, result })
    }

    /// Create the draft record backing a create screen; defaults come from the
    /// domain's equality conditions.
    async fn provision_draft(&self, descriptor: &ScreenDescriptor) -> CoreResult<i64> {
        let defaults = descriptor.domain.equality_defaults();
        let draft = self
            .ctx
            .store
            .create(&descriptor.entity, &defaults)
            .await
            .map_err(|e| CoreError::DraftProvisioning {
                entity: descriptor.entity.clone(),
                message: e.to_string(),
            })?;

        let id = draft.id().ok_or_else(|| CoreError::DraftProvisioning {
            entity: descriptor.entity.clone(),
            message: "store returned a draft without id".to_string(),
        })?;
        log::debug!("Provisioned {} draft {id}", descriptor.entity);
        Ok(id)
    }

    /// Close the active screen, delivering `result` to its opener.
    ///
    /// Returns `false` when nothing is stacked. Closing the first opened screen
    /// brings back the host root. A `silent` close skips the refresh, display,
    /// breadcrumb and history side effects.
    pub async fn close(&mut self, result: ScreenResult, silent: bool) -> bool {
        if self.stack.is_empty() {
            log::debug!("Close requested with nothing stacked, ignoring");
            return false;
        }
        let Slot::Screen(mut closing) = mem::replace(&mut self.current, Slot::Root) else {
            return false;
        };

        if closing.has_changed().await {
            for screen in self.stack.iter_mut().filter_map(Slot::screen_mut) {
                screen.mark_changed();
            }
        }

        closing.close(result);
        self.ctx.surface.dispose(closing.id());
        log::info!("Closed {}", closing.id());
        let closed_id = closing.id();
        drop(closing);

        if let Some(mut next) = self.stack.pop() {
            if let Some(screen) = next.screen_mut() {
                screen.activate();
            }
            self.current = next;
        }

        if !silent {
            self.reveal_current().await;
            self.push_history();
        }

        self.emit(NavigationEvent::Closed(closed_id));
        self.emit(NavigationEvent::Updated);
        true
    }

    /// Close every screen down to the host root, silently
    pub async fn close_all(&mut self) {
        while !self.stack.is_empty() {
            self.close(ScreenResult::default(), true).await;
        }
    }

    /// Show the active screen, refreshing it first when it was marked changed
    /// and is not being edited, then recompute the breadcrumb.
    async fn reveal_current(&mut self) {
        if let Some(current) = self.current.screen() {
            if current.is_marked_changed() && current.mode() == ViewMode::View {
                log::debug!("Refreshing stale {}", current.id());
                current.refresh(true).await;
            }
            self.ctx.surface.show(current.id());
        }
        self.recompute_breadcrumb();
    }

    /// Apply a history entry popped by the host's back/forward navigation.
    ///
    /// Entries from other frames, pops while not in stacked mode, and pops
    /// while nothing is stacked are ignored. When an open fails partway, the
    /// screen left on top is still revealed before the error is returned.
    pub async fn on_history_pop(&mut self, state: &HistoryState) -> CoreResult<ReconcileOutcome> {
        if self.stack.is_empty() || self.config.mode != NavigationMode::Stacked {
            return Ok(ReconcileOutcome::Ignored);
        }
        if let Err(e) = self.check_origin(state) {
            log::debug!("Ignoring history entry: {e}");
            return Ok(ReconcileOutcome::Ignored);
        }

        let plan = reconcile::plan(&self.projections(), &state.stack);
        if plan.is_noop() {
            return Ok(ReconcileOutcome::Applied {
                closed: 0,
                opened: 0,
            });
        }
        log::info!(
            "Reconciling history: keeping {}, closing {}, opening {}",
            plan.start,
            plan.close_count,
            plan.open.len()
        );

        self.history_enabled = false;
        let applied = self.apply_plan(plan).await;
        self.history_enabled = true;

        if applied.opened == 0 || applied.error.is_some() {
            self.reveal_current().await;
        }
        let (closed, opened) = (applied.closed, applied.opened);
        self.emit(NavigationEvent::Reconciled { closed, opened });
        match applied.error {
            Some(e) => Err(e),
            None => Ok(ReconcileOutcome::Applied { closed, opened }),
        }
    }

    async fn apply_plan(&mut self, plan: ReconcilePlan) -> AppliedPlan {
        let mut applied = AppliedPlan::default();
        for _ in 0..plan.close_count {
            if self.close(ScreenResult::default(), true).await {
                applied.closed += 1;
            }
        }

        for descriptor in plan.open {
            // History projections are already normalized; nobody waits on their results.
            if let Err(e) = self.open_with(descriptor, false).await {
                applied.error = Some(e);
                break;
            }
            applied.opened += 1;
        }
        applied
    }

    fn check_origin(&self, state: &HistoryState) -> CoreResult<()> {
        if state.marker != HISTORY_MARKER {
            return Err(CoreError::HistoryMismatch(format!(
                "unknown marker '{}'",
                state.marker
            )));
        }
        if state.url != self.config.frame_url {
            return Err(CoreError::HistoryMismatch(format!(
                "entry belongs to '{}'",
                state.url
            )));
        }
        Ok(())
    }

    /// Switch the active screen's language; the screen refetches its data
    pub async fn switch_language(&mut self, lang: &str) {
        let Some(current) = self.current.screen_mut() else {
            return;
        };
        current.switch_lang(lang).await;
        self.push_history();
        self.recompute_breadcrumb();
        self.emit(NavigationEvent::Updated);
    }

    /// Record a viewport resize; the breadcrumb is recomputed by `flush_resize`
    pub fn resize(&mut self, width: usize) {
        self.resize.call(width);
    }

    /// Wait out the resize debounce and apply the last width
    pub async fn flush_resize(&mut self) {
        if let Some(width) = self.resize.settle().await {
            self.width = width;
            self.recompute_breadcrumb();
            self.emit(NavigationEvent::Updated);
        }
    }

    /// Destroy every screen without delivering results
    pub fn teardown(mut self) {
        let mut slots: Vec<Slot> = self.stack.drain(..).collect();
        slots.push(mem::replace(&mut self.current, Slot::Root));
        for slot in slots.into_iter().rev() {
            if let Slot::Screen(mut screen) = slot {
                screen.destroy();
                self.ctx.surface.dispose(screen.id());
            }
        }
        log::info!("Navigation stack torn down");
    }

    fn push_history(&self) {
        if !self.history_enabled || self.config.mode != NavigationMode::Stacked {
            return;
        }
        let state = HistoryState::new(self.config.frame_url.clone(), self.projections());
        self.ctx.history.push(state);
    }

    fn recompute_breadcrumb(&mut self) {
        let labels: Vec<&str> = iter::once(&self.current)
            .chain(self.stack.iter().rev())
            .filter_map(Slot::screen)
            .map(Screen::label)
            .collect();
        self.breadcrumb = breadcrumb::layout(
            &labels,
            self.width,
            &self.config.breadcrumb_separator,
            self.ctx.measure.as_ref(),
        );
        self.ctx.surface.render_breadcrumb(&self.breadcrumb);
    }

    fn emit(&self, event: NavigationEvent) {
        let _ = self.events.send(event);
    }
}

/// Progress of a reconcile plan; `error` is set when an open failed and the
/// remaining opens were skipped
#[derive(Default)]
struct AppliedPlan {
    closed: usize,
    opened: usize,
    error: Option<CoreError>,
}
