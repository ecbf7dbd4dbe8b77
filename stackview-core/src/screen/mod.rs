//! Screen lifecycle
//!
//! A screen binds one [`ScreenDescriptor`] to one [`CollectionModel`]:
//!
//! ```text
//! Opening ──► Ready ──► Active ◄──► Suspended
//!                          │            │
//!                          └──► Closed ◄┘
//! ```
//!
//! `Closed` is terminal. The opener learns about the close through a one-shot
//! result channel: `close` sends exactly once, `destroy` drops the sender.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{oneshot, watch};

use crate::model::CollectionModel;
use crate::traits::ObjectStore;
use crate::types::{
    EntitySchema, FetchRequest, FieldValues, RecordId, ScreenDescriptor, ScreenResult, ViewMode,
};
use crate::utils::ScreenId;

/// Lifecycle state of a screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    /// Waiting for the first fetch
    Opening,
    /// First fetch settled, not yet on the stack
    Ready,
    /// Top of the stack, visible
    Active,
    /// Below the top, hidden but retained
    Suspended,
    Closed,
}

/// One navigable unit bound to an entity, view, domain and purpose
pub struct Screen {
    id: ScreenId,
    descriptor: ScreenDescriptor,
    store: Arc<dyn ObjectStore>,
    schema: Arc<EntitySchema>,
    model: CollectionModel,
    state: ScreenState,
    /// Set by `mark_changed`, never cleared
    changed: bool,
    ready: watch::Sender<bool>,
    result: Option<oneshot::Sender<ScreenResult>>,
}

impl Screen {
    /// Create a screen in the `Opening` state together with the receiving end of
    /// its result channel.
    pub fn new(
        id: ScreenId,
        descriptor: ScreenDescriptor,
        schema: Arc<EntitySchema>,
        store: Arc<dyn ObjectStore>,
    ) -> (Self, oneshot::Receiver<ScreenResult>) {
        let model = build_model(&store, &schema, &descriptor);
        let (ready, _) = watch::channel(false);
        let (result_tx, result_rx) = oneshot::channel();

        let screen = Self {
            id,
            descriptor,
            store,
            schema,
            model,
            state: ScreenState::Opening,
            changed: false,
            ready,
            result: Some(result_tx),
        };
        (screen, result_rx)
    }

    #[must_use]
    pub fn id(&self) -> ScreenId {
        self.id
    }

    #[must_use]
    pub fn descriptor(&self) -> &ScreenDescriptor {
        &self.descriptor
    }

    /// Serializable projection stored in browser history
    #[must_use]
    pub fn projection(&self) -> ScreenDescriptor {
        self.descriptor.clone()
    }

    #[must_use]
    pub fn label(&self) -> &str {
        self.descriptor.label()
    }

    #[must_use]
    pub fn mode(&self) -> ViewMode {
        self.descriptor.mode
    }

    #[must_use]
    pub fn state(&self) -> ScreenState {
        self.state
    }

    #[must_use]
    pub fn model(&self) -> &CollectionModel {
        &self.model
    }

    /// Resolves once the first fetch has settled
    pub fn ready(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut ready = self.ready.subscribe();
        async move {
            let _ = ready.wait_for(|ready| *ready).await;
        }
    }

    /// Run the first fetch and move to `Ready`. Fetch failures still make the
    /// screen ready, with an empty model.
    pub async fn load(&mut self) {
        if self.state != ScreenState::Opening {
            return;
        }
        self.model.refresh(false).await;
        self.state = ScreenState::Ready;
        self.ready.send_replace(true);
        log::debug!("{} ready ({})", self.id, self.descriptor.entity);
    }

    pub async fn refresh(&self, full: bool) {
        self.model.refresh(full).await;
    }

    pub fn activate(&mut self) {
        self.transition(ScreenState::Active);
    }

    pub fn suspend(&mut self) {
        self.transition(ScreenState::Suspended);
    }

    /// Flag this screen's data as possibly stale
    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    /// Whether `mark_changed` was called
    #[must_use]
    pub fn is_marked_changed(&self) -> bool {
        self.changed
    }

    /// Own flag or any dirty record in the model
    pub async fn has_changed(&self) -> bool {
        self.changed || self.model.is_dirty().await
    }

    /// Record local edits through the model
    pub async fn change(&self, ids: &[RecordId], values: &FieldValues) {
        self.model.change(ids, values).await;
    }

    /// Swap the language: the model is rebuilt and refetched, the rest of the
    /// descriptor is kept.
    pub async fn switch_lang(&mut self, lang: &str) {
        if self.descriptor.lang == lang {
            return;
        }
        self.descriptor.lang = lang.to_string();
        self.model = build_model(&self.store, &self.schema, &self.descriptor);
        self.model.refresh(true).await;
    }

    /// Deliver `result` to the opener and close. Only the first close delivers.
    pub fn close(&mut self, result: ScreenResult) {
        if let Some(sender) = self.result.take() {
            if sender.send(result).is_err() {
                log::debug!("{} closed but its opener is gone", self.id);
            }
        }
        self.state = ScreenState::Closed;
    }

    /// Close without delivering a result
    pub fn destroy(&mut self) {
        self.result = None;
        self.state = ScreenState::Closed;
    }

    fn transition(&mut self, next: ScreenState) {
        match (self.state, next) {
            (ScreenState::Closed, _) => {
                log::warn!("{} is closed, ignoring transition to {next:?}", self.id);
            }
            (ScreenState::Opening, _) => {
                log::warn!("{} is still opening, ignoring transition to {next:?}", self.id);
            }
            _ => self.state = next,
        }
    }
}

fn build_model(
    store: &Arc<dyn ObjectStore>,
    schema: &Arc<EntitySchema>,
    descriptor: &ScreenDescriptor,
) -> CollectionModel {
    let mut extra = FieldValues::new();
    extra.insert("lang".to_string(), Value::from(descriptor.lang.clone()));
    extra.insert(
        "viewKind".to_string(),
        serde_json::to_value(descriptor.view_kind).unwrap_or(Value::Null),
    );

    let request = FetchRequest {
        entity: descriptor.entity.clone(),
        fields: schema.field_names(),
        domain: descriptor.domain.clone(),
        controller: (!descriptor.view_name.is_empty()).then(|| descriptor.view_name.clone()),
        extra,
    };
    CollectionModel::new(Arc::clone(store), Arc::clone(schema), request)
}
