//! Display surface that logs what it would render

use std::sync::{Mutex, PoisonError};

use stackview_core::{Breadcrumb, DisplaySurface, ScreenId};

/// Surface for headless hosts: every call is logged and the visible screen
/// and the last breadcrumb are kept for inspection.
pub struct LogSurface {
    separator: String,
    visible: Mutex<Option<ScreenId>>,
    breadcrumb: Mutex<String>,
}

impl LogSurface {
    #[must_use]
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            visible: Mutex::new(None),
            breadcrumb: Mutex::new(String::new()),
        }
    }

    /// Screen shown last, unless it has been hidden or disposed since
    #[must_use]
    pub fn visible(&self) -> Option<ScreenId> {
        *self.visible.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Last rendered breadcrumb
    #[must_use]
    pub fn breadcrumb(&self) -> String {
        self.breadcrumb
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn forget(&self, screen: ScreenId) {
        let mut visible = self.visible.lock().unwrap_or_else(PoisonError::into_inner);
        if *visible == Some(screen) {
            *visible = None;
        }
    }
}

impl DisplaySurface for LogSurface {
    fn show(&self, screen: ScreenId) {
        log::debug!("show {screen}");
        *self.visible.lock().unwrap_or_else(PoisonError::into_inner) = Some(screen);
    }

    fn hide(&self, screen: ScreenId) {
        log::debug!("hide {screen}");
        self.forget(screen);
    }

    fn dispose(&self, screen: ScreenId) {
        log::debug!("dispose {screen}");
        self.forget(screen);
    }

    fn set_busy(&self, busy: bool) {
        log::trace!("busy: {busy}");
    }

    fn render_breadcrumb(&self, breadcrumb: &Breadcrumb) {
        let text = breadcrumb.render(&self.separator);
        log::info!("{text}");
        *self.breadcrumb.lock().unwrap_or_else(PoisonError::into_inner) = text;
    }
}
