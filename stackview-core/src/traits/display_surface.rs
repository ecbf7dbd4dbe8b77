//! Display collaborators: screen visibility and text measurement

use crate::navigation::Breadcrumb;
use crate::utils::ScreenId;

/// Visible surface the navigation stack drives.
///
/// Suspended screens are hidden, not disposed, so the surface keeps whatever
/// state it holds for them.
pub trait DisplaySurface: Send + Sync {
    fn show(&self, screen: ScreenId);

    fn hide(&self, screen: ScreenId);

    /// Release everything held for a closed screen
    fn dispose(&self, screen: ScreenId);

    /// Busy indicator shown while a screen is opening
    fn set_busy(&self, busy: bool);

    fn render_breadcrumb(&self, breadcrumb: &Breadcrumb);
}

/// Rendered width of a label, in the unit the available width is expressed in
pub trait TextMeasure: Send + Sync {
    fn width(&self, text: &str) -> usize;
}
