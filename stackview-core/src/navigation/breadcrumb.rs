//! Breadcrumb layout
//!
//! Greedy fit from the active screen towards the root: ancestors are added while
//! their labels (plus separator) still fit, the rest collapses into one ellipsis
//! crumb. An active label that alone overflows is truncated.

use crate::traits::TextMeasure;

/// Ellipsis used for collapsed ancestors and truncated labels
pub const ELLIPSIS: &str = "…";

/// One breadcrumb entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Crumb {
    /// Screen label; `depth` is the distance from the active screen (0 = active)
    Screen { label: String, depth: usize },
    /// Stand-in for every ancestor that did not fit
    Ellipsis,
}

/// Breadcrumb trail in display order (root side first)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breadcrumb {
    pub crumbs: Vec<Crumb>,
}

impl Breadcrumb {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.crumbs.is_empty()
    }

    /// Render as plain text
    #[must_use]
    pub fn render(&self, separator: &str) -> String {
        self.crumbs
            .iter()
            .map(|crumb| match crumb {
                Crumb::Screen { label, .. } => label.as_str(),
                Crumb::Ellipsis => ELLIPSIS,
            })
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Lay out `labels` (active screen first, root last) within `available` width.
pub fn layout(
    labels: &[&str],
    available: usize,
    separator: &str,
    measure: &dyn TextMeasure,
) -> Breadcrumb {
    let Some((active, ancestors)) = labels.split_first() else {
        return Breadcrumb::default();
    };

    let active_width = measure.width(active);
    if active_width > available {
        return Breadcrumb {
            crumbs: vec![Crumb::Screen {
                label: truncate_to_fit(active, available, measure),
                depth: 0,
            }],
        };
    }

    let separator_width = measure.width(separator);
    let mut used = active_width;
    let mut crumbs = vec![Crumb::Screen {
        label: (*active).to_string(),
        depth: 0,
    }];

    for (offset, label) in ancestors.iter().enumerate() {
        let cost = separator_width + measure.width(label);
        if used + cost > available {
            crumbs.push(Crumb::Ellipsis);
            break;
        }
        used += cost;
        crumbs.push(Crumb::Screen {
            label: (*label).to_string(),
            depth: offset + 1,
        });
    }

    crumbs.reverse();
    Breadcrumb { crumbs }
}

/// Longest prefix of `label` that fits in `available` together with a trailing ellipsis
fn truncate_to_fit(label: &str, available: usize, measure: &dyn TextMeasure) -> String {
    let mut fitted = String::new();
    for ch in label.chars() {
        let mut candidate = fitted.clone();
        candidate.push(ch);
        candidate.push_str(ELLIPSIS);
        if measure.width(&candidate) > available {
            break;
        }
        fitted.push(ch);
    }
    fitted.push_str(ELLIPSIS);
    fitted
}
