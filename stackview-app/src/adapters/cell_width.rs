//! Terminal cell width measurement

use stackview_core::TextMeasure;
use unicode_width::UnicodeWidthStr;

/// Measures labels in terminal cells (wide CJK characters count twice)
#[derive(Debug, Default, Clone, Copy)]
pub struct CellWidthMeasure;

impl TextMeasure for CellWidthMeasure {
    fn width(&self, text: &str) -> usize {
        UnicodeWidthStr::width(text)
    }
}
