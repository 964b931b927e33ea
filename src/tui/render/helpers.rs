use ratatui::layout::Rect;
use ratatui::text::Span;

use crate::util::unicode;

/// Checkbox for a task's completion state
pub(super) fn checkbox(completed: bool) -> &'static str {
    if completed { "[x]" } else { "[ ]" }
}

/// Compute total display width of a slice of spans
pub(super) fn spans_width(spans: &[Span]) -> usize {
    spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum()
}

pub(super) fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_popup_fits() {
        let r = centered_rect_fixed(40, 10, Rect::new(0, 0, 80, 24));
        assert_eq!(r, Rect::new(20, 7, 40, 10));
        let r = centered_rect_fixed(100, 10, Rect::new(0, 0, 80, 24));
        assert_eq!(r.width, 80);
    }

    #[test]
    fn span_widths_count_cells() {
        let spans = vec![Span::raw("ab"), Span::raw("你")];
        assert_eq!(spans_width(&spans), 4);
    }
}
