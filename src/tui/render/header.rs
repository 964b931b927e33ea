use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::view::{Filter, count_label};
use crate::tui::app::App;

use super::helpers::spans_width;

/// Render the header: app name, filter tabs and count, with a separator below
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // tabs
            Constraint::Length(1), // separator
        ])
        .split(area);

    let sep_cols = render_tabs(frame, app, chunks[0]);
    render_separator(frame, app, chunks[1], &sep_cols);
}

/// Render tabs and return the column positions of each separator character.
fn render_tabs(frame: &mut Frame, app: &App, area: Rect) -> Vec<usize> {
    let bg = app.theme.background;
    let bg_style = Style::default().bg(bg);
    let sep = Span::styled("\u{2502}", Style::default().fg(app.theme.dim).bg(bg));

    let mut spans: Vec<Span> = vec![
        Span::styled(" ", bg_style),
        Span::styled(
            "tasklist",
            Style::default()
                .fg(app.theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ", bg_style),
    ];
    let mut sep_cols = vec![spans_width(&spans)];
    spans.push(sep.clone());

    let current = app.session.filter();
    for (i, filter) in Filter::ALL.iter().enumerate() {
        let style = tab_style(app, *filter == current);
        spans.push(Span::styled(format!(" {} {} ", i + 1, filter.label()), style));
        sep_cols.push(spans_width(&spans));
        spans.push(sep.clone());
    }

    // Right-aligned count of visible tasks
    let count = format!("{} ", count_label(app.visible_count()));
    let used = spans_width(&spans);
    let width = area.width as usize;
    if used + count.len() < width {
        spans.push(Span::styled(" ".repeat(width - used - count.len()), bg_style));
        spans.push(Span::styled(count, Style::default().fg(app.theme.dim).bg(bg)));
    }

    let tabs = Paragraph::new(Line::from(spans)).style(bg_style);
    frame.render_widget(tabs, area);
    sep_cols
}

fn render_separator(frame: &mut Frame, app: &App, area: Rect, sep_cols: &[usize]) {
    let width = area.width as usize;
    let mut line: String = String::with_capacity(width * 3);
    for col in 0..width {
        if sep_cols.contains(&col) {
            line.push('\u{2534}');
        } else {
            line.push('\u{2500}');
        }
    }
    let sep_widget =
        Paragraph::new(line).style(Style::default().fg(app.theme.dim).bg(app.theme.background));
    frame.render_widget(sep_widget, area);
}

/// Style for a tab: highlighted if current, normal otherwise
fn tab_style(app: &App, is_current: bool) -> Style {
    if is_current {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.text).bg(app.theme.background)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn header_shows_filters_and_count() {
        let (mut app, _) = app_with_tasks(&["a", "b", "c"]);
        app.session.set_search("a");
        let output = render_to_string(TERM_W, 2, |frame, area| {
            render_header(frame, &app, area);
        });
        let first = output.lines().next().unwrap();
        assert!(first.starts_with(" tasklist \u{2502} 1 All \u{2502} 2 Completed \u{2502} 3 Pending \u{2502}"));
        assert!(first.ends_with("1 task"));
        assert!(output.lines().nth(1).unwrap().contains('\u{2534}'));
    }
}
