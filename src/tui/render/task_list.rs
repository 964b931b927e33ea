use chrono::Local;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use regex::Regex;

use crate::model::task::Task;
use crate::ops::view::{self, Projection};
use crate::tui::app::App;
use crate::tui::theme::Theme;
use crate::util::unicode::truncate_to_width;

use super::helpers::{checkbox, spans_width};
use super::push_highlighted_spans;

/// Marker column + checkbox + space
const ROW_PREFIX_WIDTH: usize = 5;

/// Render the visible tasks, or the empty-state message
pub fn render_task_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let height = area.height as usize;
    let width = area.width as usize;

    let projection = app.session.view();
    if let Some(empty) = projection.empty {
        render_empty(frame, &app.theme, area, empty.message());
        return;
    }

    let scroll = adjust_scroll(&projection, app.cursor, app.scroll_offset, height);
    let now = app.session.store().now();
    let local_now = now.with_timezone(&Local);
    let search_re = app.search_re();

    let mut lines: Vec<Line> = Vec::new();
    for (i, task) in projection.tasks.iter().enumerate().skip(scroll) {
        if lines.len() >= height {
            break;
        }
        let is_cursor = i == app.cursor;
        let row = RowContext {
            theme: &app.theme,
            width,
            is_cursor,
            search_re: search_re.as_ref(),
        };
        lines.push(row.title_line(task, &local_now, now));
        if task.notes.is_some() && lines.len() < height {
            lines.push(row.notes_line(task));
        }
    }

    drop(projection);
    app.scroll_offset = scroll;

    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// Keep the cursor's task fully on screen
fn adjust_scroll(projection: &Projection, cursor: usize, scroll: usize, height: usize) -> usize {
    let rows = |t: &&Task| if t.notes.is_some() { 2 } else { 1 };
    let mut scroll = scroll.min(cursor);
    while scroll < cursor {
        let used: usize = projection.tasks[scroll..=cursor].iter().map(rows).sum();
        if used <= height {
            break;
        }
        scroll += 1;
    }
    scroll
}

struct RowContext<'a> {
    theme: &'a Theme,
    width: usize,
    is_cursor: bool,
    search_re: Option<&'a Regex>,
}

impl RowContext<'_> {
    fn row_bg(&self) -> ratatui::style::Color {
        if self.is_cursor {
            self.theme.selection_bg
        } else {
            self.theme.background
        }
    }

    fn highlight_style(&self) -> Style {
        Style::default()
            .fg(self.theme.search_match_fg)
            .bg(self.theme.search_match_bg)
    }

    /// `▎[x] Title                 !high  Today at 17:00`
    fn title_line<'t>(
        &self,
        task: &Task,
        local_now: &chrono::DateTime<Local>,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Line<'t> {
        let theme = self.theme;
        let row_bg = self.row_bg();

        let mut spans: Vec<Span> = Vec::new();
        if self.is_cursor {
            spans.push(Span::styled(
                "\u{258E}",
                Style::default().fg(theme.selection_border).bg(row_bg),
            ));
        } else {
            spans.push(Span::styled(" ", Style::default().bg(row_bg)));
        }
        let check_color = if task.completed { theme.green } else { theme.text };
        spans.push(Span::styled(
            format!("{} ", checkbox(task.completed)),
            Style::default().fg(check_color).bg(row_bg),
        ));

        // Badges on the right
        let mut badges: Vec<Span> = vec![Span::styled(
            format!("  !{}", task.priority),
            Style::default()
                .fg(theme.priority_color(task.priority))
                .bg(row_bg),
        )];
        if let Some(due) = &task.due_date {
            let color = if view::is_overdue(task, now) {
                theme.red
            } else if view::is_due_soon(task, now) {
                theme.yellow
            } else {
                theme.dim
            };
            badges.push(Span::styled(
                format!("  {}", view::format_due_date(due, local_now)),
                Style::default().fg(color).bg(row_bg),
            ));
        }
        badges.push(Span::styled(" ", Style::default().bg(row_bg)));
        let badges_width = spans_width(&badges);

        let title_budget = self
            .width
            .saturating_sub(ROW_PREFIX_WIDTH + badges_width);
        let title = truncate_to_width(&task.title, title_budget);
        let title_style = if task.completed {
            Style::default()
                .fg(theme.dim)
                .bg(row_bg)
                .add_modifier(Modifier::CROSSED_OUT)
        } else if self.is_cursor {
            Style::default().fg(theme.text_bright).bg(row_bg)
        } else {
            Style::default().fg(theme.text).bg(row_bg)
        };
        push_highlighted_spans(
            &mut spans,
            &title,
            title_style,
            self.highlight_style(),
            self.search_re,
        );

        let used = spans_width(&spans);
        if used + badges_width < self.width {
            spans.push(Span::styled(
                " ".repeat(self.width - used - badges_width),
                Style::default().bg(row_bg),
            ));
        }
        spans.extend(badges);
        Line::from(spans)
    }

    /// Dimmed first line of the notes, under the title
    fn notes_line<'t>(&self, task: &Task) -> Line<'t> {
        let row_bg = self.row_bg();
        let notes = task.notes_or_empty().lines().next().unwrap_or("");
        let more = task.notes_or_empty().lines().nth(1).is_some();
        let budget = self.width.saturating_sub(ROW_PREFIX_WIDTH + 1);
        let mut text = truncate_to_width(notes, budget);
        if more && !text.ends_with('\u{2026}') {
            text.push_str(" \u{2026}");
        }

        let mut spans: Vec<Span> = vec![Span::styled(
            " ".repeat(ROW_PREFIX_WIDTH),
            Style::default().bg(row_bg),
        )];
        push_highlighted_spans(
            &mut spans,
            &text,
            Style::default().fg(self.theme.dim).bg(row_bg),
            self.highlight_style(),
            self.search_re,
        );
        let used = spans_width(&spans);
        if used < self.width {
            spans.push(Span::styled(
                " ".repeat(self.width - used),
                Style::default().bg(row_bg),
            ));
        }
        Line::from(spans)
    }
}

fn render_empty(frame: &mut Frame, theme: &Theme, area: Rect, message: &str) {
    let top = area.height.saturating_sub(1) / 2;
    let mut lines: Vec<Line> = (0..top).map(|_| Line::from("")).collect();
    lines.push(Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(theme.dim).bg(theme.background),
    )));
    let paragraph = Paragraph::new(lines)
        .alignment(ratatui::layout::Alignment::Center)
        .style(Style::default().bg(theme.background));
    frame.render_widget(paragraph, area);
}
