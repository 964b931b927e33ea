use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::session::StatusKind;
use crate::tui::app::{App, Mode};

use crate::util::unicode::truncate_to_width;

use super::helpers::spans_width;

const KEY_HINTS: &str = "a add  e edit  \u{2423} toggle  d delete  / search  \u{21E5} filter  t theme  q quit";

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let line = match app.mode {
        Mode::Search => {
            // Search prompt: /term▌
            let spans = vec![
                Span::styled(
                    format!("/{}", app.session.search()),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
                Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)), // ▌ cursor
            ];
            with_hint(spans, "Enter keep  Esc clear", app.theme.dim, bg, width)
        }
        _ => navigate_line(app, width),
    };

    let paragraph = Paragraph::new(line).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// Status message, else undo offer, else active search, else key hints
fn navigate_line(app: &App, width: usize) -> Line<'static> {
    let bg = app.theme.background;
    let dim = Style::default().fg(app.theme.dim).bg(bg);

    if let Some((message, _)) = &app.status {
        let color = match message.kind {
            StatusKind::Info => app.theme.green,
            StatusKind::Error => app.theme.red,
        };
        return Line::from(Span::styled(
            format!(" {}", message.text),
            Style::default().fg(color).bg(bg),
        ));
    }

    if let Some(offer) = &app.undo_offer {
        let remaining = offer.expires_at - app.session.store().now();
        let secs = (remaining.num_milliseconds() + 999) / 1000;
        if secs > 0 {
            let text = Style::default().fg(app.theme.text).bg(bg);
            let tail = format!(" undo ({}s)", secs);
            // Room left for the title after the fixed parts and quotes
            let fixed = " Deleted \"\" \u{00B7} u".chars().count() + tail.chars().count();
            let title = truncate_to_width(&offer.title, width.saturating_sub(fixed).max(1));
            return Line::from(vec![
                Span::styled(" Deleted \"", text),
                Span::styled(title, Style::default().fg(app.theme.text_bright).bg(bg)),
                Span::styled("\" \u{00B7} ", text),
                Span::styled("u", Style::default().fg(app.theme.highlight).bg(bg)),
                Span::styled(tail, text),
            ]);
        }
    }

    if !app.session.search().is_empty() {
        let spans = vec![Span::styled(format!("/{}", app.session.search()), dim)];
        return with_hint(spans, "Esc clear", app.theme.dim, bg, width);
    }

    if app.config.ui.show_key_hints {
        return Line::from(Span::styled(format!(" {}", KEY_HINTS), dim));
    }
    Line::from(Span::styled(" ".repeat(width), Style::default().bg(bg)))
}

/// Right-align a dim hint after `spans` when it fits
fn with_hint(
    mut spans: Vec<Span<'static>>,
    hint: &'static str,
    fg: Color,
    bg: Color,
    width: usize,
) -> Line<'static> {
    let content_width = spans_width(&spans);
    let hint_width = hint.chars().count();
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, Style::default().fg(fg).bg(bg)));
    }
    Line::from(spans)
}
