use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Paragraph},
};

use api_types::Category;
use api_types::summary::CategorySummary;

use crate::{app::AppState, ui::components::card::Card, ui::theme::Theme};

/// Server-computed breakdowns: per-category totals and per-month totals.
/// Both come from the cache and degrade the same way the list does.
pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let categories = state.cache.by_category();
    let monthly = state.cache.by_month();

    if categories.data().is_none() && monthly.data().is_none() {
        let card = Card::new("Analytics", &theme);
        let inner = card.inner(area);
        card.render_frame(frame, area);

        let line = if let Some(err) = categories.error().or(monthly.error()) {
            Line::from(vec![
                Span::styled(err.to_string(), Style::default().fg(theme.error)),
                Span::raw(" Press "),
                Span::styled("r", Style::default().fg(theme.accent)),
                Span::raw(" to refresh."),
            ])
        } else {
            Line::from(Span::styled(
                "Loading analytics…",
                Style::default().fg(theme.dim),
            ))
        };

        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), inner);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(Category::ALL.len() as u16 + 2),
            Constraint::Min(5),
        ])
        .split(area);

    render_category_breakdown(frame, layout[0], state, &theme);
    render_monthly_totals(frame, layout[1], state, &theme);
}

fn render_category_breakdown(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let query = state.cache.by_category();
    let title = if query.is_stale() {
        "By Category · refreshing"
    } else {
        "By Category"
    };
    let card = Card::new(title, theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    let Some(data) = query.data() else {
        render_query_note(frame, inner, query.error().map(ToString::to_string), theme);
        return;
    };
    if data.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No category data yet.",
                Style::default().fg(theme.dim),
            ))
            .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let mut rows: Vec<&CategorySummary> = data.iter().collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total));
    let grand = rows.iter().fold(0i64, |acc, s| acc + s.total.cents());

    let lines: Vec<Line> = rows
        .iter()
        .take(inner.height as usize)
        .map(|summary| {
            let pct = if grand > 0 {
                (summary.total.cents() as f64 / grand as f64 * 100.0) as u16
            } else {
                0
            };

            let bar_width = 20;
            let filled = ((pct as usize * bar_width) / 100).min(bar_width);
            let empty = bar_width.saturating_sub(filled);
            let bar = format!("{}{}", "█".repeat(filled), "░".repeat(empty));
            let color = theme.category(summary.category);

            Line::from(vec![
                Span::styled(
                    format!("{:<14}", summary.category.as_str()),
                    Style::default().fg(color),
                ),
                Span::styled(
                    format!("{:>12}", summary.total.to_string()),
                    Style::default().fg(theme.text),
                ),
                Span::raw("  "),
                Span::styled(bar, Style::default().fg(color)),
                Span::styled(format!(" {pct:>3}%"), Style::default().fg(theme.dim)),
                Span::styled(
                    format!("  {} expenses", summary.count),
                    Style::default().fg(theme.dim),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_monthly_totals(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let query = state.cache.by_month();
    let title = if query.is_stale() {
        "Monthly Totals · refreshing"
    } else {
        "Monthly Totals"
    };
    let card = Card::new(title, theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    let Some(data) = query.data() else {
        render_query_note(frame, inner, query.error().map(ToString::to_string), theme);
        return;
    };
    if data.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No monthly data yet.",
                Style::default().fg(theme.dim),
            ))
            .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    // Bar heights are whole currency units; the exact totals stay on the
    // category panel.
    let bars: Vec<(String, u64)> = data
        .iter()
        .map(|summary| {
            let dollars = (summary.total.cents() / 100).max(0) as u64;
            (short_label(&summary.month), dollars)
        })
        .collect();
    let bar_data: Vec<(&str, u64)> = bars.iter().map(|(label, v)| (label.as_str(), *v)).collect();

    let chart = BarChart::default()
        .data(&bar_data)
        .bar_width(7)
        .bar_gap(2)
        .bar_style(Style::default().fg(theme.accent))
        .value_style(Style::default().fg(theme.dim).add_modifier(Modifier::BOLD))
        .label_style(Style::default().fg(theme.dim));

    frame.render_widget(chart, inner);
}

fn render_query_note(frame: &mut Frame<'_>, area: Rect, error: Option<String>, theme: &Theme) {
    let line = match error {
        Some(err) => Line::from(vec![
            Span::styled(err, Style::default().fg(theme.error)),
            Span::raw(" Press "),
            Span::styled("r", Style::default().fg(theme.accent)),
            Span::raw(" to refresh."),
        ]),
        None => Line::from(Span::styled("Loading…", Style::default().fg(theme.dim))),
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

/// `"2024-02"` becomes `"Feb 24"`; anything unparseable stays as-is.
fn short_label(month: &str) -> String {
    let mut parts = month.splitn(2, '-');
    let year = parts.next().unwrap_or_default();
    let Some(num) = parts.next().and_then(|m| m.parse::<u32>().ok()) else {
        return month.to_string();
    };
    let year_short = year.get(2..).unwrap_or(year);
    format!("{} {year_short}", month_name_short(num))
}

fn month_name_short(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        12 => "Dec",
        _ => "???",
    }
}
