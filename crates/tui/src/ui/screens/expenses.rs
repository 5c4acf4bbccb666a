use chrono::Local;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
};

use api_types::expense::Expense;
use engine::{CategoryFilter, FilterCriteria};

use crate::{
    app::{AppState, FilterField, FilterPanel},
    ui::{
        components::badge::{category_badge, payment_badge},
        components::card::{Card, StatCard},
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let filter_height = if state.filter_panel.is_some() { 4 } else { 1 };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(filter_height),
            Constraint::Min(0),
        ])
        .split(area);

    render_stat_row(frame, layout[0], state, &theme);
    match &state.filter_panel {
        Some(panel) => render_filter_panel(frame, layout[1], state, panel, &theme),
        None => render_filter_summary(frame, layout[1], state, &theme),
    }
    render_list(frame, layout[2], state, &theme);
}

fn render_stat_row(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let stats = state.stats();
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    StatCard::new("Total Spent", stats.total.to_string(), theme)
        .subtitle(format!("{} expenses", stats.count))
        .render(frame, cols[0]);

    StatCard::new("This Month", stats.this_month.to_string(), theme)
        .subtitle(Local::now().format("%B %Y").to_string())
        .render(frame, cols[1]);

    StatCard::new("Average", stats.average.to_string(), theme)
        .subtitle("per expense")
        .render(frame, cols[2]);

    match stats.top_category {
        Some(category) => StatCard::new("Top Category", category.as_str(), theme)
            .value_color(theme.category(category))
            .subtitle("highest total")
            .render(frame, cols[3]),
        None => StatCard::new("Top Category", "—", theme).render(frame, cols[3]),
    }
}

/// The filter bar in edit mode: every dimension on one line, the focused
/// field highlighted, criteria applying as they change.
fn render_filter_panel(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &AppState,
    panel: &FilterPanel,
    theme: &Theme,
) {
    let mut spans = Vec::new();
    for (i, field) in FilterField::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("   "));
        }
        let focused = panel.focus == *field;
        let label_style = if focused {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.dim)
        };
        spans.push(Span::styled(field.label(), label_style));
        spans.push(Span::raw(": "));
        spans.extend(field_value(state, panel, *field, focused, theme));
    }

    let hints = Line::from(vec![
        Span::styled("Tab", Style::default().fg(theme.accent)),
        Span::raw(" next  "),
        Span::styled("←→", Style::default().fg(theme.accent)),
        Span::raw(" cycle  "),
        Span::styled("Esc", Style::default().fg(theme.accent)),
        Span::raw(" close"),
    ]);

    let card = Card::new("Filters", theme).focused(true);
    card.render_with(frame, area, Paragraph::new(vec![Line::from(spans), hints]));
}

fn field_value(
    state: &AppState,
    panel: &FilterPanel,
    field: FilterField,
    focused: bool,
    theme: &Theme,
) -> Vec<Span<'static>> {
    let text_style = Style::default().fg(theme.text);
    let cursor = |spans: &mut Vec<Span<'static>>| {
        if focused {
            spans.push(Span::styled("█", Style::default().fg(theme.accent)));
        }
    };

    match field {
        FilterField::Search => {
            let mut spans = vec![Span::styled(state.criteria.search.clone(), text_style)];
            cursor(&mut spans);
            spans
        }
        FilterField::From => {
            let mut spans = vec![Span::styled(panel.from_input.clone(), text_style)];
            cursor(&mut spans);
            spans
        }
        FilterField::To => {
            let mut spans = vec![Span::styled(panel.to_input.clone(), text_style)];
            cursor(&mut spans);
            spans
        }
        FilterField::Category => choice_value(
            match state.criteria.category {
                CategoryFilter::All => Span::styled(
                    "All Categories".to_string(),
                    Style::default().fg(theme.text),
                ),
                CategoryFilter::Only(category) => category_badge(category, theme),
            },
            focused,
            theme,
        ),
        FilterField::Sort => choice_value(
            Span::styled(state.criteria.sort.label(), text_style),
            focused,
            theme,
        ),
    }
}

fn choice_value(value: Span<'static>, focused: bool, theme: &Theme) -> Vec<Span<'static>> {
    if focused {
        vec![
            Span::styled("◀ ", Style::default().fg(theme.accent)),
            value,
            Span::styled(" ▶", Style::default().fg(theme.accent)),
        ]
    } else {
        vec![value]
    }
}

/// One-line digest shown while the filter bar is closed: visible count,
/// sort order, active criteria, and any fetch problem.
fn render_filter_summary(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let shown = state.filtered().len();
    let total = state
        .cache
        .expenses()
        .map(|records| records.len())
        .unwrap_or_default();

    let mut spans = vec![
        Span::raw(" "),
        Span::styled(
            format!("Showing {shown} of {total} expenses"),
            Style::default().fg(theme.dim),
        ),
        Span::styled("  ·  Sort: ", Style::default().fg(theme.dim)),
        Span::styled(state.criteria.sort.label(), Style::default().fg(theme.text)),
    ];

    if state.criteria.is_active() {
        spans.push(Span::styled("  ·  Filter: ", Style::default().fg(theme.dim)));
        spans.push(Span::styled(
            describe_criteria(&state.criteria),
            Style::default().fg(theme.accent),
        ));
    }

    let list = state.cache.list();
    if let Some(err) = list.error() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            err.to_string(),
            Style::default().fg(theme.error),
        ));
        if list.data().is_some() {
            spans.push(Span::styled(
                " (showing cached data)",
                Style::default().fg(theme.dim),
            ));
        }
    } else if list.is_loading() {
        spans.push(Span::styled("  loading…", Style::default().fg(theme.dim)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn describe_criteria(criteria: &FilterCriteria) -> String {
    let mut parts = Vec::new();
    if !criteria.search.trim().is_empty() {
        parts.push(format!("\"{}\"", criteria.search.trim()));
    }
    if let CategoryFilter::Only(category) = criteria.category {
        parts.push(category.as_str().to_string());
    }
    match (criteria.date_from, criteria.date_to) {
        (Some(from), Some(to)) => parts.push(format!("{from} – {to}")),
        (Some(from), None) => parts.push(format!("from {from}")),
        (None, Some(to)) => parts.push(format!("until {to}")),
        (None, None) => {}
    }
    parts.join(", ")
}

fn render_list(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let query = state.cache.list();

    // A failed first fetch has nothing to fall back on; show how to
    // recover instead of an empty list.
    if query.data().is_none() {
        let card = Card::new("Expenses", theme);
        let inner = card.inner(area);
        card.render_frame(frame, area);

        let lines = if let Some(err) = query.error() {
            vec![
                Line::from(Span::styled(
                    err.to_string(),
                    Style::default().fg(theme.error),
                )),
                Line::from(""),
                Line::from(vec![
                    Span::raw("Check that the service at "),
                    Span::styled(state.base_url.clone(), Style::default().fg(theme.accent)),
                    Span::raw(" is reachable, then press "),
                    Span::styled("r", Style::default().fg(theme.accent)),
                    Span::raw(" to retry."),
                ]),
            ]
        } else {
            vec![Line::from(Span::styled(
                "Loading expenses…",
                Style::default().fg(theme.dim),
            ))]
        };

        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let view = state.filtered();
    let total = state
        .cache
        .expenses()
        .map(|records| records.len())
        .unwrap_or_default();

    if view.is_empty() {
        let card = Card::new("Expenses", theme);
        let inner = card.inner(area);
        card.render_frame(frame, area);

        let line = if total == 0 {
            Line::from(vec![
                Span::styled("No expenses yet. Press ", Style::default().fg(theme.dim)),
                Span::styled("a", Style::default().fg(theme.accent)),
                Span::styled(
                    " to add your first expense.",
                    Style::default().fg(theme.dim),
                ),
            ])
        } else {
            Line::from(vec![
                Span::styled(
                    "No expenses match the current filters. Press ",
                    Style::default().fg(theme.dim),
                ),
                Span::styled("c", Style::default().fg(theme.accent)),
                Span::styled(" to clear them.", Style::default().fg(theme.dim)),
            ])
        };

        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), inner);
        return;
    }

    let items = view
        .iter()
        .map(|expense| ListItem::new(expense_line(expense, theme)))
        .collect::<Vec<_>>();

    let mut list_state = ListState::default();
    list_state.select(Some(state.selected.min(items.len() - 1)));

    let title = if query.is_stale() {
        "Expenses · refreshing"
    } else {
        "Expenses"
    };
    let list = List::new(items)
        .block(Card::new(title, theme).block())
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn expense_line(expense: &Expense, theme: &Theme) -> Line<'static> {
    let date = expense.date.format("%d %b %Y").to_string();
    let amount = format!("{:>10}", expense.amount.to_string());
    let title = pad_truncated(&expense.title, 28);

    let mut spans = vec![
        Span::styled(date, Style::default().fg(theme.dim)),
        Span::raw("  "),
        Span::styled(
            amount,
            Style::default()
                .fg(theme.text)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(title, Style::default().fg(theme.text)),
        Span::raw("  "),
        category_badge(expense.category, theme),
        Span::raw("  "),
        payment_badge(expense.payment_method, theme),
    ];

    if let Some(description) = &expense.description {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            pad_truncated(description, 40),
            Style::default().fg(theme.dim),
        ));
    }

    Line::from(spans)
}

/// Pads or truncates on character boundaries to keep columns aligned.
fn pad_truncated(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width).collect();
    if text.chars().count() > width {
        out.pop();
        out.push('…');
    }
    while out.chars().count() < width {
        out.push(' ');
    }
    out
}
