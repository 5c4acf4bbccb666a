use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::{AppState, Workflow},
    form::{ExpenseForm, FormField, FormMode},
    ui::{
        components::badge::{category_badge, payment_badge},
        components::{card::Card, centered_rect},
        theme::Theme,
    },
};

/// The create/edit modal, drawn over the shell while a form is open.
pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let Workflow::FormOpen(form) = &state.workflow else {
        return;
    };

    let theme = Theme::default();
    let popup = centered_rect(60, 60, area);
    let title = match form.mode {
        FormMode::Create => "New Expense",
        FormMode::Edit(_) => "Edit Expense",
    };

    let mut lines: Vec<Line> = FormField::ALL
        .iter()
        .map(|field| field_line(form, *field, &theme))
        .collect();

    lines.push(Line::from(""));
    lines.push(match &form.error {
        Some(error) => Line::from(Span::styled(
            error.clone(),
            Style::default().fg(theme.error),
        )),
        None => Line::from(vec![
            Span::styled("Tab", Style::default().fg(theme.accent)),
            Span::raw(" next  "),
            Span::styled("←→", Style::default().fg(theme.accent)),
            Span::raw(" cycle  "),
            Span::styled("Enter", Style::default().fg(theme.accent)),
            Span::raw(" save  "),
            Span::styled("Esc", Style::default().fg(theme.accent)),
            Span::raw(" cancel"),
        ]),
    });

    let card = Card::new(title, &theme).focused(true);
    card.render_with(frame, popup, Paragraph::new(lines));
}

fn field_line(form: &ExpenseForm, field: FormField, theme: &Theme) -> Line<'static> {
    let focused = form.focus == field;
    let label_style = if focused {
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.dim)
    };

    let mut spans = vec![Span::styled(
        format!("{:<13}", field.label()),
        label_style,
    )];
    spans.extend(field_value(form, field, focused, theme));
    Line::from(spans)
}

fn field_value(
    form: &ExpenseForm,
    field: FormField,
    focused: bool,
    theme: &Theme,
) -> Vec<Span<'static>> {
    let buffer = |text: &str| {
        let mut spans = vec![Span::styled(
            text.to_string(),
            Style::default().fg(theme.text),
        )];
        if focused {
            spans.push(Span::styled("█", Style::default().fg(theme.accent)));
        }
        spans
    };

    let choice = |value: Span<'static>| {
        if focused {
            vec![
                Span::styled("◀ ", Style::default().fg(theme.accent)),
                value,
                Span::styled(" ▶", Style::default().fg(theme.accent)),
            ]
        } else {
            vec![value]
        }
    };

    match field {
        FormField::Title => buffer(&form.title),
        FormField::Amount => buffer(&form.amount),
        FormField::Date => buffer(&form.date),
        FormField::Description => buffer(&form.description),
        FormField::Category => choice(category_badge(form.category, theme)),
        FormField::Payment => choice(payment_badge(form.payment, theme)),
    }
}
