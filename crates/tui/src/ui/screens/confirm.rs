use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::{AppState, Workflow},
    ui::{
        components::{card::Card, centered_rect},
        theme::Theme,
    },
};

/// The delete confirmation dialog. Nothing is deleted while this is on
/// screen; the record goes only after an explicit yes.
pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let Workflow::ConfirmDelete(confirm) = &state.workflow else {
        return;
    };

    let theme = Theme::default();
    let popup = centered_rect(50, 30, area);

    let mut lines = vec![
        Line::from(vec![
            Span::raw("Delete "),
            Span::styled(
                format!("\"{}\"", confirm.target.title),
                Style::default()
                    .fg(theme.text)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" ({})?", confirm.target.amount)),
        ]),
        Line::from(Span::styled(
            "This cannot be undone.",
            Style::default().fg(theme.dim),
        )),
        Line::from(""),
    ];

    if let Some(error) = &confirm.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(theme.error),
        )));
    }

    lines.push(Line::from(vec![
        Span::styled("Enter", Style::default().fg(theme.accent)),
        Span::raw("/"),
        Span::styled("y", Style::default().fg(theme.accent)),
        Span::raw(" delete  "),
        Span::styled("Esc", Style::default().fg(theme.accent)),
        Span::raw("/"),
        Span::styled("n", Style::default().fg(theme.accent)),
        Span::raw(" keep"),
    ]));

    let card = Card::new("Delete Expense", &theme).focused(true);
    card.render_with(frame, popup, Paragraph::new(lines));
}
