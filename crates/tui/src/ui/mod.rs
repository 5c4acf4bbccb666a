pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AppState, Section, Workflow};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let area = frame.area();
    let theme = Theme::default();

    // Main layout: info bar, tabs, content, bottom bar
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Length(2), // Tab bar (label + underline)
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    components::tabs::render_tabs(frame, layout[1], state.section, &theme);

    match state.section {
        Section::Expenses => screens::expenses::render(frame, layout[2], state),
        Section::Analytics => screens::analytics::render(frame, layout[2], state),
    }

    render_bottom_bar(frame, layout[3], state, &theme);
    screens::form::render(frame, area, state);
    screens::confirm::render(frame, area, state);
    components::toast::render(frame, area, state.toast.as_ref());
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let refresh = state
        .last_refresh
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    let ok = state.cache.list().error().is_none();
    let status = if ok { "OK" } else { "ERR" };
    let status_style = if ok {
        Style::default().fg(theme.positive)
    } else {
        Style::default().fg(theme.error)
    };

    let line = Line::from(vec![
        Span::styled("Spese", Style::default().fg(theme.accent)),
        Span::raw("  "),
        Span::styled("Server", Style::default().fg(theme.dim)),
        Span::raw(format!(": {}  ", state.base_url)),
        Span::styled("Refresh", Style::default().fg(theme.dim)),
        Span::raw(format!(": {refresh}  ")),
        Span::styled(status, status_style),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let mut parts = components::tabs::tab_shortcuts(theme);

    let context_hints = get_context_hints(state, theme);
    if !context_hints.is_empty() {
        parts.push(Span::styled("  │  ", Style::default().fg(theme.border)));
        parts.extend(context_hints);
    }

    parts.push(Span::styled("  │  ", Style::default().fg(theme.border)));
    if state.workflow.is_idle() && state.filter_panel.is_none() {
        parts.push(Span::styled("q", Style::default().fg(theme.accent)));
        parts.push(Span::raw(" quit"));
    } else {
        parts.push(Span::styled("Ctrl+C", Style::default().fg(theme.accent)));
        parts.push(Span::raw(" quit"));
    }

    let bar = Paragraph::new(Line::from(parts));
    frame.render_widget(bar, area);
}

/// Returns context-specific keyboard hints for the current mode.
fn get_context_hints(state: &AppState, theme: &Theme) -> Vec<Span<'static>> {
    match &state.workflow {
        Workflow::FormOpen(_) => vec![
            Span::styled("Tab", Style::default().fg(theme.accent)),
            Span::raw(" next  "),
            Span::styled("←→", Style::default().fg(theme.accent)),
            Span::raw(" cycle  "),
            Span::styled("Enter", Style::default().fg(theme.accent)),
            Span::raw(" save  "),
            Span::styled("Esc", Style::default().fg(theme.accent)),
            Span::raw(" cancel"),
        ],
        Workflow::ConfirmDelete(_) => vec![
            Span::styled("Enter", Style::default().fg(theme.accent)),
            Span::raw(" delete  "),
            Span::styled("Esc", Style::default().fg(theme.accent)),
            Span::raw(" keep"),
        ],
        Workflow::Idle if state.filter_panel.is_some() => vec![
            Span::styled("Tab", Style::default().fg(theme.accent)),
            Span::raw(" field  "),
            Span::styled("←→", Style::default().fg(theme.accent)),
            Span::raw(" cycle  "),
            Span::styled("Esc", Style::default().fg(theme.accent)),
            Span::raw(" close"),
        ],
        Workflow::Idle => match state.section {
            Section::Expenses => vec![
                Span::styled("↑↓", Style::default().fg(theme.accent)),
                Span::raw(" select  "),
                Span::styled("a", Style::default().fg(theme.accent)),
                Span::raw(" add  "),
                Span::styled("e", Style::default().fg(theme.accent)),
                Span::raw(" edit  "),
                Span::styled("d", Style::default().fg(theme.accent)),
                Span::raw(" delete  "),
                Span::styled("/", Style::default().fg(theme.accent)),
                Span::raw(" filters  "),
                Span::styled("s", Style::default().fg(theme.accent)),
                Span::raw(" sort  "),
                Span::styled("c", Style::default().fg(theme.accent)),
                Span::raw(" clear  "),
                Span::styled("r", Style::default().fg(theme.accent)),
                Span::raw(" refresh"),
            ],
            Section::Analytics => vec![
                Span::styled("r", Style::default().fg(theme.accent)),
                Span::raw(" refresh"),
            ],
        },
    }
}
