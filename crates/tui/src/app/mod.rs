//! Workflow coordination between the cache, the derived views and the UI.
//!
//! [`App`] owns the event loop. Record mutations run to completion inline:
//! a submit awaits the service call *and* the cache reload before the
//! workflow leaves its current state, so a closed form always means the
//! list on screen already reflects the change. Filter edits never touch
//! the workflow; they only re-run the pure view pipeline over the cached
//! snapshot.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local, NaiveDate};
use crossterm::event::{self, Event, KeyEvent};

use api_types::expense::Expense;
use engine::{FilterCriteria, Stats};

use crate::{
    cache::ExpenseCache,
    client::Client,
    config::AppConfig,
    error::{AppError, Result},
    form::{ExpenseForm, FormMode},
    ui::{self, keymap::AppAction},
};

const TICK_RATE: Duration = Duration::from_millis(200);
const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Expenses,
    Analytics,
}

impl Section {
    pub fn label(self) -> &'static str {
        match self {
            Self::Expenses => "Expenses",
            Self::Analytics => "Analytics",
        }
    }
}

/// The modal record workflow. One mutating interaction is open at a time;
/// the variants make "form and delete dialog both open" unrepresentable.
#[derive(Debug)]
pub enum Workflow {
    Idle,
    FormOpen(ExpenseForm),
    ConfirmDelete(DeleteConfirm),
}

impl Workflow {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// A pending deletion awaiting the user's confirmation.
#[derive(Debug)]
pub struct DeleteConfirm {
    pub target: Expense,
    /// Message from the last failed delete attempt.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

/// A short-lived notification drawn over the bottom-right corner.
#[derive(Debug)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    shown_at: Instant,
}

impl ToastState {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: ToastLevel::Success,
            shown_at: Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: ToastLevel::Error,
            shown_at: Instant::now(),
        }
    }

    fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= TOAST_TTL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Search,
    Category,
    From,
    To,
    Sort,
}

impl FilterField {
    pub const ALL: [FilterField; 5] = [
        FilterField::Search,
        FilterField::Category,
        FilterField::From,
        FilterField::To,
        FilterField::Sort,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Search => "Search",
            Self::Category => "Category",
            Self::From => "From",
            Self::To => "To",
            Self::Sort => "Sort",
        }
    }

    #[must_use]
    fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    #[must_use]
    fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Edit-mode state for the filter bar.
///
/// The date fields keep raw text buffers; a buffer only reaches the
/// criteria once it parses as a calendar day (or empties the bound), so
/// half-typed dates never produce a half-applied filter.
#[derive(Debug)]
pub struct FilterPanel {
    pub focus: FilterField,
    pub from_input: String,
    pub to_input: String,
}

impl FilterPanel {
    fn open(criteria: &FilterCriteria) -> Self {
        Self {
            focus: FilterField::Search,
            from_input: criteria.date_from.map(|d| d.to_string()).unwrap_or_default(),
            to_input: criteria.date_to.map(|d| d.to_string()).unwrap_or_default(),
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub cache: ExpenseCache,
    pub criteria: FilterCriteria,
    pub workflow: Workflow,
    /// `Some` while the filter bar has keyboard focus.
    pub filter_panel: Option<FilterPanel>,
    pub section: Section,
    /// Cursor into the filtered view.
    pub selected: usize,
    pub toast: Option<ToastState>,
    pub last_refresh: Option<DateTime<Local>>,
    pub base_url: String,
}

impl AppState {
    fn new(base_url: String) -> Self {
        Self {
            cache: ExpenseCache::default(),
            criteria: FilterCriteria::default(),
            workflow: Workflow::Idle,
            filter_panel: None,
            section: Section::Expenses,
            selected: 0,
            toast: None,
            last_refresh: None,
            base_url,
        }
    }

    /// The current filtered/sorted view over the cached snapshot.
    pub fn filtered(&self) -> Vec<&Expense> {
        engine::apply(self.records(), &self.criteria)
    }

    /// Aggregates over the full snapshot (not the filtered view), with
    /// "this month" anchored to the local calendar.
    pub fn stats(&self) -> Stats {
        self.stats_at(Local::now().date_naive())
    }

    pub fn stats_at(&self, reference: NaiveDate) -> Stats {
        Stats::compute(self.records(), reference)
    }

    fn records(&self) -> &[Expense] {
        self.cache.expenses().unwrap_or_default()
    }

    pub fn selected_expense(&self) -> Option<&Expense> {
        self.filtered().get(self.selected).copied()
    }

    fn clamp_selection(&mut self) {
        let len = self.filtered().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn select_next(&mut self) {
        let len = self.filtered().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

pub struct App {
    config: AppConfig,
    client: Client,
    pub state: AppState,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::new(
            &config.base_url,
            Duration::from_millis(config.request_timeout_ms),
        )?;
        let state = AppState::new(config.base_url.clone());

        Ok(Self {
            config,
            client,
            state,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        // A dead service must not kill the app: the error lands on the
        // cache queries and the screen shows how to recover.
        self.refresh().await;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        while !self.should_quit {
            if self.state.toast.as_ref().is_some_and(ToastState::is_expired) {
                self.state.toast = None;
            }

            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(TICK_RATE)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key).await?,
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }

        Ok(())
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let action = ui::keymap::map_key(key);
        if action == AppAction::Quit {
            self.should_quit = true;
            return Ok(());
        }

        match self.state.workflow {
            Workflow::FormOpen(_) => self.handle_form_key(action).await,
            Workflow::ConfirmDelete(_) => self.handle_confirm_key(action).await,
            Workflow::Idle if self.state.filter_panel.is_some() => {
                self.handle_filter_key(action);
            }
            Workflow::Idle => self.handle_idle_key(action).await,
        }

        Ok(())
    }

    async fn handle_idle_key(&mut self, action: AppAction) {
        match action {
            AppAction::Up => self.state.select_prev(),
            AppAction::Down => self.state.select_next(),
            AppAction::Input(ch) => self.handle_idle_char(ch).await,
            _ => {}
        }
    }

    async fn handle_idle_char(&mut self, ch: char) {
        match ch {
            'q' | 'Q' => self.should_quit = true,
            '1' => self.state.section = Section::Expenses,
            '2' => self.state.section = Section::Analytics,
            'j' | 'J' => self.state.select_next(),
            'k' | 'K' => self.state.select_prev(),
            'a' | 'A' => self.request_create(),
            'e' | 'E' => self.request_edit(),
            'd' | 'D' => self.request_delete(),
            '/' => self.state.filter_panel = Some(FilterPanel::open(&self.state.criteria)),
            'c' | 'C' => self.clear_filters(),
            's' | 'S' => self.cycle_sort(),
            'r' | 'R' => self.refresh().await,
            _ => {}
        }
    }

    async fn handle_form_key(&mut self, action: AppAction) {
        match action {
            AppAction::Submit => self.submit_form().await,
            AppAction::Cancel => self.cancel(),
            _ => {
                let Workflow::FormOpen(form) = &mut self.state.workflow else {
                    return;
                };
                match action {
                    AppAction::NextField | AppAction::Down => form.focus_next(),
                    AppAction::PrevField | AppAction::Up => form.focus_prev(),
                    AppAction::Right => form.cycle(true),
                    AppAction::Left => form.cycle(false),
                    AppAction::Backspace => form.backspace(),
                    AppAction::Input(ch) => form.push(ch),
                    _ => {}
                }
            }
        }
    }

    async fn handle_confirm_key(&mut self, action: AppAction) {
        match action {
            AppAction::Submit | AppAction::Input('y') | AppAction::Input('Y') => {
                self.confirm_delete().await;
            }
            AppAction::Cancel | AppAction::Input('n') | AppAction::Input('N') => self.cancel(),
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, action: AppAction) {
        let Some(panel) = &mut self.state.filter_panel else {
            return;
        };

        match action {
            // Enter and Esc both leave the bar; criteria always apply live.
            AppAction::Submit | AppAction::Cancel => {
                self.state.filter_panel = None;
                return;
            }
            AppAction::NextField | AppAction::Down => panel.focus = panel.focus.next(),
            AppAction::PrevField | AppAction::Up => panel.focus = panel.focus.prev(),
            AppAction::Right => match panel.focus {
                FilterField::Category => {
                    self.state.criteria.category = self.state.criteria.category.next();
                }
                FilterField::Sort => self.state.criteria.sort = self.state.criteria.sort.next(),
                _ => {}
            },
            AppAction::Left => match panel.focus {
                FilterField::Category => {
                    self.state.criteria.category = self.state.criteria.category.prev();
                }
                FilterField::Sort => self.state.criteria.sort = self.state.criteria.sort.prev(),
                _ => {}
            },
            AppAction::Backspace => match panel.focus {
                FilterField::Search => {
                    self.state.criteria.search.pop();
                }
                FilterField::From => {
                    panel.from_input.pop();
                }
                FilterField::To => {
                    panel.to_input.pop();
                }
                _ => {}
            },
            AppAction::Input(ch) => match panel.focus {
                FilterField::Search => self.state.criteria.search.push(ch),
                FilterField::From => panel.from_input.push(ch),
                FilterField::To => panel.to_input.push(ch),
                _ => {}
            },
            _ => {}
        }

        self.apply_date_bounds();
        self.state.clamp_selection();
    }

    /// Moves parseable date buffers into the criteria. A non-empty buffer
    /// that does not parse leaves the previous bound in place.
    fn apply_date_bounds(&mut self) {
        let Some(panel) = &self.state.filter_panel else {
            return;
        };

        for (input, bound) in [
            (&panel.from_input, &mut self.state.criteria.date_from),
            (&panel.to_input, &mut self.state.criteria.date_to),
        ] {
            let text = input.trim();
            if text.is_empty() {
                *bound = None;
            } else if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
                *bound = Some(date);
            }
        }
    }

    /// Opens an empty create form. No-op while another interaction is open.
    pub fn request_create(&mut self) {
        if self.state.workflow.is_idle() {
            self.state.workflow = Workflow::FormOpen(ExpenseForm::new());
        }
    }

    /// Opens the edit form pre-filled from the selected record.
    pub fn request_edit(&mut self) {
        if !self.state.workflow.is_idle() {
            return;
        }
        if let Some(expense) = self.state.selected_expense() {
            let form = ExpenseForm::edit(expense);
            self.state.workflow = Workflow::FormOpen(form);
        }
    }

    /// Asks for confirmation before deleting the selected record.
    pub fn request_delete(&mut self) {
        if !self.state.workflow.is_idle() {
            return;
        }
        if let Some(expense) = self.state.selected_expense() {
            let target = expense.clone();
            self.state.workflow = Workflow::ConfirmDelete(DeleteConfirm {
                target,
                error: None,
            });
        }
    }

    /// Abandons the open form or delete dialog, discarding its state.
    pub fn cancel(&mut self) {
        self.state.workflow = Workflow::Idle;
    }

    /// Validates and submits the open form.
    ///
    /// On success the form closes and the reloaded list is already in the
    /// cache; on any failure the form stays open with every buffer intact
    /// and the error on display.
    pub async fn submit_form(&mut self) {
        let AppState { cache, workflow, .. } = &mut self.state;
        let Workflow::FormOpen(form) = workflow else {
            return;
        };

        let outcome = match form.mode {
            FormMode::Create => match form.validate() {
                Ok(data) => cache
                    .create(&self.client, &data)
                    .await
                    .map(|_| "Expense created"),
                Err(invalid) => {
                    form.error = Some(invalid.to_string());
                    return;
                }
            },
            FormMode::Edit(id) => match form.patch() {
                Ok(patch) => cache
                    .update(&self.client, id, &patch)
                    .await
                    .map(|_| "Expense updated"),
                Err(invalid) => {
                    form.error = Some(invalid.to_string());
                    return;
                }
            },
        };

        match outcome {
            Ok(message) => {
                self.state.workflow = Workflow::Idle;
                self.state.last_refresh = Some(Local::now());
                self.state.clamp_selection();
                self.state.toast = Some(ToastState::success(message));
            }
            Err(err) => {
                tracing::warn!("submit failed: {err}");
                if let Workflow::FormOpen(form) = &mut self.state.workflow {
                    form.error = Some(err.to_string());
                }
            }
        }
    }

    /// Deletes the record awaiting confirmation. Success returns to `Idle`
    /// with the reloaded list in place; failure keeps the dialog open with
    /// the error shown.
    pub async fn confirm_delete(&mut self) {
        let AppState { cache, workflow, .. } = &mut self.state;
        let Workflow::ConfirmDelete(confirm) = workflow else {
            return;
        };

        let outcome = cache.delete(&self.client, confirm.target.id).await;
        match outcome {
            Ok(()) => {
                self.state.workflow = Workflow::Idle;
                self.state.last_refresh = Some(Local::now());
                self.state.clamp_selection();
                self.state.toast = Some(ToastState::success("Expense deleted"));
            }
            Err(err) => {
                tracing::warn!("delete failed: {err}");
                if let Workflow::ConfirmDelete(confirm) = &mut self.state.workflow {
                    confirm.error = Some(err.to_string());
                }
            }
        }
    }

    /// Reloads the list and both summaries. Failures stay on the cache
    /// queries; the screens render them with recovery hints.
    pub async fn refresh(&mut self) {
        match self.state.cache.refresh(&self.client).await {
            Ok(()) => {
                self.state.last_refresh = Some(Local::now());
                self.state.clamp_selection();
            }
            Err(err) => tracing::warn!("refresh failed: {err}"),
        }
    }

    /// Replaces the criteria wholesale. Never touches the workflow.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.state.criteria = criteria;
        self.state.clamp_selection();
    }

    /// Back to the canonical reset: no search, all categories, unbounded
    /// dates, newest first.
    pub fn clear_filters(&mut self) {
        self.state.criteria = FilterCriteria::default();
        if let Some(panel) = &mut self.state.filter_panel {
            panel.from_input.clear();
            panel.to_input.clear();
        }
        self.state.clamp_selection();
    }

    pub fn cycle_sort(&mut self) {
        self.state.criteria.sort = self.state.criteria.sort.next();
    }

    #[allow(dead_code)]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use engine::{CategoryFilter, SortKey};

    fn app() -> App {
        App::new(AppConfig::default()).unwrap()
    }

    async fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn add_opens_a_create_form_once() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a')).await;
        assert!(matches!(app.state.workflow, Workflow::FormOpen(_)));

        // Modal: a second add while the form is open changes nothing.
        app.request_create();
        let Workflow::FormOpen(form) = &app.state.workflow else {
            panic!("form should stay open");
        };
        assert_eq!(form.mode, FormMode::Create);
    }

    #[tokio::test]
    async fn edit_and_delete_need_a_selected_record() {
        let mut app = app();
        app.request_edit();
        assert!(app.state.workflow.is_idle());
        app.request_delete();
        assert!(app.state.workflow.is_idle());
    }

    #[tokio::test]
    async fn escape_cancels_the_open_form() {
        let mut app = app();
        app.request_create();
        press(&mut app, KeyCode::Esc).await;
        assert!(app.state.workflow.is_idle());
    }

    #[tokio::test]
    async fn typed_characters_land_in_the_form_not_the_shortcuts() {
        let mut app = app();
        app.request_create();
        // 'q' must type into the title, not quit the app.
        for ch in ['q', 'd', 'a'] {
            press(&mut app, KeyCode::Char(ch)).await;
        }
        assert!(!app.should_quit);
        let Workflow::FormOpen(form) = &app.state.workflow else {
            panic!("form should be open");
        };
        assert_eq!(form.title, "qda");
    }

    #[tokio::test]
    async fn filter_panel_edits_criteria_live() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/')).await;
        assert!(app.state.filter_panel.is_some());

        for ch in "gas".chars() {
            press(&mut app, KeyCode::Char(ch)).await;
        }
        assert_eq!(app.state.criteria.search, "gas");

        // Category field cycles with the arrow keys.
        press(&mut app, KeyCode::Tab).await;
        press(&mut app, KeyCode::Right).await;
        assert_ne!(app.state.criteria.category, CategoryFilter::All);

        press(&mut app, KeyCode::Esc).await;
        assert!(app.state.filter_panel.is_none());
        // Criteria survive closing the panel.
        assert_eq!(app.state.criteria.search, "gas");
    }

    #[tokio::test]
    async fn date_buffers_only_apply_once_they_parse() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/')).await;
        for _ in 0..2 {
            press(&mut app, KeyCode::Tab).await;
        }

        for ch in "2024-02".chars() {
            press(&mut app, KeyCode::Char(ch)).await;
        }
        assert_eq!(app.state.criteria.date_from, None);

        for ch in "-01".chars() {
            press(&mut app, KeyCode::Char(ch)).await;
        }
        assert_eq!(
            app.state.criteria.date_from,
            Some("2024-02-01".parse().unwrap())
        );

        // Emptying the buffer unbounds the filter again.
        for _ in 0.."2024-02-01".len() {
            press(&mut app, KeyCode::Backspace).await;
        }
        assert_eq!(app.state.criteria.date_from, None);
    }

    #[tokio::test]
    async fn clear_resets_criteria_to_the_canonical_default() {
        let mut app = app();
        app.set_criteria(FilterCriteria {
            search: "gas".to_string(),
            category: CategoryFilter::Only(api_types::Category::Food),
            sort: SortKey::AmountAsc,
            ..FilterCriteria::default()
        });

        press(&mut app, KeyCode::Char('c')).await;
        assert_eq!(app.state.criteria, FilterCriteria::default());
    }

    #[tokio::test]
    async fn sort_hotkey_cycles_without_touching_filters() {
        let mut app = app();
        app.set_criteria(FilterCriteria {
            search: "gas".to_string(),
            ..FilterCriteria::default()
        });

        press(&mut app, KeyCode::Char('s')).await;
        assert_eq!(app.state.criteria.sort, SortKey::DateAsc);
        assert_eq!(app.state.criteria.search, "gas");
    }

    #[tokio::test]
    async fn section_keys_switch_tabs() {
        let mut app = app();
        press(&mut app, KeyCode::Char('2')).await;
        assert_eq!(app.state.section, Section::Analytics);
        press(&mut app, KeyCode::Char('1')).await;
        assert_eq!(app.state.section, Section::Expenses);
    }

    #[tokio::test]
    async fn quit_only_from_idle_or_ctrl_c() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q')).await;
        assert!(app.should_quit);

        let mut app = self::app();
        app.request_create();
        press(&mut app, KeyCode::Char('q')).await;
        assert!(!app.should_quit);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
            .await
            .unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn selection_stays_within_the_empty_view() {
        let mut app = app();
        app.state.select_next();
        assert_eq!(app.state.selected, 0);
        app.state.select_prev();
        assert_eq!(app.state.selected, 0);
        assert!(app.state.selected_expense().is_none());
    }

    #[tokio::test]
    async fn stats_and_view_are_empty_before_the_first_fetch() {
        let app = app();
        assert!(app.state.filtered().is_empty());
        let stats = app.state.stats_at("2024-02-15".parse().unwrap());
        assert_eq!(stats.count, 0);
        assert_eq!(stats.top_category, None);
    }
}
