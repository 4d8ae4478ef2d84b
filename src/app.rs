use crate::config::AppConfig;
use crate::domain::NavigationEvent;
use crate::filters::Filters;
use crate::icons::IconPicker;
use crate::navigation::{EngineState, NavigationEngine};
use crate::scan::ScanEvent;
use crate::selection::{SelectionWorkflow, SubmitOutcome};
use crate::suggest;
use std::path::PathBuf;

const MAX_LOG_LINES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Input,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Self::List => Self::Input,
            Self::Input => Self::List,
        }
    }
}

pub struct App {
    pub config: AppConfig,
    pub engine: NavigationEngine,
    pub workflow: SelectionWorkflow,
    pub filters: Filters,
    pub icons: Box<dyn IconPicker>,
    pub focus: Focus,
    pub logs: Vec<String>,
    pub should_quit: bool,
    active_filter: Option<usize>,
    suggestion: Option<String>,
    list_scroll: usize,
    outcome: Option<SubmitOutcome>,
}

impl App {
    pub fn new(
        config: AppConfig,
        engine: NavigationEngine,
        workflow: SelectionWorkflow,
        filters: Filters,
        icons: Box<dyn IconPicker>,
    ) -> Self {
        let mut app = Self {
            config,
            engine,
            workflow,
            filters,
            icons,
            focus: Focus::List,
            logs: Vec::new(),
            should_quit: false,
            active_filter: None,
            suggestion: None,
            list_scroll: 0,
            outcome: None,
        };

        // File dialogs start on the first filter when any are given.
        if app.workflow.kind().shows_files() && !app.filters.is_empty() {
            app.apply_filter(Some(0));
        }
        app.process_navigation_events();
        app
    }

    pub fn is_scanning(&self) -> bool {
        self.engine.state() == EngineState::Scanning
    }

    pub fn active_filter_name(&self) -> Option<&str> {
        self.active_filter
            .and_then(|idx| self.filters.get(idx))
            .map(|filter| filter.name())
    }

    pub fn cycle_filter(&mut self) {
        if self.filters.is_empty() || !self.workflow.kind().shows_files() {
            return;
        }
        let next = match self.active_filter {
            None => Some(0),
            Some(idx) if idx + 1 < self.filters.len() => Some(idx + 1),
            Some(_) => None,
        };
        self.apply_filter(next);
        let label = self.active_filter_name().unwrap_or("all files").to_string();
        self.log(format!("filter: {label}"));
    }

    fn apply_filter(&mut self, index: Option<usize>) {
        self.active_filter = index;
        let filter = index.and_then(|idx| self.filters.get(idx)).cloned();
        self.engine.set_filter(filter);
    }

    pub fn commit_scan(&mut self, event: ScanEvent) {
        self.engine.commit(event);
        self.process_navigation_events();
    }

    pub fn process_navigation_events(&mut self) {
        for event in self.engine.drain_events() {
            if self.workflow.on_navigation_event(&event) {
                self.focus = Focus::Input;
            }
            match &event {
                NavigationEvent::Changed(location) => {
                    self.list_scroll = 0;
                    self.log(format!("location: {}", location.display()));
                }
                NavigationEvent::PermissionError(location) => {
                    self.log(format!("permission error: {}", location.display()));
                }
                NavigationEvent::ScanFailed { location, message } => {
                    self.log(format!("error[scan] {}: {message}", location.display()));
                }
                NavigationEvent::Highlighted(_) | NavigationEvent::Selected(_) => {}
            }
        }
        self.refresh_suggestion();
    }

    pub fn submit(&mut self) {
        let outcome = self.workflow.submit_input(&mut self.engine);
        self.handle_outcome(outcome);
    }

    pub fn select(&mut self) {
        let outcome = self.workflow.select(&mut self.engine);
        self.handle_outcome(outcome);
    }

    pub fn cancel(&mut self) {
        let outcome = self.workflow.cancel();
        self.handle_outcome(outcome);
    }

    fn handle_outcome(&mut self, outcome: SubmitOutcome) {
        match &outcome {
            SubmitOutcome::NavigatedInto(_) => self.focus = Focus::List,
            SubmitOutcome::Rejected(err) => self.log(format!("rejected: {err}")),
            SubmitOutcome::Accepted(path) => {
                self.log(format!("accepted: {}", path.display()));
                self.should_quit = true;
            }
            SubmitOutcome::Cancelled => {
                self.log("cancelled".to_string());
                self.should_quit = true;
            }
        }
        if self.workflow.state().is_terminal() {
            self.outcome = Some(outcome);
        }
        self.process_navigation_events();
    }

    pub fn accepted_path(&self) -> Option<PathBuf> {
        match &self.outcome {
            Some(SubmitOutcome::Accepted(path)) => Some(path.clone()),
            _ => None,
        }
    }

    pub fn push_input(&mut self, ch: char) {
        self.workflow.push_char(ch);
        self.refresh_suggestion();
    }

    pub fn pop_input(&mut self) {
        self.workflow.pop_char();
        self.refresh_suggestion();
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    pub fn accept_suggestion(&mut self) -> bool {
        match self.suggestion.take() {
            Some(suggestion) => {
                self.workflow.set_input(suggestion);
                self.refresh_suggestion();
                true
            }
            None => false,
        }
    }

    fn refresh_suggestion(&mut self) {
        let input = self.workflow.input();
        self.suggestion = suggest::suggest(self.engine.filesystem(), self.engine.location(), input)
            .filter(|suggestion| suggestion != input);
    }

    pub fn list_scroll(&self) -> usize {
        self.list_scroll
    }

    pub fn sync_list_scroll(&mut self, viewport_rows: usize) {
        let len = self.engine.visible_entries().len();
        let Some(selected) = self.engine.highlighted_index().filter(|_| len > 0) else {
            self.list_scroll = 0;
            return;
        };

        let rows = viewport_rows.max(1);
        if selected < self.list_scroll {
            self.list_scroll = selected;
        } else if selected >= self.list_scroll + rows {
            self.list_scroll = selected + 1 - rows;
        }

        let max_offset = len.saturating_sub(rows);
        if self.list_scroll > max_offset {
            self.list_scroll = max_offset;
        }
    }

    pub fn log(&mut self, line: String) {
        log::info!("{line}");
        self.logs.push(line);
        if self.logs.len() > MAX_LOG_LINES {
            let to_trim = self.logs.len() - MAX_LOG_LINES;
            self.logs.drain(0..to_trim);
        }
    }
}
