use crate::domain::{DialogKind, NavigationEvent};
use crate::error::SelectionError;
use crate::infra::Filesystem;
use crate::navigation::NavigationEngine;
use crate::paths;
use crate::probe;
use log::{debug, info};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Validating,
    NavigatedInto,
    Rejected,
    Accepted,
    Cancelled,
}

impl WorkflowState {
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowState::Accepted | WorkflowState::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    NavigatedInto(PathBuf),
    Rejected(SelectionError),
    Accepted(PathBuf),
    Cancelled,
}

pub fn should_accept(
    kind: DialogKind,
    fs: &dyn Filesystem,
    candidate: &Path,
) -> Result<(), SelectionError> {
    match kind {
        DialogKind::Open { must_exist } => {
            if must_exist && !probe::exists(fs, candidate) {
                return Err(SelectionError::MustExist(candidate.to_path_buf()));
            }
            Ok(())
        }
        DialogKind::Save { can_overwrite } => {
            if !can_overwrite && probe::exists(fs, candidate) {
                return Err(SelectionError::OverwriteNotAllowed(candidate.to_path_buf()));
            }
            Ok(())
        }
        DialogKind::SelectDirectory => {
            Err(SelectionError::NotADirectory(candidate.to_path_buf()))
        }
    }
}

pub fn resolve_candidate(
    fs: &dyn Filesystem,
    text: &str,
    location: &Path,
) -> Result<PathBuf, SelectionError> {
    if paths::starts_with_home_marker(text) {
        let expanded = paths::expand_home(fs, text)?;
        return Ok(paths::normalize(&expanded));
    }

    let joined = paths::absolutize(Path::new(text), location);
    Ok(fs
        .canonicalize(&joined)
        .map(|real| paths::normalize(&real))
        .unwrap_or(joined))
}

#[derive(Debug, Clone)]
pub struct SelectionWorkflow {
    kind: DialogKind,
    state: WorkflowState,
    input: String,
    error: Option<String>,
}

impl SelectionWorkflow {
    pub fn new(kind: DialogKind) -> Self {
        Self {
            kind,
            state: WorkflowState::Idle,
            input: String::new(),
            error: None,
        }
    }

    pub fn with_default_file(mut self, default_file: Option<&str>) -> Self {
        if self.kind.shows_files()
            && let Some(name) = default_file.map(Path::new).and_then(Path::file_name)
        {
            self.input = name.to_string_lossy().into_owned();
        }
        self
    }

    pub fn kind(&self) -> DialogKind {
        self.kind
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
        self.error = None;
    }

    pub fn push_char(&mut self, ch: char) {
        self.input.push(ch);
        self.error = None;
    }

    pub fn pop_char(&mut self) {
        if self.input.pop().is_some() {
            self.error = None;
        }
    }

    pub fn cancel(&mut self) -> SubmitOutcome {
        self.state = WorkflowState::Cancelled;
        SubmitOutcome::Cancelled
    }

    /// Returns `true` when the text input should take focus.
    pub fn on_navigation_event(&mut self, event: &NavigationEvent) -> bool {
        match event {
            NavigationEvent::Selected(path) if self.kind.shows_files() => {
                let name = paths::display_name(path);
                self.set_input(name);
                true
            }
            NavigationEvent::Changed(_) => {
                self.error = None;
                false
            }
            NavigationEvent::PermissionError(location) => {
                self.show_error(&SelectionError::PermissionDenied(location.clone()));
                false
            }
            NavigationEvent::ScanFailed { message, .. } => {
                self.error = Some(message.clone());
                false
            }
            _ => false,
        }
    }

    pub fn select(&mut self, engine: &mut NavigationEngine) -> SubmitOutcome {
        if self.kind == DialogKind::SelectDirectory {
            return self.accept(engine.location().to_path_buf());
        }
        self.submit_input(engine)
    }

    pub fn submit_input(&mut self, engine: &mut NavigationEngine) -> SubmitOutcome {
        let text = self.input.clone();
        self.submit(&text, engine)
    }

    pub fn submit(&mut self, text: &str, engine: &mut NavigationEngine) -> SubmitOutcome {
        self.state = WorkflowState::Validating;

        if text.is_empty() {
            if self.kind == DialogKind::SelectDirectory {
                return self.accept(engine.location().to_path_buf());
            }
            return self.reject(SelectionError::NothingChosen);
        }

        let candidate = match resolve_candidate(engine.filesystem(), text, engine.location()) {
            Ok(candidate) => candidate,
            Err(err) => return self.reject(err),
        };
        debug!("candidate {text:?} resolved to {}", candidate.display());

        match probe::check_dir(engine.filesystem(), &candidate) {
            Err(_) => return self.reject(SelectionError::PermissionDenied(candidate)),
            Ok(true) => {
                engine.set_location(&candidate);
                self.input.clear();
                self.error = None;
                self.state = WorkflowState::NavigatedInto;
                return SubmitOutcome::NavigatedInto(candidate);
            }
            Ok(false) => {}
        }

        match should_accept(self.kind, engine.filesystem(), &candidate) {
            Ok(()) => self.accept(candidate),
            Err(err) => self.reject(err),
        }
    }

    fn accept(&mut self, path: PathBuf) -> SubmitOutcome {
        info!("accepted {}", path.display());
        self.error = None;
        self.state = WorkflowState::Accepted;
        SubmitOutcome::Accepted(path)
    }

    fn reject(&mut self, err: SelectionError) -> SubmitOutcome {
        info!("rejected: {err}");
        self.show_error(&err);
        self.state = WorkflowState::Rejected;
        SubmitOutcome::Rejected(err)
    }

    fn show_error(&mut self, err: &SelectionError) {
        self.error = Some(err.to_string());
    }
}
