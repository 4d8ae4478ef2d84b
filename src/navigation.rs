use crate::catalog::{DisplayOptions, EntryCatalog, visible_entries};
use crate::domain::{Entry, NavigationEvent};
use crate::filters::Filter;
use crate::infra::Filesystem;
use crate::paths;
use crate::scan::{ScanEvent, ScanHandle, ScanRequest, spawn_scan};
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Scanning,
    IdleWithError,
}

#[derive(Debug, Clone)]
pub struct NavigationOptions {
    pub show_hidden: bool,
    pub show_files: bool,
    pub sort: bool,
    pub filter: Option<Filter>,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            show_hidden: false,
            show_files: true,
            sort: true,
            filter: None,
        }
    }
}

pub struct NavigationEngine {
    fs: Arc<dyn Filesystem>,
    location: PathBuf,
    options: NavigationOptions,
    catalog: EntryCatalog,
    visible: Vec<Entry>,
    highlighted: Option<usize>,
    state: EngineState,
    generation: u64,
    scan: Option<ScanHandle>,
    scan_tx: UnboundedSender<ScanEvent>,
    events: VecDeque<NavigationEvent>,
}

impl NavigationEngine {
    pub fn new(
        fs: Arc<dyn Filesystem>,
        location: &Path,
        options: NavigationOptions,
        scan_tx: UnboundedSender<ScanEvent>,
    ) -> Self {
        let location = paths::absolutize(location, &paths::working_dir());
        let mut engine = Self {
            fs,
            catalog: EntryCatalog::empty(location.clone()),
            location,
            options,
            visible: Vec::new(),
            highlighted: None,
            state: EngineState::Scanning,
            generation: 0,
            scan: None,
            scan_tx,
            events: VecDeque::new(),
        };
        engine.emit(NavigationEvent::Changed(engine.location.clone()));
        engine.restart_scan();
        engine
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn options(&self) -> &NavigationOptions {
        &self.options
    }

    pub fn filesystem(&self) -> &dyn Filesystem {
        self.fs.as_ref()
    }

    pub fn visible_entries(&self) -> &[Entry] {
        &self.visible
    }

    pub fn highlighted_index(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn highlighted_entry(&self) -> Option<&Entry> {
        self.highlighted.and_then(|idx| self.visible.get(idx))
    }

    pub fn drain_events(&mut self) -> Vec<NavigationEvent> {
        self.events.drain(..).collect()
    }

    pub fn set_location(&mut self, location: &Path) -> bool {
        let location = paths::absolutize(location, &self.location);
        if location == self.location {
            return false;
        }

        info!("location {} -> {}", self.location.display(), location.display());
        self.location = location;
        self.emit(NavigationEvent::Changed(self.location.clone()));
        self.restart_scan();
        true
    }

    pub fn navigate_up(&mut self) -> bool {
        match self.location.parent() {
            Some(parent) => {
                let parent = parent.to_path_buf();
                self.set_location(&parent)
            }
            None => false,
        }
    }

    pub fn set_show_files(&mut self, show_files: bool) {
        if self.options.show_files == show_files {
            return;
        }
        self.options.show_files = show_files;
        self.restart_scan();
    }

    pub fn set_show_hidden(&mut self, show_hidden: bool) {
        if self.options.show_hidden == show_hidden {
            return;
        }
        self.options.show_hidden = show_hidden;
        self.rebuild_display();
    }

    pub fn toggle_hidden(&mut self) {
        self.set_show_hidden(!self.options.show_hidden);
    }

    pub fn set_sort_enabled(&mut self, sort: bool) {
        if self.options.sort == sort {
            return;
        }
        self.options.sort = sort;
        self.rebuild_display();
    }

    pub fn set_filter(&mut self, filter: Option<Filter>) {
        self.options.filter = filter;
        self.rebuild_display();
    }

    pub fn highlight(&mut self, index: usize) {
        if index >= self.visible.len() || self.highlighted == Some(index) {
            return;
        }
        self.highlighted = Some(index);
        let path = self.visible[index].path.clone();
        self.emit(NavigationEvent::Highlighted(path));
    }

    pub fn highlight_next(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let next = self.highlighted.map_or(0, |idx| (idx + 1) % len);
        self.highlight(next);
    }

    pub fn highlight_prev(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let prev = match self.highlighted {
            Some(0) | None => len - 1,
            Some(idx) => idx - 1,
        };
        self.highlight(prev);
    }

    pub fn pick(&mut self, entry: &Entry) {
        if entry.is_directory() {
            self.set_location(&entry.path);
        } else {
            self.emit(NavigationEvent::Selected(entry.path.clone()));
        }
    }

    pub fn pick_highlighted(&mut self) {
        if let Some(entry) = self.highlighted_entry().cloned() {
            self.pick(&entry);
        }
    }

    /// Drops events from superseded scans, returning `false`.
    pub fn commit(&mut self, event: ScanEvent) -> bool {
        if event.generation() != self.generation {
            debug!(
                "dropping stale scan #{} (current #{})",
                event.generation(),
                self.generation
            );
            return false;
        }
        self.scan = None;

        match event {
            ScanEvent::Finished {
                location, entries, ..
            } => {
                self.catalog = EntryCatalog::new(location, entries);
                debug!(
                    "scan of {} committed {} entries",
                    self.catalog.location().display(),
                    self.catalog.entries().len()
                );
                self.state = EngineState::Idle;
                self.rebuild_display();
            }
            ScanEvent::PermissionDenied { location, .. } => {
                warn!("permission error for {}", location.display());
                self.state = EngineState::IdleWithError;
                self.emit(NavigationEvent::PermissionError(location));
            }
            ScanEvent::Failed {
                location, message, ..
            } => {
                self.state = EngineState::IdleWithError;
                self.emit(NavigationEvent::ScanFailed { location, message });
            }
        }
        true
    }

    fn restart_scan(&mut self) {
        if let Some(previous) = self.scan.take() {
            if !previous.is_finished() {
                debug!("cancelling scan #{}", previous.generation());
            }
            previous.cancel();
        }

        self.generation += 1;
        self.state = EngineState::Scanning;
        let request = ScanRequest {
            generation: self.generation,
            location: self.location.clone(),
            show_files: self.options.show_files,
        };
        debug!("starting scan #{} of {}", request.generation, request.location.display());
        self.scan = Some(spawn_scan(self.fs.clone(), request, self.scan_tx.clone()));
    }

    fn rebuild_display(&mut self) {
        let previous = self.highlighted_entry().map(|entry| entry.path.clone());
        let options = DisplayOptions {
            show_hidden: self.options.show_hidden,
            sort: self.options.sort,
            filter: self.options.filter.as_ref(),
        };
        self.visible = visible_entries(&self.catalog, &options);

        let kept = previous.and_then(|path| self.visible.iter().position(|e| e.path == path));
        self.highlighted = None;
        match kept {
            Some(idx) => self.highlighted = Some(idx),
            None => self.highlight(0),
        }
    }

    fn emit(&mut self, event: NavigationEvent) {
        self.events.push_back(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::LocalFilesystem;
    use crate::infra::testing::{GatedFilesystem, LockedFilesystem, temp_root};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn engine_at(
        fs: Arc<dyn Filesystem>,
        location: &Path,
    ) -> (NavigationEngine, UnboundedReceiver<ScanEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = NavigationEngine::new(fs, location, NavigationOptions::default(), tx);
        (engine, rx)
    }

    async fn settle(engine: &mut NavigationEngine, rx: &mut UnboundedReceiver<ScanEvent>) {
        while engine.state() == EngineState::Scanning {
            let event = rx.recv().await.expect("scan event");
            engine.commit(event);
        }
    }

    fn visible_names(engine: &NavigationEngine) -> Vec<String> {
        engine
            .visible_entries()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn fixture(tag: &str) -> PathBuf {
        let root = temp_root(tag);
        fs::create_dir_all(root.join("docs/sub")).expect("mkdir");
        fs::create_dir_all(root.join("docs/.git")).expect("mkdir");
        fs::write(root.join("docs/report.txt"), "r").expect("write");
        fs::write(root.join("docs/notes.md"), "n").expect("write");
        fs::write(root.join("docs/.env"), "e").expect("write");
        root
    }

    #[tokio::test]
    async fn starts_scanning_and_settles_on_first_entry() {
        let root = fixture("nav_start");
        let docs = root.join("docs");
        let (mut engine, mut rx) = engine_at(Arc::new(LocalFilesystem), &docs);
        assert_eq!(engine.state(), EngineState::Scanning);
        assert_eq!(engine.drain_events(), vec![NavigationEvent::Changed(docs.clone())]);

        settle(&mut engine, &mut rx).await;
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(visible_names(&engine), vec!["..", "sub/", "notes.md", "report.txt"]);
        assert_eq!(engine.highlighted_index(), Some(0));
        assert_eq!(
            engine.drain_events(),
            vec![NavigationEvent::Highlighted(docs.join(".."))]
        );

        let _ = fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn same_location_is_a_no_op() {
        let root = fixture("nav_idempotent");
        let docs = root.join("docs");
        let (mut engine, mut rx) = engine_at(Arc::new(LocalFilesystem), &docs);
        settle(&mut engine, &mut rx).await;
        engine.drain_events();

        assert!(!engine.set_location(&docs));
        assert!(!engine.set_location(&docs.join("sub/..")));
        assert!(!engine.set_location(Path::new(".")));
        assert_eq!(engine.state(), EngineState::Idle);
        assert!(engine.drain_events().is_empty());

        assert!(engine.set_location(Path::new("sub")));
        assert_eq!(engine.location(), docs.join("sub"));
        assert_eq!(
            engine.drain_events(),
            vec![NavigationEvent::Changed(docs.join("sub"))]
        );

        let _ = fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn display_flags_rerender_without_rescanning() {
        let root = fixture("nav_flags");
        let docs = root.join("docs");
        let (mut engine, mut rx) = engine_at(Arc::new(LocalFilesystem), &docs);
        settle(&mut engine, &mut rx).await;

        engine.toggle_hidden();
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(
            visible_names(&engine),
            vec!["..", ".git/", "sub/", ".env", "notes.md", "report.txt"]
        );

        engine.set_filter(Some(Filter::extensions("Markdown", &["md"])));
        assert_eq!(visible_names(&engine), vec!["..", ".git/", "sub/", "notes.md"]);

        engine.set_filter(None);
        engine.set_show_hidden(false);
        engine.set_sort_enabled(false);
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(visible_names(&engine)[0], "..");
        assert_eq!(engine.visible_entries().len(), 4);

        let _ = fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn show_files_change_rescans() {
        let root = fixture("nav_show_files");
        let docs = root.join("docs");
        let (mut engine, mut rx) = engine_at(Arc::new(LocalFilesystem), &docs);
        settle(&mut engine, &mut rx).await;

        engine.set_show_files(false);
        assert_eq!(engine.state(), EngineState::Scanning);
        settle(&mut engine, &mut rx).await;
        assert_eq!(visible_names(&engine), vec!["..", "sub/"]);

        let _ = fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn highlight_survives_rerender_when_entry_stays_visible() {
        let root = fixture("nav_highlight");
        let docs = root.join("docs");
        let (mut engine, mut rx) = engine_at(Arc::new(LocalFilesystem), &docs);
        settle(&mut engine, &mut rx).await;

        engine.highlight(3);
        assert_eq!(
            engine.highlighted_entry().map(ToString::to_string),
            Some("report.txt".to_string())
        );
        engine.toggle_hidden();
        assert_eq!(
            engine.highlighted_entry().map(ToString::to_string),
            Some("report.txt".to_string())
        );

        engine.set_filter(Some(Filter::extensions("Markdown", &["md"])));
        assert_eq!(engine.highlighted_index(), Some(0));

        let _ = fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn pick_enters_directories_and_selects_files() {
        let root = fixture("nav_pick");
        let docs = root.join("docs");
        let (mut engine, mut rx) = engine_at(Arc::new(LocalFilesystem), &docs);
        settle(&mut engine, &mut rx).await;
        engine.drain_events();

        let report = engine
            .visible_entries()
            .iter()
            .find(|e| e.name() == "report.txt")
            .cloned()
            .expect("report listed");
        engine.pick(&report);
        assert_eq!(
            engine.drain_events(),
            vec![NavigationEvent::Selected(docs.join("report.txt"))]
        );
        assert_eq!(engine.location(), docs);

        let parent = engine.visible_entries()[0].clone();
        engine.pick(&parent);
        assert_eq!(engine.location(), root);
        assert!(matches!(
            engine.drain_events().first(),
            Some(NavigationEvent::Changed(path)) if path == &root
        ));
        settle(&mut engine, &mut rx).await;
        assert!(visible_names(&engine).contains(&"docs/".to_string()));

        let _ = fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn navigate_up_stops_at_root() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut engine = NavigationEngine::new(
            Arc::new(LocalFilesystem),
            Path::new("/"),
            NavigationOptions::default(),
            tx,
        );
        assert!(!engine.navigate_up());
        assert_eq!(engine.location(), Path::new("/"));
    }

    #[tokio::test]
    async fn permission_error_keeps_previous_display() {
        let root = fixture("nav_denied");
        let docs = root.join("docs");
        let (mut engine, mut rx) = engine_at(Arc::new(LocalFilesystem), &docs);
        settle(&mut engine, &mut rx).await;
        let before = visible_names(&engine);

        let generation = engine.generation;
        engine.commit(ScanEvent::PermissionDenied {
            generation,
            location: docs.clone(),
        });
        assert_eq!(engine.state(), EngineState::IdleWithError);
        assert_eq!(visible_names(&engine), before);
        assert!(
            engine
                .drain_events()
                .contains(&NavigationEvent::PermissionError(docs.clone()))
        );

        let _ = fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn entering_a_locked_directory_keeps_the_listing() {
        let root = temp_root("nav_locked");
        let locked = root.join("locked");
        fs::create_dir(&locked).expect("mkdir");
        fs::write(locked.join("secret"), "").expect("write");
        fs::write(root.join("a.txt"), "").expect("write");

        let locked_fs = Arc::new(LockedFilesystem::new(locked.clone()));
        let (mut engine, mut rx) = engine_at(locked_fs, &root);
        settle(&mut engine, &mut rx).await;
        engine.drain_events();
        let before = visible_names(&engine);
        assert_eq!(before, vec!["..", "locked/", "a.txt"]);

        assert!(engine.set_location(&locked));
        assert_eq!(engine.state(), EngineState::Scanning);
        settle(&mut engine, &mut rx).await;

        assert_eq!(engine.state(), EngineState::IdleWithError);
        assert_eq!(engine.location(), locked);
        assert_eq!(visible_names(&engine), before);
        assert_eq!(
            engine.drain_events(),
            vec![
                NavigationEvent::Changed(locked.clone()),
                NavigationEvent::PermissionError(locked.clone()),
            ]
        );

        let _ = fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn stale_results_are_dropped() {
        let root = fixture("nav_stale");
        let docs = root.join("docs");
        let (mut engine, mut rx) = engine_at(Arc::new(LocalFilesystem), &docs);
        settle(&mut engine, &mut rx).await;

        engine.set_location(&docs.join("sub"));
        let stale = ScanEvent::Finished {
            generation: engine.generation - 1,
            location: docs.clone(),
            entries: Vec::new(),
        };
        assert!(!engine.commit(stale));
        assert_eq!(engine.state(), EngineState::Scanning);

        settle(&mut engine, &mut rx).await;
        assert_eq!(visible_names(&engine), vec![".."]);

        let _ = fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn slow_scan_is_superseded_by_newer_location() {
        let root = temp_root("nav_cancel");
        let slow = root.join("a");
        let fast = root.join("b");
        fs::create_dir_all(&slow).expect("mkdir a");
        fs::create_dir_all(&fast).expect("mkdir b");
        for i in 0..50 {
            fs::write(slow.join(format!("a{i}")), "").expect("write");
        }
        fs::write(fast.join("only-in-b"), "").expect("write");

        let gated = Arc::new(GatedFilesystem::new(slow.clone()));
        let (mut engine, mut rx) = engine_at(gated.clone(), &slow);
        engine.set_location(&fast);
        settle(&mut engine, &mut rx).await;
        gated.release();

        assert_eq!(engine.location(), fast);
        assert_eq!(visible_names(&engine), vec!["..", "only-in-b"]);

        // Give the cancelled worker time to wind down, then make sure it
        // published nothing.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(visible_names(&engine), vec!["..", "only-in-b"]);

        let _ = fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn rapid_moves_settle_on_the_last_location() {
        let root = fixture("nav_rapid");
        let docs = root.join("docs");
        let (mut engine, mut rx) = engine_at(Arc::new(LocalFilesystem), &root);
        engine.set_location(&docs);
        engine.set_location(&docs.join("sub"));
        engine.set_location(&docs);
        settle(&mut engine, &mut rx).await;

        assert_eq!(engine.location(), docs);
        assert_eq!(visible_names(&engine), vec!["..", "sub/", "notes.md", "report.txt"]);

        let _ = fs::remove_dir_all(root);
    }
}
