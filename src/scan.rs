use crate::domain::{Entry, EntryKind};
use crate::infra::Filesystem;
use crate::probe;
use log::{debug, warn};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub generation: u64,
    pub location: PathBuf,
    pub show_files: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Finished {
        generation: u64,
        location: PathBuf,
        entries: Vec<Entry>,
    },
    PermissionDenied {
        generation: u64,
        location: PathBuf,
    },
    Failed {
        generation: u64,
        location: PathBuf,
        message: String,
    },
}

impl ScanEvent {
    pub fn generation(&self) -> u64 {
        match self {
            ScanEvent::Finished { generation, .. }
            | ScanEvent::PermissionDenied { generation, .. }
            | ScanEvent::Failed { generation, .. } => *generation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed(Vec<Entry>),
    PermissionDenied,
    Failed(String),
    Cancelled,
}

#[derive(Debug)]
pub struct ScanHandle {
    generation: u64,
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl ScanHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    #[cfg(test)]
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

pub fn spawn_scan(
    fs: Arc<dyn Filesystem>,
    request: ScanRequest,
    event_tx: UnboundedSender<ScanEvent>,
) -> ScanHandle {
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();
    let generation = request.generation;

    let task = tokio::task::spawn_blocking(move || {
        let outcome = scan_directory(fs.as_ref(), &request, &flag);
        publish(request, outcome, &flag, &event_tx);
    });

    ScanHandle {
        generation,
        cancelled,
        task,
    }
}

fn publish(
    request: ScanRequest,
    outcome: ScanOutcome,
    cancelled: &AtomicBool,
    event_tx: &UnboundedSender<ScanEvent>,
) {
    // Superseded while finishing up; a newer scan owns the display now.
    if cancelled.load(Ordering::SeqCst) {
        debug!(
            "scan #{} of {} cancelled, nothing published",
            request.generation,
            request.location.display()
        );
        return;
    }

    let ScanRequest {
        generation,
        location,
        ..
    } = request;
    let event = match outcome {
        ScanOutcome::Completed(entries) => ScanEvent::Finished {
            generation,
            location,
            entries,
        },
        ScanOutcome::PermissionDenied => ScanEvent::PermissionDenied {
            generation,
            location,
        },
        ScanOutcome::Failed(message) => ScanEvent::Failed {
            generation,
            location,
            message,
        },
        ScanOutcome::Cancelled => return,
    };

    if event_tx.send(event).is_err() {
        debug!("scan #{generation} finished after the receiver closed");
    }
}

pub fn scan_directory(
    fs: &dyn Filesystem,
    request: &ScanRequest,
    cancelled: &AtomicBool,
) -> ScanOutcome {
    let children = match fs.read_dir(&request.location) {
        Ok(children) => children,
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
            warn!("permission denied listing {}", request.location.display());
            return ScanOutcome::PermissionDenied;
        }
        Err(err) => {
            warn!("failed to list {}: {err}", request.location.display());
            return ScanOutcome::Failed(err.to_string());
        }
    };

    let mut entries = Vec::new();
    for child in children {
        if cancelled.load(Ordering::SeqCst) {
            return ScanOutcome::Cancelled;
        }

        let path = match child {
            Ok(path) => path,
            Err(err) => {
                debug!("skipping unreadable child of {}: {err}", request.location.display());
                continue;
            }
        };

        if let Some(entry) = materialize(fs, path, request.show_files) {
            entries.push(entry);
        }
    }

    if cancelled.load(Ordering::SeqCst) {
        return ScanOutcome::Cancelled;
    }
    ScanOutcome::Completed(entries)
}

fn materialize(fs: &dyn Filesystem, path: PathBuf, show_files: bool) -> Option<Entry> {
    let is_dir = probe::is_dir(fs, &path);
    let is_file = !is_dir && probe::is_file(fs, &path);
    if !(is_dir || (is_file && show_files)) {
        return None;
    }

    let stat = fs.metadata(&path).ok();
    let kind = match stat {
        Some(_) => EntryKind::classify(is_dir, is_file, probe::is_symlink(fs, &path)),
        // Only the safe file default got us here.
        None => EntryKind::Unknown,
    };
    let size = stat.map(|s| s.size).unwrap_or(0);
    let modified = stat.map(|s| s.modified).unwrap_or(SystemTime::UNIX_EPOCH);

    Some(Entry::new(path, kind, size, modified))
}
