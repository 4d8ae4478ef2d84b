use crate::paths::{self, PARENT_NAME};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
    SymlinkToDirectory,
    SymlinkToFile,
    Unknown,
}

impl EntryKind {
    pub fn classify(is_dir: bool, is_file: bool, is_symlink: bool) -> Self {
        match (is_dir, is_file, is_symlink) {
            (true, _, false) => Self::Directory,
            (true, _, true) => Self::SymlinkToDirectory,
            (false, true, false) => Self::File,
            (false, true, true) => Self::SymlinkToFile,
            (false, false, _) => Self::Unknown,
        }
    }

    pub fn is_directory(self) -> bool {
        matches!(self, Self::Directory | Self::SymlinkToDirectory)
    }

    pub fn is_symlink(self) -> bool {
        matches!(self, Self::SymlinkToDirectory | Self::SymlinkToFile)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    pub kind: EntryKind,
    pub size: u64,
    pub modified: SystemTime,
    name: OsString,
}

impl Entry {
    pub fn new(path: PathBuf, kind: EntryKind, size: u64, modified: SystemTime) -> Self {
        let name = path
            .file_name()
            .map(OsStr::to_os_string)
            .unwrap_or_else(|| path.as_os_str().to_os_string());
        Self {
            path,
            kind,
            size,
            modified,
            name,
        }
    }

    pub fn parent_of(location: &Path) -> Self {
        Self {
            path: location.join(PARENT_NAME),
            kind: EntryKind::Directory,
            size: 0,
            modified: SystemTime::UNIX_EPOCH,
            name: OsString::from(PARENT_NAME),
        }
    }

    pub fn name(&self) -> &OsStr {
        &self.name
    }

    pub fn is_directory(&self) -> bool {
        self.kind.is_directory()
    }

    pub fn is_parent(&self) -> bool {
        self.name == PARENT_NAME
    }

    pub fn is_hidden(&self) -> bool {
        paths::is_hidden_name(&self.name)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name.to_string_lossy())?;
        if self.is_directory() && !self.is_parent() {
            write!(f, "/")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    Changed(PathBuf),
    Highlighted(PathBuf),
    Selected(PathBuf),
    PermissionError(PathBuf),
    ScanFailed { location: PathBuf, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Open { must_exist: bool },
    Save { can_overwrite: bool },
    SelectDirectory,
}

impl DialogKind {
    pub fn title(self) -> &'static str {
        match self {
            DialogKind::Open { .. } => "Open",
            DialogKind::Save { .. } => "Save as",
            DialogKind::SelectDirectory => "Select directory",
        }
    }

    pub fn select_label(self) -> &'static str {
        match self {
            DialogKind::Open { .. } => "Open",
            DialogKind::Save { .. } => "Save",
            DialogKind::SelectDirectory => "Select",
        }
    }

    pub fn shows_files(self) -> bool {
        !matches!(self, DialogKind::SelectDirectory)
    }
}
