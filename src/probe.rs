//! Permission failures degrade to fixed defaults instead of failing a listing.

use crate::infra::Filesystem;
use std::io;
use std::path::Path;

fn denied(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::PermissionDenied
}

pub fn is_dir(fs: &dyn Filesystem, path: &Path) -> bool {
    fs.metadata(path).map(|stat| stat.is_dir).unwrap_or(false)
}

pub fn is_file(fs: &dyn Filesystem, path: &Path) -> bool {
    match fs.metadata(path) {
        Ok(stat) => stat.is_file,
        Err(err) => denied(&err),
    }
}

pub fn is_symlink(fs: &dyn Filesystem, path: &Path) -> bool {
    fs.is_symlink(path).unwrap_or(false)
}

/// Anything we are not allowed to look at is assumed to exist.
pub fn exists(fs: &dyn Filesystem, path: &Path) -> bool {
    match fs.metadata(path) {
        Ok(_) => true,
        Err(err) => denied(&err),
    }
}

/// Only permission failures are reported as errors.
pub fn check_dir(fs: &dyn Filesystem, path: &Path) -> io::Result<bool> {
    match fs.metadata(path) {
        Ok(stat) => Ok(stat.is_dir),
        Err(err) if denied(&err) => Err(err),
        Err(_) => Ok(false),
    }
}
