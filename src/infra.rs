use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryStat {
    pub is_dir: bool,
    pub is_file: bool,
    pub size: u64,
    pub modified: SystemTime,
}

pub type Children<'a> = Box<dyn Iterator<Item = io::Result<PathBuf>> + 'a>;

pub trait Filesystem: Send + Sync {
    fn metadata(&self, path: &Path) -> io::Result<EntryStat>;
    fn is_symlink(&self, path: &Path) -> io::Result<bool>;
    fn read_dir<'a>(&'a self, dir: &Path) -> io::Result<Children<'a>>;
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl Filesystem for LocalFilesystem {
    fn metadata(&self, path: &Path) -> io::Result<EntryStat> {
        let meta = fs::metadata(path)?;
        Ok(EntryStat {
            is_dir: meta.is_dir(),
            is_file: meta.is_file(),
            size: meta.len(),
            modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        })
    }

    fn is_symlink(&self, path: &Path) -> io::Result<bool> {
        fs::symlink_metadata(path).map(|meta| meta.file_type().is_symlink())
    }

    fn read_dir<'a>(&'a self, dir: &Path) -> io::Result<Children<'a>> {
        let read_dir = fs::read_dir(dir)?;
        Ok(Box::new(read_dir.map(|entry| entry.map(|entry| entry.path()))))
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }
}
