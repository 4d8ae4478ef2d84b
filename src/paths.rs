use crate::error::ExpandError;
use crate::infra::Filesystem;
use crate::probe;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

pub const PARENT_NAME: &str = "..";
const HOME_MARKER: char = '~';

pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                let last = out.components().next_back();
                if matches!(last, Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push(PARENT_NAME);
                }
            }
            Component::Normal(name) => out.push(name),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

pub fn working_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"))
}

pub fn is_root(path: &Path) -> bool {
    path.parent().is_none()
}

pub fn is_hidden_name(name: &OsStr) -> bool {
    name != PARENT_NAME && name.as_encoded_bytes().first() == Some(&b'.')
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn starts_with_home_marker(text: &str) -> bool {
    text.starts_with(HOME_MARKER)
}

pub fn expand_home(fs: &dyn Filesystem, text: &str) -> Result<PathBuf, ExpandError> {
    expand_home_with(fs, text, dirs::home_dir().as_deref())
}

pub fn expand_home_with(
    fs: &dyn Filesystem,
    text: &str,
    home: Option<&Path>,
) -> Result<PathBuf, ExpandError> {
    let Some(stripped) = text.strip_prefix(HOME_MARKER) else {
        return Ok(PathBuf::from(text));
    };

    let (user, rest) = match stripped.find(['/', std::path::MAIN_SEPARATOR]) {
        Some(idx) => (&stripped[..idx], stripped[idx + 1..].trim_start_matches('/')),
        None => (stripped, ""),
    };

    let home = home.ok_or(ExpandError::NoHome)?;
    let base = if user.is_empty() || home.file_name() == Some(OsStr::new(user)) {
        home.to_path_buf()
    } else {
        let sibling = home
            .parent()
            .map(|parent| parent.join(user))
            .filter(|candidate| probe::is_dir(fs, candidate));
        sibling.ok_or_else(|| ExpandError::UnknownUser(user.to_string()))?
    };

    if rest.is_empty() {
        Ok(base)
    } else {
        Ok(base.join(rest))
    }
}
