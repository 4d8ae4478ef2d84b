use crate::infra::Filesystem;
use crate::paths;
use crate::probe;
use std::path::{Path, PathBuf};

pub fn suggest(fs: &dyn Filesystem, location: &Path, value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }

    let target = resolve_typed(fs, location, value)?;
    if probe::exists(fs, &target) {
        return Some(value.to_string());
    }
    if value.ends_with(['/', std::path::MAIN_SEPARATOR]) {
        return None;
    }

    let partial = target.file_name()?.to_str()?;
    let parent = target.parent()?;
    let mut candidates: Vec<String> = fs
        .read_dir(parent)
        .ok()?
        .filter_map(Result::ok)
        .filter_map(|child| child.file_name()?.to_str().map(str::to_string))
        .filter(|name| name.len() > partial.len() && name.starts_with(partial))
        .collect();
    candidates.sort();

    let best = candidates.into_iter().next()?;
    Some(format!("{value}{}", &best[partial.len()..]))
}

fn resolve_typed(fs: &dyn Filesystem, location: &Path, value: &str) -> Option<PathBuf> {
    if paths::starts_with_home_marker(value) {
        return paths::expand_home(fs, value).ok();
    }
    let typed = Path::new(value);
    if typed.is_absolute() {
        Some(typed.to_path_buf())
    } else {
        Some(location.join(typed))
    }
}
