use crate::domain::Entry;
use crate::filters::Filter;
use crate::paths;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryCatalog {
    location: PathBuf,
    parent: Option<Entry>,
    entries: Vec<Entry>,
}

impl EntryCatalog {
    pub fn new(location: PathBuf, entries: Vec<Entry>) -> Self {
        let parent = (!paths::is_root(&location)).then(|| Entry::parent_of(&location));
        Self {
            location,
            parent,
            entries,
        }
    }

    pub fn empty(location: PathBuf) -> Self {
        Self::new(location, Vec::new())
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn parent(&self) -> Option<&Entry> {
        self.parent.as_ref()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DisplayOptions<'a> {
    pub show_hidden: bool,
    pub sort: bool,
    pub filter: Option<&'a Filter>,
}

pub fn is_hidden_by(entry: &Entry, options: &DisplayOptions<'_>) -> bool {
    if let Some(filter) = options.filter
        && !entry.is_directory()
        && !filter.matches(&entry.path)
    {
        return true;
    }
    entry.is_hidden() && !options.show_hidden
}

pub fn compare_entries(a: &Entry, b: &Entry) -> Ordering {
    b.is_directory()
        .cmp(&a.is_directory())
        .then_with(|| a.name().cmp(b.name()))
}

pub fn visible_entries(catalog: &EntryCatalog, options: &DisplayOptions<'_>) -> Vec<Entry> {
    let mut shown: Vec<Entry> = catalog
        .entries()
        .iter()
        .filter(|entry| !is_hidden_by(entry, options))
        .cloned()
        .collect();

    if options.sort {
        shown.sort_by(compare_entries);
    }

    match catalog.parent() {
        Some(parent) => {
            let mut out = Vec::with_capacity(shown.len() + 1);
            out.push(parent.clone());
            out.extend(shown);
            out
        }
        None => shown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntryKind;
    use pretty_assertions::assert_eq;
    use std::time::SystemTime;

    fn entry(location: &str, name: &str, kind: EntryKind) -> Entry {
        Entry::new(
            Path::new(location).join(name),
            kind,
            0,
            SystemTime::UNIX_EPOCH,
        )
    }

    fn names(entries: &[Entry]) -> Vec<String> {
        entries.iter().map(ToString::to_string).collect()
    }

    fn sample() -> EntryCatalog {
        EntryCatalog::new(
            PathBuf::from("/docs"),
            vec![
                entry("/docs", "zeta.txt", EntryKind::File),
                entry("/docs", ".cache", EntryKind::Directory),
                entry("/docs", "Beta.rs", EntryKind::File),
                entry("/docs", "sub", EntryKind::Directory),
                entry("/docs", ".env", EntryKind::File),
                entry("/docs", "link", EntryKind::SymlinkToDirectory),
                entry("/docs", "alpha.rs", EntryKind::SymlinkToFile),
            ],
        )
    }

    fn options(show_hidden: bool, sort: bool, filter: Option<&Filter>) -> DisplayOptions<'_> {
        DisplayOptions {
            show_hidden,
            sort,
            filter,
        }
    }

    #[test]
    fn parent_entry_leads_unless_at_root() {
        let shown = visible_entries(&sample(), &options(false, true, None));
        assert!(shown[0].is_parent());

        let root = EntryCatalog::new(
            PathBuf::from("/"),
            vec![entry("/", "etc", EntryKind::Directory)],
        );
        let shown = visible_entries(&root, &options(false, true, None));
        assert_eq!(names(&shown), vec!["etc/"]);
    }

    #[test]
    fn sorted_view_puts_directories_first_then_names() {
        let shown = visible_entries(&sample(), &options(true, true, None));
        assert_eq!(
            names(&shown),
            vec![
                "..", ".cache/", "link/", "sub/", ".env", "Beta.rs", "alpha.rs", "zeta.txt"
            ]
        );
    }

    #[test]
    fn unsorted_view_keeps_scan_order() {
        let shown = visible_entries(&sample(), &options(true, false, None));
        assert_eq!(
            names(&shown),
            vec![
                "..", "zeta.txt", ".cache/", "Beta.rs", "sub/", ".env", "link/", "alpha.rs"
            ]
        );
    }

    #[test]
    fn hidden_entries_follow_show_hidden_regardless_of_filter() {
        let everything = Filter::new("all", |_| true);
        for filter in [None, Some(&everything)] {
            let hidden = visible_entries(&sample(), &options(false, true, filter));
            assert!(!names(&hidden).iter().any(|n| n.starts_with(".c") || n == ".env"));

            let shown = visible_entries(&sample(), &options(true, true, filter));
            assert!(names(&shown).contains(&".cache/".to_string()));
            assert!(names(&shown).contains(&".env".to_string()));
        }
    }

    #[test]
    fn custom_filter_never_hides_directories() {
        let rust = Filter::extensions("Rust", &["rs"]);
        let nothing = Filter::new("none", |_| false);

        let shown = visible_entries(&sample(), &options(false, true, Some(&rust)));
        assert_eq!(names(&shown), vec!["..", "link/", "sub/", "Beta.rs", "alpha.rs"]);

        let shown = visible_entries(&sample(), &options(true, true, Some(&nothing)));
        assert_eq!(names(&shown), vec!["..", ".cache/", "link/", "sub/"]);
    }

    #[test]
    fn sort_invariant_holds_for_any_pair() {
        let shown = visible_entries(&sample(), &options(true, true, None));
        for pair in shown[1..].windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                (a.is_directory() && !b.is_directory())
                    || (a.is_directory() == b.is_directory() && a.name() <= b.name()),
                "{a} before {b}"
            );
        }
    }
}
