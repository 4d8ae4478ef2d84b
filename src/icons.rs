use crate::domain::Entry;

pub trait IconPicker: Send + Sync {
    fn icon(&self, entry: &Entry) -> &str;
}

pub const DEFAULT_FOLDER_ICON: &str = "📁";
pub const DEFAULT_FILE_ICON: &str = "📄";

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultIcons;

impl IconPicker for DefaultIcons {
    fn icon(&self, entry: &Entry) -> &str {
        if entry.is_directory() {
            DEFAULT_FOLDER_ICON
        } else {
            DEFAULT_FILE_ICON
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiIcons;

impl IconPicker for AsciiIcons {
    fn icon(&self, entry: &Entry) -> &str {
        match (entry.is_directory(), entry.kind.is_symlink()) {
            (true, false) => "[d]",
            (true, true) => "[l]",
            (false, true) => " @ ",
            (false, false) => " - ",
        }
    }
}

pub fn picker_for(ascii: bool) -> Box<dyn IconPicker> {
    if ascii {
        Box::new(AsciiIcons)
    } else {
        Box::new(DefaultIcons)
    }
}
