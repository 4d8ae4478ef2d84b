use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    #[error("could not determine home directory")]
    NoHome,
    #[error("could not determine home directory for user '{0}'")]
    UnknownUser(String),
}

/// `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("a file must be chosen")]
    NothingChosen,
    #[error(transparent)]
    Expand(#[from] ExpandError),
    #[error("permission error")]
    PermissionDenied(PathBuf),
    #[error("the file must exist")]
    MustExist(PathBuf),
    #[error("overwrite is not allowed")]
    OverwriteNotAllowed(PathBuf),
    #[error("a directory must be chosen")]
    NotADirectory(PathBuf),
}
