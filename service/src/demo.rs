//! Demo mode: serve against a freshly created, uniquely named database.

use std::{
    fs,
    path::{Path, PathBuf},
};

use eyre::WrapErr as _;
use tempfile::Builder;

/// Create `dir` if needed and an empty `waitlist-demo-*.db` file inside it.
///
/// The file is kept on disk so it can be inspected with `list` afterwards.
///
/// # Errors
///
/// Returns an error if the directory or the file cannot be created.
pub fn create_database(dir: &Path) -> eyre::Result<PathBuf> {
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };

    fs::create_dir_all(dir).wrap_err(format!(
        "ensure demo directory: {}",
        dir.display()
    ))?;

    let file = Builder::new()
        .prefix("waitlist-demo-")
        .suffix(".db")
        .tempfile_in(dir)
        .wrap_err("create demo database file")?;

    file.into_temp_path()
        .keep()
        .wrap_err("keep demo database file")
}
