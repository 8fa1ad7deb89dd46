//! [`FileSessionCache`]: the session persisted as a JSON file.

use std::{
  fs, io,
  path::{Path, PathBuf},
};

use planner_core::session::{Session, SessionCache};

/// Keeps the current session in a single JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionCache {
  path: PathBuf,
}

impl FileSessionCache {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  pub fn path(&self) -> &Path { &self.path }
}

impl SessionCache for FileSessionCache {
  fn load(&self) -> io::Result<Option<Session>> {
    match fs::read_to_string(&self.path) {
      Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e),
    }
  }

  fn save(&self, session: &Session) -> io::Result<()> {
    if let Some(dir) = self.path.parent() {
      fs::create_dir_all(dir)?;
    }
    fs::write(&self.path, serde_json::to_vec_pretty(session)?)?;
    restrict_permissions(&self.path)
  }

  fn clear(&self) -> io::Result<()> {
    match fs::remove_file(&self.path) {
      Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
      _ => Ok(()),
    }
  }
}

/// Tokens are credentials: keep the file private to its owner.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
  use std::os::unix::fs::PermissionsExt;
  fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_: &Path) -> io::Result<()> { Ok(()) }
