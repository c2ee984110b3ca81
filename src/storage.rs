use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::models::User;

/// Where the injection pipeline gets the logged-in user from. The controller
/// re-checks this on every pipeline run rather than caching the answer;
/// `None` means unauthenticated and gates all DOM work off.
pub trait AuthSource {
    fn current_user(&self) -> Option<User>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    user: User,
    saved_at: DateTime<Utc>,
}

/// File-backed session store under the platform data directory.
pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    pub fn open() -> Result<Self> {
        Ok(Self {
            path: Self::default_path()?,
        })
    }

    #[cfg(test)]
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn default_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "applistash") {
            Ok(proj_dirs.data_dir().join("session.json"))
        } else {
            // Fallback to current directory
            Ok(PathBuf::from("session.json"))
        }
    }

    pub fn save_user(&self, user: &User) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let session = StoredSession {
            user: user.clone(),
            saved_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&session)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write session file: {}", self.path.display()))?;
        Ok(())
    }

    pub fn load_user(&self) -> Result<Option<User>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file: {}", self.path.display()))?;
        let session: StoredSession = serde_json::from_str(&json)
            .with_context(|| format!("Malformed session file: {}", self.path.display()))?;
        Ok(Some(session.user))
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove session file: {}", self.path.display()))?;
        }
        Ok(())
    }
}

impl AuthSource for UserStore {
    fn current_user(&self) -> Option<User> {
        self.load_user().ok().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> UserStore {
        let path = std::env::temp_dir()
            .join("applistash-tests")
            .join(name)
            .join("session.json");
        let _ = fs::remove_file(&path);
        UserStore::at(path)
    }

    #[test]
    fn round_trips_the_stored_user() {
        let store = temp_store("roundtrip");
        let user = User {
            email: "dev@example.com".to_string(),
            name: "Dev".to_string(),
            token: Some("tok-123".to_string()),
        };
        store.save_user(&user).unwrap();
        assert_eq!(store.load_user().unwrap(), Some(user.clone()));
        assert_eq!(store.current_user(), Some(user));

        store.clear().unwrap();
        assert_eq!(store.load_user().unwrap(), None);
        assert_eq!(store.current_user(), None);
    }

    #[test]
    fn missing_file_reads_as_logged_out() {
        let store = temp_store("missing");
        assert_eq!(store.load_user().unwrap(), None);
        assert_eq!(store.current_user(), None);
    }
}
