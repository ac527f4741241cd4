/*
 *  tokens.rs
 *
 *  LySpot - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Persisted access/refresh token pair
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::TokenStoreError;

/// The credential pair, as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    pub fn has_access_token(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Reads and writes the token file.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted pair.
    ///
    /// A missing or unparseable file is the normal first-run case and yields
    /// `None`; other read failures are logged and treated the same way.
    pub fn load(&self) -> Option<Credentials> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No saved tokens found at {}", self.path.display());
                return None;
            }
            Err(e) => {
                warn!("Unable to read token file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<Credentials>(&raw) {
            Ok(creds) => {
                info!("Loaded saved tokens successfully");
                Some(creds)
            }
            Err(e) => {
                info!("Saved tokens in invalid format ({e}), ignoring");
                None
            }
        }
    }

    /// Overwrite the token file.
    ///
    /// The record is written to a sibling temp file and renamed over the
    /// target, so a crash mid-write leaves either the old or the new pair.
    pub fn save(&self, creds: &Credentials) -> Result<(), TokenStoreError> {
        let body = serde_json::to_string(creds)?;
        let tmp = self.temp_path();
        let written = Self::write_synced(&tmp, body.as_bytes()).and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(e) = written {
            // no stray temp file on any failure path
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        debug!("Tokens written to {}", self.path.display());
        Ok(())
    }

    fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(bytes)?;
        file.sync_all()
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("tokens.json"));
        let creds = Credentials::new("access-1", "refresh-1");

        store.save(&creds).unwrap();
        assert_eq!(store.load(), Some(creds));
        assert!(!dir.path().join("tokens.json.tmp").exists());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_garbage_file_is_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        fs::write(&path, "not json at all").unwrap();
        assert_eq!(TokenStore::new(&path).load(), None);

        fs::write(&path, "[1, 2, 3]").unwrap();
        assert_eq!(TokenStore::new(&path).load(), None);
    }

    #[test]
    fn test_file_shape_matches_wire_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        TokenStore::new(&path)
            .save(&Credentials::new("a", "r"))
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["access_token"], "a");
        assert_eq!(value["refresh_token"], "r");
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("nope").join("tokens.json"));
        assert!(matches!(
            store.save(&Credentials::new("a", "r")),
            Err(TokenStoreError::Io(_))
        ));
    }

    #[test]
    fn test_failed_save_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        // a non-empty directory in the way makes the final rename fail
        let target = dir.path().join("tokens.json");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("occupant"), "x").unwrap();

        let store = TokenStore::new(&target);
        assert!(matches!(
            store.save(&Credentials::new("a", "r")),
            Err(TokenStoreError::Io(_))
        ));
        assert!(!dir.path().join("tokens.json.tmp").exists());
        assert!(target.is_dir());
    }

    #[test]
    fn test_presence_helpers() {
        let empty = Credentials::default();
        assert!(!empty.has_access_token());
        assert!(!empty.has_refresh_token());

        let blank = Credentials {
            access_token: Some(String::new()),
            refresh_token: None,
        };
        assert!(!blank.has_access_token());
        assert!(Credentials::new("a", "r").has_refresh_token());
    }
}
