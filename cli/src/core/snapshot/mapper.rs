//! # Foam Path Mapper
//!
//! File: cli/src/core/snapshot/mapper.rs
//!
//! ## Overview
//!
//! Translates between an absolute path on the live filesystem ("original") and
//! its location inside the flat backup store. Every original is split into an
//! *anchor* and a remainder; the anchor becomes a single folder name under the
//! store root and the remainder is appended unchanged:
//!
//! ```text
//! C:\Users\me\proj   ->  <store>/C/Users/me/proj       (DriveAnchor)
//! /data/proj         ->  <store>/data/proj             (RootAnchor, empty anchor)
//! ```
//!
//! Anchor syntax is isolated behind the `AnchorScheme` trait with one
//! implementation per convention. `PathMapper::for_platform` picks the one for
//! the running OS; tests build either explicitly.
//!
//! ## Manifest keys
//!
//! The manifest names backup entries by their store-relative path. A path that
//! is valid UTF-8 is written as `/`-joined text. Any other path keeps its raw
//! OS encoding (bytes on Unix, UTF-16 units on Windows), base64 encoded, so a
//! key always decodes to exactly the path it was made from.
//!
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf, Prefix};
use thiserror::Error;

/// Reasons a path cannot be placed in (or recovered from) the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("path is not absolute: {0:?}")]
    NotAbsolute(PathBuf),

    #[error("path has an anchor that cannot be stored as a folder name: {0:?}")]
    UnsupportedAnchor(PathBuf),

    #[error("path contains '..' and cannot be expressed relative to its anchor: {0:?}")]
    ParentComponent(PathBuf),

    #[error("path {path:?} is not inside the store {store:?}")]
    OutsideStore { path: PathBuf, store: PathBuf },

    #[error("store path {0:?} has no anchor segment")]
    MissingAnchor(PathBuf),

    #[error("manifest key {0:?} does not decode to a store-relative path")]
    CorruptKey(String),
}

/// Store-relative location of a backup entry, as written to the manifest.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ManifestKey {
    /// `/`-joined UTF-8 path.
    Path(String),
    /// Base64 (URL-safe, unpadded) of the path's native encoding.
    Raw(String),
}

impl From<&str> for ManifestKey {
    fn from(text: &str) -> Self {
        ManifestKey::Path(text.to_string())
    }
}

#[cfg(unix)]
fn native_bytes(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(unix)]
fn from_native_bytes(bytes: Vec<u8>) -> Option<OsString> {
    use std::os::unix::ffi::OsStringExt;
    Some(OsString::from_vec(bytes))
}

#[cfg(windows)]
fn native_bytes(path: &Path) -> Vec<u8> {
    use std::os::windows::ffi::OsStrExt;
    path.as_os_str()
        .encode_wide()
        .flat_map(u16::to_le_bytes)
        .collect()
}

#[cfg(windows)]
fn from_native_bytes(bytes: Vec<u8>) -> Option<OsString> {
    use std::os::windows::ffi::OsStringExt;
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    Some(OsString::from_wide(&units))
}

/// One platform's convention for the root-identifying prefix of a path.
pub trait AnchorScheme: std::fmt::Debug {
    /// Splits an absolute path into the anchor folder name and the remainder.
    fn split(&self, original: &Path) -> Result<(String, PathBuf), MapError>;

    /// Rebuilds an absolute path from an anchor folder name and a remainder.
    fn join(&self, anchor: &str, relative: &Path) -> PathBuf;

    /// Whether the anchor occupies its own segment under the store root.
    fn has_anchor_segment(&self) -> bool;
}

/// Single-root convention (`/`). The anchor folder name is empty, so stored
/// entries sit directly under the store root.
#[derive(Debug, Clone, Copy, Default)]
pub struct RootAnchor;

/// Drive-letter convention (`C:\`). The anchor folder name is the bare letter.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriveAnchor;

/// Collects the normal components after the anchor, rejecting `..`.
fn relative_remainder<'a>(
    original: &Path,
    rest: impl Iterator<Item = Component<'a>>,
) -> Result<PathBuf, MapError> {
    let mut relative = PathBuf::new();
    for component in rest {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir => return Err(MapError::ParentComponent(original.to_path_buf())),
            Component::RootDir | Component::Prefix(_) => {
                return Err(MapError::UnsupportedAnchor(original.to_path_buf()))
            }
        }
    }
    Ok(relative)
}

impl AnchorScheme for RootAnchor {
    fn split(&self, original: &Path) -> Result<(String, PathBuf), MapError> {
        let mut components = original.components();
        match components.next() {
            Some(Component::RootDir) => {}
            Some(Component::Prefix(_)) => {
                return Err(MapError::UnsupportedAnchor(original.to_path_buf()))
            }
            _ => return Err(MapError::NotAbsolute(original.to_path_buf())),
        }
        let relative = relative_remainder(original, components)?;
        Ok((String::new(), relative))
    }

    fn join(&self, _anchor: &str, relative: &Path) -> PathBuf {
        Path::new("/").join(relative)
    }

    fn has_anchor_segment(&self) -> bool {
        false
    }
}

impl AnchorScheme for DriveAnchor {
    fn split(&self, original: &Path) -> Result<(String, PathBuf), MapError> {
        // Native prefixes first (`C:\` and the `\\?\C:\` form that
        // canonicalize produces), then a textual fallback for non-Windows hosts.
        let mut components = original.components();
        if let Some(Component::Prefix(prefix)) = components.next() {
            let letter = match prefix.kind() {
                Prefix::Disk(letter) | Prefix::VerbatimDisk(letter) => letter,
                _ => return Err(MapError::UnsupportedAnchor(original.to_path_buf())),
            };
            if components.next() != Some(Component::RootDir) {
                return Err(MapError::NotAbsolute(original.to_path_buf()));
            }
            let relative = relative_remainder(original, components)?;
            return Ok(((letter as char).to_ascii_uppercase().to_string(), relative));
        }

        let text = original.to_string_lossy().replace('\\', "/");
        let text = text.strip_prefix("//?/").unwrap_or(&text);
        let mut chars = text.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(letter), Some(':'), Some('/')) if letter.is_ascii_alphabetic() => {
                let mut relative = PathBuf::new();
                for part in text[3..].split('/').filter(|p| !p.is_empty() && *p != ".") {
                    if part == ".." {
                        return Err(MapError::ParentComponent(original.to_path_buf()));
                    }
                    relative.push(part);
                }
                Ok((letter.to_ascii_uppercase().to_string(), relative))
            }
            (Some(letter), Some(':'), _) if letter.is_ascii_alphabetic() => {
                Err(MapError::NotAbsolute(original.to_path_buf()))
            }
            (Some('/'), _, _) => Err(MapError::UnsupportedAnchor(original.to_path_buf())),
            _ => Err(MapError::NotAbsolute(original.to_path_buf())),
        }
    }

    fn join(&self, anchor: &str, relative: &Path) -> PathBuf {
        let mut text = OsString::from(format!("{}:\\", anchor));
        for (i, component) in relative.components().enumerate() {
            if i > 0 {
                text.push("\\");
            }
            text.push(component.as_os_str());
        }
        PathBuf::from(text)
    }

    fn has_anchor_segment(&self) -> bool {
        true
    }
}

/// Bidirectional mapping between originals and their place in the store.
#[derive(Debug)]
pub struct PathMapper {
    store_root: PathBuf,
    scheme: Box<dyn AnchorScheme>,
}

impl PathMapper {
    pub fn new(store_root: impl Into<PathBuf>, scheme: Box<dyn AnchorScheme>) -> Self {
        Self {
            store_root: store_root.into(),
            scheme,
        }
    }

    /// Mapper using the anchor convention of the running platform.
    pub fn for_platform(store_root: impl Into<PathBuf>) -> Self {
        #[cfg(windows)]
        let scheme: Box<dyn AnchorScheme> = Box::new(DriveAnchor);
        #[cfg(not(windows))]
        let scheme: Box<dyn AnchorScheme> = Box::new(RootAnchor);
        Self::new(store_root, scheme)
    }

    pub fn store_root(&self) -> &Path {
        &self.store_root
    }

    /// `<store>/<anchor>/<remainder>` for an absolute original path.
    pub fn to_backup_path(&self, original: &Path) -> Result<PathBuf, MapError> {
        let (anchor, relative) = self.scheme.split(original)?;
        let mut backup = self.store_root.clone();
        if !anchor.is_empty() {
            backup.push(anchor);
        }
        Ok(backup.join(relative))
    }

    /// Inverse of `to_backup_path`.
    pub fn to_original_path(&self, backup: &Path) -> Result<PathBuf, MapError> {
        let relative = backup
            .strip_prefix(&self.store_root)
            .map_err(|_| MapError::OutsideStore {
                path: backup.to_path_buf(),
                store: self.store_root.clone(),
            })?;
        if !self.scheme.has_anchor_segment() {
            return Ok(self.scheme.join("", relative));
        }
        let mut parts = relative.components();
        let anchor = match parts.next() {
            Some(Component::Normal(anchor)) => anchor.to_string_lossy().into_owned(),
            _ => return Err(MapError::MissingAnchor(backup.to_path_buf())),
        };
        Ok(self.scheme.join(&anchor, parts.as_path()))
    }

    /// Store-relative key for `backup`, used in the snapshot manifest.
    pub fn to_manifest_key(&self, backup: &Path) -> Result<ManifestKey, MapError> {
        let relative = backup
            .strip_prefix(&self.store_root)
            .map_err(|_| MapError::OutsideStore {
                path: backup.to_path_buf(),
                store: self.store_root.clone(),
            })?;
        let parts: Option<Vec<&str>> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect();
        Ok(match parts {
            Some(parts) => ManifestKey::Path(parts.join("/")),
            None => ManifestKey::Raw(URL_SAFE_NO_PAD.encode(native_bytes(relative))),
        })
    }

    /// Backup path for a manifest key.
    pub fn from_manifest_key(&self, key: &ManifestKey) -> Result<PathBuf, MapError> {
        match key {
            ManifestKey::Path(text) => Ok(text
                .split('/')
                .filter(|part| !part.is_empty())
                .fold(self.store_root.clone(), |path, part| path.join(part))),
            ManifestKey::Raw(encoded) => {
                let relative = URL_SAFE_NO_PAD
                    .decode(encoded)
                    .ok()
                    .and_then(from_native_bytes)
                    .map(PathBuf::from)
                    .filter(|relative| {
                        !relative.as_os_str().is_empty()
                            && relative
                                .components()
                                .all(|c| matches!(c, Component::Normal(_)))
                    })
                    .ok_or_else(|| MapError::CorruptKey(encoded.clone()))?;
                Ok(self.store_root.join(relative))
            }
        }
    }
}
