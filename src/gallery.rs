//! Avatar gallery
//!
//! Persisted to LocalStorage as a bare JSON array of entries, appended to
//! every time an avatar card is revealed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::{Avatar, Rank};
use crate::platform;

/// A saved avatar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryEntry {
    /// Normalized name the avatar was generated from
    pub username: String,
    pub rank: Rank,
    pub code: String,
    /// Image reference for the card
    pub url: String,
}

impl GalleryEntry {
    pub fn new(username: &str, avatar: &Avatar) -> Self {
        Self {
            username: username.to_string(),
            rank: avatar.rank,
            code: avatar.code.clone(),
            url: avatar.rank.image_path().to_string(),
        }
    }
}

/// Why the stored gallery could not be used
#[derive(Debug, Error)]
pub enum GalleryError {
    /// Storage holds something other than a JSON array
    #[error("stored gallery is unreadable: {0}")]
    Unreadable(#[from] serde_json::Error),
}

/// Saved avatars, oldest first
///
/// Slots are kept as raw JSON so entries this build cannot read (newer
/// ranks, hand-edited storage) survive every save untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gallery {
    slots: Vec<serde_json::Value>,
}

impl Gallery {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "avatarGallery";

    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn add(&mut self, entry: &GalleryEntry) -> Result<(), GalleryError> {
        self.slots.push(serde_json::to_value(entry)?);
        Ok(())
    }

    /// Readable entries with their slot index
    pub fn entries(&self) -> Vec<(usize, GalleryEntry)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| GalleryEntry::deserialize(slot).ok().map(|e| (i, e)))
            .collect()
    }

    /// Remove the slot at `index`; false if there is none
    pub fn remove(&mut self, index: usize) -> bool {
        if index < self.slots.len() {
            self.slots.remove(index);
            true
        } else {
            false
        }
    }

    /// Stored slots, readable or not
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Load the stored gallery; missing storage is an empty gallery
    pub fn load() -> Result<Self, GalleryError> {
        let Some(json) = platform::storage_get(Self::STORAGE_KEY) else {
            return Ok(Self::new());
        };
        let gallery: Gallery = serde_json::from_str(&json)?;
        let skipped = gallery.len() - gallery.entries().len();
        if skipped > 0 {
            log::warn!("Keeping {} unreadable gallery entries as-is", skipped);
        }
        log::info!("Loaded {} gallery entries", gallery.len());
        Ok(gallery)
    }

    pub fn save(&self) {
        match serde_json::to_string(self) {
            Ok(json) => {
                platform::storage_set(Self::STORAGE_KEY, &json);
                log::info!("Gallery saved ({} entries)", self.slots.len());
            }
            Err(e) => log::warn!("Failed to serialize gallery: {}", e),
        }
    }

    /// Load, append one entry and save
    ///
    /// Storage that cannot be read is left alone.
    pub fn append_saved(entry: &GalleryEntry) -> Result<Self, GalleryError> {
        let mut gallery = Self::load()?;
        gallery.add(entry)?;
        gallery.save();
        Ok(gallery)
    }

    /// Load, delete one slot and save
    pub fn delete_saved(index: usize) -> Result<Self, GalleryError> {
        let mut gallery = Self::load()?;
        if gallery.remove(index) {
            gallery.save();
        }
        Ok(gallery)
    }

    /// Drop the stored gallery entirely
    pub fn clear_saved() {
        platform::storage_remove(Self::STORAGE_KEY);
        log::info!("Gallery cleared");
    }
}
