// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Persona Identity Contributors

//! Single-slot storage capability behind the identity cache.
//!
//! The cache persists its whole collection as one JSON payload under one
//! well-known slot. Abstracting the slot behind a trait lets the same cache
//! logic run against in-memory storage (tests, ephemeral contexts) or a
//! file-backed slot (durable across restarts) without code changes.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::sync::Mutex;

/// Whether the slot's backing medium can currently serve reads and writes.
///
/// `Unavailable` means "no persistence medium in this execution context" and
/// readers must treat it as an empty slot. `Faulted` means the medium exists
/// but access failed in a way that cannot be distinguished from data loss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotAvailability {
    Available,
    Unavailable,
    Faulted(String),
}

/// Error type for slot operations.
#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    #[error("storage slot unavailable")]
    Unavailable,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A named storage slot holding at most one string payload.
pub trait StorageSlot: Send + Sync {
    /// Capability detection, called before trusting read results.
    fn availability(&self) -> SlotAvailability;

    /// Read the current payload. `None` means the slot is empty.
    fn read(&self) -> Result<Option<String>, SlotError>;

    /// Replace the payload.
    fn write(&self, payload: &str) -> Result<(), SlotError>;

    /// Drop the payload. Removing an already-empty slot is not an error.
    fn remove(&self) -> Result<(), SlotError>;
}

/// In-memory slot. Used in tests and in execution contexts with no durable
/// storage; contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemorySlot {
    payload: Mutex<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageSlot for MemorySlot {
    fn availability(&self) -> SlotAvailability {
        SlotAvailability::Available
    }

    fn read(&self) -> Result<Option<String>, SlotError> {
        match self.payload.lock() {
            Ok(guard) => Ok(guard.clone()),
            Err(_) => Err(SlotError::Unavailable),
        }
    }

    fn write(&self, payload: &str) -> Result<(), SlotError> {
        match self.payload.lock() {
            Ok(mut guard) => {
                *guard = Some(payload.to_string());
                Ok(())
            }
            Err(_) => Err(SlotError::Unavailable),
        }
    }

    fn remove(&self) -> Result<(), SlotError> {
        match self.payload.lock() {
            Ok(mut guard) => {
                *guard = None;
                Ok(())
            }
            Err(_) => Err(SlotError::Unavailable),
        }
    }
}

/// File-backed slot: one well-known JSON file under the data directory.
///
/// Writes go to a temp file first and are renamed into place, so a crash
/// mid-write never leaves a partial payload behind.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl StorageSlot for FileSlot {
    fn availability(&self) -> SlotAvailability {
        let Some(parent) = self.path.parent() else {
            return SlotAvailability::Unavailable;
        };
        if !parent.exists() {
            return SlotAvailability::Unavailable;
        }
        // The file itself may not exist yet; that is an empty slot, not a fault.
        match File::open(&self.path) {
            Ok(_) => SlotAvailability::Available,
            Err(e) if e.kind() == io::ErrorKind::NotFound => SlotAvailability::Available,
            Err(e) => SlotAvailability::Faulted(e.to_string()),
        }
    }

    fn read(&self) -> Result<Option<String>, SlotError> {
        match File::open(&self.path) {
            Ok(mut file) => {
                let mut payload = String::new();
                file.read_to_string(&mut payload)?;
                Ok(Some(payload))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SlotError::Io(e)),
        }
    }

    fn write(&self, payload: &str) -> Result<(), SlotError> {
        // The data directory is created at startup; a missing parent means the
        // medium is absent and the write fails like any other I/O error.
        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(payload.as_bytes())?;
            writer.flush()?;
        }
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    fn remove(&self) -> Result<(), SlotError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SlotError::Io(e)),
        }
    }
}

/// Slot whose medium is permanently absent. Models execution contexts without
/// persistence; the cache's "unavailable reads as absent" rule turns every
/// read into an empty slot.
#[derive(Debug, Default)]
pub struct UnavailableSlot;

impl StorageSlot for UnavailableSlot {
    fn availability(&self) -> SlotAvailability {
        SlotAvailability::Unavailable
    }

    fn read(&self) -> Result<Option<String>, SlotError> {
        Err(SlotError::Unavailable)
    }

    fn write(&self, _payload: &str) -> Result<(), SlotError> {
        Err(SlotError::Unavailable)
    }

    fn remove(&self) -> Result<(), SlotError> {
        Err(SlotError::Unavailable)
    }
}
