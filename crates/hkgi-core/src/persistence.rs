//! Save/Load functionality for persisting every stead
//!
//! Uses bincode for compact binary serialization of the whole store. A save
//! is taken by cloning each stead under its own lock, so writing the file
//! never blocks the tick or player actions.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use hkgi_logic::config::{ConfigError, EngineConfig};
use hkgi_logic::manifest::Manifest;
use hkgi_logic::stead::Stead;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::Engine;

/// Version number for save file format (increment when format changes)
pub const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of the engine state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    /// Simulation clock (ms)
    pub clock_ms: u64,
    /// Every stead, keyed by username
    pub steads: BTreeMap<String, Stead>,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("save encoding error: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("save version mismatch: file is v{found}, expected v{expected}")]
    VersionMismatch { found: u32, expected: u32 },
    #[error("saved engine rejected: {0}")]
    Config(#[from] ConfigError),
}

impl Engine {
    /// Clone every stead into a [`SaveData`].
    ///
    /// Waits out any running tick, then locks every stead in username order
    /// before cloning any, so a concurrent gift is either wholly in the save
    /// or wholly absent.
    pub fn save_data(&self) -> SaveData {
        let _sweep = self.sweep();
        let handles = self.handles();
        let guards: Vec<_> = handles.iter().map(|(_, handle)| handle.lock()).collect();
        let steads = handles
            .iter()
            .zip(&guards)
            .map(|((name, _), stead)| (name.clone(), Stead::clone(stead)))
            .collect();
        SaveData {
            version: SAVE_VERSION,
            clock_ms: self.clock_ms(),
            steads,
        }
    }

    /// Rebuild an engine from a loaded save.
    pub fn from_save(
        config: EngineConfig,
        manifest: Manifest,
        data: SaveData,
    ) -> Result<Self, SaveError> {
        check_version(&data)?;
        Ok(Self::with_steads(config, manifest, data.steads, data.clock_ms)?)
    }
}

fn check_version(data: &SaveData) -> Result<(), SaveError> {
    if data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            found: data.version,
            expected: SAVE_VERSION,
        });
    }
    Ok(())
}

/// Write save data to a writer
pub fn save<W: Write>(data: &SaveData, writer: W) -> Result<(), SaveError> {
    bincode::serialize_into(writer, data)?;
    Ok(())
}

/// Read save data from a reader, rejecting other format versions
pub fn load<R: Read>(reader: R) -> Result<SaveData, SaveError> {
    let data: SaveData = bincode::deserialize_from(reader)?;
    check_version(&data)?;
    Ok(data)
}

/// Write to `<path>.tmp`, then rename over `path`.
///
/// A crash mid-write leaves the previous save intact.
pub fn save_to_path(data: &SaveData, path: &Path) -> Result<(), SaveError> {
    let tmp = tmp_path(path);
    let file = File::create(&tmp).map_err(io_err(&tmp))?;
    let mut writer = BufWriter::new(file);
    save(data, &mut writer)?;
    writer.flush().map_err(io_err(&tmp))?;
    drop(writer);
    fs::rename(&tmp, path).map_err(io_err(path))?;
    log::debug!("saved {} steads to {}", data.steads.len(), path.display());
    Ok(())
}

/// Load a save file. A missing file is `Ok(None)`: nothing saved yet.
pub fn load_from_path(path: &Path) -> Result<Option<SaveData>, SaveError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_err(path)(e)),
    };
    let data = load(BufReader::new(file))?;
    log::info!("loaded {} steads from {}", data.steads.len(), path.display());
    Ok(Some(data))
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> SaveError {
    let path = path.to_path_buf();
    move |source| SaveError::Io { path, source }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
