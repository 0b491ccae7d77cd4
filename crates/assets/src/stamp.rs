// Copyright 2026 The Mash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Stamps
//!
//! Opt-in staleness checks for shader compilation.  A stamp is an xxh3 hash of everything that
//! feeds the compiler: the source bytes, the stage, and the compiler fingerprint.  It is kept as hex
//! text next to the bytecode, `vertex.spv` getting `vertex.spv.xx3h`.  A matching stamp beside a
//! non-empty bytecode file means the compiler does not need to run again.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use xxhash_rust::xxh3::Xxh3;

use crate::prelude::*;

pub const STAMP_EXT: &str = "xx3h";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    path: PathBuf,
    hash: u64,
}

/// `compiled` with `.xx3h` appended to its file name.
pub fn stamp_path(compiled: &Path) -> PathBuf {
    let mut name = compiled
        .file_name()
        .map(|n| n.to_owned())
        .unwrap_or_else(OsString::new);
    name.push(".");
    name.push(STAMP_EXT);
    compiled.with_file_name(name)
}

impl Stamp {
    /// Hashes the shader at `source` as it would be compiled to `compiled`.
    pub fn compute(
        source: &Path,
        stage: &str,
        fingerprint: &str,
        compiled: &Path,
    ) -> Result<Self, AssetError> {
        let bytes = fs::read(source).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AssetError::AssetMissing(source.to_path_buf()),
            _ => e.into(),
        })?;

        let mut hasher = Xxh3::new();
        hasher.update(&bytes);
        // Separators keep `ab`+`c` and `a`+`bc` apart.
        hasher.update(&[0]);
        hasher.update(stage.as_bytes());
        hasher.update(&[0]);
        hasher.update(fingerprint.as_bytes());

        Ok(Stamp {
            path: stamp_path(compiled),
            hash: hasher.digest(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// True when `compiled` holds bytecode and the stamp on disk matches this one.
    pub fn is_current(&self, compiled: &Path) -> bool {
        let has_bytecode = fs::metadata(compiled)
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false);

        has_bytecode && self.stored() == Some(self.hash)
    }

    fn stored(&self) -> Option<u64> {
        let text = fs::read_to_string(&self.path).ok()?;
        u64::from_str_radix(text.trim(), 16).ok()
    }

    pub fn write(&self) -> Result<(), AssetError> {
        fs::write(&self.path, format!("{:016x}\n", self.hash))?;
        Ok(())
    }

    /// Removes the stamp if there is one.
    pub fn clear(&self) -> Result<(), AssetError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
