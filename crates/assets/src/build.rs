// Copyright 2026 The Mash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Build Support
//!
//! This module contains the build script functionality.  A `build.rs` can be one line:
//!
//! ```no_run
//! mash_assets::build::embed_assets("assets.toml");
//! ```

use std::path::{Path, PathBuf};

use crate::compiler::Diagnostics;
use crate::descriptor::AssetTable;
#[cfg(feature = "manifest")]
use crate::pipeline::PipelineReport;

/// Tells Cargo to rerun the build script when any of these files change.
pub fn rerun_if_changed<'a>(paths: impl IntoIterator<Item = &'a Path>) {
    for path in paths {
        println!("cargo:rerun-if-changed={}", path.display());
    }
}

/// Every source the table reads.
pub fn watched_sources(table: &AssetTable) -> Vec<PathBuf> {
    table.iter().map(|d| d.source().to_path_buf()).collect()
}

/// Loads the manifest, runs the pipeline, and reports to Cargo.  Relative manifest paths are taken
/// from `CARGO_MANIFEST_DIR` when it is set.
///
/// Panics with the pipeline error, which is how build scripts fail.
#[cfg(feature = "manifest")]
pub fn embed_assets(manifest: impl AsRef<Path>) -> PipelineReport {
    let manifest = match std::env::var_os("CARGO_MANIFEST_DIR") {
        Some(dir) => Path::new(&dir).join(manifest.as_ref()),
        None => manifest.as_ref().to_path_buf(),
    };
    println!("cargo:rerun-if-changed={}", manifest.display());

    let loaded = match crate::Manifest::load(&manifest) {
        Ok(m) => m,
        Err(e) => panic!("asset manifest {}: {e}", manifest.display()),
    };
    let sources = watched_sources(&loaded.table);
    rerun_if_changed(sources.iter().map(PathBuf::as_path));

    let pipeline = loaded.pipeline().on_diagnostics(cargo_warnings);
    match pipeline.run(&loaded.table, &loaded.output) {
        Ok(report) => report,
        Err(e) => panic!("asset pipeline failed: {e}"),
    }
}

/// Repeats compiler output as Cargo warnings, one per line.
pub fn cargo_warnings(source: &Path, diagnostics: &Diagnostics) {
    for line in diagnostics.as_str().lines().filter(|l| !l.trim().is_empty()) {
        println!("cargo:warning={}: {line}", source.display());
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::descriptor::AssetDescriptor;

    #[test]
    fn test_watched_sources_are_inputs() {
        let table = AssetTable::new(vec![
            AssetDescriptor::shader("v.glsl", "vertex", "v.spv"),
            AssetDescriptor::raw("font.ttf"),
        ])
        .unwrap();
        assert_eq!(
            watched_sources(&table),
            vec![PathBuf::from("v.glsl"), PathBuf::from("font.ttf")]
        );
    }
}
