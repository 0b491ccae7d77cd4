// Copyright 2026 The Mash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Manifest
//!
//! Describes a pipeline run in TOML so that the table lives next to the assets it names:
//!
//! ```toml
//! output = "assets.h"
//! incremental = true
//!
//! [compiler]
//! args = ["--target-env=vulkan1.2"]
//!
//! [[asset]]
//! kind = "shader"
//! source = "vertex.glsl"
//! stage = "vertex"
//! compiled = "vertex.spv"
//!
//! [[asset]]
//! kind = "raw"
//! source = "font.ttf"
//! ```
//!
//! Relative paths are taken from the manifest's directory.  A shader without `compiled` goes to its
//! source path with the extension swapped for `spv`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::compiler::{CommandCompiler, CompilerSettings};
use crate::descriptor::{AssetDescriptor, AssetTable};
use crate::pipeline::{DEFAULT_PROLOGUE, Pipeline, PipelineReport};
use crate::prelude::*;

/// Conventional manifest name, looked up in the working directory by the command line tool.
pub const MANIFEST_NAME: &str = "assets.toml";
pub const DEFAULT_OUTPUT: &str = "assets.h";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ManifestFile {
    output: Option<PathBuf>,
    prologue: Option<String>,
    #[serde(default)]
    incremental: bool,
    #[serde(default)]
    compiler: CompilerSettings,
    #[serde(default, rename = "asset")]
    assets: Vec<AssetEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
enum AssetEntry {
    Raw {
        source: PathBuf,
    },
    Shader {
        source: PathBuf,
        stage: String,
        compiled: Option<PathBuf>,
    },
}

impl From<AssetEntry> for AssetDescriptor {
    fn from(entry: AssetEntry) -> Self {
        match entry {
            AssetEntry::Raw { source } => AssetDescriptor::raw(source),
            AssetEntry::Shader {
                source,
                stage,
                compiled,
            } => {
                let compiled = compiled.unwrap_or_else(|| source.with_extension("spv"));
                AssetDescriptor::shader(source, stage, compiled)
            }
        }
    }
}

/// A loaded, validated manifest.  Every path in it is already joined onto `root`.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub root: PathBuf,
    pub output: PathBuf,
    pub prologue: String,
    pub incremental: bool,
    pub compiler: CompilerSettings,
    pub table: AssetTable,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AssetError::AssetMissing(path.to_path_buf()),
            _ => e.into(),
        })?;
        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        Self::parse(&text, root)
    }

    pub fn parse(text: &str, root: &Path) -> Result<Self, AssetError> {
        let file: ManifestFile = toml::from_str(text)?;

        let descriptors = file
            .assets
            .into_iter()
            .map(|entry| AssetDescriptor::from(entry).rooted(root))
            .collect();

        Ok(Manifest {
            root: root.to_path_buf(),
            output: root.join(file.output.unwrap_or_else(|| DEFAULT_OUTPUT.into())),
            prologue: file.prologue.unwrap_or_else(|| DEFAULT_PROLOGUE.to_owned()),
            incremental: file.incremental,
            compiler: file.compiler,
            table: AssetTable::new(descriptors)?,
        })
    }

    /// What runs when there is no manifest: the editor's two shaders, compiled with `glslc` into
    /// `assets.h`, all under `root`.
    pub fn builtin(root: &Path) -> Self {
        Manifest {
            root: root.to_path_buf(),
            output: root.join(DEFAULT_OUTPUT),
            prologue: DEFAULT_PROLOGUE.to_owned(),
            incremental: false,
            compiler: CompilerSettings::default(),
            table: AssetTable::default_shaders(root),
        }
    }

    pub fn pipeline(&self) -> Pipeline<CommandCompiler> {
        Pipeline::new(CommandCompiler::new(self.compiler.clone()))
            .prologue(self.prologue.clone())
            .incremental(self.incremental)
    }

    pub fn run(&self) -> Result<PipelineReport, AssetError> {
        self.pipeline().run(&self.table, &self.output)
    }
}
