// Copyright 2026 The Mash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Assets
//!
//! Build time asset embedding.  Shaders are compiled to SPIR-V by an external compiler, then every
//! asset, compiled or raw, is rendered as an `unsigned char` array and collected into a single
//! header that the application build includes like any other source file.
//!
//! The flow is linear:
//!
//! 1. An [`AssetTable`] lists the assets in the order they will appear in the header.
//! 2. The [`Pipeline`] walks the table.  Shader entries go through a [`ShaderCompiler`] first.
//! 3. Each resulting file is encoded into an [`EncodedAsset`].
//! 4. The declarations are concatenated behind a prologue and written out once, only if every
//!    entry succeeded.
//!
//! The manifest feature (on by default) lets the table and compiler settings live in a TOML file.
//! The build module wraps the whole thing up for `build.rs` scripts.

pub mod build;
pub mod compiler;
pub mod descriptor;
pub mod encode;
#[cfg(feature = "manifest")]
pub mod manifest;
pub mod pipeline;
pub mod stamp;

pub use compiler::{CommandCompiler, CompilerSettings, Diagnostics, ShaderCompiler};
pub use descriptor::{AssetDescriptor, AssetKind, AssetTable};
pub use encode::EncodedAsset;
#[cfg(feature = "manifest")]
pub use manifest::Manifest;
pub use pipeline::{Document, Pipeline, PipelineReport};

use std::path::PathBuf;

mod prelude {
    pub use super::AssetError;
    pub use super::AssetKind;
}

/// Everything that can stop a pipeline run.  None of these are retried; the first one returned
/// ends the run and nothing is emitted.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("{stage} shader {source_path:?} failed to compile:\n{output}")]
    CompileFailed {
        source_path: PathBuf,
        stage: String,
        output: String,
    },
    #[error("could not run shader compiler {program:?}: {source}")]
    CompilerUnavailable {
        program: String,
        source: std::io::Error,
    },
    #[error("could not load {:?}", .0)]
    AssetMissing(PathBuf),
    #[error("asset is empty: {:?}", .0)]
    AssetEmpty(PathBuf),
    #[error("symbol {symbol} is produced by both {first:?} and {second:?}")]
    SymbolCollision {
        symbol: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("more than one shader compiles to {:?}", .0)]
    DuplicateOutput(PathBuf),
    #[error("invalid asset descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("read failed: {:?}", .0)]
    ReadError(#[from] std::io::Error),
    #[cfg(feature = "manifest")]
    #[error("manifest: {0}")]
    Manifest(#[from] toml::de::Error),
}
