// Copyright 2026 The Mash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Pipeline
//!
//! One pass over an `AssetTable`: compile shaders, encode files, concatenate declarations, write
//! the header.  The pass is a fold that stops at the first error.  Nothing is written until every
//! descriptor has made it into the document, and the write itself replaces the destination in one
//! rename.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::compiler::{Diagnostics, ShaderCompiler};
use crate::descriptor::{AssetDescriptor, AssetTable};
use crate::encode::{self, EncodedAsset};
use crate::prelude::*;
use crate::stamp::Stamp;

pub const DEFAULT_PROLOGUE: &str = "#pragma once\n\n";

/// Receives compiler output as soon as it is captured.
pub type DiagnosticsSink = Box<dyn Fn(&Path, &Diagnostics)>;

pub struct Pipeline<C> {
    compiler: C,
    prologue: String,
    incremental: bool,
    sink: Option<DiagnosticsSink>,
}

/// The generated header, not yet on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    symbols: Vec<String>,
}

/// What a successful run did.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub output: PathBuf,
    /// Declared symbols in document order.
    pub symbols: Vec<String>,
    /// Bytes embedded across all assets.
    pub embedded_bytes: usize,
    /// Shaders the compiler actually ran for.
    pub compiled: usize,
    /// Shaders whose bytecode was already up to date.  Always zero unless incremental.
    pub skipped: usize,
    /// Non-empty compiler output, keyed by shader source.
    pub diagnostics: Vec<(PathBuf, Diagnostics)>,
}

impl<C: ShaderCompiler> Pipeline<C> {
    pub fn new(compiler: C) -> Self {
        Pipeline {
            compiler,
            prologue: DEFAULT_PROLOGUE.to_owned(),
            incremental: false,
            sink: None,
        }
    }

    /// Text emitted once at the top of the document.
    pub fn prologue(mut self, prologue: impl Into<String>) -> Self {
        self.prologue = prologue.into();
        self
    }

    /// Skip compiling shaders whose stamp matches.  Encoding and emission still happen.
    pub fn incremental(mut self, incremental: bool) -> Self {
        self.incremental = incremental;
        self
    }

    /// Hands each non-empty compiler output to `sink` right after that shader compiles, before
    /// later descriptors run.  Without a sink the output is logged with `log::warn!`.
    pub fn on_diagnostics(mut self, sink: impl Fn(&Path, &Diagnostics) + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Builds the document without writing it.  Compiler output is surfaced as it is captured,
    /// through the sink or the warn log, so it is seen even when a later descriptor fails.
    pub fn render(&self, table: &AssetTable) -> Result<Document, AssetError> {
        self.fold(table).map(|(document, _)| document)
    }

    /// Builds the document and writes it to `output`.  On error `output` is left untouched.
    pub fn run(&self, table: &AssetTable, output: &Path) -> Result<PipelineReport, AssetError> {
        let (document, mut report) = self.fold(table)?;
        document.write_atomic(output)?;
        log::info!(
            "wrote {} assets ({} bytes) to {}",
            document.symbols.len(),
            report.embedded_bytes,
            output.display()
        );

        report.output = output.to_path_buf();
        report.symbols = document.symbols;
        Ok(report)
    }

    fn fold(&self, table: &AssetTable) -> Result<(Document, PipelineReport), AssetError> {
        let start = (
            Document {
                text: self.prologue.clone(),
                symbols: Vec::with_capacity(table.len()),
            },
            PipelineReport::default(),
        );

        table
            .iter()
            .try_fold(start, |(mut document, mut report), descriptor| {
                let asset = self.prepare(descriptor, &mut report)?;
                log::info!(
                    "embedded {} as {} ({} bytes)",
                    descriptor.embedded().display(),
                    asset.symbol,
                    asset.bytes.len()
                );
                report.embedded_bytes += asset.bytes.len();
                document.push(&asset);
                Ok((document, report))
            })
    }

    /// Compiles if needed, then encodes.
    fn prepare(
        &self,
        descriptor: &AssetDescriptor,
        report: &mut PipelineReport,
    ) -> Result<EncodedAsset, AssetError> {
        if let AssetDescriptor::Shader {
            source,
            stage,
            compiled,
        } = descriptor
        {
            let stamp = if self.incremental {
                let fingerprint = self.compiler.fingerprint();
                Some(Stamp::compute(source, stage, &fingerprint, compiled)?)
            } else {
                None
            };

            if stamp.as_ref().is_some_and(|s| s.is_current(compiled)) {
                log::debug!("{} is up to date", compiled.display());
                report.skipped += 1;
            } else {
                if let Some(stamp) = &stamp {
                    stamp.clear()?;
                }

                let diagnostics = self.compiler.compile(source, stage, compiled)?;
                if !diagnostics.is_empty() {
                    match &self.sink {
                        Some(sink) => sink(source, &diagnostics),
                        None => log::warn!("{} {stage}:\n{diagnostics}", source.display()),
                    }
                    report.diagnostics.push((source.clone(), diagnostics));
                }

                if let Some(stamp) = &stamp {
                    stamp.write()?;
                }
                report.compiled += 1;
            }
        }

        encode::encode_file(descriptor.embedded())
    }
}

impl Document {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    fn push(&mut self, asset: &EncodedAsset) {
        self.text.push_str(&asset.declaration());
        self.symbols.push(asset.symbol.clone());
    }

    /// Writes to a uniquely named temporary sibling, then renames it over `path`.  Readers see
    /// either the old file or the whole new one.  The temporary is removed on any failure.
    pub fn write_atomic(&self, path: &Path) -> Result<(), AssetError> {
        if path.file_name().is_none() {
            return Err(AssetError::InvalidDescriptor(format!(
                "output {path:?} has no file name"
            )));
        }
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(self.text.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}
