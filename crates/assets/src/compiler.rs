// Copyright 2026 The Mash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Shader Compiler
//!
//! The pipeline only needs one thing from a compiler: turn a source of some stage into bytecode at
//! a path, and say whether that worked.  `ShaderCompiler` is that contract.  `CommandCompiler`
//! fulfils it by running an external program, `glslc` unless configured otherwise.
//!
//! Exit status is the only success signal.  Whatever the program prints is advisory and handed
//! back as `Diagnostics`, whether it succeeded or not.  Both output streams are read from one pipe,
//! interleaved as the compiler wrote them.

use std::ffi::OsString;
use std::fmt;
use std::io::{self, Read};
use std::path::Path;
use std::{fs, process};

use crate::prelude::*;

/// Compile `source` for `stage`, writing bytecode to `destination`.
pub trait ShaderCompiler {
    fn compile(
        &self,
        source: &Path,
        stage: &str,
        destination: &Path,
    ) -> Result<Diagnostics, AssetError>;

    /// Anything about the compiler that changes its output.  Mixed into staleness stamps so that
    /// switching compilers or flags forces a rebuild.
    fn fingerprint(&self) -> String {
        String::new()
    }
}

impl<T: ShaderCompiler + ?Sized> ShaderCompiler for &T {
    fn compile(
        &self,
        source: &Path,
        stage: &str,
        destination: &Path,
    ) -> Result<Diagnostics, AssetError> {
        (**self).compile(source, stage, destination)
    }

    fn fingerprint(&self) -> String {
        (**self).fingerprint()
    }
}

/// Captured compiler output.  Empty when the compiler had nothing to say.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(pub String);

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How to spell a compiler invocation.  The argument list is
/// `program [args..] <stage-flag><stage> <output-flag> <destination> <source>`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "manifest", derive(serde::Deserialize))]
#[cfg_attr(feature = "manifest", serde(default, rename_all = "kebab-case"))]
pub struct CompilerSettings {
    pub program: String,
    /// Prefix glued directly onto the stage name.
    pub stage_flag: String,
    pub output_flag: String,
    /// Extra arguments, placed before the stage flag.
    pub args: Vec<String>,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        CompilerSettings {
            program: "glslc".to_owned(),
            stage_flag: "-fshader-stage=".to_owned(),
            output_flag: "-o".to_owned(),
            args: Vec::new(),
        }
    }
}

/// Runs an external compiler as a child process and blocks until it exits.
#[derive(Debug, Clone, Default)]
pub struct CommandCompiler {
    settings: CompilerSettings,
}

impl CommandCompiler {
    pub fn new(settings: CompilerSettings) -> Self {
        CommandCompiler { settings }
    }

    pub fn settings(&self) -> &CompilerSettings {
        &self.settings
    }

    /// Arguments after the program name.
    pub fn arguments(&self, source: &Path, stage: &str, destination: &Path) -> Vec<OsString> {
        let s = &self.settings;
        let mut args: Vec<OsString> = s.args.iter().map(OsString::from).collect();
        args.push(format!("{}{}", s.stage_flag, stage).into());
        args.push(OsString::from(&s.output_flag));
        args.push(destination.as_os_str().to_owned());
        args.push(source.as_os_str().to_owned());
        args
    }
}

impl ShaderCompiler for CommandCompiler {
    fn compile(
        &self,
        source: &Path,
        stage: &str,
        destination: &Path,
    ) -> Result<Diagnostics, AssetError> {
        if !source.is_file() {
            return Err(AssetError::AssetMissing(source.to_path_buf()));
        }
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let args = self.arguments(source, stage, destination);
        log::debug!("running {} {:?}", self.settings.program, args);

        // stdout and stderr share one pipe so the text keeps the order the compiler wrote it in.
        let (mut reader, writer) = io::pipe()?;
        let mut child = {
            let mut command = process::Command::new(&self.settings.program);
            command
                .args(&args)
                .stdin(process::Stdio::null())
                .stdout(writer.try_clone()?)
                .stderr(writer);
            command.spawn()
        }
        .map_err(|e| AssetError::CompilerUnavailable {
            program: self.settings.program.clone(),
            source: e,
        })?;

        // The command and its copies of the write end are gone, so this ends when the child exits.
        let mut captured = Vec::new();
        reader.read_to_end(&mut captured)?;
        let status = child.wait()?;
        let text = String::from_utf8_lossy(&captured).into_owned();

        if !status.success() {
            return Err(AssetError::CompileFailed {
                source_path: source.to_path_buf(),
                stage: stage.to_owned(),
                output: text,
            });
        }

        if !destination.is_file() {
            return Err(AssetError::AssetMissing(destination.to_path_buf()));
        }

        Ok(Diagnostics(text))
    }

    fn fingerprint(&self) -> String {
        let s = &self.settings;
        format!(
            "{} {} {} {}",
            s.program,
            s.args.join(" "),
            s.stage_flag,
            s.output_flag
        )
    }
}
