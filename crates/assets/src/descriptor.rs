// Copyright 2026 The Mash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Descriptor Table
//!
//! The list of assets a pipeline run knows about.  Tables are built once, checked once, and then
//! only read.  Table order is output order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::encode;
use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Embedded byte for byte.
    Raw,
    /// GLSL source that must be compiled before embedding.
    Shader,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetDescriptor {
    Raw {
        source: PathBuf,
    },
    Shader {
        source: PathBuf,
        /// Passed to the compiler as-is, e.g. `vertex` or `fragment`.
        stage: String,
        /// Where the compiler writes bytecode.  This file is what gets embedded.
        compiled: PathBuf,
    },
}

impl AssetDescriptor {
    pub fn raw(source: impl Into<PathBuf>) -> Self {
        AssetDescriptor::Raw {
            source: source.into(),
        }
    }

    pub fn shader(
        source: impl Into<PathBuf>,
        stage: impl Into<String>,
        compiled: impl Into<PathBuf>,
    ) -> Self {
        AssetDescriptor::Shader {
            source: source.into(),
            stage: stage.into(),
            compiled: compiled.into(),
        }
    }

    pub fn kind(&self) -> AssetKind {
        match self {
            AssetDescriptor::Raw { .. } => AssetKind::Raw,
            AssetDescriptor::Shader { .. } => AssetKind::Shader,
        }
    }

    pub fn source(&self) -> &Path {
        match self {
            AssetDescriptor::Raw { source } => source,
            AssetDescriptor::Shader { source, .. } => source,
        }
    }

    /// The file whose bytes end up in the header.
    pub fn embedded(&self) -> &Path {
        match self {
            AssetDescriptor::Raw { source } => source,
            AssetDescriptor::Shader { compiled, .. } => compiled,
        }
    }

    /// Symbol of the array declaration this descriptor produces.
    pub fn symbol(&self) -> Result<String, AssetError> {
        encode::symbol_for(self.embedded())
    }

    /// Joins relative paths onto `root`.  Absolute paths are left alone.
    pub fn rooted(self, root: &Path) -> Self {
        match self {
            AssetDescriptor::Raw { source } => AssetDescriptor::Raw {
                source: root.join(source),
            },
            AssetDescriptor::Shader {
                source,
                stage,
                compiled,
            } => AssetDescriptor::Shader {
                source: root.join(source),
                stage,
                compiled: root.join(compiled),
            },
        }
    }
}

/// An ordered, validated set of descriptors.
///
/// Construction rejects tables that could only produce a broken header: two entries rendering to
/// the same symbol, or two shaders overwriting each other's bytecode.
#[derive(Debug, Clone)]
pub struct AssetTable {
    descriptors: Vec<AssetDescriptor>,
}

impl AssetTable {
    pub fn new(descriptors: Vec<AssetDescriptor>) -> Result<Self, AssetError> {
        let mut outputs: Vec<&Path> = Vec::new();
        let mut symbols: HashMap<String, &Path> = HashMap::with_capacity(descriptors.len());

        for d in &descriptors {
            if let AssetDescriptor::Shader {
                source,
                stage,
                compiled,
            } = d
            {
                if stage.trim().is_empty() {
                    return Err(AssetError::InvalidDescriptor(format!(
                        "shader {source:?} has no stage"
                    )));
                }
                if source == compiled {
                    return Err(AssetError::InvalidDescriptor(format!(
                        "shader {source:?} would be compiled over itself"
                    )));
                }
                if outputs.contains(&compiled.as_path()) {
                    return Err(AssetError::DuplicateOutput(compiled.clone()));
                }
                outputs.push(compiled);
            }

            let symbol = d.symbol()?;
            if let Some(first) = symbols.get(&symbol) {
                return Err(AssetError::SymbolCollision {
                    symbol,
                    first: first.to_path_buf(),
                    second: d.embedded().to_path_buf(),
                });
            }
            symbols.insert(symbol, d.embedded());
        }

        Ok(AssetTable { descriptors })
    }

    /// The two shaders the editor ships with, relative to `root`.
    pub fn default_shaders(root: &Path) -> Self {
        AssetTable {
            descriptors: vec![
                AssetDescriptor::shader("vertex.glsl", "vertex", "vertex.spv").rooted(root),
                AssetDescriptor::shader("fragment.glsl", "fragment", "fragment.spv").rooted(root),
            ],
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssetDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Fails on the first descriptor whose source file does not exist.
    pub fn check_sources(&self) -> Result<(), AssetError> {
        match self.iter().find(|d| !d.source().is_file()) {
            Some(d) => Err(AssetError::AssetMissing(d.source().to_path_buf())),
            None => Ok(()),
        }
    }
}

impl<'a> IntoIterator for &'a AssetTable {
    type Item = &'a AssetDescriptor;
    type IntoIter = std::slice::Iter<'a, AssetDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_embedded_path_follows_kind() {
        let raw = AssetDescriptor::raw("font.ttf");
        assert_eq!(raw.kind(), AssetKind::Raw);
        assert_eq!(raw.embedded(), Path::new("font.ttf"));

        let shader = AssetDescriptor::shader("vertex.glsl", "vertex", "vertex.spv");
        assert_eq!(shader.kind(), AssetKind::Shader);
        assert_eq!(shader.source(), Path::new("vertex.glsl"));
        assert_eq!(shader.embedded(), Path::new("vertex.spv"));
        assert_eq!(shader.symbol().unwrap(), "vertex_spv_data");
    }

    #[test]
    fn test_symbol_collision_rejected() {
        // Both sanitize to `a_b_data`.
        let err = AssetTable::new(vec![
            AssetDescriptor::raw("one/a.b"),
            AssetDescriptor::raw("two/a-b"),
        ])
        .unwrap_err();

        match err {
            AssetError::SymbolCollision {
                symbol,
                first,
                second,
            } => {
                assert_eq!(symbol, "a_b_data");
                assert_eq!(first, PathBuf::from("one/a.b"));
                assert_eq!(second, PathBuf::from("two/a-b"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_output_rejected() {
        let err = AssetTable::new(vec![
            AssetDescriptor::shader("a.glsl", "vertex", "out.spv"),
            AssetDescriptor::shader("b.glsl", "fragment", "out.spv"),
        ])
        .unwrap_err();
        assert!(matches!(err, AssetError::DuplicateOutput(p) if p == Path::new("out.spv")));
    }

    #[test]
    fn test_invalid_shaders_rejected() {
        let no_stage = AssetTable::new(vec![AssetDescriptor::shader("a.glsl", " ", "a.spv")]);
        assert!(matches!(no_stage, Err(AssetError::InvalidDescriptor(_))));

        let in_place = AssetTable::new(vec![AssetDescriptor::shader("a.glsl", "vertex", "a.glsl")]);
        assert!(matches!(in_place, Err(AssetError::InvalidDescriptor(_))));
    }

    #[test]
    fn test_table_keeps_order() {
        let table = AssetTable::new(vec![
            AssetDescriptor::raw("z.bin"),
            AssetDescriptor::raw("a.bin"),
            AssetDescriptor::shader("m.glsl", "fragment", "m.spv"),
        ])
        .unwrap();
        let embedded: Vec<_> = table.iter().map(|d| d.embedded().to_path_buf()).collect();
        assert_eq!(
            embedded,
            vec![
                PathBuf::from("z.bin"),
                PathBuf::from("a.bin"),
                PathBuf::from("m.spv")
            ]
        );
    }

    #[test]
    fn test_default_shaders_rooted() {
        let table = AssetTable::default_shaders(Path::new("/src/mash"));
        assert_eq!(table.len(), 2);
        let first = table.iter().next().unwrap();
        assert_eq!(first.source(), Path::new("/src/mash/vertex.glsl"));
        assert_eq!(first.embedded(), Path::new("/src/mash/vertex.spv"));
    }
}
