// Copyright 2026 The Mash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Encoder
//!
//! Turns a file into a C array declaration:
//!
//! ```c
//! unsigned char vertex_spv_data[] = {
//! 	3,2,35,7,0,0,1,0,11,0,8,0,54,0,0,0,
//! 	17,0,2,0,
//! };
//! ```
//!
//! Sixteen values per line, every value followed by a comma.  The layout is not load-bearing but it
//! is kept stable so regenerated headers diff cleanly.

use std::path::Path;

use crate::prelude::*;

/// Appended to every sanitized file name.
pub const SYMBOL_SUFFIX: &str = "_data";

pub const VALUES_PER_LINE: usize = 16;

/// One embedded file, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAsset {
    pub symbol: String,
    pub bytes: Vec<u8>,
}

impl EncodedAsset {
    /// Renders the full declaration, including the trailing blank line.
    pub fn declaration(&self) -> String {
        let lines = self.bytes.len().div_ceil(VALUES_PER_LINE);
        let mut out =
            String::with_capacity(self.symbol.len() + self.bytes.len() * 4 + lines * 2 + 32);

        out.push_str("unsigned char ");
        out.push_str(&self.symbol);
        out.push_str("[] = {");
        for (i, b) in self.bytes.iter().enumerate() {
            if i % VALUES_PER_LINE == 0 {
                out.push_str("\n\t");
            }
            out.push_str(&b.to_string());
            out.push(',');
        }
        out.push_str("\n};\n\n");
        out
    }
}

/// Replaces everything outside `[0-9A-Za-z]` with `_`.
pub fn sanitize_symbol(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Symbol for the file at `path`, taken from its file name only.
pub fn symbol_for(path: &Path) -> Result<String, AssetError> {
    let name = path
        .file_name()
        .ok_or_else(|| AssetError::InvalidDescriptor(format!("{path:?} has no file name")))?;

    let symbol = sanitize_symbol(&name.to_string_lossy()) + SYMBOL_SUFFIX;
    if symbol.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(AssetError::InvalidDescriptor(format!(
            "{path:?} would produce {symbol}, which is not a C identifier"
        )));
    }
    Ok(symbol)
}

/// Wraps bytes already in memory.  Empty input is an authoring error.
pub fn encode_bytes(path: &Path, bytes: Vec<u8>) -> Result<EncodedAsset, AssetError> {
    if bytes.is_empty() {
        return Err(AssetError::AssetEmpty(path.to_path_buf()));
    }
    Ok(EncodedAsset {
        symbol: symbol_for(path)?,
        bytes,
    })
}

/// Reads and encodes the file at `path`.
pub fn encode_file(path: &Path) -> Result<EncodedAsset, AssetError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AssetError::AssetMissing(path.to_path_buf()),
        _ => e.into(),
    })?;
    encode_bytes(path, bytes)
}

/// Reads the values back out of a rendered declaration.  Returns `None` on anything that is not a
/// brace-delimited list of bytes.
pub fn decode_literal(text: &str) -> Option<Vec<u8>> {
    let open = text.find('{')?;
    let close = open + text[open..].find('}')?;

    text[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<u8>().ok())
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sanitize_symbol() {
        assert_eq!(sanitize_symbol("vertex.spv"), "vertex_spv");
        assert_eq!(sanitize_symbol("my font-Bold 2.ttf"), "my_font_Bold_2_ttf");
        // One underscore per character, not per byte.
        assert_eq!(sanitize_symbol("née.bin"), "n_e_bin");
        assert_eq!(sanitize_symbol("plain09AZ"), "plain09AZ");
    }

    #[test]
    fn test_sanitize_idempotent() {
        for name in ["vertex.spv", "a-b c.d", "ünï.cødé", "___", "x"] {
            let once = sanitize_symbol(name);
            assert_eq!(sanitize_symbol(&once), once);
            assert!(once.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
            assert_eq!(once.chars().count(), name.chars().count());
        }
    }

    #[test]
    fn test_symbol_uses_file_name_only() {
        assert_eq!(
            symbol_for(Path::new("shaders/out/vertex.spv")).unwrap(),
            "vertex_spv_data"
        );
        assert!(matches!(
            symbol_for(Path::new("/")),
            Err(AssetError::InvalidDescriptor(_))
        ));
        assert!(matches!(
            symbol_for(Path::new("3d.bin")),
            Err(AssetError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn test_declaration_layout() {
        let asset = EncodedAsset {
            symbol: "a_txt_data".to_owned(),
            bytes: vec![1, 2, 3],
        };
        assert_eq!(
            asset.declaration(),
            "unsigned char a_txt_data[] = {\n\t1,2,3,\n};\n\n"
        );
    }

    #[test]
    fn test_declaration_wraps_at_sixteen() {
        let asset = EncodedAsset {
            symbol: "b_txt_data".to_owned(),
            bytes: vec![9; 17],
        };
        let expected = format!(
            "unsigned char b_txt_data[] = {{\n\t{}\n\t9,\n}};\n\n",
            "9,".repeat(16)
        );
        assert_eq!(asset.declaration(), expected);
    }

    #[test]
    fn test_decode_round_trip() {
        let bytes: Vec<u8> = (0..=255u8).chain([0, 255, 128]).collect();
        let asset = encode_bytes(Path::new("all.bin"), bytes.clone()).unwrap();
        assert_eq!(decode_literal(&asset.declaration()), Some(bytes));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(decode_literal("no braces"), None);
        assert_eq!(decode_literal("x[] = {1,256,};"), None);
    }

    #[test]
    fn test_empty_bytes_rejected() {
        let err = encode_bytes(Path::new("empty.bin"), Vec::new()).unwrap_err();
        assert!(matches!(err, AssetError::AssetEmpty(p) if p == Path::new("empty.bin")));
    }

    #[test]
    fn test_encode_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, [137u8, 80, 78, 71]).unwrap();

        let asset = encode_file(&path).unwrap();
        assert_eq!(asset.symbol, "logo_png_data");
        assert_eq!(asset.bytes, vec![137, 80, 78, 71]);

        let missing = encode_file(&dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(missing, AssetError::AssetMissing(_)));

        let empty = dir.path().join("empty.png");
        std::fs::write(&empty, b"").unwrap();
        assert!(matches!(encode_file(&empty), Err(AssetError::AssetEmpty(_))));
    }
}
