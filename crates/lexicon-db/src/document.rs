use std::borrow::Cow;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use thiserror::Error;

/// Strategy for loading a source document.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the file (fast, zero-copy).
    #[default]
    Mmap,
    /// Read the file into an owned buffer (portable fallback).
    Owned,
}

impl LoadMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mmap" => Some(LoadMode::Mmap),
            "owned" => Some(LoadMode::Owned),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to mmap {}: {source}", path.display())]
    Map {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

/// Extracted text of one print dictionary, one entry candidate per line.
pub struct Document {
    path: PathBuf,
    buffer: Buffer,
}

impl Document {
    /// Load a text file, memory-mapping it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::load_with_mode(path, LoadMode::Mmap)
    }

    pub fn load_with_mode(path: impl AsRef<Path>, mode: LoadMode) -> Result<Self, LoadError> {
        let path = path.as_ref().to_path_buf();
        let buffer = load_file(&path, mode)?;
        Ok(Self { path, buffer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len_bytes(&self) -> usize {
        self.buffer.as_slice().len()
    }

    /// Document text; OCR output with invalid UTF-8 is decoded lossily.
    pub fn contents(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.buffer.as_slice())
    }
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer, LoadError> {
    let open = |path: &Path| {
        File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })
    };
    match mode {
        LoadMode::Mmap => {
            let file = open(path)?;
            // Zero-length files cannot be mapped on every platform.
            if file.metadata().map(|m| m.len() == 0).unwrap_or(false) {
                return Ok(Buffer::Owned(Vec::new()));
            }
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .map_err(|source| LoadError::Map {
                    path: path.to_path_buf(),
                    source,
                })
        }
        LoadMode::Owned => {
            let mut file = open(path)?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .map_err(|source| LoadError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
            Ok(Buffer::Owned(buf))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_in_both_modes() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "abide v. x /abaid/\r\nPage 1\n").unwrap();
        for mode in [LoadMode::Mmap, LoadMode::Owned] {
            let doc = Document::load_with_mode(file.path(), mode).unwrap();
            let text = doc.contents();
            let lines: Vec<&str> = text.lines().collect();
            assert_eq!(lines, vec!["abide v. x /abaid/", "Page 1"]);
        }
    }

    #[test]
    fn empty_file_maps_to_empty_text() {
        let file = NamedTempFile::new().unwrap();
        let doc = Document::load(file.path()).unwrap();
        assert_eq!(doc.len_bytes(), 0);
        assert_eq!(doc.contents(), "");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"ab\xffcd\n").unwrap();
        let doc = Document::load_with_mode(file.path(), LoadMode::Owned).unwrap();
        assert_eq!(doc.contents(), "ab\u{fffd}cd\n");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Document::load("/definitely/not/here.txt")
            .err()
            .expect("missing file errors");
        assert!(matches!(err, LoadError::Open { .. }));
        assert!(err.to_string().contains("/definitely/not/here.txt"));
    }

    #[test]
    fn parses_load_modes() {
        assert_eq!(LoadMode::parse("MMAP"), Some(LoadMode::Mmap));
        assert_eq!(LoadMode::parse("owned"), Some(LoadMode::Owned));
        assert_eq!(LoadMode::parse("disk"), None);
    }
}
