//! Owners for container bytes read from disk.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use memmap2::{Mmap, MmapOptions};

/// Bytes of a container file, either mapped or on the heap.
///
/// Parse results borrow from [`Source::as_slice`], so the source must outlive
/// every [`crate::fat::ParsedFatBinary`] built from it.
#[derive(Debug)]
pub enum Source {
    /// Read-only mapping of a file.
    Mmap { mmap: Mmap, path: PathBuf },
    Heap(Vec<u8>),
}

impl Source {
    /// Map `path` read-only.
    ///
    /// The file must not be truncated or modified while mapped; doing so is
    /// undefined behaviour (SIGBUS on Unix for truncation).
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        // Zero-length maps fail on some platforms.
        if file.metadata()?.len() == 0 {
            return Ok(Self::Heap(Vec::new()));
        }
        // SAFETY: opened read-only; the caller owns the single-writer contract
        // documented above.
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        Ok(Self::Mmap {
            mmap,
            path: path.to_path_buf(),
        })
    }

    /// Read `path` fully into memory.
    pub fn read(path: impl AsRef<Path>) -> io::Result<Self> {
        std::fs::read(path).map(Self::Heap)
    }

    /// File the mapping was made from; `None` for heap sources.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Mmap { path, .. } => Some(path.as_path()),
            Self::Heap(_) => None,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        match self {
            Self::Mmap { mmap, .. } => mmap,
            Self::Heap(data) => data,
        }
    }
}
