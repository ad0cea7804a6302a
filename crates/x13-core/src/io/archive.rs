//! Archive reading module
//!
//! Reads upstream release archives (tar.gz or zip) straight from memory and
//! yields their regular files one at a time. The container is detected from
//! magic bytes, never from a file name.

use std::io::{self, Cursor, Read, Seek};

use flate2::read::GzDecoder;
use thiserror::Error;
use tracing::trace;
use x13_schema::ArchiveFormat;
use zip::ZipArchive;

/// Regular-file bit OR'd into tar modes.
const S_IFREG: u32 = 0o100_000;

/// Central directory file header signature (`PK\x01\x02`).
const CENTRAL_HEADER_MAGIC: [u8; 4] = [0x50, 0x4B, 0x01, 0x02];

/// Offset of the external attributes within a central directory header.
const EXTERNAL_ATTRS_OFFSET: usize = 38;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unsupported archive format (leading bytes {0})")]
    UnsupportedFormat(String),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Corrupt central directory entry for '{0}'")]
    CorruptEntry(String),
}

/// One regular file read out of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path exactly as stored in the archive (`/`-separated)
    pub path: String,
    /// Unix mode bits (see [`ArchiveReader`] for how they are derived)
    pub mode: u32,
    /// File content
    pub data: Vec<u8>,
}

/// An opened in-memory archive.
///
/// Mode bits of yielded entries depend on the container:
/// - tar: the header mode OR'd with the regular-file bit (`0o100000`);
/// - zip: the stored external attributes shifted right by 16, whatever
///   system created the entry (`0` for plain DOS attributes).
pub enum ArchiveReader<'a> {
    TarGz(tar::Archive<GzDecoder<&'a [u8]>>),
    Zip {
        archive: ZipArchive<Cursor<&'a [u8]>>,
        bytes: &'a [u8],
    },
}

impl std::fmt::Debug for ArchiveReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ArchiveReader").field(&self.format()).finish()
    }
}

impl<'a> ArchiveReader<'a> {
    /// Sniff the container format of `bytes` and open it.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::UnsupportedFormat`] when the magic bytes match
    /// neither gzip nor zip, or a zip error when the central directory is
    /// unreadable.
    pub fn new(bytes: &'a [u8]) -> Result<Self, ArchiveError> {
        match ArchiveFormat::sniff(bytes) {
            Some(ArchiveFormat::TarGz) => Ok(Self::TarGz(tar::Archive::new(GzDecoder::new(bytes)))),
            Some(ArchiveFormat::Zip) => Ok(Self::Zip {
                archive: ZipArchive::new(Cursor::new(bytes))?,
                bytes,
            }),
            None => {
                let head = &bytes[..bytes.len().min(4)];
                Err(ArchiveError::UnsupportedFormat(format!("{head:02x?}")))
            }
        }
    }

    pub fn format(&self) -> ArchiveFormat {
        match self {
            Self::TarGz(_) => ArchiveFormat::TarGz,
            Self::Zip { .. } => ArchiveFormat::Zip,
        }
    }

    /// Iterate over the regular files of the archive, in archive order.
    ///
    /// The sequence is single-pass: a gzip stream cannot be rewound, so a
    /// second call on a tar reader fails.
    pub fn entries(&mut self) -> Result<Entries<'_, 'a>, ArchiveError> {
        match self {
            Self::TarGz(archive) => Ok(Entries::Tar(archive.entries()?)),
            Self::Zip { archive, bytes } => Ok(Entries::Zip {
                archive,
                bytes,
                next: 0,
            }),
        }
    }
}

/// Lazy iterator returned by [`ArchiveReader::entries`].
pub enum Entries<'r, 'a> {
    Tar(tar::Entries<'r, GzDecoder<&'a [u8]>>),
    Zip {
        archive: &'r mut ZipArchive<Cursor<&'a [u8]>>,
        bytes: &'a [u8],
        next: usize,
    },
}

impl std::fmt::Debug for Entries<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tar(_) => f.write_str("Entries::Tar"),
            Self::Zip { next, .. } => f.debug_struct("Entries::Zip").field("next", next).finish(),
        }
    }
}

impl Iterator for Entries<'_, '_> {
    type Item = Result<ArchiveEntry, ArchiveError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Tar(entries) => next_tar(entries),
            Self::Zip {
                archive,
                bytes,
                next,
            } => next_zip(archive, bytes, next),
        }
    }
}

fn next_tar<R: Read>(
    entries: &mut tar::Entries<'_, R>,
) -> Option<Result<ArchiveEntry, ArchiveError>> {
    loop {
        let mut entry = match entries.next()? {
            Ok(entry) => entry,
            Err(e) => return Some(Err(e.into())),
        };

        // Directories, links and device nodes carry no payload worth keeping
        let kind = entry.header().entry_type();
        if !(kind.is_file() || kind.is_contiguous() || kind.is_gnu_sparse()) {
            trace!(path = %String::from_utf8_lossy(&entry.path_bytes()), "skipping non-regular tar entry");
            continue;
        }

        return Some(read_tar_entry(&mut entry));
    }
}

fn read_tar_entry<R: Read>(entry: &mut tar::Entry<'_, R>) -> Result<ArchiveEntry, ArchiveError> {
    let path = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
    let mode = entry.header().mode()? | S_IFREG;

    // The header size is untrusted; let the buffer grow with what is read
    let declared = entry.size();
    let mut data = Vec::new();
    entry.read_to_end(&mut data)?;
    if (data.len() as u64) < declared {
        return Err(ArchiveError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("{path}: expected {declared} bytes, archive ended after {}", data.len()),
        )));
    }

    Ok(ArchiveEntry { path, mode, data })
}

fn next_zip<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    bytes: &[u8],
    next: &mut usize,
) -> Option<Result<ArchiveEntry, ArchiveError>> {
    while *next < archive.len() {
        let index = *next;
        *next += 1;

        let mut file = match archive.by_index(index) {
            Ok(file) => file,
            Err(e) => return Some(Err(e.into())),
        };

        if file.is_dir() {
            trace!(path = file.name(), "skipping zip directory entry");
            continue;
        }

        let path = file.name().to_string();
        let mode = match external_attributes(bytes, file.central_header_start()) {
            Some(attrs) => attrs >> 16,
            None => return Some(Err(ArchiveError::CorruptEntry(path))),
        };

        let mut data = Vec::new();
        if let Err(e) = file.read_to_end(&mut data) {
            return Some(Err(e.into()));
        }

        return Some(Ok(ArchiveEntry { path, mode, data }));
    }

    None
}

/// Raw external attributes of the central directory header at `start`.
///
/// Read from the bytes directly: the zip crate synthesises a Unix mode for
/// entries created on other systems.
fn external_attributes(bytes: &[u8], start: u64) -> Option<u32> {
    let start = usize::try_from(start).ok()?;
    let header = bytes.get(start..start.checked_add(EXTERNAL_ATTRS_OFFSET + 4)?)?;
    if header[..4] != CENTRAL_HEADER_MAGIC {
        return None;
    }
    let attrs = &header[EXTERNAL_ATTRS_OFFSET..];
    Some(u32::from_le_bytes([attrs[0], attrs[1], attrs[2], attrs[3]]))
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! In-memory archive builders shared by the tests of this crate.

    use std::io::{Cursor, Write};

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use zip::write::SimpleFileOptions;

    /// A file to place in a fixture archive: (path, mode, content).
    pub(crate) type FixtureFile<'a> = (&'a str, u32, &'a str);

    pub(crate) fn tar_gz(dirs: &[&str], files: &[FixtureFile<'_>]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for dir in dirs {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Directory);
            header.set_mode(0o755);
            header.set_size(0);
            builder
                .append_data(&mut header, dir, std::io::empty())
                .unwrap();
        }

        for (path, mode, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_mode(*mode);
            header.set_size(data.len() as u64);
            builder
                .append_data(&mut header, path, data.as_bytes())
                .unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap()
    }

    pub(crate) fn zip(dirs: &[&str], files: &[FixtureFile<'_>]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));

        for dir in dirs {
            writer
                .add_directory(*dir, SimpleFileOptions::default())
                .unwrap();
        }

        for (path, mode, data) in files {
            let options = SimpleFileOptions::default().unix_permissions(*mode);
            writer.start_file(*path, options).unwrap();
            writer.write_all(data.as_bytes()).unwrap();
        }

        writer.finish().unwrap().into_inner()
    }
}
