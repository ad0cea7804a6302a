//! Reproducible wheel writer.
//!
//! A wheel is a zip archive with a `<name>-<version>.dist-info/` directory
//! holding `METADATA`, `WHEEL` and `RECORD`. Writing the same
//! [`PackageDescriptor`] twice yields byte-identical files:
//!
//! - every member is Deflated, stamped 1980-01-01 00:00:00 and marked as
//!   created on Unix;
//! - members get `0644`, or `0664` for `RECORD`, unless the caller gave
//!   explicit mode bits;
//! - members are written in insertion order, followed by `METADATA`, `WHEEL`
//!   and `RECORD`.
//!
//! Ordering of caller content is the caller's job; nothing is sorted here.

pub mod metadata;

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub use metadata::{HeaderBlock, Record};

/// `Metadata-Version` emitted in `METADATA`.
pub const METADATA_VERSION: &str = "2.4";

/// `Wheel-Version` emitted in `WHEEL`.
pub const WHEEL_VERSION: &str = "1.0";

/// `Generator` emitted in `WHEEL`.
pub const GENERATOR: &str = "x13binary x13-wheels";

const DEFAULT_MODE: u32 = 0o644;
const RECORD_MODE: u32 = 0o664;

/// Files under `.dist-info/` that only the writer may produce.
const RESERVED: [&str; 3] = ["METADATA", "WHEEL", "RECORD"];

#[derive(Error, Debug)]
pub enum WheelError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Path '{0}' is generated by the wheel writer and cannot be supplied")]
    ReservedPath(String),

    #[error("Duplicate wheel member '{0}'")]
    DuplicatePath(String),
}

/// One caller-supplied wheel member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub path: String,
    pub data: Vec<u8>,
    /// Explicit Unix mode bits; `None` means the writer's default.
    pub mode: Option<u32>,
}

/// Everything that goes into one wheel.
#[derive(Debug, Clone)]
pub struct PackageDescriptor {
    name: String,
    version: String,
    tag: String,
    metadata: Vec<(String, String)>,
    description: Vec<u8>,
    members: Vec<Member>,
    paths: HashSet<String>,
}

impl PackageDescriptor {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            tag: tag.into(),
            metadata: Vec::new(),
            description: Vec::new(),
            members: Vec::new(),
            paths: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// `<name>-<version>.dist-info`
    pub fn dist_info(&self) -> String {
        format!("{}-{}.dist-info", self.name, self.version)
    }

    /// `<name>-<version>.data`
    pub fn data_dir(&self) -> String {
        format!("{}-{}.data", self.name, self.version)
    }

    /// `<name>-<version>-<tag>.whl`
    pub fn file_name(&self) -> String {
        format!("{}-{}-{}.whl", self.name, self.version, self.tag)
    }

    /// Append a `METADATA` header. Order is preserved; repeats are allowed.
    pub fn push_metadata(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.metadata.push((name.into(), value.into()));
    }

    pub fn metadata(&self) -> &[(String, String)] {
        &self.metadata
    }

    /// Long description, written as the `METADATA` body.
    pub fn set_description(&mut self, description: impl Into<Vec<u8>>) {
        self.description = description.into();
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Add a member with the default permissions.
    pub fn add(&mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) -> Result<(), WheelError> {
        self.insert(path.into(), data.into(), None)
    }

    /// Add a member with explicit Unix mode bits.
    pub fn add_with_mode(
        &mut self,
        path: impl Into<String>,
        data: impl Into<Vec<u8>>,
        mode: u32,
    ) -> Result<(), WheelError> {
        self.insert(path.into(), data.into(), Some(mode))
    }

    fn insert(&mut self, path: String, data: Vec<u8>, mode: Option<u32>) -> Result<(), WheelError> {
        if self.is_reserved(&path) {
            return Err(WheelError::ReservedPath(path));
        }
        if !self.paths.insert(path.clone()) {
            return Err(WheelError::DuplicatePath(path));
        }
        self.members.push(Member { path, data, mode });
        Ok(())
    }

    fn is_reserved(&self, path: &str) -> bool {
        let dist_info = self.dist_info();
        path.strip_prefix(dist_info.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(|file| RESERVED.contains(&file))
    }

    fn metadata_file(&self) -> Vec<u8> {
        let mut block = HeaderBlock::new()
            .with("Metadata-Version", METADATA_VERSION)
            .with("Name", &self.name)
            .with("Version", &self.version);
        block.extend(&self.metadata);
        block.to_bytes(&self.description)
    }

    fn wheel_file(&self) -> Vec<u8> {
        HeaderBlock::new()
            .with("Wheel-Version", WHEEL_VERSION)
            .with("Generator", GENERATOR)
            .with("Root-Is-Purelib", "false")
            .with("Tag", &self.tag)
            .to_bytes(b"")
    }
}

/// Zip writer that forces the reproducible member settings and records
/// every member for `RECORD`.
pub struct WheelWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    record: Record,
}

impl<W: Write + Seek> std::fmt::Debug for WheelWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WheelWriter")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

impl<W: Write + Seek> WheelWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            zip: ZipWriter::new(inner),
            record: Record::default(),
        }
    }

    pub fn write_member(&mut self, path: &str, data: &[u8], mode: Option<u32>) -> Result<(), WheelError> {
        let mode = mode.unwrap_or_else(|| default_mode(path));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default())
            .unix_permissions(mode);

        self.zip.start_file(path, options)?;
        self.zip.write_all(data)?;
        self.record.push(path, data);
        debug!(path, size = data.len(), mode = format_args!("{mode:o}"), "wrote wheel member");
        Ok(())
    }

    /// Write `RECORD` under `dist_info` and finish the archive.
    pub fn finish(mut self, dist_info: &str) -> Result<W, WheelError> {
        let record_path = format!("{dist_info}/RECORD");
        let record = std::mem::take(&mut self.record).finish(&record_path);

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default())
            .unix_permissions(default_mode(&record_path));
        self.zip.start_file(record_path.as_str(), options)?;
        self.zip.write_all(&record)?;

        Ok(self.zip.finish()?)
    }
}

fn default_mode(path: &str) -> u32 {
    if path.ends_with(".dist-info/RECORD") {
        RECORD_MODE
    } else {
        DEFAULT_MODE
    }
}

/// Serialise `descriptor` into `writer`, returning the writer.
///
/// # Errors
///
/// Returns an error if any member cannot be compressed or written.
pub fn write_to<W: Write + Seek>(descriptor: &PackageDescriptor, writer: W) -> Result<W, WheelError> {
    let dist_info = descriptor.dist_info();
    let mut wheel = WheelWriter::new(writer);

    for member in &descriptor.members {
        wheel.write_member(&member.path, &member.data, member.mode)?;
    }
    wheel.write_member(&format!("{dist_info}/METADATA"), &descriptor.metadata_file(), None)?;
    wheel.write_member(&format!("{dist_info}/WHEEL"), &descriptor.wheel_file(), None)?;

    wheel.finish(&dist_info)
}

/// Write `descriptor` to `<outdir>/<name>-<version>-<tag>.whl`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_wheel(descriptor: &PackageDescriptor, outdir: &Path) -> Result<PathBuf, WheelError> {
    let path = outdir.join(descriptor.file_name());
    let file = File::create(&path)?;

    let mut out = write_to(descriptor, BufWriter::new(file))?;
    out.flush()?;

    info!(path = %path.display(), members = descriptor.members.len(), "wrote wheel");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn sample() -> PackageDescriptor {
        let mut desc = PackageDescriptor::new("x13binary", "v1.1.61", "py3-none-win_amd64");
        desc.push_metadata("Summary", "X13 binary");
        desc.push_metadata("Classifier", "Programming Language :: Fortran");
        desc.set_description(b"# x13binary\n".to_vec());
        desc.add("x13binary/__init__.py", b"# shim\n".to_vec()).unwrap();
        desc.add_with_mode(
            "x13binary-v1.1.61.data/scripts/x13as_html.exe",
            b"MZ\x90\x00".to_vec(),
            0o100_755,
        )
        .unwrap();
        desc
    }

    fn write(desc: &PackageDescriptor) -> Vec<u8> {
        write_to(desc, Cursor::new(Vec::new())).unwrap().into_inner()
    }

    fn read_member(bytes: &[u8], name: &str) -> Vec<u8> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut out = Vec::new();
        file.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_names() {
        let desc = sample();
        assert_eq!(desc.dist_info(), "x13binary-v1.1.61.dist-info");
        assert_eq!(desc.data_dir(), "x13binary-v1.1.61.data");
        assert_eq!(desc.file_name(), "x13binary-v1.1.61-py3-none-win_amd64.whl");
    }

    #[test]
    fn test_reserved_paths_rejected() {
        let mut desc = sample();
        for file in ["METADATA", "WHEEL", "RECORD"] {
            let err = desc
                .add(format!("x13binary-v1.1.61.dist-info/{file}"), Vec::new())
                .unwrap_err();
            assert!(matches!(err, WheelError::ReservedPath(_)));
        }
        // Other dist-info files are fine
        desc.add("x13binary-v1.1.61.dist-info/licenses/x13binary/LICENSE", b"MIT".to_vec())
            .unwrap();
    }

    #[test]
    fn test_duplicate_paths_rejected() {
        let mut desc = sample();
        let err = desc.add("x13binary/__init__.py", Vec::new()).unwrap_err();
        assert!(matches!(err, WheelError::DuplicatePath(p) if p == "x13binary/__init__.py"));
    }

    #[test]
    fn test_member_order_and_modes() {
        let bytes = write(&sample());
        let mut archive = ZipArchive::new(Cursor::new(&bytes[..])).unwrap();

        let names: Vec<_> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(
            names,
            [
                "x13binary/__init__.py",
                "x13binary-v1.1.61.data/scripts/x13as_html.exe",
                "x13binary-v1.1.61.dist-info/METADATA",
                "x13binary-v1.1.61.dist-info/WHEEL",
                "x13binary-v1.1.61.dist-info/RECORD",
            ]
        );

        let modes: Vec<_> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().unix_mode().unwrap() & 0o777)
            .collect();
        assert_eq!(modes, [0o644, 0o755, 0o644, 0o644, 0o664]);

        for i in 0..archive.len() {
            assert_eq!(
                archive.by_index(i).unwrap().compression(),
                CompressionMethod::Deflated
            );
        }
    }

    #[test]
    fn test_timestamp_is_dos_epoch() {
        let bytes = write(&sample());
        // First local file header: mod time at 10..12, mod date at 12..14
        assert_eq!(&bytes[..4], b"PK\x03\x04");
        assert_eq!(&bytes[10..12], &[0, 0]);
        assert_eq!(&bytes[12..14], &[0x21, 0]);
    }

    #[test]
    fn test_metadata_and_wheel_contents() {
        let bytes = write(&sample());

        let metadata = read_member(&bytes, "x13binary-v1.1.61.dist-info/METADATA");
        assert_eq!(
            String::from_utf8(metadata).unwrap(),
            "Metadata-Version: 2.4\n\
             Name: x13binary\n\
             Version: v1.1.61\n\
             Summary: X13 binary\n\
             Classifier: Programming Language :: Fortran\n\
             \n\
             # x13binary\n"
        );

        let wheel = read_member(&bytes, "x13binary-v1.1.61.dist-info/WHEEL");
        assert_eq!(
            String::from_utf8(wheel).unwrap(),
            format!(
                "Wheel-Version: 1.0\nGenerator: {GENERATOR}\nRoot-Is-Purelib: false\nTag: py3-none-win_amd64\n\n"
            )
        );
    }

    #[test]
    fn test_record_lists_every_member() {
        let bytes = write(&sample());
        let record = String::from_utf8(read_member(&bytes, "x13binary-v1.1.61.dist-info/RECORD")).unwrap();
        let paths: Vec<_> = record
            .lines()
            .map(|line| line.split(',').next().unwrap())
            .collect();
        assert_eq!(
            paths,
            [
                "x13binary/__init__.py",
                "x13binary-v1.1.61.data/scripts/x13as_html.exe",
                "x13binary-v1.1.61.dist-info/METADATA",
                "x13binary-v1.1.61.dist-info/WHEEL",
                "x13binary-v1.1.61.dist-info/RECORD",
            ]
        );
        assert!(record.contains("x13binary-v1.1.61.data/scripts/x13as_html.exe,sha256="));
        assert!(record.ends_with("x13binary-v1.1.61.dist-info/RECORD,,\n"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a");
        let second = dir.path().join("b");
        std::fs::create_dir_all(&first).unwrap();
        std::fs::create_dir_all(&second).unwrap();

        let a = write_wheel(&sample(), &first).unwrap();
        let b = write_wheel(&sample(), &second).unwrap();

        assert_eq!(a.file_name(), b.file_name());
        assert_eq!(std::fs::read(a).unwrap(), std::fs::read(b).unwrap());
    }
}
