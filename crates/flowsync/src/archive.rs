//! Zip archive helpers shared by form installation, bootstrap and export.

use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};

use flowsync_core::bootstrap::{classify_entry, entry_file_name, EntryKind};
use zip::write::FileOptions;
use zip::ZipArchive;

/// An archive entry worth extracting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub kind: EntryKind,
    /// Full path inside the archive.
    pub path: String,
    pub contents: Vec<u8>,
}

impl ArchiveEntry {
    /// Last path segment, used as the extracted file name.
    pub fn file_name(&self) -> &str {
        entry_file_name(&self.path).unwrap_or(&self.path)
    }
}

/// Reads the form definitions and cascade resources of an archive.
///
/// Other entries are skipped.
pub fn read_entries<R: Read + Seek>(reader: R) -> zip::result::ZipResult<Vec<ArchiveEntry>> {
    let mut archive = ZipArchive::new(reader)?;
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let path = file.name().to_string();
        let kind = classify_entry(&path);
        if kind == EntryKind::Ignored || entry_file_name(&path).is_none() {
            continue;
        }
        let mut contents = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut contents)?;
        entries.push(ArchiveEntry {
            kind,
            path,
            contents,
        });
    }
    Ok(entries)
}

/// Reads entries from an in-memory archive.
pub fn read_entries_from_bytes(bytes: &[u8]) -> zip::result::ZipResult<Vec<ArchiveEntry>> {
    read_entries(Cursor::new(bytes))
}

/// Writes definitions into `forms_dir` and cascade resources into `resources_dir`.
///
/// Returns the paths written, in archive order.
pub fn extract_entries(
    entries: &[ArchiveEntry],
    forms_dir: &Path,
    resources_dir: &Path,
) -> std::io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(forms_dir)?;
    std::fs::create_dir_all(resources_dir)?;

    let mut written = Vec::with_capacity(entries.len());
    for entry in entries {
        let dir = match entry.kind {
            EntryKind::SurveyDefinition => forms_dir,
            EntryKind::CascadeResource => resources_dir,
            EntryKind::Ignored => continue,
        };
        let path = dir.join(entry.file_name());
        std::fs::write(&path, &entry.contents)?;
        written.push(path);
    }
    Ok(written)
}

/// Writes a single-entry archive to `path`.
pub fn write_single_entry(path: &Path, entry_name: &str, contents: &[u8]) -> zip::result::ZipResult<()> {
    let file = File::create(path)?;
    let mut writer = zip::ZipWriter::new(file);
    writer.start_file(entry_name, FileOptions::default())?;
    writer.write_all(contents)?;
    writer.finish()?;
    Ok(())
}
