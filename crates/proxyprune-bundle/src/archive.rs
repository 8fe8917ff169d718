use anyhow::Context;
use camino::Utf8Path;
use proxyprune_model::FileTree;
use proxyprune_types::BundlePath;
use std::io::{Read, Write};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Read a bundle archive into a file tree.
///
/// Directory entries are skipped; entry names that would escape the archive
/// root are rejected outright.
pub fn read_bundle_zip(path: &Utf8Path) -> anyhow::Result<FileTree> {
    let file = std::fs::File::open(path).with_context(|| format!("open {path}"))?;
    let mut archive = ZipArchive::new(file).with_context(|| format!("read zip {path}"))?;

    let mut tree = FileTree::new();
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .with_context(|| format!("read zip entry #{index} in {path}"))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        if entry.enclosed_name().is_none() {
            anyhow::bail!("unsafe entry name in {path}: {name}");
        }
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .with_context(|| format!("read zip entry {name} in {path}"))?;
        tree.insert(BundlePath::new(&name), bytes);
    }
    Ok(tree)
}

/// Write a tree as a zip archive, entries in tree (lexicographic) order.
/// Returns the resulting archive byte size.
pub fn write_bundle_zip(tree: &FileTree, path: &Utf8Path) -> anyhow::Result<u64> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory {parent}"))?;
    }
    let file = std::fs::File::create(path).with_context(|| format!("create {path}"))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    for (entry, bytes) in tree.iter() {
        writer
            .start_file(entry.as_str(), options)
            .with_context(|| format!("start zip entry {entry} in {path}"))?;
        writer
            .write_all(bytes)
            .with_context(|| format!("write zip entry {entry} in {path}"))?;
    }
    writer.finish().with_context(|| format!("finish zip {path}"))?;

    let size = std::fs::metadata(path.as_std_path())
        .with_context(|| format!("stat {path}"))?
        .len();
    Ok(size)
}

/// Read an exploded bundle directory (one containing `apiproxy/`).
pub fn read_bundle_dir(dir: &Utf8Path) -> anyhow::Result<FileTree> {
    let mut tree = FileTree::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.with_context(|| format!("walk {dir}"))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let abs = Utf8Path::from_path(entry.path())
            .with_context(|| format!("non-UTF-8 path under {dir}"))?;
        let rel = abs.strip_prefix(dir).unwrap_or(abs);
        let bytes = std::fs::read(abs).with_context(|| format!("read {abs}"))?;
        tree.insert(BundlePath::new(rel.as_str()), bytes);
    }
    Ok(tree)
}
