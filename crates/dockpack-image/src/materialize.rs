//! Writing a build context to disk.
//!
//! `docker build` reads its context from a directory; `dockpack context`
//! writes the same tree as a reproducible gzip-compressed tar archive.

use std::path::Path;

use dockpack_common::error::{DockpackError, Result};
use dockpack_common::tree::FileTree;

/// Writes `tree` into `dir`, replacing whatever `dir` held before.
///
/// # Errors
///
/// Returns an error if the directory cannot be cleared or a file cannot be
/// written.
pub fn materialize(tree: &FileTree, dir: &Path) -> Result<()> {
    tracing::info!(dir = %dir.display(), files = tree.len(), "materializing build context");

    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(|e| DockpackError::io(dir, e))?;
    }
    std::fs::create_dir_all(dir).map_err(|e| DockpackError::io(dir, e))?;

    for (path, content) in tree.iter() {
        let full = dir.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DockpackError::io(parent, e))?;
        }
        std::fs::write(&full, content).map_err(|e| DockpackError::io(&full, e))?;
    }
    Ok(())
}

/// Writes `tree` as a `.tar.gz` archive and returns the archive size.
///
/// Entries are written in path order with zeroed timestamps and fixed
/// permissions, so equal trees produce byte-identical archives.
///
/// # Errors
///
/// Returns an error if the archive cannot be created or written.
pub fn write_archive(tree: &FileTree, archive_path: &Path) -> Result<u64> {
    tracing::info!(archive = %archive_path.display(), files = tree.len(), "writing context archive");

    if let Some(parent) = archive_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DockpackError::io(parent, e))?;
    }
    let file =
        std::fs::File::create(archive_path).map_err(|e| DockpackError::io(archive_path, e))?;
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (path, content) in tree.iter() {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(0);
        header.set_cksum();
        builder
            .append_data(&mut header, path, content)
            .map_err(|e| DockpackError::io(archive_path, e))?;
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| DockpackError::io(archive_path, e))?;
    let _ = encoder
        .finish()
        .map_err(|e| DockpackError::io(archive_path, e))?;

    let size = std::fs::metadata(archive_path)
        .map_err(|e| DockpackError::io(archive_path, e))?
        .len();
    tracing::debug!(archive = %archive_path.display(), size, "context archive written");
    Ok(size)
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    fn sample_tree() -> FileTree {
        let mut tree = FileTree::new();
        let _ = tree.insert("Dockerfile", "FROM scratch\n").expect("insert");
        let _ = tree
            .insert("application/app/main.py", "print('hi')\n")
            .expect("insert");
        tree
    }

    #[test]
    fn materialize_writes_every_file() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let target = dir.path().join("svc.context");
        materialize(&sample_tree(), &target).expect("materialize failed");

        let content = std::fs::read_to_string(target.join("application/app/main.py"))
            .expect("read failed");
        assert_eq!(content, "print('hi')\n");
        assert!(target.join("Dockerfile").is_file());
    }

    #[test]
    fn materialize_clears_stale_files() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let target = dir.path().join("svc.context");
        std::fs::create_dir_all(&target).expect("mkdir");
        std::fs::write(target.join("stale.txt"), "old").expect("write");

        materialize(&sample_tree(), &target).expect("materialize failed");
        assert!(!target.join("stale.txt").exists());
    }

    #[test]
    fn archive_round_trips_through_tar() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let path = dir.path().join("out/context.tar.gz");
        let size = write_archive(&sample_tree(), &path).expect("archive failed");
        assert!(size > 0);

        let file = std::fs::File::open(&path).expect("open failed");
        let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(file));
        let mut seen = Vec::new();
        for entry in archive.entries().expect("entries failed") {
            let mut entry = entry.expect("entry failed");
            let name = entry.path().expect("path").to_string_lossy().to_string();
            let mut content = String::new();
            let _ = entry.read_to_string(&mut content).expect("read failed");
            seen.push((name, content));
        }
        assert_eq!(
            seen,
            vec![
                ("Dockerfile".to_string(), "FROM scratch\n".to_string()),
                (
                    "application/app/main.py".to_string(),
                    "print('hi')\n".to_string()
                ),
            ]
        );
    }

    #[test]
    fn archive_is_reproducible() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let a = dir.path().join("a.tar.gz");
        let b = dir.path().join("b.tar.gz");
        let _ = write_archive(&sample_tree(), &a).expect("archive failed");
        let _ = write_archive(&sample_tree(), &b).expect("archive failed");
        assert_eq!(
            std::fs::read(a).expect("read a"),
            std::fs::read(b).expect("read b")
        );
    }
}
