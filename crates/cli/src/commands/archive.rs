use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Pack every regular file under `dir` into `<dir>/[<user>-]<case_id>.zip`.
///
/// With a user, entries are nested under `<user>/`.
pub fn pack_output(dir: &Path, case_id: &str, user: Option<&str>) -> Result<PathBuf> {
    let name = match user {
        Some(user) => format!("{user}-{case_id}.zip"),
        None => format!("{case_id}.zip"),
    };
    let zip_path = dir.join(&name);

    let mut files = Vec::new();
    collect_files(dir, &mut files)?;
    files.retain(|path| path != &zip_path);
    files.sort();

    let file = File::create(&zip_path)
        .with_context(|| format!("Failed to create {}", zip_path.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &files {
        let relative = path.strip_prefix(dir).unwrap_or(path);
        let mut entry = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if let Some(user) = user {
            entry = format!("{user}/{entry}");
        }
        zip.start_file(entry, options)
            .with_context(|| format!("Failed to add {} to archive", path.display()))?;
        let mut source =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        io::copy(&mut source, &mut zip)
            .with_context(|| format!("Failed to compress {}", path.display()))?;
    }
    zip.finish().context("Failed to finish archive")?;
    Ok(zip_path)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}
