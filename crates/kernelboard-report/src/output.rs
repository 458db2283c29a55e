//! Writing export files without leaving partial documents behind.

use crate::error::ExportError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Write `path` through a sibling temporary file that is renamed into place
/// once `write` succeeds. On failure the temporary file is removed.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<(), ExportError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), ExportError>,
{
    let tmp = temp_path(path);
    let result = File::create(&tmp)
        .map_err(ExportError::from)
        .and_then(|file| {
            let mut out = BufWriter::new(file);
            write(&mut out)?;
            out.flush()?;
            Ok(())
        })
        .and_then(|()| std::fs::rename(&tmp, path).map_err(ExportError::from));

    if let Err(e) = &result {
        log::warn!("export to {} failed: {e}", path.display());
        let _ = std::fs::remove_file(&tmp);
    } else {
        log::info!("wrote {}", path.display());
    }
    result
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "export".into(), |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}
