use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::display::OutputDocument;
use crate::error::{Error, Result};

/// Replace `path` with the serialized document.
///
/// The document is encoded in memory first, then written to a temp file in
/// the same directory and renamed over `path`. A failure at any step leaves
/// the previous file untouched.
pub fn write_document(path: &Path, doc: &OutputDocument) -> Result<()> {
    let json = serde_json::to_vec_pretty(doc).map_err(Error::Encode)?;

    let write_err = |source: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_err)?;

    let tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    {
        let mut out = BufWriter::new(tmp.as_file());
        out.write_all(&json).map_err(write_err)?;
        out.write_all(b"\n").map_err(write_err)?;
        out.flush().map_err(write_err)?;
    }
    // 一時ファイルは 0600 で作られるので、置き換え先の権限に合わせる
    if let Some(perms) = target_permissions(path) {
        tmp.as_file().set_permissions(perms).map_err(write_err)?;
    }
    tmp.as_file().sync_all().map_err(write_err)?;
    // rename は同一ディレクトリ内なのでアトミック
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Permissions the written file should end up with: those of the file being
/// replaced, or a world-readable default for a new file.
fn target_permissions(path: &Path) -> Option<fs::Permissions> {
    match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => default_permissions(),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

/// 書き出したファイルを読み戻す
#[cfg(test)]
pub fn read_document(path: &Path) -> std::io::Result<OutputDocument> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}
