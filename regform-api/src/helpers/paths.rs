use std::path::PathBuf;

/// Returns the directory desktop exports are saved to
///
/// # Platform-specific paths
///
/// - **macOS**: `~/Downloads`
/// - **Linux**: `$XDG_DOWNLOAD_DIR`, usually `~/Downloads`
/// - **Windows**: `{FOLDERID_Downloads}`
///
/// Falls back to the home directory when no downloads folder is configured.
pub fn get_downloads_dir() -> anyhow::Result<PathBuf> {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow::anyhow!("Could not determine downloads directory"))
}

/// Returns the application's private document storage (mobile shell target)
///
/// # Platform-specific paths
///
/// - **macOS**: `~/Library/Application Support/regform/documents`
/// - **Linux**: `~/.local/share/regform/documents`
/// - **Windows**: `%LOCALAPPDATA%\regform\documents`
pub fn get_app_storage_dir() -> anyhow::Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(data_dir.join("regform").join("documents"))
}
