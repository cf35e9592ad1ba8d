use std::fs;
use std::path::PathBuf;

const DATA_DIR: &str = ".ot2net";

/// Get data directory path.
///
/// Priority:
/// 1. `OT2NET_DATA_DIR` environment variable (for container deployments)
/// 2. `~/.ot2net` (default for local usage)
pub fn get_data_dir() -> Result<PathBuf, String> {
    let data_dir = if let Ok(custom_dir) = std::env::var("OT2NET_DATA_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = dirs::home_dir().ok_or("Failed to resolve home directory")?;
        home.join(DATA_DIR)
    };

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)
            .map_err(|e| format!("Failed to create data directory: {}", e))?;
    }

    Ok(data_dir)
}
