use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the blog-generation API (e.g., "http://localhost:8000")
    pub base_url: Option<String>,
    /// Randomness sent with every generate request (0.0 to 1.0)
    pub randomness: Option<f64>,
    /// Stream answers as they are generated instead of waiting for the full post
    pub stream: Option<bool>,
    /// Transcript file that prompts and answers are appended to
    pub log_file: Option<String>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
///
/// # Examples
/// - Unix: `/home/user/.config/blogchat/config.toml` → `~/.config/blogchat/config.toml`
/// - Windows: paths are displayed unchanged
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
