//! Standard paths used by MindMate tools

use std::path::PathBuf;

/// Standard MindMate paths
pub struct Paths {
    /// Data directory (~/.local/share/mindmate)
    pub data: PathBuf,
    /// Config directory (~/.config/mindmate)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("mindmate");

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("mindmate");

        Self { data, config }
    }

    /// Get state directory for a tool
    pub fn state(&self, tool: &str) -> PathBuf {
        self.data.join(tool)
    }

    /// Get the shared config file path
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_namespaced() {
        let paths = Paths::new();
        assert!(paths.data.ends_with("mindmate"));
        assert!(paths.config.ends_with("mindmate"));
        assert!(paths.state("breathe").ends_with("mindmate/breathe"));
        assert!(paths.config_file().ends_with("mindmate/config.json"));
    }
}
