use std::path::{Path, PathBuf};

/// Environment variable that relocates the configuration directory.
pub const CONFIG_DIR_VAR: &str = "FORMALSH_HOME";

/// Fixed on-disk locations of the shell's persistent state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellPaths {
    config_dir: PathBuf,
}

impl ShellPaths {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// `$FORMALSH_HOME` if set, else `<home>/.config/formalshell`.
    ///
    /// `None` when neither is available; the session then keeps its state in memory.
    pub fn discover() -> Option<Self> {
        Self::from_sources(std::env::var_os(CONFIG_DIR_VAR).map(PathBuf::from), dirs::home_dir())
    }

    fn from_sources(override_dir: Option<PathBuf>, home: Option<PathBuf>) -> Option<Self> {
        match override_dir {
            Some(dir) if !dir.as_os_str().is_empty() => Some(Self::new(dir)),
            _ => home.map(|h| Self::new(h.join(".config").join("formalshell"))),
        }
    }

    pub fn directory_db(&self) -> PathBuf {
        self.config_dir.join("directory.json")
    }

    pub fn history(&self) -> PathBuf {
        self.config_dir.join("history")
    }

    /// Shell script sourced once at startup.
    pub fn rc_file(&self) -> PathBuf {
        self.config_dir.join("config")
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}
