use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::debug;

/// Command history persisted one line per entry.
///
/// Each command is kept once; entering it again moves it to the end.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<String>,
    file: Option<PathBuf>,
}

impl History {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Read the history file. A missing or unreadable file gives an empty history.
    pub fn load(file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        let mut history = Self {
            entries: Vec::new(),
            file: None,
        };
        match fs::read_to_string(&file) {
            Ok(data) => {
                for line in data.lines() {
                    history.push(line);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => debug!("cannot read history {}: {}", file.display(), e),
        }
        history.file = Some(file);
        history
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Add a command and rewrite the history file. Blank input is ignored.
    pub fn add(&mut self, line: &str) {
        if self.push(line) {
            if let Err(e) = self.save() {
                debug!("history not saved: {}", e);
            }
        }
    }

    fn push(&mut self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return false;
        }
        self.entries.retain(|existing| existing != line);
        self.entries.push(line.to_string());
        true
    }

    pub fn save(&self) -> io::Result<()> {
        let Some(file) = &self.file else {
            return Ok(());
        };
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut data = self.entries.join("\n");
        data.push('\n');
        fs::write(file, data)
    }
}
