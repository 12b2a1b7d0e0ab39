use rustyline::Context;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::Helper;
use std::fs;
use std::path::{Path, PathBuf};

/// Line-editor helper: directory completion after `cd`, history completion otherwise.
#[derive(Debug, Default)]
pub struct ShellHelper {
    /// Directory that `cd` candidates are read from.
    pub current_dir: PathBuf,
    /// Snapshot of the session history, refreshed before every prompt.
    pub history: Vec<String>,
}

impl ShellHelper {
    /// Candidates for `line` with the cursor at `pos`.
    ///
    /// Returns the byte offset the replacement starts at and the candidates.
    pub fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let line = &line[..pos];
        if let Some(word) = line.strip_prefix("cd ") {
            let word = word.trim_start();
            let start = pos - word.len();
            return (start, subdirectories(&self.current_dir, word));
        }

        let mut matches: Vec<String> = self
            .history
            .iter()
            .filter(|cmd| !cmd.starts_with("cd ") && cmd.starts_with(line) && cmd.as_str() != line)
            .cloned()
            .collect();
        matches.sort();
        matches.dedup();
        (0, matches)
    }
}

/// Names of subdirectories of `dir` starting with `prefix`, sorted.
fn subdirectories(dir: &Path, prefix: &str) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .flatten()
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(prefix))
        .collect();
    names.sort();
    names
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, candidates) = self.candidates(line, pos);
        Ok((
            start,
            candidates
                .into_iter()
                .map(|c| Pair {
                    display: c.clone(),
                    replacement: c,
                })
                .collect(),
        ))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}
