//! Startup sourcing of login profile files.
//!
//! A `/bin/sh` child sources `/etc/profile`, `~/.zshenv` and the shell's rc
//! file, then dumps its environment. The dump is merged into the session
//! environment so that PATH matches what a login shell would see.

use crate::config::ShellPaths;
use crate::env::Environment;
use anyhow::{Context, Result, bail};
use regex::Regex;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use tracing::{debug, warn};

fn assignment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)=(.*)$").unwrap())
}

/// Build the script run by `/bin/sh`.
fn sourcing_script(rc_file: Option<&Path>) -> String {
    let mut script = String::from(
        "[ -f /etc/profile ] && . /etc/profile >/dev/null 2>&1\n\
         [ -f \"$HOME/.zshenv\" ] && . \"$HOME/.zshenv\" >/dev/null 2>&1\n",
    );
    if let Some(rc) = rc_file {
        let quoted = rc.to_string_lossy().replace('\'', r"'\''");
        script.push_str(&format!("[ -f '{quoted}' ] && . '{quoted}' >/dev/null\n"));
    }
    script.push_str("env\n");
    script
}

/// Parse `env` output into `(name, value)` pairs.
///
/// Lines that are not `NAME=value` (continuations of multi-line values) are skipped.
pub fn parse_env_dump(dump: &str) -> Vec<(String, String)> {
    dump.lines()
        .filter_map(|line| assignment_re().captures(line))
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

/// Run the profile script and return the resulting variables.
pub fn source_profiles(env: &Environment, rc_file: Option<&Path>) -> Result<Vec<(String, String)>> {
    let output = Command::new("/bin/sh")
        .arg("-c")
        .arg(sourcing_script(rc_file))
        .env_clear()
        .envs(env.vars.iter())
        .current_dir(&env.current_dir)
        .stdin(Stdio::null())
        .stderr(Stdio::inherit())
        .output()
        .context("cannot run /bin/sh")?;
    if !output.status.success() {
        bail!("profile sourcing exited with {}", output.status);
    }
    Ok(parse_env_dump(&String::from_utf8_lossy(&output.stdout)))
}

/// Merge the login environment into `env`. Failures keep the inherited environment.
pub fn apply_login_environment(env: &mut Environment, paths: Option<&ShellPaths>) {
    let rc_file = paths.map(|p| p.rc_file());
    match source_profiles(env, rc_file.as_deref()) {
        Ok(vars) => {
            debug!("profile sourcing exported {} variables", vars.len());
            for (key, value) in vars {
                env.set_var(key, value);
            }
        }
        Err(e) => warn!("keeping inherited environment: {:#}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    #[test]
    fn parses_assignments_and_skips_continuations() {
        let dump = "PATH=/usr/bin:/bin\nMULTI=first\nsecond line\n_X1=\nA=b=c\n";
        let vars = parse_env_dump(dump);
        assert_eq!(
            vars,
            vec![
                ("PATH".to_string(), "/usr/bin:/bin".to_string()),
                ("MULTI".to_string(), "first".to_string()),
                ("_X1".to_string(), String::new()),
                ("A".to_string(), "b=c".to_string()),
            ]
        );
    }

    #[test]
    fn rc_path_is_single_quoted() {
        let script = sourcing_script(Some(Path::new("/tmp/it's/config")));
        assert!(script.contains(r"'/tmp/it'\''s/config'"));
        assert!(script.ends_with("env\n"));
    }

    #[test]
    #[cfg(unix)]
    fn rc_file_exports_reach_the_environment() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ShellPaths::new(dir.path());
        fs::write(paths.rc_file(), "export FORMALSH_TEST_VAR=from-rc\n").unwrap();

        let mut env = Environment {
            vars: HashMap::from([
                ("PATH".to_string(), "/usr/bin:/bin".to_string()),
                ("HOME".to_string(), dir.path().to_string_lossy().to_string()),
            ]),
            current_dir: dir.path().to_path_buf(),
            home: Some(dir.path().to_path_buf()),
        };
        apply_login_environment(&mut env, Some(&paths));
        assert_eq!(env.vars.get("FORMALSH_TEST_VAR").map(String::as_str), Some("from-rc"));
        assert!(env.vars.contains_key("PATH"));
    }
}
