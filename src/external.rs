use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Streams};
use crate::env::Environment;
use crate::error::ShellError;
use crate::interpreter::Factory;
use crate::session::Session;
use anyhow::Result;
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::debug;

pub(crate) use interrupt::InterruptForwarder;

/// Command that is not a builtin.
pub struct ExternalCommand {
    name: String,
    program: PathBuf,
    args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new(name: impl Into<String>, program: PathBuf, args: Vec<OsString>) -> Self {
        Self {
            name: name.into(),
            program,
            args,
        }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        session: &Session,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        let program = resolve_program(&session.env, name).ok()?;
        Some(Box::new(ExternalCommand::new(
            name,
            program,
            args.iter().map(|x| x.into()).collect(),
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(self: Box<Self>, streams: &dyn Streams, session: &mut Session) -> Result<ExitCode> {
        let env = &session.env;
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(streams.stdin()?.stdio())
            .stdout(streams.stdout()?.stdio())
            .stderr(streams.stderr()?.stdio())
            .envs(env.vars.iter())
            .current_dir(&env.current_dir)
            .spawn()
            .map_err(|e| ShellError::spawn(&self.name, e))?;
        debug!("started {} as pid {}", self.name, child.id());

        let forwarder = InterruptForwarder::install(child.id());
        let status = child.wait()?;
        let interrupted = forwarder.forwarded() || killed_by_interrupt(status);
        drop(forwarder);

        let code = exit_code(status);
        report_exit(streams, &self.name, code, interrupted)?;
        Ok(code)
    }
}

/// Report a failed foreground command, unless Ctrl-C stopped it.
fn report_exit(streams: &dyn Streams, name: &str, code: ExitCode, interrupted: bool) -> Result<()> {
    if code != 0 && !interrupted {
        writeln!(streams.stderr()?, "{}: exited with status {}", name, code)?;
    }
    Ok(())
}

/// Locate `name` using the environment's PATH and current directory.
pub fn resolve_program(env: &Environment, name: &str) -> Result<PathBuf, ShellError> {
    let search_paths = env.get_var("PATH").unwrap_or_default();
    find_command_path(OsStr::new(&search_paths), &env.current_dir, Path::new(name))
        .map(Cow::into_owned)
        .ok_or_else(|| ShellError::CommandNotFound {
            name: name.to_string(),
        })
}

/// Exit code of a finished child; signals map to `128 + signal`.
pub fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(x) => x,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

#[cfg(unix)]
fn killed_by_interrupt(status: ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    status.signal() == Some(nix::sys::signal::Signal::SIGINT as i32)
}

#[cfg(not(unix))]
fn killed_by_interrupt(_status: ExitStatus) -> bool {
    false
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it is an executable file.
/// - Relative with multiple components (e.g., `bin/sh`): joined onto `current_dir`,
///   returned if that is an executable file.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first executable match.
/// - Empty path: returns `None`.
///
/// Returns either a borrowed reference to the provided `path` or an owned `PathBuf`
/// when the result had to be built.
pub fn find_command_path<'a>(
    search_paths: &OsStr,
    current_dir: &Path,
    path: &'a Path,
) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        // Empty path -> not found
        (None, None) => None,
        // Single component -> search in PATH
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        // Multiple components -> relative to the current dir
        _ => {
            let joined = current_dir.join(path);
            find_by_path(&joined)?;
            Some(Cow::Owned(joined))
        }
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        let path = dir.join(cmd);
        if let Some(path) = find_by_path(&path) {
            return Some(path.to_owned());
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if is_executable_file(path) {
        Some(path)
    } else {
        None
    }
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}

/// Forwarding of SIGINT to the foreground child.
///
/// While a forwarder is alive, Ctrl-C reaches the running command instead of
/// terminating the shell. Dropping it restores the previous disposition.
#[cfg(unix)]
mod interrupt {
    use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
    use nix::unistd::Pid;
    use std::ffi::c_int;
    use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
    use std::sync::{Mutex, MutexGuard};
    use tracing::debug;

    /// Held by the live forwarder; there is one foreground child at a time.
    static FOREGROUND: Mutex<()> = Mutex::new(());
    static FOREGROUND_PID: AtomicI32 = AtomicI32::new(0);
    static FORWARDED: AtomicBool = AtomicBool::new(false);

    extern "C" fn forward_sigint(_signal: c_int) {
        let pid = FOREGROUND_PID.load(Ordering::SeqCst);
        if pid > 0 {
            // Set before the child can exit and wake the waiting thread.
            FORWARDED.store(true, Ordering::SeqCst);
            let _ = signal::kill(Pid::from_raw(pid), Signal::SIGINT);
        }
    }

    pub(crate) struct InterruptForwarder {
        previous: Option<SigAction>,
        _foreground: MutexGuard<'static, ()>,
    }

    impl InterruptForwarder {
        pub(crate) fn install(pid: u32) -> Self {
            let foreground = FOREGROUND
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            FOREGROUND_PID.store(pid as i32, Ordering::SeqCst);
            FORWARDED.store(false, Ordering::SeqCst);
            let action = SigAction::new(
                SigHandler::Handler(forward_sigint),
                SaFlags::SA_RESTART,
                SigSet::empty(),
            );
            // SAFETY: the handler only touches atomics and calls kill(2).
            let previous = match unsafe { signal::sigaction(Signal::SIGINT, &action) } {
                Ok(previous) => Some(previous),
                Err(e) => {
                    debug!("cannot install SIGINT forwarder: {}", e);
                    None
                }
            };
            Self {
                previous,
                _foreground: foreground,
            }
        }

        /// Whether an interrupt was passed on to the child.
        pub(crate) fn forwarded(&self) -> bool {
            FORWARDED.load(Ordering::SeqCst)
        }
    }

    impl Drop for InterruptForwarder {
        fn drop(&mut self) {
            FOREGROUND_PID.store(0, Ordering::SeqCst);
            if let Some(previous) = self.previous.take() {
                // SAFETY: restores the disposition saved by `install`.
                let _ = unsafe { signal::sigaction(Signal::SIGINT, &previous) };
            }
        }
    }
}

#[cfg(not(unix))]
mod interrupt {
    pub(crate) struct InterruptForwarder;

    impl InterruptForwarder {
        pub(crate) fn install(_pid: u32) -> Self {
            InterruptForwarder
        }

        pub(crate) fn forwarded(&self) -> bool {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_adapters::testing::Captured;
    use std::collections::HashMap;
    use std::fs;
    use std::fs::File;

    #[cfg(unix)]
    fn osstr(s: &str) -> &OsStr {
        OsStr::new(s)
    }

    fn session_in(dir: &Path) -> Session {
        Session::in_memory(Environment {
            vars: HashMap::from([("PATH".to_string(), "/usr/bin:/bin".to_string())]),
            current_dir: dir.to_path_buf(),
            home: None,
        })
    }

    #[test]
    #[cfg(unix)]
    fn absolute_existing_true() {
        let path = Path::new("/bin/sh");
        let res = find_command_path(osstr("/bin"), Path::new("/"), path);
        assert!(res.is_some(), "Expected to find /bin/sh via absolute path");
        assert_eq!(res.unwrap().as_ref(), path);
    }

    #[test]
    #[cfg(unix)]
    fn absolute_nonexisting() {
        let path = Path::new("/bin/nonexisting");
        let res = find_command_path(osstr("/bin"), Path::new("/"), path);
        assert!(res.is_none());
    }

    #[test]
    #[cfg(unix)]
    fn single_component_found_in_path() {
        let res = find_command_path(
            osstr("/nowhere:/bin"),
            Path::new("/"),
            Path::new("sh"),
        );
        let found = res.expect("Expected to find 'sh' in /bin via PATH search");
        assert!(found.as_ref().starts_with("/bin"));
        assert!(found.as_ref().ends_with("sh"));
    }

    #[test]
    #[cfg(unix)]
    fn single_component_not_found_in_path() {
        let res = find_command_path(osstr("/bin"), Path::new("/"), Path::new("nonexisting"));
        assert!(res.is_none());
    }

    #[test]
    #[cfg(unix)]
    fn non_executable_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("notes")).unwrap();
        let res = find_command_path(
            dir.path().as_os_str(),
            Path::new("/"),
            Path::new("notes"),
        );
        assert!(res.is_none());
    }

    #[test]
    #[cfg(unix)]
    fn relative_multi_component_resolves_against_session_dir() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("bin")).unwrap();
        let script = dir.path().join("bin").join("tool");
        fs::write(&script, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let session = session_in(dir.path());
        let found = resolve_program(&session.env, "bin/tool").unwrap();
        assert_eq!(found, script);
    }

    #[test]
    #[cfg(unix)]
    fn relative_multi_component_needs_an_executable() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("bin")).unwrap();
        File::create(dir.path().join("bin").join("data")).unwrap();
        let res = find_command_path(osstr("/bin"), dir.path(), Path::new("bin/data"));
        assert!(res.is_none());
        let res = find_command_path(osstr("/bin"), dir.path(), Path::new("bin/missing"));
        assert!(res.is_none());
    }

    #[test]
    fn empty_path_is_none() {
        let res = find_command_path(OsStr::new("/bin"), Path::new("/"), Path::new(""));
        assert!(res.is_none());
    }

    #[test]
    fn unknown_program_is_command_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_in(dir.path());
        let err = resolve_program(&session.env, "definitely-not-a-command-42").unwrap_err();
        assert_eq!(err.to_string(), "definitely-not-a-command-42: command not found");
    }

    #[test]
    #[cfg(unix)]
    fn runs_in_session_dir_with_session_vars() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());
        session.env.set_var("FORMALSH_GREETING", "hello");
        let cmd = ExternalCommand::new(
            "sh",
            PathBuf::from("/bin/sh"),
            vec!["-c".into(), "echo $FORMALSH_GREETING; pwd".into()],
        );
        let io = Captured::new();
        let code = Box::new(cmd).execute(&io, &mut session).unwrap();
        assert_eq!(code, 0);

        let out = io.stdout_text();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("hello"));
        let pwd = PathBuf::from(lines.next().unwrap());
        assert_eq!(
            fs::canonicalize(pwd).unwrap(),
            fs::canonicalize(dir.path()).unwrap()
        );
    }

    #[test]
    #[cfg(unix)]
    fn nonzero_exit_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());
        let cmd = ExternalCommand::new(
            "sh",
            PathBuf::from("/bin/sh"),
            vec!["-c".into(), "exit 3".into()],
        );
        let io = Captured::new();
        let code = Box::new(cmd).execute(&io, &mut session).unwrap();
        assert_eq!(code, 3);
        assert_eq!(io.stderr_text(), "sh: exited with status 3\n");
    }

    #[test]
    #[cfg(unix)]
    fn child_killed_by_sigint_is_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());
        let cmd = ExternalCommand::new(
            "sh",
            PathBuf::from("/bin/sh"),
            vec!["-c".into(), "kill -INT $$".into()],
        );
        let io = Captured::new();
        let code = Box::new(cmd).execute(&io, &mut session).unwrap();
        assert_eq!(code, 130);
        assert_eq!(io.stderr_text(), "");
    }

    #[test]
    fn interrupted_failure_is_not_reported() {
        let io = Captured::new();
        report_exit(&io, "sleep", 130, true).unwrap();
        report_exit(&io, "ok", 0, false).unwrap();
        assert_eq!(io.stderr_text(), "");
        report_exit(&io, "grep", 2, false).unwrap();
        assert_eq!(io.stderr_text(), "grep: exited with status 2\n");
    }

    #[test]
    #[cfg(unix)]
    fn ctrl_c_reaches_a_child_that_traps_it() {
        use nix::sys::signal::{self, Signal};
        use nix::unistd::Pid;
        use std::process::{Command, Stdio};
        use std::thread;
        use std::time::Duration;

        let mut child = Command::new("/bin/sh")
            .args(["-c", "trap 'exit 7' INT; sleep 2 & wait"])
            .stdin(Stdio::null())
            .spawn()
            .unwrap();
        let forwarder = InterruptForwarder::install(child.id());
        let ctrl_c = thread::spawn(|| {
            thread::sleep(Duration::from_millis(300));
            signal::kill(Pid::this(), Signal::SIGINT).unwrap();
        });
        let status = child.wait().unwrap();
        ctrl_c.join().unwrap();
        let interrupted = forwarder.forwarded() || killed_by_interrupt(status);
        drop(forwarder);

        let code = exit_code(status);
        assert_eq!(code, 7);
        assert!(interrupted);

        let io = Captured::new();
        report_exit(&io, "sh", code, interrupted).unwrap();
        assert_eq!(io.stderr_text(), "");
    }
}
