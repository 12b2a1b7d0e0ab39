use crate::session::Session;
use anyhow::Result;
use std::io::{self, Read, Write};
use std::process::Stdio;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Abstraction over a readable input stream that can also be converted into
/// a [`Stdio`] handle for spawning external processes.
///
/// A blanket implementation exists for any type that implements `Read` and
/// `Into<Stdio>` (e.g. a `File` or a `ChildStdout`).
pub trait Stdin: Read {
    /// Convert this input into a [`Stdio`] handle suitable for `std::process::Command`.
    fn stdio(self: Box<Self>) -> Stdio;
}

impl<T: Read + Into<Stdio>> Stdin for T {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }
}

/// Abstraction over a writable output stream that can also be converted into
/// a [`Stdio`] handle for spawning external processes.
///
/// A blanket implementation exists for any type that implements `Write` and `Into<Stdio>`.
pub trait Stdout: Write {
    /// Convert this output into a [`Stdio`] handle suitable for `std::process::Command`.
    fn stdio(self: Box<Self>) -> Stdio;
}

impl<T: Write + Into<Stdio>> Stdout for T {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }
}

/// Where a command gets its standard streams from.
///
/// The interactive shell hands out the terminal's own streams; tests hand out
/// files they can read back afterwards. Each call returns a fresh handle so a
/// line with several segments can give every command its own set.
pub trait Streams {
    fn stdin(&self) -> io::Result<Box<dyn Stdin>>;
    fn stdout(&self) -> io::Result<Box<dyn Stdout>>;
    fn stderr(&self) -> io::Result<Box<dyn Stdout>>;
}

/// The three standard streams of one command invocation.
pub struct CommandIo {
    pub stdin: Box<dyn Stdin>,
    pub stdout: Box<dyn Stdout>,
    pub stderr: Box<dyn Stdout>,
}

impl CommandIo {
    /// Take a fresh set of streams from `streams`.
    pub fn open(streams: &dyn Streams) -> io::Result<Self> {
        Ok(Self {
            stdin: streams.stdin()?,
            stdout: streams.stdout()?,
            stderr: streams.stderr()?,
        })
    }
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    /// Executes the command, taking whichever standard streams it needs from `streams`.
    fn execute(self: Box<Self>, streams: &dyn Streams, session: &mut Session) -> Result<ExitCode>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
/// Implementations can use the session to resolve executables (e.g., using PATH).
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(
        &self,
        session: &Session,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>>;
}
