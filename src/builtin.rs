use crate::command::{CommandFactory, CommandIo, ExecutableCommand, ExitCode, Streams};
use crate::error::ShellError;
use crate::interpreter::Factory;
use crate::listing::Listing;
use crate::paths;
use crate::session::Session;
use anyhow::Result;
use argh::{EarlyExit, FromArgs};
use std::env;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd" or "ls".
    fn name() -> &'static str;

    /// Executes the command using provided IO streams and session state.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(
        self,
        stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        session: &mut Session,
    ) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, streams: &dyn Streams, session: &mut Session) -> Result<ExitCode> {
        let CommandIo {
            mut stdin,
            mut stdout,
            mut stderr,
        } = CommandIo::open(streams)?;
        let result = <T as BuiltinCommand>::execute(*self, &mut stdin, &mut stdout, session);
        stdout.flush()?;
        match result {
            Ok(x) => Ok(x),
            Err(e) => {
                writeln!(stderr, "{}: {:#}", T::name(), e)?;
                Ok(1)
            }
        }
    }
}

struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, streams: &dyn Streams, _session: &mut Session) -> Result<ExitCode> {
        if self.is_error {
            writeln!(streams.stderr()?, "{}", self.output)?;
            Ok(1)
        } else {
            writeln!(streams.stdout()?, "{}", self.output)?;
            Ok(0)
        }
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _session: &Session,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], args) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// Without a target, changes to the home directory. A target that does not
/// exist is looked up among previously visited directories.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute, relative, `~/...`, or part of a visited directory's name.
    pub target: Option<String>,
}

impl Cd {
    fn destination(&self, session: &Session) -> Result<PathBuf, ShellError> {
        let target = match self.target.as_deref() {
            None | Some("") => return session.env.home_dir(),
            Some(t) => session.env.expand_tilde(t)?,
        };
        let target = if session.env.current_dir.join(&target).exists() {
            target
        } else {
            let resolved = session.directories.resolve(&target.to_string_lossy());
            if resolved != target {
                debug!("cd: {} resolved to {}", target.display(), resolved.display());
            }
            resolved
        };
        Ok(paths::absolutize_from(&session.env.current_dir, &target))
    }
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        _stdout: &mut dyn Write,
        session: &mut Session,
    ) -> Result<ExitCode> {
        let new_dir = self.destination(session)?;
        change_dir(session, &new_dir)?;
        session.directories.record_visit(&new_dir);
        Ok(0)
    }
}

fn change_dir(session: &mut Session, dir: &Path) -> Result<(), ShellError> {
    env::set_current_dir(dir).map_err(|source| ShellError::ChangeDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let previous = std::mem::replace(&mut session.env.current_dir, dir.to_path_buf());
    session
        .env
        .set_var("OLDPWD", previous.to_string_lossy().into_owned());
    session.env.set_var("PWD", dir.to_string_lossy().into_owned());
    Ok(())
}

#[derive(FromArgs)]
/// List a directory as a table of names, sizes, types and permissions.
pub struct Ls {
    #[argh(positional)]
    /// directory to list; defaults to the current directory.
    pub path: Option<String>,
}

impl BuiltinCommand for Ls {
    fn name() -> &'static str {
        "ls"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        session: &mut Session,
    ) -> Result<ExitCode> {
        let target = match self.path.as_deref() {
            Some(p) => session.env.expand_tilde(p)?,
            None => PathBuf::from("."),
        };
        let dir = paths::absolutize_from(&session.env.current_dir, &target);
        let listing = Listing::read(&dir)?;
        stdout.write_all(listing.render().as_bytes())?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Exit the shell.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        _session: &mut Session,
    ) -> Result<ExitCode> {
        writeln!(stdout, "Goodbye!")?;
        stdout.flush()?;
        std::process::exit(0)
    }
}
