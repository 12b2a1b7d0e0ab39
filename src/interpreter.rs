use crate::command::{CommandFactory, ExitCode, Streams};
use crate::completion::ShellHelper;
use crate::config::ShellPaths;
use crate::error::ShellError;
use crate::io_adapters::Terminal;
use crate::pipeline::{Pipeline, PipelineExecutor};
use crate::session::Session;
use console::Style;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Editor, Result};
use std::io::Write;
use tracing::debug;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate: built-ins and ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// Split a line into `&&` segments, trimmed, blanks dropped.
///
/// Every segment runs regardless of how the previous one ended.
pub fn split_segments(line: &str) -> Vec<&str> {
    line.split("&&")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// The interactive shell: routes each command to a built-in, an external
/// program or a pipeline.
///
/// The interpreter owns the [`Session`] and a list of [`CommandFactory`] objects
/// that are queried in order to create commands by name. See [`Default`] for the
/// factories included out of the box.
///
/// Example
/// ```no_run
/// use formalsh::Interpreter;
/// use formalsh::io_adapters::Terminal;
/// let mut sh = Interpreter::default();
/// sh.execute_line("cd /tmp && ls | head -n 3", &Terminal);
/// ```
pub struct Interpreter {
    session: Session,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(session: Session, commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self { session, commands }
    }

    /// Interpreter with the built-ins and the external launcher, over `session`.
    pub fn with_session(session: Session) -> Self {
        use crate::builtin::{Cd, Exit, Ls};
        use crate::external::ExternalCommand;
        Self::new(
            session,
            vec![
                Box::new(Factory::<Cd>::default()),
                Box::new(Factory::<Ls>::default()),
                Box::new(Factory::<Exit>::default()),
                Box::new(Factory::<ExternalCommand>::default()),
            ],
        )
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run a single command invocation by name with arguments.
    ///
    /// Returns the command's exit code or an error if no factory recognises
    /// the name or the command fails to start.
    pub fn run(&mut self, name: &str, args: &[&str], streams: &dyn Streams) -> anyhow::Result<ExitCode> {
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(&self.session, name, args) {
                return cmd.execute(streams, &mut self.session);
            }
        }
        Err(ShellError::CommandNotFound {
            name: name.to_string(),
        }
        .into())
    }

    /// Run one `&&` segment: a pipeline if it contains `|`, a single command otherwise.
    pub fn execute_segment(&mut self, segment: &str, streams: &dyn Streams) -> anyhow::Result<ExitCode> {
        if segment.contains('|') {
            debug!("pipeline: {}", segment);
            let pipeline = Pipeline::parse(segment);
            let code = PipelineExecutor::new(&self.session.env).run(&pipeline, streams)?;
            return Ok(code.unwrap_or(0));
        }

        let mut words = segment.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(0);
        };
        let args: Vec<&str> = words.collect();
        debug!("command: {} {:?}", name, args);
        self.run(name, &args, streams)
    }

    /// Run every segment of `line` in order and return the last exit code.
    ///
    /// Unlike POSIX `&&`, a failing segment does not stop the ones after it.
    /// Errors are reported on the error stream.
    pub fn execute_line(&mut self, line: &str, streams: &dyn Streams) -> ExitCode {
        let mut last = 0;
        for segment in split_segments(line) {
            last = match self.execute_segment(segment, streams) {
                Ok(code) => code,
                Err(e) => {
                    report(streams, &e);
                    1
                }
            };
        }
        last
    }

    /// Read-eval-print loop on the terminal until end of input.
    pub fn repl(&mut self) -> Result<()> {
        let mut rl: Editor<ShellHelper, DefaultHistory> = Editor::new()?;
        rl.set_helper(Some(ShellHelper::default()));
        for entry in self.session.history.entries() {
            rl.add_history_entry(entry.as_str())?;
        }

        loop {
            if let Some(helper) = rl.helper_mut() {
                helper.current_dir = self.session.env.current_dir.clone();
                helper.history = self.session.history.entries().to_vec();
            }
            match rl.readline(&self.prompt()) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line)?;
                    self.session.history.add(line);
                    self.execute_line(line, &Terminal);
                }
                // Ctrl-C drops the line being typed.
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    println!("Shell exited.");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        Ok(())
    }

    fn prompt(&self) -> String {
        let dir = &self.session.env.current_dir;
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.to_string_lossy().into_owned());
        format!("\u{f015f}  {} > ", Style::new().blue().apply_to(name))
    }
}

impl Default for Interpreter {
    /// Interpreter over the persisted session at the default configuration
    /// location, with the built-ins `cd`, `ls`, `exit` and the external launcher.
    fn default() -> Self {
        Self::with_session(Session::load(ShellPaths::discover()))
    }
}

fn report(streams: &dyn Streams, err: &anyhow::Error) {
    match streams.stderr() {
        Ok(mut stderr) => {
            let _ = writeln!(stderr, "{:#}", err);
        }
        Err(_) => eprintln!("{:#}", err),
    }
}
