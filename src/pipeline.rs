//! `cmd1 | cmd2 | ...` execution.
//!
//! Every stage is an external program. Stage `i` reads the previous stage's
//! stdout through an OS pipe; the first stage reads the shell's stdin and the
//! last one writes to the shell's stdout. All stages share the shell's stderr.

use crate::command::{ExitCode, Streams};
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::{InterruptForwarder, exit_code, resolve_program};
use anyhow::Result;
use std::process::{Child, Command, Stdio};
use tracing::debug;

/// One program invocation within a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStage {
    pub program: String,
    pub args: Vec<String>,
}

impl PipelineStage {
    /// Split a stage on whitespace. `None` for a blank stage.
    pub fn parse(text: &str) -> Option<Self> {
        let mut words = text.split_whitespace();
        let program = words.next()?.to_string();
        Some(Self {
            program,
            args: words.map(str::to_string).collect(),
        })
    }
}

/// Ordered stages of a `|`-delimited command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pipeline {
    stages: Vec<PipelineStage>,
}

impl Pipeline {
    /// Split `input` on `|`. Empty stages (`a || b`, a trailing `|`) are dropped.
    pub fn parse(input: &str) -> Self {
        Self {
            stages: input.split('|').filter_map(PipelineStage::parse).collect(),
        }
    }

    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Runs a [`Pipeline`] as a chain of child processes.
pub struct PipelineExecutor<'a> {
    env: &'a Environment,
}

impl<'a> PipelineExecutor<'a> {
    pub fn new(env: &'a Environment) -> Self {
        Self { env }
    }

    /// Start every stage and wait for the last one.
    ///
    /// Returns the final stage's exit code, or `None` for an empty pipeline.
    /// If a stage cannot be started the error is returned and stages already
    /// running are left alone. Upstream exit statuses are never inspected.
    pub fn run(&self, pipeline: &Pipeline, streams: &dyn Streams) -> Result<Option<ExitCode>> {
        let Some(last_index) = pipeline.stages().len().checked_sub(1) else {
            return Ok(None);
        };

        let mut upstream: Vec<Child> = Vec::new();
        let mut previous_stdout = None;
        for (i, stage) in pipeline.stages().iter().enumerate() {
            let stdin = match previous_stdout.take() {
                Some(pipe) => Stdio::from(pipe),
                None => streams.stdin()?.stdio(),
            };
            let stdout = if i == last_index {
                streams.stdout()?.stdio()
            } else {
                Stdio::piped()
            };

            let mut child = self.spawn(stage, stdin, stdout, streams)?;
            debug!("pipeline stage {} ({}) is pid {}", i, stage.program, child.id());

            if i == last_index {
                let forwarder = InterruptForwarder::install(child.id());
                let status = child.wait()?;
                drop(forwarder);
                // Reap upstream stages that are already gone; their status is ignored.
                for mut done in upstream {
                    let _ = done.try_wait();
                }
                return Ok(Some(exit_code(status)));
            }

            previous_stdout = child.stdout.take();
            upstream.push(child);
        }
        unreachable!("the last stage returns from the loop")
    }

    fn spawn(
        &self,
        stage: &PipelineStage,
        stdin: Stdio,
        stdout: Stdio,
        streams: &dyn Streams,
    ) -> Result<Child> {
        let program = resolve_program(self.env, &stage.program)?;
        let child = Command::new(program)
            .args(&stage.args)
            .stdin(stdin)
            .stdout(stdout)
            .stderr(streams.stderr()?.stdio())
            .envs(self.env.vars.iter())
            .current_dir(&self.env.current_dir)
            .spawn()
            .map_err(|e| ShellError::spawn(&stage.program, e))?;
        Ok(child)
    }
}
