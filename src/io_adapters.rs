use crate::command::{Stdin, Stdout, Streams};
use std::io::{self, Cursor, Read, Result as IoResult, Write};
use std::process::Stdio;
use tracing::debug;

/// The shell's own terminal streams.
///
/// Child processes inherit the descriptors directly; built-ins write through
/// the process-wide handles.
pub struct Terminal;

impl Streams for Terminal {
    fn stdin(&self) -> IoResult<Box<dyn Stdin>> {
        Ok(Box::new(InheritedStdin(io::stdin())))
    }

    fn stdout(&self) -> IoResult<Box<dyn Stdout>> {
        Ok(Box::new(InheritedStdout(io::stdout())))
    }

    fn stderr(&self) -> IoResult<Box<dyn Stdout>> {
        Ok(Box::new(InheritedStderr(io::stderr())))
    }
}

struct InheritedStdin(io::Stdin);

impl Read for InheritedStdin {
    fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        self.0.read(buf)
    }
}

impl Stdin for InheritedStdin {
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::inherit()
    }
}

struct InheritedStdout(io::Stdout);

impl Write for InheritedStdout {
    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> IoResult<()> {
        self.0.flush()
    }
}

impl Stdout for InheritedStdout {
    /// Pending output must reach the terminal before the child writes to it.
    fn stdio(mut self: Box<Self>) -> Stdio {
        if let Err(e) = self.0.flush() {
            debug!("stdout not flushed before spawn: {}", e);
        }
        Stdio::inherit()
    }
}

struct InheritedStderr(io::Stderr);

impl Write for InheritedStderr {
    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> IoResult<()> {
        self.0.flush()
    }
}

impl Stdout for InheritedStderr {
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::inherit()
    }
}

/// Memory-backed reader.
///
/// Child processes see an empty input (`Stdio::null()`); built-ins read the buffer.
pub struct MemReader {
    cursor: Cursor<Vec<u8>>,
}

impl MemReader {
    /// Create a MemReader that will read from the provided buffer.
    pub fn new(buf: Vec<u8>) -> Self {
        Self {
            cursor: Cursor::new(buf),
        }
    }
}

impl Read for MemReader {
    fn read(&mut self, out: &mut [u8]) -> IoResult<usize> {
        self.cursor.read(out)
    }
}

impl Stdin for MemReader {
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::null()
    }
}
