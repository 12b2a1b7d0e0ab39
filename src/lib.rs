//! An interactive shell with frecency-ranked `cd`.
//!
//! Lines are split on `&&` into segments that run one after another (a failing
//! segment does not stop the rest). A segment containing `|` runs as a pipeline
//! of external programs; otherwise its first word picks a built-in (`cd`, `ls`,
//! `exit`) or an external program found on PATH.
//!
//! `cd` remembers every directory it enters in a [`directory_store::DirectoryStore`].
//! An argument that does not exist on disk is matched against those directories,
//! best score first, so `cd proj` can jump to `~/work/my-project`.
//!
//! The main entry point is [`Interpreter`]. The public modules [`command`] and
//! [`env`] expose traits and types for implementing your own commands and for
//! interacting with the process environment.

mod builtin;
pub mod command;
pub mod completion;
pub mod config;
pub mod directory_store;
pub mod env;
pub mod error;
mod external;
pub mod history;
mod icons;
pub mod io_adapters;
mod interpreter;
pub mod listing;
pub mod paths;
pub mod pipeline;
pub mod profile;
pub mod session;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{Interpreter, split_segments};
