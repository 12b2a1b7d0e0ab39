use crate::config::ShellPaths;
use crate::directory_store::DirectoryStore;
use crate::env::Environment;
use crate::history::History;
use crate::profile;

/// Everything the shell remembers between commands.
///
/// Owned by the interpreter and lent to each command; nothing here is global.
#[derive(Debug)]
pub struct Session {
    pub env: Environment,
    pub directories: DirectoryStore,
    pub history: History,
}

impl Session {
    /// Session whose store and history live only in memory.
    pub fn in_memory(env: Environment) -> Self {
        Self {
            env,
            directories: DirectoryStore::in_memory(),
            history: History::in_memory(),
        }
    }

    /// Load persisted state from `paths` (if any) and source the login profile.
    pub fn load(paths: Option<ShellPaths>) -> Self {
        let mut env = Environment::new();
        profile::apply_login_environment(&mut env, paths.as_ref());
        match paths {
            Some(paths) => Self {
                env,
                directories: DirectoryStore::load(paths.directory_db()),
                history: History::load(paths.history()),
            },
            None => Self::in_memory(env),
        }
    }
}
