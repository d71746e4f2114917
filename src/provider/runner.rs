use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Command, Output};

/// Runs an external program to completion. The seam between providers and
/// `gh`/`glab`/`git`, replaced by a stub in tests.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[OsString], cwd: Option<&Path>) -> io::Result<Output>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    fn run(&self, program: &str, args: &[OsString], cwd: Option<&Path>) -> io::Result<Output> {
        let mut command = Command::new(program);
        command.args(args);
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }
        command.output()
    }
}

pub fn os_args<I, S>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    args.into_iter().map(Into::into).collect()
}
