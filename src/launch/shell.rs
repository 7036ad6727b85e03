use std::process::Command;

use crate::error::LaunchError;
use crate::models::Platform;

/// Runs one shell command to completion and reports its exit code.
pub trait ShellRunner {
    fn run_shell(&self, command: &str) -> Result<i32, LaunchError>;
}

/// Runs commands through the platform shell, blocking until it returns.
#[derive(Debug, Clone, Copy)]
pub struct SystemShell {
    platform: Platform,
}

impl SystemShell {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

impl ShellRunner for SystemShell {
    fn run_shell(&self, command: &str) -> Result<i32, LaunchError> {
        let mut cmd = match self.platform {
            Platform::Windows => {
                let mut c = Command::new("cmd");
                c.arg("/C").arg(command);
                c
            }
            Platform::Linux | Platform::Mac => {
                let mut c = Command::new("sh");
                c.arg("-c").arg(command);
                c
            }
        };

        let status = cmd.status()?;
        // No code means the shell was killed by a signal.
        Ok(status.code().unwrap_or(-1))
    }
}

/// Run `command`, logging a non-zero exit code. The code never turns into an
/// error: by the time a command runs the launch path is already decided.
pub(crate) fn run_logged(
    shell: &dyn ShellRunner,
    command: &str,
    on_failure: impl FnOnce() -> String,
) -> Result<i32, LaunchError> {
    tracing::debug!("Executing command '{}'", command);
    let exit_code = shell.run_shell(command)?;
    if exit_code != 0 {
        tracing::error!("{}", on_failure());
    }
    Ok(exit_code)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn reports_exit_codes() {
        let shell = SystemShell::new(Platform::Linux);
        assert_eq!(shell.run_shell("true").unwrap(), 0);
        assert_eq!(shell.run_shell("exit 3").unwrap(), 3);
    }

    #[test]
    fn non_zero_exit_is_not_an_error() {
        let shell = SystemShell::new(Platform::Linux);
        let code = run_logged(&shell, "exit 1", || "Failed to launch 'exit 1'!".to_string()).unwrap();
        assert_eq!(code, 1);
    }
}
