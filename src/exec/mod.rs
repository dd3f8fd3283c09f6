//! External build-invocation collaborator.
//!
//! Runner templates ship a `taskw` wrapper script at their working-directory
//! root; running or packaging a platform means invoking it with ordered task
//! names. Subprocess output is streamed line-by-line into this process's
//! log rather than captured, since build actions can run for a long time.

use crate::core::error::PipelineError;
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{error, info};

/// Name of the task wrapper script expected at the working-directory root.
pub const TASK_WRAPPER: &str = "taskw";

/// Invoke the runner's task wrapper with the given ordered task names.
/// `env` extends (does not replace) the inherited environment. Fails when
/// the wrapper is missing or exits non-zero.
pub fn run_tasks(
    working_dir: &Path,
    env: &HashMap<String, String>,
    tasks: &[&str],
) -> Result<(), PipelineError> {
    let wrapper = working_dir.join(TASK_WRAPPER);
    if !wrapper.is_file() {
        return Err(PipelineError::Precondition(format!(
            "runner task wrapper not found at {}",
            wrapper.display()
        )));
    }

    info!("running task(s) [{}] in {}", tasks.join(", "), working_dir.display());
    let mut child = Command::new(&wrapper)
        .args(tasks)
        .current_dir(working_dir)
        .envs(env)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| PipelineError::io("cannot spawn", &wrapper, e))?;

    let stdout = child.stdout.take().expect("stdout piped");
    let stderr = child.stderr.take().expect("stderr piped");

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for line in BufReader::new(stdout).lines().map_while(Result::ok) {
                info!("{line}");
            }
        });
        scope.spawn(|| {
            for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                error!("{line}");
            }
        });
    });

    let status = child
        .wait()
        .map_err(|e| PipelineError::io("cannot wait on", &wrapper, e))?;
    if !status.success() {
        return Err(PipelineError::TaskFailed {
            tasks: tasks.join(" "),
            code: status.code().unwrap_or(-1),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn write_wrapper(dir: &Path, body: &str) {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(TASK_WRAPPER);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
    }

    #[test]
    fn test_missing_wrapper_is_precondition_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_tasks(dir.path(), &HashMap::new(), &["build"]).unwrap_err();
        assert!(matches!(err, PipelineError::Precondition(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_task() {
        let dir = tempfile::tempdir().unwrap();
        write_wrapper(dir.path(), "echo running: $@\nexit 0");
        run_tasks(dir.path(), &HashMap::new(), &["build"]).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_task_carries_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        write_wrapper(dir.path(), "exit 3");
        let err = run_tasks(dir.path(), &HashMap::new(), &["build"]).unwrap_err();
        match err {
            PipelineError::TaskFailed { tasks, code } => {
                assert_eq!(tasks, "build");
                assert_eq!(code, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_env_extends_environment() {
        let dir = tempfile::tempdir().unwrap();
        // The wrapper fails unless the injected variable is visible.
        write_wrapper(dir.path(), "[ \"$SIMFORGE_PROJECT_TITLE\" = \"T\" ] || exit 9");
        let mut env = HashMap::new();
        env.insert("SIMFORGE_PROJECT_TITLE".to_string(), "T".to_string());
        run_tasks(dir.path(), &env, &["check"]).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_tasks_passed_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write_wrapper(dir.path(), "[ \"$1 $2\" = \"install-debug run-android\" ] || exit 9");
        run_tasks(dir.path(), &HashMap::new(), &["install-debug", "run-android"]).unwrap();
    }
}
