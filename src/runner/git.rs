//! Version-control collaborator: fetch a runner template by tag.

use std::path::Path;
use std::process::Command;

/// Clone a repository at a tag/branch into `dest` — a single shallow
/// checkout, no merge or diff work. Errors carry git's stderr.
pub fn clone_by_tag(url: &str, tag: &str, dest: &Path) -> Result<(), String> {
    let output = Command::new("git")
        .args(["clone", "--depth", "1", "--branch", tag, "--single-branch"])
        .arg(url)
        .arg(dest)
        .output()
        .map_err(|e| format!("failed to run git: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("git clone failed: {}", stderr.trim()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as StdCommand;

    fn run_git(repo_dir: &Path, args: &[&str]) {
        let output = StdCommand::new("git")
            .args(args)
            .current_dir(repo_dir)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    fn make_tagged_repo(tag: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        run_git(dir.path(), &["init"]);
        run_git(dir.path(), &["config", "user.name", "test-user"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        std::fs::write(dir.path().join("runner.txt"), "template").unwrap();
        run_git(dir.path(), &["add", "."]);
        run_git(dir.path(), &["commit", "-m", "initial"]);
        run_git(dir.path(), &["tag", tag]);
        dir
    }

    #[test]
    fn test_clone_by_tag_materializes_tree() {
        let source = make_tagged_repo("v1.0");
        let dest = tempfile::tempdir().unwrap();
        let target = dest.path().join("v1.0");

        clone_by_tag(source.path().to_str().unwrap(), "v1.0", &target).unwrap();
        assert!(target.join("runner.txt").exists());
    }

    #[test]
    fn test_clone_unknown_tag_fails() {
        let source = make_tagged_repo("v1.0");
        let dest = tempfile::tempdir().unwrap();
        let target = dest.path().join("ghost");

        let err = clone_by_tag(source.path().to_str().unwrap(), "ghost", &target).unwrap_err();
        assert!(err.contains("git clone failed"));
    }
}
