use crate::cli::LintArgs;
use color_eyre::eyre::{bail, Result};
use duct::cmd;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Functional Core
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Fmt,
    Clippy,
    Test,
    Machete,
}

const PIPELINE: &[Step] = &[Step::Fmt, Step::Clippy, Step::Test, Step::Machete];

impl Step {
    fn skipped(self, args: &LintArgs) -> bool {
        match self {
            Step::Fmt => args.no_fmt,
            Step::Clippy => args.no_clippy,
            Step::Test => args.no_test,
            Step::Machete => args.no_machete,
        }
    }

    /// `cargo` arguments for this step.
    fn cargo_args(self, fix: bool) -> Vec<&'static str> {
        match (self, fix) {
            (Step::Fmt, false) => vec!["fmt", "--all", "--check"],
            (Step::Fmt, true) => vec!["fmt", "--all"],
            (Step::Clippy, false) => vec!["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
            (Step::Clippy, true) => vec![
                "clippy",
                "--workspace",
                "--all-targets",
                "--fix",
                "--allow-dirty",
                "--",
                "-D",
                "warnings",
            ],
            (Step::Test, _) => vec!["test", "--workspace"],
            (Step::Machete, _) => vec!["machete"],
        }
    }

    /// Steps whose tool may not be installed are skipped rather than failed.
    fn optional(self) -> bool {
        matches!(self, Step::Machete)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Passed,
    Failed,
    Missing,
}

fn tool_missing(output: &str) -> bool {
    let lower = output.to_lowercase();
    lower.contains("no such command") || lower.contains("unrecognized subcommand")
}

fn outcome(step: Step, success: bool, output: &str) -> Outcome {
    match success {
        true => Outcome::Passed,
        false if step.optional() && tool_missing(output) => Outcome::Missing,
        false => Outcome::Failed,
    }
}

fn log_entry(label: &str, output: &str) -> String {
    format!("=== {label} ===\n{output}\n")
}

// ---------------------------------------------------------------------------
// Imperative Shell
// ---------------------------------------------------------------------------

pub fn run(args: &LintArgs) -> Result<()> {
    let log_path = log_path()?;
    let mut log = fs::File::create(&log_path)?;

    for step in PIPELINE.iter().copied().filter(|s| !s.skipped(args)) {
        let cargo_args = step.cargo_args(args.fix);
        let label = format!("cargo {}", cargo_args.join(" "));
        println!("{label}");

        let output = cmd("cargo", &cargo_args)
            .stderr_to_stdout()
            .stdout_capture()
            .unchecked()
            .run()?;
        let text = String::from_utf8_lossy(&output.stdout);
        write!(log, "{}", log_entry(&label, &text))?;

        match outcome(step, output.status.success(), &text) {
            Outcome::Passed if args.verbose => print!("{text}"),
            Outcome::Passed => {}
            Outcome::Missing => println!("  skipped, not installed"),
            Outcome::Failed => {
                print!("{text}");
                bail!("{label} failed (log: {})", log_path.display());
            }
        }
    }

    println!("log: {}", log_path.display());
    Ok(())
}

fn log_path() -> Result<PathBuf> {
    let target_dir = std::env::current_dir()?.join("target");
    fs::create_dir_all(&target_dir)?;
    Ok(target_dir.join("xtask-lint.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_flags_map_to_steps() {
        let args = LintArgs {
            no_clippy: true,
            no_machete: true,
            ..LintArgs::default()
        };

        let remaining: Vec<Step> = PIPELINE.iter().copied().filter(|s| !s.skipped(&args)).collect();
        assert_eq!(remaining, vec![Step::Fmt, Step::Test]);
    }

    #[test]
    fn test_fix_mode_args() {
        assert_eq!(Step::Fmt.cargo_args(true), vec!["fmt", "--all"]);
        assert!(Step::Fmt.cargo_args(false).contains(&"--check"));
        assert!(Step::Clippy.cargo_args(true).contains(&"--fix"));
        assert_eq!(Step::Test.cargo_args(true), Step::Test.cargo_args(false));
    }

    #[test]
    fn test_missing_optional_tool_is_not_a_failure() {
        assert_eq!(
            outcome(Step::Machete, false, "error: no such command: `machete`"),
            Outcome::Missing
        );
        assert_eq!(
            outcome(Step::Clippy, false, "error: no such command: `clippy`"),
            Outcome::Failed
        );
        assert_eq!(outcome(Step::Machete, false, "unused dependency: log"), Outcome::Failed);
        assert_eq!(outcome(Step::Test, true, ""), Outcome::Passed);
    }

    #[test]
    fn test_log_entry() {
        assert_eq!(log_entry("cargo fmt", "ok"), "=== cargo fmt ===\nok\n");
    }
}
