//! External-tool orchestration: PRIME selectors, optimus-manager, vendor
//! control interfaces. The plan is pure data; this module performs the
//! effects, best-effort, one step at a time.

use serde::Serialize;
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// One declared external invocation in a profile plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalStep {
    pub tool: String,
    pub args: Vec<String>,
    pub needs_root: bool,
    pub reason: String,
}

impl ExternalStep {
    pub fn new(tool: &str, args: &[&str], reason: &str) -> Self {
        Self {
            tool: tool.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            needs_root: false,
            reason: reason.to_string(),
        }
    }

    pub fn privileged(tool: &str, args: &[&str], reason: &str) -> Self {
        Self {
            needs_root: true,
            ..Self::new(tool, args, reason)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum StepResult {
    Success,
    Skipped { reason: String },
    Failed { error: FailureKind, detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ExitCode(i32),
    Timeout,
    NoEscalation,
    Spawn,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub tool: String,
    pub reason: String,
    pub result: StepResult,
}

/// Per-step outcomes for one plan execution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionReport {
    pub steps: Vec<StepReport>,
}

impl ExecutionReport {
    pub fn failed_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.result, StepResult::Failed { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.result, StepResult::Skipped { .. }))
            .count()
    }
}

/// Captured output of one external command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Seam between planning and effects. The real implementation shells out;
/// tests script the answers.
pub trait CommandRunner {
    /// Whether `program` resolves to an executable.
    fn have(&self, program: &str) -> bool;

    /// Run `program` to completion under a wall-clock budget.
    fn run(
        &self,
        program: &str,
        args: &[String],
        env: &[(String, String)],
        timeout: Duration,
    ) -> std::io::Result<CommandOutput>;
}

/// Runs commands on the host, polling for exit and killing on expiry.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn have(&self, program: &str) -> bool {
        let Some(paths) = std::env::var_os("PATH") else {
            return false;
        };
        std::env::split_paths(&paths).any(|dir| dir.join(program).is_file())
    }

    fn run(
        &self,
        program: &str,
        args: &[String],
        env: &[(String, String)],
        timeout: Duration,
    ) -> std::io::Result<CommandOutput> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (k, v) in env {
            cmd.env(k, v);
        }

        let mut child = cmd.spawn()?;
        // Drain on threads: a tool writing more than the pipe buffer would
        // otherwise block and eat the whole step budget.
        let stdout_reader = spawn_drain(child.stdout.take());
        let stderr_reader = spawn_drain(child.stderr.take());

        let deadline = Instant::now() + timeout;
        let mut timed_out = false;

        loop {
            match child.try_wait()? {
                Some(_) => break,
                None if Instant::now() >= deadline => {
                    let _ = child.kill();
                    timed_out = true;
                    break;
                }
                None => std::thread::sleep(Duration::from_millis(50)),
            }
        }

        let status = child.wait()?;
        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();

        Ok(CommandOutput {
            exit_code: status.code(),
            stdout,
            stderr,
            timed_out,
        })
    }
}

fn spawn_drain<R: Read + Send + 'static>(pipe: Option<R>) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut buf);
        }
        buf
    })
}

const ESCALATION_TOOLS: &[&str] = &["sudo", "doas", "pkexec"];

/// Pick the host's privilege-escalation command, honouring a configured
/// override. Root needs none.
pub fn escalation_tool(runner: &dyn CommandRunner, configured: Option<&str>) -> Option<String> {
    if nix::unistd::geteuid().is_root() {
        return Some(String::new());
    }
    if let Some(tool) = configured {
        return runner.have(tool).then(|| tool.to_string());
    }
    ESCALATION_TOOLS
        .iter()
        .find(|t| runner.have(t))
        .map(|t| t.to_string())
}

/// Execute plan steps in declared order. Missing tools are Skipped, failures
/// recorded but never abort the walk: all built-in steps are best-effort.
pub fn execute_steps(
    runner: &dyn CommandRunner,
    steps: &[ExternalStep],
    env: &[(String, String)],
    timeout: Duration,
    escalation: Option<&str>,
) -> ExecutionReport {
    let mut report = ExecutionReport::default();

    for step in steps {
        let result = run_step(runner, step, env, timeout, escalation);
        report.steps.push(StepReport {
            tool: step.tool.clone(),
            reason: step.reason.clone(),
            result,
        });
    }

    report
}

fn run_step(
    runner: &dyn CommandRunner,
    step: &ExternalStep,
    env: &[(String, String)],
    timeout: Duration,
    escalation: Option<&str>,
) -> StepResult {
    if !runner.have(&step.tool) {
        return StepResult::Skipped {
            reason: format!("{} not installed", step.tool),
        };
    }

    let (program, args): (String, Vec<String>) = if step.needs_root {
        match escalation {
            // Empty string means we are already root.
            Some("") | None if nix::unistd::geteuid().is_root() => {
                (step.tool.clone(), step.args.clone())
            }
            Some(esc) if !esc.is_empty() => {
                let mut args = vec![step.tool.clone()];
                args.extend(step.args.iter().cloned());
                (esc.to_string(), args)
            }
            _ => {
                return StepResult::Failed {
                    error: FailureKind::NoEscalation,
                    detail: "no privilege escalation tool available".to_string(),
                };
            }
        }
    } else {
        (step.tool.clone(), step.args.clone())
    };

    match runner.run(&program, &args, env, timeout) {
        Ok(out) if out.timed_out => StepResult::Failed {
            error: FailureKind::Timeout,
            detail: format!("{} exceeded {}s", step.tool, timeout.as_secs()),
        },
        Ok(out) if out.success() => StepResult::Success,
        Ok(out) => StepResult::Failed {
            error: FailureKind::ExitCode(out.exit_code.unwrap_or(-1)),
            detail: out.stderr.trim().to_string(),
        },
        Err(e) => StepResult::Failed {
            error: FailureKind::Spawn,
            detail: e.to_string(),
        },
    }
}
