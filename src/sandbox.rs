//! Sandboxed program runner.
//!
//! Runs submitted source text as a fresh interpreter process and captures its
//! combined output. The contract, regardless of what the program does:
//!
//! - a private scratch directory holding the single source file, created per
//!   run and removed afterwards; it is also the working directory, `HOME` and
//!   `TMPDIR`;
//! - a cleared environment with a fixed minimal `PATH`;
//! - process-level confinement (process group, resource limits, private
//!   network namespace, filesystem access limited to the scratch directory and
//!   read-only system paths; see `sandbox/confine.rs`);
//! - a hard wall-clock timeout enforced by killing the whole process group,
//!   which no descendant can leave, never by anything cooperative inside the
//!   program;
//! - bounded output (see `sandbox/capture.rs`).
//!
//! ```text
//! source ──▶ scratch dir ──▶ spawn (confined) ──┬─ poll try_wait until deadline
//!                                              │     └─ deadline hit: killpg(SIGKILL)
//!            stdout/stderr readers (threads) ──┴─ collect with grace period
//!                                                    │
//!                                                    ▼
//!                                            ExecutionResult
//! ```
//!
//! Program faults (syntax errors, non-zero exit, signals, timeouts) are
//! results. Only failures to set the run up are [`RunnerError`]s, and that
//! includes a kernel refusing a requested isolation layer.

#[path = "sandbox/capture.rs"]
mod capture;
#[cfg(unix)]
#[path = "sandbox/confine.rs"]
mod confine;

use crate::RunnerError;
use capture::{Stream, collect, spawn_reader};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// `PATH` inside the sandbox.
const SANDBOX_PATH: &str = "/usr/local/bin:/usr/bin:/bin";

/// How often the child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long output readers may lag behind the child's exit.
const READER_GRACE: Duration = Duration::from_millis(500);

/// Runner settings. Every run uses the same settings; nothing else carries
/// over between runs.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Interpreter executable; a bare name is looked up in the sandbox `PATH`.
    pub interpreter: PathBuf,
    /// Arguments placed before the source file path.
    pub interpreter_args: Vec<String>,
    /// Name of the source file inside the scratch directory.
    pub file_name: String,
    /// Wall-clock limit for one run.
    pub timeout: Duration,
    /// Bytes kept per output stream.
    pub max_output_bytes: usize,
    /// Address-space limit for the program.
    pub memory_limit_bytes: u64,
    /// Process-count limit (`RLIMIT_NPROC`) for the program's user.
    pub max_processes: u64,
    /// Largest file the program may write.
    pub max_file_bytes: u64,
    /// Run in a private network namespace with only a loopback interface.
    /// The run fails if the kernel refuses it.
    pub isolate_network: bool,
    /// Confine filesystem access with Landlock to the scratch directory
    /// (read/write) and the system paths (read/execute). The run fails if the
    /// kernel does not enforce it.
    pub isolate_filesystem: bool,
    /// Extra paths the program may read when the filesystem is isolated.
    pub readable_paths: Vec<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            interpreter: PathBuf::from("python3"),
            // isolated mode: ignore PYTHON* variables and the user site directory
            interpreter_args: vec!["-I".to_string()],
            file_name: "main.py".to_string(),
            timeout: Duration::from_secs(2),
            max_output_bytes: 64 * 1024,
            memory_limit_bytes: 512 * 1024 * 1024,
            max_processes: 64,
            max_file_bytes: 1024 * 1024,
            isolate_network: true,
            isolate_filesystem: true,
            readable_paths: Vec::new(),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The program exited on its own with this status code.
    Exited(i32),
    /// The program was killed by this signal (not by the runner's timeout).
    Signaled(i32),
    /// The runner killed the program after this wall-clock limit.
    TimedOut { after: Duration },
}

/// Output and outcome of one run.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Standard output followed by standard error.
    pub output: String,
    pub termination: Termination,
    /// Either stream produced more than `max_output_bytes`.
    pub truncated: bool,
    pub elapsed: Duration,
}

impl ExecutionResult {
    pub fn timed_out(&self) -> bool {
        matches!(self.termination, Termination::TimedOut { .. })
    }

    /// Non-zero exit or death by signal.
    pub fn crashed(&self) -> bool {
        matches!(self.termination, Termination::Exited(code) if code != 0)
            || matches!(self.termination, Termination::Signaled(_))
    }

    /// User-facing text: the captured output, followed by a note when output
    /// was cut short or the run timed out.
    pub fn render(&self) -> String {
        let mut text = self.output.clone();
        if self.truncated {
            push_line(&mut text, "[output truncated]");
        }
        if let Termination::TimedOut { after } = self.termination {
            push_line(&mut text, &format!("error executing: timed out after {after:?}"));
        }
        text
    }
}

fn push_line(text: &mut String, line: &str) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(line);
}

/// Executes programs under a fixed [`RunnerConfig`].
#[derive(Debug, Clone, Default)]
pub struct ProgramRunner {
    config: RunnerConfig,
}

impl ProgramRunner {
    pub fn new(config: RunnerConfig) -> Self {
        ProgramRunner { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run `source` to completion or until the timeout.
    pub fn run(&self, source: &str) -> Result<ExecutionResult, RunnerError> {
        let config = &self.config;
        let scratch = tempfile::Builder::new().prefix("parley-run-").tempdir().map_err(RunnerError::Scratch)?;
        let script = scratch.path().join(&config.file_name);
        std::fs::write(&script, source).map_err(RunnerError::WriteSource)?;

        let mut command = Command::new(&config.interpreter);
        command
            .args(&config.interpreter_args)
            .arg(&script)
            .current_dir(scratch.path())
            .env_clear()
            .env("PATH", SANDBOX_PATH)
            .env("HOME", scratch.path())
            .env("TMPDIR", scratch.path())
            .env("LANG", "C.UTF-8")
            .env("PYTHONDONTWRITEBYTECODE", "1")
            .env("PYTHONUNBUFFERED", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        confine::confine(&mut command, config, scratch.path()).map_err(RunnerError::Confine)?;
        #[cfg(not(unix))]
        if config.isolate_network || config.isolate_filesystem {
            return Err(RunnerError::Confine(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "network and filesystem isolation need Linux",
            )));
        }

        info!(
            target: "parley::sandbox",
            interpreter = %config.interpreter.display(),
            timeout = ?config.timeout,
            network = config.isolate_network,
            filesystem = config.isolate_filesystem,
            bytes = source.len(),
            "spawning sandboxed program"
        );

        let start = Instant::now();
        let mut child = command.spawn().map_err(|source| RunnerError::Spawn {
            interpreter: config.interpreter.display().to_string(),
            source,
        })?;
        let pid = child.id();

        let (tx, rx) = mpsc::channel();
        spawn_reader(child.stdout.take(), Stream::Stdout, config.max_output_bytes, tx.clone());
        spawn_reader(child.stderr.take(), Stream::Stderr, config.max_output_bytes, tx);

        let termination = wait_with_deadline(&mut child, start + config.timeout, config.timeout);

        // Anything the program left running in its group goes too; the
        // seccomp filter keeps every descendant in that group.
        #[cfg(unix)]
        confine::kill_group(pid);

        let termination = termination?;
        let (stdout, stderr) = collect(rx, READER_GRACE);
        let elapsed = start.elapsed();

        let truncated = stdout.truncated || stderr.truncated;
        let mut output = String::from_utf8_lossy(&stdout.bytes).into_owned();
        output.push_str(&String::from_utf8_lossy(&stderr.bytes));

        match termination {
            Termination::TimedOut { .. } => {
                warn!(target: "parley::sandbox", pid, ?elapsed, "sandboxed program timed out; process group killed")
            }
            _ => debug!(target: "parley::sandbox", pid, ?termination, ?elapsed, "sandboxed program finished"),
        }
        if truncated {
            debug!(target: "parley::sandbox", pid, limit = config.max_output_bytes, "output truncated");
        }

        Ok(ExecutionResult { output, termination, truncated, elapsed })
    }
}

/// Poll `child` until it exits or `deadline` passes; on the deadline, kill it
/// and reap it.
fn wait_with_deadline(child: &mut Child, deadline: Instant, timeout: Duration) -> Result<Termination, RunnerError> {
    loop {
        if let Some(status) = child.try_wait().map_err(RunnerError::Wait)? {
            return Ok(termination_of(status));
        }
        if Instant::now() >= deadline {
            #[cfg(unix)]
            confine::kill_group(child.id());
            let _ = child.kill();
            child.wait().map_err(RunnerError::Wait)?;
            return Ok(Termination::TimedOut { after: timeout });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn termination_of(status: ExitStatus) -> Termination {
    if let Some(code) = status.code() {
        return Termination::Exited(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Termination::Signaled(signal);
        }
    }
    Termination::Exited(-1)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::Path;

    /// `/bin/sh` with the kernel isolation layers off, so these tests run on
    /// hosts without user namespaces or Landlock.
    fn sh_config(timeout: Duration) -> RunnerConfig {
        RunnerConfig {
            interpreter: PathBuf::from("/bin/sh"),
            interpreter_args: Vec::new(),
            file_name: "main.sh".to_string(),
            timeout,
            isolate_network: false,
            isolate_filesystem: false,
            ..RunnerConfig::default()
        }
    }

    fn sh_runner(timeout: Duration) -> ProgramRunner {
        ProgramRunner::new(sh_config(timeout))
    }

    /// `None` when this host refuses a layer `config` asks for.
    fn isolated_runner(config: RunnerConfig) -> Option<ProgramRunner> {
        let runner = ProgramRunner::new(config);
        match runner.run("exit 0\n") {
            Ok(_) => Some(runner),
            Err(err @ (RunnerError::Spawn { .. } | RunnerError::Confine(_))) => {
                eprintln!("skipping: isolation unavailable on this host: {err}");
                None
            }
            Err(err) => panic!("unexpected runner error: {err}"),
        }
    }

    fn setsid_available() -> bool {
        ["/usr/bin/setsid", "/bin/setsid"].iter().any(|p| Path::new(p).exists())
    }

    #[test]
    fn captures_stdout_then_stderr() {
        let res = sh_runner(Duration::from_secs(5)).run("echo out\necho err 1>&2\n").unwrap();
        assert_eq!(res.output, "out\nerr\n");
        assert_eq!(res.termination, Termination::Exited(0));
        assert!(!res.crashed() && !res.timed_out());
    }

    #[test]
    fn non_zero_exit_is_a_crash_not_an_error() {
        let res = sh_runner(Duration::from_secs(5)).run("echo failing 1>&2\nexit 3\n").unwrap();
        assert_eq!(res.termination, Termination::Exited(3));
        assert!(res.crashed());
        assert_eq!(res.render(), "failing\n");
    }

    #[test]
    fn infinite_loop_is_killed_at_the_timeout() {
        let timeout = Duration::from_millis(300);
        let res = sh_runner(timeout).run("while :; do :; done\n").unwrap();
        assert!(res.timed_out());
        assert_eq!(res.termination, Termination::TimedOut { after: timeout });
        assert!(res.elapsed < Duration::from_secs(3), "took {:?}", res.elapsed);
        assert!(res.render().ends_with("error executing: timed out after 300ms"));
    }

    #[test]
    fn large_output_is_truncated_without_hanging() {
        let runner = ProgramRunner::new(RunnerConfig { max_output_bytes: 16, ..sh_config(Duration::from_secs(5)) });
        let res = runner.run("i=0\nwhile [ $i -lt 2000 ]; do echo 0123456789; i=$((i+1)); done\n").unwrap();
        assert_eq!(res.termination, Termination::Exited(0));
        assert!(res.truncated);
        assert_eq!(res.output.len(), 16);
        assert!(res.render().ends_with("[output truncated]"));
    }

    #[test]
    fn runs_in_a_private_scratch_directory_with_a_clean_environment() {
        let runner = sh_runner(Duration::from_secs(5));
        let res = runner.run("pwd\necho *\necho \"${PARLEY_SECRET:-unset}\"\n").unwrap();
        let lines: Vec<&str> = res.output.lines().collect();
        assert!(lines[0].contains("parley-run-"), "cwd was {}", lines[0]);
        assert_eq!(lines[1], "main.sh");
        assert_eq!(lines[2], "unset");

        let again = runner.run("pwd\n").unwrap();
        assert_ne!(again.output.trim(), lines[0]);
        assert!(!Path::new(lines[0]).exists());
    }

    #[test]
    fn missing_interpreter_is_an_infrastructure_error() {
        let runner = ProgramRunner::new(RunnerConfig {
            interpreter: PathBuf::from("/nonexistent/interpreter"),
            ..sh_config(Duration::from_secs(5))
        });
        let err = runner.run("print(1)").unwrap_err();
        assert!(matches!(err, RunnerError::Spawn { .. }));
        assert!(err.to_string().starts_with("failed to spawn '/nonexistent/interpreter'"));
    }

    #[test]
    fn isolation_is_on_by_default() {
        let config = RunnerConfig::default();
        assert!(config.isolate_network);
        assert!(config.isolate_filesystem);
        assert!(config.readable_paths.is_empty());
    }

    #[test]
    fn filesystem_access_is_limited_to_the_scratch_directory() {
        let config = RunnerConfig { isolate_filesystem: true, ..sh_config(Duration::from_secs(5)) };
        let Some(runner) = isolated_runner(config) else {
            return;
        };
        let outside = std::env::temp_dir().join(format!("parley-outside-{}", std::process::id()));
        let _ = std::fs::remove_file(&outside);

        let program = format!(
            "echo escaped > '{}'\necho kept > inside.txt && cat inside.txt\nread -r line < /etc/passwd && echo read passwd\n",
            outside.display()
        );
        let res = runner.run(&program).unwrap();
        assert!(!outside.exists(), "program wrote {}", outside.display());
        assert!(res.output.starts_with("kept\n"), "{}", res.output);
        assert!(!res.output.contains("read passwd"), "{}", res.output);
    }

    #[test]
    fn network_namespace_has_only_loopback() {
        let config = RunnerConfig { isolate_network: true, ..sh_config(Duration::from_secs(5)) };
        let Some(runner) = isolated_runner(config) else {
            return;
        };
        let res = runner.run("while read -r line; do echo \"$line\"; done < /proc/self/net/dev\n").unwrap();
        let interfaces: Vec<&str> =
            res.output.lines().skip(2).filter_map(|line| line.split(':').next()).map(str::trim).collect();
        assert_eq!(interfaces, vec!["lo"], "{}", res.output);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn setsid_is_refused() {
        if !setsid_available() {
            eprintln!("skipping: no setsid binary");
            return;
        }
        let res = sh_runner(Duration::from_secs(5)).run("setsid true 2>/dev/null && echo detached || echo refused\n").unwrap();
        assert_eq!(res.output, "refused\n");
    }

    #[test]
    fn descendants_do_not_outlive_a_timed_out_run() {
        let markers = tempfile::tempdir().unwrap();
        let detached = markers.path().join("detached");
        let background = markers.path().join("background");
        let program = format!(
            "setsid sh -c 'sleep 1; echo late > \"{}\"' &\nsh -c 'sleep 1; echo late > \"{}\"' &\nsleep 10\n",
            detached.display(),
            background.display()
        );

        let res = sh_runner(Duration::from_millis(300)).run(&program).unwrap();
        assert!(res.timed_out());
        assert!(res.elapsed < Duration::from_secs(3), "took {:?}", res.elapsed);

        thread::sleep(Duration::from_secs(2));
        assert!(!background.exists(), "a background descendant survived the timeout");
        if cfg!(target_os = "linux") {
            assert!(!detached.exists(), "a setsid descendant survived the timeout");
        }
    }

    #[test]
    fn background_children_die_when_the_program_exits() {
        let markers = tempfile::tempdir().unwrap();
        let marker = markers.path().join("late");
        let program = format!("sh -c 'sleep 1; echo late > \"{}\"' &\nexit 0\n", marker.display());

        let res = sh_runner(Duration::from_secs(5)).run(&program).unwrap();
        assert_eq!(res.termination, Termination::Exited(0));

        thread::sleep(Duration::from_secs(2));
        assert!(!marker.exists(), "a background child survived the program's exit");
    }
}
