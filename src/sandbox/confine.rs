//! Process-level confinement for sandboxed programs (Unix).
//!
//! Applied in the forked child before `exec`, in this order:
//!
//! - a fresh process group, so the whole tree can be killed with one signal;
//! - a private network namespace (Linux, `isolate_network`);
//! - resource limits on CPU seconds, address space, process count, file size
//!   and core dumps;
//! - a Landlock ruleset (Linux, `isolate_filesystem`): read and execute on the
//!   system paths an interpreter needs, read and write beneath the scratch
//!   directory, nothing else;
//! - a seccomp filter (Linux) that refuses `setsid` and `setpgid`, so no
//!   descendant can leave the group the timeout kills.
//!
//! Every requested layer is required. If the kernel refuses one, the hook
//! fails and the spawn fails with it; a program never runs half-confined.
//!
//! Code inside `pre_exec` runs between `fork` and `exec` and must not
//! allocate or take locks. The ruleset and the filter are built in the parent
//! and moved into the hook.

use super::RunnerConfig;
use std::io;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::Command;

#[cfg(all(target_os = "linux", target_env = "gnu"))]
type Resource = libc::__rlimit_resource_t;
#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
type Resource = libc::c_int;

#[derive(Debug, Clone, Copy)]
struct Limits {
    cpu_seconds: u64,
    address_space: u64,
    processes: u64,
    file_size: u64,
}

impl Limits {
    fn from_config(config: &RunnerConfig) -> Self {
        // CPU time is a backstop behind the wall-clock timeout.
        let cpu_seconds = config.timeout.as_secs() + 2;
        Limits {
            cpu_seconds,
            address_space: config.memory_limit_bytes,
            processes: config.max_processes,
            file_size: config.max_file_bytes,
        }
    }

    fn apply(self) -> io::Result<()> {
        lower_limit(libc::RLIMIT_CPU, self.cpu_seconds)?;
        lower_limit(libc::RLIMIT_AS, self.address_space)?;
        lower_limit(libc::RLIMIT_NPROC, self.processes)?;
        lower_limit(libc::RLIMIT_FSIZE, self.file_size)?;
        lower_limit(libc::RLIMIT_CORE, 0)?;
        Ok(())
    }
}

/// Set both soft and hard limit to `value`, clamped to the current hard
/// limit so an already-stricter parent limit is kept.
fn lower_limit(resource: Resource, value: u64) -> io::Result<()> {
    let mut current = libc::rlimit { rlim_cur: 0, rlim_max: 0 };
    // SAFETY: `current` is a valid, writable rlimit.
    if unsafe { libc::getrlimit(resource, &mut current) } != 0 {
        return Err(io::Error::last_os_error());
    }
    let value = (value as libc::rlim_t).min(current.rlim_max);
    let limit = libc::rlimit { rlim_cur: value, rlim_max: value };
    // SAFETY: `limit` is a valid rlimit for the duration of the call.
    if unsafe { libc::setrlimit(resource, &limit) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Configure `command` to start confined according to `config`, with
/// `scratch` as the only writable directory.
///
/// Errors here come from building the confinement in the parent; a layer the
/// kernel refuses in the child surfaces later as a spawn error.
#[cfg(target_os = "linux")]
pub(crate) fn confine(command: &mut Command, config: &RunnerConfig, scratch: &Path) -> io::Result<()> {
    command.process_group(0);

    let limits = Limits::from_config(config);
    let isolate_network = config.isolate_network;
    let mut filesystem =
        if config.isolate_filesystem { Some(linux::filesystem_ruleset(config, scratch)?) } else { None };
    let group_filter = linux::GroupFilter::for_target();
    if group_filter.is_none() {
        tracing::warn!(
            target: "parley::sandbox",
            arch = std::env::consts::ARCH,
            "no seccomp filter for this architecture; descendants may leave the process group"
        );
    }

    // SAFETY: the hook only issues syscalls (unshare, getrlimit, setrlimit,
    // landlock, prctl) on values built before the fork and moved in.
    unsafe {
        command.pre_exec(move || {
            if isolate_network {
                linux::enter_private_network()?;
            }
            limits.apply()?;
            if let Some(ruleset) = filesystem.take() {
                linux::restrict_filesystem(ruleset)?;
            }
            if let Some(filter) = group_filter {
                filter.install()?;
            }
            Ok(())
        });
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn confine(command: &mut Command, config: &RunnerConfig, _scratch: &Path) -> io::Result<()> {
    if config.isolate_network || config.isolate_filesystem {
        return Err(io::Error::new(io::ErrorKind::Unsupported, "network and filesystem isolation need Linux"));
    }
    command.process_group(0);

    let limits = Limits::from_config(config);
    // SAFETY: the hook only issues getrlimit/setrlimit on a captured copy.
    unsafe {
        command.pre_exec(move || limits.apply());
    }
    Ok(())
}

/// SIGKILL every process in the group led by `pid`. Missing groups are fine.
pub(crate) fn kill_group(pid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // SAFETY: plain syscall; ESRCH (group already gone) is ignored.
    unsafe {
        libc::killpg(pgid, libc::SIGKILL);
    }
}

#[cfg(target_os = "linux")]
mod linux {
    use super::RunnerConfig;
    use landlock::{
        ABI, Access, AccessFs, Ruleset, RulesetAttr, RulesetCreated, RulesetCreatedAttr, RulesetStatus,
        path_beneath_rules,
    };
    use std::io;
    use std::path::{Path, PathBuf};

    const LANDLOCK_ABI: ABI = ABI::V3;

    /// Readable and executable in every run; missing entries are skipped.
    const SYSTEM_PATHS: &[&str] = &[
        "/usr",
        "/lib",
        "/lib32",
        "/lib64",
        "/bin",
        "/sbin",
        "/etc/ld.so.cache",
        "/etc/localtime",
        "/dev/urandom",
    ];

    /// Device nodes the program may also write.
    const DEVICES: &[&str] = &["/dev/null", "/dev/zero"];

    pub(super) fn enter_private_network() -> io::Result<()> {
        // SAFETY: unshare only affects the calling (single-threaded, pre-exec) child.
        let entered = unsafe {
            libc::unshare(libc::CLONE_NEWUSER | libc::CLONE_NEWNET) == 0 || libc::unshare(libc::CLONE_NEWNET) == 0
        };
        if entered { Ok(()) } else { Err(io::Error::last_os_error()) }
    }

    /// Build, in the parent, the ruleset the child enforces on itself.
    pub(super) fn filesystem_ruleset(config: &RunnerConfig, scratch: &Path) -> io::Result<RulesetCreated> {
        let readable: Vec<PathBuf> = SYSTEM_PATHS
            .iter()
            .map(PathBuf::from)
            .chain(interpreter_dir(&config.interpreter))
            .chain(config.readable_paths.iter().cloned())
            .filter(|path| path.exists())
            .collect();
        let devices: Vec<&Path> = DEVICES.iter().map(Path::new).filter(|path| path.exists()).collect();

        Ruleset::default()
            .handle_access(AccessFs::from_all(LANDLOCK_ABI))
            .and_then(|ruleset| ruleset.create())
            .and_then(|ruleset| ruleset.add_rules(path_beneath_rules(&readable, AccessFs::from_read(LANDLOCK_ABI))))
            .and_then(|ruleset| ruleset.add_rules(path_beneath_rules(devices, AccessFs::ReadFile | AccessFs::WriteFile)))
            .and_then(|ruleset| ruleset.add_rules(path_beneath_rules([scratch], AccessFs::from_all(LANDLOCK_ABI))))
            .map_err(io::Error::other)
    }

    /// Directory of an interpreter given by absolute path, so interpreters
    /// outside the system paths can still start.
    fn interpreter_dir(interpreter: &Path) -> Option<PathBuf> {
        if !interpreter.is_absolute() {
            return None;
        }
        let resolved = interpreter.canonicalize().ok()?;
        resolved.parent().map(Path::to_path_buf)
    }

    /// Child side. A kernel without Landlock reports `NotEnforced`, which
    /// counts as a failure.
    pub(super) fn restrict_filesystem(ruleset: RulesetCreated) -> io::Result<()> {
        match ruleset.restrict_self() {
            Ok(status) if !matches!(status.ruleset, RulesetStatus::NotEnforced) => Ok(()),
            Ok(_) => Err(io::Error::from_raw_os_error(libc::ENOSYS)),
            Err(_) => Err(io::Error::last_os_error()),
        }
    }

    // linux/bpf_common.h
    const BPF_LD: u16 = 0x00;
    const BPF_JMP: u16 = 0x05;
    const BPF_RET: u16 = 0x06;
    const BPF_W: u16 = 0x00;
    const BPF_ABS: u16 = 0x20;
    const BPF_JEQ: u16 = 0x10;
    const BPF_JGE: u16 = 0x30;
    const BPF_K: u16 = 0x00;

    const SECCOMP_MODE_FILTER: libc::c_ulong = 2;
    const SECCOMP_RET_ALLOW: u32 = 0x7fff_0000;
    const SECCOMP_RET_ERRNO: u32 = 0x0005_0000;

    /// `struct seccomp_data` offsets.
    const NR_OFFSET: u32 = 0;
    const ARCH_OFFSET: u32 = 4;

    /// x32 syscall numbers on x86_64 carry this bit.
    const X32_SYSCALL_BIT: u32 = 0x4000_0000;

    #[cfg(target_arch = "x86_64")]
    const AUDIT_ARCH: Option<u32> = Some(0xc000_003e);
    #[cfg(target_arch = "aarch64")]
    const AUDIT_ARCH: Option<u32> = Some(0xc000_00b7);
    #[cfg(target_arch = "riscv64")]
    const AUDIT_ARCH: Option<u32> = Some(0xc000_00f3);
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "riscv64")))]
    const AUDIT_ARCH: Option<u32> = None;

    const fn stmt(code: u16, k: u32) -> libc::sock_filter {
        libc::sock_filter { code, jt: 0, jf: 0, k }
    }

    const fn jump(code: u16, k: u32, jt: u8, jf: u8) -> libc::sock_filter {
        libc::sock_filter { code, jt, jf, k }
    }

    /// Seccomp program refusing `setsid` and `setpgid` with `EPERM`.
    /// Syscalls from a foreign ABI are refused as well, since their numbers
    /// differ.
    #[derive(Clone, Copy)]
    pub(super) struct GroupFilter {
        program: [libc::sock_filter; 9],
    }

    impl GroupFilter {
        pub(super) fn for_target() -> Option<Self> {
            let arch = AUDIT_ARCH?;
            let deny = SECCOMP_RET_ERRNO | libc::EPERM as u32;
            let program = [
                stmt(BPF_LD | BPF_W | BPF_ABS, ARCH_OFFSET),
                jump(BPF_JMP | BPF_JEQ | BPF_K, arch, 1, 0),
                stmt(BPF_RET | BPF_K, deny),
                stmt(BPF_LD | BPF_W | BPF_ABS, NR_OFFSET),
                jump(BPF_JMP | BPF_JGE | BPF_K, X32_SYSCALL_BIT, 3, 0),
                jump(BPF_JMP | BPF_JEQ | BPF_K, libc::SYS_setsid as u32, 2, 0),
                jump(BPF_JMP | BPF_JEQ | BPF_K, libc::SYS_setpgid as u32, 1, 0),
                stmt(BPF_RET | BPF_K, SECCOMP_RET_ALLOW),
                stmt(BPF_RET | BPF_K, deny),
            ];
            Some(GroupFilter { program })
        }

        pub(super) fn install(mut self) -> io::Result<()> {
            let prog = libc::sock_fprog { len: self.program.len() as libc::c_ushort, filter: self.program.as_mut_ptr() };
            let one: libc::c_ulong = 1;
            let zero: libc::c_ulong = 0;
            // SAFETY: `prog` points at `self.program`, alive for both calls.
            unsafe {
                if libc::prctl(libc::PR_SET_NO_NEW_PRIVS, one, zero, zero, zero) != 0 {
                    return Err(io::Error::last_os_error());
                }
                if libc::prctl(libc::PR_SET_SECCOMP, SECCOMP_MODE_FILTER, &prog as *const libc::sock_fprog) != 0 {
                    return Err(io::Error::last_os_error());
                }
            }
            Ok(())
        }
    }

}
