use regex::Regex;
use std::{
    process::{Command, Stdio},
    sync::OnceLock,
};

use crate::{
    error::{BootstrapError, Result},
    host::{ProcessSpec, ProcessTable},
};

/// The live OS process table.
#[derive(Debug, Clone, Default)]
pub struct SystemProcesses;

impl ProcessTable for SystemProcesses {
    fn is_running(&self, pattern: &str) -> bool {
        match list_processes() {
            Some(listing) => listing_contains(&listing, pattern, std::process::id()),
            None => {
                log::debug!("process listing unavailable; assuming '{pattern}' is not running");
                false
            }
        }
    }

    fn spawn_detached(&self, spec: &ProcessSpec) -> Result<u32> {
        log::info!("spawning `{}` in {}", spec.command_line(), spec.cwd.display());

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .current_dir(&spec.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Own process group: a Ctrl+C in the launching shell must not reach it.
            cmd.process_group(0);
        }

        let child = cmd.spawn().map_err(|source| BootstrapError::ProcessLaunch {
            program: spec.program.clone(),
            source,
        })?;

        // Dropping the handle neither waits for nor kills the child.
        Ok(child.id())
    }
}

#[cfg(unix)]
fn list_processes() -> Option<String> {
    let out = Command::new("ps")
        .args(["-eo", "pid=,args="])
        .stdin(Stdio::null())
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&out.stdout).to_string())
}

#[cfg(windows)]
fn list_processes() -> Option<String> {
    let out = Command::new("powershell")
        .args([
            "-NoProfile",
            "-Command",
            "Get-CimInstance Win32_Process | ForEach-Object { \"$($_.ProcessId) $($_.CommandLine)\" }",
        ])
        .stdin(Stdio::null())
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&out.stdout).to_string())
}

#[cfg(not(any(unix, windows)))]
fn list_processes() -> Option<String> {
    None
}

fn pid_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\d+)\s+(.*)$").expect("static regex"))
}

/// `listing` holds one `<pid> <command line>` per line.
fn listing_contains(listing: &str, pattern: &str, own_pid: u32) -> bool {
    let Ok(needle) = Regex::new(&regex::escape(pattern)) else {
        return false;
    };

    listing
        .lines()
        .filter_map(|l| pid_line().captures(l))
        .filter(|c| c[1].parse::<u32>().ok() != Some(own_pid))
        .any(|c| needle.is_match(&c[2]))
}
