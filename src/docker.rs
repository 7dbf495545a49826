use serde::Deserialize;
use std::process::{Command, Stdio};

use crate::{
    error::{BootstrapError, Result},
    host::{ContainerRuntime, ContainerSpec},
};

/// Talks to the container runtime through a docker-compatible CLI.
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: String,
}

impl DockerCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PsEntry {
    #[serde(rename = "Names")]
    names: String,

    #[serde(rename = "State", default)]
    state: Option<String>,
}

impl ContainerRuntime for DockerCli {
    fn is_running(&self, name: &str) -> bool {
        let filter = format!("name=^/?{}$", regex::escape(name));
        let out = Command::new(&self.program)
            .args(["ps", "--filter", filter.as_str(), "--format", "{{json .}}"])
            .stdin(Stdio::null())
            .output();

        match out {
            Ok(o) if o.status.success() => {
                ps_lists_running(&String::from_utf8_lossy(&o.stdout), name)
            }
            Ok(o) => {
                log::debug!(
                    "{} ps exited with {}: {}",
                    self.program,
                    o.status,
                    String::from_utf8_lossy(&o.stderr).trim()
                );
                false
            }
            Err(e) => {
                log::debug!("could not run {} ps: {e}", self.program);
                false
            }
        }
    }

    fn launch(&self, spec: &ContainerSpec) -> Result<String> {
        let args = spec.run_args();
        log::info!("{} {}", self.program, args.join(" "));

        let out = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| BootstrapError::container(&spec.name, e))?;

        if !out.status.success() {
            return Err(BootstrapError::container(
                &spec.name,
                format!("{} run exited with {}", self.program, out.status),
            ));
        }

        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    }
}

/// `docker ps --format '{{json .}}'` prints one object per line.
fn ps_lists_running(stdout: &str, name: &str) -> bool {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter_map(|l| match serde_json::from_str::<PsEntry>(l) {
            Ok(e) => Some(e),
            Err(err) => {
                log::debug!("skipping unparsable docker ps line ({err}): {l}");
                None
            }
        })
        .any(|e| {
            let running = e
                .state
                .as_deref()
                .map(|s| s.eq_ignore_ascii_case("running"))
                .unwrap_or(true);
            running && e.names.split(',').any(|n| n.trim().trim_start_matches('/') == name)
        })
}
