//! Narrow views of the outside world the bootstrap procedure touches.
//!
//! Each trait pairs an existence check with the side effect it guards, so the
//! procedure can run against fakes in tests.

use std::path::{Path, PathBuf};

use crate::error::Result;

pub trait ToolLocator {
    /// Full path of `tool` if it is resolvable on the execution path.
    fn locate(&self, tool: &str) -> Option<PathBuf>;
}

pub trait ContainerRuntime {
    fn is_running(&self, name: &str) -> bool;

    /// Starts the container detached and returns its id.
    fn launch(&self, spec: &ContainerSpec) -> Result<String>;
}

pub trait ProcessTable {
    /// True if any process other than this one has `pattern` in its command line.
    fn is_running(&self, pattern: &str) -> bool;

    /// Starts the process detached and returns its pid.
    fn spawn_detached(&self, spec: &ProcessSpec) -> Result<u32>;
}

pub trait ArchiveFetcher {
    /// Writes the body at `url` to `dest`.
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    /// (host, container)
    pub ports: Vec<(u16, u16)>,
    /// (host dir, container dir)
    pub volumes: Vec<(PathBuf, String)>,
    pub env: Vec<(String, String)>,
    pub command: Vec<String>,
}

impl ContainerSpec {
    /// Arguments for `docker run`, excluding the program name.
    pub fn run_args(&self) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            self.name.clone(),
        ];

        for (host, container) in &self.ports {
            args.push("-p".to_string());
            args.push(format!("{host}:{container}"));
        }

        for (host, container) in &self.volumes {
            args.push("-v".to_string());
            args.push(format!("{}:{container}", host.display()));
        }

        for (k, v) in &self.env {
            args.push("-e".to_string());
            args.push(format!("{k}={v}"));
        }

        args.push(self.image.clone());
        args.extend(self.command.iter().cloned());
        args
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl ProcessSpec {
    pub fn command_line(&self) -> String {
        let mut s = self.program.clone();
        for a in &self.args {
            s.push(' ');
            s.push_str(a);
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_args_follow_docker_cli_order() {
        let spec = ContainerSpec {
            name: "local-minio".into(),
            image: "minio/minio".into(),
            ports: vec![(9000, 9000), (9001, 9001)],
            volumes: vec![(PathBuf::from("/w/minio_data"), "/data".into())],
            env: vec![("MINIO_ROOT_USER".into(), "minioadmin".into())],
            command: vec!["server".into(), "/data".into()],
        };

        assert_eq!(
            spec.run_args(),
            [
                "run",
                "-d",
                "--name",
                "local-minio",
                "-p",
                "9000:9000",
                "-p",
                "9001:9001",
                "-v",
                "/w/minio_data:/data",
                "-e",
                "MINIO_ROOT_USER=minioadmin",
                "minio/minio",
                "server",
                "/data",
            ]
        );
    }
}
