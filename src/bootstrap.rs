//! The bootstrap procedure: four create-if-absent steps run in order.
//!
//! Every step checks for the resource first and only acts when it is missing,
//! so re-running after a failure resumes at the first unsatisfied step.

use std::{fmt, fs, path::PathBuf};

use crate::{
    config::Config,
    context::ContextEnv,
    envfile,
    error::{BootstrapError, Result},
    fetch,
    host::{ArchiveFetcher, ContainerRuntime, ContainerSpec, ProcessSpec, ProcessTable, ToolLocator},
    resolve::Resolver,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Prerequisites,
    ObjectStore,
    KvDownload,
    KvProcess,
    EnvFile,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Step::Prerequisites => "prerequisites",
            Step::ObjectStore => "object store",
            Step::KvDownload => "kv emulator download",
            Step::KvProcess => "kv emulator process",
            Step::EnvFile => "env file",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Created,
    AlreadyPresent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: Step,
    pub action: Action,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapSummary {
    pub outcomes: Vec<StepOutcome>,
}

impl BootstrapSummary {
    pub fn action(&self, step: Step) -> Option<Action> {
        self.outcomes
            .iter()
            .find(|o| o.step == step)
            .map(|o| o.action)
    }

    /// True when the run changed nothing.
    pub fn is_noop(&self) -> bool {
        self.outcomes.iter().all(|o| o.action == Action::AlreadyPresent)
    }

    fn record(&mut self, step: Step, action: Action) {
        self.outcomes.push(StepOutcome { step, action });
    }
}

pub struct Bootstrapper<'a> {
    ctx: &'a ContextEnv,
    cfg: &'a Config,
    tools: &'a dyn ToolLocator,
    containers: &'a dyn ContainerRuntime,
    processes: &'a dyn ProcessTable,
    fetcher: &'a dyn ArchiveFetcher,
}

impl<'a> Bootstrapper<'a> {
    pub fn new(
        ctx: &'a ContextEnv,
        cfg: &'a Config,
        tools: &'a dyn ToolLocator,
        containers: &'a dyn ContainerRuntime,
        processes: &'a dyn ProcessTable,
        fetcher: &'a dyn ArchiveFetcher,
    ) -> Self {
        Self {
            ctx,
            cfg,
            tools,
            containers,
            processes,
            fetcher,
        }
    }

    pub fn run(&self) -> Result<BootstrapSummary> {
        let mut summary = BootstrapSummary::default();

        self.check_prerequisites()?;
        summary.record(Step::Prerequisites, Action::AlreadyPresent);

        summary.record(Step::ObjectStore, self.ensure_object_store()?);

        let (download, process) = self.ensure_kv_emulator()?;
        summary.record(Step::KvDownload, download);
        summary.record(Step::KvProcess, process);

        summary.record(Step::EnvFile, self.ensure_env_file()?);

        Ok(summary)
    }

    pub fn check_prerequisites(&self) -> Result<()> {
        for tool in self.cfg.required_tools() {
            match self.tools.locate(&tool.name) {
                Some(p) => log::debug!("found {} at {}", tool.name, p.display()),
                None => {
                    return Err(BootstrapError::MissingDependency {
                        tool: tool.name,
                        hint: tool.hint,
                    })
                }
            }
        }
        Ok(())
    }

    pub fn ensure_object_store(&self) -> Result<Action> {
        let os = &self.cfg.object_store;

        if self.containers.is_running(&os.container_name) {
            log::debug!("container '{}' already running", os.container_name);
            return Ok(Action::AlreadyPresent);
        }

        let spec = self.object_store_spec()?;
        if let Some((data_dir, _)) = spec.volumes.first() {
            fs::create_dir_all(data_dir).map_err(|e| {
                BootstrapError::container(
                    &os.container_name,
                    format!("cannot create {}: {e}", data_dir.display()),
                )
            })?;
        }

        let id = self.containers.launch(&spec)?;
        log::info!("started container '{}' ({id})", os.container_name);
        println!("MinIO is running. Console: {}", os.console_url());

        Ok(Action::Created)
    }

    pub fn object_store_spec(&self) -> Result<ContainerSpec> {
        let os = &self.cfg.object_store;
        let data_dir = self.resolve_path(&os.data_dir)?;

        Ok(ContainerSpec {
            name: os.container_name.clone(),
            image: os.image.clone(),
            ports: vec![(os.api_port, os.api_port), (os.console_port, os.console_port)],
            volumes: vec![(data_dir, "/data".to_string())],
            env: vec![
                ("MINIO_ROOT_USER".to_string(), os.root_user.clone()),
                ("MINIO_ROOT_PASSWORD".to_string(), os.root_password.clone()),
            ],
            command: vec![
                "server".to_string(),
                "/data".to_string(),
                "--console-address".to_string(),
                format!(":{}", os.console_port),
            ],
        })
    }

    /// Returns the (download, process) actions.
    pub fn ensure_kv_emulator(&self) -> Result<(Action, Action)> {
        let download = self.ensure_kv_downloaded()?;
        let process = self.ensure_kv_running()?;
        Ok((download, process))
    }

    fn ensure_kv_downloaded(&self) -> Result<Action> {
        let kv = &self.cfg.kv_emulator;
        let jar = self.ctx.workdir.join(&kv.jar);

        if jar.exists() {
            log::debug!("{} already present", jar.display());
            return Ok(Action::AlreadyPresent);
        }

        let archive = self.ctx.workdir.join(&kv.archive_name);
        self.fetcher.fetch(&kv.archive_url, &archive)?;

        fetch::extract_tar_gz(&archive, &self.ctx.workdir)
            .map_err(|e| BootstrapError::download(&kv.archive_url, format!("extraction failed: {e}")))?;

        fs::remove_file(&archive).map_err(|e| {
            BootstrapError::download(
                &kv.archive_url,
                format!("cannot remove {}: {e}", archive.display()),
            )
        })?;

        if !jar.exists() {
            return Err(BootstrapError::download(
                &kv.archive_url,
                format!("archive did not contain {}", kv.jar),
            ));
        }

        log::info!("downloaded and unpacked {}", kv.jar);
        Ok(Action::Created)
    }

    fn ensure_kv_running(&self) -> Result<Action> {
        let kv = &self.cfg.kv_emulator;

        if self.processes.is_running(&kv.jar) {
            log::debug!("a process matching '{}' is already running", kv.jar);
            return Ok(Action::AlreadyPresent);
        }

        let spec = self.kv_process_spec();
        let pid = self.processes.spawn_detached(&spec)?;
        log::info!("started DynamoDB Local (pid {pid})");
        println!("DynamoDB Local is running. Endpoint: {}", kv.endpoint_url());

        Ok(Action::Created)
    }

    pub fn kv_process_spec(&self) -> ProcessSpec {
        let kv = &self.cfg.kv_emulator;

        let mut args = vec![
            format!("-Djava.library.path={}", kv.lib_dir),
            "-jar".to_string(),
            kv.jar.clone(),
        ];
        if kv.shared_db {
            args.push("-sharedDb".to_string());
        }
        if let Some(port) = kv.port {
            args.push("-port".to_string());
            args.push(port.to_string());
        }

        ProcessSpec {
            program: kv.java.clone(),
            args,
            cwd: self.ctx.workdir.clone(),
        }
    }

    pub fn ensure_env_file(&self) -> Result<Action> {
        let path = self.env_file_path()?;

        if path.exists() {
            log::debug!("{} already exists; leaving it untouched", path.display());
            return Ok(Action::AlreadyPresent);
        }

        let text = envfile::render(&self.cfg.env_file)?;
        let created = envfile::write_if_absent(&path, &text)
            .map_err(|source| BootstrapError::FileWrite {
                path: path.clone(),
                source,
            })?;

        if !created {
            return Ok(Action::AlreadyPresent);
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        println!("Created {}. Add {name} to .gitignore so it is never committed.", path.display());

        Ok(Action::Created)
    }

    pub fn env_file_path(&self) -> Result<PathBuf> {
        self.resolve_path(&self.cfg.env_file.path)
    }

    fn resolve_path(&self, raw: &str) -> Result<PathBuf> {
        Ok(Resolver::new(self.ctx).resolve_path(raw)?)
    }
}
