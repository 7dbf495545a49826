use anyhow::{bail, Context as _, Result};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::config::{Config, CONFIG_FILE_NAME};

#[derive(Debug, Clone)]
pub struct ContextEnv {
    pub vars: BTreeMap<String, String>,
    pub workdir: PathBuf,
    pub home: PathBuf,

    config_path: Option<PathBuf>,
}

impl ContextEnv {
    /// Snapshot the process environment. `workdir` defaults to the current directory.
    pub fn new(workdir: Option<&Path>) -> Result<Self> {
        let vars: BTreeMap<String, String> = std::env::vars().collect();

        let workdir = match workdir {
            Some(p) => p.to_path_buf(),
            None => std::env::current_dir().context("could not determine current directory")?,
        };
        if !workdir.is_dir() {
            bail!("working directory does not exist: {}", workdir.display());
        }
        // Resolved paths join onto this and end up in docker volume args.
        let workdir = std::path::absolute(&workdir)
            .with_context(|| format!("could not make {} absolute", workdir.display()))?;

        let home = dirs::home_dir()
            .or_else(|| std::env::var_os("HOME").map(PathBuf::from))
            .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
            .context("could not determine home directory")?;

        Ok(Self::from_parts(vars, workdir, home))
    }

    pub fn from_parts(vars: BTreeMap<String, String>, workdir: PathBuf, home: PathBuf) -> Self {
        Self {
            vars,
            workdir,
            home,
            config_path: None,
        }
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn user(&self) -> Option<&str> {
        self.vars
            .get("USER")
            .or_else(|| self.vars.get("USERNAME"))
            .map(|s| s.as_str())
    }

    /// Config path precedence:
    /// 1) CLI --config (must exist)
    /// 2) DEVBOOT_CONFIG (must exist)
    /// 3) <workdir>/devboot.toml (if present)
    /// 4) none: built-in defaults
    pub fn locate_config(&mut self, cli_config: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(p) = cli_config {
            if !p.exists() {
                bail!("--config was provided but file does not exist: {}", p.display());
            }
            self.config_path = Some(p.to_path_buf());
            return Ok(self.config_path.clone());
        }

        if let Some(p) = self.get_env_path("DEVBOOT_CONFIG") {
            if !p.exists() {
                bail!(
                    "DEVBOOT_CONFIG is set but file does not exist: {}",
                    p.display()
                );
            }
            self.config_path = Some(p);
            return Ok(self.config_path.clone());
        }

        let p = self.workdir.join(CONFIG_FILE_NAME);
        if p.is_file() {
            self.config_path = Some(p);
        }
        Ok(self.config_path.clone())
    }

    pub fn load_config(&mut self, cli_config: Option<&Path>) -> Result<Config> {
        match self.locate_config(cli_config)? {
            Some(p) => {
                log::debug!("loading config from {}", p.display());
                Config::load_from_path(&p)
            }
            None => {
                log::debug!("no config file found, using built-in defaults");
                Ok(Config::default())
            }
        }
    }

    fn get_env_path(&self, key: &str) -> Option<PathBuf> {
        self.vars
            .get(key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    }

    pub fn debug_dump(&self, cfg: &Config, redact: bool) -> Result<String> {
        let mut out = String::new();

        out.push_str("devboot context (debug)\n");
        out.push_str("=======================\n");
        out.push_str(&format!("workdir: {}\n", self.workdir.display()));
        out.push_str(&format!("home: {}\n", self.home.display()));
        out.push_str(&format!(
            "config_path: {}\n",
            self.config_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<defaults>".to_string())
        ));

        out.push_str("\nsettings:\n");
        for (k, v) in settings(cfg, redact)? {
            out.push_str(&format!("  {k} = {v}\n"));
        }

        Ok(out)
    }
}

/// Flattened `section.key -> value` view of the config. Secret-like keys
/// read `<redacted>` when `redact` is set.
pub fn settings(cfg: &Config, redact: bool) -> Result<BTreeMap<String, String>> {
    let value = serde_json::to_value(cfg).context("failed to serialize config")?;
    let mut flat = BTreeMap::new();
    flatten_json("", &value, &mut flat);
    if redact {
        for (k, v) in flat.iter_mut() {
            if looks_sensitive_key(k) {
                *v = "<redacted>".to_string();
            }
        }
    }
    Ok(flat)
}

// -------------------- helpers --------------------

fn flatten_json(prefix: &str, v: &serde_json::Value, out: &mut BTreeMap<String, String>) {
    match v {
        serde_json::Value::Object(map) => {
            for (k, child) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{prefix}.{k}")
                };
                flatten_json(&key, child, out);
            }
        }
        serde_json::Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                flatten_json(&format!("{prefix}[{idx}]"), child, out);
            }
        }
        serde_json::Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

fn looks_sensitive_key(k: &str) -> bool {
    let u = k.to_ascii_uppercase();
    u.contains("TOKEN")
        || u.contains("SECRET")
        || u.contains("PASSWORD")
        || u.contains("PRIVATE")
}
