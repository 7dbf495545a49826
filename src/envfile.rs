use anyhow::{Context as _, Result};
use minijinja::Environment;
use serde_json::json;
use std::{
    collections::BTreeMap,
    fs::OpenOptions,
    io::{self, Write},
    path::Path,
};

use crate::config::EnvFileConfig;

const ENV_TEMPLATE: &str = include_str!("../assets/env.jinja");

pub fn render(cfg: &EnvFileConfig) -> Result<String> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.add_template("env", ENV_TEMPLATE)?;

    let ctx = json!({
        "use_local_services": cfg.use_local_services,
        "bucket_name": cfg.bucket_name,
        "table_name": cfg.table_name,
        "secret_arn": cfg.secret_arn,
    });

    let tpl = env.get_template("env")?;
    tpl.render(minijinja::Value::from_serialize(&ctx))
        .context("failed to render .env template")
}

/// Writes `contents` only if `path` does not exist yet.
/// Returns `false` when an existing file was left untouched.
pub fn write_if_absent(path: &Path, contents: &str) -> io::Result<bool> {
    let mut f = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(e),
    };
    f.write_all(contents.as_bytes())?;
    f.sync_all()?;
    Ok(true)
}

pub fn parse_env_text(text: &str) -> Result<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();

    for (idx, line) in text.lines().enumerate() {
        let mut s = line.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }

        if let Some(rest) = s.strip_prefix("export ") {
            s = rest.trim();
        }

        let (k, v) = s.split_once('=').with_context(|| {
            format!(
                "invalid env line {} (expected KEY=VALUE): {}",
                idx + 1,
                line
            )
        })?;

        let key = k.trim().to_string();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim();
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = &val[1..val.len() - 1];
        }
        out.insert(key, val.to_string());
    }

    Ok(out)
}
