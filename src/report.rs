use anyhow::Result;
use std::fs;

use crate::{
    bootstrap::{Action, BootstrapSummary},
    cli::ReportMode,
    config::Config,
    context, envfile,
};

/// Full mode appends the effective config, with secret-like values
/// masked unless `redact` is off.
pub fn build_report(
    cfg: &Config,
    summary: &BootstrapSummary,
    env_path: &std::path::Path,
    mode: ReportMode,
    redact: bool,
) -> Result<String> {
    Ok(match mode {
        ReportMode::Off => String::new(),
        ReportMode::Summary => summary_text(cfg, summary, env_path),
        ReportMode::Full => {
            let mut out = summary_text(cfg, summary, env_path);
            out.push_str("\neffective config\n");
            for (k, v) in context::settings(cfg, redact)? {
                out.push_str(&format!("  {k} = {v}\n"));
            }
            out
        }
    })
}

fn summary_text(cfg: &Config, summary: &BootstrapSummary, env_path: &std::path::Path) -> String {
    let mut out = String::new();

    out.push_str("devboot report (summary)\n");
    out.push_str("========================\n");

    for o in &summary.outcomes {
        let what = match o.action {
            Action::Created => "created",
            Action::AlreadyPresent => "ok",
        };
        out.push_str(&format!("  {:<22} {}\n", o.step.to_string(), what));
    }

    out.push_str("\nendpoints\n");
    out.push_str(&format!(
        "  s3 api:   {} (container {})\n",
        cfg.object_store.api_url(),
        cfg.object_store.container_name
    ));
    out.push_str(&format!("  console:  {}\n", cfg.object_store.console_url()));
    out.push_str(&format!("  dynamodb: {}\n", cfg.kv_emulator.endpoint_url()));

    let env_state = match fs::read_to_string(env_path) {
        Ok(text) => match envfile::parse_env_text(&text) {
            Ok(vars) => format!("{} keys", vars.len()),
            Err(e) => format!("unparsable ({e})"),
        },
        Err(e) => format!("unreadable ({e})"),
    };
    out.push_str(&format!("  env file: {} ({env_state})\n", env_path.display()));
    out.push_str("\nServices may still be starting; retry connections until they answer.\n");

    out
}
