use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;

use crate::context::ContextEnv;

/// Expands `{workdir}`, `{home}` and `{user}` in configured paths.
/// Relative results are anchored at the working directory.
pub struct Resolver<'a> {
    pub ctx: &'a ContextEnv,
}

impl<'a> Resolver<'a> {
    pub fn new(ctx: &'a ContextEnv) -> Self {
        Self { ctx }
    }

    pub fn resolve(&self, input: &str) -> Result<String> {
        // Fast path
        if !input.contains('{') {
            return Ok(input.to_string());
        }

        let mut out = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                bail!("unclosed token in string: {input}");
            };

            let token = &after[..close];
            let repl = self
                .token_value(token)
                .ok_or_else(|| anyhow!("unknown token: {{{token}}} in: {input}"))?;

            out.push_str(&repl);
            rest = &after[close + 1..];
        }
        out.push_str(rest);

        Ok(out)
    }

    pub fn resolve_path(&self, input: &str) -> Result<PathBuf> {
        let p = PathBuf::from(self.resolve(input)?);
        if p.is_absolute() {
            Ok(p)
        } else {
            Ok(self.ctx.workdir.join(p))
        }
    }

    fn token_value(&self, token: &str) -> Option<String> {
        match token {
            "workdir" => Some(self.ctx.workdir.to_string_lossy().to_string()),
            "home" => Some(self.ctx.home.to_string_lossy().to_string()),
            "user" => self.ctx.user().map(str::to_string),
            _ => None,
        }
    }
}
