use anyhow::Result;
use clap::Parser;

use devboot::{
    cli::{Args, ReportMode},
    docker::DockerCli,
    fetch::HttpFetcher,
    process::SystemProcesses,
    report,
    tools::PathLocator,
    Bootstrapper, ContextEnv,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let mut ctx = ContextEnv::new(args.workdir.as_deref())?;
    let cfg = ctx.load_config(args.config.as_deref())?;

    if args.dump_context {
        print!("{}", ctx.debug_dump(&cfg, args.effective_redact())?);
        println!();
    }

    let tools = PathLocator::from_vars(&ctx.vars);
    let containers = DockerCli::new(cfg.object_store.runtime.clone());
    let processes = SystemProcesses;
    let fetcher = HttpFetcher::default();

    let boot = Bootstrapper::new(&ctx, &cfg, &tools, &containers, &processes, &fetcher);
    let summary = boot.run()?;

    if args.report != ReportMode::Off {
        let env_path = boot.env_file_path()?;
        print!(
            "{}",
            report::build_report(&cfg, &summary, &env_path, args.report, args.effective_redact())?
        );
    }

    Ok(())
}
