use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "devboot",
    version,
    about = "Start MinIO and DynamoDB Local and seed a .env for local development"
)]
pub struct Args {
    /// Path to devboot.toml (overrides DEVBOOT_CONFIG and <workdir>/devboot.toml)
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,

    /// Directory to bootstrap (defaults to the current directory)
    #[arg(long)]
    pub workdir: Option<std::path::PathBuf>,

    /// Print a report after a successful run
    #[arg(long, value_enum, default_value_t = ReportMode::Off)]
    pub report: ReportMode,

    /// Print the resolved context and settings before running
    #[arg(long, default_value_t = false)]
    pub dump_context: bool,

    /// Disable redaction in the context dump and the full report
    #[arg(long = "no-redact", default_value_t = false)]
    pub no_redact: bool,
}

impl Args {
    pub fn effective_redact(&self) -> bool {
        !self.no_redact
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportMode {
    Off,
    Summary,
    Full,
}
