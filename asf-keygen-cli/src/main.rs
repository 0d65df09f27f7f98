use anyhow::{Context, Result};
use asf_keygen_core::logging::{init_logging_with_config, LogConfig};
use asf_keygen_core::orchestrator::RoleOutcome;
use asf_keygen_core::{
    resolve_roles, CommandEntropySource, ProvisioningConfig, ProvisioningReport, Provisioner,
    RoleFlags, Summary,
};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

/// Exit status when at least one role failed
const EXIT_ROLE_FAILED: u8 = 1;
/// Exit status for unusable configuration or arguments
const EXIT_CONFIG: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "asf-keygen")]
#[command(author, version, about = "Generate and provision the ASF symmetric keys", long_about = None)]
struct Args {
    /// Generate the communication key (ASF_COM_KEY)
    #[arg(short, long)]
    communication: bool,

    /// Generate the injection key (ASF_INJECT_KEY)
    #[arg(short, long)]
    injection: bool,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory receiving the generated headers
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// TA source directory to copy the headers into (repeatable)
    #[arg(long = "ta-dir", value_name = "DIR")]
    ta_dirs: Vec<PathBuf>,

    /// External entropy generator binary
    #[arg(long, value_name = "PATH")]
    entropy_program: Option<PathBuf>,

    /// Render the headers without writing or copying anything
    #[arg(long)]
    dry_run: bool,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn role_flags(&self) -> RoleFlags {
        RoleFlags {
            communication: self.communication,
            injection: self.injection,
        }
    }

    /// Defaults, then the config file, then `ASF_KEYGEN_*`, then flags
    fn load_config(&self) -> Result<ProvisioningConfig> {
        let config = match &self.config {
            Some(path) => ProvisioningConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ProvisioningConfig::default(),
        };
        let mut config = config
            .with_env_overrides()
            .context("reading ASF_KEYGEN_* environment")?;

        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if !self.ta_dirs.is_empty() {
            config.distribution_dirs = self.ta_dirs.clone();
        }
        if let Some(program) = &self.entropy_program {
            config.entropy.program = program.clone();
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.json_logs {
            config.logging.json_format = true;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("asf-keygen: {:#}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    if let Err(e) = LogConfig::from_settings(&config.logging)
        .and_then(init_logging_with_config)
    {
        eprintln!("asf-keygen: {}", e);
        return ExitCode::from(EXIT_CONFIG);
    }

    match run(args.role_flags(), config).await {
        Ok(report) => {
            print_summary(&report);
            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_ROLE_FAILED)
            }
        }
        Err(e) => {
            eprintln!("asf-keygen: {:#}", e);
            ExitCode::from(EXIT_ROLE_FAILED)
        }
    }
}

async fn run(flags: RoleFlags, config: ProvisioningConfig) -> Result<ProvisioningReport> {
    let roles = resolve_roles(flags);
    debug!(?roles, "resolved roles");

    let entropy = CommandEntropySource::from_config(&config.entropy);
    let provisioner = Provisioner::new(config, entropy);
    let report = provisioner.provision(&roles).await?;

    info!(summary = ?report.summary(), "asf-keygen finished");
    Ok(report)
}

fn print_summary(report: &ProvisioningReport) {
    for entry in report.entries() {
        match &entry.outcome {
            RoleOutcome::Done {
                local_path,
                distributed_to,
            } => {
                println!("{}: wrote {}", entry.role, local_path.display());
                for path in distributed_to {
                    println!("{}: copied to {}", entry.role, path.display());
                }
            }
            RoleOutcome::Rendered { local_path } => {
                println!("{}: would write {} (dry run)", entry.role, local_path.display());
            }
            RoleOutcome::Failed(failure) => {
                eprintln!("{}: FAILED: {}", entry.role, failure);
            }
        }
    }

    match report.summary() {
        Summary::Success => {}
        Summary::Partial => {
            let failed: Vec<_> = report.failures().map(|f| f.role.to_string()).collect();
            let done: Vec<_> = report.succeeded().map(|r| r.to_string()).collect();
            eprintln!(
                "asf-keygen: partial success: provisioned [{}], failed [{}]",
                done.join(", "),
                failed.join(", ")
            );
        }
        Summary::Failure => {
            eprintln!("asf-keygen: no key was provisioned");
        }
    }
}
