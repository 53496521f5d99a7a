use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use semver::Version;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use tracing::{debug, info, warn};
use vulnrange::{
    config::Config,
    logging::init_tracing,
    matcher::{AdvisoryMatcher, Comparer},
    model::{CheckReport, Ecosystem},
    output::{format_result_to_string, print_result, OutputFormat},
    store::{AdvisoryStore, MemoryStore},
};

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
}

#[derive(Parser)]
#[command(name = "vulnrange")]
#[command(
    author,
    version,
    about = "Match installed package versions against security advisories"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check one package version against the advisory store
    Check {
        /// Package name as it appears in the ecosystem's registry
        package: String,

        /// Installed version (semantic version, leading 'v' allowed)
        version: String,

        /// Package ecosystem (npm, pip, rubygems, cargo, composer, nuget, maven, go)
        #[arg(short, long)]
        ecosystem: Option<String>,

        /// Advisory store: JSON file or bucket directory
        #[arg(long)]
        db: Option<PathBuf>,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Write output to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Exit code to use when vulnerabilities are found
        #[arg(long, default_value_t = 0)]
        exit_code: u8,
    },

    /// List known ecosystems and their lookup prefixes
    ListEcosystems,

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    init_tracing(&config.log_level);
    if let Some(e) = config_error {
        warn!("using default configuration: {:#}", e);
    }

    match run(cli, &config) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn run(cli: Cli, config: &Config) -> Result<u8> {
    match cli.command {
        Commands::Check {
            package,
            version,
            ecosystem,
            db,
            format,
            output,
            exit_code,
        } => {
            let ecosystem = Ecosystem::from(ecosystem.unwrap_or(config.default_ecosystem.clone()));
            let format_str = format.unwrap_or(config.default_format.clone());
            let db_path = db.or_else(|| config.db_path.clone()).context(
                "no advisory store given; pass --db or set db_path in the config file",
            )?;

            run_check(
                config,
                ecosystem,
                &package,
                &version,
                db_path,
                &format_str,
                output,
                exit_code,
            )
        }
        Commands::ListEcosystems => {
            list_ecosystems();
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_check(
    config: &Config,
    ecosystem: Ecosystem,
    package: &str,
    version: &str,
    db_path: PathBuf,
    format: &str,
    output_file: Option<PathBuf>,
    exit_code: u8,
) -> Result<u8> {
    let format = OutputFormat::from_str(format).map_err(|e| anyhow::anyhow!(e))?;
    let version = parse_version(version)?;

    let store = MemoryStore::load(&db_path)
        .with_context(|| format!("failed to load advisories from {}", db_path.display()))?;

    let matcher = AdvisoryMatcher::new(ecosystem.clone(), store);
    debug!(
        ecosystem = %ecosystem,
        comparer = matcher.comparer().name(),
        package,
        version = %version,
        "checking package"
    );

    let vulns = matcher.detect(package, &version)?;
    let mut report = CheckReport::new(ecosystem, package, version.to_string(), vulns);

    let found = report.vulnerabilities.len();
    report.retain_unignored(|id| config.ignore.should_ignore_vulnerability(id));
    if report.vulnerabilities.len() < found {
        info!(
            ignored = found - report.vulnerabilities.len(),
            "suppressed ignored vulnerabilities"
        );
    }

    if let Some(path) = output_file {
        let content = format_result_to_string(&report, format)?;
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "report written");
    } else {
        print_result(&report, format)?;
    }

    if report.is_vulnerable() {
        Ok(exit_code)
    } else {
        Ok(exit_codes::SUCCESS)
    }
}

fn parse_version(s: &str) -> Result<Version> {
    let trimmed = s.trim();
    Version::parse(trimmed.strip_prefix('v').unwrap_or(trimmed))
        .with_context(|| format!("invalid version: {}", s))
}

fn list_ecosystems() {
    println!("Known ecosystems:");
    println!();

    for ecosystem in Ecosystem::KNOWN {
        let comparer = Comparer::for_ecosystem(&ecosystem);
        println!(
            "  {:<10} prefix: {:<12} comparer: {}",
            ecosystem.as_str(),
            ecosystem.prefix(),
            comparer.name()
        );
    }

    println!();
    println!("Other identifiers are accepted and use the general comparer.");
    println!("Store backend: {}", MemoryStore::new().name());
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'vulnrange config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
