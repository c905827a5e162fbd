//! Command line surface of the generator.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use contentgen_core::{Action, Generator, GeneratorConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod report;

/// Log filter variable: a plain level or a full filter spec.
pub const LOG_ENV: &str = "CONTENTGEN_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "contentgen",
    version,
    about = "Generate components, OpenAPI documents and a typed client from Strapi schemas"
)]
struct Cli {
    /// `components`, `api-documentation`, `api`; anything else runs all stages
    #[arg(value_name = "ACTION")]
    action: String,

    /// Strapi project directory
    #[arg(value_name = "STRAPI_DIR")]
    strapi_dir: PathBuf,

    /// Directory receiving the generated files
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Config file, defaults to `<STRAPI_DIR>/contentgen.toml` when present
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Parse `args`, run the requested stages and return the process exit code.
pub fn run_cli<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            return code;
        }
    };

    init_tracing();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Failed to create tokio runtime: {err}");
            return 1;
        }
    };

    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> i32 {
    match run_inner(cli).await {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(err) => {
            report::error(&err);
            1
        }
    }
}

async fn run_inner(cli: Cli) -> Result<bool, String> {
    let started = Instant::now();
    let action = Action::parse(&cli.action);
    let config = GeneratorConfig::discover(cli.config.as_deref(), &cli.strapi_dir)
        .map_err(|err| err.to_string())?;
    debug!(?config, %action, "Resolved configuration.");

    let generator = Generator::new(&cli.strapi_dir, config);
    let report = generator
        .run(action, &cli.output_dir)
        .await
        .map_err(|err| err.to_string())?;

    report::summary(action, &report, started.elapsed());
    Ok(report.is_success())
}

fn init_tracing() {
    let filter = match std::env::var(LOG_ENV) {
        Ok(level) if is_plain_level(&level) => format!("contentgen={level}"),
        Ok(spec) => spec,
        Err(_) => "contentgen=info".to_string(),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        debug!("tracing subscriber already initialized");
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}
