//! gql-batch - Run one GraphQL query per row of a CSV file.

use gql_batch::batch::BatchExecutor;
use gql_batch::cli::Cli;
use gql_batch::client::{GraphQlClient, HttpGraphQlClient, MockGraphQlClient};
use gql_batch::config::Config;
use gql_batch::error::Result;
use gql_batch::output::OutcomeWriter;
use gql_batch::{input, logging};
use tracing::{debug, error, info, warn};

/// Exit status when the batch ran but at least one row failed.
const EXIT_ROW_FAILURES: i32 = 2;

fn main() {
    // Load .env before parsing so clap sees GQL_BATCH_* variables
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    logging::init(cli.log_file.as_deref());

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    // Load configuration file
    let config_path = cli.config_path();
    debug!("Loading config from: {}", config_path.display());
    let file = Config::load_from_file(&config_path)?;
    let config = cli.to_batch_config(&file)?;

    let template = input::load_template(&cli.query)?;
    let table = input::load_table(&cli.input, config.delimiter)?;

    let client: Box<dyn GraphQlClient> = if cli.dry_run {
        info!("Dry run: requests are answered locally");
        Box::new(MockGraphQlClient::new())
    } else {
        info!("Endpoint: {}", config.endpoint);
        Box::new(HttpGraphQlClient::new(config.http_client_config())?)
    };

    let executor = BatchExecutor::new(
        client.as_ref(),
        &template,
        &table.headers,
        config.executor_options(),
    )?;
    let report = executor.execute(table.rows).await?;

    let stdout = std::io::stdout();
    let mut writer = OutcomeWriter::new(stdout.lock(), config.output);
    writer.write_all(report.outcomes())?;

    if report.has_failures() {
        warn!("{} of {} row(s) failed", report.failed(), report.len());
        return Ok(EXIT_ROW_FAILURES);
    }

    Ok(0)
}
