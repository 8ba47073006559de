use clap::Parser;
use planner_engine::cli::Cli;
use planner_engine::cli_handlers::{handle_command, CliResult};
use planner_engine::context::PlannerContext;
use planner_engine::logging::{init_logging, LoggingConfig};

#[tokio::main]
async fn main() {
    // Parse CLI arguments first to get logging configuration
    let cli = Cli::parse();

    let log_config = LoggingConfig::from_args(cli.quiet, cli.verbose > 0, cli.json);
    if let Err(e) = init_logging(log_config) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(error_response) = run(cli).await {
        match serde_json::to_string_pretty(&error_response) {
            Ok(rendered) => eprintln!("{}", rendered),
            Err(_) => eprintln!("{}: {}", error_response.code, error_response.error),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult {
    let ctx = PlannerContext::load(cli.db).await?;
    handle_command(&ctx, cli.command, cli.json).await
}
