//! CLI interface for flight-optimizer

use clap::{Parser, Subcommand};
use flight_optimizer::{
    init_logging, parse_destinations, render_route_report, render_table, ClientConfig, FormState,
    LogConfig, Optimizer, OptimizerClient, ResultView, SearchForm, SearchRequest, SearchSession,
    ServiceConfig, SubmissionState, TequilaClient, DEFAULT_CURRENCY,
};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flight-optimizer")]
#[command(about = "Find the destination with the cheapest fare per kilometre")]
#[command(version)]
pub struct Cli {
    /// Directory for daily rolling log files (logs go to stderr otherwise)
    #[arg(long, global = true, env = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
    /// Write logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask the optimizer service for the best destination by price per km
    Search {
        /// Origin city (e.g. London)
        #[arg(short, long)]
        from: String,
        /// Destination cities, comma separated or repeated (e.g. "Paris, Berlin")
        #[arg(short, long, num_args = 1.., required = true)]
        to: Vec<String>,
        /// Currency code
        #[arg(short, long, default_value = DEFAULT_CURRENCY)]
        currency: String,
        /// Base address of the optimizer service (overrides FLIGHT_OPTIMIZER_API_BASE)
        #[arg(long)]
        api_base: Option<String>,
        /// Output file for JSON results
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the raw JSON response instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Search the Kiwi Tequila API directly, without an optimizer service
    Direct {
        /// Origin city (e.g. London)
        #[arg(short, long)]
        from: String,
        /// Destination cities, comma separated or repeated (e.g. "Paris, Berlin")
        #[arg(short, long, num_args = 1.., required = true)]
        to: Vec<String>,
        /// Currency code (defaults to DEFAULT_CURRENCY, then USD)
        #[arg(short, long)]
        currency: Option<String>,
        /// Output file for JSON results
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the JSON result instead of the route report
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig {
        log_dir: cli.log_dir.clone(),
        json: cli.log_json,
        ..LogConfig::new("flight-optimizer.log")
    };
    if let Err(e) = init_logging(&log_config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match cli.command {
        Commands::Search {
            from,
            to,
            currency,
            api_base,
            output,
            json,
        } => {
            let mut config = ClientConfig::from_env();
            if let Some(api_base) = api_base {
                config.api_base = api_base;
            }

            let session = SearchSession::new(OptimizerClient::from_config(&config)?);
            let state = FormState::new(SearchForm::new(from, to.join(","), currency));

            let finished = session
                .submit(&state, |s| {
                    if s.is_pending() {
                        eprintln!("Searching...");
                    }
                })
                .await?;

            match &finished.submission {
                SubmissionState::Succeeded(result) => {
                    let json_text = serde_json::to_string_pretty(result)?;
                    if let Some(output_file) = output {
                        fs::write(&output_file, &json_text)?;
                        eprintln!("Results saved to {}", output_file.display());
                    }

                    if json {
                        println!("{}", json_text);
                    } else {
                        let currency = finished.form.to_request().currency;
                        let view = ResultView::from_result(result);
                        println!("{}", render_table(&view, &currency));
                    }
                }
                SubmissionState::Failed(message) => {
                    eprintln!("Error: {}", message);
                    std::process::exit(1);
                }
                SubmissionState::Idle | SubmissionState::Pending => {
                    eprintln!("Error: an origin and at least one destination are required");
                    std::process::exit(2);
                }
            }
        }
        Commands::Direct {
            from,
            to,
            currency,
            output,
            json,
        } => {
            let config = ServiceConfig::from_env()?;
            let tequila = TequilaClient::new(&config.tequila_base, &config.api_key)?;
            let optimizer = Optimizer::new(tequila, config.default_currency);

            let request = SearchRequest::new(from, parse_destinations(&to.join(",")))
                .with_currency(currency.unwrap_or_default());

            eprintln!("Searching cheapest price per km in the next ~24 hours...");
            let outcome = match optimizer.search(request).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(e.exit_code());
                }
            };

            let json_text = serde_json::to_string_pretty(&outcome.result)?;
            if let Some(output_file) = output {
                fs::write(&output_file, &json_text)?;
                eprintln!("Results saved to {}", output_file.display());
            }

            if json {
                println!("{}", json_text);
            } else {
                println!("{}", render_route_report(&outcome));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "flight-optimizer",
            "search",
            "--from",
            "London",
            "--to",
            "Paris, Berlin, Rome",
        ]);

        assert!(cli.is_ok());

        if let Ok(Cli {
            command:
                Commands::Search {
                    from,
                    to,
                    currency,
                    json,
                    ..
                },
            ..
        }) = cli
        {
            assert_eq!(from, "London");
            assert_eq!(to, vec!["Paris, Berlin, Rome"]);
            assert_eq!(currency, "USD");
            assert!(!json);
        }
    }

    #[test]
    fn test_cli_repeated_destinations() {
        let cli = Cli::try_parse_from([
            "flight-optimizer",
            "search",
            "--from",
            "London",
            "--to",
            "Paris",
            "Rome",
            "--currency",
            "EUR",
        ])
        .unwrap();

        let Commands::Search { to, currency, .. } = cli.command else {
            panic!("expected the search command");
        };
        assert_eq!(to, vec!["Paris", "Rome"]);
        assert_eq!(currency, "EUR");

        let form = SearchForm::new("London", to.join(","), currency);
        assert_eq!(form.to_request().destinations, vec!["Paris", "Rome"]);
    }

    #[test]
    fn test_cli_requires_destinations() {
        assert!(Cli::try_parse_from(["flight-optimizer", "search", "--from", "London"]).is_err());
        assert!(Cli::try_parse_from(["flight-optimizer", "direct", "--from", "London"]).is_err());
    }

    #[test]
    fn test_cli_direct_parsing() {
        let cli = Cli::try_parse_from([
            "flight-optimizer",
            "direct",
            "--from",
            "London",
            "--to",
            "Paris",
            "Rome, Berlin",
        ])
        .unwrap();

        let Commands::Direct {
            from, to, currency, ..
        } = cli.command
        else {
            panic!("expected the direct command");
        };
        assert_eq!(from, "London");
        assert_eq!(currency, None);
        assert_eq!(parse_destinations(&to.join(",")), vec!["Paris", "Rome", "Berlin"]);
    }
}
