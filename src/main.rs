use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use meteo_tester::api::WeatherApi;
use meteo_tester::config::Settings;
use meteo_tester::report::{HtmlReport, ReportSink};
use meteo_tester::scenarios;
use meteo_tester::store::RecordStore;

#[derive(Parser)]
#[command(name = "meteo-tester")]
#[command(about = "Cross-validates weather app data against the OpenWeather API", long_about = None)]
struct Cli {
    /// Path to the environment config file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Environment section to use (stage, preprod, prod, ...)
    #[arg(short, long, default_value = "stage")]
    env: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API-vs-store consistency and average-temperature checks
    Check {
        /// Cities as Name=id pairs, e.g. London=2643743
        #[arg(short = 'C', long = "city", required = true)]
        cities: Vec<String>,

        /// Where to write the HTML report
        #[arg(short, long, default_value = "report.html")]
        output: PathBuf,
    },

    /// Print the hottest city recorded in the store
    Hottest,
}

fn parse_city(spec: &str) -> Result<(String, u64)> {
    let (name, id) = spec
        .split_once('=')
        .with_context(|| format!("city must be Name=id, got '{spec}'"))?;
    let id = id
        .parse::<u64>()
        .with_context(|| format!("invalid city id in '{spec}'"))?;
    Ok((name.to_string(), id))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = Settings::load(&cli.config, &cli.env)
        .with_context(|| format!("loading '{}' from {}", cli.env, cli.config.display()))?;
    let store = RecordStore::open(&settings.db_path(&cli.config)).await?;

    let outcome = run(&cli, &settings, &store).await;
    store.close().await;
    outcome
}

async fn run(cli: &Cli, settings: &Settings, store: &RecordStore) -> Result<()> {
    match &cli.command {
        Commands::Check { cities, output } => {
            let cities: Vec<(String, u64)> = cities
                .iter()
                .map(|spec| parse_city(spec))
                .collect::<Result<_>>()?;
            let by_id: Vec<(&str, u64)> =
                cities.iter().map(|(name, id)| (name.as_str(), *id)).collect();
            let names: Vec<&str> = cities.iter().map(|(name, _)| name.as_str()).collect();

            let api = WeatherApi::new(&settings.base_url, &settings.api_key);
            let mut report = HtmlReport::new();

            scenarios::check_api_store_consistency(&api, store, &names).await?;
            println!("{} API and store are consistent", "✓".green());

            scenarios::check_average_temperature(&api, store, &by_id).await?;
            println!("{} stored averages match the API", "✓".green());

            let (city, value) = scenarios::hottest_city(store).await?;
            report.attach_table(
                "Hottest City",
                &["City", "Average Temperature"],
                &[vec![city.clone(), value.to_string()]],
            );
            println!("{} hottest city: {city} ({value}°C)", "ℹ".blue());

            report.write_to(output)?;
            Ok(())
        }

        Commands::Hottest => {
            let (city, value) = scenarios::hottest_city(store).await?;
            println!("{} hottest city: {city} ({value}°C)", "ℹ".blue());
            Ok(())
        }
    }
}
