use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tempmap::{
    CityRegistry, CurrentConditionsSource, FetchReport, RegistryKind, TempMapConfig, TempMapError,
    WeatherFetcher, WeatherReading, WeatherTable, fetcher_from_config, telemetry,
};
use tracing::debug;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "TEMPMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Built-in registry to use instead of the configured one
    #[arg(short, long)]
    registry: Option<RegistryKind>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the cities of the active registry
    Cities,
    /// Fetch and print the current temperature table
    Table {
        /// Print JSON instead of a text table
        #[arg(long)]
        json: bool,
        /// Add the derived elevation column
        #[arg(long)]
        elevation: bool,
    },
    /// Show the table and refresh it on demand
    Interactive {
        /// Add the derived elevation column
        #[arg(long)]
        elevation: bool,
    },
}

#[derive(Serialize)]
struct JsonRow<'a> {
    #[serde(flatten)]
    reading: &'a WeatherReading,
    #[serde(skip_serializing_if = "Option::is_none")]
    elevation: Option<f64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<TempMapError>() {
                Some(app_err) => eprintln!("error: {}", app_err.user_message()),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = TempMapConfig::load_from_path(cli.config.clone())
        .with_context(|| "Failed to load configuration")?;
    if let Some(kind) = cli.registry {
        config.registry.preset = kind;
        config.registry.cities.clear();
    }

    telemetry::init_tracing(&config.logging, cli.verbose)?;
    let config_path = cli.config.clone().or_else(TempMapConfig::get_config_path);
    debug!(
        "Using config from: {}",
        config_path.map_or_else(|| "defaults".to_string(), |p| p.display().to_string())
    );

    match cli.command {
        Commands::Cities => print_cities(&config.registry.build()?),
        Commands::Table { json, elevation } => {
            let fetcher = fetcher_from_config(&config)?;
            let report = fetcher.fetch_weather_report();
            print_failures(&report);
            if json {
                println!("{}", table_json(&report.table, elevation)?);
            } else {
                print!("{}", format_table(&report.table, elevation));
            }
        }
        Commands::Interactive { elevation } => {
            let fetcher = fetcher_from_config(&config)?;
            run_interactive(&fetcher, elevation)?;
        }
    }

    Ok(())
}

fn print_cities(registry: &CityRegistry) {
    println!("Registry '{}' ({} cities):", registry.name(), registry.len());
    for city in registry {
        println!("  {:<12} {}", city.city_id, city.format_coordinates());
    }
}

fn print_failures(report: &FetchReport) {
    for failure in &report.failures {
        eprintln!("warning: error fetching {}: {}", failure.city_id, failure.error);
    }
}

fn table_json(table: &WeatherTable, elevation: bool) -> Result<String> {
    let rows: Vec<JsonRow<'_>> = table
        .iter()
        .map(|reading| JsonRow {
            reading,
            elevation: elevation.then(|| reading.elevation()),
        })
        .collect();
    serde_json::to_string_pretty(&rows).with_context(|| "Failed to serialize table")
}

fn format_table(table: &WeatherTable, elevation: bool) -> String {
    if table.is_empty() {
        return "No temperature data available.\n".to_string();
    }

    let mut out = format!(
        "{:<12} {:>9} {:>10} {:>8}",
        "City", "Latitude", "Longitude", "Temp"
    );
    if elevation {
        out.push_str(&format!(" {:>10}", "Elevation"));
    }
    out.push_str("  Observed\n");

    for row in table {
        out.push_str(&format!(
            "{:<12} {:>9.4} {:>10.4} {:>8}",
            row.city_id,
            row.latitude,
            row.longitude,
            row.format_temperature()
        ));
        if elevation {
            out.push_str(&format!(" {:>10.0}", row.elevation()));
        }
        out.push_str(&format!("  {}\n", row.format_observed_at()));
    }

    if let Some((low, high)) = table.temperature_range() {
        out.push_str(&format!("Range: {low:.1}°C .. {high:.1}°C\n"));
    }
    out
}

fn run_interactive<S: CurrentConditionsSource>(
    fetcher: &WeatherFetcher<S>,
    elevation: bool,
) -> Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    let report = fetcher.fetch_weather_report();
    print_failures(&report);
    print!("{}", format_table(&report.table, elevation));

    loop {
        print!("[enter] show, r = refresh, q = quit > ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match line.trim() {
            "" | "s" | "show" => {
                let cached = fetcher.cache_age().is_some_and(|age| age < fetcher.ttl());
                let report = fetcher.fetch_weather_report();
                match fetcher.cache_age() {
                    Some(age) if cached => println!("(data is {}s old)", age.as_secs()),
                    _ => print_failures(&report),
                }
                print!("{}", format_table(&report.table, elevation));
            }
            "r" | "refresh" => {
                let report = fetcher.refresh();
                print_failures(&report);
                print!("{}", format_table(&report.table, elevation));
            }
            "q" | "quit" | "exit" => break,
            other => println!("Unknown command '{other}'"),
        }
    }

    Ok(())
}
