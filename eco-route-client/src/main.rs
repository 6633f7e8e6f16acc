use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use askama::Template;
use clap::{Parser, Subcommand};
use eco_route_client::config::ClientConfig;
use eco_route_client::domain::{Location, ModeSet, TransportMode};
use eco_route_client::form::PlannerForm;
use eco_route_client::geocode::{
    CachedGeocoder, GeocodeResult, GeocodeSearch, NominatimClient, QueryKind,
};
use eco_route_client::health::{self, Connectivity};
use eco_route_client::planning::{EcoApiClient, PlanOutcome, RoutePlanningSession};
use eco_route_client::render::{ComparisonTemplate, score_card};
use eco_route_client::resolver::{FieldSnapshot, LocationResolver, Phase, ResolverHandle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Give up on a field that has not settled by then.
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(30);

type CliGeocoder = CachedGeocoder<NominatimClient>;
type BoxError = Box<dyn std::error::Error>;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Plan routes ranked by their environmental impact"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check that the planning backend is reachable
    Health,

    /// Look up address suggestions
    Search {
        /// Address text or a "lat, lng" pair
        query: String,
    },

    /// Plan routes between two places
    Plan {
        /// Start address or "lat, lng"
        #[arg(long)]
        from: String,

        /// Destination address or "lat, lng"
        #[arg(long)]
        to: String,

        /// Transport mode to include (repeatable); defaults to all
        #[arg(long = "mode", value_parser = TransportMode::parse)]
        modes: Vec<TransportMode>,

        /// Show this mode's route as selected instead of the recommendation
        #[arg(long, value_parser = TransportMode::parse)]
        select: Option<TransportMode>,
    },

    /// Quick per-mode comparison between two places
    Compare {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eco_route_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, BoxError> {
    let config = ClientConfig::from_env()?;

    match cli.command {
        Command::Health => {
            let client = EcoApiClient::new(config.eco_api.clone())?;
            let mut indicator = health::spawn_check(client);
            eprintln!("{}", *indicator.borrow());
            let connectivity = indicator
                .wait_for(|c| *c != Connectivity::Checking)
                .await?
                .clone();
            println!("{connectivity}");
            Ok(if connectivity.is_healthy() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Command::Search { query } => {
            let search = geocode_search(&config)?;
            if search.classify(&query) == QueryKind::TooShort {
                println!("Type at least {} characters.", search.min_query_chars());
                return Ok(ExitCode::FAILURE);
            }
            let field = LocationResolver::spawn(search, config.resolver.clone());
            field.input(query)?;

            let snapshot = settle(&field).await?;
            match snapshot.phase {
                Phase::Resolved => {
                    if let Some(location) = snapshot.location {
                        println!("coordinates: {}, {}", location.lat(), location.lng());
                    }
                }
                Phase::ResultsShown => print_suggestions(&snapshot.search.results),
                _ => println!("No results found."),
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Plan {
            from,
            to,
            modes,
            select,
        } => {
            let search = geocode_search(&config)?;
            let start = LocationResolver::spawn(search.clone(), config.resolver.clone());
            let end = LocationResolver::spawn(search.clone(), config.resolver.clone());

            let (start_location, end_location) =
                futures::join!(resolve(&search, &start, &from), resolve(&search, &end, &to));
            report_location("from", &start_location?);
            report_location("to", &end_location?);

            let client = EcoApiClient::new(config.eco_api.clone())?;
            let session = Arc::new(RoutePlanningSession::new(client));
            let mut form = PlannerForm::new(start, end, Arc::clone(&session));
            if !modes.is_empty() {
                form.set_modes(modes.into_iter().collect::<ModeSet>());
            }

            match form.submit().await? {
                PlanOutcome::Applied => {}
                PlanOutcome::Failed(message) => {
                    eprintln!("{message}");
                    return Ok(ExitCode::FAILURE);
                }
                PlanOutcome::Superseded => return Ok(ExitCode::FAILURE),
            }

            if let Some(mode) = select {
                if !session.select_route(mode).await {
                    eprintln!("no {mode} route in this result; keeping the recommendation");
                }
            }

            let snapshot = session.snapshot().await;
            print!("{}", score_card(&snapshot.selection, snapshot.planned_at)?);
            Ok(ExitCode::SUCCESS)
        }

        Command::Compare { from, to } => {
            let search = geocode_search(&config)?;
            let start = LocationResolver::spawn(search.clone(), config.resolver.clone());
            let end = LocationResolver::spawn(search.clone(), config.resolver.clone());

            let (start_location, end_location) =
                futures::join!(resolve(&search, &start, &from), resolve(&search, &end, &to));
            let (start_location, end_location) = (start_location?, end_location?);

            let client = EcoApiClient::new(config.eco_api.clone())?;
            match client.compare(&start_location, &end_location).await {
                Ok(response) => {
                    print!("{}", ComparisonTemplate::from_response(&response).render()?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("{}", e.user_message());
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

fn geocode_search(config: &ClientConfig) -> Result<GeocodeSearch<CliGeocoder>, BoxError> {
    let client = NominatimClient::new(config.geocoder.clone())?;
    let cached = CachedGeocoder::new(client, &config.geocode_cache);
    Ok(config.geocode_search(cached))
}

/// Wait until the field has finished reacting to its last input.
async fn settle(field: &ResolverHandle) -> Result<FieldSnapshot, BoxError> {
    let mut snapshots = field.subscribe();
    let settled = tokio::time::timeout(
        RESOLVE_TIMEOUT,
        snapshots.wait_for(|s| {
            matches!(
                s.phase,
                Phase::ResultsShown | Phase::Empty | Phase::Resolved
            )
        }),
    )
    .await
    .map_err(|_| "timed out waiting for the geocoder")??;

    Ok(settled.clone())
}

/// Type `text` into `field` and take the first suggestion.
async fn resolve(
    search: &GeocodeSearch<CliGeocoder>,
    field: &ResolverHandle,
    text: &str,
) -> Result<Location, BoxError> {
    if search.classify(text) == QueryKind::TooShort {
        return Err(format!("{text:?} is too short to search for").into());
    }

    field.input(text)?;
    let snapshot = settle(field).await?;

    if snapshot.phase == Phase::ResultsShown {
        field.select(0)?;
        let mut snapshots = field.subscribe();
        tokio::time::timeout(
            RESOLVE_TIMEOUT,
            snapshots.wait_for(|s| s.phase == Phase::Resolved),
        )
        .await
        .map_err(|_| "timed out selecting a suggestion")??;
    }

    field
        .location()
        .ok_or_else(|| format!("no location found for {text:?}").into())
}

fn report_location(label: &str, location: &Location) {
    eprintln!("{label}: {}", location.display_text());
}

fn print_suggestions(results: &[GeocodeResult]) {
    for (i, result) in results.iter().enumerate() {
        println!("{}. {} ({}, {})", i + 1, result.display_name, result.lat, result.lon);
    }
}
