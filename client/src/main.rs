use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use client::config::AppConfig;
use client::ors::OrsClient;
use client::route::{RouteOutcome, RoutePlanner};
use client::surface::LoggingSurface;
use shared::TransportProfile;

/// Compute a route between two places and print the summary.
#[derive(Debug, Parser)]
#[command(name = "itineraire", version)]
struct Args {
    /// Departure place name.
    start: String,
    /// Arrival place name.
    end: String,
    #[arg(long, value_enum, default_value_t)]
    profile: ProfileArg,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ProfileArg {
    #[default]
    Driving,
    Cycling,
    Walking,
}

impl From<ProfileArg> for TransportProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Driving => TransportProfile::Driving,
            ProfileArg::Cycling => TransportProfile::Cycling,
            ProfileArg::Walking => TransportProfile::Walking,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration: {err}");
            std::process::exit(1);
        }
    };
    let ors = match OrsClient::new(&config) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("client setup: {err}");
            std::process::exit(1);
        }
    };

    let mut planner = RoutePlanner::new(ors.clone(), ors).with_profile(args.profile.into());
    planner.set_start_text(&args.start);
    planner.set_end_text(&args.end);

    let mut surface = LoggingSurface;
    match planner.compute_route(&mut surface).await {
        Ok(RouteOutcome::Computed(stats)) => {
            println!("Distance : {}", stats.distance);
            println!("Durée : {}", stats.duration);
        }
        Ok(RouteOutcome::Skipped) => {}
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
