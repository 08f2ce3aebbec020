use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use trip_planner::planner::Router;
use trip_planner::replay::Scenario;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: trip-planner <scenario.json>");
        return ExitCode::from(2);
    };

    let scenario = match Scenario::load(&path) {
        Ok(scenario) => scenario,
        Err(e) => {
            error!(error = %e, "Failed to load scenario");
            return ExitCode::FAILURE;
        }
    };
    info!(
        path,
        itineraries = scenario.itineraries.len(),
        waypoints = scenario.request.intermediate.len(),
        "Loaded scenario"
    );

    let search = scenario.search();
    let router = Router::new(&search, &scenario.search, &scenario.filters);
    let response = match router.route(&scenario.request).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Routing failed");
            return ExitCode::FAILURE;
        }
    };
    info!(
        itineraries = response.itineraries.len(),
        sub_searches = response.sub_searches,
        routing_errors = response.routing_errors.len(),
        "Routed journey"
    );

    match serde_json::to_string_pretty(&response) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Failed to serialize response");
            ExitCode::FAILURE
        }
    }
}
