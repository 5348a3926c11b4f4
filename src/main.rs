use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::Parser;
use delivery_run::config::{PlannerConfig, ACCESS_TOKEN_VAR};
use delivery_run::models::{DeliveryRecord, RunSummary};
use delivery_run::services::{
    Depot, InMemoryGeocodeCache, MapboxDirections, MapboxGeocoder, RunPlanner,
};
use delivery_run::utils::plot::render_run;
use delivery_run::utils::records::{Courier, JsonRecordSource, RecordSource};
use delivery_run::utils::sample::generate_records;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn,delivery_run=info";

#[derive(Debug, Parser)]
#[command(
    name = "delivery-run",
    version,
    about = "Plan a courier's daily delivery run"
)]
struct Cli {
    /// JSON file with couriers and deliveries
    #[arg(long, required_unless_present = "sample")]
    data: Option<PathBuf>,

    /// Courier (postman) identifier
    #[arg(long, required_unless_present = "sample")]
    courier: Option<String>,

    /// Delivery date, YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Plan a generated run of this many deliveries instead of reading --data
    #[arg(long, conflicts_with_all = ["data", "courier"])]
    sample: Option<usize>,

    /// Post office used with --sample
    #[arg(long, default_value = "Andrews Ganj")]
    post_office: String,

    /// Optional JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a PNG route map here
    #[arg(long)]
    plot: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter())
        .init();

    let cli = Cli::parse();
    let config = PlannerConfig::load(cli.config.as_deref()).context("loading config")?;
    if config.geocoder.access_token.is_empty() {
        bail!("{} must be set", ACCESS_TOKEN_VAR);
    }

    let date = cli
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let (courier, records) = load_records(&cli, date)?;

    let timeout = config.request_timeout();
    let geocoder = MapboxGeocoder::new(&config.geocoder, timeout).context("geocoding client")?;
    let directions = MapboxDirections::new(&config.routing, timeout).context("directions client")?;
    let depot = Depot::Address(format!("{}, New Delhi, India", courier.post_office));

    let planner = RunPlanner::new(&config, Arc::new(geocoder), Arc::new(directions), depot)
        .context("building planner")?
        .with_cache(Arc::new(InMemoryGeocodeCache::new()));

    let token = CancellationToken::new();
    let on_signal = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let summary = planner
        .build_schedule_cancellable(&records, &token)
        .await
        .context("planning run")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary_json(&summary))?);
    } else {
        print_schedule(&courier, date, &summary);
    }

    if let Some(path) = &cli.plot {
        if summary.is_empty() {
            warn!("no stops to plot");
        } else {
            render_run(&summary, path)
                .map_err(|e| anyhow::anyhow!("{}", e))
                .with_context(|| format!("rendering {}", path.display()))?;
            info!("route map saved to {}", path.display());
        }
    }

    Ok(())
}

/// `RUST_LOG` when set, otherwise warnings plus this crate's progress
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn load_records(cli: &Cli, date: NaiveDate) -> Result<(Courier, Vec<DeliveryRecord>)> {
    if let Some(count) = cli.sample {
        let courier = Courier {
            courier_id: "SAMPLE".to_string(),
            name: "Sample courier".to_string(),
            phone: String::new(),
            post_office: cli.post_office.clone(),
        };
        let seed = date.num_days_from_ce() as u64;
        return Ok((courier, generate_records(seed, count)));
    }

    let (Some(data), Some(courier_id)) = (&cli.data, &cli.courier) else {
        bail!("--data and --courier are required unless --sample is given");
    };
    let assignment = JsonRecordSource::new(data)
        .fetch(courier_id, date)
        .with_context(|| format!("fetching deliveries from {}", data.display()))?;

    Ok((assignment.courier, assignment.records))
}

fn print_schedule(courier: &Courier, date: NaiveDate, summary: &RunSummary) {
    println!("Postman: {} ({})", courier.name, courier.courier_id);
    if !courier.phone.is_empty() {
        println!("Phone: {}", courier.phone);
    }
    println!("Post office: {}", courier.post_office);
    println!("Date: {}", date);
    println!();

    if summary.is_empty() {
        println!("No deliveries found for the given date.");
    }

    for (i, stop) in summary.stops.iter().enumerate() {
        let record = &stop.record;
        println!("Stop {}", i + 1);
        println!("  Booking ID: {}", record.id);
        println!("  Receiver:   {}", record.receiver_name);
        if let Some(phone) = &record.receiver_phone {
            println!("  Phone:      {}", phone);
        }
        println!("  Address:    {}", record.receiver_address);
        if stop.is_shifted() {
            println!(
                "  Time slot:  {} (declared {})",
                stop.window, stop.original_window
            );
        } else {
            println!("  Time slot:  {}", stop.window);
        }
        println!("  Equipment:  {}", record.equipment);
        println!("  Status:     {}", record.status);
    }

    if summary.is_depot_approximate() {
        println!();
        println!(
            "Post office location could not be resolved; the run starts from an approximate point."
        );
    }

    let approximate: Vec<_> = summary.low_confidence_stops().collect();
    if !approximate.is_empty() {
        println!();
        println!("The following addresses were approximated:");
        for (i, stop) in approximate {
            println!("  Stop {}: {}", i + 1, stop.record.receiver_address);
        }
    }

    if !summary.rejected.is_empty() {
        println!();
        println!("Excluded from the schedule:");
        for rejected in &summary.rejected {
            println!("  {}: {}", rejected.record.id, rejected.error);
        }
    }

    if summary.is_partial() {
        println!();
        println!(
            "Route incomplete, {} of {} segments missing:",
            summary.missing_segments.len(),
            summary.expected_segment_count()
        );
        for failure in &summary.missing_segments {
            println!("  Segment {}: {}", failure.index + 1, failure.reason);
        }
    }

    if !summary.is_empty() {
        let (hours, minutes) = summary.totals.duration_hm();
        println!();
        println!("Estimated duration: {}h {}m", hours, minutes);
        println!("Total distance:     {:.1} km", summary.totals.distance_km());
        println!("Total stops:        {}", summary.stops.len());
    }
}

fn summary_json(summary: &RunSummary) -> serde_json::Value {
    let stops: Vec<_> = summary
        .stops
        .iter()
        .enumerate()
        .map(|(i, stop)| {
            json!({
                "stop": i + 1,
                "booking_id": stop.record.id,
                "receiver_name": stop.record.receiver_name,
                "receiver_phone": stop.record.receiver_phone,
                "receiver_address": stop.record.receiver_address,
                "time_slot": stop.window.to_string(),
                "declared_time_slot": stop.original_window.to_string(),
                "equipment": stop.record.equipment,
                "status": stop.record.status,
                "coordinate": stop.coordinate,
                "geocode": stop.geocode,
            })
        })
        .collect();

    let rejected: Vec<_> = summary
        .rejected
        .iter()
        .map(|r| json!({ "booking_id": r.record.id, "error": r.error.to_string() }))
        .collect();

    let missing: Vec<_> = summary
        .missing_segments
        .iter()
        .map(|f| json!({ "segment": f.index + 1, "reason": f.reason.to_string() }))
        .collect();

    let (hours, minutes) = summary.totals.duration_hm();
    json!({
        "depot": summary.depot,
        "depot_geocode": summary.depot_geocode,
        "depot_approximate": summary.is_depot_approximate(),
        "stops": stops,
        "rejected": rejected,
        "missing_segments": missing,
        "partial": summary.is_partial(),
        "total_distance_km": (summary.totals.distance_km() * 10.0).round() / 10.0,
        "total_duration": format!("{}h {}m", hours, minutes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_default_filter_keeps_warnings_visible() {
        let filter: EnvFilter = DEFAULT_LOG_FILTER.parse().unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }
}
