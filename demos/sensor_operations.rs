//! Pauses, inspects and resumes one sensor, then saves its 48 hour graph.
//!
//! Usage: `cargo run --example sensor_operations -- <sensor id>` with the
//! `PRTG_*` variables set as for `show_tree`.

use leeca_prtg::{
    DeleteOutcome, GraphOptions, GraphSize, PrtgClientBuilder, PrtgError, PrtgResult, Registry,
    Sensor, StdinPrompt,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> PrtgResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let sensor_id = std::env::args().nth(1).ok_or_else(|| {
        PrtgError::ResourceNotFound("Usage: sensor_operations <sensor id>".to_string())
    })?;

    let api = PrtgClientBuilder::from_env()?
        .accept_invalid_certs(true)
        .build_api()
        .await?;
    let mut registry = Registry::new();
    let mut sensor = Sensor::fetch(api, &sensor_id, &mut registry).await?;

    println!("\n📡 {}", sensor);
    println!("------------------------");
    for channel in sensor.channels() {
        println!(
            "  #{} {}: {}",
            channel.id(),
            channel.name(),
            channel.last_value_text().unwrap_or("-")
        );
    }

    println!("\n⏸️  Pausing for maintenance...");
    sensor.pause(0, Some("Paused from leeca_prtg demo")).await?;
    println!("Status: {} (raw {})", sensor.status(), sensor.status_raw());

    println!("\n▶️  Resuming...");
    sensor.resume().await?;
    println!("Status: {}", sensor.get_status().await?);

    let interval = sensor.get_property("interval").await?;
    println!("Scanning interval: {}", interval);

    let path = std::env::temp_dir().join(format!("sensor_{}.svg", sensor.id()));
    let options = GraphOptions {
        size: GraphSize::Large,
        ..Default::default()
    };
    let saved = sensor.save_graph(1, &path, &options).await?;
    println!("\n🖼️  Graph saved to {}", saved.display());

    println!("\n🗑️  Delete this sensor?");
    match sensor.delete(Some(&StdinPrompt)).await? {
        DeleteOutcome::Deleted => println!("Deleted"),
        DeleteOutcome::Declined => println!("Kept"),
        DeleteOutcome::Rejected(reason) => println!("{}", reason),
    }

    Ok(())
}
