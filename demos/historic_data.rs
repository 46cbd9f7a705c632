//! Prints the last day of historic readings of one object as JSON.
//!
//! Usage: `cargo run --example historic_data -- <object id>` with the
//! `PRTG_*` variables set as for `show_tree`.

use chrono::{Duration, Local};
use leeca_prtg::{HistoricDataFetcher, PrtgClientBuilder, PrtgError, PrtgResult};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> PrtgResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let object_id = std::env::args().nth(1).ok_or_else(|| {
        PrtgError::ResourceNotFound("Usage: historic_data <object id>".to_string())
    })?;

    let api = PrtgClientBuilder::from_env()?
        .accept_invalid_certs(true)
        .build_api()
        .await?;

    let end = Local::now().naive_local();
    let start = end - Duration::days(1);
    let data = HistoricDataFetcher::new(api)
        .fetch(&object_id, start, end, 3600)
        .await?;

    println!("\n📈 {} hourly rows for object {}", data.len(), object_id);
    println!("------------------------");
    match serde_json::to_string_pretty(&data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to render JSON: {}", e),
    }

    Ok(())
}
