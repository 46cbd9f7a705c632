//! Connects to a PRTG server and prints its sensor tree.
//!
//! Reads `PRTG_HOST`, `PRTG_USERNAME`, `PRTG_PASSHASH` (and optionally
//! `PRTG_PORT`, `PRTG_SECURE`, `PRTG_ROOT_ID`) from the environment. Set
//! `RUST_LOG=leeca_prtg=debug` to see every request.

use leeca_prtg::{Device, Group, PrtgClientBuilder, PrtgResult};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> PrtgResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = PrtgClientBuilder::from_env()?
        .accept_invalid_certs(true) // Testing & Self signed certs
        .connect()
        .await?;

    println!("\n🌳 Sensor Tree");
    println!("------------------------");
    println!("{}", client.root());
    for probe in client.probes() {
        print_group(probe, 1);
    }
    for group in client.groups() {
        print_group(group, 1);
    }
    for device in client.devices() {
        print_device(device, 1);
    }

    println!("\n📊 Totals");
    println!("------------------------");
    println!("Objects: {}", client.registry().len());
    println!("Sensors: {}", client.sensors().len());

    Ok(())
}

fn print_group(group: &Group, depth: usize) {
    println!("{}{} [{}]", "  ".repeat(depth), group, group.status());
    for child in group.groups() {
        print_group(child, depth + 1);
    }
    for device in group.devices() {
        print_device(device, depth + 1);
    }
}

fn print_device(device: &Device, depth: usize) {
    println!("{}{} [{}]", "  ".repeat(depth), device, device.status());
    for sensor in device.sensors() {
        println!("{}{} [{}]", "  ".repeat(depth + 1), sensor, sensor.status());
    }
    let down = device.sensors_by_status().get("Down").map_or(0, Vec::len);
    if down > 0 {
        println!("{}⚠️  {} sensor(s) down", "  ".repeat(depth + 1), down);
    }
}
