//! `goio_session`: enumerate attached GoIO interfaces and take one averaged
//! reading from a sensor, mirroring the vendor SDK's sample flow.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use goio::config::Settings;
use goio::driver::SensorDriver;
use goio::products::{Product, VERNIER_VENDOR_ID};
use goio::session::SensorSession;

#[derive(Parser)]
#[command(
    name = "goio_session",
    about = "Enumerate GoIO devices and take an averaged sensor reading"
)]
struct Cli {
    /// Path to a TOML settings file.
    #[arg(long)]
    config: Option<String>,

    /// Product family to open for the measurement run.
    #[arg(long, default_value = "GoLink")]
    product: Product,

    /// Use the built-in simulated driver instead of the vendor SDK.
    #[arg(long)]
    mock: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let settings = Settings::new(cli.config.as_deref()).context("loading settings")?;

    #[cfg(feature = "goio_hardware")]
    {
        if !cli.mock {
            let driver = goio::driver::native::NativeDriver::init()?;
            return run(&driver, &settings, cli.product);
        }
    }

    #[cfg(feature = "mock")]
    {
        #[cfg(not(feature = "goio_hardware"))]
        {
            if !cli.mock {
                tracing::warn!("built without goio_hardware; using the simulated driver");
            }
        }
        let driver = demo_driver();
        return run(&driver, &settings, cli.product);
    }

    #[allow(unreachable_code)]
    {
        anyhow::bail!("no sensor driver compiled in; rebuild with --features mock or goio_hardware")
    }
}

/// A simulated Go!Link with a voltage probe attached, for SDK-less runs.
#[cfg(feature = "mock")]
fn demo_driver() -> goio::driver::mock::MockDriver {
    use goio::driver::mock::{MockDevice, MockDriver};

    let samples: Vec<i32> = (0..39i32).map(|i| 2250 + (i % 5)).collect();
    MockDriver::new().with_device(
        MockDevice::new(Product::GoLink, "0xfa140000")
            .with_sensor_number(10)
            .with_raw_samples(samples),
    )
}

fn run<D: SensorDriver>(driver: &D, settings: &Settings, product: Product) -> Result<()> {
    let version = driver.version()?;
    println!("This app is linked to GoIO lib version {version}");

    list_devices(driver)?;

    let count = driver.update_available_devices(VERNIER_VENDOR_ID, product)?;
    if count == 0 {
        println!("no {product}s found");
        return Ok(());
    }
    let name = driver.device_name(VERNIER_VENDOR_ID, product, 0)?;
    println!("{product} found. Enumerated id: {name}");

    let session = SensorSession::open(driver, &name, VERNIER_VENDOR_ID, product)?;
    print!("Sensor id: {}: ", session.sensor_number()?);
    println!("{}", session.long_name()?);

    session.set_measurement_period(settings.measurement_period_s, settings.command_timeout_ms)?;
    session.start_measurements(settings.command_timeout_ms)?;

    // Let the device buffer samples; a coarse fixed delay, not event-driven.
    thread::sleep(Duration::from_millis(settings.settle_time_ms));

    let raw = session.read_raw_measurements(settings.read_capacity)?;
    println!(
        "{} measurements received after about {} second(s).",
        raw.len(),
        settings.settle_time_ms as f64 / 1000.0
    );

    let reading = session.calibrated_reading(&raw)?;
    println!("Average measurement: {reading}");

    session.close()?;
    Ok(())
}

/// Sweeps every product family and reports what is attached.
fn list_devices<D: SensorDriver>(driver: &D) -> Result<()> {
    for product in Product::ALL {
        let count = driver.update_available_devices(VERNIER_VENDOR_ID, product)?;
        if count == 0 {
            println!("no {product}s found");
            continue;
        }
        for index in 0..count {
            let name = driver.device_name(VERNIER_VENDOR_ID, product, index)?;
            println!("{product} device found. Enumerated id: {name}");
        }
    }
    Ok(())
}
