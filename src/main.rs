//! LED Cube Clock
//!
//! Drives a 4×4×4 LED cube as an analog clock. The clock mode can be chosen
//! on the command line or switched at any time over HTTP from any device on
//! the LAN.
//!
//! ## Architecture
//! - **Render thread** (std::thread): owns the cube, renders one frame per tick
//! - **HTTP server** (tokio/axum): accepts API requests, sends commands via channel
//!
//! ## Rust concepts
//! - `#[tokio::main]` on a helper so headless runs never start a runtime
//! - `std::thread::spawn` for the render thread
//! - `std::sync::mpsc` channel between async and sync worlds
//! - Dropping the last `Sender` to tell the render thread to shut down
//!
//! ## Usage
//! ```sh
//! ./target/release/led-cube-clock --port 8080 --mode paddle-clock
//! ./target/release/led-cube-clock --headless --mode plane-clock
//! ```

use clap::Parser;
use led_cube_clock::clock::ClockMode;
use led_cube_clock::gadget::VirtualCube;
use led_cube_clock::render::{ClockStatus, RenderCommand, RenderResult, render_loop};
use led_cube_clock::server::{self, AppState};
use led_cube_clock::{TimingConfig, is_running, setup_signal_handler};
use std::error::Error;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// How often headless mode checks for Ctrl+C.
const HEADLESS_POLL: Duration = Duration::from_millis(100);

/// LED Cube Clock
#[derive(Parser)]
#[command(name = "led-cube-clock")]
#[command(about = "Analog clock animations for a 4x4x4 RGB LED cube")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Clock mode to start with (idle until chosen over HTTP otherwise)
    #[arg(long, value_enum)]
    mode: Option<ClockMode>,

    /// Display brightness (0-100)
    #[arg(long, default_value_t = 75, value_parser = clap::value_parser!(u8).range(0..=100))]
    brightness: u8,

    /// Render ticks per second; the sub-tick advances once per frame sent
    #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(u32).range(1..))]
    tick_hz: u32,

    /// Upper bound on frames sent to the cube per second
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..))]
    max_fps: u32,

    /// Run without the HTTP server; Ctrl+C to quit
    #[arg(long, requires = "mode")]
    headless: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_ansi(false) // Disable ANSI color codes for systemd/journald
        .compact()
        .init();

    let timing = TimingConfig::new(args.tick_hz, args.max_fps);

    tracing::info!("LED Cube Clock v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Timing: {} Hz ticks, at most {} fps",
        timing.tick_hz,
        timing.max_fps
    );
    tracing::info!("Brightness: {}", args.brightness);
    if let Some(mode) = args.mode {
        tracing::info!("Initial mode: {:?}", mode);
    }

    // Create the channel for sending commands to the render thread.
    let (tx, rx) = mpsc::channel();

    // Shared clock status — render thread writes, HTTP handlers read.
    let mut initial = ClockStatus::new(args.brightness);
    initial.mode = args.mode;
    let status = Arc::new(Mutex::new(initial));

    // Spawn the render thread. It owns the cube for its whole lifetime.
    let render_status = status.clone();
    let render_handle = thread::Builder::new()
        .name("render".to_string())
        .spawn(move || {
            let mut cube = VirtualCube::new();
            render_loop(rx, render_status, &mut cube, timing)
        })?;

    if args.headless {
        run_headless(tx, &render_handle)?;
    } else {
        let app_state = AppState {
            command_tx: tx,
            status,
        };
        serve(args.port, app_state)?;
    }

    // Every sender is gone now; the render thread logs out and returns.
    // A failed login surfaces here as a non-zero exit.
    let result = render_handle
        .join()
        .map_err(|_| "render thread panicked")?;
    result.map_err(|e| e as Box<dyn Error>)?;
    tracing::info!("Shut down cleanly.");

    Ok(())
}

/// Keep the clock running until Ctrl+C or until the render thread gives up.
fn run_headless(
    tx: Sender<RenderCommand>,
    render_handle: &thread::JoinHandle<RenderResult>,
) -> Result<(), Box<dyn Error>> {
    let running = setup_signal_handler()?;
    tracing::info!("Running headless. Press Ctrl+C to quit.");

    while is_running(&running) && !render_handle.is_finished() {
        thread::sleep(HEADLESS_POLL);
    }

    drop(tx);
    Ok(())
}

/// Serve the HTTP API until Ctrl+C.
#[tokio::main(flavor = "current_thread")]
async fn serve(port: u16, app_state: AppState) -> Result<(), Box<dyn Error>> {
    let app = server::create_router(app_state);

    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("API Documentation: http://localhost:{}/docs", port);
    tracing::info!("Try: curl http://localhost:{}/api/v1/status", port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // The router (and the command sender inside it) is dropped when this returns
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Could not listen for Ctrl+C: {}", e);
        // Without a signal there is nothing to wait for; keep serving.
        std::future::pending::<()>().await;
    }
    tracing::info!("Ctrl+C received, shutting down.");
}
