use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use picodash::config::Config;
use picodash::sensor::{SensorState, Simulator};
use picodash::server::Server;

static SENSORS: SensorState = SensorState::new();

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let mut server: Server<'static> = Server::new(cfg.server.clone(), &SENSORS);
    let addr = server.init()?;
    tracing::info!("Dashboard at http://{}", addr);

    let stop = Arc::new(AtomicBool::new(false));
    let mut main_loop = tokio::task::spawn_blocking({
        let stop = Arc::clone(&stop);
        move || {
            let mut simulator = Simulator::new(&cfg.sampler);
            let interval = cfg.server.poll_interval();

            while !stop.load(Ordering::Relaxed) {
                simulator.sample(&SENSORS);
                server.poll();
                std::thread::sleep(interval);
            }

            server.shutdown();
        }
    });

    tokio::select! {
        res = &mut main_loop => {
            res?;
            return Ok(());
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    stop.store(true, Ordering::Relaxed);
    main_loop.await?;

    Ok(())
}
