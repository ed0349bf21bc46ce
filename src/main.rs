mod config;
mod coordinator;
mod display;
mod input;
mod models;
mod observation;
mod utils;

use log::{error, info};

use config::LcdConfig;
use coordinator::Coordinator;
use display::{ConsoleBacklight, ConsoleDisplay};
use input::{InputQueue, Keypad, StdinKeypad};
use models::Button;
use observation::HttpObservationSource;

/// Resolve on Ctrl+C, or on SIGTERM where the platform has it
async fn termination_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => {
                        if let Err(e) = result {
                            error!("Failed to listen for Ctrl+C: {}", e);
                            std::future::pending::<()>().await;
                        }
                    }
                    _ = sigterm.recv() => {}
                }
                return;
            }
            Err(e) => error!("Failed to listen for SIGTERM: {}", e),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match LcdConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    let source = HttpObservationSource::new(config.api_url.clone(), config.timings.fetch_timeout)?;
    let display = ConsoleDisplay::stdout(config.columns, config.rows)?;
    let queue = InputQueue::new(config.queue_capacity);

    let mut coordinator = Coordinator::new(
        display,
        ConsoleBacklight::default(),
        source,
        queue.clone(),
        config.device_address.clone(),
        config.timings,
    )?;

    // Callbacks go in last so every later exit path reaches deregister_all
    let mut keypad = StdinKeypad::new();
    let registered = Button::ALL.into_iter().try_for_each(|button| {
        let queue = queue.clone();
        keypad.register(button, config.debounce, Box::new(move || queue.push(button)))
    });
    if let Err(e) = registered {
        error!("Failed to register keypad: {}", e);
        keypad.deregister_all()?;
        coordinator.shutdown()?;
        return Err(e.into());
    }
    info!("Keys: p=prev n=next s=scroll a=acknowledge (then Enter)");

    // Handle Ctrl+C / SIGTERM gracefully
    let (tx, rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        termination_signal().await;
        let _ = tx.send(());
    });

    let result = coordinator
        .run(async {
            let _ = rx.await;
            info!("Program terminated by user. Exiting gracefully.");
        })
        .await;

    keypad.deregister_all()?;

    match result {
        Ok(()) => {
            info!("Program completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Fatal error: {}", e);
            Err(e.into())
        }
    }
}
