use std::env;
use std::sync::{Arc, Mutex};

use housing_viability::prettyprint::prettyprint::PrettyFormatter;
use tracing::{error, info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

mod apartment_manager_factory;
mod cli_adapter;

use apartment_manager_factory::ApartmentManagerFactory;
use cli_adapter::{CliAdapter, IN_MEMORY_FLAG, PASSWORD_ENV};

const LOG_FILE: &str = "housing_viability.log";

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing()?;
    setup_panic_hook();

    let args: Vec<String> = env::args().collect();
    let in_memory = args.iter().any(|arg| arg == IN_MEMORY_FLAG);

    info!(in_memory, "Starting housing-viability CLI");

    let manager = ApartmentManagerFactory::create(in_memory).await?;
    let cli_adapter = Arc::new(CliAdapter::new(manager, env::var(PASSWORD_ENV).ok()));

    // Anything besides the store flag is a one-shot command; otherwise read a session.
    let one_shot = args.iter().skip(1).any(|arg| arg != IN_MEMORY_FLAG);
    let result = if one_shot {
        cli_adapter.run(args).await
    } else {
        info!("Reading commands from stdin");
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        cli_adapter
            .run_session(stdin, tokio::io::stdout())
            .await
            .map_err(Into::into)
    };

    match result {
        Ok(_) => {
            info!("CLI execution completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("CLI execution failed: {}", e);
            Err(e)
        }
    }
}

fn setup_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(false))
        .with_writer(std::io::stderr);

    let log_file_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(true))
        .with_writer(Mutex::new(std::fs::File::create(LOG_FILE)?))
        .with_ansi(false);

    Registry::default()
        .with(
            tracing_subscriber::filter::Targets::new()
                .with_target("housing_viability", tracing::Level::INFO),
        )
        .with(log_file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

fn setup_panic_hook() {
    tracing::trace!("Setting panic hook");
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
    }));
}
