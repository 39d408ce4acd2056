use anyhow::{Result, bail};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use super::logging::Logging;
use urltitel::channels::{IrcConnection, IrcHost};
use urltitel::config::{Config, ConfigHandle};
use urltitel::pipeline::Pipeline;

/// How often the config file is checked for edits.
const RELOAD_INTERVAL: Duration = Duration::from_secs(2);

/// Connect to every configured network and feed their messages through
/// the pipeline, one at a time, until Ctrl-C.
pub async fn run(config: Config, logging: Logging) -> Result<()> {
    if config.networks.is_empty() {
        bail!(
            "no [[networks]] configured in {}",
            config.config_path.display()
        );
    }

    let handle = ConfigHandle::new(config);
    let config = handle.load_full();
    let pipeline = Pipeline::new(&config)?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let connections: Vec<Arc<IrcConnection>> = config
        .networks
        .iter()
        .map(|network| Arc::new(IrcConnection::new(network.clone(), tx.clone())))
        .collect();
    drop(tx);

    let host = IrcHost::new(connections.clone(), config.url_buffer_file());
    if config.options.urlbuffer
        && let Err(e) = pipeline.url_buffer().get_or_create(&host)
    {
        tracing::warn!(error = %e, "cannot open URL buffer");
    }

    let mut tasks = Vec::with_capacity(connections.len() + 1);
    for conn in &connections {
        let conn = Arc::clone(conn);
        tasks.push(tokio::spawn(async move { conn.run().await }));
    }
    tasks.push(tokio::spawn(handle.clone().watch(
        RELOAD_INTERVAL,
        move |config, changed| {
            if changed.contains(&"debug") {
                logging.set_debug(config.options.debug);
            }
        },
    )));

    tracing::info!(
        networks = connections.len(),
        config = %handle.path().display(),
        "urltitel running"
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("shutting down");
                break;
            }
            event = rx.recv() => {
                let Some(message) = event else { break };
                let config = handle.load_full();
                pipeline.handle(&host, &config, &message).await;
            }
        }
    }

    for conn in &connections {
        conn.quit("urltitel shutting down").await;
    }
    for task in tasks {
        task.abort();
    }
    pipeline.url_buffer().close();
    Ok(())
}
