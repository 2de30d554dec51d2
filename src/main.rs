use std::process::ExitCode;

use log::{error, info};

use feed_client::{export, FeedConfig, FeedSession};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = FeedConfig::from_env();
    let output_path = config.output_path.clone();
    info!("starting feed retrieval from {}", config.server_addr());

    let mut session = FeedSession::new(config);
    if let Err(err) = session.run() {
        error!("feed retrieval failed: {err}");
        return ExitCode::FAILURE;
    }

    session.stats().log_summary();
    if !session.unrecovered_sequences().is_empty() {
        error!(
            "gave up on sequences: {:?}",
            session.unrecovered_sequences()
        );
    }

    // Export failure is reported but the retrieval itself still succeeded.
    let packets = session.into_packets();
    if let Err(err) = export::write_packets_json(&output_path, &packets) {
        error!("export failed: {err}");
    }

    ExitCode::SUCCESS
}
