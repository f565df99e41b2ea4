use clap::Args;

use crate::cli::Exit;
use crate::config::{Config, Initializer};
use crate::mock::Scenario;
use crate::Result;

/// Run the mock identity service over http
#[derive(Args, Debug)]
pub struct MockServerCommand {
    /// Http binding address host
    #[arg(long, env = "SESSIONGATE_MOCK_HOST")]
    bind_host: Option<String>,
    /// Http binding address port
    #[arg(long, env = "SESSIONGATE_MOCK_PORT")]
    bind_port: Option<String>,
    /// Scenario served at startup (success, invalid_password, token_expired, server_error, forbidden)
    #[arg(long)]
    scenario: Option<Scenario>,
    /// Delay applied to every response
    #[arg(long)]
    delay_milliseconds: Option<u64>,
}

impl MockServerCommand {
    pub async fn run(self, mut initializer: Initializer) -> Result<Exit> {
        let MockServerCommand {
            mut bind_host,
            mut bind_port,
            scenario,
            delay_milliseconds,
        } = self;

        let mut flags = Config::default();
        flags.mock.set_listen_host(&mut bind_host);
        flags.mock.set_listen_port(&mut bind_port);
        flags.mock.set_scenario(scenario);
        flags.mock.set_delay_milliseconds(delay_milliseconds);
        initializer.config.override_merge(&mut flags);

        initializer
            .run_mock_server(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await?;

        Ok(Exit::Success)
    }
}
