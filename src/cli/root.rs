use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::cli::{login, logout, mock_server, status, visit, Exit};
use crate::common::debug;
use crate::config::{Config, Initializer};
use crate::Result;

/// Sessiongate command
#[derive(Parser, Debug)]
#[command(version, propagate_version = true, subcommand_required = true)]
pub struct SessiongateCommand {
    /// Global options
    #[command(flatten)]
    pub global: GlobalOptions,
    /// Subcommand
    #[command(subcommand)]
    pub command: Command,
}

/// Global options
#[derive(Args, Debug)]
pub struct GlobalOptions {
    /// Configuration file path
    #[arg(long, short = 'C', env = "SESSIONGATE_CONFIG", global = true)]
    pub config: Option<PathBuf>,
    /// Identity service base url
    #[arg(long, env = "SESSIONGATE_BASE_URL", global = true)]
    pub base_url: Option<String>,
    /// Directory where the session is persisted
    #[arg(long, env = "SESSIONGATE_STORE_DIR", global = true)]
    pub store_dir: Option<PathBuf>,
}

impl GlobalOptions {
    /// Load the configuration file if any, then apply command line overrides.
    pub async fn initializer(self) -> Result<Initializer> {
        let GlobalOptions {
            config,
            mut base_url,
            mut store_dir,
        } = self;

        let mut initializer = match config {
            Some(path) => Initializer::load_config_file(path).await?,
            None => Initializer::from_config(Config::default()),
        };

        let mut flags = Config::default();
        flags.client.set_base_url(&mut base_url);
        flags.store.set_dir(&mut store_dir);
        initializer.config.override_merge(&mut flags);

        debug!("{:?}", initializer);

        Ok(initializer)
    }
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Exchange credentials for a session
    Login(login::LoginCommand),
    /// End the current session
    Logout(logout::LogoutCommand),
    /// Show the persisted session
    Status(status::StatusCommand),
    /// Navigate to a route and render it
    Visit(visit::VisitCommand),
    /// Run the mock identity service
    MockServer(mock_server::MockServerCommand),
}

impl SessiongateCommand {
    pub async fn run(self) -> Result<Exit> {
        let SessiongateCommand { global, command } = self;
        let initializer = global.initializer().await?;

        match command {
            Command::Login(login) => login.run(initializer).await,
            Command::Logout(logout) => logout.run(initializer).await,
            Command::Status(status) => status.run(initializer).await,
            Command::Visit(visit) => visit.run(initializer).await,
            Command::MockServer(mock_server) => mock_server.run(initializer).await,
        }
    }
}

/// Parse command line args
pub fn parse() -> SessiongateCommand {
    SessiongateCommand::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_command() {
        SessiongateCommand::command().debug_assert();
    }

    #[test]
    fn parse_visit_with_global_flags() {
        let cmd = SessiongateCommand::try_parse_from([
            "sessiongate",
            "visit",
            "/dashboard",
            "--retry",
            "2",
            "--store-dir",
            "/tmp/sg",
        ])
        .unwrap();

        assert_eq!(cmd.global.store_dir, Some(PathBuf::from("/tmp/sg")));
        match cmd.command {
            Command::Visit(visit) => {
                assert_eq!(visit.path, "/dashboard");
                assert_eq!(visit.retry, 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parse_mock_server_scenario() {
        let cmd = SessiongateCommand::try_parse_from([
            "sessiongate",
            "mock-server",
            "--scenario",
            "token_expired",
        ]);
        assert!(cmd.is_ok());

        let cmd = SessiongateCommand::try_parse_from([
            "sessiongate",
            "mock-server",
            "--scenario",
            "nope",
        ]);
        assert!(cmd.is_err());
    }
}
