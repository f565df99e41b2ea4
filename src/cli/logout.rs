use clap::Args;

use crate::cli::Exit;
use crate::config::Initializer;
use crate::Result;

/// End the current session
#[derive(Args, Debug)]
pub struct LogoutCommand {}

impl LogoutCommand {
    pub async fn run(self, initializer: Initializer) -> Result<Exit> {
        let mut app = initializer.app().await?;
        app.logout().await?;
        println!("Logged out");
        Ok(Exit::Success)
    }
}
