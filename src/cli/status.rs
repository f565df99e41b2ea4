use clap::Args;

use crate::cli::Exit;
use crate::config::Initializer;
use crate::Result;

/// Show the persisted session without contacting the identity service
#[derive(Args, Debug)]
pub struct StatusCommand {}

impl StatusCommand {
    pub async fn run(self, initializer: Initializer) -> Result<Exit> {
        let session = initializer.session_store().read().await?;

        match (session.token(), session.identity()) {
            (Some(_), Some(identity)) => {
                println!("Logged in as {} ({})", identity.username(), identity.role());
                Ok(Exit::Success)
            }
            (Some(token), None) => {
                println!("Token present {:?}, identity unknown", token);
                Ok(Exit::Success)
            }
            _ => {
                println!("Not logged in");
                Ok(Exit::Unauthenticated)
            }
        }
    }
}
