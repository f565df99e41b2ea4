use clap::Args;

use crate::cli::Exit;
use crate::config::Initializer;
use crate::Result;

/// Exchange credentials for a session
#[derive(Args, Debug)]
pub struct LoginCommand {
    /// Username
    #[arg(long, short = 'u', env = "SESSIONGATE_USERNAME")]
    username: String,
    /// Password
    #[arg(long, short = 'p', env = "SESSIONGATE_PASSWORD", hide_env_values = true)]
    password: String,
}

impl LoginCommand {
    pub async fn run(self, initializer: Initializer) -> Result<Exit> {
        let LoginCommand { username, password } = self;

        let mut app = initializer.app().await?;
        let screen = app.login(&username, &password).await?;

        match screen.error() {
            // Rejected logins stay on the form.
            Some(message) if screen.route().is_public() => {
                eprintln!("{}", message);
                Ok(Exit::Unauthenticated)
            }
            _ => {
                print!("{}", screen);
                Ok(Exit::Success)
            }
        }
    }
}
