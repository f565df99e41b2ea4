use clap::Args;

use crate::app::Route;
use crate::cli::Exit;
use crate::common::info;
use crate::config::Initializer;
use crate::Result;

/// Navigate to a route and render the resulting screen
#[derive(Args, Debug)]
pub struct VisitCommand {
    /// Route path (e.g. /dashboard, /admin)
    #[arg()]
    pub path: String,
    /// Manual retries on a recoverable dashboard error
    #[arg(long, default_value_t = 0)]
    pub retry: u32,
}

impl VisitCommand {
    pub async fn run(self, initializer: Initializer) -> Result<Exit> {
        let VisitCommand { path, retry } = self;

        let mut app = initializer.app().await?;
        let requested = Route::from_path(&path);
        app.visit(&path).await;

        let mut attempt = 0;
        while attempt < retry
            && app.location() == Route::Dashboard
            && app.screen().error().is_some()
        {
            attempt += 1;
            info!(attempt, "Retry");
            app.retry().await;
        }

        let screen = app.screen();
        print!("{}", screen);

        let sent_to_login = requested != Route::Login && app.location() == Route::Login;
        if screen.session_expired() || sent_to_login {
            Ok(Exit::Unauthenticated)
        } else {
            Ok(Exit::Success)
        }
    }
}
