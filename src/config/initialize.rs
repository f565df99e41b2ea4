use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio::fs;
use tokio::net::TcpListener;

use crate::app::App;
use crate::common::{info, Result};
use crate::config::Config;
use crate::mock::MockServer;
use crate::pipeline::{HttpTransport, RequestPipeline};
use crate::session::SessionContext;
use crate::store::{FileStore, SessionStore};

/// Builds the runtime components from a `Config`.
#[derive(Debug)]
pub struct Initializer {
    pub config: Config,
    listener: Option<TcpListener>,
}

impl Initializer {
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            listener: None,
        }
    }

    pub async fn load_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let f = fs::File::open(path).await?;
        let config = serde_yaml::from_reader::<_, Config>(f.into_std().await)?;

        Ok(Self::from_config(config))
    }

    /// Use an already bound listener instead of binding `mock.listen_addr`.
    pub fn set_listener(&mut self, listener: TcpListener) {
        self.listener = Some(listener);
    }

    pub fn session_store(&self) -> Arc<dyn SessionStore> {
        Arc::new(FileStore::new(self.config.store.dir()))
    }

    pub fn pipeline(&self) -> Result<RequestPipeline> {
        let transport = HttpTransport::new(&self.config.client)?;
        Ok(RequestPipeline::new(Arc::new(transport)))
    }

    pub async fn session_context(&self) -> Result<Arc<SessionContext>> {
        let context = SessionContext::hydrate(self.session_store()).await?;
        Ok(Arc::new(context))
    }

    pub async fn app(&self) -> Result<App> {
        Ok(App::new(self.session_context().await?, self.pipeline()?))
    }

    pub async fn run_mock_server(self, shutdown: impl Future + Send + 'static) -> Result<()> {
        let Initializer { config, listener } = self;

        let listener = match listener {
            Some(listener) => listener,
            None => {
                let addr = config.mock.listen_addr();
                info!(%addr, "Listening");
                TcpListener::bind(addr).await?
            }
        };

        MockServer::new(&config.mock).run(listener, shutdown).await
    }
}
