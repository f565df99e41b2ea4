use std::path::PathBuf;

use serde::Deserialize;

use crate::mock::server;
use crate::pipeline::http;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub client: http::Config,
    pub store: StoreConfig,
    pub mock: server::Config,
}

impl Config {
    pub fn override_merge(&mut self, other: &mut Config) {
        self.client.override_merge(&mut other.client);
        self.store.override_merge(&mut other.store);
        self.mock.override_merge(&mut other.mock);
    }
}

// Session store configuration.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct StoreConfig {
    // Directory holding one file per session key.
    dir: Option<PathBuf>,
}

impl StoreConfig {
    const DEFAULT_DIR: &'static str = ".sessiongate";

    pub fn set_dir(&mut self, val: &mut Option<PathBuf>) {
        if let Some(val) = val.take() {
            self.dir = Some(val)
        }
    }

    pub(crate) fn override_merge(&mut self, other: &mut StoreConfig) {
        self.set_dir(&mut other.dir);
    }

    pub fn dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(StoreConfig::DEFAULT_DIR))
    }
}
