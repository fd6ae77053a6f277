//! Serve Command
//!
//! Start the HTTP API.

use std::sync::Arc;

use crate::cli::Output;
use crate::config::Config;
use crate::server::{self, AppState};
use crate::types::Result;

pub async fn run(config: &Config, out: &Output) -> Result<()> {
    let state = AppState::from_config(config)?;
    out.info(&format!(
        "Serving on http://{}:{} (Ctrl-C to stop)",
        config.server.host, config.server.port
    ));
    server::serve(&config.server, Arc::new(state)).await
}
