//! Effect handlers for the shell

use crate::commands::shell::ShellArgs;
use anyhow::Result;
use jotter_app::AppEffects;

/// Handlers backed by the in-memory store, logging in as `--as`.
#[cfg(feature = "development")]
pub fn build(args: &ShellArgs) -> Result<AppEffects> {
    use jotter_core::effects::SystemClock;
    use jotter_testkit::{InMemoryStoreService, ScriptedIdentityProvider};
    use std::sync::Arc;

    tracing::info!(principal = %args.identity, "using in-memory note store");
    let provider = ScriptedIdentityProvider::new().auto_approving(&args.identity);
    Ok(AppEffects {
        identity_provider: Arc::new(provider),
        store_connector: Arc::new(InMemoryStoreService::new()),
        clock: Arc::new(SystemClock),
    })
}

/// No store backend is compiled in without the `development` feature.
#[cfg(not(feature = "development"))]
pub fn build(_args: &ShellArgs) -> Result<AppEffects> {
    anyhow::bail!("no note store backend in this build; rebuild with --features development")
}
