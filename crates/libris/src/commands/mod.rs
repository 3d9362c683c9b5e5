//! CLI command handlers.

pub mod admin;
pub mod auth;
pub mod books;
pub mod borrows;

use std::sync::Arc;

use anyhow::Result;
use libris_client::{
    LibrisClient, Paginator, create_memory_session_store, create_session_store,
};
use libris_config::{Environment, ResolvedEnvironment};
use serde::Serialize;

use crate::ui::ConsoleHooks;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Environment chosen on the command line, if any.
    pub env: Option<Environment>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Pick the environment once and snapshot its settings.
    pub fn environment(&self) -> Result<ResolvedEnvironment> {
        let config = libris_config::load_client_config()?;
        let env = config.select(self.env)?;
        Ok(config.resolve(env)?)
    }

    /// Client bound to the persisted session and console hooks.
    pub fn client(&self) -> Result<LibrisClient> {
        let env = self.environment()?;
        let session = match libris_config::session_dir() {
            Some(dir) => create_session_store(&dir),
            None => {
                tracing::warn!("no config directory, session will not persist");
                create_memory_session_store()
            }
        };

        tracing::debug!(env = %env.environment(), base_url = env.base_url(), "client ready");
        Ok(LibrisClient::builder()
            .environment(&env)
            .session_store(session)
            .hooks(Arc::new(ConsoleHooks))
            .build()?)
    }

    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Drive a paginator: one page, or every page with `all`.
pub async fn load_pages<T, F, Fut>(pager: &Paginator<T>, all: bool, mut fetch: F) -> Result<()>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = libris_client::Result<Vec<T>>>,
{
    loop {
        pager.load_next(&mut fetch).await?;
        if !all || !pager.has_more() {
            return Ok(());
        }
    }
}
