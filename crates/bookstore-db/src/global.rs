//! The process-wide session factory.
//!
//! The factory is built on first [`init`] and reused for the rest of the
//! process. [`shutdown`] closes it; it is never rebuilt afterwards.

use std::sync::OnceLock;

use bookstore_common::{Config, Error, Result};

use crate::session::SessionFactory;

static SESSION_FACTORY: OnceLock<SessionFactory> = OnceLock::new();

/// Build the process-wide factory, or return the one already built.
///
/// `config` is only consulted by the first successful call.
pub fn init(config: &Config) -> Result<&'static SessionFactory> {
    if let Some(factory) = SESSION_FACTORY.get() {
        return Ok(factory);
    }

    let factory = SessionFactory::build(config).inspect_err(|e| {
        tracing::error!("Initial SessionFactory creation failed: {}", e);
    })?;

    Ok(SESSION_FACTORY.get_or_init(|| factory))
}

/// The process-wide factory, if [`init`] has run.
pub fn session_factory() -> Result<&'static SessionFactory> {
    SESSION_FACTORY
        .get()
        .ok_or_else(|| Error::config("session factory has not been initialized"))
}

/// Close the process-wide factory. Does nothing if it was never built.
pub fn shutdown() -> Result<()> {
    match SESSION_FACTORY.get() {
        Some(factory) => factory.close(),
        None => Ok(()),
    }
}
