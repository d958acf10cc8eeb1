//! SkillSwap - teach what you know, learn what you don't.
//!
//! Client for a skill-exchange directory: accounts and sessions, profiles,
//! topics, ratings, favorites and connection requests, all kept in a
//! Firebase-style JSON database.
//!
//! - [`skillswap_core`]: data model and validation
//! - [`skillswap_store`]: remote store and authentication clients
//! - [`skillswap_session`]: the signed-in session and its local cache
//! - [`skillswap_app`]: headless screens and the services behind them

pub mod backend;
pub mod config;
pub mod paths;

pub use skillswap_app;
pub use skillswap_core;
pub use skillswap_session;
pub use skillswap_store;

pub use backend::Backend;
pub use config::Settings;
pub use paths::SkillSwapPaths;
