//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module     | Commands handled                                         |
//! |------------|----------------------------------------------------------|
//! | `interact` | `Like`, `Follow`, `Comment`, `DeleteComment`, `DeletePost` |
//! | `lists`    | `Followers`, `Following`, `Likers`, `Posts`, `Search`    |
//! | `config`   | `Config`                                                 |

pub mod config;
pub mod interact;
pub mod lists;

use std::sync::Arc;

use anyhow::Result;
use socialsync::client::Client;
use socialsync::config::Config;
use socialsync::remote::{HttpBackend, InMemoryBackend, SharedBackend};
use socialsync::session::Viewer;
use socialsync::ui::ConsoleNotifier;

use crate::Cli;

pub use config::cmd_config;
pub use interact::{cmd_comment, cmd_delete_comment, cmd_delete_post, cmd_follow, cmd_like};
pub use lists::{cmd_likers, cmd_posts, cmd_relation, cmd_search};

/// Everything a command needs: the client handle and the resolved config.
pub struct CmdContext {
    pub client: Client,
    pub config: Config,
}

impl CmdContext {
    pub fn new(cli: &Cli, config: Config) -> Result<Self> {
        let user = cli
            .user
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty());
        let viewer = match user {
            Some(id) => Viewer::signed_in(id, id),
            None => Viewer::Anonymous,
        };

        let backend: SharedBackend = if cli.offline {
            tracing::debug!("using in-memory backend");
            let memory = InMemoryBackend::new();
            match user {
                Some(id) => Arc::new(memory.acting_as(id)),
                None => Arc::new(memory),
            }
        } else {
            tracing::debug!(base_url = %config.remote.base_url, "using HTTP backend");
            Arc::new(HttpBackend::new(&config.remote)?)
        };

        Ok(Self {
            client: Client::new(viewer, backend, Arc::new(ConsoleNotifier)),
            config,
        })
    }
}
