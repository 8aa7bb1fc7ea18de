use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "socialsync")]
#[command(version, about = "Optimistic likes, follows and relation lists for a social feed")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to socialsync.toml. Defaults to .socialsync/socialsync.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Use an empty in-memory backend instead of the HTTP API
    #[arg(long, global = true)]
    pub offline: bool,

    /// Act as this signed-in user id
    #[arg(long, global = true, env = "SOCIALSYNC_USER")]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Like or unlike a post
    Like {
        post: String,
        /// The post is currently liked by you
        #[arg(long)]
        liked: bool,
        /// Current like count
        #[arg(long, default_value = "0")]
        count: u64,
    },
    /// Follow or unfollow a user
    Follow {
        user: String,
        /// You currently follow this user
        #[arg(long)]
        following: bool,
        /// Current follower count
        #[arg(long, default_value = "0")]
        count: u64,
    },
    /// List a user's followers
    Followers { user: String },
    /// List the users someone follows
    Following { user: String },
    /// Show who liked a post
    Likers {
        post: String,
        /// Leave this user out of the list
        #[arg(long)]
        viewer: Option<String>,
    },
    /// List a user's posts, or the posts they liked
    Posts {
        user: String,
        /// Show liked posts instead
        #[arg(long)]
        liked: bool,
    },
    /// Search users by name or username
    Search { query: String },
    /// Comment on a post
    Comment { post: String, text: String },
    /// Delete one of your comments
    DeleteComment { id: String },
    /// Delete one of your posts
    DeletePost { id: String },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default socialsync.toml file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    if let Commands::Config { command } = &cli.command {
        return cmd::cmd_config(&project_dir, cli.config.as_deref(), command.clone());
    }

    let config = socialsync::config::Config::load(&project_dir, cli.config.as_deref())?;
    socialsync::telemetry::init(&config.logging, cli.verbose);
    let ctx = cmd::CmdContext::new(&cli, config)?;

    match &cli.command {
        Commands::Like { post, liked, count } => cmd::cmd_like(&ctx, post, *liked, *count).await,
        Commands::Follow {
            user,
            following,
            count,
        } => cmd::cmd_follow(&ctx, user, *following, *count).await,
        Commands::Followers { user } => {
            cmd::cmd_relation(&ctx, socialsync::model::RelationKind::Followers, user).await
        }
        Commands::Following { user } => {
            cmd::cmd_relation(&ctx, socialsync::model::RelationKind::Following, user).await
        }
        Commands::Likers { post, viewer } => cmd::cmd_likers(&ctx, post, viewer.as_deref()).await,
        Commands::Posts { user, liked } => cmd::cmd_posts(&ctx, user, *liked).await,
        Commands::Search { query } => cmd::cmd_search(&ctx, query).await,
        Commands::Comment { post, text } => cmd::cmd_comment(&ctx, post, text).await,
        Commands::DeleteComment { id } => cmd::cmd_delete_comment(&ctx, id).await,
        Commands::DeletePost { id } => cmd::cmd_delete_post(&ctx, id).await,
        Commands::Config { .. } => Ok(()),
    }
}
