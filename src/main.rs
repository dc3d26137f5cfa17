// Entry point for the blog's background moderation worker.
//
// This file's job is to:
// 1. Load configuration
// 2. Open the database and run migrations
// 3. Initialize services (dependency injection)
// 4. Periodically re-check the comment review queue
//
// Comment submission itself happens inside the web layer's request handlers,
// which call `CommentModerationService::submit_comment` directly.

use aurora_blog::config::AppConfig;
use aurora_blog::core::comments::{CommentModerationService, CommentPolicy};
use aurora_blog::core::users::AccessPolicy;
use aurora_blog::infra::bookmarks::SqliteBookmarkStore;
use aurora_blog::infra::comments::SqliteCommentStore;
use aurora_blog::infra::database;
use aurora_blog::infra::notifications::TracingNotifier;
use aurora_blog::infra::posts::SqlitePostStore;
use aurora_blog::infra::tags::SqliteTagStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;
    tracing::info!(
        database_url = %config.database_url,
        trust_threshold = config.moderation.trust_threshold,
        max_links = config.moderation.max_links,
        "Starting moderation worker"
    );

    // ========================================================================
    // STORAGE
    // ========================================================================
    // All tables live in one SQLite file; each store owns its own migrations.

    let pool = database::connect(&config.database_url).await?;

    let comment_store = SqliteCommentStore::new(pool.clone());
    comment_store.migrate().await?;
    SqlitePostStore::new(pool.clone()).migrate().await?;
    SqliteTagStore::new(pool.clone()).migrate().await?;
    SqliteBookmarkStore::new(pool.clone()).migrate().await?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    let policy = CommentPolicy::new(AccessPolicy::new(config.admin_email.clone()));
    let moderation = CommentModerationService::new(
        comment_store,
        TracingNotifier,
        config.moderation.clone(),
        policy,
    );

    let queued = moderation.review_queue(config.sweep_batch).await?.len();
    tracing::info!(queued, "Review queue loaded");

    // ========================================================================
    // REVIEW SWEEP
    // ========================================================================
    // Promote pending comments whose authors have earned trust since posting.

    moderation
        .run_sweeps(config.sweep_interval, config.sweep_batch, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    tracing::info!("Shutting down");
    pool.close().await;
    Ok(())
}
