//! Write actions: `socialsync like|follow|comment|delete-comment|delete-post`.

use anyhow::{Result, bail};
use console::style;
use socialsync::client::DeleteOutcome;
use socialsync::comments::{CommentComposer, SubmitOutcome, delete_comment_by_id};
use socialsync::model::{CommentId, PostId, ToggleTarget, UserId};
use socialsync::posts::delete_post;
use socialsync::toggle::{ToggleController, ToggleOutcome, ToggleSnapshot};
use socialsync::ui::icons::{COMMENT, HEART, PERSON};

use super::CmdContext;

pub async fn cmd_like(ctx: &CmdContext, post: &str, liked: bool, count: u64) -> Result<()> {
    let target = ToggleTarget::Like(PostId::new(post));
    let snapshot = run_toggle(ctx, target, ToggleSnapshot::new(liked, count)).await?;
    let verb = if snapshot.active { "Liked" } else { "Unliked" };
    println!(
        "{}{} post {} ({} {})",
        HEART,
        verb,
        style(post).bold(),
        snapshot.count,
        if snapshot.count == 1 { "like" } else { "likes" }
    );
    Ok(())
}

pub async fn cmd_follow(ctx: &CmdContext, user: &str, following: bool, count: u64) -> Result<()> {
    let target = ToggleTarget::Follow(UserId::new(user));
    let snapshot = run_toggle(ctx, target, ToggleSnapshot::new(following, count)).await?;
    let verb = if snapshot.active { "Following" } else { "Unfollowed" };
    println!(
        "{}{} {} ({} {})",
        PERSON,
        verb,
        style(user).bold(),
        snapshot.count,
        if snapshot.count == 1 { "follower" } else { "followers" }
    );
    Ok(())
}

async fn run_toggle(
    ctx: &CmdContext,
    target: ToggleTarget,
    initial: ToggleSnapshot,
) -> Result<ToggleSnapshot> {
    let controller = ToggleController::new(
        target.clone(),
        initial,
        ctx.client.viewer.clone(),
        ctx.client.backend.clone(),
        ctx.client.notifier.clone(),
    );
    match controller.toggle().await {
        ToggleOutcome::Confirmed(snapshot) => Ok(snapshot),
        ToggleOutcome::RolledBack(_) => bail!("{} was not applied", target),
        ToggleOutcome::SignInRequired => bail!("Not signed in"),
        // A fresh controller has nothing in flight.
        ToggleOutcome::Ignored => bail!("{} is already in progress", target),
    }
}

pub async fn cmd_comment(ctx: &CmdContext, post: &str, text: &str) -> Result<()> {
    let composer = CommentComposer::new(ctx.client.clone(), PostId::new(post));
    composer.set_draft(text);

    match composer.submit().await {
        SubmitOutcome::Posted => {
            println!("{}{}", COMMENT, style(text.trim()).italic());
            Ok(())
        }
        SubmitOutcome::Invalid => bail!("Comment cannot be empty"),
        SubmitOutcome::Failed => bail!("Comment was not posted"),
        SubmitOutcome::SignInRequired => bail!("Not signed in"),
        SubmitOutcome::Busy => bail!("A comment is already being posted"),
    }
}

pub async fn cmd_delete_comment(ctx: &CmdContext, id: &str) -> Result<()> {
    let outcome = delete_comment_by_id(&ctx.client, &CommentId::new(id)).await;
    check_delete(outcome, "comment", id)
}

pub async fn cmd_delete_post(ctx: &CmdContext, id: &str) -> Result<()> {
    let outcome = delete_post(&ctx.client, &PostId::new(id)).await;
    check_delete(outcome, "post", id)
}

fn check_delete(outcome: DeleteOutcome, what: &str, id: &str) -> Result<()> {
    match outcome {
        DeleteOutcome::Deleted => Ok(()),
        DeleteOutcome::SignInRequired => bail!("Not signed in"),
        DeleteOutcome::NotAuthor => bail!("Only the author can delete {} {}", what, id),
        DeleteOutcome::Busy => bail!("{} {} is already being deleted", what, id),
        DeleteOutcome::Failed => bail!("Could not delete {} {}", what, id),
    }
}
