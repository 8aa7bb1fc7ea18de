//! Read-only listings: `socialsync followers|following|likers|posts|search`.

use anyhow::Result;
use chrono::Utc;
use console::style;
use socialsync::model::{PostId, RelationKind, UserId};
use socialsync::profile::{PostTabLoader, ProfileTab, TabPanel};
use socialsync::relations::{RelationLoader, RelationPanel};
use socialsync::search::{SearchPanel, UserSearch};
use socialsync::ui::icons::{COMMENT, HEART, SEARCH};
use socialsync::ui::{render_relation_item, render_search_item};

use super::CmdContext;

pub async fn cmd_relation(ctx: &CmdContext, kind: RelationKind, user: &str) -> Result<()> {
    let loader = ctx.client.relation_loader(kind, user);
    print_relation(&loader, user).await;
    Ok(())
}

/// `--viewer` overrides the signed-in user as the one left out of the list.
pub async fn cmd_likers(ctx: &CmdContext, post: &str, viewer: Option<&str>) -> Result<()> {
    let loader = match viewer {
        Some(id) => RelationLoader::new(RelationKind::Likers, post, ctx.client.backend.clone())
            .excluding(Some(UserId::new(id))),
        None => ctx.client.likers(&PostId::new(post)),
    };
    print_relation(&loader, post).await;
    if let Some(line) = loader.liked_by_text() {
        println!();
        println!("{}", style(line).dim());
    }
    Ok(())
}

async fn print_relation(loader: &RelationLoader, owner: &str) {
    loader.open().await;

    println!();
    println!("{} · {}", style(loader.kind().title()).bold(), owner);
    println!();
    match loader.panel() {
        RelationPanel::Items(items) => {
            for item in &items {
                println!("  {}", render_relation_item(item));
            }
        }
        RelationPanel::EmptyMessage(msg) => println!("  {}", msg),
        RelationPanel::Hidden | RelationPanel::Placeholder => {}
    }
}

pub async fn cmd_posts(ctx: &CmdContext, user: &str, liked: bool) -> Result<()> {
    let tab = if liked { ProfileTab::Likes } else { ProfileTab::Posts };
    let loader = PostTabLoader::new(ctx.client.clone(), tab, UserId::new(user));
    loader.open().await;

    println!();
    println!("{} · {}", style(tab.label()).bold(), user);
    println!();
    match loader.panel() {
        TabPanel::Posts(cards) => {
            let now = Utc::now();
            for card in &cards {
                let post = card.post();
                println!(
                    "  {} {}",
                    style(post.author.display_name()).bold(),
                    style(card.age(now)).dim()
                );
                println!("  {}", post.content);
                println!(
                    "  {}{}  {}{}",
                    HEART,
                    card.likes().count,
                    COMMENT,
                    card.comment_count()
                );
                println!();
            }
        }
        TabPanel::EmptyMessage(msg) => println!("  {}", msg),
        TabPanel::Hidden | TabPanel::Placeholder => {}
    }
    Ok(())
}

pub async fn cmd_search(ctx: &CmdContext, query: &str) -> Result<()> {
    let search = UserSearch::new(ctx.client.backend.clone(), ctx.config.search.debounce());
    search.input(query).await;

    println!("{}{}", SEARCH, style(search.query()).bold());
    match search.panel() {
        SearchPanel::Items(items) => {
            for item in &items {
                println!("  {}", render_search_item(item));
            }
        }
        SearchPanel::EmptyMessage(msg) => println!("  {}", msg),
        SearchPanel::Placeholder => {}
    }
    Ok(())
}
