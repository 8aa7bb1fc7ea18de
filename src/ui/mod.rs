//! Terminal rendering for the command-line front end.

pub mod icons;

use console::style;

use crate::notify::{Notice, Notifier};
use crate::relations::RelationItem;
use crate::search::SearchItem;
use icons::{CHECK, CROSS, LOCK, PERSON};

/// Prints notices to stdout as they arrive.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        println!("{}", render_notice(&notice));
    }
}

pub fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::Success(msg) => format!("{}{}", CHECK, style(msg).green()),
        Notice::Error(msg) => format!("{}{}", CROSS, style(msg).red()),
        Notice::SignInPrompt => format!(
            "{}{}",
            LOCK,
            style("Sign in to continue (pass --user or set SOCIALSYNC_USER)").yellow()
        ),
    }
}

pub fn render_relation_item(item: &RelationItem) -> String {
    format!(
        "{}{} {}",
        PERSON,
        style(&item.display_name).bold(),
        style(&item.handle).dim()
    )
}

pub fn render_search_item(item: &SearchItem) -> String {
    format!(
        "{}{} {}  {}",
        PERSON,
        style(&item.name).bold(),
        style(&item.handle).dim(),
        style(&item.href).cyan()
    )
}
