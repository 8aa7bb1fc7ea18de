//! Emoji used in command output, with plain fallbacks for dumb terminals.

use console::Emoji;

// Notices
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static LOCK: Emoji<'_, '_> = Emoji("🔒 ", "[AUTH]");

// Entities
pub static HEART: Emoji<'_, '_> = Emoji("❤️  ", "<3 ");
pub static PERSON: Emoji<'_, '_> = Emoji("👤 ", "- ");
pub static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "");
pub static COMMENT: Emoji<'_, '_> = Emoji("💬 ", "");
