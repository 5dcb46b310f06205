use crate::github::Comment;

/// True when someone other than the bot asked it to stop, anywhere in
/// `comments`.
///
/// The body is compared case-insensitively against `@<bot_login> stop`;
/// the author check is exact, so the bot's own reminder text (which quotes
/// the command) never silences it. A comment whose author account is gone
/// counts as someone else's.
pub fn contains_stop_command(comments: &[Comment], bot_login: &str) -> bool {
    let command = format!("@{} stop", bot_login.to_lowercase());
    comments
        .iter()
        .any(|c| c.author() != Some(bot_login) && c.body.to_lowercase().contains(&command))
}
