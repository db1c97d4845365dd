use std::sync::Arc;

use ad_board_commons::record::NO_INVITE;
use teloxide::{
    payloads::{CreateChatInviteLinkSetters, SetMessageReactionSetters},
    prelude::*,
    types::{BotCommand, ChatId, Me, Message, ReactionType},
    RequestError,
};

use crate::{
    backend::BackendClient,
    config::BotConfig,
    normalizer::normalize,
    optout::OptOutStore,
    types::{InboundPost, SubmitOutcome},
};

/// Commands advertised to telegram clients.
pub fn bot_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("optout", "Stop your ads from being tracked."),
        BotCommand::new("optin", "Resume tracking your ads."),
    ]
}

pub async fn handle_message(
    bot: Bot,
    me: Me,
    message: Message,
    config: Arc<BotConfig>,
    optout: Arc<OptOutStore>,
    backend: Arc<BackendClient>,
) -> Result<(), RequestError> {
    // Tracking rejections are silent, and commands still run after them.
    track_ad(&bot, &message, &config, &optout, &backend).await;

    if handle_command(&bot, &me, &message, &optout).await? {
        return Ok(());
    }

    if message.chat.is_private() {
        bot.send_message(
            message.chat.id,
            "
This bot tracks advertisements posted in the ad chat's topics and puts \
them on the board.

Post an ad in any tracked topic and it shows up on the board on its own. \
Send /optout to keep your ads off the board, and /optin to undo that.",
        )
        .await?;
    }

    Ok(())
}

/// Run one message through the tracking pipeline: admission, invite
/// resolution, submission, and the reaction acknowledging the outcome.
async fn track_ad(
    bot: &Bot,
    message: &Message,
    config: &BotConfig,
    optout: &OptOutStore,
    backend: &BackendClient,
) {
    let Some(post) = InboundPost::from_message(message) else {
        return;
    };

    let Some(pending) = normalize(&post, config, optout).await else {
        return;
    };

    let invite = match pending.invite.clone() {
        Some(token) => token,
        None => create_fallback_invite(bot, message.chat.id).await,
    };

    let record = pending.into_record(invite);
    let outcome = backend.submit(&record).await;

    log::info!(
        "Ad from {} in category {:?}: {:?}",
        record.author_id,
        record.category,
        outcome
    );

    acknowledge(bot, message, outcome).await;
}

/// Ask telegram for a fresh invite link to the tracked chat, good for a
/// day and unlimited joins. Failure is expected (the bot may lack the
/// invite permission) and degrades to the sentinel.
async fn create_fallback_invite(bot: &Bot, chat_id: ChatId) -> String {
    match bot
        .create_chat_invite_link(chat_id)
        .expire_date(chrono::Utc::now() + chrono::Duration::hours(24))
        .await
    {
        Ok(link) => link.invite_link,
        Err(e) => {
            log::debug!("Could not create a fallback invite: {e}");
            NO_INVITE.to_owned()
        }
    }
}

/// React to the tracked message so the author can see what happened to
/// their ad. Purely cosmetic; failure only gets logged.
async fn acknowledge(bot: &Bot, message: &Message, outcome: SubmitOutcome) {
    let emoji = match outcome {
        SubmitOutcome::Accepted => "👍",
        SubmitOutcome::Duplicate => "🤔",
        SubmitOutcome::Failed => "💔",
    };

    if let Err(e) = bot
        .set_message_reaction(message.chat.id, message.id)
        .reaction(vec![ReactionType::Emoji {
            emoji: emoji.to_owned(),
        }])
        .await
    {
        log::warn!("Failed to react to a tracked message: {e}");
    }
}

/// Returns `true` if a command was parsed and responded to.
async fn handle_command(
    bot: &Bot,
    me: &Me,
    message: &Message,
    optout: &OptOutStore,
) -> Result<bool, RequestError> {
    // Get text of the message.
    let Some(text) = message.text() else {
        return Ok(false);
    };
    // Check if it starts with "/", like how a command should.
    if !text.starts_with('/') {
        return Ok(false);
    }
    // Get first word in the message, the command itself.
    let Some(command) = text.split_whitespace().next() else {
        return Ok(false);
    };

    // Trim the bot's username from the command and convert to lowercase.
    let username = format!("@{}", me.username());
    let command = command.trim_end_matches(username.as_str()).to_lowercase();

    let Some(author) = &message.from else {
        return Ok(false);
    };

    let reply = match command.as_str() {
        "/optout" => match optout.add(author.id.0).await {
            Ok(true) => "✅ You have opted out of ad tracking.",
            Ok(false) => "❌ You are already opted out.",
            Err(e) => {
                log::error!("Failed to persist the opt-out set: {e}");
                "⚠️ Something went wrong, please try again later."
            }
        },
        "/optin" => match optout.remove(author.id.0).await {
            Ok(true) => "✅ You have opted back in to ad tracking.",
            Ok(false) => "❌ You are already opted in.",
            Err(e) => {
                log::error!("Failed to persist the opt-out set: {e}");
                "⚠️ Something went wrong, please try again later."
            }
        },
        // Any kind of "/start", "/help" commands yield false and hence
        // cause the help message to be printed.
        _ => return Ok(false),
    };

    bot.send_message(message.chat.id, reply).await?;

    Ok(true)
}
