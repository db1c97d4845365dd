use std::{fs, sync::Arc};

use teloxide::{dptree::deps, prelude::*};

use crate::{
    backend::BackendClient,
    config::{BotConfig, CONFIG_PATH},
    handlers::{bot_commands, handle_message},
    optout::OptOutStore,
};

/// # Panics
///
/// Panics if the key file or the config file is missing or invalid.
pub async fn entry() {
    let key = fs::read_to_string(match cfg!(debug_assertions) {
        true => "key_debug",
        false => "key",
    })
    .expect("Could not load bot key file!");

    let config = Arc::new(BotConfig::load(CONFIG_PATH).expect("Could not load the bot config!"));
    let optout =
        Arc::new(OptOutStore::load(&config.optout_path).expect("Could not load the opt-out set!"));
    let backend = Arc::new(
        BackendClient::new(config.backend_url.clone())
            .expect("Could not build the backend client!"),
    );

    let bot = Bot::new(key);

    bot.set_my_commands(bot_commands())
        .await
        .expect("Failed to set bot commands!");

    log::info!("Tracking ads in chat {}...", config.tracked_chat);

    let handler =
        dptree::entry().branch(Update::filter_message().branch(dptree::endpoint(handle_message)));

    Dispatcher::builder(bot, handler)
        .default_handler(|_| async {})
        .dependencies(deps![config, optout, backend])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("The dispatcher has wound down.");
}
