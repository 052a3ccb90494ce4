//! Telegram transport: commands, inline buttons and free-text city answers.

use std::sync::Arc;

use anyhow::Context;
use cityinfo_core::{CityService, Config};
use teloxide::{
    dispatching::{UpdateHandler, UpdateFilterExt},
    payloads::SendMessageSetters,
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageEntity, MessageEntityKind, UserId},
    utils::command::BotCommands,
};
use tracing::{debug, info, warn};

use crate::{session::AwaitingCity, texts};

type HandlerResult = anyhow::Result<()>;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "Доступные команды:")]
pub enum Command {
    #[command(description = "приветствие и краткая информация о боте.")]
    Start,
    #[command(description = "запросить информацию о городе.")]
    City,
    #[command(description = "информация о последнем введенном городе.")]
    LastCity,
    #[command(description = "список всех команд.")]
    Info,
}

/// Inline buttons under the greeting. The callback data mirrors the command names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    City,
    LastCity,
}

impl MenuAction {
    pub fn callback_data(self) -> &'static str {
        match self {
            MenuAction::City => "/city",
            MenuAction::LastCity => "/last_city",
        }
    }

    pub fn from_callback_data(data: &str) -> Option<Self> {
        match data {
            "/city" => Some(MenuAction::City),
            "/last_city" => Some(MenuAction::LastCity),
            _ => None,
        }
    }
}

pub fn main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([[
        InlineKeyboardButton::callback(texts::BUTTON_CITY, MenuAction::City.callback_data()),
        InlineKeyboardButton::callback(
            texts::BUTTON_LAST_CITY,
            MenuAction::LastCity.callback_data(),
        ),
    ]])
}

/// Shared state handed to every handler.
#[derive(Debug)]
pub struct BotState {
    pub service: CityService,
    pub awaiting: AwaitingCity,
}

impl BotState {
    pub fn new(service: CityService) -> Self {
        Self { service, awaiting: AwaitingCity::default() }
    }

    fn begin_city_query(&self, user: Option<UserId>) {
        match user {
            Some(id) => self.awaiting.mark(id),
            None => debug!("City query without a sender; answer cannot be matched"),
        }
    }

    /// Clears the sender's pending-query mark when `text` can answer it.
    ///
    /// Returns the text and whether the mark was set. Messages that [`free_text`]
    /// rejects leave the mark untouched.
    fn take_city_answer<'a>(
        &self,
        user: Option<UserId>,
        text: Option<&'a str>,
        entities: &[MessageEntity],
    ) -> Option<(bool, &'a str)> {
        let (user, text) = free_text(user, text, entities)?;
        Some((self.awaiting.take(user), text))
    }

    async fn last_city_text(&self) -> String {
        match self.service.last_city_report().await {
            Some(resolution) => resolution.to_string(),
            None => texts::NO_LAST_CITY.to_string(),
        }
    }
}

/// Plain text from a known sender that does not open with a bot command.
fn free_text<'a>(
    user: Option<UserId>,
    text: Option<&'a str>,
    entities: &[MessageEntity],
) -> Option<(UserId, &'a str)> {
    let is_command = entities
        .iter()
        .any(|e| e.offset == 0 && matches!(e.kind, MessageEntityKind::BotCommand));
    if is_command {
        return None;
    }
    Some((user?, text?))
}

/// Build the update handler tree: commands, then button presses, then plain text.
pub fn schema() -> UpdateHandler<anyhow::Error> {
    let command_handler = Update::filter_message()
        .filter_command::<Command>()
        .endpoint(handle_command);

    let callback_handler = Update::filter_callback_query().endpoint(handle_callback);

    let text_handler = Update::filter_message().endpoint(handle_text);

    dptree::entry()
        .branch(command_handler)
        .branch(callback_handler)
        .branch(text_handler)
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> HandlerResult {
    let user_id = msg.from.as_ref().map(|u| u.id);
    info!(user_id = ?user_id, chat_id = msg.chat.id.0, command = ?cmd, "Received command");

    match cmd {
        Command::Start => {
            bot.send_message(msg.chat.id, texts::GREETING)
                .reply_markup(main_menu())
                .await?;
        }
        Command::City => {
            state.begin_city_query(user_id);
            bot.send_message(msg.chat.id, texts::ASK_CITY).await?;
        }
        Command::LastCity => {
            let text = state.last_city_text().await;
            bot.send_message(msg.chat.id, text).await?;
        }
        Command::Info => {
            bot.send_message(msg.chat.id, texts::HELP).await?;
        }
    }

    Ok(())
}

async fn handle_callback(bot: Bot, q: CallbackQuery, state: Arc<BotState>) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(action) = q.data.as_deref().and_then(MenuAction::from_callback_data) else {
        warn!(user_id = q.from.id.0, data = ?q.data, "Unknown callback data");
        return Ok(());
    };
    info!(user_id = q.from.id.0, action = ?action, "Received button press");

    let text = match action {
        MenuAction::City => {
            state.begin_city_query(Some(q.from.id));
            texts::ASK_CITY.to_string()
        }
        MenuAction::LastCity => state.last_city_text().await,
    };

    match q.regular_message() {
        Some(message) => {
            bot.edit_message_text(message.chat.id, message.id, text).await?;
        }
        None => {
            // The menu message is no longer accessible; reply in the private chat instead.
            bot.send_message(q.from.id, text).await?;
        }
    }

    Ok(())
}

async fn handle_text(bot: Bot, msg: Message, state: Arc<BotState>) -> HandlerResult {
    let user_id = msg.from.as_ref().map(|u| u.id);
    let entities = msg.entities().unwrap_or(&[]);
    let Some((awaiting, text)) = state.take_city_answer(user_id, msg.text(), entities) else {
        debug!(user_id = ?user_id, "Ignoring message that cannot answer a city query");
        return Ok(());
    };

    let Some(resolution) = state.service.answer_text(awaiting, text).await? else {
        debug!(user_id = ?user_id, "Ignoring text outside of a city query");
        return Ok(());
    };

    info!(
        user_id = ?user_id,
        city = %text,
        found = resolution.is_report(),
        "Answered city query"
    );
    bot.send_message(msg.chat.id, resolution.to_string()).await?;

    Ok(())
}

/// Registers commands and runs long polling until Ctrl-C.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    let mut bot = Bot::new(config.telegram.token.clone());
    if let Some(url) = &config.telegram.api_url {
        let url = reqwest::Url::parse(url)
            .with_context(|| format!("Invalid Telegram API URL: {url}"))?;
        bot = bot.set_api_url(url);
    }

    bot.set_my_commands(Command::bot_commands())
        .await
        .context("Failed to register bot commands with Telegram")?;

    let state = Arc::new(BotState::new(CityService::from_config(config)));

    info!(
        last_city_file = %config.storage.last_city_file.display(),
        "Bot started"
    );

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot stopped");
    Ok(())
}
