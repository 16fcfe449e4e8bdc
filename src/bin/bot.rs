// Process entrypoint: wires the Store, the Telegram gateway, and the
// Coordinator together, then runs the Telegram long-poll loop as the
// update ingester (`spec.md` §1 calls the ingester itself out of scope;
// this is the thinnest adapter that turns a `teloxide::Message` into the
// `Update` record the Coordinator actually consumes).

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use teloxide::prelude::*;

use wordchain_bot::chat_gateway::{ChatMember, TeloxideGateway};
use wordchain_bot::coordinator::Coordinator;
use wordchain_bot::db::Store;
use wordchain_bot::update_source::Update;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")?;
    let gateway = Arc::new(TeloxideGateway::new(&bot_token));
    let store = Store::new(pool);
    let coordinator = Coordinator::new(store, gateway.clone());

    coordinator.boot().await?;
    tracing::info!("recovered active games");

    let bot = Bot::new(bot_token);
    let coordinator_for_updates = coordinator.clone();
    let gateway_for_updates = gateway.clone();

    // `teloxide::repl` owns its own Ctrl+C handling and returns once the
    // poll loop is torn down, at which point every room's timer still
    // needs to persist its elapsed time before the process actually exits.
    teloxide::repl(bot, move |_bot: Bot, msg: Message| {
        let coordinator = coordinator_for_updates.clone();
        let gateway = gateway_for_updates.clone();
        async move {
            if let (Some(user), Some(text)) = (msg.from(), msg.text()) {
                let member = ChatMember {
                    user_id: user.id.0 as i64,
                    name: user.full_name(),
                };
                gateway.observe_member(msg.chat.id.0, member.clone()).await;

                let update = Update {
                    peer_id: msg.chat.id.0,
                    user_id: member.user_id,
                    body: text.to_string(),
                };
                if let Err(err) = coordinator.dispatch(update).await {
                    tracing::error!(%err, "failed to dispatch update");
                }
            }
            respond(())
        }
    })
    .await;

    coordinator.shutdown().await;
    Ok(())
}
