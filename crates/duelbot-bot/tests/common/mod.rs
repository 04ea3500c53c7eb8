//! Shared test helpers for bot and HTTP integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use duelbot_bot::commands::default_router;
use duelbot_bot::config::{self, Greeting};
use duelbot_bot::dispatch::{Bot, spawn_dispatcher};
use duelbot_bot::metadata::StaticStreamMetadata;
use duelbot_bot::outbox::Outbox;
use duelbot_bot::routes;
use duelbot_bot::state::{AppState, BotState};
use duelbot_core::rng::DeterministicRng;
use duelbot_core::transport::{ChatMessage, ChatTransport, RelayNotifier};
use duelbot_duel::application::coordinator::DuelCoordinator;
use duelbot_duel::domain::arena::DuelTimings;
use duelbot_progression::repository::ProgressionRepository;
use duelbot_test_support::{
    InMemoryProgressionRepository, MockRng, RecordingRelay, RecordingTransport, default_catalog,
};
use http_body_util::BodyExt;
use tokio::task::JoinHandle;
use tower::ServiceExt;

/// Channel every test message is posted in.
pub const CHANNEL: &str = "arena";

/// The bot's own login name.
pub const BOT_USERNAME: &str = "duelbot";

/// The JSON catalogs shipped with the bot.
pub fn config_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config")
}

/// A chat line from `username` with no badges.
pub fn chat(username: &str, text: &str) -> ChatMessage {
    chat_with_badges(username, text, &[])
}

/// A chat line from `username` carrying `badges`.
pub fn chat_with_badges(username: &str, text: &str, badges: &[(&str, u32)]) -> ChatMessage {
    ChatMessage {
        channel: CHANNEL.to_owned(),
        username: username.to_owned(),
        badges: badges
            .iter()
            .map(|(name, version)| ((*name).to_owned(), *version))
            .collect::<HashMap<_, _>>(),
        text: text.to_owned(),
    }
}

/// Assembles a bot over the shipped catalogs and the given ports.
pub fn build_bot(
    progression: Arc<dyn ProgressionRepository>,
    rng: impl DeterministicRng + 'static,
    transport: Arc<dyn ChatTransport>,
    relay: Arc<dyn RelayNotifier>,
    metadata: StaticStreamMetadata,
) -> (Bot, DuelCoordinator) {
    let dir = config_dir();
    let rng: Arc<Mutex<dyn DeterministicRng>> = Arc::new(Mutex::new(rng));
    let duels = DuelCoordinator::new(
        config::load_duel_templates(&dir).unwrap(),
        Arc::clone(&rng),
        Arc::clone(&progression),
        Arc::clone(&transport),
        CHANNEL,
        DuelTimings::default(),
    );
    let state = BotState {
        channel: CHANNEL.to_owned(),
        progression,
        duels: duels.clone(),
        labels: config::load_stat_labels(&dir, &default_catalog()).unwrap(),
        greetings: vec![
            Greeting {
                language: "Spanish".to_owned(),
                text: "Hola".to_owned(),
            },
            Greeting {
                language: "French".to_owned(),
                text: "Bonjour".to_owned(),
            },
        ],
        friends: vec!["streamer_one".to_owned(), "streamer_two".to_owned()],
        metadata: Arc::new(metadata),
        rng,
    };
    let bot = Bot::new(state, default_router(), transport, relay, BOT_USERNAME);
    (bot, duels)
}

/// A bot over an in-memory store with recording transport and relay.
pub struct TestBot {
    pub bot: Bot,
    pub duels: DuelCoordinator,
    pub repo: Arc<InMemoryProgressionRepository>,
    pub transport: Arc<RecordingTransport>,
    pub relay: Arc<RecordingRelay>,
}

impl TestBot {
    /// Every duel is a draw and every pick is the first entry.
    pub fn new() -> Self {
        Self::with_rng(MockRng)
    }

    pub fn with_rng(rng: impl DeterministicRng + 'static) -> Self {
        let repo = Arc::new(InMemoryProgressionRepository::new());
        let transport = Arc::new(RecordingTransport::new());
        let relay = Arc::new(RecordingRelay::new());
        let (bot, duels) = build_bot(
            repo.clone(),
            rng,
            transport.clone(),
            relay.clone(),
            StaticStreamMetadata::new(
                Some("Duels all night".to_owned()),
                Some("Just Chatting".to_owned()),
            ),
        );
        Self {
            bot,
            duels,
            repo,
            transport,
            relay,
        }
    }

    /// Handles one line from `username` and returns the replies.
    pub async fn say(&self, username: &str, text: &str) -> Vec<String> {
        self.bot
            .handle_message(uuid::Uuid::new_v4(), &chat(username, text))
            .await
    }
}

/// A running dispatcher behind the HTTP router.
pub struct TestApp {
    pub app: Router,
    pub outbox: Arc<Outbox>,
    pub dispatcher: JoinHandle<()>,
}

/// Builds the full HTTP app over an in-memory store, with replies buffered
/// in the outbox. Uses the same route structure as `main.rs`.
pub fn build_test_app() -> TestApp {
    let outbox = Arc::new(Outbox::default());
    let (bot, duels) = build_bot(
        Arc::new(InMemoryProgressionRepository::new()),
        MockRng,
        outbox.clone(),
        Arc::new(RecordingRelay::new()),
        StaticStreamMetadata::new(None, None),
    );
    let (inbox, dispatcher) = spawn_dispatcher(bot, 16);
    let app = routes::app(AppState::new(inbox, outbox.clone(), duels, CHANNEL));
    TestApp {
        app,
        outbox,
        dispatcher,
    }
}

/// Waits until the outbox holds at least `count` messages.
pub async fn wait_for_outbox(outbox: &Outbox, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while outbox.len() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("outbox never filled");
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
