use std::sync::Arc;

use application::log_sink::memory::{LogChannel, MemoryLogSink};
use application::{ApplicationError, MucBot, RoomEventHandler, RoomSettings, SessionCommands};
use async_trait::async_trait;
use domain::{
    Nickname, PresenceKind, PresenceNotification, RoomAddress, RoomEvent, RoomMessage,
    StableIdentity,
};
use mockall::{mock, predicate::eq, Sequence};
use tracing::Level;

mock! {
    pub Session {}

    #[async_trait]
    impl SessionCommands for Session {
        async fn send_own_presence(&self) -> Result<(), ApplicationError>;
        async fn join_room(
            &self,
            room: &RoomAddress,
            nickname: &Nickname,
            password: Option<String>,
        ) -> Result<Nickname, ApplicationError>;
    }
}

const ROOM: &str = "testroom@conference.example.org";
const BOT_NICK: &str = "auditbot";

fn nick(value: &str) -> Nickname {
    Nickname::parse(value).unwrap()
}

fn room() -> RoomAddress {
    RoomAddress::parse(ROOM).unwrap()
}

fn presence(nickname: &str, identity: &str) -> RoomEvent {
    RoomEvent::Presence(PresenceNotification {
        room: room(),
        nickname: nick(nickname),
        identity: StableIdentity::parse(identity).unwrap(),
        kind: PresenceKind::Available,
    })
}

fn message(nickname: &str, body: &str) -> RoomEvent {
    RoomEvent::Message(RoomMessage {
        room: room(),
        nickname: nick(nickname),
        body: body.to_string(),
    })
}

fn bot_with_log() -> (MucBot, Arc<MemoryLogSink>) {
    let log = Arc::new(MemoryLogSink::new());
    let bot = MucBot::new(RoomSettings::new(room(), nick(BOT_NICK)), log.clone());
    (bot, log)
}

#[test]
fn test_presence_then_message_yields_one_audit_record() {
    let (bot, log) = bot_with_log();

    bot.handle(presence("testnick", "testjid"));
    bot.handle(message("testnick", "testbody"));

    assert_eq!(log.audit_lines(), vec!["<testjid> testbody"]);
    assert_eq!(log.count(Level::WARN), 0);
}

#[test]
fn test_unknown_sender_is_dropped_with_one_warning() {
    let (bot, log) = bot_with_log();

    bot.handle(message("ghost", "boo"));

    assert!(log.audit_lines().is_empty());
    assert_eq!(log.count(Level::WARN), 1);
    let warning = log
        .entries()
        .into_iter()
        .find(|entry| entry.level == Level::WARN)
        .unwrap();
    assert!(warning.line.contains("ghost"));
    assert_eq!(warning.channel, LogChannel::Operational);
}

#[test]
fn test_reassociated_nickname_uses_latest_identity() {
    let (bot, log) = bot_with_log();

    bot.handle(presence("alice", "alice@example.org"));
    bot.handle(presence("alice", "eve@example.org"));
    bot.handle(message("alice", "who am i"));

    assert_eq!(log.audit_lines(), vec!["<eve@example.org> who am i"]);
}

#[test]
fn test_unavailable_presence_still_associates() {
    let (bot, log) = bot_with_log();

    bot.on_presence(PresenceNotification {
        room: room(),
        nickname: nick("leaver"),
        identity: StableIdentity::parse("leaver@example.org").unwrap(),
        kind: PresenceKind::Unavailable,
    });
    bot.handle(message("leaver", "late message"));

    assert_eq!(log.audit_lines(), vec!["<leaver@example.org> late message"]);
}

#[test]
fn test_replay_is_deterministic() {
    let events = vec![
        presence("alice", "alice@example.org"),
        message("alice", "one"),
        presence("bob", "bob@example.org"),
        message("ghost", "lost"),
        message("bob", "two"),
        presence("alice", "alice2@example.org"),
        message("alice", "three"),
        message("alice", "three"),
    ];

    let run = |events: Vec<RoomEvent>| {
        let (bot, log) = bot_with_log();
        for event in events {
            bot.handle(event);
        }
        log.audit_lines()
    };

    let first = run(events.clone());
    let second = run(events);
    assert_eq!(first, second);
    assert_eq!(
        first,
        vec![
            "<alice@example.org> one",
            "<bob@example.org> two",
            "<alice2@example.org> three",
            "<alice2@example.org> three",
        ]
    );
}

#[test]
fn test_self_echo_is_ignored_without_warning() {
    let (bot, log) = bot_with_log();

    bot.handle(presence(BOT_NICK, "bot@example.org"));
    bot.handle(message(BOT_NICK, "my own words"));

    assert!(log.audit_lines().is_empty());
    assert_eq!(log.count(Level::WARN), 0);
    assert!(bot.table().is_empty());
}

#[test]
fn test_own_account_presence_is_ignored_under_any_nickname() {
    let log = Arc::new(MemoryLogSink::new());
    let settings = RoomSettings::new(room(), nick(BOT_NICK))
        .with_own_identity(StableIdentity::parse("bot@example.org").unwrap());
    let bot = MucBot::new(settings, log.clone());

    // 加入确认之前，服务器改写后的昵称还不是自身昵称
    bot.handle(presence("auditbot_", "bot@example.org"));
    bot.handle(presence("alice", "alice@example.org"));

    assert_eq!(bot.table().len(), 1);
    assert_eq!(bot.table().resolve(&nick("auditbot_")), None);
    assert_eq!(log.count(Level::WARN), 0);
}

#[test]
fn test_other_room_events_are_ignored() {
    let (bot, log) = bot_with_log();
    let elsewhere = RoomAddress::parse("other@conference.example.org").unwrap();

    bot.handle(RoomEvent::Presence(PresenceNotification {
        room: elsewhere.clone(),
        nickname: nick("alice"),
        identity: StableIdentity::parse("alice@example.org").unwrap(),
        kind: PresenceKind::Available,
    }));
    bot.handle(RoomEvent::Message(RoomMessage {
        room: elsewhere,
        nickname: nick("alice"),
        body: "hello".to_string(),
    }));

    assert!(bot.table().is_empty());
    assert!(log.audit_lines().is_empty());
    assert_eq!(log.count(Level::WARN), 0);
}

#[tokio::test]
async fn test_session_start_sends_presence_before_join() {
    let (bot, log) = bot_with_log();
    let mut session = MockSession::new();
    let mut seq = Sequence::new();

    session
        .expect_send_own_presence()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(()));
    session
        .expect_join_room()
        .withf(|room, nickname, password| {
            room.as_str() == ROOM && nickname.as_str() == BOT_NICK && password.is_none()
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, nickname, _| Ok(nickname.clone()));

    bot.on_session_start(&session).await.unwrap();

    assert_eq!(bot.own_nickname(), nick(BOT_NICK));
    assert_eq!(log.count(Level::INFO), 1);
}

#[tokio::test]
async fn test_session_start_adopts_server_assigned_nickname() {
    let (bot, log) = bot_with_log();
    let mut session = MockSession::new();
    session.expect_send_own_presence().returning(|| Ok(()));
    session
        .expect_join_room()
        .returning(|_, _, _| Ok(Nickname::parse("auditbot_").unwrap()));

    bot.on_session_start(&session).await.unwrap();
    assert_eq!(bot.own_nickname(), nick("auditbot_"));

    // 服务器改写后的昵称同样视为自身回显
    bot.handle(message("auditbot_", "echo"));
    assert!(log.audit_lines().is_empty());
    assert_eq!(log.count(Level::WARN), 0);
}

#[tokio::test]
async fn test_session_start_passes_room_password() {
    let log = Arc::new(MemoryLogSink::new());
    let mut settings = RoomSettings::new(room(), nick(BOT_NICK));
    settings.password = Some("letmein".to_string());
    let bot = MucBot::new(settings, log);

    let mut session = MockSession::new();
    session.expect_send_own_presence().returning(|| Ok(()));
    session
        .expect_join_room()
        .with(
            eq(room()),
            eq(nick(BOT_NICK)),
            eq(Some("letmein".to_string())),
        )
        .returning(|_, nickname, _| Ok(nickname.clone()));

    bot.on_session_start(&session).await.unwrap();
}

#[tokio::test]
async fn test_join_failure_is_reported() {
    let (bot, log) = bot_with_log();
    let mut session = MockSession::new();
    session.expect_send_own_presence().returning(|| Ok(()));
    session
        .expect_join_room()
        .times(1)
        .returning(|_, _, _| Err(ApplicationError::session("join rejected: forbidden")));

    let result = bot.on_session_start(&session).await;

    assert!(matches!(result, Err(ApplicationError::Session(_))));
    assert!(log.entries().is_empty());
}

#[tokio::test]
async fn test_presence_failure_skips_join() {
    let (bot, _log) = bot_with_log();
    let mut session = MockSession::new();
    session
        .expect_send_own_presence()
        .returning(|| Err(ApplicationError::session("connection closed")));
    session.expect_join_room().never();

    assert!(bot.on_session_start(&session).await.is_err());
}

#[test]
fn test_concurrent_dispatch_is_safe() {
    let (bot, log) = bot_with_log();
    let bot = Arc::new(bot);

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let bot = Arc::clone(&bot);
            scope.spawn(move || {
                let name = format!("user{worker}");
                let identity = format!("user{worker}@example.org");
                bot.handle(presence(&name, &identity));
                for i in 0..50 {
                    bot.handle(message(&name, &format!("msg {i}")));
                }
            });
        }
    });

    assert_eq!(bot.table().len(), 8);
    assert_eq!(log.audit_lines().len(), 8 * 50);
    assert_eq!(log.count(Level::WARN), 0);
    for worker in 0..8 {
        let prefix = format!("<user{worker}@example.org> msg ");
        assert_eq!(
            log.audit_lines()
                .iter()
                .filter(|line| line.starts_with(&prefix))
                .count(),
            50
        );
    }
}
