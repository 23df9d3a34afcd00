/// End-to-end tier sync between a host and a capable peer over an in-memory
/// socket pair. Payloads are real encoded `SyncMessage`s.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tiersort_client::{
    ClientSyncState, ErrorEvent as ClientErrorEvent, ResetEvent, SyncedEvent, TierSortClientError,
    TierSyncClient,
};
use tiersort_server::{
    CompleteEvent, DisconnectEvent, ErrorEvent, ServerConfig, TierSortServerError, TierSyncServer,
};
use tiersort_shared::{
    DisconnectReason, OrderOverride, OverrideError, PeerCapability, SyncMessage, SyncState,
    TaskQueue, TransportError, VanillaTier, WireError, PROTOCOL_VERSION,
};
use tiersort_test::{
    by_name, exchange_payloads, inline_ordering, modded_registry, name, ordering_on, sorted_names,
    vanilla_registry, LocalSocketPair, TestTier,
};

const REVERSED_MODDED: [&str; 7] = [
    "mymod:obsidian_pick",
    "minecraft:netherite",
    "minecraft:diamond",
    "minecraft:iron",
    "minecraft:stone",
    "minecraft:gold",
    "minecraft:wood",
];

fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

fn host() -> TierSyncServer<TestTier> {
    TierSyncServer::new(ServerConfig::default(), inline_ordering(modded_registry()))
}

#[test]
fn capable_peer_installs_host_order_and_acks() {
    init_logging();
    let now = Instant::now();
    let LocalSocketPair {
        server_sender,
        mut server_receiver,
        client_sender,
        mut client_receiver,
        ..
    } = LocalSocketPair::new();

    let mut server = host();
    // peer knows the mod tier but has a different order locally
    let mut client = TierSyncClient::new(inline_ordering(modded_registry()), client_sender);
    client
        .ordering()
        .request_reload(Some(OrderOverride::from_names(REVERSED_MODDED)));
    assert_ne!(sorted_names(client.ordering()), sorted_names(server.ordering()));

    let peer_key = server.connect(PeerCapability::Supports(server_sender), now);
    assert!(matches!(
        server.state(&peer_key),
        Some(SyncState::Synchronizing { .. })
    ));

    exchange_payloads(
        &mut server,
        &peer_key,
        &mut *server_receiver,
        &mut client,
        &mut *client_receiver,
    );

    assert_eq!(sorted_names(client.ordering()), sorted_names(server.ordering()));
    assert_eq!(client.state(), ClientSyncState::Synchronized);
    assert_eq!(client.receive().read::<SyncedEvent>().collect::<Vec<_>>(), vec![7]);

    let mut events = server.receive();
    assert_eq!(events.read::<CompleteEvent>().collect::<Vec<_>>(), vec![peer_key]);
    assert!(!events.has::<DisconnectEvent>());
    assert_eq!(server.state(&peer_key), Some(&SyncState::Synchronized));
}

#[test]
fn capable_peer_is_synced_even_with_seed_order() {
    init_logging();
    let now = Instant::now();
    let LocalSocketPair {
        server_sender,
        mut server_receiver,
        client_sender,
        mut client_receiver,
        ..
    } = LocalSocketPair::new();

    let mut server =
        TierSyncServer::new(ServerConfig::default(), inline_ordering(vanilla_registry()));
    let mut client = TierSyncClient::new(inline_ordering(vanilla_registry()), client_sender);

    let peer_key = server.connect(PeerCapability::Supports(server_sender), now);
    exchange_payloads(
        &mut server,
        &peer_key,
        &mut *server_receiver,
        &mut client,
        &mut *client_receiver,
    );

    assert_eq!(server.state(&peer_key), Some(&SyncState::Synchronized));
    assert_eq!(client.ordering().revision(), 1);
}

#[test]
fn missing_ack_times_out() {
    init_logging();
    let now = Instant::now();
    let pair = LocalSocketPair::new();
    let config = ServerConfig {
        handshake_timeout: Duration::from_secs(5),
    };
    let mut server = TierSyncServer::new(config, inline_ordering(modded_registry()));

    let peer_key = server.connect(PeerCapability::Supports(pair.server_sender), now);

    server.update(now + Duration::from_secs(4));
    assert!(server.receive().is_empty());

    server.update(now + Duration::from_secs(5));
    let mut events = server.receive();
    assert_eq!(
        events.read::<DisconnectEvent>().collect::<Vec<_>>(),
        vec![(peer_key, DisconnectReason::Timeout)]
    );

    // terminal, a late ack changes nothing
    server.receive_payload(&peer_key, &SyncMessage::Ack.to_payload());
    assert!(server.receive().is_empty());
    assert_eq!(
        server.state(&peer_key),
        Some(&SyncState::Disconnected(DisconnectReason::Timeout))
    );
}

#[test]
fn send_failure_disconnects() {
    init_logging();
    let now = Instant::now();
    let pair = LocalSocketPair::new();
    pair.sever();
    let mut server = host();

    let peer_key = server.connect(PeerCapability::Supports(pair.server_sender), now);

    let mut events = server.receive();
    assert_eq!(
        events.read::<DisconnectEvent>().collect::<Vec<_>>(),
        vec![(peer_key, DisconnectReason::SendFailed)]
    );
    assert!(matches!(
        events.read::<ErrorEvent>().next(),
        Some(TierSortServerError::Transport { peer, .. }) if peer == peer_key
    ));
}

#[test]
fn malformed_reply_is_protocol_violation() {
    init_logging();
    let now = Instant::now();
    let pair = LocalSocketPair::new();
    let mut server = host();
    let peer_key = server.connect(PeerCapability::Supports(pair.server_sender), now);

    // version byte only, the message body is cut off
    server.receive_payload(&peer_key, &[PROTOCOL_VERSION]);

    let mut events = server.receive();
    assert!(matches!(
        events.read::<ErrorEvent>().next(),
        Some(TierSortServerError::Wire {
            source: WireError::Malformed { .. },
            ..
        })
    ));
    let disconnections: Vec<_> = events.read::<DisconnectEvent>().collect();
    assert_eq!(disconnections.len(), 1);
    assert!(matches!(
        disconnections[0].1,
        DisconnectReason::ProtocolViolation(_)
    ));
}

#[test]
fn order_from_peer_is_protocol_violation() {
    init_logging();
    let now = Instant::now();
    let pair = LocalSocketPair::new();
    let mut server = host();
    let peer_key = server.connect(PeerCapability::Supports(pair.server_sender), now);

    let reply = SyncMessage::Order(vec![VanillaTier::Wood.name()]).to_payload();
    server.receive_payload(&peer_key, &reply);

    assert!(matches!(
        server.state(&peer_key),
        Some(SyncState::Disconnected(DisconnectReason::ProtocolViolation(_)))
    ));
}

#[test]
fn wrong_version_is_protocol_violation() {
    init_logging();
    let now = Instant::now();
    let pair = LocalSocketPair::new();
    let mut server = host();
    let peer_key = server.connect(PeerCapability::Supports(pair.server_sender), now);

    let mut reply = SyncMessage::Ack.to_payload().into_vec();
    reply[0] = PROTOCOL_VERSION + 1;
    server.receive_payload(&peer_key, &reply);

    let mut events = server.receive();
    assert!(matches!(
        events.read::<ErrorEvent>().next(),
        Some(TierSortServerError::Wire {
            source: WireError::VersionMismatch { .. },
            ..
        })
    ));
    assert!(events.has::<DisconnectEvent>());
}

#[test]
fn payload_from_unknown_peer_is_reported() {
    init_logging();
    let now = Instant::now();
    let pair = LocalSocketPair::new();
    let mut server = host();
    let peer_key = server.connect(PeerCapability::Supports(pair.server_sender), now);
    server.receive();

    assert!(server.disconnect(&peer_key).is_some());
    server.receive_payload(&peer_key, &SyncMessage::Ack.to_payload());

    let mut events = server.receive();
    assert!(matches!(
        events.read::<ErrorEvent>().next(),
        Some(TierSortServerError::UnknownPeer(key)) if key == peer_key
    ));
    assert!(server.peer_keys().is_empty());
}

#[test]
fn client_rejects_order_with_unknown_tier() {
    init_logging();
    let now = Instant::now();
    let LocalSocketPair {
        server_sender,
        mut server_receiver,
        client_sender,
        mut client_receiver,
        ..
    } = LocalSocketPair::new();

    let mut server = host();
    // peer lacks the mod tier
    let mut client = TierSyncClient::new(inline_ordering(vanilla_registry()), client_sender);
    let peer_key = server.connect(PeerCapability::Supports(server_sender), now);

    exchange_payloads(
        &mut server,
        &peer_key,
        &mut *server_receiver,
        &mut client,
        &mut *client_receiver,
    );

    assert_eq!(client.state(), ClientSyncState::Rejected);
    assert!(client.ordering().is_seed_order());
    let mut client_events = client.receive();
    match client_events.read::<ClientErrorEvent>().next() {
        Some(TierSortClientError::Order(OverrideError::UnknownTier { name: unknown })) => {
            assert_eq!(unknown, name("mymod:obsidian_pick"));
        }
        other => panic!("Expected unknown tier error, got {:?}", other),
    }

    // no ack went out, so the host eventually gives up
    assert!(matches!(
        server.state(&peer_key),
        Some(SyncState::Synchronizing { .. })
    ));
    server.update(now + ServerConfig::default().handshake_timeout);
    assert!(server.receive().has::<DisconnectEvent>());
}

#[test]
fn client_disconnect_restores_local_order() {
    init_logging();
    let now = Instant::now();
    let LocalSocketPair {
        server_sender,
        mut server_receiver,
        client_sender,
        mut client_receiver,
        ..
    } = LocalSocketPair::new();

    let mut server = host();
    // peer knows an extra tier the host does not
    let mut registry = modded_registry();
    registry
        .register(
            TestTier::modded("copper", 1, "othermod:needs_copper_tool"),
            name("othermod:copper"),
            vec![by_name("stone")],
            vec![by_name("iron")],
        )
        .unwrap();
    let mut client = TierSyncClient::new(inline_ordering(registry), client_sender);
    let local_order = sorted_names(client.ordering());
    let copper = TestTier::modded("copper", 1, "othermod:needs_copper_tool");

    let peer_key = server.connect(PeerCapability::Supports(server_sender), now);
    exchange_payloads(
        &mut server,
        &peer_key,
        &mut *server_receiver,
        &mut client,
        &mut *client_receiver,
    );
    assert_eq!(client.state(), ClientSyncState::Synchronized);
    assert!(!sorted_names(client.ordering()).contains(&"othermod:copper".to_string()));
    assert!(client.ordering().tiers_lower_than(&copper).is_empty());

    client.disconnect();

    assert_eq!(client.state(), ClientSyncState::Idle);
    assert_eq!(sorted_names(client.ordering()), local_order);
    assert_eq!(client.receive().read::<ResetEvent>().count(), 1);
    assert!(!client.ordering().tiers_lower_than(&copper).is_empty());
}

#[test]
fn unexpected_ack_is_reported_by_client() {
    init_logging();
    let pair = LocalSocketPair::new();
    let mut client = TierSyncClient::new(inline_ordering(vanilla_registry()), pair.client_sender);

    client.receive_payload(&SyncMessage::Ack.to_payload());

    assert!(matches!(
        client.receive().read::<ClientErrorEvent>().next(),
        Some(TierSortClientError::UnexpectedAck)
    ));
    assert_eq!(client.state(), ClientSyncState::Idle);
}

#[test]
fn queued_client_acks_only_after_install_runs() {
    init_logging();
    let now = Instant::now();
    let LocalSocketPair {
        server_sender,
        mut server_receiver,
        client_sender,
        mut client_receiver,
        ..
    } = LocalSocketPair::new();

    let mut server = host();
    let queue = TaskQueue::new();
    let mut client = TierSyncClient::new(
        ordering_on(modded_registry(), Arc::new(queue.clone())),
        client_sender,
    );
    client
        .ordering()
        .request_reload(Some(OrderOverride::from_names(REVERSED_MODDED)));
    queue.run_pending();
    assert_eq!(sorted_names(client.ordering()), REVERSED_MODDED);

    let peer_key = server.connect(PeerCapability::Supports(server_sender), now);
    exchange_payloads(
        &mut server,
        &peer_key,
        &mut *server_receiver,
        &mut client,
        &mut *client_receiver,
    );

    // install is queued: no ack yet, host still waiting, local order in use
    assert_eq!(queue.pending(), 1);
    assert_eq!(client.state(), ClientSyncState::Installing);
    assert!(!client.receive().has::<SyncedEvent>());
    assert_eq!(sorted_names(client.ordering()), REVERSED_MODDED);
    assert!(matches!(
        server.state(&peer_key),
        Some(SyncState::Synchronizing { .. })
    ));
    assert!(!server.receive().has::<CompleteEvent>());

    assert_eq!(queue.run_pending(), 1);
    exchange_payloads(
        &mut server,
        &peer_key,
        &mut *server_receiver,
        &mut client,
        &mut *client_receiver,
    );

    assert_eq!(sorted_names(client.ordering()), sorted_names(server.ordering()));
    assert_eq!(client.receive().read::<SyncedEvent>().collect::<Vec<_>>(), vec![7]);
    assert_eq!(client.state(), ClientSyncState::Synchronized);
    assert_eq!(server.state(&peer_key), Some(&SyncState::Synchronized));
    assert_eq!(server.receive().read::<CompleteEvent>().collect::<Vec<_>>(), vec![peer_key]);
}

#[test]
fn failed_ack_leaves_client_unacknowledged() {
    init_logging();
    let now = Instant::now();
    let LocalSocketPair {
        server_sender,
        client_sender,
        mut client_receiver,
        link,
        ..
    } = LocalSocketPair::new();

    let mut server = host();
    let mut client = TierSyncClient::new(inline_ordering(modded_registry()), client_sender);
    client
        .ordering()
        .request_reload(Some(OrderOverride::from_names(REVERSED_MODDED)));
    server.connect(PeerCapability::Supports(server_sender), now);

    // the order is delivered, then the link drops before the ack
    link.sever();
    let payload = client_receiver.receive().unwrap().unwrap();
    client.receive_payload(&payload);

    assert_eq!(client.state(), ClientSyncState::Unacknowledged);
    assert_eq!(sorted_names(client.ordering()), sorted_names(server.ordering()));
    let mut events = client.receive();
    assert!(!events.has::<SyncedEvent>());
    assert!(matches!(
        events.read::<ClientErrorEvent>().next(),
        Some(TierSortClientError::Transport(TransportError::Closed))
    ));

    client.disconnect();
    assert_eq!(client.state(), ClientSyncState::Idle);
    assert_eq!(client.receive().read::<ResetEvent>().count(), 1);
}

#[test]
fn disconnect_before_queued_install_sends_no_ack() {
    init_logging();
    let now = Instant::now();
    let LocalSocketPair {
        server_sender,
        mut server_receiver,
        client_sender,
        mut client_receiver,
        ..
    } = LocalSocketPair::new();

    let mut server = host();
    let queue = TaskQueue::new();
    let mut client = TierSyncClient::new(
        ordering_on(modded_registry(), Arc::new(queue.clone())),
        client_sender,
    );
    let local_order = sorted_names(client.ordering());
    let peer_key = server.connect(PeerCapability::Supports(server_sender), now);
    exchange_payloads(
        &mut server,
        &peer_key,
        &mut *server_receiver,
        &mut client,
        &mut *client_receiver,
    );

    client.disconnect();
    assert_eq!(queue.run_pending(), 2);

    assert!(server_receiver.receive().unwrap().is_none());
    assert_eq!(client.state(), ClientSyncState::Idle);
    assert!(!client.receive().has::<SyncedEvent>());
    assert_eq!(sorted_names(client.ordering()), local_order);
}
