//! Loopback tests against a hand-driven bridge socket

use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::*;
use crate::foundation::color::{grey, pack_rgb};
use crate::foundation::time::ManualClock;

/// Fake LED bridge: a plain socket the test answers by hand
struct Bridge {
    socket: UdpSocket,
}

impl Bridge {
    fn new() -> Self {
        crate::foundation::logging::init_for_tests();
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket.set_read_timeout(Some(Duration::from_millis(500))).unwrap();
        Self { socket }
    }

    fn port(&self) -> u16 {
        self.socket.local_addr().unwrap().port()
    }

    fn config(&self) -> TransportConfig {
        TransportConfig {
            receive_timeout_ms: 20,
            ..TransportConfig::new("127.0.0.1", self.port(), 0)
        }
    }

    /// Wait for one request and return where it came from
    fn expect_request(&self) -> SocketAddr {
        let mut buf = [0u8; 64];
        let (len, from) = self.socket.recv_from(&mut buf).expect("no request arrived");
        assert_eq!(len, wire::REQUEST_LEN);
        assert_eq!(buf[0], REQUEST_FRAME_OPCODE);
        from
    }

    fn expect_silence(&self) {
        self.socket.set_read_timeout(Some(Duration::from_millis(150))).unwrap();
        let mut buf = [0u8; 64];
        assert!(self.socket.recv_from(&mut buf).is_err(), "unexpected extra request");
    }

    fn reply(&self, to: SocketAddr, payload: &[u8]) {
        self.socket.send_to(payload, to).unwrap();
    }
}

fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for condition");
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn manual_transport(config: &TransportConfig, clock: &ManualClock) -> Transport {
    Transport::with_clock(config, Arc::new(clock.clone())).unwrap()
}

#[test]
fn test_nine_byte_reply_decodes_three_pixels() {
    let bridge = Bridge::new();
    let clock = ManualClock::new(0);
    let mut transport = manual_transport(&bridge.config(), &clock);
    transport.start().unwrap();

    let marker = pack_rgb(7, 7, 7);
    transport.frame_buffer_mut().fill(marker);

    assert!(transport.request_frame());
    let client = bridge.expect_request();
    bridge.reply(client, &[1, 2, 3, 4, 5, 6, 7, 8, 9]);

    wait_until(|| transport.state() == TransportState::Received);
    assert_eq!(transport.poll_and_decode(), 3);
    assert_eq!(transport.state(), TransportState::Idle);

    assert_eq!(transport.pixel(0), pack_rgb(1, 2, 3));
    assert_eq!(transport.pixel(1), pack_rgb(4, 5, 6));
    assert_eq!(transport.pixel(2), pack_rgb(7, 8, 9));
    assert!(transport.frame_buffer().as_slice()[3..].iter().all(|&c| c == marker));

    let stats = transport.stats();
    assert_eq!(stats.requests_sent, 1);
    assert_eq!(stats.datagrams_received, 1);
    assert_eq!(stats.frames_decoded, 1);
}

#[test]
fn test_at_most_one_request_in_flight() {
    let bridge = Bridge::new();
    let clock = ManualClock::new(0);
    let mut transport = manual_transport(&bridge.config(), &clock);
    transport.start().unwrap();

    assert!(transport.request_frame());
    assert!(!transport.request_frame());
    assert!(!transport.request_frame());
    assert_eq!(transport.state(), TransportState::Requested);

    let client = bridge.expect_request();
    bridge.expect_silence();

    bridge.reply(client, &[0; 30]);
    wait_until(|| transport.state() == TransportState::Received);
    assert!(!transport.request_frame(), "must not request while a frame waits");
    assert_eq!(transport.stats().requests_sent, 1);

    assert_eq!(transport.poll_and_decode(), 10);
    assert!(transport.request_frame());
    assert_eq!(transport.stats().requests_sent, 2);
}

#[test]
fn test_nothing_new_returns_zero_while_connected() {
    let bridge = Bridge::new();
    let clock = ManualClock::new(0);
    let mut transport = manual_transport(&bridge.config(), &clock);
    assert!(transport.is_connected());
    assert_eq!(transport.poll_and_decode(), 0);
}

#[test]
fn test_shutdown_twice_is_harmless() {
    let bridge = Bridge::new();
    let transport = Transport::connect(&bridge.config()).unwrap();
    assert!(transport.shutdown_handle().is_running());

    transport.shutdown();
    transport.shutdown();
    assert!(!transport.shutdown_handle().is_running());
}

#[test]
fn test_shutdown_from_another_thread_interrupts_receive() {
    let bridge = Bridge::new();
    let clock = ManualClock::new(0);
    let transport = manual_transport(&bridge.config(), &clock);
    transport.start().unwrap();
    assert!(transport.request_frame());

    let handle = transport.shutdown_handle();
    let started = Instant::now();
    std::thread::spawn(move || handle.shutdown()).join().unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
    transport.shutdown();
}

#[test]
fn test_start_twice_is_rejected() {
    let bridge = Bridge::new();
    let transport = Transport::connect(&bridge.config()).unwrap();
    assert!(matches!(transport.start(), Err(TransportError::AlreadyStarted)));
}

#[test]
fn test_capacity_above_protocol_maximum_is_rejected() {
    let config = TransportConfig::new("127.0.0.1", 8081, 0).with_max_pixels(MAX_PIXELS + 1);
    assert!(matches!(
        Transport::new(&config),
        Err(TransportError::CapacityExceeded { requested: 4097, max: 4096 })
    ));
}

#[test]
fn test_disconnect_flash_ramps_over_period() {
    let bridge = Bridge::new();
    let clock = ManualClock::new(0);
    let config = bridge.config().with_max_pixels(16);
    let mut transport = manual_transport(&config, &clock);

    clock.set(4_999);
    assert!(transport.is_connected());
    assert_eq!(transport.poll_and_decode(), 0);

    // Two full periods after the last datagram, then half a period more
    for (now, level) in [(6_000, 0), (7_500, 64), (9_000, 0)] {
        clock.set(now);
        assert!(!transport.is_connected());
        assert_eq!(transport.poll_and_decode(), 16);
        assert!(
            transport.frame_buffer().as_slice().iter().all(|&c| c == grey(level)),
            "expected grey {level} at {now} ms"
        );
    }
}

#[test]
fn test_pause_holds_frame_and_freezes_disconnect_clock() {
    let bridge = Bridge::new();
    let clock = ManualClock::new(1_000);
    let mut transport = manual_transport(&bridge.config(), &clock);
    transport.start().unwrap();

    assert!(transport.request_frame());
    let client = bridge.expect_request();
    bridge.reply(client, &[10, 20, 30, 40, 50, 60, 70, 80, 90]);
    wait_until(|| transport.state() == TransportState::Received);
    assert_eq!(transport.poll_and_decode(), 3);

    clock.set(2_000);
    transport.set_paused(true);
    assert!(transport.is_paused());

    clock.set(12_000);
    assert!(transport.is_connected());
    assert_eq!(transport.poll_and_decode(), 3);
    assert_eq!(transport.pixel(0), pack_rgb(10, 20, 30));

    // Ten seconds held: the link is considered silent for 1 s only
    transport.set_paused(false);
    assert!(transport.is_connected());
    clock.set(15_999);
    assert!(transport.is_connected());
    clock.set(16_000);
    assert!(!transport.is_connected());
}

#[test]
fn test_stale_request_expires_back_to_idle() {
    let bridge = Bridge::new();
    let clock = ManualClock::new(0);
    let transport = manual_transport(&bridge.config(), &clock);
    transport.start().unwrap();

    assert!(transport.request_frame());
    bridge.expect_request();
    assert_eq!(transport.state(), TransportState::Requested);

    clock.advance(1_000);
    wait_until(|| transport.state() == TransportState::Idle);
    assert_eq!(transport.stats().expired_requests, 1);
    assert!(transport.request_frame());
}

#[test]
fn test_late_reply_to_expired_request_is_discarded() {
    let bridge = Bridge::new();
    let clock = ManualClock::new(0);
    let mut transport = manual_transport(&bridge.config(), &clock);
    transport.start().unwrap();

    assert!(transport.request_frame());
    let client = bridge.expect_request();
    clock.advance(1_000);
    wait_until(|| transport.state() == TransportState::Idle);

    // Reply to the expired request lands while nothing is reading
    bridge.reply(client, &[1, 1, 1]);
    std::thread::sleep(Duration::from_millis(100));

    assert!(transport.request_frame());
    bridge.expect_request();
    std::thread::sleep(Duration::from_millis(100));

    assert_eq!(transport.state(), TransportState::Requested);
    assert_eq!(transport.stats().stale_discarded, 1);
    assert_eq!(transport.stats().datagrams_received, 0);
    assert_eq!(transport.poll_and_decode(), 0);
    assert_ne!(transport.pixel(0), pack_rgb(1, 1, 1));
}
