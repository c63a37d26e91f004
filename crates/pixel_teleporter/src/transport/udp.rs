//! Socket, receive loop and per-frame polling

use std::io::ErrorKind;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, Receiver, Sender};
use socket2::{Domain, Protocol, Socket, Type};

use super::wire::{self, RECEIVE_BUFFER_SIZE};
use super::{
    FrameBuffer, TransportConfig, TransportError, TransportState, TransportStats, MAX_PIXELS,
};
use crate::foundation::time::{Clock, SystemClock};

/// State shared between the render thread and the receive loop.
///
/// The receive loop is the only writer of `Received` and of `inbox`; the
/// poller is the only reader and the only one to clear `Received`.
struct Session {
    state: AtomicU8,
    last_activity: AtomicU64,
    requested_at: AtomicU64,
    inbox: Mutex<Vec<u8>>,
    running: AtomicBool,
    requests_sent: AtomicU64,
    datagrams_received: AtomicU64,
    frames_decoded: AtomicU64,
    send_errors: AtomicU64,
    expired_requests: AtomicU64,
    stale_pending: AtomicBool,
    stale_discarded: AtomicU64,
}

impl Session {
    fn new(now: u64) -> Self {
        Self {
            state: AtomicU8::new(TransportState::Idle as u8),
            last_activity: AtomicU64::new(now),
            requested_at: AtomicU64::new(now),
            inbox: Mutex::new(Vec::with_capacity(RECEIVE_BUFFER_SIZE)),
            running: AtomicBool::new(false),
            requests_sent: AtomicU64::new(0),
            datagrams_received: AtomicU64::new(0),
            frames_decoded: AtomicU64::new(0),
            send_errors: AtomicU64::new(0),
            expired_requests: AtomicU64::new(0),
            stale_pending: AtomicBool::new(false),
            stale_discarded: AtomicU64::new(0),
        }
    }

    fn state(&self) -> TransportState {
        TransportState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn transition(&self, from: TransportState, to: TransportState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn deliver(&self, payload: &[u8], now: u64) {
        {
            let mut inbox = self.inbox.lock().unwrap_or_else(PoisonError::into_inner);
            inbox.clear();
            inbox.extend_from_slice(payload);
        }
        self.last_activity.store(now, Ordering::Release);
        self.datagrams_received.fetch_add(1, Ordering::Relaxed);
        self.transition(TransportState::Requested, TransportState::Received);
    }
}

/// Cloneable handle that stops a transport's receive loop from any thread
#[derive(Clone)]
pub struct ShutdownHandle {
    session: Arc<Session>,
    wake: Sender<()>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ShutdownHandle {
    /// Stop and join the receive loop. Safe to call any number of times.
    ///
    /// A receive blocked in the socket returns within one read timeout.
    pub fn shutdown(&self) {
        self.session.running.store(false, Ordering::Release);
        let _ = self.wake.try_send(());

        let worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(worker) = worker {
            if worker.join().is_err() {
                log::error!("PixelTeleporter receive loop panicked");
            }
            log::info!("PixelTeleporter transport stopped");
        }
    }

    /// True while the receive loop is running
    pub fn is_running(&self) -> bool {
        self.session.running.load(Ordering::Acquire)
    }
}

/// Client side of the LED bridge protocol.
///
/// Owned by the render thread. [`Transport::request_frame`] and
/// [`Transport::poll_and_decode`] are called once per animation frame and
/// never block on the network.
pub struct Transport {
    config: TransportConfig,
    socket: Arc<UdpSocket>,
    remote: SocketAddr,
    clock: Arc<dyn Clock>,
    session: Arc<Session>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
    frame: FrameBuffer,
    last_count: usize,
    paused_at: Option<u64>,
}

impl Transport {
    /// Open the socket using the system clock. Call [`Transport::start`]
    /// to begin receiving.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        Self::with_clock(config, Arc::new(SystemClock::new()))
    }

    /// Open the socket and start the receive loop
    pub fn connect(config: &TransportConfig) -> Result<Self, TransportError> {
        let transport = Self::new(config)?;
        transport.start()?;
        Ok(transport)
    }

    /// Open the socket with an injected clock
    pub fn with_clock(
        config: &TransportConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TransportError> {
        if config.max_pixels > MAX_PIXELS {
            return Err(TransportError::CapacityExceeded {
                requested: config.max_pixels,
                max: MAX_PIXELS,
            });
        }

        let remote = resolve(&config.remote_host, config.server_port)?;
        let socket = bind_reusable(remote, config.client_port)?;
        socket.set_read_timeout(Some(Duration::from_millis(config.receive_timeout_ms.max(1))))?;

        let (wake_tx, wake_rx) = bounded(1);
        let session = Arc::new(Session::new(clock.now_millis()));

        log::info!(
            "PixelTeleporter transport bound to {} for bridge {} ({} pixels)",
            socket.local_addr()?,
            remote,
            config.max_pixels
        );

        Ok(Self {
            config: config.clone(),
            socket: Arc::new(socket),
            remote,
            clock,
            session,
            wake_tx,
            wake_rx,
            worker: Arc::new(Mutex::new(None)),
            frame: FrameBuffer::new(config.max_pixels),
            last_count: 0,
            paused_at: None,
        })
    }

    /// Spawn the receive loop thread
    pub fn start(&self) -> Result<(), TransportError> {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if worker.is_some() {
            return Err(TransportError::AlreadyStarted);
        }

        self.session.running.store(true, Ordering::Release);
        let receive_loop = ReceiveLoop {
            socket: Arc::clone(&self.socket),
            session: Arc::clone(&self.session),
            clock: Arc::clone(&self.clock),
            wake: self.wake_rx.clone(),
            idle_wait: Duration::from_millis(self.config.receive_timeout_ms.max(1)),
            request_timeout_ms: self.config.request_timeout_ms,
        };

        let handle = thread::Builder::new()
            .name("pixel-teleporter-rx".to_string())
            .spawn(move || receive_loop.run());
        match handle {
            Ok(handle) => {
                *worker = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.session.running.store(false, Ordering::Release);
                Err(TransportError::Io(e))
            }
        }
    }

    /// Send a frame request if none is in flight.
    ///
    /// Returns true when a datagram was handed to the socket. Send failures
    /// are logged and leave the state `Idle` so the next frame retries.
    pub fn request_frame(&self) -> bool {
        if self.session.state() != TransportState::Idle {
            return false;
        }
        if self.session.stale_pending.swap(false, Ordering::AcqRel) {
            self.discard_late_replies();
        }

        match self.socket.send_to(&wire::request_frame_datagram(), self.remote) {
            Ok(_) => {
                self.session.requested_at.store(self.clock.now_millis(), Ordering::Release);
                self.session.requests_sent.fetch_add(1, Ordering::Relaxed);
                self.session.transition(TransportState::Idle, TransportState::Requested);
                let _ = self.wake_tx.try_send(());
                log::trace!("Requested frame from {}", self.remote);
                true
            }
            Err(e) => {
                self.session.send_errors.fetch_add(1, Ordering::Relaxed);
                log::warn!("Frame request to {} failed: {}", self.remote, e);
                false
            }
        }
    }

    /// Throw away replies to expired requests still queued on the socket so
    /// they are not taken as the answer to the next request. Only called
    /// while `Idle`, when the receive loop is not reading.
    fn discard_late_replies(&self) {
        if let Err(e) = self.socket.set_nonblocking(true) {
            log::warn!("Could not drain late replies: {}", e);
            return;
        }
        let mut scratch = vec![0u8; RECEIVE_BUFFER_SIZE];
        while let Ok((len, from)) = self.socket.recv_from(&mut scratch) {
            self.session.stale_discarded.fetch_add(1, Ordering::Relaxed);
            log::debug!("Discarded late {} byte reply from {}", len, from);
        }
        if let Err(e) = self.socket.set_nonblocking(false) {
            log::warn!("Could not restore blocking receive: {}", e);
        }
    }

    /// Drain a received frame into the frame buffer.
    ///
    /// Returns the number of pixels decoded. With nothing new it returns the
    /// previous count while paused, fills the buffer with the disconnect
    /// flash and returns capacity while disconnected, and returns 0
    /// otherwise.
    pub fn poll_and_decode(&mut self) -> usize {
        if self.session.state() == TransportState::Received {
            let count = {
                let inbox = self.session.inbox.lock().unwrap_or_else(PoisonError::into_inner);
                self.frame.decode_rgb(&inbox)
            };
            self.session.transition(TransportState::Received, TransportState::Idle);
            self.session.frames_decoded.fetch_add(1, Ordering::Relaxed);
            self.last_count = count;
            log::trace!("Decoded {} pixels", count);
            return count;
        }

        if self.paused_at.is_some() {
            return self.last_count;
        }

        if !self.is_connected() {
            let color =
                wire::disconnect_flash_color(self.silence_millis(), self.config.flash_period_ms);
            self.frame.fill(color);
            return self.frame.capacity();
        }

        0
    }

    /// True when a datagram arrived within the disconnect timeout
    pub fn is_connected(&self) -> bool {
        self.silence_millis() < self.config.disconnect_timeout_ms
    }

    /// Milliseconds since the last datagram, not counting paused time
    fn silence_millis(&self) -> u64 {
        let now = self.paused_at.unwrap_or_else(|| self.clock.now_millis());
        now.saturating_sub(self.session.last_activity.load(Ordering::Acquire))
    }

    /// Hold the current frame.
    ///
    /// While paused the disconnect clock is frozen; on resume it picks up
    /// where it left off.
    pub fn set_paused(&mut self, paused: bool) {
        let now = self.clock.now_millis();
        match (paused, self.paused_at) {
            (true, None) => {
                self.paused_at = Some(now);
                log::debug!("Transport paused");
            }
            (false, Some(since)) => {
                self.paused_at = None;
                let held = now.saturating_sub(since);
                let _ = self.session.last_activity.fetch_update(
                    Ordering::AcqRel,
                    Ordering::Acquire,
                    |last| (last <= since).then(|| last + held),
                );
                log::debug!("Transport resumed after {} ms", held);
            }
            _ => {}
        }
    }

    /// True while the frame is held
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Stop the receive loop; see [`ShutdownHandle::shutdown`]
    pub fn shutdown(&self) {
        self.shutdown_handle().shutdown();
    }

    /// Handle for stopping the receive loop from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            session: Arc::clone(&self.session),
            wake: self.wake_tx.clone(),
            worker: Arc::clone(&self.worker),
        }
    }

    /// Current session state
    pub fn state(&self) -> TransportState {
        self.session.state()
    }

    /// Decoded colors
    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Mutable frame buffer, for tools that synthesize frames locally
    pub fn frame_buffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.frame
    }

    /// Color at `index`; panics when `index >= capacity`
    #[inline]
    pub fn pixel(&self, index: usize) -> u32 {
        self.frame.pixel(index)
    }

    /// Frame buffer capacity
    pub fn capacity(&self) -> usize {
        self.frame.capacity()
    }

    /// Pixel count of the most recent decoded frame
    pub fn last_count(&self) -> usize {
        self.last_count
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Bridge address requests go to
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    /// Settings this transport was built with
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Snapshot of activity counters
    pub fn stats(&self) -> TransportStats {
        let s = &self.session;
        TransportStats {
            requests_sent: s.requests_sent.load(Ordering::Relaxed),
            datagrams_received: s.datagrams_received.load(Ordering::Relaxed),
            frames_decoded: s.frames_decoded.load(Ordering::Relaxed),
            send_errors: s.send_errors.load(Ordering::Relaxed),
            expired_requests: s.expired_requests.load(Ordering::Relaxed),
            stale_discarded: s.stale_discarded.load(Ordering::Relaxed),
        }
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("remote", &self.remote)
            .field("state", &self.state())
            .field("capacity", &self.frame.capacity())
            .field("paused", &self.is_paused())
            .finish_non_exhaustive()
    }
}

/// Body of the receive thread
struct ReceiveLoop {
    socket: Arc<UdpSocket>,
    session: Arc<Session>,
    clock: Arc<dyn Clock>,
    wake: Receiver<()>,
    idle_wait: Duration,
    request_timeout_ms: u64,
}

impl ReceiveLoop {
    fn run(self) {
        log::info!("PixelTeleporter receive loop started");
        let mut scratch = vec![0u8; RECEIVE_BUFFER_SIZE];

        while self.session.running.load(Ordering::Acquire) {
            if self.session.state() != TransportState::Requested {
                let _ = self.wake.recv_timeout(self.idle_wait);
                continue;
            }

            match self.socket.recv_from(&mut scratch) {
                Ok((len, from)) => {
                    log::trace!("Received {} bytes from {}", len, from);
                    self.session.deliver(&scratch[..len], self.clock.now_millis());
                }
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    self.expire_stale_request();
                }
                Err(e) => {
                    log::warn!("Receive failed: {}", e);
                    self.session.transition(TransportState::Requested, TransportState::Idle);
                }
            }
        }

        log::info!("PixelTeleporter receive loop exiting");
    }

    fn expire_stale_request(&self) {
        let age = self
            .clock
            .now_millis()
            .saturating_sub(self.session.requested_at.load(Ordering::Acquire));
        if age >= self.request_timeout_ms
            && self.session.transition(TransportState::Requested, TransportState::Idle)
        {
            self.session.expired_requests.fetch_add(1, Ordering::Relaxed);
            self.session.stale_pending.store(true, Ordering::Release);
            log::debug!("Frame request expired after {} ms", age);
        }
    }
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr, TransportError> {
    (host, port)
        .to_socket_addrs()
        .map_err(|e| TransportError::InvalidAddress(format!("{host}:{port} ({e})")))?
        .next()
        .ok_or_else(|| TransportError::InvalidAddress(format!("{host}:{port}")))
}

/// Bind a UDP socket with `SO_REUSEADDR` so a restarted client can reclaim
/// its listen port immediately.
fn bind_reusable(remote: SocketAddr, port: u16) -> Result<UdpSocket, TransportError> {
    let local = if remote.is_ipv4() {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
    } else {
        SocketAddr::from((Ipv6Addr::UNSPECIFIED, port))
    };

    let socket = Socket::new(Domain::for_address(local), Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&local.into())?;
    Ok(socket.into())
}
