//! LED bridge emulator
//!
//! Answers PixelTeleporter frame requests with generated test patterns so
//! the viewer can be exercised without hardware. Can drop a share of
//! replies to exercise the client's loss handling.

use anyhow::{Context, Result};
use clap::{Arg, Command};
use pixel_teleporter::transport::{wire, FrameBuffer, MAX_PIXELS};
use rand::Rng;
use std::net::UdpSocket;
use std::time::Instant;

mod patterns;
use patterns::Pattern;

const DEFAULT_PORT: &str = "8081";
const DEFAULT_PIXELS: &str = "256";

#[derive(Debug)]
struct ServerConfig {
    port: u16,
    pixels: usize,
    pattern: Pattern,
    drop_rate: f64,
}

fn parse_args() -> Result<ServerConfig> {
    let matches = Command::new("frame_server")
        .about("Serves generated LED frames over the PixelTeleporter UDP protocol")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Command port to listen on")
                .default_value(DEFAULT_PORT),
        )
        .arg(
            Arg::new("pixels")
                .short('n')
                .long("pixels")
                .value_name("COUNT")
                .help("Pixels per frame")
                .default_value(DEFAULT_PIXELS),
        )
        .arg(
            Arg::new("pattern")
                .long("pattern")
                .value_name("NAME")
                .help("rainbow, chase, sparkle or solid")
                .default_value("rainbow"),
        )
        .arg(
            Arg::new("drop")
                .long("drop")
                .value_name("PERCENT")
                .help("Percentage of requests to ignore")
                .default_value("0"),
        )
        .get_matches();

    let get = |name: &str| matches.get_one::<String>(name).cloned().unwrap_or_default();

    let pixels: usize = get("pixels").parse().context("invalid pixel count")?;
    anyhow::ensure!(pixels <= MAX_PIXELS, "at most {MAX_PIXELS} pixels per frame");
    let drop_percent: f64 = get("drop").parse().context("invalid drop percentage")?;

    Ok(ServerConfig {
        port: get("port").parse().context("invalid port")?,
        pixels,
        pattern: get("pattern").parse()?,
        drop_rate: (drop_percent / 100.0).clamp(0.0, 1.0),
    })
}

fn main() -> Result<()> {
    pixel_teleporter::foundation::logging::init();
    let config = parse_args()?;

    let socket = UdpSocket::bind(("0.0.0.0", config.port))
        .with_context(|| format!("failed to bind port {}", config.port))?;
    log::info!(
        "Serving {} pixels of '{:?}' on {} (dropping {:.0}%)",
        config.pixels,
        config.pattern,
        socket.local_addr()?,
        config.drop_rate * 100.0
    );

    let started = Instant::now();
    let mut rng = rand::thread_rng();
    let mut frame = FrameBuffer::new(config.pixels);
    let mut request = [0u8; 64];
    let mut served: u64 = 0;

    loop {
        let (len, client) = socket.recv_from(&mut request).context("receive failed")?;
        if !wire::is_frame_request(&request[..len]) {
            log::debug!("Ignoring {} byte datagram from {}", len, client);
            continue;
        }

        if rng.gen_bool(config.drop_rate) {
            log::debug!("Dropping request from {}", client);
            continue;
        }

        config
            .pattern
            .render(&mut frame, config.pixels, started.elapsed().as_secs_f32(), &mut rng);
        let payload = frame.encode_rgb(config.pixels);
        if let Err(e) = socket.send_to(&payload, client) {
            log::warn!("Reply to {} failed: {}", client, e);
            continue;
        }

        served += 1;
        if served % 600 == 0 {
            log::info!("Served {} frames", served);
        }
    }
}
