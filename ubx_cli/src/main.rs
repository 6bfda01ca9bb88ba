use std::{
    fs::File,
    io::{self, Read},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use log::{info, warn, LevelFilter};
use ubx_codec::{c_string, gps_time_to_utc, Message, MsgId, Packet, Position};

/// Decode a captured UBX byte stream
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Capture file, stdin when omitted
    input: Option<PathBuf>,

    /// Bytes handed to the parser at a time
    #[arg(short, long, default_value_t = 1024)]
    chunk_size: usize,

    /// Print every packet as one line of JSON
    #[arg(short, long)]
    json: bool,

    /// Log level of the decoder
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Default)]
struct Stats {
    known: usize,
    unknown: usize,
    errors: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .parse_default_env()
        .init();

    let mut reader: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("cannot open {}", path.display()))?,
        ),
        None => Box::new(io::stdin().lock()),
    };
    anyhow::ensure!(args.chunk_size > 0, "chunk size must be positive");

    let mut parser = ubx_codec::Parser::default();
    let mut buffer = vec![0u8; args.chunk_size];
    let mut stats = Stats::default();

    loop {
        let bytes_read = reader.read(&mut buffer).context("read failed")?;
        if bytes_read == 0 {
            break;
        }
        let mut it = parser.consume(&buffer[..bytes_read]);
        loop {
            match it.next() {
                Some(Ok(packet)) => {
                    match &packet {
                        Packet::Known(_) => stats.known += 1,
                        Packet::Unknown(_) => stats.unknown += 1,
                    }
                    print_packet(&packet, args.json)?;
                },
                Some(Err(e)) => {
                    stats.errors += 1;
                    warn!("Received malformed packet: {e}");
                },
                None => {
                    // The internal buffer is now empty
                    break;
                },
            }
        }
    }

    if !parser.is_buffer_empty() {
        warn!("{} trailing bytes without a complete frame", parser.buffer_len());
    }
    info!(
        "{} packets decoded, {} with unknown id, {} rejected",
        stats.known, stats.unknown, stats.errors
    );
    Ok(())
}

fn print_packet(packet: &Packet, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(packet)?);
        return Ok(());
    }
    match packet {
        Packet::Known(msg) => {
            println!("{msg:?}");
            if let Some(summary) = summarize(msg) {
                println!("  {summary}");
            }
        },
        Packet::Unknown(unknown) => {
            println!("{} with {} payload bytes", unknown.id, unknown.payload.len());
        },
    }
    Ok(())
}

/// Human readable form of the few messages that carry one
fn summarize(msg: &Message) -> Option<String> {
    match msg.id() {
        MsgId::NAV_TIMEGPS => match gps_time_to_utc(msg) {
            Ok(utc) => Some(format!("UTC {}", utc.to_rfc3339())),
            Err(e) => Some(format!("no UTC time: {e}")),
        },
        MsgId::NAV_POSLLH => {
            let pos = Position::from_posllh(msg)?;
            Some(format!(
                "lat {:.7} lon {:.7} alt {:.3} m",
                pos.lat, pos.lon, pos.alt
            ))
        },
        MsgId::MON_VER => {
            let sw = c_string(msg.field("swVersion")?)?;
            let hw = c_string(msg.field("hwVersion")?)?;
            let extensions: Vec<String> = msg
                .field("extension")?
                .as_list()?
                .iter()
                .filter_map(c_string)
                .collect();
            Some(format!("sw {sw}, hw {hw}, {}", extensions.join(", ")))
        },
        _ => None,
    }
}
