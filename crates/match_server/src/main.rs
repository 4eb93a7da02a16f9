//! Checkers server CLI
//!
//! Host matches over TCP or replay a recorded one.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use checkers_core::Color;
use match_server::{replay, serve, JsonLinesMoveStore, MoveStore, ServerConfig, StreamSeat};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

const DEFAULT_FILTER: &str = "checkers_server=info,match_server=info,greedy_bot=info";

fn print_usage() {
    println!("Chinese Checkers match server");
    println!();
    println!("Usage:");
    println!("  checkers_server serve [--config FILE] [--bind ADDR] [--seats N] [--bots N]");
    println!("                        [--variant NAME] [--delay MS] [--record FILE]");
    println!("  checkers_server replay <FILE> [--match ID] [--delay MS]");
    println!("  checkers_server help");
    println!();
    println!("Seats: 1, 2, 3, 4 or 6. Bots fill the trailing seats.");
    println!("Variants:");
    println!("  default   - classic pairing, no kings");
    println!("  diamond   - diamond pairing, a king at each arm apex");
    println!();
    println!("Examples:");
    println!("  checkers_server serve --seats 3 --bots 2 --record moves.jsonl");
    println!("  checkers_server replay moves.jsonl --delay 1000");
}

/// Value following the flag at `args[*i]`, advancing past it.
fn flag_value<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str> {
    let flag = &args[*i];
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .with_context(|| format!("{flag} needs a value"))
}

/// Parse the value following the flag at `args[*i]`.
fn parse_flag<T>(args: &[String], i: &mut usize) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let flag = &args[*i];
    let value = flag_value(args, i)?;
    value
        .parse()
        .with_context(|| format!("invalid {flag}: {value}"))
}

fn run_serve(args: &[String]) -> Result<()> {
    // A config file is the base layer; later flags override it.
    let mut config = match args.iter().position(|a| a == "--config" || a == "-c") {
        Some(pos) => {
            let path = args.get(pos + 1).context("--config needs a value")?;
            ServerConfig::load(Path::new(path))?
        }
        None => ServerConfig::default(),
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                flag_value(args, &mut i)?;
            }
            "--bind" | "-b" => config.bind = flag_value(args, &mut i)?.to_string(),
            "--seats" | "-s" => config.seats = parse_flag(args, &mut i)?,
            "--bots" => config.bots = parse_flag(args, &mut i)?,
            "--variant" | "-v" => config.variant = flag_value(args, &mut i)?.to_string(),
            "--delay" | "-d" => config.bot_delay_ms = parse_flag(args, &mut i)?,
            "--record" | "-r" => {
                config.record_path = Some(PathBuf::from(flag_value(args, &mut i)?));
            }
            other => bail!("unknown option for serve: {other}"),
        }
        i += 1;
    }

    config.validate()?;
    tracing::info!(?config, "starting server");
    serve(&config)?;
    Ok(())
}

fn run_replay(args: &[String]) -> Result<()> {
    let Some(path) = args.first() else {
        bail!("replay needs a record file");
    };

    let mut match_id: Option<Uuid> = None;
    let mut delay_ms: u64 = 0;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--match" | "-m" => match_id = Some(parse_flag(args, &mut i)?),
            "--delay" | "-d" => delay_ms = parse_flag(args, &mut i)?,
            other => bail!("unknown option for replay: {other}"),
        }
        i += 1;
    }

    let store = JsonLinesMoveStore::new(path);
    let matches = store.matches()?;
    let info = match match_id {
        Some(id) => matches
            .into_iter()
            .find(|m| m.match_id == id)
            .with_context(|| format!("no match {id} in {path}"))?,
        None => matches
            .into_iter()
            .last()
            .with_context(|| format!("no matches recorded in {path}"))?,
    };
    let moves = store.moves(info.match_id)?;
    tracing::info!(match_id = %info.match_id, moves = moves.len(), "replaying");

    let spectator = StreamSeat::new(Color::None, "stdout", io::empty(), io::stdout());
    let delay = Duration::from_millis(delay_ms);
    replay(&info, &moves, &mut [spectator], delay)?;
    Ok(())
}

fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    match args[1].as_str() {
        "serve" => run_serve(&args[2..]),
        "replay" => run_replay(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            Ok(())
        }
    }
}
