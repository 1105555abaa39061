use btc_info::{
    constants::{PROGRAM_COMMENT, PROGRAM_NAME},
    AppConfig, Currency, FetchAggregator, HttpFetcher, RefreshInterval, RefreshScheduler,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const RULE_WIDTH: usize = 26;

#[derive(Debug, PartialEq)]
enum Command {
    Refresh,
    Currency(Currency),
    Interval(RefreshInterval),
    List,
    About,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(None);
    };
    let arg = parts.next();

    let command = match (verb.to_ascii_lowercase().as_str(), arg) {
        ("r" | "refresh", None) => Command::Refresh,
        ("c" | "currency", Some(code)) => {
            Command::Currency(code.parse().map_err(|e| format!("{}", e))?)
        }
        ("i" | "interval", Some(secs)) => {
            let secs: u64 = secs
                .parse()
                .map_err(|_| format!("Not a number of seconds: {}", secs))?;
            Command::Interval(RefreshInterval::try_from(secs).map_err(|e| format!("{}", e))?)
        }
        ("l" | "list", None) => Command::List,
        ("a" | "about", None) => Command::About,
        ("h" | "help" | "?", None) => Command::Help,
        ("q" | "quit" | "exit", None) => Command::Quit,
        _ => return Err(format!("Unknown command: {}", line.trim())),
    };

    Ok(Some(command))
}

fn print_help() {
    println!("Commands:");
    println!("  r, refresh          refresh now");
    println!("  c, currency <CODE>  switch quote currency");
    println!("  i, interval <SECS>  change refresh interval");
    println!("  l, list             list currencies and intervals");
    println!("  a, about            about this program");
    println!("  q, quit             exit");
}

fn print_choices() {
    println!("Currencies:");
    for currency in Currency::all() {
        println!("  {}  {}", currency.code(), currency.name());
    }
    println!("Intervals:");
    for interval in RefreshInterval::all() {
        println!("  {:>4}  {}", interval.secs(), interval.label());
    }
}

fn print_about() {
    println!("{} {}", PROGRAM_NAME, env!("CARGO_PKG_VERSION"));
    println!("{}", PROGRAM_COMMENT);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries the reports
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,btc_info=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        currency = %config.currency,
        refresh_interval_secs = config.interval.secs(),
        "Configuration loaded"
    );

    let fetcher = Arc::new(HttpFetcher::with_timeout(config.request_timeout)?);
    let aggregator = FetchAggregator::with_timeout(fetcher, config.request_timeout);
    let scheduler = RefreshScheduler::new(
        aggregator,
        config.endpoints(),
        Arc::new(|text: &str| {
            println!("{}", "─".repeat(RULE_WIDTH));
            println!("{}", text);
        }),
    );

    scheduler.start(config.interval).await;
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };

        // EOF or Ctrl-C
        let Some(line) = line else {
            break;
        };

        match parse_command(&line) {
            Ok(Some(Command::Refresh)) => scheduler.trigger_now().await,
            Ok(Some(Command::Currency(currency))) => scheduler.set_currency(currency).await,
            Ok(Some(Command::Interval(interval))) => scheduler.reconfigure(interval).await,
            Ok(Some(Command::List)) => print_choices(),
            Ok(Some(Command::About)) => print_about(),
            Ok(Some(Command::Help)) => print_help(),
            Ok(Some(Command::Quit)) => break,
            Ok(None) => {}
            Err(message) => {
                println!("{}", message);
                print_help();
            }
        }
    }

    scheduler.shutdown().await;
    Ok(())
}
