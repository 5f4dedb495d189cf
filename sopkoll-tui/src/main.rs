//! Terminal dashboard that polls a waste pickup schedule and shows per-type
//! sensor readings with day-relative flags.

mod app;
mod input;
mod ui;

use std::{
    io,
    sync::Arc,
    time::{Duration as StdDuration, Instant},
};

use anyhow::{Result, bail};
use chrono::{Duration, Weekday};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use sopkoll_core::{
    derive::WeekConvention,
    model::AddressQuery,
    ports::ScheduleSource,
    provider::{ProviderConfig, ScheduleProvider},
};
use sopkoll_provider_affarsverken::AffarsverkenSource;

use crate::app::App;
use crate::input::Action;

/// How often the event loop re-runs the provider tick. The cache gate makes
/// fresh ticks cheap, so this mainly keeps the day-relative flags current.
const TICK_INTERVAL: StdDuration = StdDuration::from_secs(60);

#[derive(Debug, Parser)]
#[command(name = "sopkoll", about = "Waste pickup schedule dashboard")]
struct Cli {
    /// Address to resolve pickups for, e.g. "Storgatan 1"
    address: String,

    /// Display name for this address (defaults to the address itself)
    #[arg(long)]
    name: Option<String>,

    /// Hours a fetched schedule stays fresh before the next upstream request
    #[arg(long, default_value_t = 12)]
    freshness_hours: u32,

    /// First day of the week for the "this week" flag (e.g. monday, sunday)
    #[arg(long, default_value = "monday")]
    week_start: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let address = AddressQuery::new(cli.address);
    if address.is_empty() {
        bail!("address must not be empty");
    }

    // HTTP + provider setup
    let client = Client::builder().user_agent("sopkoll/0.1").build()?;
    let source = Arc::new(AffarsverkenSource::new(client)) as Arc<dyn ScheduleSource>;

    let config = ProviderConfig {
        address,
        display_name: cli.name,
        freshness: Duration::hours(i64::from(cli.freshness_hours)),
        convention: WeekConvention {
            week_start: parse_week_start(&cli.week_start)?,
        },
    };
    let provider = Arc::new(ScheduleProvider::new(source, config));

    // App state
    let app = App::new(provider);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    let mut last_tick: Option<Instant> = None;

    loop {
        // Periodic update through the cache gate; fresh entries are served
        // without a network call.
        if last_tick.is_none_or(|instant| instant.elapsed() >= TICK_INTERVAL) {
            app.is_loading = app.readings.is_empty();
            terminal.draw(|frame| ui::draw(frame, &app))?;

            app.tick().await;
            app.is_loading = false;
            last_tick = Some(Instant::now());
        }

        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(250))?
            && let CEvent::Key(key) = event::read()?
        {
            match input::handle_key_event(key) {
                Action::Quit => break,
                Action::None => {}
                Action::ForceRefresh => {
                    app.is_loading = true;
                    app.error_message = None;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    app.force_refresh().await;
                    app.is_loading = false;
                    last_tick = Some(Instant::now());
                }
            }
        }
    }

    Ok(())
}

fn parse_week_start(raw: &str) -> Result<Weekday> {
    let normalized = raw.trim().to_lowercase();
    let weekday = match normalized.as_str() {
        "mon" | "monday" => Weekday::Mon,
        "tue" | "tuesday" => Weekday::Tue,
        "wed" | "wednesday" => Weekday::Wed,
        "thu" | "thursday" => Weekday::Thu,
        "fri" | "friday" => Weekday::Fri,
        "sat" | "saturday" => Weekday::Sat,
        "sun" | "sunday" => Weekday::Sun,
        _ => bail!("unknown week start day: {raw}"),
    };
    Ok(weekday)
}
