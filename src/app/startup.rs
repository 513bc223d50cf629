//! Application startup and run loop

use super::cli::args::Args;
use super::cli::config::{load_file_settings, AppSettings};
use super::cli::display::{conservation_line, summary_table, LiveView};
use crate::core::error_handling::{fatal_message, log_error_with_context};
use crate::core::logging::init_logging;
use crate::core::shutdown::{CancellationSignal, ShutdownCoordinator};
use crate::core::styles::{palette_to_clap, StyleRole};
use crate::notifications::api::{
    Event, EventFilter, EventReceiver, NotificationManager, SystemEvent, SystemEventType,
};
use crate::pipeline::api::{Orchestrator, PipelineResult};
use clap::{CommandFactory, FromArgMatches};
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

const DISPLAY_SUBSCRIBER: &str = "terminal";

/// Run the application and return the process exit code
pub async fn run() -> i32 {
    let terminal = std::io::stdout().is_terminal();
    let args = parse_args(terminal);

    let file_settings = match load_file_settings(args.config_file.as_deref()).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", fatal_message(&e, "Could not load configuration"));
            return 1;
        }
    };
    let settings = AppSettings::merge(file_settings, &args, terminal);

    if let Err(e) = init_logging(&settings.log) {
        eprintln!("Error: failed to initialise logging: {e}");
        return 1;
    }
    log::info!("prodcons {} starting", env!("CARGO_PKG_VERSION"));
    log::debug!("Settings: {:?}", settings);

    match ShutdownCoordinator::guard(|cancel| run_pipeline(settings, cancel)).await {
        Ok(()) => 0,
        Err(e) => {
            log_error_with_context(&e, "Pipeline failed");
            1
        }
    }
}

fn parse_args(color: bool) -> Args {
    let matches = Args::command()
        .styles(palette_to_clap(color))
        .get_matches();
    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

async fn run_pipeline(settings: AppSettings, cancel: CancellationSignal) -> PipelineResult<()> {
    let color = settings.log.color;
    let notifier = Arc::new(NotificationManager::new());
    let events = notifier.subscribe(
        DISPLAY_SUBSCRIBER,
        EventFilter::StatisticsAndSystem,
        "app:display",
    );
    let orchestrator = Orchestrator::standalone(notifier.clone());

    orchestrator.start(settings.pipeline.clone()).await?;
    let display = tokio::spawn(live_view(events, settings.pipeline.tick_interval(), color));

    match settings.duration {
        Some(duration) => {
            log::info!("Running for {:?}", duration);
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(duration) => {}
            }
        }
        None => {
            log::info!("Running until interrupted");
            cancel.cancelled().await;
        }
    }

    let stopped = orchestrator.stop().await;
    notifier.unsubscribe(DISPLAY_SUBSCRIBER);
    if let Err(e) = display.await {
        log::debug!("Display task ended abnormally: {}", e);
    }

    print_summary(&orchestrator, color);
    stopped
}

/// Print a status line every `period` from the statistics stream
async fn live_view(mut events: EventReceiver, period: Duration, color: bool) {
    let mut view = LiveView::new(color);
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(Event::Statistics(stats)) => view.apply(stats),
                Some(Event::System(SystemEvent { event_type: SystemEventType::Stopped, .. })) | None => break,
                Some(_) => {}
            },
            _ = interval.tick() => {
                if view.has_workers() {
                    println!("{}", view.status_line());
                }
            }
        }
    }
}

fn print_summary(orchestrator: &Orchestrator, color: bool) {
    let producers = orchestrator.get_producer_statistics();
    let consumers = orchestrator.get_consumer_statistics();
    let queue = orchestrator.get_queue_statistics();

    println!();
    println!("{}", StyleRole::Header.paint("Summary", color));
    let _ = summary_table(&producers, &consumers, &queue, color).printstd();

    let produced: u64 = producers.iter().map(|p| p.total_produced).sum();
    let consumed: u64 = consumers.iter().map(|c| c.total_consumed).sum();
    let (holds, line) = conservation_line(produced, consumed, queue.current_size, color);
    println!("{line}");
    if !holds {
        log::warn!(
            "Item accounting does not balance: {} produced, {} consumed, {} queued",
            produced,
            consumed,
            queue.current_size
        );
    }
}
