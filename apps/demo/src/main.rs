use chrono::NaiveDate;
use dotenv::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod stub;

use booking_form_cell::models::{DoctorId, FormSnapshot, SelectState, SpecialtyId};
use booking_form_cell::services::BookingFormService;
use shared_config::AppConfig;

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting booking form demo");

    // Load configuration, falling back to the built-in directory stub
    let mut config = AppConfig::from_env();
    if !config.is_configured() {
        let addr = stub::serve().await;
        config = AppConfig::with_directory_url(format!("http://{}", addr));
        info!("No directory configured, using the built-in stub");
    }

    let service = BookingFormService::start(&config);

    // Print each control snapshot as the engine publishes it
    let mut snapshots = service.snapshots();
    let printer = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            print_snapshot(&snapshot);
        }
    });

    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let mut parts = line.split_whitespace();
        let outcome = match (parts.next(), parts.next()) {
            (Some("specialty"), Some(arg)) => {
                service
                    .select_specialty(cleared(arg).map(SpecialtyId::from))
                    .await
            }
            (Some("doctor"), Some(arg)) => {
                service
                    .select_doctor(cleared(arg).map(DoctorId::from))
                    .await
            }
            (Some("date"), Some(arg)) => match parse_date(arg) {
                Ok(date) => service.select_date(date).await,
                Err(err) => {
                    warn!("Unparseable date {:?} ({}), dates look like 2024-06-03", arg, err);
                    continue;
                }
            },
            (Some("quit"), _) | (Some("exit"), _) => break,
            (None, _) => continue,
            _ => {
                print_help();
                continue;
            }
        };

        if outcome.is_err() {
            warn!("Engine stopped, exiting");
            break;
        }
    }

    service.shutdown().await;
    let _ = printer.await;
    info!("Demo stopped");
}

/// `-` clears a selection.
fn cleared(arg: &str) -> Option<&str> {
    (arg != "-").then_some(arg)
}

fn parse_date(arg: &str) -> Result<Option<NaiveDate>, chrono::format::ParseError> {
    if arg == "-" {
        return Ok(None);
    }
    NaiveDate::parse_from_str(arg, "%Y-%m-%d").map(Some)
}

fn print_snapshot(snapshot: &FormSnapshot) {
    println!("snapshot #{}", snapshot.revision);
    print_control("doctor", &snapshot.doctors);
    print_control("time", &snapshot.times);
}

fn print_control(name: &str, state: &SelectState) {
    match state {
        SelectState::Placeholder(placeholder) => {
            println!("  {:<7} ({})", name, placeholder.label());
        }
        SelectState::Items(items) => {
            println!("  {:<7} {} option(s)", name, items.len());
            for option in items {
                println!("    [{}] {}", option.value, option.label);
            }
        }
    }
}

fn print_help() {
    println!("commands:");
    println!("  specialty <id|->    select or clear the specialty");
    println!("  doctor <id|->       select or clear the doctor");
    println!("  date <YYYY-MM-DD|-> select or clear the appointment date");
    println!("  quit");
}
