use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use currency_converter_core::logging::init_logging;
use currency_converter_core::models::settings::Settings;
use currency_converter_core::models::window::TimeWindow;
use currency_converter_core::services::window_controller::WindowState;
use currency_converter_core::ConversionSession;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional JSON settings file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List currencies available for conversion
    Currencies,
    /// Convert an amount and show the rate trend
    Convert {
        from: String,
        to: String,
        amount: String,
        /// Trend window: 1D, 5D, 1M, 1Y or 5Y (default: last 7 days)
        #[arg(short, long)]
        window: Option<TimeWindow>,
        /// Swap FROM and TO before converting
        #[arg(long)]
        swap: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, &["fxconv"])?;

    let result = run(cli).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "fxconv failed");
    }
    result
}

async fn run(cli: Cli) -> Result<()> {
    let settings = match cli.config_path.as_deref() {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let mut session = ConversionSession::new(settings)?;
    session
        .load_snapshot()
        .await
        .context("Unable to fetch exchange rates")?;

    match cli.command {
        Commands::Currencies => {
            println!("{}", session.available_currencies().join(" "));
        }
        Commands::Convert {
            from,
            to,
            amount,
            window,
            swap,
        } => {
            session.select_currencies(&from, &to);
            if swap {
                session.swap_selection();
            }

            let result = session.convert_amount(&amount)?;
            println!("{result}");

            let ticket = match window {
                Some(w) => session.select_window(w),
                None => session.select_default_window(),
            };
            ticket.finished().await;
            print_trend(&session.windows().state());
        }
    }

    Ok(())
}

fn print_trend(state: &WindowState) {
    match state {
        WindowState::Ready { series, .. } if series.is_empty() => {
            println!("No data available");
        }
        WindowState::Ready { series, .. } => {
            println!("\n{}", series.title());
            for point in &series.points {
                println!("  {}  {:.4}", point.label, point.value);
            }
            if let (Some(min), Some(max)) = (series.min_value(), series.max_value()) {
                println!("  min {min:.4}  max {max:.4}");
            }
            if let Some(change) = series.change_percent() {
                println!("  change {change:+.2}%");
            }
        }
        WindowState::Failed { error, .. } => eprintln!("{error}"),
        WindowState::Idle | WindowState::Fetching(_) => {}
    }
}
