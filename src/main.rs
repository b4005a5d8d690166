use clap::Parser as _;
use growatt_profile_tools::commands;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(clap::Parser)]
#[clap(version, about, author)]
enum Commands {
    Profiles(commands::profiles::Args),
    Registers(commands::registers::Args),
    Decode(commands::decode::Args),
    Encode(commands::encode::Args),
    Plan(commands::plan::Args),
}

fn end<E: std::error::Error>(r: Result<(), E>) {
    std::process::exit(match r {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            let mut cause = e.source();
            while let Some(e) = cause {
                eprintln!("  because: {e}");
                cause = e.source();
            }
            1
        }
    });
}

fn main() {
    let filter_description =
        std::env::var("GROWATT_PROFILE_TOOLS_LOG").unwrap_or_else(|_| "warn".to_string());
    let filter = filter_description
        .parse::<tracing_subscriber::filter::targets::Targets>()
        .unwrap_or_else(|e| {
            eprintln!("warning: ignoring GROWATT_PROFILE_TOOLS_LOG: {e}");
            tracing_subscriber::filter::targets::Targets::new()
                .with_default(tracing::Level::WARN)
        });
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
    match Commands::parse() {
        Commands::Profiles(args) => end(commands::profiles::run(args)),
        Commands::Registers(args) => end(commands::registers::run(args)),
        Commands::Decode(args) => end(commands::decode::run(args)),
        Commands::Encode(args) => end(commands::encode::run(args)),
        Commands::Plan(args) => end(commands::plan::run(args)),
    }
}
