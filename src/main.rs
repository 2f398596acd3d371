use clap::Parser;
use log::warn;
use snafu::ErrorCompat;

mod args;
mod sim;

fn main() {
    let args = args::Args::parse();

    // RUST_LOG still wins when set; --verbose only bumps the default.
    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(e) = sim::run_simulation(&args) {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
