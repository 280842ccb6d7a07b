use clap::Parser;

mod args;
mod commands;
mod svg;

fn main() -> anyhow::Result<()> {
    let args = args::Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    // RUST_LOG still overrides the flag.
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let mut out = std::io::stdout().lock();
    match args.command {
        args::Commands::Info(a) => commands::info_command(a, &mut out),
        args::Commands::Delete(a) => commands::delete_command(a, &mut out),
        args::Commands::Crop(a) => commands::crop_command(a, &mut out),
        args::Commands::Outline(a) => commands::outline_command(a, &mut out),
        args::Commands::Contacts(a) => commands::contacts_command(a, &mut out),
        args::Commands::Axis(a) => commands::axis_command(a, &mut out),
    }
}
