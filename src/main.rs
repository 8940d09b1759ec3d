use anyhow::Result;
use clap::Parser;

mod app;
mod cli;
mod console;

use app::App;
use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp_millis()
        .init();

    println!("=== FINGER FLEX SIMULATOR ===");
    println!("Platform: {}", std::env::consts::OS);
    println!("Architecture: {}\n", std::env::consts::ARCH);

    let app = App::new(&cli)?;
    app.run()?;

    Ok(())
}
