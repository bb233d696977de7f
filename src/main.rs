use std::process;

use clap::Parser;

use critsum::Config;

fn main() {
    let config = Config::parse();

    env_logger::Builder::new()
        .filter_level(config.log_level())
        .parse_default_env()
        .init();

    if let Err(err) = critsum::run(&config) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}
