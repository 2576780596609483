use std::fs::File;
use std::path::Path;

use bithist_core::{serializer, ContextDriver, ModelConfig};
use bithist_dsa::Automaton;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 || args.len() > 4 {
        eprintln!("usage: bithist <input> <output> [config.toml]");
        std::process::exit(2);
    }

    let config = match args.get(3) {
        Some(path) => ModelConfig::load(Path::new(path))?,
        None => ModelConfig::default(),
    };
    tracing::info!(
        "bithist: capacity {}, throttle at {}%",
        config.capacity,
        config.throttle_percent
    );

    let mut fsm = Automaton::with_throttle(config.capacity, config.throttle_percent);
    let mut driver = ContextDriver::new();

    let input = File::open(&args[1])?;
    let bytes = driver.run(&mut fsm, input)?;
    tracing::info!(
        "bithist: {} bytes processed, {} live states",
        bytes,
        fsm.live()
    );

    serializer::write_table_file(&mut fsm, Path::new(&args[2]))?;
    Ok(())
}
