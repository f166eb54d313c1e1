use cascade_config::{ConfigLoader, Value};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), cascade_config::ConfigError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dir = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let config = ConfigLoader::new().with_config_dir(&dir).load()?;

    println!(
        "environment: {}",
        config.environment().unwrap_or("<not resolved>")
    );
    for source in config.sources() {
        println!("  {} ({})", source.path.display(), source.stage);
    }

    match Value::Table(config.as_table().clone()).to_json() {
        Some(json) => println!("{json:#}"),
        None => println!("{:#?}", config.as_table()),
    }

    Ok(())
}
