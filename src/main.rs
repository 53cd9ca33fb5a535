use lifegrid::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Usage: `lifegrid [config.json] [share-token]`
fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let mut args = std::env::args().skip(1);
  let config = match args.next() {
    Some(path) => EngineConfig::load(path)?,
    None => EngineConfig::default(),
  };
  let mut uni = Universe::from_config(&config)?;

  match args.next() {
    Some(token) => uni.load_share_token(&token)?,
    None => {
      if let Some(glider) = pattern::find("Glider") {
        uni.stamp_centered(glider);
      }
    }
  }

  uni.simulate(4);
  info!(
    generation = uni.generation(),
    live = uni.live_cells(),
    rule = %uni.ruleset(),
    "simulated"
  );

  println!("{}", uni.grid());
  println!("{}", uni.share_token());
  println!("{}", uni.pattern_text("lifegrid"));
  Ok(())
}
