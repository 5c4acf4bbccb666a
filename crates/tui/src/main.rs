use spese_tui::error::Result;
use spese_tui::{app, config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;

    // Logs go to stderr so they never draw over the alternate screen.
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "spese_tui={level},engine={level}",
            level = config.log
        ))
        .with_writer(std::io::stderr)
        .init();

    let mut app = app::App::new(config)?;
    app.run().await?;
    Ok(())
}
