use codeplay_core::{Config, HintClient};

/// Ask for a hint and print it. Always prints something.
pub fn run(level_id: u32, question: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let client = HintClient::from_config(&config.hint);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let hint = runtime.block_on(client.get_hint(level_id, question));
    println!("{hint}");
    Ok(())
}
