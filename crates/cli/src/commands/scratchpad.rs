//! `parley scratchpad`: Print the assistant's private memory.

use parley_core::memory::ScratchPad;
use parley_memory::FileScratchPad;
use std::path::PathBuf;

pub async fn run(config: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config)?;
    let pad = FileScratchPad::new(config.scratchpad_path());

    println!("🧠 {}", pad.path().display());
    println!();
    let content = pad.content().await?;
    if content.is_empty() {
        println!("  (empty)");
    } else {
        println!("{content}");
    }
    Ok(())
}
