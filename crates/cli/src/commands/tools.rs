//! `parley tools`: List every capability the assistant would get.

use parley_agent::assemble_capabilities;
use parley_core::tool::CapabilitySet;
use parley_memory::FileScratchPad;
use std::path::PathBuf;
use std::sync::Arc;

fn render(capabilities: &CapabilitySet) -> String {
    let mut out = String::new();
    for cap in capabilities.iter() {
        let mut lines = cap.description().into_iter();
        out.push_str(&format!("  {} — {}\n", cap.name(), lines.next().unwrap_or_default()));
        for line in lines {
            out.push_str(&format!("      {line}\n"));
        }
    }
    out
}

pub async fn run(config: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config)?;
    let pad = Arc::new(FileScratchPad::new(config.scratchpad_path()));
    let capabilities = assemble_capabilities(&config, pad).await?;

    println!("🔧 {} capabilities\n", capabilities.len());
    print!("{}", render(&capabilities));
    Ok(())
}
