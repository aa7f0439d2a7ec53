//! `parley doctor`: Diagnose configuration, keys and tool endpoints.

use parley_config::{AppConfig, ModelSetup};
use parley_tools::mcp;
use std::path::PathBuf;
use std::time::Duration;

fn key_for<'a>(config: &'a AppConfig, setup: &ModelSetup) -> Option<&'a str> {
    match setup.provider.as_str() {
        "openai" => config.openai_key.as_deref(),
        "gemini" => config.gemini_key.as_deref(),
        _ => None,
    }
}

/// One line per model role, plus whether it is ready to call.
fn check_model(config: &AppConfig, role: &str, setup: &ModelSetup) -> (bool, String) {
    if !matches!(setup.provider.as_str(), "openai" | "gemini") {
        return (false, format!("❌ {role}: unrecognised provider '{}'", setup.provider));
    }
    match key_for(config, setup) {
        Some(key) if !key.is_empty() => (true, format!("✅ {role}: {}/{}", setup.provider, setup.name)),
        _ => (
            false,
            format!("⚠️  {role}: {}/{} has no API key", setup.provider, setup.name),
        ),
    }
}

pub async fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Parley Doctor — System Diagnostics");
    println!("=====================================\n");

    let mut issues = 0;

    let config = match super::load_config(config_path) {
        Ok(config) => {
            println!("  ✅ Config loaded");
            config
        }
        Err(e) => {
            println!("  ❌ {e}");
            return Ok(());
        }
    };

    for (role, setup) in [("agent", &config.models.agent), ("selector", &config.models.selector)] {
        let (ok, line) = check_model(&config, role, setup);
        println!("  {line}");
        if !ok {
            issues += 1;
        }
    }

    let data = config.data_path();
    if data.exists() {
        println!("  ✅ Data directory {}", data.display());
    } else {
        println!("  ⚠️  No data directory at {} (scratchpad starts empty)", data.display());
        issues += 1;
    }

    match config.skill_set() {
        Ok(skills) => println!(
            "  ✅ {} skill(s), {} always active",
            skills.len(),
            skills.always_active().count()
        ),
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    let timeout = Duration::from_secs(config.request_timeout_secs);
    match config.tool_configs() {
        Ok(tools) => {
            for tool in tools {
                if !tool.enabled {
                    println!("  ➖ {} (disabled)", tool.url);
                    continue;
                }
                match mcp::discover(&tool.url, &tool.headers, timeout).await {
                    Ok(caps) => println!("  ✅ {} — {} tool(s)", tool.url, caps.len()),
                    Err(e) => {
                        println!("  ❌ {e}");
                        issues += 1;
                    }
                }
            }
        }
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
