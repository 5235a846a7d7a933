//! The `flagmaster init` command.

use std::path::Path;

use anyhow::Result;

use flagmaster_core::dataset::BUILTIN_DATASET;

pub fn execute() -> Result<()> {
    write_if_missing("flagmaster.toml", SAMPLE_CONFIG)?;
    write_if_missing("countries.toml", BUILTIN_DATASET)?;

    println!("\nNext steps:");
    println!("  1. Put your Gemini key in GEMINI_API_KEY (or edit flagmaster.toml)");
    println!("  2. Run: flagmaster validate --dataset countries.toml");
    println!("  3. Run: flagmaster play --dataset countries.toml");

    Ok(())
}

fn write_if_missing(path: &str, content: &str) -> Result<()> {
    if Path::new(path).exists() {
        println!("{path} already exists, skipping.");
    } else {
        std::fs::write(path, content)?;
        println!("Created {path}");
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# flagmaster configuration

default_provider = "gemini"
default_model = "gemini-2.5-flash"
fact_timeout_secs = 15
fallback_fact = "This country has a rich and unique history!"

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"

[game]
# "count-capped": a wrong answer counts toward the level but never clears it.
# "no-progress": a wrong answer leaves the level count alone.
wrong_answer = "count-capped"
correct_delay_ms = 800
wrong_delay_ms = 2000
fact_delay_ms = 4000
"#;
