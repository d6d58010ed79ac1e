use anyhow::Result;
use gate_config::Config;
use gate_security::Redactor;
use std::path::Path;

pub fn handle(config: &Config, path: Option<&Path>) -> Result<()> {
    let path = path.map_or_else(Config::config_path, Path::to_path_buf);
    println!("# {}", path.display());

    // Credentials embedded in the database URL must not reach the terminal
    let rendered = config.to_toml()?;
    let redactor =
        Redactor::with_structured_prefixes(config.redaction.structured_prefixes.iter().cloned());
    println!("{}", redactor.redact(&rendered));

    Ok(())
}
