use anyhow::Result;
use gate_config::Config;
use gate_security::Redactor;
use std::io::Read;

pub fn handle(config: &Config, text: Option<String>) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let redactor =
        Redactor::with_structured_prefixes(config.redaction.structured_prefixes.iter().cloned());
    print!("{}", redactor.redact(&text));

    Ok(())
}
