use mailduet_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let mut lines =
        vec!["effective config (source precedence: overrides > env > file > default):".to_string()];

    lines.push(render("database.url", &config.database.url));
    lines.push(render("database.max_connections", &config.database.max_connections.to_string()));
    lines.push(render("database.timeout_secs", &config.database.timeout_secs.to_string()));

    lines.push(render("mail.base_url", &config.mail.base_url));
    lines.push(render("mail.api_key", &redact(config.mail.api_key.expose_secret())));
    lines.push(render(
        "mail.webhook_secret",
        &config.mail.webhook_secret.as_deref().map(redact).unwrap_or_else(|| "(unset)".to_owned()),
    ));
    lines.push(render("mail.timeout_secs", &config.mail.timeout_secs.to_string()));

    lines.push(render("llm.provider", &format!("{:?}", config.llm.provider)));
    lines.push(render("llm.model", &config.llm.model));
    lines.push(render(
        "llm.base_url",
        config.llm.base_url.as_deref().unwrap_or("(unset)"),
    ));
    lines.push(render(
        "llm.api_key",
        &config
            .llm
            .api_key
            .as_ref()
            .map(|key| redact(key.expose_secret()))
            .unwrap_or_else(|| "(unset)".to_owned()),
    ));
    lines.push(render("llm.timeout_secs", &config.llm.timeout_secs.to_string()));

    lines.push(render("server.bind_address", &config.server.bind_address));
    lines.push(render("server.port", &config.server.port.to_string()));

    lines.push(render(
        "demo.public_base_url",
        config.demo.public_base_url.as_deref().unwrap_or("(unset)"),
    ));
    lines.push(render("demo.max_exchanges", &config.demo.max_exchanges.to_string()));

    lines.push(render(
        "scoring.propose_threshold",
        &config.scoring.propose_threshold.to_string(),
    ));
    lines.push(render(
        "scoring.clarify_threshold",
        &config.scoring.clarify_threshold.to_string(),
    ));

    lines.push(render("logging.level", &config.logging.level));
    lines.push(render("logging.format", &format!("{:?}", config.logging.format)));

    lines.join("\n")
}

fn render(key: &str, value: &str) -> String {
    format!("  {key} = {value}")
}

fn redact(secret: &str) -> String {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return "(unset)".to_owned();
    }
    let visible: String = trimmed.chars().take(4).collect();
    format!("{visible}… ({} chars)", trimmed.chars().count())
}
