//! Configuration validation
//!
//! Catches misconfiguration at startup instead of on the first submission.

use anyhow::Result;
use opl_core::Config;

pub fn validate_config(config: &Config) -> Result<()> {
    if config.is_production() && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Set specific allowed origins via CORS_ORIGINS."
        ));
    }

    if !config.fetch.direct_link_template.contains("{id}") {
        return Err(anyhow::anyhow!(
            "DIRECT_LINK_TEMPLATE must contain an {{id}} placeholder"
        ));
    }
    if !config.fetch.direct_link_template.starts_with("http://")
        && !config.fetch.direct_link_template.starts_with("https://")
    {
        return Err(anyhow::anyhow!(
            "DIRECT_LINK_TEMPLATE must be an http(s) URL"
        ));
    }

    if config.max_body_bytes() == 0 {
        return Err(anyhow::anyhow!("MAX_BODY_BYTES cannot be 0"));
    }
    if config.fetch.max_image_bytes == 0 {
        return Err(anyhow::anyhow!("MAX_IMAGE_BYTES cannot be 0"));
    }
    if config.fetch.timeout_secs == 0 {
        return Err(anyhow::anyhow!("FETCH_TIMEOUT_SECS cannot be 0"));
    }
    if config.mail.timeout_secs == 0 {
        return Err(anyhow::anyhow!("SMTP_TIMEOUT_SECS cannot be 0"));
    }

    if !config.mail.email_from.contains('@') {
        return Err(anyhow::anyhow!(
            "EMAIL_FROM must be an email address (got '{}')",
            config.mail.email_from
        ));
    }

    if config.mail.smtp_port != 465 {
        tracing::warn!(
            smtp_port = config.mail.smtp_port,
            "SMTP port is not 465 - the transport always uses implicit TLS"
        );
    }

    Ok(())
}
