//! Clawset CLI — terminal output helpers.
//!
//! Everything that prints outside a prompt lives here so `main.rs` stays
//! about dispatch.

use colored::*;

use clawset_core::auth::AuthProfiles;
use clawset_core::catalog::ModelDescriptor;
use clawset_core::config::OpenclawConfig;

// ─── Box Drawing ─────────────────────────────────────────────

/// Card with a title line.
///
/// ```text
/// ╭── Title ──────────────────────╮
/// │  line1                        │
/// ╰───────────────────────────────╯
/// ```
pub fn print_card(title: &str, lines: &[String], width: usize) {
    let inner = width.saturating_sub(2);

    let label = if title.is_empty() {
        "─".repeat(inner)
    } else {
        let t = format!(" {} ", title);
        let dashes = inner.saturating_sub(t.chars().count() + 2);
        format!("─ {}{}", t, "─".repeat(dashes))
    };
    println!("{}", format!("╭{}╮", label).cyan());

    for line in lines {
        let padding = inner.saturating_sub(console::measure_text_width(line) + 2);
        println!("{}  {}{}{}", "│".cyan(), line, " ".repeat(padding), "│".cyan());
    }

    println!("{}", format!("╰{}╯", "─".repeat(inner)).cyan());
}

// ─── Banner ──────────────────────────────────────────────────

/// Intro card for the interactive menu.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");

    println!();
    println!("{}", "  ╔════════════════════════════════════════════╗".cyan());
    println!(
        "{}",
        format!("  ║  🦞 Clawset v{:<30}║", version).cyan().bold()
    );
    println!("{}", "  ║     OpenClaw providers, models and keys    ║".cyan());
    println!("{}", "  ║     ESC goes back · Ctrl-C quits           ║".cyan().dimmed());
    println!("{}", "  ╚════════════════════════════════════════════╝".cyan());
    println!();
}

// ─── Show ────────────────────────────────────────────────────

/// Hide all but the edges of a secret.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 10 {
        return "•".repeat(chars.len().max(4));
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}••••{}", head, tail)
}

/// Lines describing the current configuration, keys masked.
pub fn summary_lines(config: &OpenclawConfig, auth: &AuthProfiles) -> Vec<String> {
    let primary = config.primary_model();
    let mut lines = vec![format!(
        "{} {} {}",
        "Primary".dimmed(),
        "›".dimmed(),
        primary.unwrap_or("(none)").green().bold()
    )];

    lines.push(String::new());
    lines.push("Providers".bold().to_string());
    let providers = config.provider_names();
    if providers.is_empty() {
        lines.push(format!("  {}", "(none)".dimmed()));
    }
    for name in providers {
        let url = config.provider_base_url(&name).unwrap_or("");
        lines.push(format!("  {} {}  {}", "•".dimmed(), name.cyan(), url.dimmed()));
    }

    lines.push(String::new());
    lines.push("Models".bold().to_string());
    let models = config.configured_models();
    if models.is_empty() {
        lines.push(format!("  {}", "(none)".dimmed()));
    }
    for key in models {
        let marker = if primary == Some(key.as_str()) { "★".yellow() } else { "•".dimmed() };
        lines.push(format!("  {} {}", marker, key));
    }

    lines.push(String::new());
    lines.push("Credentials".bold().to_string());
    let profile_keys = auth.keys();
    if profile_keys.is_empty() {
        lines.push(format!("  {}", "(none)".dimmed()));
    }
    for profile_key in profile_keys {
        let masked = profile_key
            .strip_suffix(":default")
            .and_then(|provider| auth.get(provider))
            .map(|p| mask_key(&p.key))
            .unwrap_or_default();
        lines.push(format!("  {} {}  {}", "•".dimmed(), profile_key.cyan(), masked.dimmed()));
    }

    lines
}

/// Print the `show` card.
pub fn print_summary(path: &std::path::Path, config: &OpenclawConfig, auth: &AuthProfiles) {
    println!();
    println!("  {} {} {}", "Config".dimmed(), "›".dimmed(), path.display());
    println!();
    print_card("OpenClaw", &summary_lines(config, auth), 64);
    println!();
}

// ─── Models ──────────────────────────────────────────────────

pub fn print_models(models: &[ModelDescriptor]) {
    println!(
        "\n{}",
        format!("  📦 Models ({}) ─────────────────────────────", models.len()).cyan()
    );
    for model in models {
        println!(
            "     {} {:<44} {}",
            "•".dimmed(),
            model.key.cyan(),
            model.name.dimmed()
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clawset_core::auth::AuthProfile;
    use clawset_core::config::ProviderEntry;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("sk-1234567890abcd"), "sk-••••abcd");
        assert_eq!(mask_key("short"), "•••••");
        assert_eq!(mask_key(""), "••••");
    }

    #[test]
    fn test_summary_hides_secrets() {
        colored::control::set_override(false);
        let mut config = OpenclawConfig::default();
        config
            .set_provider("openai", ProviderEntry::new("https://www.packyapi.com/v1"))
            .unwrap();
        config.set_primary_model("openai/gpt-5");
        let mut auth = AuthProfiles::default();
        auth.set(AuthProfile::api_key("openai", "sk-supersecretvalue"))
            .unwrap();

        let text = summary_lines(&config, &auth).join("\n");
        assert!(text.contains("openai/gpt-5"));
        assert!(text.contains("https://www.packyapi.com/v1"));
        assert!(text.contains("openai:default"));
        assert!(!text.contains("supersecret"));
    }

    #[test]
    fn test_summary_of_empty_config() {
        colored::control::set_override(false);
        let text = summary_lines(&OpenclawConfig::default(), &AuthProfiles::default()).join("\n");
        assert!(text.contains("(none)"));
    }
}
