//! CLI administration tool for recipe-edge.
//!
//! Inspects the effective configuration and the decisions the middleware
//! stack would make, without starting the server.
//!
//! # Usage
//!
//! ```bash
//! # Show the configuration loaded from the environment
//! cargo run --bin admin -- config
//!
//! # Check which static URLs would be cached forever
//! cargo run --bin admin -- static-check /static/app.a1b2c3d4e5f6a1b2c3d4.js /static/app.js
//!
//! # Show the header a remote auth setting refers to
//! cargo run --bin admin -- header-name HTTP_OIDC_CLAIM_ID_TOKEN_EMAIL
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; see [`recipe_edge::config`].

use recipe_edge::api::middleware::static_files::StaticCachePolicy;
use recipe_edge::config::{self, Config, parse_header_name};
use recipe_edge::utils::cache_control::{CacheDirectives, patch_cache_control};

use axum::http::{HeaderMap, header};

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

/// CLI tool for inspecting recipe-edge.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Load, validate and print the configuration
    Config,

    /// Report the cache headers static URLs would receive
    StaticCheck {
        /// URLs to check, e.g. /static/app.a1b2c3d4e5f6a1b2c3d4.js
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Resolve a remote auth header setting to the HTTP header name
    HeaderName {
        /// Plain (X-Remote-User) or meta form (HTTP_X_REMOTE_USER)
        value: String,
    },
}

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Config => show_config(),
        Commands::StaticCheck { urls } => static_check(&urls),
        Commands::HeaderName { value } => header_name(&value),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn show_config() -> Result<()> {
    let config = config::load_from_env()?;

    println!("{}", "Configuration".bold());
    row("Configuration", &config.configuration_name);
    row("Listen", &config.listen_addr);
    row("Log", &format!("{} ({})", config.log_level, config.log_format));
    row(
        "Remote auth header",
        config.remote_auth_header_name()?.as_str(),
    );
    row("Static URL", &config.static_url);
    row("Static root", &config.static_root.display().to_string());
    row("Static max-age", &config.static_max_age.to_string());
    row("Append slash", &flag(config.append_slash));
    row(
        "Slash redirect max-age",
        &config.permanent_redirect_cache_time.to_string(),
    );
    row("HTTPS redirect", &flag(config.secure_ssl_redirect));
    row(
        "HTTPS redirect max-age",
        &config.https_redirect_cache_time.to_string(),
    );
    row(
        "HTTPS redirect host",
        config.secure_ssl_host.as_deref().unwrap_or("<request host>"),
    );
    row(
        "Proxy SSL header",
        config.secure_proxy_ssl_header.as_deref().unwrap_or("<none>"),
    );
    for pattern in &config.secure_redirect_exempt {
        row("Exempt", pattern);
    }

    Ok(())
}

fn static_check(urls: &[String]) -> Result<()> {
    // An invalid environment should not stop a quick check; fall back to defaults.
    let config = Config::from_env();
    let policy = StaticCachePolicy::from_config(&config);

    println!("{} {}", "Static prefix:".bold(), policy.prefix());
    for url in urls {
        if !url.starts_with(policy.prefix()) {
            println!("  {}  {}", url, "outside prefix".dimmed());
            continue;
        }

        let label = if policy.is_immutable_file(url) {
            "immutable".green()
        } else {
            "cacheable".yellow()
        };
        println!(
            "  {}  {}  Cache-Control: {}",
            url,
            label,
            render(policy.directives_for(url))
        );
    }

    Ok(())
}

fn header_name(value: &str) -> Result<()> {
    let name = parse_header_name(value)?;
    println!("{} -> {}", value, name.as_str().cyan());
    Ok(())
}

fn row(label: &str, value: &str) {
    println!("  {:<24} {}", format!("{label}:").dimmed(), value);
}

fn flag(on: bool) -> String {
    if on {
        "enabled".green().to_string()
    } else {
        "disabled".yellow().to_string()
    }
}

fn render(directives: CacheDirectives) -> String {
    let mut headers = HeaderMap::new();
    patch_cache_control(&mut headers, directives);
    headers
        .get(header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
