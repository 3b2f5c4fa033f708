use std::{env, env::VarError};

/// The server has no real CLI. Any argument at all prints the help text and the current configuration.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Secrets are never printed
    const DISPLAY_ENVS: [&str; 17] = [
        "RUST_LOG",
        "TSG_HOST",
        "TSG_PORT",
        "TSG_DATABASE_URL",
        "TSG_PUBLIC_URL",
        "TSG_EVENT_NAME",
        "TSG_PRODUCT_PREFIX",
        "TSG_CURRENCY",
        "TSG_MAX_TICKETS_PER_ORDER",
        "TSG_STRIPE_API_URL",
        "TSG_STRIPE_TIMEOUT_SECS",
        "TSG_STRIPE_SIGNATURE_CHECKS",
        "TSG_STRIPE_SIGNATURE_TOLERANCE_SECS",
        "TSG_SMTP_HOST",
        "TSG_SMTP_PORT",
        "TSG_SMTP_USERNAME",
        "TSG_MAIL_FROM",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<40} {val:<15}");
    })
}
