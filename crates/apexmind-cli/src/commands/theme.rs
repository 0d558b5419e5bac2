use clap::Subcommand;
use serde_json::json;

use super::{open_app, print_json};

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Print the current theme
    Get,
    /// Switch to dark mode
    Dark,
    /// Switch to light mode
    Light,
    /// Flip between dark and light
    Toggle,
}

pub fn run(action: ThemeAction) -> Result<(), Box<dyn std::error::Error>> {
    let (mut app, _config) = open_app()?;

    match action {
        ThemeAction::Get => {}
        ThemeAction::Dark => app.set_dark_mode(true),
        ThemeAction::Light => app.set_dark_mode(false),
        ThemeAction::Toggle => {
            let dark = !app.dark_mode();
            app.set_dark_mode(dark);
        }
    }
    print_json(&json!({ "dark_mode": app.dark_mode() }))?;
    Ok(())
}
