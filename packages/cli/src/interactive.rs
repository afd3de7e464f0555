//! Interactive menu for the taxi profit toolchain.
//!
//! Lets drivers look up profits and recommendations without memorizing
//! flags. The trip file is loaded on the first query that needs it and
//! reused for the rest of the session.

use dialoguer::{Input, Select};
use taxi_profit_cli_utils::MultiProgress;
use taxi_profit_config::AppConfig;

use crate::commands::{self, Session, current_hour};

/// Top-level actions available in the interactive menu.
enum Action {
    Lookup,
    Recommend,
    Insights,
    Zones,
    Sample,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Lookup,
        Self::Recommend,
        Self::Insights,
        Self::Zones,
        Self::Sample,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Lookup => "Look up expected profit",
            Self::Recommend => "Where should I drive next?",
            Self::Insights => "Show insights",
            Self::Zones => "List zones",
            Self::Sample => "Sample raw trip files",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the interactive menu loop until the user quits.
///
/// Failed actions (bad zone or hour, unreadable trip file) are reported and
/// the menu continues.
///
/// # Errors
///
/// Returns an error if the menu prompt itself fails.
pub fn run(multi: &MultiProgress, config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Taxi Profit");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
    let mut session: Option<Session> = None;

    loop {
        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        let action = &Action::ALL[idx];
        if matches!(action, Action::Quit) {
            return Ok(());
        }

        if let Err(e) = run_action(action, multi, &config, &mut session) {
            println!("Error: {e}");
        }
        println!();
    }
}

fn run_action(
    action: &Action,
    multi: &MultiProgress,
    config: &AppConfig,
    session: &mut Option<Session>,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        Action::Quit => Ok(()),
        Action::Zones => commands::list_zones(&commands::load_zones(config), false),
        Action::Sample => commands::sample(config, multi, false),
        Action::Lookup => {
            let session = ensure_session(session, config)?;
            let zone = prompt_i64("Zone id", None)?;
            let hour = prompt_i64("Hour (0-23)", Some(current_hour()))?;
            commands::lookup(session, zone, hour, false)
        }
        Action::Recommend => {
            let session = ensure_session(session, config)?;
            let zone = prompt_i64("Current zone id", None)?;
            let hour = prompt_i64("Current hour (0-23)", Some(current_hour()))?;
            commands::recommend(session, zone, hour, false)
        }
        Action::Insights => {
            let session = ensure_session(session, config)?;
            let zone = prompt_optional_i64("Zone id to profile (empty to skip)")?;
            let hour = prompt_i64("Hour to compare zones at (0-23)", Some(current_hour()))?;
            commands::insights(session, zone, Some(hour), false)
        }
    }
}

fn ensure_session<'a>(
    session: &'a mut Option<Session>,
    config: &AppConfig,
) -> Result<&'a Session, Box<dyn std::error::Error>> {
    if session.is_none() {
        *session = Some(Session::load(config.clone())?);
    }
    session.as_ref().ok_or_else(|| "trip data not loaded".into())
}

fn prompt_i64(prompt: &str, default: Option<i64>) -> Result<i64, Box<dyn std::error::Error>> {
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(default) = default {
        input = input.default(default.to_string());
    }
    let value = input.interact_text()?;
    Ok(value.trim().parse()?)
}

fn prompt_optional_i64(prompt: &str) -> Result<Option<i64>, Box<dyn std::error::Error>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;

    if input.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(input.trim().parse()?))
    }
}
