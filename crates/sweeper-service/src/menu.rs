//! Interactive scenario selection.

use colored::Colorize;
use std::io::{self, BufRead, Write};
use sweeper_core::Scenario;

/// Numbered list of scenarios.
pub fn render_menu() -> String {
	let mut menu = format!("{}\n", "Choose a scenario:".bold());
	for (index, scenario) in Scenario::ALL.iter().enumerate() {
		menu.push_str(&format!("  {} {}\n", format!("{}.", index + 1).cyan(), scenario));
	}
	menu
}

/// Message printed for input that names no scenario.
pub fn unknown_choice_message() -> String {
	format!(
		"I could not understand you...\nAvailable scenarios are: {}",
		Scenario::list().magenta()
	)
}

/// Resolves the scenario from `preset` or by prompting on `input`.
///
/// Returns `None` when the choice is not a known scenario; the caller exits
/// cleanly in that case.
pub fn choose_scenario<R: BufRead>(preset: Option<&str>, input: &mut R) -> io::Result<Option<Scenario>> {
	let choice = match preset {
		Some(choice) => choice.to_string(),
		None => {
			print!("{}> ", render_menu());
			io::stdout().flush()?;
			let mut line = String::new();
			input.read_line(&mut line)?;
			line
		},
	};

	match choice.parse::<Scenario>() {
		Ok(scenario) => Ok(Some(scenario)),
		Err(_) => {
			println!("{}", unknown_choice_message());
			Ok(None)
		},
	}
}
