use crate::output::is_quiet;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

/// Title line above a listing
pub fn header(icon: &str, text: &str) {
    if !is_quiet() {
        println!("{} {}", icon, text.style(theme().header.clone()));
    }
}

pub fn success(label: &str) {
    if !is_quiet() {
        println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
    }
}

/// Errors always reach stderr, quiet or not
pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn info(label: &str, value: &str) {
    if !is_quiet() {
        println!(
            "{} {}: {}",
            Icons::INFO.style(theme().info.clone()),
            label.style(theme().dim.clone()),
            value
        );
    }
}

pub fn dim(text: &str) -> String {
    text.style(theme().dim.clone()).to_string()
}

/// One `label value` line of a detail view
pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}
