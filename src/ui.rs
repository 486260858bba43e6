//! Framing and status messages printed around the prompts.

use colored::Colorize;

const BANNER: &str = r"
 ██████╗ ██╗    ██╗████████╗
██╔════╝ ██║    ██║╚══██╔══╝
██║  ███╗██║ █╗ ██║   ██║
██║   ██║██║███╗██║   ██║
╚██████╔╝╚███╔███╔╝   ██║
 ╚═════╝  ╚══╝╚══╝    ╚═╝
";

pub fn banner() {
    println!("{}", BANNER.cyan());
}

/// Opens a flow
pub fn intro(title: &str) {
    println!("{}  {}", "┌".bright_black(), title.on_cyan().black());
    println!("{}", "│".bright_black());
}

/// Closes a flow that finished normally
pub fn outro(message: &str) {
    println!("{}  {}", "└".bright_black(), message);
    println!();
}

/// Closes a flow that stopped early
pub fn cancel(message: &str) {
    println!("{}  {}", "└".bright_black(), message.red());
    println!();
}

pub fn info(message: &str) {
    println!("{}  {}", "◇".green(), message);
}

pub fn warn(message: &str) {
    eprintln!("{} {}", "⚠ Warning:".yellow(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", "✗ Error:".red(), message);
}

/// Dims text shown as context inside a prompt
#[must_use]
pub fn dim(text: &str) -> String {
    text.dimmed().to_string()
}
