//! Terminal feedback: progress bars and status lines.

/// Progress bars for long stages
pub mod progress;

pub use progress::ProgressManager;

use colored::*;

/// Prints a success message
pub fn print_success(message: &str) {
    println!("{} {}", "[SUCCESS]".bright_green(), message);
}

/// Prints an info message
pub fn print_info(message: &str) {
    println!("{} {}", "[INFO]".bright_blue(), message);
}

/// Prints an error message to stderr
pub fn print_error(message: &str) {
    eprintln!("{} {}", "[ERROR]".bright_red(), message);
}
