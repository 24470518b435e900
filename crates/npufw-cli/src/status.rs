//! Progress lines in the `[+]` / `[-]` style

use owo_colors::OwoColorize;

pub fn step(message: &str) {
    println!("{} {}", "[+]".green(), message);
}

pub fn failure(message: &str) {
    eprintln!("{} {}", "[-]".red(), message);
}
