#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

fn main() {
    if let Err(e) = pill_reminder::run() {
        eprintln!("pill-reminder: {}", e);
        std::process::exit(1);
    }
}
