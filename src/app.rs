use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use log::{info, warn};

use crate::core::{
    config::{ConfigManager, Settings},
    coordinator::Coordinator,
    error::{ReminderError, Result},
    model::{MedicineId, NewMedicine, ProfileId},
    parser, sound,
    status::MedicineStatus,
};

const USAGE: &str = "\
Usage: pill-reminder [command]

Commands:
  watch                          Run reminders until interrupted (default)
  list                           Show profiles and medicines
  add-profile <name>             Add a family member and select them
  remove-profile <profile-id>    Remove a family member
  use <profile-id>               Select a family member
  add <name> <every> <for>       Add a medicine, e.g. add Ibuprofen \"8 hours\" \"7 days\"
  remove <medicine-id>           Remove a medicine
  taken <medicine-id>            Acknowledge the last reminder
  help                           Show this text";

/// settings.json is re-read this often while watching (one tick per second)
const SETTINGS_RELOAD_TICKS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Watch,
    List,
    AddProfile(String),
    RemoveProfile(ProfileId),
    Use(ProfileId),
    Add(NewMedicine),
    Remove(MedicineId),
    Taken(MedicineId),
    Help,
}

fn parse_id(text: Option<&String>) -> Result<u64> {
    let text = text.ok_or_else(|| ReminderError::parse("", "missing id"))?;
    text.parse()
        .map_err(|_| ReminderError::parse(text, "expected a numeric id"))
}

fn parse_args(args: &[String]) -> Result<Command> {
    let Some(command) = args.first() else {
        return Ok(Command::Watch);
    };
    let rest = &args[1..];

    match command.as_str() {
        "watch" => Ok(Command::Watch),
        "list" | "ls" => Ok(Command::List),
        "add-profile" => {
            let name = rest.join(" ");
            Ok(Command::AddProfile(name))
        }
        "remove-profile" => parse_id(rest.first()).map(Command::RemoveProfile),
        "use" => parse_id(rest.first()).map(Command::Use),
        "add" => match rest {
            [name, every, period] => Ok(Command::Add(NewMedicine::new(
                name.clone(),
                parser::parse_frequency(every)?,
                parser::parse_duration(period)?,
            ))),
            _ => Err(ReminderError::parse(
                &rest.join(" "),
                "expected <name> <every> <for>",
            )),
        },
        "remove" | "rm" => parse_id(rest.first()).map(Command::Remove),
        "taken" => parse_id(rest.first()).map(Command::Taken),
        "help" | "-h" | "--help" => Ok(Command::Help),
        other => Err(ReminderError::parse(other, "unknown command")),
    }
}

fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PILL_REMINDER_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".config/pill-reminder")
}

fn format_status(status: &MedicineStatus) -> String {
    let next = if status.overdue {
        "Take now!".to_string()
    } else {
        format!("Next: {}", status.countdown)
    };
    let flag = if status.notified { "  (reminded)" } else { "" };
    format!(
        "  [{}] {}  {}, {}  {}  {}{}",
        status.id,
        status.name,
        status.frequency_label,
        status.duration_label.to_lowercase(),
        next,
        status.duration_left,
        flag
    )
}

fn print_household(coordinator: &Coordinator) {
    let now = Utc::now();
    let household = coordinator.household();
    for profile in &household.profiles {
        let marker = if profile.id == household.active_profile { "*" } else { " " };
        println!("{} {} (profile {})", marker, profile.name, profile.id);
        if profile.medicines.is_empty() {
            println!("  No medications added yet");
        }
        for medicine in &profile.medicines {
            println!("{}", format_status(&MedicineStatus::at(medicine, now)));
        }
    }
}

/// Print and drop whatever toast the last action produced.
fn flush_notification(coordinator: &mut Coordinator) {
    if let Some(notification) = coordinator.close_notification() {
        println!("{}", notification.message);
    }
}

async fn watch(config_manager: ConfigManager, mut settings: Settings, mut coordinator: Coordinator) {
    info!(
        "Watching reminders in {:?}, checking every {}s",
        settings.data_dir,
        settings.check_interval().as_secs()
    );
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let mut ticks: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping reminders");
                return;
            }
        }

        ticks += 1;
        if ticks % SETTINGS_RELOAD_TICKS == 0 {
            let reloaded = config_manager.load();
            if reloaded != settings {
                if reloaded.data_dir != settings.data_dir {
                    warn!("Data directory changes apply after a restart");
                }
                info!("Settings changed, applying");
                coordinator.apply_settings(&reloaded);
                settings = reloaded;
            }
        }

        let output = coordinator.tick(Utc::now());
        for msg in &output.logs {
            info!("{}", msg);
        }
        if let Some(alert) = output.alert {
            println!("[{}] {}", Utc::now().format("%Y-%m-%d %H:%M"), alert.message);
            sound::play(alert.sound);
        }
    }
}

/// Terminal entry point.
pub fn run() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;
    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config_manager = ConfigManager::new(config_dir());
    let settings = config_manager.load();
    let mut coordinator = Coordinator::open(&settings)?;
    let now = Utc::now();

    match command {
        Command::Watch => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(watch(config_manager, settings, coordinator));
            return Ok(());
        }
        Command::List => {
            print_household(&coordinator);
            return Ok(());
        }
        Command::AddProfile(name) => {
            coordinator.add_profile(&name, now)?;
        }
        Command::RemoveProfile(id) => {
            coordinator.delete_profile(id, now)?;
        }
        Command::Use(id) => {
            coordinator.select_profile(id, now)?;
            println!("Now managing {}", coordinator.household().active().name);
        }
        Command::Add(new_medicine) => {
            let profile_id = coordinator.household().active_profile;
            let medicine = coordinator.add_medicine(profile_id, &new_medicine, now)?;
            println!(
                "First dose of {} due at {}",
                medicine.name,
                medicine.next_dose.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
            );
        }
        Command::Remove(id) => {
            coordinator.delete_medicine(id, now)?;
        }
        Command::Taken(id) => {
            coordinator.acknowledge_dose(id, now)?;
            println!("Marked as taken");
        }
        Command::Help => {}
    }

    flush_notification(&mut coordinator);
    Ok(())
}
