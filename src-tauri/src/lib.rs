use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use log::{info, warn};
use tauri::{Emitter, Manager, State};
use tauri_plugin_dialog::DialogExt;

use pill_reminder::core::{
    config::{ConfigManager, Settings},
    coordinator::Coordinator,
    household::Household,
    model::{Medicine, MedicineId, NewMedicine, Profile, ProfileId},
    notification::Notification,
    sound,
    status::MedicineStatus,
};

struct AppState {
    coordinator: Mutex<Coordinator>,
    settings: Mutex<Settings>,
    config_manager: ConfigManager,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, String> {
    mutex.lock().map_err(|e| e.to_string())
}

#[tauri::command]
fn get_household(state: State<'_, AppState>) -> Result<Household, String> {
    Ok(lock(&state.coordinator)?.household().clone())
}

#[tauri::command]
fn get_statuses(state: State<'_, AppState>) -> Result<Vec<MedicineStatus>, String> {
    Ok(lock(&state.coordinator)?.statuses(Utc::now()))
}

#[tauri::command]
fn add_profile(name: String, state: State<'_, AppState>) -> Result<ProfileId, String> {
    lock(&state.coordinator)?
        .add_profile(&name, Utc::now())
        .map_err(|e| e.to_string())
}

#[tauri::command]
fn select_profile(id: ProfileId, state: State<'_, AppState>) -> Result<(), String> {
    lock(&state.coordinator)?
        .select_profile(id, Utc::now())
        .map_err(|e| e.to_string())
}

#[tauri::command]
async fn delete_profile(
    id: ProfileId,
    app: tauri::AppHandle,
    state: State<'_, AppState>,
) -> Result<Option<Profile>, String> {
    let name = {
        let mut coordinator = lock(&state.coordinator)?;
        let household = coordinator.household();
        let name = household.profile(id).map(|profile| profile.name.clone());
        let count = household.profiles.len();
        match name {
            Some(name) if count > 1 => name,
            // Unknown or last profile: let the coordinator refuse it with a toast
            _ => {
                return coordinator
                    .delete_profile(id, Utc::now())
                    .map(Some)
                    .map_err(|e| e.to_string())
            }
        }
    };

    // Run blocking dialog on a separate thread to avoid freezing the UI
    let confirmed = tauri::async_runtime::spawn_blocking(move || {
        app.dialog()
            .message(format!("Remove {} and all of their medicines?", name))
            .title("Remove family member")
            .blocking_show()
    })
    .await
    .map_err(|e| e.to_string())?;

    if !confirmed {
        return Ok(None);
    }
    lock(&state.coordinator)?
        .delete_profile(id, Utc::now())
        .map(Some)
        .map_err(|e| e.to_string())
}

#[tauri::command]
fn add_medicine(
    profile_id: ProfileId,
    medicine: NewMedicine,
    state: State<'_, AppState>,
) -> Result<Medicine, String> {
    lock(&state.coordinator)?
        .add_medicine(profile_id, &medicine, Utc::now())
        .map_err(|e| e.to_string())
}

#[tauri::command]
fn delete_medicine(id: MedicineId, state: State<'_, AppState>) -> Result<Medicine, String> {
    lock(&state.coordinator)?
        .delete_medicine(id, Utc::now())
        .map_err(|e| e.to_string())
}

#[tauri::command]
fn acknowledge_dose(id: MedicineId, state: State<'_, AppState>) -> Result<(), String> {
    lock(&state.coordinator)?
        .acknowledge_dose(id, Utc::now())
        .map_err(|e| e.to_string())
}

#[tauri::command]
fn get_notification(state: State<'_, AppState>) -> Result<Option<Notification>, String> {
    Ok(lock(&state.coordinator)?.notification().cloned())
}

#[tauri::command]
fn close_notification(state: State<'_, AppState>) -> Result<(), String> {
    lock(&state.coordinator)?.close_notification();
    Ok(())
}

#[tauri::command]
fn get_settings(state: State<'_, AppState>) -> Result<Settings, String> {
    Ok(lock(&state.settings)?.clone())
}

#[tauri::command]
fn save_settings(settings: Settings, state: State<'_, AppState>) -> Result<(), String> {
    let mut current = lock(&state.settings)?;
    *current = settings.clone();
    state.config_manager.save(&settings).map_err(|e| e.to_string())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .setup(|app| {
            let handle = app.handle().clone();

            let config_dir = app.path().app_config_dir().unwrap_or(PathBuf::from("."));
            let data_dir = app.path().app_data_dir().unwrap_or(PathBuf::from("."));
            let config_manager = ConfigManager::new(config_dir);
            let settings = config_manager.load_or(|| Settings::with_data_dir(data_dir));
            let coordinator = Coordinator::open(&settings)?;
            let initial_settings = settings.clone();

            app.manage(AppState {
                coordinator: Mutex::new(coordinator),
                settings: Mutex::new(settings),
                config_manager,
            });

            if cfg!(debug_assertions) {
                app.handle().plugin(
                    tauri_plugin_log::Builder::default()
                        .level(log::LevelFilter::Info)
                        .build(),
                )?;
            }
            app.handle().plugin(tauri_plugin_dialog::init())?;

            // Reminder loop
            tauri::async_runtime::spawn(async move {
                let mut applied = initial_settings;
                info!("Reminder loop started. Data in {:?}", applied.data_dir);

                loop {
                    let app_state = handle.state::<AppState>();
                    let current_settings = match app_state.settings.lock() {
                        Ok(settings) => settings.clone(),
                        Err(e) => {
                            warn!("Settings lock poisoned: {}", e);
                            return;
                        }
                    };

                    let output = {
                        let Ok(mut coordinator) = app_state.coordinator.lock() else {
                            warn!("Coordinator lock poisoned, stopping reminders");
                            return;
                        };

                        // Hot-reload
                        if current_settings != applied {
                            if current_settings.data_dir != applied.data_dir {
                                info!("Data directory changed to: {:?}", current_settings.data_dir);
                                match Coordinator::open(&current_settings) {
                                    Ok(reopened) => *coordinator = reopened,
                                    Err(e) => warn!("Could not open {:?}: {}", current_settings.data_dir, e),
                                }
                            }
                            coordinator.apply_settings(&current_settings);
                            applied = current_settings;
                        }

                        let output = coordinator.tick(Utc::now());
                        if output.expired.is_some() || output.alert.is_some() {
                            let _ = handle.emit("notification", coordinator.notification().cloned());
                        }
                        output
                    };

                    for msg in output.logs {
                        info!("{}", msg);
                        let _ = handle.emit("backend-log", msg);
                    }

                    if let Some(alert) = output.alert {
                        sound::play(alert.sound);
                        let _ = handle.emit("dose-due", alert);
                    }

                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            });

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            get_household,
            get_statuses,
            add_profile,
            select_profile,
            delete_profile,
            add_medicine,
            delete_medicine,
            acknowledge_dose,
            get_notification,
            close_notification,
            get_settings,
            save_settings
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
