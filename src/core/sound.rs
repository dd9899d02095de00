//! Reminder chime.
//!
//! Audio is behind the `sound` feature; without it `play` only logs.

use super::reminders::model::ReminderSound;

/// Play a reminder sound on a background thread.
pub fn play(sound: ReminderSound) {
    let notes = sound.notes();
    if notes.is_empty() {
        return;
    }
    backend::play(notes);
}

#[cfg(feature = "sound")]
mod backend {
    use std::thread;
    use std::time::Duration;

    use log::warn;
    use rodio::source::{SineWave, Source};

    pub fn play(notes: &'static [(f32, u64)]) {
        thread::spawn(move || {
            let stream = match rodio::OutputStreamBuilder::open_default_stream() {
                Ok(stream) => stream,
                Err(e) => {
                    warn!("No audio output for reminder chime: {}", e);
                    return;
                }
            };
            let sink = rodio::Sink::connect_new(stream.mixer());
            for (frequency, millis) in notes {
                sink.append(
                    SineWave::new(*frequency)
                        .take_duration(Duration::from_millis(*millis))
                        .amplify(0.2),
                );
            }
            sink.sleep_until_end();
        });
    }
}

#[cfg(not(feature = "sound"))]
mod backend {
    use log::debug;

    pub fn play(notes: &'static [(f32, u64)]) {
        debug!("Chime requested ({} notes), built without sound", notes.len());
    }
}
