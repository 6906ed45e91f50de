use bevy::app::AppExit;
use bevy::prelude::*;

use crate::engine::session::{SessionEvent, SessionMode};
use crate::engine::volume::dataset::VolumePayload;
use crate::engine::volume::systems::SetVolume;

/// `I` toggles an emulated immersive session, `R` reloads the synthetic
/// volume and `Escape` exits.
pub fn handle_dev_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    session: Res<State<SessionMode>>,
    mut session_events: EventWriter<SessionEvent>,
    mut volumes: EventWriter<SetVolume>,
    mut exit: EventWriter<AppExit>,
) {
    if keyboard.just_pressed(KeyCode::KeyI) {
        let event = match session.get() {
            SessionMode::Desktop => SessionEvent::Start,
            SessionMode::Immersive => SessionEvent::End,
        };
        session_events.write(event);
    }

    if keyboard.just_pressed(KeyCode::KeyR) {
        info!("Reloading synthetic volume");
        volumes.write(SetVolume::local(Some(VolumePayload::Synthetic)));
    }

    if keyboard.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
