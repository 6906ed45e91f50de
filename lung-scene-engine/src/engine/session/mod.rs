//! Desktop / immersive session state machine.
//!
//! Platform session lifecycle events arrive as [`SessionEvent`]s. Entering
//! [`SessionMode::Immersive`] suspends the orbit controller so head tracking
//! owns the camera; returning to [`SessionMode::Desktop`] re-enables it.

use bevy::prelude::*;

use crate::engine::camera::orbit_camera::OrbitController;

#[derive(States, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionMode {
    #[default]
    Desktop,
    Immersive,
}

impl SessionMode {
    /// Next mode for an input event. Repeated starts or ends are idempotent.
    pub fn next(self, event: SessionEvent) -> Self {
        match event {
            SessionEvent::Start => Self::Immersive,
            SessionEvent::End => Self::Desktop,
        }
    }

    pub fn pointer_control(self) -> bool {
        self == Self::Desktop
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Immersive => "immersive",
        }
    }
}

/// Immersive display session lifecycle, as reported by the platform.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Start,
    End,
}

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<SessionMode>()
            .add_event::<SessionEvent>()
            .add_systems(Update, apply_session_events)
            .add_systems(OnEnter(SessionMode::Immersive), suspend_pointer_control)
            .add_systems(OnEnter(SessionMode::Desktop), resume_pointer_control);
    }
}

/// Fold this frame's lifecycle events into the next mode.
pub fn apply_session_events(
    mut events: EventReader<SessionEvent>,
    state: Res<State<SessionMode>>,
    mut next_state: ResMut<NextState<SessionMode>>,
) {
    let current = *state.get();
    let target = events.read().fold(current, |mode, event| mode.next(*event));

    if target != current {
        info!("Session {} -> {}", current.as_str(), target.as_str());
        next_state.set(target);
    }
}

fn suspend_pointer_control(mut controller: ResMut<OrbitController>) {
    controller.set_enabled(SessionMode::Immersive.pointer_control());
}

fn resume_pointer_control(mut controller: ResMut<OrbitController>) {
    controller.set_enabled(SessionMode::Desktop.pointer_control());
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::StatesPlugin;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .init_resource::<OrbitController>()
            .add_plugins(SessionPlugin);
        app.update();
        app
    }

    /// Deliver an event and let the resulting transition apply.
    fn deliver(app: &mut App, event: SessionEvent) {
        app.world_mut().send_event(event);
        app.update();
        app.update();
    }

    fn mode(app: &App) -> SessionMode {
        *app.world().resource::<State<SessionMode>>().get()
    }

    fn pointer_enabled(app: &App) -> bool {
        app.world().resource::<OrbitController>().enabled
    }

    #[test]
    fn starts_on_the_desktop_with_pointer_control() {
        let app = test_app();
        assert_eq!(mode(&app), SessionMode::Desktop);
        assert!(pointer_enabled(&app));
    }

    #[test]
    fn immersive_session_suspends_and_restores_pointer_control() {
        let mut app = test_app();

        deliver(&mut app, SessionEvent::Start);
        assert_eq!(mode(&app), SessionMode::Immersive);
        assert!(!pointer_enabled(&app));

        deliver(&mut app, SessionEvent::End);
        assert_eq!(mode(&app), SessionMode::Desktop);
        assert!(pointer_enabled(&app));
    }

    #[test]
    fn repeated_cycles_never_leave_pointer_control_disabled() {
        let mut app = test_app();

        for _ in 0..5 {
            deliver(&mut app, SessionEvent::Start);
            deliver(&mut app, SessionEvent::Start);
            deliver(&mut app, SessionEvent::End);
        }
        deliver(&mut app, SessionEvent::End);

        assert_eq!(mode(&app), SessionMode::Desktop);
        assert!(pointer_enabled(&app));
    }

    #[test]
    fn transitions_are_driven_only_by_the_latest_event() {
        assert_eq!(
            SessionMode::Desktop.next(SessionEvent::Start),
            SessionMode::Immersive
        );
        assert_eq!(
            SessionMode::Immersive.next(SessionEvent::Start),
            SessionMode::Immersive
        );
        assert_eq!(
            SessionMode::Immersive.next(SessionEvent::End),
            SessionMode::Desktop
        );
        assert_eq!(
            SessionMode::Desktop.next(SessionEvent::End),
            SessionMode::Desktop
        );
    }
}
