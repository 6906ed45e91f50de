use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use constants::camera::{
    INITIAL_POSITION, ORBIT_DAMPING, ORBIT_MAX_DISTANCE, ORBIT_MIN_DISTANCE, ORBIT_PAN_SPEED,
    ORBIT_PITCH_LIMIT, ORBIT_ROTATE_SPEED, ORBIT_ZOOM_STEP,
};

/// Pointer-driven orbit around a target point. Rotation, pan and zoom set
/// goals that the rendered view eases toward each frame.
#[derive(Resource, Debug, Clone)]
pub struct OrbitController {
    pub enabled: bool,
    pub target: Vec3,
    pub yaw: f32,
    /// Elevation above the target's horizontal plane.
    pub pitch: f32,
    pub distance: f32,
    goal_target: Vec3,
    goal_yaw: f32,
    goal_pitch: f32,
    goal_distance: f32,
}

impl OrbitController {
    /// Orbit `target` from `eye`.
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset
            .length()
            .clamp(ORBIT_MIN_DISTANCE, ORBIT_MAX_DISTANCE);
        let yaw = offset.x.atan2(offset.z);
        let pitch = (offset.y / offset.length().max(f32::EPSILON))
            .clamp(-1.0, 1.0)
            .asin()
            .clamp(-ORBIT_PITCH_LIMIT, ORBIT_PITCH_LIMIT);

        Self {
            enabled: true,
            target,
            yaw,
            pitch,
            distance,
            goal_target: target,
            goal_yaw: yaw,
            goal_pitch: pitch,
            goal_distance: distance,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Drag delta in pixels.
    pub fn rotate(&mut self, delta: Vec2) {
        self.goal_yaw -= delta.x * ORBIT_ROTATE_SPEED;
        self.goal_pitch = (self.goal_pitch + delta.y * ORBIT_ROTATE_SPEED)
            .clamp(-ORBIT_PITCH_LIMIT, ORBIT_PITCH_LIMIT);
    }

    /// Drag delta in pixels; pans faster the further out the view is.
    pub fn pan(&mut self, delta: Vec2) {
        let rotation = self.rotation(self.goal_yaw, self.goal_pitch);
        let right = rotation * Vec3::X;
        let up = rotation * Vec3::Y;
        let scale = ORBIT_PAN_SPEED * self.goal_distance;
        self.goal_target += (-right * delta.x + up * delta.y) * scale;
    }

    /// Positive steps move closer.
    pub fn zoom(&mut self, steps: f32) {
        self.goal_distance = (self.goal_distance * ORBIT_ZOOM_STEP.powf(steps))
            .clamp(ORBIT_MIN_DISTANCE, ORBIT_MAX_DISTANCE);
    }

    /// Ease toward the goals. Damping is expressed per 60 Hz frame.
    pub fn step(&mut self, delta_secs: f32) {
        let blend = 1.0 - (1.0 - ORBIT_DAMPING).powf(delta_secs * 60.0);
        self.target = self.target.lerp(self.goal_target, blend);
        self.yaw += (self.goal_yaw - self.yaw) * blend;
        self.pitch += (self.goal_pitch - self.pitch) * blend;
        self.distance += (self.goal_distance - self.distance) * blend;
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target + Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.target, Vec3::Y)
    }

    fn rotation(&self, yaw: f32, pitch: f32) -> Quat {
        Quat::from_euler(EulerRot::YXZ, yaw, -pitch, 0.0)
    }
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::looking_at(Vec3::from(INITIAL_POSITION), Vec3::ZERO)
    }
}

#[derive(Component)]
pub struct OrbitCamera;

/// Read pointer input and move the orbit camera. Input is drained even while
/// disabled so a session end does not replay stale drags.
pub fn orbit_camera_controller(
    mut controller: ResMut<OrbitController>,
    mut camera: Query<&mut Transform, With<OrbitCamera>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    time: Res<Time>,
) {
    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    let scroll: f32 = scroll_events
        .read()
        .map(|ev| match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        })
        .sum();

    if !controller.enabled {
        return;
    }

    if mouse_delta != Vec2::ZERO {
        if mouse_button.pressed(MouseButton::Left) {
            controller.rotate(mouse_delta);
        } else if mouse_button.pressed(MouseButton::Right) {
            controller.pan(mouse_delta);
        }
    }
    if scroll.abs() > f32::EPSILON {
        controller.zoom(scroll);
    }

    controller.step(time.delta_secs());

    if let Ok(mut transform) = camera.single_mut() {
        *transform = controller.transform();
    }
}
