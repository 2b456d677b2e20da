//! Per-view simulation session
//!
//! A `Session` owns the simulation state and the current viewport and exposes
//! the push-style entry points the platform layer calls:
//! - `on_resize` when the drawable surface is created or changes size
//! - `on_start` / `on_stop` when the sensor stream is (un)registered
//! - `on_sample` / `on_sensor_event` for every delivered reading
//!
//! Calls take `&mut self`, so a resize and a sample cycle can never overlap on
//! the same session. Each accepted accelerometer sample runs exactly one
//! integrate -> reflect -> render cycle synchronously.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::is_finite_vec;
use crate::renderer::{BallFrame, Renderer};
use crate::settings::PhysicsSettings;
use crate::sim::{
    AccelerationSample, DominantAxis, Edge, EdgeHits, Integration, SimulationState, TimeAnomaly,
    Viewport, integrate, reflect,
};

/// Sensor kinds a platform listener may deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorKind {
    Accelerometer,
    AmbientTemperature,
    Gyroscope,
    MagneticField,
    Light,
    Proximity,
    Gravity,
    LinearAcceleration,
    RotationVector,
    Other(i32),
}

impl SensorKind {
    /// Map an Android `Sensor.TYPE_*` id
    pub fn from_type_id(id: i32) -> Self {
        match id {
            1 => SensorKind::Accelerometer,
            2 => SensorKind::MagneticField,
            4 => SensorKind::Gyroscope,
            5 => SensorKind::Light,
            8 => SensorKind::Proximity,
            9 => SensorKind::Gravity,
            10 => SensorKind::LinearAcceleration,
            11 => SensorKind::RotationVector,
            13 => SensorKind::AmbientTemperature,
            other => SensorKind::Other(other),
        }
    }
}

/// A raw reading from any sensor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorEvent {
    pub kind: SensorKind,
    pub values: [f32; 3],
    pub timestamp_nanos: i64,
}

impl SensorEvent {
    pub fn accelerometer(sample: AccelerationSample) -> Self {
        Self {
            kind: SensorKind::Accelerometer,
            values: [sample.x, sample.y, sample.z],
            timestamp_nanos: sample.timestamp_nanos,
        }
    }

    /// The event as an acceleration sample, if it came from the accelerometer
    pub fn as_acceleration(&self) -> Option<AccelerationSample> {
        match self.kind {
            SensorKind::Accelerometer => {
                let [x, y, z] = self.values;
                Some(AccelerationSample::new(x, y, z, self.timestamp_nanos))
            }
            _ => None,
        }
    }
}

/// Why a sample did not produce a cycle. State is untouched in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRejection {
    /// The sensor stream has not been started (or was stopped)
    NotListening,
    /// No usable viewport yet
    NoViewport,
    /// NaN/Inf in the input or in the integrated result
    NonFinite,
}

impl fmt::Display for SampleRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleRejection::NotListening => write!(f, "sensor stream is not started"),
            SampleRejection::NoViewport => write!(f, "viewport size is not known yet"),
            SampleRejection::NonFinite => write!(f, "sample produced non-finite values"),
        }
    }
}

impl std::error::Error for SampleRejection {}

/// Everything observable about one rendered cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    /// What was handed to the renderer
    pub frame: BallFrame,
    pub hits: EdgeHits,
    /// Seconds integrated over
    pub dt: f32,
    pub dominant_axis: DominantAxis,
    /// Set when the sample's clock ran backwards
    pub anomaly: Option<TimeAnomaly>,
}

/// Result of a delivered event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// Time base established; nothing to draw yet
    WarmUp,
    /// Full cycle ran and the renderer was called
    Rendered(CycleReport),
    /// Not an accelerometer event
    Ignored(SensorKind),
}

impl CycleOutcome {
    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            CycleOutcome::Rendered(report) => Some(report),
            _ => None,
        }
    }
}

/// Diagnostic counters for a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub resizes: u64,
    pub warm_ups: u64,
    pub cycles: u64,
    pub out_of_order: u64,
    pub rejected_not_listening: u64,
    pub rejected_no_viewport: u64,
    pub rejected_non_finite: u64,
    pub ignored_events: u64,
    pub bounces_near: u64,
    pub bounces_far: u64,
}

impl SessionStats {
    fn count_rejection(&mut self, rejection: SampleRejection) {
        match rejection {
            SampleRejection::NotListening => self.rejected_not_listening += 1,
            SampleRejection::NoViewport => self.rejected_no_viewport += 1,
            SampleRejection::NonFinite => self.rejected_non_finite += 1,
        }
    }

    fn count_hits(&mut self, hits: &EdgeHits) {
        for edge in [hits.x, hits.y].into_iter().flatten() {
            match edge {
                Edge::Near => self.bounces_near += 1,
                Edge::Far => self.bounces_far += 1,
            }
        }
    }

    pub fn bounces(&self) -> u64 {
        self.bounces_near + self.bounces_far
    }

    pub fn rejected(&self) -> u64 {
        self.rejected_not_listening + self.rejected_no_viewport + self.rejected_non_finite
    }
}

/// One simulated ball bound to one drawable view
#[derive(Debug, Clone)]
pub struct Session {
    settings: PhysicsSettings,
    viewport: Option<Viewport>,
    state: SimulationState,
    listening: bool,
    stats: SessionStats,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(PhysicsSettings::default())
    }
}

impl Session {
    pub fn new(settings: PhysicsSettings) -> Self {
        Self {
            settings: settings.sanitized(),
            viewport: None,
            state: SimulationState::default(),
            listening: false,
            stats: SessionStats::default(),
        }
    }

    pub fn settings(&self) -> &PhysicsSettings {
        &self.settings
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Current ball placement, once a viewport exists
    pub fn frame(&self) -> Option<BallFrame> {
        self.viewport
            .map(|_| BallFrame::new(self.state.position, self.settings.radius))
    }

    /// Surface created or resized: adopt the new bounds and reset the ball
    pub fn on_resize(&mut self, width: f32, height: f32) {
        self.stats.resizes += 1;
        match Viewport::new(width, height) {
            Some(viewport) => {
                if !viewport.fits(self.settings.radius) {
                    log::warn!(
                        "Viewport {}x{} is smaller than the ball (radius {})",
                        width,
                        height,
                        self.settings.radius
                    );
                }
                self.state.reset(&viewport);
                self.viewport = Some(viewport);
                log::info!(
                    "Viewport {}x{}, ball reset to ({}, {})",
                    width,
                    height,
                    self.state.position.x,
                    self.state.position.y
                );
            }
            None => {
                log::warn!("Ignoring unusable viewport {}x{}", width, height);
                self.viewport = None;
                self.state = SimulationState::default();
            }
        }
    }

    /// Sensor stream registered: accept samples, next one is a warm-up
    pub fn on_start(&mut self) {
        self.listening = true;
        self.state.clear_time_base();
        log::info!("Sensor stream started");
    }

    /// Sensor stream unregistered: further samples are rejected
    pub fn on_stop(&mut self) {
        self.listening = false;
        log::info!("Sensor stream stopped");
    }

    /// Accuracy changes carry no physics
    pub fn on_accuracy_changed(&mut self, kind: SensorKind, accuracy: i32) {
        log::debug!("Accuracy of {:?} changed to {}", kind, accuracy);
    }

    /// Route a raw sensor event; only the accelerometer drives the ball
    pub fn on_sensor_event<R: Renderer>(
        &mut self,
        event: &SensorEvent,
        renderer: &mut R,
    ) -> Result<CycleOutcome, SampleRejection> {
        match event.as_acceleration() {
            Some(sample) => self.on_sample(&sample, renderer),
            None => {
                self.stats.ignored_events += 1;
                log::trace!("Ignoring {:?} event", event.kind);
                Ok(CycleOutcome::Ignored(event.kind))
            }
        }
    }

    /// Run one integrate -> reflect -> render cycle for an accelerometer sample
    pub fn on_sample<R: Renderer>(
        &mut self,
        sample: &AccelerationSample,
        renderer: &mut R,
    ) -> Result<CycleOutcome, SampleRejection> {
        let result = self.run_cycle(sample, renderer);
        if let Err(rejection) = result {
            self.stats.count_rejection(rejection);
            log::debug!("Sample at {} rejected: {}", sample.timestamp_nanos, rejection);
        }
        result
    }

    fn run_cycle<R: Renderer>(
        &mut self,
        sample: &AccelerationSample,
        renderer: &mut R,
    ) -> Result<CycleOutcome, SampleRejection> {
        if !self.listening {
            return Err(SampleRejection::NotListening);
        }
        if !sample.is_finite() {
            log::warn!("Non-finite sample {:?}", sample);
            return Err(SampleRejection::NonFinite);
        }
        let Some(viewport) = self.viewport else {
            return Err(SampleRejection::NoViewport);
        };

        let candidate = match integrate(&self.state, sample, self.settings.coef) {
            Integration::WarmUp { timestamp_nanos } => {
                self.state.last_sample_time_nanos = Some(timestamp_nanos);
                self.stats.warm_ups += 1;
                log::debug!("Warm-up sample at {}", timestamp_nanos);
                return Ok(CycleOutcome::WarmUp);
            }
            Integration::Step(candidate) => candidate,
        };

        if let Some(anomaly) = candidate.anomaly {
            self.stats.out_of_order += 1;
            log::warn!(
                "Sample clock went backwards by {} ns ({} -> {}), treating as dt = 0",
                anomaly.backwards_nanos(),
                anomaly.previous_nanos,
                anomaly.received_nanos
            );
        }

        if !is_finite_vec(candidate.position) || !is_finite_vec(candidate.velocity) {
            log::warn!("Integration overflowed at {}, sample dropped", sample.timestamp_nanos);
            return Err(SampleRejection::NonFinite);
        }

        let reflection = reflect(&candidate, &viewport, self.settings.radius, self.settings.damping);
        self.state
            .commit(reflection.position, reflection.velocity, candidate.timestamp_nanos);
        self.stats.cycles += 1;
        self.stats.count_hits(&reflection.hits);

        if reflection.hits.any() {
            log::debug!("Bounce {:?} at ({}, {})", reflection.hits, reflection.position.x, reflection.position.y);
        }

        let frame = BallFrame::new(reflection.position, self.settings.radius);
        renderer.draw_ball(&frame);

        Ok(CycleOutcome::Rendered(CycleReport {
            frame,
            hits: reflection.hits,
            dt: candidate.dt,
            dominant_axis: sample.dominant_axis(),
            anomaly: candidate.anomaly,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{NullRenderer, RecordingRenderer};
    use glam::Vec2;
    use proptest::prelude::*;

    const SEC: i64 = 1_000_000_000;
    const MS: i64 = 1_000_000;

    fn sample(x: f32, y: f32, t: i64) -> AccelerationSample {
        AccelerationSample::new(x, y, 0.0, t)
    }

    fn running_session(width: f32, height: f32) -> Session {
        let mut session = Session::default();
        session.on_resize(width, height);
        session.on_start();
        session
    }

    #[test]
    fn test_warm_up_then_zero_step() {
        let mut session = running_session(1080.0, 1920.0);
        let mut renderer = RecordingRenderer::new();

        let outcome = session.on_sample(&sample(0.0, 0.0, 3 * SEC), &mut renderer);
        assert_eq!(outcome, Ok(CycleOutcome::WarmUp));
        assert_eq!(session.state().last_sample_time_nanos, Some(3 * SEC));
        assert!(renderer.frames.is_empty());

        let outcome = session.on_sample(&sample(0.0, 0.0, 4 * SEC), &mut renderer).unwrap();
        let report = outcome.report().expect("second sample renders");
        assert_eq!(report.dt, 1.0);
        assert_eq!(report.frame.center, Vec2::new(540.0, 960.0));
        assert_eq!(session.state().velocity, Vec2::ZERO);
        assert_eq!(renderer.frames.len(), 1);
    }

    #[test]
    fn test_pure_kinematics_cycle() {
        let mut session = running_session(4000.0, 4000.0);
        let mut renderer = NullRenderer;

        session.on_sample(&sample(2.0, 0.0, 0), &mut renderer).unwrap();
        let outcome = session.on_sample(&sample(2.0, 0.0, SEC), &mut renderer).unwrap();
        let report = outcome.report().unwrap();

        assert_eq!(session.state().position, Vec2::new(3000.0, 2000.0));
        assert_eq!(session.state().velocity, Vec2::new(2.0, 0.0));
        assert!(!report.hits.any());
        assert_eq!(report.dominant_axis, DominantAxis::X);
    }

    #[test]
    fn test_zero_input_is_a_fixed_point() {
        let mut session = running_session(1080.0, 1920.0);
        let mut renderer = NullRenderer;
        let start = *session.state();

        for i in 0..50 {
            session
                .on_sample(&sample(0.0, 0.0, i * 20 * MS), &mut renderer)
                .unwrap();
        }

        assert_eq!(session.state().position, start.position);
        assert_eq!(session.state().velocity, Vec2::ZERO);
        assert_eq!(session.stats().cycles, 49);
        assert_eq!(session.stats().warm_ups, 1);
    }

    #[test]
    fn test_bounce_off_near_edge() {
        let mut session = running_session(1080.0, 1920.0);
        let mut renderer = RecordingRenderer::new();

        // Strong pull toward the left edge for a full second
        session.on_sample(&sample(-2.0, 0.0, 0), &mut renderer).unwrap();
        let report = *session
            .on_sample(&sample(-2.0, 0.0, SEC), &mut renderer)
            .unwrap()
            .report()
            .unwrap();

        // 540 - 1000 = -460 -> clamped to the radius
        assert_eq!(report.hits.x, Some(Edge::Near));
        assert_eq!(report.frame.center.x, 150.0);
        // velocity -2 reflected and damped
        assert!((session.state().velocity.x - 2.0 / 1.5).abs() < 1e-6);
        assert_eq!(session.stats().bounces_near, 1);
        assert_eq!(renderer.last().unwrap().sprite_origin().x, 0.0);
        assert_eq!(renderer.instances()[0].origin[0], 0.0);
    }

    #[test]
    fn test_corner_bounce_reflects_both_axes() {
        let mut session = running_session(1080.0, 1920.0);
        let mut renderer = NullRenderer;

        session.on_sample(&sample(-2.0, 3.0, 0), &mut renderer).unwrap();
        let report = *session
            .on_sample(&sample(-2.0, 3.0, SEC), &mut renderer)
            .unwrap()
            .report()
            .unwrap();

        // x: 540 - 1000 past the near edge; y: 960 + 1500 past the far edge
        assert_eq!(report.hits.x, Some(Edge::Near));
        assert_eq!(report.hits.y, Some(Edge::Far));
        assert_eq!(report.frame.center, Vec2::new(150.0, 1770.0));
        assert!((session.state().velocity.x - 2.0 / 1.5).abs() < 1e-6);
        assert!((session.state().velocity.y + 3.0 / 1.5).abs() < 1e-6);
        assert_eq!(session.stats().bounces(), 2);
    }

    #[test]
    fn test_out_of_order_does_not_move_ball() {
        let mut session = running_session(1080.0, 1920.0);
        let mut renderer = NullRenderer;

        session.on_sample(&sample(0.0, 0.0, 10 * SEC), &mut renderer).unwrap();
        session.on_sample(&sample(1.0, 1.0, 10 * SEC + 10 * MS), &mut renderer).unwrap();
        let before = *session.state();

        let outcome = session.on_sample(&sample(5.0, 5.0, 9 * SEC), &mut renderer).unwrap();
        let report = outcome.report().unwrap();

        assert_eq!(report.dt, 0.0);
        assert!(report.anomaly.is_some());
        assert_eq!(session.state().position, before.position);
        assert_eq!(session.state().velocity, before.velocity);
        assert_eq!(session.state().last_sample_time_nanos, Some(9 * SEC));
        assert_eq!(session.stats().out_of_order, 1);
    }

    #[test]
    fn test_resize_resets_state() {
        let mut session = running_session(1080.0, 1920.0);
        let mut renderer = NullRenderer;

        session.on_sample(&sample(1.0, -1.0, 0), &mut renderer).unwrap();
        session.on_sample(&sample(1.0, -1.0, 100 * MS), &mut renderer).unwrap();
        assert_ne!(session.state().velocity, Vec2::ZERO);

        session.on_resize(1920.0, 1080.0);
        assert_eq!(session.state().position, Vec2::new(960.0, 540.0));
        assert_eq!(session.state().velocity, Vec2::ZERO);
        assert!(!session.state().is_warm());

        let outcome = session.on_sample(&sample(1.0, -1.0, 200 * MS), &mut renderer);
        assert_eq!(outcome, Ok(CycleOutcome::WarmUp));
        assert_eq!(session.stats().resizes, 2);
    }

    #[test]
    fn test_rejections_leave_state_untouched() {
        let mut renderer = RecordingRenderer::new();

        // Not started
        let mut session = Session::default();
        session.on_resize(1080.0, 1920.0);
        assert_eq!(
            session.on_sample(&sample(1.0, 1.0, 0), &mut renderer),
            Err(SampleRejection::NotListening)
        );

        // No viewport
        let mut session = Session::default();
        session.on_start();
        assert_eq!(
            session.on_sample(&sample(1.0, 1.0, 0), &mut renderer),
            Err(SampleRejection::NoViewport)
        );
        assert!(session.frame().is_none());

        // Non-finite
        let mut session = running_session(1080.0, 1920.0);
        session.on_sample(&sample(0.0, 0.0, 0), &mut renderer).unwrap();
        let before = *session.state();
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert_eq!(
                session.on_sample(&sample(bad, 0.0, SEC), &mut renderer),
                Err(SampleRejection::NonFinite)
            );
        }
        assert_eq!(
            session.on_sample(&AccelerationSample::new(0.0, 0.0, f32::NAN, SEC), &mut renderer),
            Err(SampleRejection::NonFinite)
        );
        assert_eq!(*session.state(), before);
        assert_eq!(session.stats().rejected_non_finite, 4);
        assert!(renderer.frames.is_empty());
    }

    #[test]
    fn test_overflowing_integration_is_rejected() {
        let mut session = running_session(1080.0, 1920.0);
        let mut renderer = NullRenderer;

        session.on_sample(&sample(0.0, 0.0, i64::MIN), &mut renderer).unwrap();
        let before = *session.state();
        let outcome = session.on_sample(&sample(f32::MAX, 0.0, i64::MAX), &mut renderer);

        assert_eq!(outcome, Err(SampleRejection::NonFinite));
        assert_eq!(*session.state(), before);
    }

    #[test]
    fn test_stop_and_restart() {
        let mut session = running_session(1080.0, 1920.0);
        let mut renderer = NullRenderer;

        session.on_sample(&sample(1.0, 0.0, 0), &mut renderer).unwrap();
        session.on_sample(&sample(1.0, 0.0, 50 * MS), &mut renderer).unwrap();
        session.on_stop();
        assert!(!session.is_listening());
        let stopped = *session.state();

        assert_eq!(
            session.on_sample(&sample(1.0, 0.0, 100 * MS), &mut renderer),
            Err(SampleRejection::NotListening)
        );
        assert_eq!(*session.state(), stopped);

        // Restart forgets the time base but keeps position and velocity
        session.on_start();
        assert_eq!(
            session.on_sample(&sample(1.0, 0.0, 5 * SEC), &mut renderer),
            Ok(CycleOutcome::WarmUp)
        );
        assert_eq!(session.state().position, stopped.position);
        assert_eq!(session.state().velocity, stopped.velocity);
    }

    #[test]
    fn test_non_accelerometer_events_are_ignored() {
        let mut session = running_session(1080.0, 1920.0);
        let mut renderer = RecordingRenderer::new();

        let gyro = SensorEvent {
            kind: SensorKind::from_type_id(4),
            values: [1.0, 2.0, 3.0],
            timestamp_nanos: 0,
        };
        assert_eq!(
            session.on_sensor_event(&gyro, &mut renderer),
            Ok(CycleOutcome::Ignored(SensorKind::Gyroscope))
        );
        assert_eq!(session.stats().ignored_events, 1);
        assert!(!session.state().is_warm());

        let accel = SensorEvent::accelerometer(sample(0.0, 9.8, 0));
        assert_eq!(session.on_sensor_event(&accel, &mut renderer), Ok(CycleOutcome::WarmUp));
    }

    #[test]
    fn test_sensor_kind_mapping() {
        assert_eq!(SensorKind::from_type_id(1), SensorKind::Accelerometer);
        assert_eq!(SensorKind::from_type_id(11), SensorKind::RotationVector);
        assert_eq!(SensorKind::from_type_id(13), SensorKind::AmbientTemperature);
        assert_eq!(SensorKind::from_type_id(99), SensorKind::Other(99));
    }

    #[test]
    fn test_unusable_resize_drops_viewport() {
        let mut session = running_session(1080.0, 1920.0);
        session.on_resize(0.0, 1920.0);
        assert!(session.viewport().is_none());
        assert_eq!(
            session.on_sample(&sample(0.0, 0.0, 0), &mut NullRenderer),
            Err(SampleRejection::NoViewport)
        );
    }

    #[test]
    fn test_rejection_display() {
        assert_eq!(SampleRejection::NoViewport.to_string(), "viewport size is not known yet");
        let err: Box<dyn std::error::Error> = Box::new(SampleRejection::NonFinite);
        assert!(err.to_string().contains("non-finite"));
    }

    proptest! {
        #[test]
        fn ball_stays_inside_playfield(
            steps in prop::collection::vec((-30.0f32..30.0, -30.0f32..30.0, 1i64..100), 1..200)
        ) {
            let mut session = running_session(1080.0, 1920.0);
            let mut renderer = NullRenderer;
            let mut t = 0i64;

            for (ax, ay, step_ms) in steps {
                t += step_ms * MS;
                session.on_sample(&sample(ax, ay, t), &mut renderer).unwrap();
                let p = session.state().position;
                prop_assert!(p.x >= 150.0 && p.x <= 1080.0 - 150.0, "x escaped: {}", p.x);
                prop_assert!(p.y >= 150.0 && p.y <= 1920.0 - 150.0, "y escaped: {}", p.y);
            }
        }

        #[test]
        fn warm_up_never_moves_the_ball(
            ax in -50.0f32..50.0,
            ay in -50.0f32..50.0,
            t in any::<i64>(),
        ) {
            let mut session = running_session(1080.0, 1920.0);
            let before = *session.state();
            let outcome = session.on_sample(&sample(ax, ay, t), &mut NullRenderer);
            prop_assert_eq!(outcome, Ok(CycleOutcome::WarmUp));
            prop_assert_eq!(session.state().position, before.position);
            prop_assert_eq!(session.state().velocity, before.velocity);
            prop_assert_eq!(session.state().last_sample_time_nanos, Some(t));
        }
    }
}
