// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Control loop
//!
//! `Init -> Running -> (Failed | Stopped)`
//!
//! Init validates the configuration, registers the operator set, allocates the arena, builds the engine
//! and resolves the binding. Only after all of that succeeds are the
//! actuator pins configured and parked low. Each Running tick then does
//! acquire -> preprocess -> invoke -> sample -> actuate -> release.
//!
//! A missing frame skips the tick. An inference failure is terminal and
//! leaves the pins as last driven. Cancelling the [`ShutdownToken`] parks
//! the pins and ends in Stopped.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use carlos_config::{validate_config, ConfigError, PilotConfig};
use carlos_hal::{
    ArenaError, Camera, CarlosOpResolver, Frame, GpioProvider, InferenceEngine, Model, OpResolver,
    OperatorRegistrationError, TensorArena, TimeProvider, REQUIRED_OPERATORS,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::actuation::{Action, ActuationMapper, ActuatorPins};
use crate::binding::{BindingError, TensorBinding};
use crate::feedback::{OpenLoop, ProprioceptiveState, StateFeedback};
use crate::preprocess::Preprocessor;
use crate::sampler::Sampler;

/// Lifecycle of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Init,
    Running,
    Failed,
    Stopped,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoopState::Init => "Init",
            LoopState::Running => "Running",
            LoopState::Failed => "Failed",
            LoopState::Stopped => "Stopped",
        };
        f.write_str(name)
    }
}

/// Fatal setup failures; the loop never starts
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Invalid pilot configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Operator registration failed: {0}")]
    OperatorRegistration(#[from] OperatorRegistrationError),

    #[error("Tensor arena allocation failed: {0}")]
    Arena(#[from] ArenaError),

    #[error("Inference engine construction failed: {0}")]
    EngineConstruction(String),

    #[error("Tensor allocation failed: {0}")]
    TensorAllocation(String),

    #[error("Tensor binding failed: {0}")]
    Binding(#[from] BindingError),

    #[error("Actuator GPIO setup failed: {0}")]
    Gpio(String),
}

/// Fatal runtime failures; the loop moves to Failed
#[derive(Debug, Error)]
pub enum PilotError {
    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Tensor binding broken: {0}")]
    Binding(#[from] BindingError),

    #[error("Actuator write failed: {0}")]
    Actuation(String),

    #[error("Control loop is {0}, not Running")]
    NotRunning(LoopState),
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Camera had no frame; nothing was preprocessed, invoked or driven
    NoFrame,
    /// Network ran and the pins now reflect these actions
    Actuated { gas: Action, steer: Action },
}

/// Cooperative stop signal, checked between ticks
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    cancelled: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Loop counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Ticks attempted
    pub ticks: u64,
    /// Ticks that reached actuation
    pub actuated: u64,
    /// Ticks skipped for lack of a frame
    pub frames_skipped: u64,
    /// Frames that failed to decode (tick ran on the stale image)
    pub decode_failures: u64,
    /// Inference latency of the most recent actuated tick
    pub last_inference_ms: u64,
}

/// Returns the frame to the camera when dropped, on every exit path
struct FrameLease<'a, C: Camera> {
    camera: &'a mut C,
    frame: Frame,
}

impl<'a, C: Camera> FrameLease<'a, C> {
    fn new(camera: &'a mut C, frame: Frame) -> Self {
        Self { camera, frame }
    }

    fn frame(&self) -> &Frame {
        &self.frame
    }
}

impl<C: Camera> Drop for FrameLease<'_, C> {
    fn drop(&mut self) {
        let format = self.frame.format();
        let frame = std::mem::replace(&mut self.frame, Frame::new(format, 0, 0, Vec::new()));
        self.camera.release(frame);
    }
}

/// The control context: every collaborator and all per-cycle state
pub struct Pilot<C, E, G, T, F = OpenLoop>
where
    E: InferenceEngine,
    G: GpioProvider,
{
    camera: C,
    binding: TensorBinding<E>,
    gpio: G,
    clock: T,
    feedback: F,
    preprocessor: Preprocessor,
    sampler: Sampler,
    mapper: ActuationMapper<G::Pin>,
    proprioception: ProprioceptiveState,
    loop_state: LoopState,
    tick_period_ms: u32,
    stats: LoopStats,
}

impl<C, E, G, T> Pilot<C, E, G, T, OpenLoop>
where
    C: Camera,
    E: InferenceEngine,
    G: GpioProvider,
    G::Pin: From<u32>,
    T: TimeProvider,
{
    /// Set up with the standard seven-operator registry
    pub fn init(config: &PilotConfig, model: &Model, camera: C, gpio: G, clock: T) -> Result<Self, SetupError> {
        Self::init_with_resolver(config, model, CarlosOpResolver::new(), camera, gpio, clock)
    }

    /// Set up with a caller-provided operator registry
    ///
    /// Every required operator is registered into `resolver`; a registry too
    /// small or already holding one of them fails setup.
    pub fn init_with_resolver<const N: usize>(
        config: &PilotConfig,
        model: &Model,
        resolver: OpResolver<N>,
        camera: C,
        gpio: G,
        clock: T,
    ) -> Result<Self, SetupError> {
        info!(
            "Pilot init: {}x{} frames, {} ms tick, {} byte arena, {} byte model",
            config.frame.width,
            config.frame.height,
            config.control.tick_period_ms,
            config.control.arena_size_bytes,
            model.len()
        );

        Self::setup(config, model, resolver, camera, gpio, clock).map_err(|e| {
            error!("Setup failed, loop will not start: {}", e);
            e
        })
    }

    fn setup<const N: usize>(
        config: &PilotConfig,
        model: &Model,
        mut resolver: OpResolver<N>,
        camera: C,
        mut gpio: G,
        clock: T,
    ) -> Result<Self, SetupError> {
        validate_config(config)?;

        resolver.register_all(&REQUIRED_OPERATORS)?;
        debug!("Registered {} operators", resolver.operators().len());

        let arena = TensorArena::allocate(config.control.arena_size_bytes)?;
        let mut engine = E::construct(model, resolver.operators(), arena)
            .map_err(|e| SetupError::EngineConstruction(e.to_string()))?;
        engine
            .allocate_tensors()
            .map_err(|e| SetupError::TensorAllocation(e.to_string()))?;
        if let Some(used) = engine.arena_used_bytes() {
            info!(
                "Tensor arena: {} of {} bytes used",
                used, config.control.arena_size_bytes
            );
        }

        let binding = TensorBinding::resolve(engine, config.frame.rgb_len())?;

        let mapper = ActuationMapper::new(ActuatorPins::from(&config.actuators));
        gpio.configure_outputs(&mapper.pins().all())
            .map_err(|e| SetupError::Gpio(e.to_string()))?;
        mapper
            .park(&mut gpio)
            .map_err(|e| SetupError::Gpio(e.to_string()))?;

        info!("Setup complete: {} -> {}", LoopState::Init, LoopState::Running);

        Ok(Self {
            camera,
            binding,
            gpio,
            clock,
            feedback: OpenLoop,
            preprocessor: Preprocessor::new(config.frame.width, config.frame.height),
            sampler: Sampler::from_seed(config.control.seed),
            mapper,
            proprioception: ProprioceptiveState::default(),
            loop_state: LoopState::Running,
            tick_period_ms: config.control.tick_period_ms,
            stats: LoopStats::default(),
        })
    }
}

impl<C, E, G, T, F> Pilot<C, E, G, T, F>
where
    C: Camera,
    E: InferenceEngine,
    G: GpioProvider,
    T: TimeProvider,
    F: StateFeedback,
{
    /// Replace the feedback hook
    pub fn with_feedback<F2: StateFeedback>(self, feedback: F2) -> Pilot<C, E, G, T, F2> {
        Pilot {
            camera: self.camera,
            binding: self.binding,
            gpio: self.gpio,
            clock: self.clock,
            feedback,
            preprocessor: self.preprocessor,
            sampler: self.sampler,
            mapper: self.mapper,
            proprioception: self.proprioception,
            loop_state: self.loop_state,
            tick_period_ms: self.tick_period_ms,
            stats: self.stats,
        }
    }

    /// Start from a known speed/steer estimate instead of zero
    pub fn with_proprioception(mut self, state: ProprioceptiveState) -> Self {
        self.proprioception = state;
        self
    }

    pub fn state(&self) -> LoopState {
        self.loop_state
    }

    pub fn proprioception(&self) -> ProprioceptiveState {
        self.proprioception
    }

    pub fn stats(&self) -> LoopStats {
        LoopStats {
            decode_failures: self.preprocessor.decode_failures(),
            ..self.stats
        }
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    pub fn binding(&self) -> &TensorBinding<E> {
        &self.binding
    }

    /// Run one cycle
    ///
    /// Any error moves the loop to Failed.
    pub fn tick(&mut self) -> Result<TickOutcome, PilotError> {
        if self.loop_state != LoopState::Running {
            return Err(PilotError::NotRunning(self.loop_state));
        }

        let outcome = self.cycle();
        if let Err(e) = &outcome {
            error!("{} -> {}: {}", LoopState::Running, LoopState::Failed, e);
            self.loop_state = LoopState::Failed;
        }
        outcome
    }

    fn cycle(&mut self) -> Result<TickOutcome, PilotError> {
        self.stats.ticks += 1;

        let Some(frame) = self.camera.acquire() else {
            warn!("Camera capture failed, skipping tick");
            self.stats.frames_skipped += 1;
            return Ok(TickOutcome::NoFrame);
        };
        let lease = FrameLease::new(&mut self.camera, frame);

        self.preprocessor.preprocess(
            lease.frame(),
            self.proprioception.speed,
            self.proprioception.steer,
            &mut self.binding,
        )?;

        let started_us = self.clock.get_time_us();
        self.binding
            .invoke()
            .map_err(|e| PilotError::Inference(e.to_string()))?;
        let latency_ms = self.clock.elapsed_ms(started_us);
        self.stats.last_inference_ms = latency_ms;
        info!("Inference took {} ms", latency_ms);

        let gas_index = self.sampler.sample(self.binding.gas()?);
        let steer_index = self.sampler.sample(self.binding.steer()?);
        let (gas, steer) = self
            .mapper
            .map(&mut self.gpio, gas_index, steer_index)
            .map_err(|e| PilotError::Actuation(e.to_string()))?;
        drop(lease);

        self.feedback.update(&mut self.proprioception, gas, steer);
        self.stats.actuated += 1;
        Ok(TickOutcome::Actuated { gas, steer })
    }

    /// Tick at the configured period until shutdown, `max_ticks`, or failure
    ///
    /// The period is a floor: a tick that overruns it is followed immediately
    /// by the next one.
    pub fn run(&mut self, shutdown: &ShutdownToken, max_ticks: Option<u64>) -> Result<LoopState, PilotError> {
        info!("Control loop running ({} ms tick)", self.tick_period_ms);

        let result = self.drive(shutdown, max_ticks);

        let stats = self.stats();
        info!(
            "Control loop {} after {} ticks: {} actuated, {} frames skipped, {} decode failures",
            self.loop_state, stats.ticks, stats.actuated, stats.frames_skipped, stats.decode_failures
        );
        result
    }

    fn drive(&mut self, shutdown: &ShutdownToken, max_ticks: Option<u64>) -> Result<LoopState, PilotError> {
        let period_ms = u64::from(self.tick_period_ms);

        loop {
            if shutdown.is_cancelled() {
                info!("Shutdown requested");
                break;
            }
            if max_ticks.is_some_and(|max| self.stats.ticks >= max) {
                info!("Tick limit reached");
                break;
            }

            let started_us = self.clock.get_time_us();
            self.tick()?;

            let elapsed_ms = self.clock.elapsed_ms(started_us);
            if elapsed_ms < period_ms {
                self.clock.delay_ms((period_ms - elapsed_ms) as u32);
            }
        }

        self.stop()?;
        Ok(self.loop_state)
    }

    /// Park all pins low and move to Stopped
    ///
    /// Only valid from Running; a Failed loop keeps its pins untouched.
    pub fn stop(&mut self) -> Result<(), PilotError> {
        if self.loop_state != LoopState::Running {
            return Err(PilotError::NotRunning(self.loop_state));
        }
        if let Err(e) = self.mapper.park(&mut self.gpio) {
            self.loop_state = LoopState::Failed;
            return Err(PilotError::Actuation(e.to_string()));
        }
        self.loop_state = LoopState::Stopped;
        info!("{} -> {}: actuators parked", LoopState::Running, LoopState::Stopped);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_token_shared_between_clones() {
        let token = ShutdownToken::new();
        let handle = token.clone();
        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_loop_state_display() {
        assert_eq!(LoopState::Failed.to_string(), "Failed");
        assert_eq!(
            PilotError::NotRunning(LoopState::Stopped).to_string(),
            "Control loop is Stopped, not Running"
        );
    }
}
