// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Proprioceptive state and the hook that folds actions back into it

use crate::actuation::Action;

/// Speed and steering estimates fed to the network each tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProprioceptiveState {
    pub speed: f32,
    pub steer: f32,
}

/// Updates proprioceptive state after a successful tick
///
/// Called exactly once per tick that reached actuation, never on skipped
/// ticks.
pub trait StateFeedback {
    fn update(&mut self, state: &mut ProprioceptiveState, gas: Action, steer: Action);
}

/// Leaves the state untouched, so the network always sees the initial values
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenLoop;

impl StateFeedback for OpenLoop {
    fn update(&mut self, _state: &mut ProprioceptiveState, _gas: Action, _steer: Action) {}
}

impl<F> StateFeedback for F
where
    F: FnMut(&mut ProprioceptiveState, Action, Action),
{
    fn update(&mut self, state: &mut ProprioceptiveState, gas: Action, steer: Action) {
        self(state, gas, steer)
    }
}
