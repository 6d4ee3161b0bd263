// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Analysis view state.
//!
//! Each submission is tagged with a generation number. Results carrying
//! anything other than the latest generation are dropped, so the visible
//! state always belongs to the most recent submission.

use super::verdict::RipenessVerdict;
use crate::error::AnalysisError;

/// What the results panel shows.
#[derive(Debug, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Analyzing,
    Succeeded(RipenessVerdict),
    Failed(AnalysisError),
}

/// Submission lifecycle and its generation counter.
#[derive(Debug, Default)]
pub struct Session {
    state: ViewState,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.state, ViewState::Analyzing)
    }

    /// The verdict currently on screen, if any.
    pub fn verdict(&self) -> Option<&RipenessVerdict> {
        match &self.state {
            ViewState::Succeeded(verdict) => Some(verdict),
            _ => None,
        }
    }

    /// Start a new submission and return its generation.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.state = ViewState::Analyzing;
        self.generation
    }

    /// Generation of the latest submission.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Apply a finished analysis.
    ///
    /// Returns the verdict when it became the new state, so the caller can
    /// fire the success side effects exactly once. Stale results return
    /// `None` and leave the state untouched.
    pub fn resolve(
        &mut self,
        generation: u64,
        result: Result<RipenessVerdict, AnalysisError>,
    ) -> Option<RipenessVerdict> {
        if !self.is_current(generation) {
            log::debug!(
                "Discarding result of submission {} (latest is {})",
                generation,
                self.generation
            );
            return None;
        }

        match result {
            Ok(verdict) => {
                self.state = ViewState::Succeeded(verdict.clone());
                Some(verdict)
            }
            Err(err) => {
                self.state = ViewState::Failed(err);
                None
            }
        }
    }
}
