//! A small deterministic side-scrolling course.
//!
//! Stands in for an emulator-backed game so the search can be run and
//! tested end to end. The player walks a one-dimensional track with pits;
//! holding the jump button keeps them airborne for a few ticks. Falling
//! into a pit or running out of time costs a life.

use serde::{Deserialize, Serialize};

use crate::schema::{Action, Button, InputEvent};

use super::environment::{Environment, EnvironmentError, StepOutcome, StepStatus};

/// Lives value at which the game is over.
pub const LIFE_FLOOR: u32 = 1;

/// Static description of a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseLayout {
    /// Goal position. Reaching it completes the course.
    pub length: u32,
    /// Positions that cost a life when stood on.
    pub pits: Vec<u32>,
    /// Time units on the clock at the start of each life.
    pub time_limit: u32,
    /// Ticks per time unit.
    pub ticks_per_time_unit: u32,
    /// Lives at reset.
    pub lives: u32,
    /// Ticks a jump keeps the player airborne.
    pub jump_ticks: u32,
    /// Score awarded for reaching the goal.
    pub goal_bonus: i64,
}

impl Default for CourseLayout {
    fn default() -> Self {
        Self::with_pits(400, 23, 2)
    }
}

impl CourseLayout {
    /// Course of `length` with pits of `width` every `spacing` cells.
    pub fn with_pits(length: u32, spacing: u32, width: u32) -> Self {
        let spacing = spacing.max(width + 1);
        let pits = (spacing..length)
            .step_by(spacing as usize)
            .flat_map(|start| start..(start + width).min(length))
            .collect();
        Self {
            length,
            pits,
            time_limit: 400,
            ticks_per_time_unit: 24,
            lives: 3,
            jump_ticks: 4,
            goal_bonus: 5000,
        }
    }

    fn is_pit(&self, position: u32) -> bool {
        self.pits.binary_search(&position).is_ok()
    }
}

/// Observable state after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseState {
    pub position: u32,
    pub lives: u32,
    pub time_left: u32,
    pub progress: u32,
    pub score: i64,
}

#[derive(Debug, Default, Clone, Copy)]
struct Held {
    left: bool,
    right: bool,
    a: bool,
}

/// Environment that plays a [`CourseLayout`].
#[derive(Debug, Clone)]
pub struct CourseEnvironment {
    layout: CourseLayout,
    position: u32,
    progress: u32,
    lives: u32,
    time_left: u32,
    tick_in_unit: u32,
    air_ticks: u32,
    score: i64,
    finished: bool,
    held: Held,
    ticks: u64,
}

impl CourseEnvironment {
    pub fn new(mut layout: CourseLayout) -> Self {
        layout.pits.sort_unstable();
        layout.pits.dedup();
        let mut env = Self {
            position: 0,
            progress: 0,
            lives: layout.lives,
            time_left: layout.time_limit,
            tick_in_unit: 0,
            air_ticks: 0,
            score: 0,
            finished: false,
            held: Held::default(),
            ticks: 0,
            layout,
        };
        env.restart();
        env
    }

    pub fn layout(&self) -> &CourseLayout {
        &self.layout
    }

    /// Total ticks simulated since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Current observable state.
    pub fn state(&self) -> CourseState {
        CourseState {
            position: self.position,
            lives: self.lives,
            time_left: self.time_left,
            progress: self.progress,
            score: self.score,
        }
    }

    /// Whether the goal was reached.
    pub fn finished(&self) -> bool {
        self.finished
    }

    fn restart(&mut self) {
        self.position = 0;
        self.progress = 0;
        self.lives = self.layout.lives;
        self.time_left = self.layout.time_limit;
        self.tick_in_unit = 0;
        self.air_ticks = 0;
        self.score = 0;
        self.finished = false;
        self.held = Held::default();
    }

    /// Score readout: game score plus weighted progress and clock.
    fn readout(&self) -> f64 {
        self.score as f64 + 30.0 * self.progress as f64 + self.time_left as f64
    }

    fn send(&mut self, event: InputEvent) {
        match event {
            InputEvent::Press(Button::Left) => self.held.left = true,
            InputEvent::Press(Button::Right) => self.held.right = true,
            InputEvent::Press(Button::A) => {
                if !self.held.a {
                    self.air_ticks = self.layout.jump_ticks;
                }
                self.held.a = true;
            }
            InputEvent::Release(Button::Left) => self.held.left = false,
            InputEvent::Release(Button::Right) => self.held.right = false,
            InputEvent::Release(Button::A) => self.held.a = false,
        }
    }

    fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.position = 0;
        self.air_ticks = 0;
        self.time_left = self.layout.time_limit;
        self.tick_in_unit = 0;
    }

    fn tick(&mut self) {
        self.ticks += 1;
        if self.finished || self.lives <= LIFE_FLOOR {
            return;
        }

        match (self.held.left, self.held.right) {
            (true, false) => self.position = self.position.saturating_sub(1),
            (false, true) => self.position = (self.position + 1).min(self.layout.length),
            _ => {}
        }
        let airborne = self.air_ticks > 0;
        self.air_ticks = self.air_ticks.saturating_sub(1);

        if self.position > self.progress {
            self.score += 10 * (self.position - self.progress) as i64;
            self.progress = self.position;
        }
        if self.position >= self.layout.length {
            self.score += self.layout.goal_bonus;
            self.finished = true;
            return;
        }
        if !airborne && self.layout.is_pit(self.position) {
            self.lose_life();
            return;
        }

        self.tick_in_unit += 1;
        if self.tick_in_unit >= self.layout.ticks_per_time_unit {
            self.tick_in_unit = 0;
            self.time_left = self.time_left.saturating_sub(1);
            if self.time_left == 0 {
                self.lose_life();
            }
        }
    }
}

impl Default for CourseEnvironment {
    fn default() -> Self {
        Self::new(CourseLayout::default())
    }
}

impl Environment for CourseEnvironment {
    type State = CourseState;

    fn reset(&mut self) -> Result<CourseState, EnvironmentError> {
        self.restart();
        self.tick();
        Ok(self.state())
    }

    fn step(
        &mut self,
        action: Action,
        duration: u32,
    ) -> Result<StepOutcome<CourseState>, EnvironmentError> {
        if self.is_terminal() {
            return Ok(StepOutcome::terminal(self.state()));
        }

        for event in action.press_events() {
            self.send(event);
        }
        for _ in 0..duration {
            self.tick();
        }
        for event in action.release_events() {
            self.send(event);
        }
        self.tick();

        Ok(StepOutcome {
            state: self.state(),
            fitness: self.readout(),
            time_remaining: self.time_left,
            status: StepStatus::Progress(self.progress),
        })
    }

    fn is_terminal(&self) -> bool {
        self.finished || self.lives <= LIFE_FLOOR || self.score < 0
    }
}
