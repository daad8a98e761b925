use crate::math::EPSILON;

/// Run state of the simulation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimulationState {
    /// Ticks fire whenever enough time has accumulated
    #[default]
    Running,

    /// Exactly one tick fires on the next frame, then the clock stops
    SingleStep,

    /// No ticks fire
    Stopped,
}

/// Fixed-tick accumulator driving the world from host frame times
#[derive(Debug, Clone)]
pub struct SimulationClock {
    state: SimulationState,
    tick_period: f32,
    max_substeps: u32,
    accumulator: f32,
    ticks: u64,
    time: f64,
}

impl SimulationClock {
    /// Creates a running clock
    pub fn new(tick_period: f32, max_substeps: u32) -> Self {
        Self {
            state: SimulationState::Running,
            tick_period,
            max_substeps: max_substeps.max(1),
            accumulator: 0.0,
            ticks: 0,
            time: 0.0,
        }
    }

    /// Current state
    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Fixed tick period in seconds
    pub fn tick_period(&self) -> f32 {
        self.tick_period
    }

    /// Ticks run since creation
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated seconds since creation
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Freezes the simulation and drops any accumulated time
    pub fn stop(&mut self) {
        self.state = SimulationState::Stopped;
        self.accumulator = 0.0;
    }

    /// Resumes continuous ticking
    pub fn resume(&mut self) {
        self.state = SimulationState::Running;
    }

    /// Arms a single tick for the next frame
    pub fn step_once(&mut self) {
        self.state = SimulationState::SingleStep;
        self.accumulator = 0.0;
    }

    /// Adds a frame's elapsed time and returns how many ticks to run now.
    ///
    /// Time beyond `max_substeps` ticks is discarded rather than carried into
    /// later frames.
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        match self.state {
            SimulationState::Stopped => 0,
            SimulationState::SingleStep => {
                self.state = SimulationState::Stopped;
                1
            }
            SimulationState::Running => {
                if !elapsed.is_finite() || elapsed <= 0.0 {
                    return 0;
                }
                self.accumulator += elapsed;

                let mut ticks = 0;
                // Tolerate rounding so 60 frames of 1/60 s give 60 ticks
                while self.accumulator >= self.tick_period - EPSILON && ticks < self.max_substeps {
                    self.accumulator = (self.accumulator - self.tick_period).max(0.0);
                    ticks += 1;
                }
                if ticks == self.max_substeps && self.accumulator >= self.tick_period {
                    self.accumulator = 0.0;
                }
                ticks
            }
        }
    }

    /// Records that one tick ran
    pub fn record_tick(&mut self) {
        self.ticks += 1;
        self.time += self.tick_period as f64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_fire_only_after_a_full_period() {
        let mut clock = SimulationClock::new(0.1, 1);
        assert_eq!(clock.advance(0.05), 0);
        assert_eq!(clock.advance(0.05), 1);
        assert_eq!(clock.advance(0.02), 0);
    }

    #[test]
    fn stopped_clock_never_ticks() {
        let mut clock = SimulationClock::new(0.1, 4);
        clock.stop();
        assert_eq!(clock.advance(10.0), 0);
        assert_eq!(clock.state(), SimulationState::Stopped);
    }

    #[test]
    fn single_step_runs_once_then_stops() {
        let mut clock = SimulationClock::new(0.1, 4);
        clock.stop();
        clock.step_once();
        assert_eq!(clock.advance(0.0), 1);
        assert_eq!(clock.state(), SimulationState::Stopped);
        assert_eq!(clock.advance(1.0), 0);

        clock.resume();
        assert_eq!(clock.advance(0.1), 1);
    }

    #[test]
    fn excess_time_is_dropped() {
        let mut clock = SimulationClock::new(0.1, 2);
        assert_eq!(clock.advance(1.0), 2);
        assert_eq!(clock.advance(0.05), 0);
    }
}
