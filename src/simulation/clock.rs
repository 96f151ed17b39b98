//! Round timing, decoupled from wall-clock time.

/// Counts simulated time within a round and signals when the round is over.
///
/// The time scale stretches or compresses every tick fed to the world, so a
/// faster run plays out the identical round in fewer wall-clock seconds.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    /// Simulated seconds a round lasts.
    pub round_duration: f32,
    /// Multiplier applied to every incoming tick.
    pub time_scale: f32,
    elapsed: f32,
}

impl SimulationClock {
    /// Creates a clock at the start of a round.
    pub fn new(round_duration: f32, time_scale: f32) -> Self {
        Self {
            round_duration,
            time_scale,
            elapsed: 0.0,
        }
    }

    /// Applies the time scale to a raw tick.
    pub fn scaled(&self, dt: f32) -> f32 {
        dt * self.time_scale
    }

    /// Accumulates one scaled tick; returns true when the round just ended.
    ///
    /// The counter rolls straight back to zero on expiry, so the next round
    /// starts counting immediately.
    pub fn advance(&mut self, scaled_dt: f32) -> bool {
        self.elapsed += scaled_dt;
        if self.elapsed >= self.round_duration {
            self.elapsed = 0.0;
            true
        } else {
            false
        }
    }

    /// Simulated seconds into the current round.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Restarts the current round's timer.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}
