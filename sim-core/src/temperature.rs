//! Annealing schedule.

/// Simulation temperature with a first-order decay toward a target.
///
/// Each [`Temperature::advance`] applies
/// `value += (target - value) * min(decay * dt, 1)`, which approaches the
/// target monotonically and never overshoots it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Temperature {
    value: f32,
    initial: f32,
    target: f32,
    decay: f32,
}

impl Temperature {
    pub fn new(initial: f32, target: f32, decay: f32) -> Self {
        Self {
            value: initial,
            initial,
            target,
            decay,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    #[inline]
    pub fn initial(&self) -> f32 {
        self.initial
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn advance(&mut self, dt: f32) {
        let k = (self.decay * dt).clamp(0.0, 1.0);
        self.value += (self.target - self.value) * k;
    }

    pub fn reset(&mut self) {
        self.value = self.initial;
    }

    /// Replaces the schedule parameters, keeping the current value.
    pub fn retune(&mut self, initial: f32, target: f32, decay: f32) {
        self.initial = initial;
        self.target = target;
        self.decay = decay;
    }
}
