//! Energy diagnostics sink.
//!
//! Stores the kinetic and potential series side by side; the total at an
//! index is their sum. `show` reports the running drift relative to the
//! first sample.

pub struct EnergyPlot {
    kin: Vec<f64>,
    pot: Vec<f64>,
}

impl EnergyPlot {
    pub fn new() -> Self {
        Self {
            kin: Vec::new(),
            pot: Vec::new(),
        }
    }

    pub fn log(&mut self, kin: f64, pot: f64) {
        self.kin.push(kin);
        self.pot.push(pot);
    }

    pub fn show(&self) {
        if self.len() < 2 {
            return;
        }
        let last = self.len() - 1;
        log::debug!(
            "energy: kin = {:.6e}, pot = {:.6e}, total = {:.6e}, drift = {:.3e}",
            self.kin[last],
            self.pot[last],
            self.total(last),
            self.drift(),
        );
    }

    pub fn len(&self) -> usize {
        self.kin.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kin.is_empty()
    }

    /// Total energy of the sample at `idx`.
    pub fn total(&self, idx: usize) -> f64 {
        self.kin[idx] + self.pot[idx]
    }

    /// Relative drift of the latest total against the first sample.
    pub fn drift(&self) -> f64 {
        if self.len() < 2 {
            return 0.0;
        }
        let base = self.total(0);
        if base == 0.0 {
            return 0.0;
        }
        (self.total(self.len() - 1) - base).abs() / base.abs()
    }
}

impl Default for EnergyPlot {
    fn default() -> Self {
        Self::new()
    }
}
