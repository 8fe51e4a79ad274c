//! Side-by-side accuracy summary of the available integrators.

use osc_sim::{IntegratorKind, Run, SimResult, SimulationParameters};

/// Accuracy figures for one integrator over one run.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegratorSummary {
    pub kind: IntegratorKind,
    pub samples: usize,
    /// max |x - cos(w0 t)| over the run
    pub max_abs_error: f64,
    pub final_error: f64,
    pub initial_energy: f64,
    pub final_energy: f64,
}

impl IntegratorSummary {
    /// (E_final - E_initial) / E_initial
    pub fn energy_drift(&self) -> f64 {
        (self.final_energy - self.initial_energy) / self.initial_energy
    }
}

/// Run one integrator at full speed and summarise it.
pub fn summarize(
    kind: IntegratorKind,
    params: SimulationParameters,
) -> SimResult<IntegratorSummary> {
    let w0 = params.natural_frequency;
    let mut run = Run::spring(kind, params)?;
    let initial_energy = run.state().energy(w0);

    let mut samples = 0;
    let mut max_abs_error: f64 = 0.0;
    let mut final_error = 0.0;
    for frame in run.by_ref() {
        let frame = frame?;
        samples += 1;
        max_abs_error = max_abs_error.max(frame.error().abs());
        final_error = frame.error();
    }

    Ok(IntegratorSummary {
        kind,
        samples,
        max_abs_error,
        final_error,
        initial_energy,
        final_energy: run.state().energy(w0),
    })
}

/// Summaries for every integrator, in [`IntegratorKind::ALL`] order.
pub fn compare(params: SimulationParameters) -> SimResult<Vec<IntegratorSummary>> {
    IntegratorKind::ALL
        .iter()
        .map(|&kind| summarize(kind, params))
        .collect()
}
