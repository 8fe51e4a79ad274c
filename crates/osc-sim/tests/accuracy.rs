//! Integration test: numeric behaviour of both integrators on the demo run.
//!
//! w0 = 1.0, dt = 0.05, n = 1000 (50 time units, ~8 periods)
//! - Forward Euler gains energy on every step
//! - RK4 tracks cos(w0 t) to within 1e-4
//! - identical parameters give bit-identical frames

use osc_sim::{
    FrameSample, IntegratorKind, OscillatorState, Run, SimulationParameters, analytic_position,
    collect_frames,
};
use osc_core::{Tolerances, nearly_equal};
use proptest::prelude::*;

fn energies(kind: IntegratorKind, params: SimulationParameters) -> Vec<f64> {
    let mut run = Run::spring(kind, params).expect("valid parameters");
    let mut out = Vec::with_capacity(params.step_count);
    while let Some(frame) = run.next() {
        frame.expect("spring run never fails");
        out.push(run.state().energy(params.natural_frequency));
    }
    out
}

#[test]
fn euler_energy_drifts_upward_monotonically() {
    let params = SimulationParameters::default();
    let e = energies(IntegratorKind::Euler, params);

    assert_eq!(e.len(), 1000);
    assert_eq!(e[0], OscillatorState::INITIAL.energy(1.0));
    for w in e.windows(2) {
        assert!(w[1] > w[0], "energy must grow every step: {} -> {}", w[0], w[1]);
    }
    // (1 + w0^2 dt^2)^999 growth for the undamped spring
    let expected = 0.5 * (1.0 + 0.05_f64 * 0.05).powi(999);
    let tol = Tolerances { abs: 0.0, rel: 1e-9 };
    assert!(nearly_equal(e[999], expected, tol));
}

#[test]
fn rk4_tracks_analytic_solution() {
    let params = SimulationParameters::default();
    let frames = collect_frames(IntegratorKind::Rk4, params).unwrap();

    assert_eq!(frames.len(), 1000);
    let max_err = frames.iter().map(|f| f.error().abs()).fold(0.0, f64::max);
    assert!(max_err < 1e-4, "RK4 max error {max_err}");
}

#[test]
fn rk4_energy_stays_flat_while_euler_grows() {
    let params = SimulationParameters::default();
    let rk4 = energies(IntegratorKind::Rk4, params);
    let euler = energies(IntegratorKind::Euler, params);

    let rk4_drift = (rk4[999] - rk4[0]).abs() / rk4[0];
    let euler_drift = (euler[999] - euler[0]) / euler[0];
    assert!(rk4_drift < 1e-6);
    assert!(euler_drift > 10.0);
}

#[test]
fn euler_frames_match_hand_rolled_loop() {
    let params = SimulationParameters::new(1.0, 0.05, 200);
    let frames = collect_frames(IntegratorKind::Euler, params).unwrap();

    let (mut x, mut v) = (1.0_f64, 0.0_f64);
    for (i, f) in frames.iter().enumerate() {
        let t = i as f64 * 0.05;
        assert_eq!(*f, FrameSample::new(t, x, analytic_position(1.0, t)));
        let a = -1.0 * 1.0 * x;
        let x_next = x + v * 0.05;
        v += a * 0.05;
        x = x_next;
    }
}

#[test]
fn euler_second_frame_scenario() {
    let params = SimulationParameters::new(1.0, 0.05, 2);
    let mut run = Run::spring(IntegratorKind::Euler, params).unwrap();

    let first = run.next().unwrap().unwrap();
    assert_eq!(first, FrameSample::new(0.0, 1.0, 1.0));

    let second = run.next().unwrap().unwrap();
    assert_eq!(second.time, 0.05);
    assert_eq!(second.position, 1.0);
    assert_eq!(run.state().velocity, -0.05);
    assert!(run.next().is_none());
}

#[test]
fn euler_with_huge_step_goes_unstable_without_failing() {
    let params = SimulationParameters::new(1.0, 2.5, 50);
    let frames = collect_frames(IntegratorKind::Euler, params).unwrap();
    assert_eq!(frames.len(), 50);
    assert!(frames.last().unwrap().position.abs() > 1e6);
}

#[test]
fn repeated_runs_are_bit_identical() {
    for kind in IntegratorKind::ALL {
        let a = collect_frames(kind, SimulationParameters::default()).unwrap();
        let b = collect_frames(kind, SimulationParameters::default()).unwrap();
        assert_eq!(a, b);
    }
}

fn bits(frames: &[FrameSample]) -> Vec<[u64; 3]> {
    frames
        .iter()
        .map(|f| {
            [
                f.time.to_bits(),
                f.position.to_bits(),
                f.analytic_position.to_bits(),
            ]
        })
        .collect()
}

proptest! {
    #[test]
    fn determinism_over_parameters(
        w0 in 0.1_f64..5.0,
        dt in 1e-3_f64..0.5,
        n in 1usize..200,
        euler in any::<bool>(),
    ) {
        let kind = if euler { IntegratorKind::Euler } else { IntegratorKind::Rk4 };
        let params = SimulationParameters::new(w0, dt, n);
        let a = collect_frames(kind, params).unwrap();
        let b = collect_frames(kind, params).unwrap();
        prop_assert_eq!(a.len(), n);
        prop_assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn first_frame_is_initial_state(w0 in 0.1_f64..10.0, dt in 1e-3_f64..1.0) {
        for kind in IntegratorKind::ALL {
            let frames = collect_frames(kind, SimulationParameters::new(w0, dt, 1)).unwrap();
            prop_assert_eq!(frames, vec![FrameSample::new(0.0, 1.0, 1.0)]);
        }
    }
}
