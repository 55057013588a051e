use std::path::Path;

use galaxy::configuration::config::{Config, ConfigError, DistributionKind, VisualizerMode};
use galaxy::{Integrator, Quantity, TreeEngine, Units};

use approx::assert_relative_eq;

const FULL_CONFIG: &str = r#"
physical:
  G0: 6.6743e-11
simulation:
  dim: 2
  seed: 7
  units:
    dist: { unit: kpc, val: 0.1 }
    time: { unit: Myear }
    mass: { unit: mass_sun }
  size:
    extent: { x: 100.0, y: 100.0 }
  integration:
    type: leapfrog
    dt: 0.5
    t_end: 100.0
  engine:
    theta: 0.5
    eps: 0.05
  mass_distribution:
    type: simple_exponential
    N: 64
    total_mass: 1.0e11
    lambda: 0.05
  plots:
    energy: { enable: true }
visualization:
  mode: "off"
  every: 10
"#;

#[test]
fn full_configuration_round_trips() {
    let cfg: Config = serde_yaml::from_str(FULL_CONFIG).unwrap();

    assert_eq!(cfg.simulation.dim, 2);
    assert_eq!(cfg.simulation.seed, 7);
    assert_eq!(cfg.simulation.integration.method, Integrator::Leapfrog);
    assert_relative_eq!(cfg.simulation.integration.dt, 0.5);
    assert_eq!(cfg.simulation.integration.t_end, Some(100.0));
    assert_relative_eq!(cfg.simulation.engine.theta, 0.5);
    assert_relative_eq!(cfg.simulation.engine.eps, 0.05);
    assert_eq!(cfg.visualization.mode, VisualizerMode::Off);
    assert_eq!(cfg.visualization.every, 10);

    match &cfg.simulation.mass_distribution.kind {
        DistributionKind::SimpleExponential {
            n,
            total_mass,
            lambda,
        } => {
            assert_eq!(*n, 64);
            assert_relative_eq!(*total_mass, 1.0e11);
            assert_relative_eq!(*lambda, 0.05);
        }
        other => panic!("unexpected distribution {other:?}"),
    }
}

#[test]
fn omitted_keys_fall_back_to_defaults() {
    let yaml = FULL_CONFIG
        .replace("  seed: 7\n", "")
        .replace("    t_end: 100.0\n", "")
        .replace("  plots:\n    energy: { enable: true }\n", "")
        .replace("visualization:\n  mode: \"off\"\n  every: 10\n", "");
    let cfg: Config = serde_yaml::from_str(&yaml).unwrap();

    assert_eq!(cfg.simulation.seed, 42);
    assert_eq!(cfg.simulation.integration.t_end, None);
    assert!(cfg.simulation.plots.energy.is_none());
    assert_eq!(cfg.visualization.mode, VisualizerMode::Console);
    assert_eq!(cfg.visualization.every, 100);

    // Unit multiplier defaults to 1.
    assert_relative_eq!(cfg.simulation.units.time.val, 1.0);
}

#[test]
fn missing_required_keys_fail_to_parse() {
    let yaml = FULL_CONFIG.replace("    theta: 0.5\n", "");
    assert!(serde_yaml::from_str::<Config>(&yaml).is_err());

    let yaml = FULL_CONFIG.replace("    dt: 0.5\n", "");
    assert!(serde_yaml::from_str::<Config>(&yaml).is_err());
}

#[test]
fn unknown_backend_names_fail_to_parse() {
    let yaml = FULL_CONFIG.replace("type: leapfrog", "type: rk4");
    assert!(serde_yaml::from_str::<Config>(&yaml).is_err());

    let yaml = FULL_CONFIG.replace("type: simple_exponential", "type: plummer");
    assert!(serde_yaml::from_str::<Config>(&yaml).is_err());
}

#[test]
fn unknown_units_surface_a_config_error() {
    let yaml = FULL_CONFIG.replace("unit: kpc", "unit: lightyear");
    let cfg: Config = serde_yaml::from_str(&yaml).unwrap();

    match Units::from_config(&cfg) {
        Err(ConfigError::UnknownUnit(sym)) => assert_eq!(sym, "lightyear"),
        other => panic!("expected UnknownUnit, got {other:?}"),
    }
}

#[test]
fn missing_z_extent_is_an_error_in_3d() {
    let cfg: Config = serde_yaml::from_str(FULL_CONFIG).unwrap();
    let err = cfg.simulation.size.extent.half_extents::<3>();
    assert!(matches!(err, Err(ConfigError::MissingKey(_))));

    // 2D does not need z.
    let half = cfg.simulation.size.extent.half_extents::<2>().unwrap();
    assert_relative_eq!(half[0], 100.0);
    assert_relative_eq!(half[1], 100.0);
}

#[test]
fn galactic_units_rescale_g() {
    let cfg: Config = serde_yaml::from_str(FULL_CONFIG).unwrap();
    let units = Units::from_config(&cfg).unwrap();

    assert_eq!(units.unit(Quantity::Dist).symbol, "kpc");
    // One length unit is 0.1 kpc here; kpc/Myear/mass_sun alone gives
    // 4.4937e-12 and the 0.1 multiplier scales it by 10^3.
    assert_relative_eq!(units.g(), 4.4937e-9, max_relative = 1e-4);
}

#[test]
fn engine_builds_from_a_full_configuration() {
    let cfg: Config = serde_yaml::from_str(FULL_CONFIG).unwrap();
    let units = Units::from_config(&cfg).unwrap();

    let eng = TreeEngine::<2>::from_config(&cfg, &units).unwrap();
    assert_eq!(eng.bodies.len(), 64);
    assert!(eng.energy().is_some());
    assert_relative_eq!(eng.dt, 0.5);

    // Construction ends in centroidal coordinates.
    let momentum: f64 = eng
        .bodies
        .iter()
        .fold(galaxy::Vect::<2>::zeros(), |acc, b| acc + b.vel * b.mass)
        .norm();
    assert!(momentum < 1e-3);
}

#[test]
fn shipped_scenarios_parse_and_validate() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");
    for name in ["two_body.yaml", "disk.yaml", "collision.yaml"] {
        let cfg = Config::from_path(&dir.join(name)).unwrap_or_else(|e| panic!("{name}: {e}"));
        let units = Units::from_config(&cfg).unwrap();
        assert!(units.g() > 0.0);
        assert!(matches!(cfg.simulation.dim, 2 | 3));
    }
}
