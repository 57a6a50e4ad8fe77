//! Tests for configuration validation

use std::collections::{BTreeMap, HashMap};

use chassis_scheduler::config::{ChassisConfig, SchedulerConfig, CONFIG_ENV_VAR};
use chassis_scheduler::core::ArchitectureFlavor;

fn alpha() -> ChassisConfig {
    ChassisConfig {
        max_catalytic_units: 100,
        max_memory: 1000,
        architecture: ArchitectureFlavor::SingleCompartment,
        overhead_reserve_fraction: 0.1,
        dimensions: BTreeMap::new(),
    }
}

fn config_with(chassis: ChassisConfig) -> SchedulerConfig {
    SchedulerConfig {
        chassis: HashMap::from([("alpha".to_string(), chassis)]),
        quantum_ticks: 10,
        audit_capacity: 16,
    }
}

#[test]
fn test_chassis_config_validation() {
    assert!(config_with(alpha()).validate().is_ok());
}

#[test]
fn test_reserve_fraction_out_of_range() {
    let mut invalid = alpha();
    invalid.overhead_reserve_fraction = 1.0;
    assert!(config_with(invalid).validate().is_err());
}

#[test]
fn test_zero_regions_invalid() {
    let mut invalid = alpha();
    invalid.architecture = ArchitectureFlavor::Compartmentalized { regions: 0 };
    assert!(config_with(invalid).validate().is_err());
}

#[test]
fn test_zero_quantum_invalid() {
    let mut config = config_with(alpha());
    config.quantum_ticks = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_scheduler_config_empty_chassis() {
    let config = SchedulerConfig {
        chassis: HashMap::new(),
        quantum_ticks: 10,
        audit_capacity: 16,
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_default_config_matches_builtin_registry() {
    let config = SchedulerConfig::default();
    assert!(config.validate().is_ok());
    let registry = config.to_registry().unwrap();
    assert_eq!(registry.names(), vec!["eukaryote", "minimal", "prokaryote"]);
    let euk = registry.lookup("eukaryote").unwrap();
    assert_eq!(
        euk.architecture(),
        ArchitectureFlavor::Compartmentalized { regions: 4 }
    );
}

#[test]
fn test_scheduler_config_from_json() {
    let json = r#"{
        "chassis": {
            "alpha": {
                "max_catalytic_units": 100,
                "max_memory": 1000,
                "overhead_reserve_fraction": 0.1,
                "dimensions": { "energy_currency": 100, "nadh": 50 }
            },
            "beta": {
                "max_catalytic_units": 20,
                "max_memory": 200,
                "architecture": { "kind": "compartmentalized", "regions": 2 },
                "overhead_reserve_fraction": 0.0
            }
        }
    }"#;

    let config = SchedulerConfig::from_json_str(json).unwrap();
    assert_eq!(config.quantum_ticks, 10);
    assert_eq!(config.audit_capacity, 1024);
    assert_eq!(config.chassis["alpha"].dimensions["nadh"], 50);
    assert_eq!(
        config.chassis["beta"].architecture,
        ArchitectureFlavor::Compartmentalized { regions: 2 }
    );
}

#[test]
fn test_json_rejects_builtin_dimension_override() {
    let json = r#"{
        "chassis": {
            "alpha": {
                "max_catalytic_units": 100,
                "max_memory": 1000,
                "overhead_reserve_fraction": 0.1,
                "dimensions": { "memory": 5 }
            }
        }
    }"#;
    let err = SchedulerConfig::from_json_str(json).unwrap_err();
    assert!(err.contains("alpha"));
}

#[test]
fn test_json_parse_error() {
    assert!(SchedulerConfig::from_json_str("{ not json").is_err());
}

#[test]
fn test_from_file_round_trip() {
    let path = std::env::temp_dir().join(format!("chassis-config-{}.json", std::process::id()));
    let config = config_with(alpha());
    std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();
    let loaded = SchedulerConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded, config);
}

#[test]
fn test_from_file_missing() {
    let err = SchedulerConfig::from_file("/nonexistent/chassis.json").unwrap_err();
    assert!(err.to_string().contains("reading config"));
}

// Both branches share one test so nothing else in this binary races on the variable.
#[test]
fn test_from_env_unset_then_pointing_at_file() {
    std::env::remove_var(CONFIG_ENV_VAR);
    let fallback = SchedulerConfig::from_env().unwrap();
    assert_eq!(fallback, SchedulerConfig::default());

    let path = std::env::temp_dir().join(format!("chassis-env-{}.json", std::process::id()));
    let config = config_with(alpha());
    std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();
    std::env::set_var(CONFIG_ENV_VAR, &path);
    let loaded = SchedulerConfig::from_env();
    std::env::remove_var(CONFIG_ENV_VAR);
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded.unwrap(), config);
}
