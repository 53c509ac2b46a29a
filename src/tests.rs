use crate::config::{AppConfig, load_config_from_path, parse_config};
use bitvox_mesh_cpu::MesherKind;
use bitvox_world::TerrainMode;

#[test]
fn empty_config_is_all_defaults() {
    assert_eq!(parse_config("").unwrap(), AppConfig::default());
}

#[test]
fn partial_tables_keep_remaining_defaults() {
    let cfg = parse_config(
        r#"
[engine]
mesher = "naive"
world_radius = 4

[terrain]
mode = "flat"
flat_height = 20
"#,
    )
    .unwrap();
    assert_eq!(cfg.engine.mesher, MesherKind::Naive);
    assert_eq!(cfg.engine.world_radius, 4);
    assert_eq!(cfg.engine.max_jobs_per_tick, 8);
    assert_eq!(cfg.terrain.mode, TerrainMode::Flat);
    assert_eq!(cfg.terrain.flat_height, 20);
    assert_eq!(cfg.terrain.seed, 1337);
}

#[test]
fn malformed_config_is_an_error() {
    assert!(parse_config("[engine]\nmesher = \"marching\"").is_err());
    assert!(parse_config("[engine").is_err());
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let cfg = load_config_from_path(std::path::Path::new("does/not/exist.toml")).unwrap();
    assert_eq!(cfg, AppConfig::default());
}
