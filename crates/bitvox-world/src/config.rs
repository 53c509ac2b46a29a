use serde::Deserialize;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TerrainMode {
    #[default]
    Noise,
    Flat,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TerrainConfig {
    #[serde(default)]
    pub mode: TerrainMode,
    #[serde(default = "default_seed")]
    pub seed: i32,
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    #[serde(default = "default_amplitude")]
    pub amplitude: f32,
    #[serde(default = "default_base_height")]
    pub base_height: f32,
    #[serde(default = "default_flat_height")]
    pub flat_height: i32,
    #[serde(default = "default_material")]
    pub material: u8,
}

fn default_seed() -> i32 {
    1337
}
fn default_frequency() -> f32 {
    0.06
}
fn default_amplitude() -> f32 {
    40.0
}
fn default_base_height() -> f32 {
    10.0
}
fn default_flat_height() -> i32 {
    8
}
fn default_material() -> u8 {
    1
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            mode: TerrainMode::Noise,
            seed: default_seed(),
            frequency: default_frequency(),
            amplitude: default_amplitude(),
            base_height: default_base_height(),
            flat_height: default_flat_height(),
            material: default_material(),
        }
    }
}
