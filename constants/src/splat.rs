/// Remote sample loaded by the "load sample" control.
pub const SAMPLE_SPLAT_URL: &str =
    "https://huggingface.co/cakewalk/splat-data/resolve/main/nike.splat";

/// Runtime configuration asset, relative to the asset root.
pub const VIEWER_CONFIG_PATH: &str = "viewer_config.json";

/// Zeroth-order spherical harmonic constant used to turn `f_dc_*` into colour.
pub const SH_C0: f32 = 0.282_094_8;

/// Size of one record in the packed `.splat` format.
pub const SPLAT_RECORD_SIZE: usize = 32;
