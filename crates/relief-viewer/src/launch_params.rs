//! Launch parameter parsing for the viewer.
//!
//! On native, parameters are parsed from command-line arguments using clap.
//! On WASM, defaults are used (CLI argument parsing is not available).

use bevy::prelude::*;
use relief::{ClassifyParams, NonFinitePolicy};
use relief_mesh::classify::{DEFAULT_SCALE, DEFAULT_THRESHOLD};

/// Raster loaded when none is given.
const DEFAULT_RASTER: &str = "assets/se.tif";

/// Launch parameters for the viewer.
#[derive(Resource, Debug, Clone)]
pub struct LaunchParams {
    /// URL or path of the elevation GeoTIFF.
    pub raster: String,
    /// Classification constants for the terrain build.
    pub classify: ClassifyParams,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            raster: DEFAULT_RASTER.to_string(),
            classify: ClassifyParams::default(),
        }
    }
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    #[command(about = "3D viewer for GeoTIFF terrain")]
    pub(super) struct CliArgs {
        /// URL or local path of the elevation GeoTIFF.
        #[arg(long, default_value = DEFAULT_RASTER)]
        pub raster: String,

        /// Multiplier from raster units to vertical displacement.
        #[arg(long, default_value_t = DEFAULT_SCALE, allow_negative_numbers = true)]
        pub scale: f32,

        /// Scaled elevations above this are flattened and hidden.
        #[arg(long, default_value_t = DEFAULT_THRESHOLD, allow_negative_numbers = true)]
        pub threshold: f32,

        /// Fail the load on NaN or infinite samples instead of flattening them.
        #[arg(long)]
        pub reject_non_finite: bool,
    }

    impl From<CliArgs> for LaunchParams {
        fn from(args: CliArgs) -> Self {
            let non_finite = if args.reject_non_finite {
                NonFinitePolicy::Reject
            } else {
                NonFinitePolicy::Flatten
            };
            LaunchParams {
                raster: args.raster,
                classify: ClassifyParams {
                    scale: args.scale,
                    threshold: args.threshold,
                    non_finite,
                },
            }
        }
    }

    pub fn parse() -> LaunchParams {
        CliArgs::parse().into()
    }
}

/// Parse launch parameters from CLI args (native) or use defaults (WASM).
pub fn parse() -> LaunchParams {
    #[cfg(not(target_family = "wasm"))]
    {
        native::parse()
    }
    #[cfg(target_family = "wasm")]
    {
        LaunchParams::default()
    }
}

#[cfg(all(test, not(target_family = "wasm")))]
mod tests {
    use clap::Parser;

    use super::native::CliArgs;
    use super::*;

    #[test]
    fn test_defaults_match_classify_defaults() {
        let params: LaunchParams = CliArgs::parse_from(["relief-viewer"]).into();
        assert_eq!(params.raster, DEFAULT_RASTER);
        assert_eq!(params.classify, ClassifyParams::default());
    }

    #[test]
    fn test_overrides() {
        let params: LaunchParams = CliArgs::parse_from([
            "relief-viewer",
            "--raster",
            "https://example.com/dem.tif",
            "--scale",
            "-0.05",
            "--threshold",
            "-0.1",
            "--reject-non-finite",
        ])
        .into();

        assert_eq!(params.raster, "https://example.com/dem.tif");
        assert_eq!(params.classify.scale, -0.05);
        assert_eq!(params.classify.threshold, -0.1);
        assert_eq!(params.classify.non_finite, NonFinitePolicy::Reject);
    }
}
