//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Strata command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "strata", about = "Layered voxel terrain cross-sections")]
pub struct CliArgs {
    /// Grid width (x).
    #[arg(long)]
    pub size_x: Option<u32>,

    /// Grid depth (y).
    #[arg(long)]
    pub size_y: Option<u32>,

    /// Grid height (z).
    #[arg(long)]
    pub size_z: Option<u32>,

    /// Initial cut height.
    #[arg(long)]
    pub top: Option<u32>,

    /// Draw a base plane under the grid.
    #[arg(long)]
    pub grid_bottom: Option<bool>,

    /// Terrain seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of random edits to replay.
    #[arg(long)]
    pub edits: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(x) = args.size_x {
            self.grid.size_x = x;
        }
        if let Some(y) = args.size_y {
            self.grid.size_y = y;
        }
        if let Some(z) = args.size_z {
            self.grid.size_z = z;
        }
        if let Some(top) = args.top {
            self.slice.initial_top = Some(top);
        }
        if let Some(bottom) = args.grid_bottom {
            self.slice.draw_grid_bottom = bottom;
        }
        if let Some(seed) = args.seed {
            self.terrain.seed = seed;
        }
        if let Some(edits) = args.edits {
            self.terrain.edits = edits;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            size_z: Some(8),
            top: Some(3),
            seed: Some(7),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.grid.size_z, 8);
        assert_eq!(config.slice.initial_top, Some(3));
        assert_eq!(config.terrain.seed, 7);
        // Non-overridden fields retain defaults
        assert_eq!(config.grid.size_x, 32);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::try_parse_from([
            "strata",
            "--size-x",
            "10",
            "--grid-bottom",
            "true",
            "--log-level",
            "debug",
            "--config",
            "/tmp/strata",
        ])
        .unwrap();
        assert_eq!(args.size_x, Some(10));
        assert_eq!(args.grid_bottom, Some(true));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/strata")));
        assert_eq!(args.top, None);
    }
}
