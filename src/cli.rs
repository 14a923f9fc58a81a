// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

use crate::config::ViewerConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "meshview")]
#[command(about = "Interactive mesh and point cloud viewer", long_about = None)]
pub struct Cli {
    /// Model files to open (.obj, .gltf, .glb); a demo scene is shown when empty
    pub files: Vec<PathBuf>,

    /// JSON viewer config; command-line flags override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Window title
    #[arg(long)]
    pub title: Option<String>,

    /// Hide the axes
    #[arg(long = "no-axes")]
    pub no_axes: bool,

    /// Start in wireframe mode
    #[arg(long)]
    pub wireframe: bool,

    /// Disable back-face culling
    #[arg(long = "no-cull")]
    pub no_cull: bool,

    /// Redraw continuously instead of waiting for input
    #[arg(long)]
    pub continuous: bool,

    /// Also show mesh vertices as a point cloud
    #[arg(long)]
    pub points: bool,

    /// Point size in pixels for --points
    #[arg(long = "point-size", default_value_t = 2.0)]
    pub point_size: f32,
}

impl Cli {
    /// Layer the flags on top of a config; flags only override when given
    pub fn merge_into(&self, mut config: ViewerConfig) -> ViewerConfig {
        if let Some(title) = &self.title {
            config.title = Some(title.clone());
        }
        if self.no_axes {
            config.draw_axes = Some(false);
        }
        if self.wireframe {
            config.wireframe = Some(true);
        }
        if self.no_cull {
            config.cull_face = Some(false);
        }
        if self.continuous {
            config.loop_wait_events = Some(false);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from(["meshview", "a.obj", "b.glb", "--no-axes", "--point-size", "4"]);
        assert_eq!(cli.files.len(), 2);
        assert!(cli.no_axes);
        assert_eq!(cli.point_size, 4.0);
        assert!(!cli.points);
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from(["meshview", "--wireframe", "--title", "x"]);
        let config = ViewerConfig {
            wireframe: Some(false),
            draw_axes: Some(false),
            ..Default::default()
        };
        let merged = cli.merge_into(config);
        assert_eq!(merged.wireframe, Some(true));
        assert_eq!(merged.draw_axes, Some(false));
        assert_eq!(merged.title.as_deref(), Some("x"));
    }
}
