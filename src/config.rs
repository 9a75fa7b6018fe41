use crate::error::ConfigError;
use crate::palette::Rgb;
use crate::particle::ParticleColors;
use clap::Parser;
use std::path::PathBuf;

/// Terminal firework overlay.
///
/// Press 'q', ESC, or Ctrl+C to exit.
#[derive(Parser, Debug)]
#[command(name = "skyburst", version)]
pub struct Args {
    /// Background color as hex (e.g. --bg-color 1a1b26)
    #[arg(long, value_name = "RRGGBB")]
    pub bg_color: Option<String>,

    /// Chance of launching a rocket on each frame
    #[arg(long, default_value_t = 0.02)]
    pub spawn_chance: f32,

    /// Upper bound on rockets in flight or bursting at once
    #[arg(long, default_value_t = 24)]
    pub max_fireworks: usize,

    /// Opacity removed from the whole screen every frame
    #[arg(long, default_value_t = 0.15)]
    pub trail_fade: f32,

    /// World pixels covered by one half-block
    #[arg(long, default_value_t = 8)]
    pub cell_size: u32,

    /// Simulation frames per second
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// How burst particles are colored
    #[arg(long, value_enum, default_value_t = ParticleColors::Random)]
    pub particle_colors: ParticleColors,

    /// Write logs to this file (RUST_LOG filters, default info)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Knobs of the animation loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tuning {
    pub spawn_chance: f32,
    pub max_fireworks: usize,
    pub trail_fade: f32,
    pub particle_colors: ParticleColors,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            spawn_chance: 0.02,
            max_fireworks: 24,
            trail_fade: 0.15,
            particle_colors: ParticleColors::Random,
        }
    }
}

/// Validated settings for a run.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub tuning: Tuning,
    pub bg_color: Rgb,
    pub cell_size: u32,
    pub fps: u32,
    pub log_file: Option<PathBuf>,
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, value, min, max })
    }
}

impl TryFrom<Args> for Config {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, ConfigError> {
        check_range("--spawn-chance", args.spawn_chance as f64, 0.0, 1.0)?;
        check_range("--trail-fade", args.trail_fade as f64, 0.0, 1.0)?;
        check_range("--cell-size", args.cell_size as f64, 1.0, 64.0)?;
        check_range("--fps", args.fps as f64, 10.0, 240.0)?;
        check_range("--max-fireworks", args.max_fireworks as f64, 1.0, 1000.0)?;

        let bg_color = match args.bg_color.as_deref() {
            Some(hex) => Rgb::from_hex(hex)?,
            None => Rgb::BLACK,
        };

        Ok(Self {
            tuning: Tuning {
                spawn_chance: args.spawn_chance,
                max_fireworks: args.max_fireworks,
                trail_fade: args.trail_fade,
                particle_colors: args.particle_colors,
            },
            bg_color,
            cell_size: args.cell_size,
            fps: args.fps,
            log_file: args.log_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Config, ConfigError> {
        let args = Args::try_parse_from(std::iter::once("skyburst").chain(argv.iter().copied()))
            .expect("clap parse");
        Config::try_from(args)
    }

    #[test]
    fn defaults_match_tuning_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.tuning, Tuning::default());
        assert_eq!(config.bg_color, Rgb::BLACK);
        assert_eq!(config.cell_size, 8);
        assert_eq!(config.fps, 60);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn parses_every_option() {
        let config = parse(&[
            "--bg-color",
            "1a1b26",
            "--spawn-chance",
            "0.03",
            "--max-fireworks",
            "5",
            "--trail-fade",
            "0.3",
            "--cell-size",
            "4",
            "--fps",
            "30",
            "--particle-colors",
            "inherit",
            "--log-file",
            "/tmp/skyburst.log",
        ])
        .unwrap();

        assert_eq!(config.bg_color, Rgb(0x1a, 0x1b, 0x26));
        assert_eq!(config.tuning.spawn_chance, 0.03);
        assert_eq!(config.tuning.max_fireworks, 5);
        assert_eq!(config.tuning.trail_fade, 0.3);
        assert_eq!(config.tuning.particle_colors, ParticleColors::Inherit);
        assert_eq!(config.cell_size, 4);
        assert_eq!(config.fps, 30);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/skyburst.log")));
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(matches!(
            parse(&["--max-fireworks", "0"]),
            Err(ConfigError::OutOfRange { name: "--max-fireworks", .. })
        ));
        assert!(matches!(
            parse(&["--spawn-chance", "1.5"]),
            Err(ConfigError::OutOfRange { name: "--spawn-chance", .. })
        ));
        assert!(matches!(
            parse(&["--fps", "5"]),
            Err(ConfigError::OutOfRange { name: "--fps", .. })
        ));
        assert!(matches!(
            parse(&["--cell-size", "0"]),
            Err(ConfigError::OutOfRange { name: "--cell-size", .. })
        ));
    }

    #[test]
    fn rejects_bad_background() {
        assert_eq!(
            parse(&["--bg-color", "nothex"]),
            Err(ConfigError::InvalidColor("nothex".to_string()))
        );
    }
}
