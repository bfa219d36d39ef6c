use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec3;
use gridview_common::{ConfigFormat, DemoConfig, PipelineVariant, Rgb};
use gridview_render::{AsciiRenderer, RenderView, Renderer};
use gridview_shade::{FragmentInput, GridShader, ShadedFragment};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gridview-cli", about = "Headless tools for the procedural grid")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Evaluate the grid shader at one point on the plane
    Shade {
        #[arg(long, default_value = "0")]
        x: f32,
        #[arg(long, default_value = "0")]
        z: f32,
        #[arg(long, default_value = "0")]
        camera_x: f32,
        #[arg(long, default_value = "10")]
        camera_y: f32,
        #[arg(long, default_value = "15")]
        camera_z: f32,
        /// World-space footprint of one pixel along x and z
        #[arg(long, default_value = "0.01")]
        deriv: f32,
        #[arg(long)]
        variant: Option<VariantArg>,
        /// Grid config (YAML or JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render the grid to the terminal as ASCII
    Preview {
        #[arg(long, default_value = "80")]
        width: u32,
        #[arg(long, default_value = "32")]
        height: u32,
        #[arg(long, default_value = "0")]
        eye_x: f32,
        #[arg(long, default_value = "10")]
        eye_y: f32,
        #[arg(long, default_value = "15")]
        eye_z: f32,
        #[arg(long)]
        variant: Option<VariantArg>,
        /// Grid config (YAML or JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the default config
    Defaults {
        #[arg(long, value_enum, default_value = "yaml")]
        format: FormatArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantArg {
    Canonical,
    Simplified,
}

impl From<VariantArg> for PipelineVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Canonical => PipelineVariant::Canonical,
            VariantArg::Simplified => PipelineVariant::Simplified,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Yaml,
    Json,
}

impl From<FormatArg> for ConfigFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Yaml => ConfigFormat::Yaml,
            FormatArg::Json => ConfigFormat::Json,
        }
    }
}

#[derive(Debug, Serialize)]
struct ShadeReport {
    world: [f32; 3],
    camera: [f32; 3],
    variant: PipelineVariant,
    axis: [f32; 2],
    major: [f32; 2],
    minor: [f32; 2],
    grid_color: Rgb,
    axis_color: Rgb,
    rgba: [f32; 4],
}

impl ShadeReport {
    fn new(input: &FragmentInput, variant: PipelineVariant, shaded: &ShadedFragment) -> Self {
        let out = shaded.output;
        Self {
            world: input.world_position.to_array(),
            camera: input.camera_position.to_array(),
            variant,
            axis: shaded.masks.axis.to_array(),
            major: shaded.masks.major.to_array(),
            minor: shaded.masks.minor.to_array(),
            grid_color: shaded.grid_color,
            axis_color: shaded.axis_color,
            rgba: [out.r, out.g, out.b, out.a],
        }
    }
}

/// Defaults when no path is given; an explicit path must load.
fn load_config(path: Option<&Path>, variant: Option<VariantArg>) -> anyhow::Result<DemoConfig> {
    let mut config = match path {
        Some(path) => DemoConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DemoConfig::default(),
    };
    if let Some(variant) = variant {
        config.variant = variant.into();
    }
    tracing::debug!(variant = %config.variant, "config ready");
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("gridview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", gridview_render::crate_info());
            let defaults = DemoConfig::default();
            println!("default variant: {}", defaults.variant);
            println!(
                "default grid: div={} major_div={} alpha={}",
                defaults.grid.grid_div, defaults.grid.major_grid_div, defaults.grid.base_alpha
            );
        }
        Commands::Shade {
            x,
            z,
            camera_x,
            camera_y,
            camera_z,
            deriv,
            variant,
            config,
            json,
        } => {
            let config = load_config(config.as_deref(), variant)?;
            let shader = GridShader::new(config.grid, config.variant);
            let input = FragmentInput::new(
                Vec3::new(x, 0.0, z),
                Vec3::new(camera_x, camera_y, camera_z),
            )
            .with_derivatives(Vec3::new(deriv, 0.0, 0.0), Vec3::new(0.0, 0.0, deriv));
            let shaded = shader.evaluate(&input);
            let report = ShadeReport::new(&input, config.variant, &shaded);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Fragment ({x}, {z}) [{}]", config.variant);
                println!("  axis:  ({:.4}, {:.4})", report.axis[0], report.axis[1]);
                println!("  major: ({:.4}, {:.4})", report.major[0], report.major[1]);
                println!("  minor: ({:.4}, {:.4})", report.minor[0], report.minor[1]);
                println!("  grid color: {}", report.grid_color);
                println!("  axis color: {}", report.axis_color);
                println!(
                    "  rgba: ({:.4}, {:.4}, {:.4}, {:.4})",
                    report.rgba[0], report.rgba[1], report.rgba[2], report.rgba[3]
                );
            }
        }
        Commands::Preview {
            width,
            height,
            eye_x,
            eye_y,
            eye_z,
            variant,
            config,
        } => {
            let config = load_config(config.as_deref(), variant)?;
            let mut renderer = AsciiRenderer::new(width, height);
            renderer.inner = renderer.inner.with_variant(config.variant);
            let view = RenderView {
                eye: Vec3::new(eye_x, eye_y, eye_z),
                ..RenderView::default()
            };
            print!("{}", renderer.render(&config.grid, &view));
        }
        Commands::Defaults { format } => {
            print!("{}", DemoConfig::default().to_text(format.into())?);
        }
    }

    Ok(())
}
