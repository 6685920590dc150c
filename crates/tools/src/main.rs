use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use surface::procedural::BlobParams;
use surface::sdf::DEFAULT_MAX_DISTANCE;
use tools::ImageReport;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Surface asset tools for the route globe")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bake a binary land mask PNG into a signed-distance PNG
    BakeSdf {
        /// Land mask; luma above 127 is land
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,

        /// Distance in pixels at which the field saturates
        #[arg(long, default_value_t = DEFAULT_MAX_DISTANCE)]
        max_distance: f32,
    },

    /// Render the procedural land mask for a seed
    PreviewMask {
        #[arg(long, default_value_t = BlobParams::default().seed)]
        seed: u64,

        #[arg(long)]
        out: PathBuf,

        #[arg(long, default_value_t = BlobParams::default().width)]
        width: u32,

        #[arg(long, default_value_t = BlobParams::default().height)]
        height: u32,

        #[arg(long, default_value_t = BlobParams::default().blobs)]
        blobs: u32,
    },

    /// Write the built-in airport table as JSON (for AIRPORTS_PATH)
    Airports {
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() {
    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::BakeSdf {
            input,
            output,
            max_distance,
        } => {
            let mask = fs::read(&input).map_err(|e| format!("read {input:?}: {e}"))?;
            let (png, report) =
                tools::bake_sdf_png(&mask, max_distance).map_err(|e| format!("bake sdf: {e}"))?;
            write(&output, &png, &report)
        }
        Command::PreviewMask {
            seed,
            out,
            width,
            height,
            blobs,
        } => {
            let params = BlobParams {
                seed,
                width,
                height,
                blobs,
                ..BlobParams::default()
            };
            let (png, report) =
                tools::preview_mask_png(&params).map_err(|e| format!("preview mask: {e}"))?;
            write(&out, &png, &report)
        }
        Command::Airports { out } => {
            let json = tools::airports_json().map_err(|e| format!("json: {e}"))?;
            fs::write(&out, json).map_err(|e| format!("write {out:?}: {e}"))?;
            eprintln!("wrote {}", out.display());
            Ok(())
        }
    }
}

fn write(path: &Path, png: &[u8], report: &ImageReport) -> Result<(), String> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| format!("create {dir:?}: {e}"))?;
    }
    fs::write(path, png).map_err(|e| format!("write {path:?}: {e}"))?;
    tracing::debug!(?report, "image written");
    eprintln!(
        "wrote {} ({}x{}, land {:.1}%, blake3={})",
        path.display(),
        report.width,
        report.height,
        report.land_coverage * 100.0,
        report.blake3
    );
    Ok(())
}
