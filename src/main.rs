//! VTF CLI - Command-line tool for inspecting and converting Valve Texture Format files.
//!
//! This is the main entry point for the `vtf` command-line application.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use vtf::prelude::*;

/// Size of the chunks fed to the incremental loader.
const READ_CHUNK: usize = 64 * 1024;

/// VTF - Valve Texture Format inspection and conversion tool
#[derive(Parser)]
#[command(name = "vtf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the header and mip layout of a VTF file
    Info {
        /// Input VTF file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Decode every frame of a VTF file to PNG
    Decode {
        /// Input VTF file
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, env = "OUTPUT_FOLDER")]
        output: PathBuf,

        /// Row alignment of decoded frames in bytes
        #[arg(
            long,
            env = "VTF_ROW_ALIGNMENT",
            default_value_t = DecodeOptions::DEFAULT_ROW_ALIGNMENT
        )]
        row_alignment: usize,
    },

    /// Decode every VTF file matching a glob pattern to PNG
    Batch {
        /// Glob pattern, e.g. "materials/**/*.vtf"
        #[arg(short, long)]
        pattern: String,

        /// Output directory
        #[arg(short, long, env = "OUTPUT_FOLDER")]
        output: PathBuf,

        /// Row alignment of decoded frames in bytes
        #[arg(
            long,
            env = "VTF_ROW_ALIGNMENT",
            default_value_t = DecodeOptions::DEFAULT_ROW_ALIGNMENT
        )]
        row_alignment: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }
        Commands::Decode {
            input,
            output,
            row_alignment,
        } => {
            let options = DecodeOptions::default().with_row_alignment(row_alignment);
            cmd_decode(&input, &output, options)?;
        }
        Commands::Batch {
            pattern,
            output,
            row_alignment,
        } => {
            let options = DecodeOptions::default().with_row_alignment(row_alignment);
            cmd_batch(&pattern, &output, options)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn cmd_info(input: &Path) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;

    if !vtf::is_vtf(&data) {
        anyhow::bail!("Input file is not a VTF file");
    }

    let texture = Texture::parse(&data).context("Failed to parse VTF header")?;
    let layout = MipLayout::new(&texture);

    println!("File:          {}", input.display());
    println!("Version:       {}.{}", texture.version.0, texture.version.1);
    println!("Header size:   {}", texture.header_size);
    println!("Dimensions:    {}x{}x{}", texture.width, texture.height, texture.depth);
    println!("Frames:        {} (first {})", texture.frames, texture.first_frame);
    println!("Flags:         {:#010x}", texture.flags);
    println!("Format:        {}", texture.format);
    println!("Mipmaps:       {}", texture.mipmap_count);
    println!(
        "Thumbnail:     {}x{} {}",
        texture.low_res_width, texture.low_res_height, texture.low_res_format
    );
    println!(
        "Reflectivity:  {:.3} {:.3} {:.3}",
        texture.reflectivity[0], texture.reflectivity[1], texture.reflectivity[2]
    );
    println!("Bumpmap scale: {:.3}", texture.bumpmap_scale);

    if !texture.format.is_supported() {
        println!("\nImage data layout unavailable: format is not supported");
        return Ok(());
    }

    match layout.locate(data.len()) {
        Ok(region) => println!(
            "Image data:    {} bytes at offset {}",
            region.length, region.start
        ),
        Err(e) => println!("Image data:    {e}"),
    }

    println!("\n{:>5} {:>12} {:>12} {:>12}", "Mip", "Size", "Bytes", "Offset");
    for level in 0..layout.mipmap_count() {
        let (width, height, depth) = layout.mip_dimensions(level);
        println!(
            "{:>5} {:>12} {:>12} {:>12}",
            level,
            format!("{width}x{height}x{depth}"),
            layout.mip_size(level, u32::from(texture.depth)),
            layout.offset(0, 0, 0, level)
        );
    }

    Ok(())
}

/// Read a file through the incremental loader.
fn load(input: &Path) -> Result<Loader> {
    let mut file = File::open(input).context("Failed to open input file")?;
    let mut loader = Loader::new()?;
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        let read = file.read(&mut chunk).context("Failed to read input file")?;
        if read == 0 {
            break;
        }
        loader.push(&chunk[..read])?;
    }

    debug!(path = %input.display(), bytes = loader.buffered(), "loaded file");
    Ok(loader)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string())
}

/// The leading components of a glob pattern that contain no wildcards.
fn glob_base(pattern: &str) -> PathBuf {
    Path::new(pattern)
        .components()
        .take_while(|c| {
            !c.as_os_str()
                .to_string_lossy()
                .contains(|ch: char| matches!(ch, '*' | '?' | '['))
        })
        .collect()
}

/// Directory under `output` mirroring where `path` sits below `base`, so
/// inputs with the same stem in different directories do not collide.
fn output_dir(output: &Path, base: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(base)
        .ok()
        .and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map_or_else(|| output.to_path_buf(), |dir| output.join(dir))
}

/// Write each frame as `<stem>_NNN.png` and return the number written.
fn write_frames(
    animation: &Animation,
    output: &Path,
    stem: &str,
    mut on_written: impl FnMut(),
) -> Result<usize> {
    for (index, frame) in animation.iter().enumerate() {
        let path = output.join(format!("{stem}_{index:03}.png"));
        frame
            .to_image()
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        on_written();
    }
    Ok(animation.len())
}

fn cmd_decode(input: &Path, output: &Path, options: DecodeOptions) -> Result<()> {
    println!("Decoding: {} -> {}", input.display(), output.display());

    let start = Instant::now();
    let loader = load(input)?;
    let animation = loader
        .finish_with(options, |texture, first| {
            info!(
                width = texture.width,
                height = texture.height,
                format = %texture.format,
                stride = first.stride(),
                "first frame ready"
            );
        })
        .context("Failed to decode VTF")?;

    println!(
        "Decoded {} frame(s) of {}x{} in {:?}",
        animation.len(),
        animation.width(),
        animation.height(),
        start.elapsed()
    );

    fs::create_dir_all(output)?;

    let pb = progress_bar(animation.len())?;
    write_frames(&animation, output, "frame", || pb.inc(1))?;
    pb.finish_with_message("Done");

    println!("Conversion complete");

    Ok(())
}

fn cmd_batch(pattern: &str, output: &Path, options: DecodeOptions) -> Result<()> {
    let paths: Vec<PathBuf> = glob::glob(pattern)
        .context("Invalid glob pattern")?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping unreadable path: {e}");
                None
            }
        })
        .collect();

    println!("Decoding {} files...", paths.len());
    fs::create_dir_all(output)?;

    let base = glob_base(pattern);
    let start = Instant::now();
    let pb = progress_bar(paths.len())?;
    let failures = AtomicUsize::new(0);
    let frames_written = AtomicUsize::new(0);

    paths.par_iter().for_each(|path| {
        let result = fs::read(path)
            .context("Failed to read input file")
            .and_then(|data| {
                decode_with(&data, options, |_, _| {}).context("Failed to decode VTF")
            })
            .and_then(|animation| {
                let dir = output_dir(output, &base, path);
                fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
                write_frames(&animation, &dir, &file_stem(path), || {})
            });

        match result {
            Ok(written) => {
                frames_written.fetch_add(written, Ordering::Relaxed);
            }
            Err(e) => {
                failures.fetch_add(1, Ordering::Relaxed);
                pb.suspend(|| eprintln!("{}: {e:#}", path.display()));
            }
        }
        pb.inc(1);
    });

    pb.finish_with_message("Done");

    let failures = failures.into_inner();
    println!(
        "Wrote {} frames from {} files in {:?} ({} failed)",
        frames_written.into_inner(),
        paths.len() - failures,
        start.elapsed(),
        failures
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_base() {
        assert_eq!(glob_base("materials/**/*.vtf"), PathBuf::from("materials"));
        assert_eq!(glob_base("a/b/glow?.vtf"), PathBuf::from("a/b"));
        assert_eq!(glob_base("*.vtf"), PathBuf::new());
    }

    #[test]
    fn test_same_stem_in_different_directories() {
        let output = Path::new("out");
        let base = glob_base("materials/**/*.vtf");

        let a = output_dir(output, &base, Path::new("materials/a/glow.vtf"));
        let b = output_dir(output, &base, Path::new("materials/b/glow.vtf"));
        assert_eq!(a, PathBuf::from("out/a"));
        assert_eq!(b, PathBuf::from("out/b"));
        assert_ne!(a, b);

        assert_eq!(output_dir(output, &base, Path::new("materials/glow.vtf")), output);
        // Paths outside the base stay flat rather than escaping `output`.
        assert_eq!(output_dir(output, &base, Path::new("/abs/glow.vtf")), output);
    }
}
