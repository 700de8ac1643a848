//! pdfpress CLI tool
//!
//! Command-line access to the same transforms the server exposes:
//! watermarking, rotation, page numbering, and image packing.

use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use pdfpress::layout::Anchor;
use pdfpress::numbering::NumberStyle;
use pdfpress::pdf::{
    add_page_numbers, add_watermark, count_pages, images_to_pdf, rotate_pages, Overlay,
    PackOptions, PageNumberOptions, Rgb, RotateOptions, RotationScope, WatermarkOptions,
};
use pdfpress::range::PageSelection;

/// pdfpress - stamp watermarks, page numbers, and rotations onto PDFs
#[derive(Parser)]
#[command(name = "pdfpress")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Diagonal draft stamp across every page
    pdfpress watermark input.pdf -o stamped.pdf --text DRAFT --rotation 45 --opacity 30

    # Rotate pages 2-5 a quarter turn
    pdfpress rotate input.pdf -o rotated.pdf --angle 90 --pages 2-5

    # Roman numerals bottom-center
    pdfpress number input.pdf -o numbered.pdf --style I --position bottom-center

    # Pack photos into an A4 PDF
    pdfpress pack -o album.pdf photo1.jpg photo2.png")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stamp a text or image watermark onto a PDF
    Watermark {
        /// Input PDF file
        input: PathBuf,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Watermark text (mutually exclusive with --image)
        #[arg(long)]
        text: Option<String>,

        /// Watermark image file (mutually exclusive with --text)
        #[arg(long)]
        image: Option<PathBuf>,

        /// Font size in points for text watermarks
        #[arg(long, default_value_t = 16.0)]
        font_size: f64,

        /// Fill color as #RRGGBB
        #[arg(long, default_value = "#000000")]
        color: String,

        /// Opacity in percent (0-100)
        #[arg(long, default_value_t = 50.0)]
        opacity: f64,

        /// Position: center, top-left, top-right, bottom-left, bottom-right
        #[arg(long, default_value = "center")]
        position: String,

        /// Rotation in degrees about the watermark center
        #[arg(long, default_value_t = 0.0)]
        rotation: f64,

        /// Pages to stamp, e.g. "1-3,5" (default: all)
        #[arg(long, default_value = "")]
        pages: String,
    },

    /// Rotate pages by adjusting their rotation metadata
    Rotate {
        /// Input PDF file
        input: PathBuf,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Rotation angle in degrees (multiple of 90)
        #[arg(long, default_value_t = 90)]
        angle: i32,

        /// Pages to rotate, e.g. "2-4" (default: all pages)
        #[arg(long)]
        pages: Option<String>,
    },

    /// Draw page numbers in the page body
    Number {
        /// Input PDF file
        input: PathBuf,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Numbering style: 1, i, I, a, or A
        #[arg(long, default_value = "1")]
        style: String,

        /// Position: bottom-right, bottom-center, bottom-left, top-right, top-center, top-left
        #[arg(long, default_value = "bottom-right")]
        position: String,

        /// Font size in points
        #[arg(long, default_value_t = 10.0)]
        font_size: f64,

        /// Fill color as #RRGGBB
        #[arg(long, default_value = "#000000")]
        color: String,

        /// Pages to number, e.g. "1-3,5" (default: all)
        #[arg(long, default_value = "")]
        pages: String,
    },

    /// Pack images into a PDF, one page per image
    Pack {
        /// Input image files (.jpg, .jpeg, .png), in page order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Page size: a4, letter, legal, or fit
        #[arg(long, default_value = "a4")]
        page_size: String,

        /// Orientation: auto, portrait, or landscape
        #[arg(long, default_value = "auto")]
        orientation: String,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Watermark {
            input, output, text, image, font_size, color, opacity, position, rotation, pages,
        } => cmd_watermark(
            input, output, text, image, font_size, color, opacity, position, rotation, pages,
        ),
        Commands::Rotate {
            input, output, angle, pages,
        } => cmd_rotate(input, output, angle, pages),
        Commands::Number {
            input, output, style, position, font_size, color, pages,
        } => cmd_number(input, output, style, position, font_size, color, pages),
        Commands::Pack {
            inputs, output, page_size, orientation,
        } => cmd_pack(inputs, output, page_size, orientation),
        Commands::Info { input } => cmd_info(input),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_watermark(
    input: PathBuf,
    output: PathBuf,
    text: Option<String>,
    image: Option<PathBuf>,
    font_size: f64,
    color: String,
    opacity: f64,
    position: String,
    rotation: f64,
    pages: String,
) -> anyhow::Result<()> {
    let overlay = match (text, image) {
        (Some(text), None) => Overlay::Text {
            text,
            font_size,
            color: Rgb::parse_hex(&color)?,
            opacity: (opacity / 100.0).clamp(0.0, 1.0),
        },
        (None, Some(image_path)) => Overlay::Image {
            data: std::fs::read(&image_path)
                .with_context(|| format!("reading {}", image_path.display()))?,
            opacity: (opacity / 100.0).clamp(0.0, 1.0),
        },
        _ => bail!("provide exactly one of --text or --image"),
    };

    let options = WatermarkOptions {
        overlay,
        anchor: position.parse::<Anchor>()?,
        rotation,
        selection: PageSelection::parse(&pages)?,
    };

    let data = std::fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
    let stamped = add_watermark(&data, &options)?;
    std::fs::write(&output, stamped)
        .with_context(|| format!("writing {}", output.display()))?;

    println!("Wrote {}", output.display());
    Ok(())
}

fn cmd_rotate(
    input: PathBuf,
    output: PathBuf,
    angle: i32,
    pages: Option<String>,
) -> anyhow::Result<()> {
    let (scope, selection) = match pages {
        Some(range) => (RotationScope::Specific, PageSelection::parse(&range)?),
        None => (RotationScope::All, PageSelection::default()),
    };

    let options = RotateOptions {
        angle,
        scope,
        selection,
    };

    let data = std::fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
    let rotated = rotate_pages(&data, &options)?;
    std::fs::write(&output, rotated)
        .with_context(|| format!("writing {}", output.display()))?;

    println!("Wrote {}", output.display());
    Ok(())
}

fn cmd_number(
    input: PathBuf,
    output: PathBuf,
    style: String,
    position: String,
    font_size: f64,
    color: String,
    pages: String,
) -> anyhow::Result<()> {
    let options = PageNumberOptions {
        style: style.parse::<NumberStyle>()?,
        anchor: position.parse::<Anchor>()?,
        font_size,
        color: Rgb::parse_hex(&color)?,
        selection: PageSelection::parse(&pages)?,
    };

    let data = std::fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
    let numbered = add_page_numbers(&data, &options)?;
    std::fs::write(&output, numbered)
        .with_context(|| format!("writing {}", output.display()))?;

    println!("Wrote {}", output.display());
    Ok(())
}

fn cmd_pack(
    inputs: Vec<PathBuf>,
    output: PathBuf,
    page_size: String,
    orientation: String,
) -> anyhow::Result<()> {
    let mut images = Vec::with_capacity(inputs.len());
    for path in &inputs {
        images.push(std::fs::read(path).with_context(|| format!("reading {}", path.display()))?);
    }

    let options = PackOptions {
        page_size: page_size.parse()?,
        orientation: orientation.parse()?,
    };

    let packed = images_to_pdf(&images, &options)?;
    std::fs::write(&output, packed)
        .with_context(|| format!("writing {}", output.display()))?;

    println!("Wrote {} ({} pages)", output.display(), inputs.len());
    Ok(())
}

fn cmd_info(input: PathBuf) -> anyhow::Result<()> {
    let data = std::fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
    let doc = lopdf::Document::load_mem(&data)
        .with_context(|| format!("parsing {}", input.display()))?;

    println!("File:  {}", input.display());
    println!("Pages: {}", count_pages(&doc)?);
    Ok(())
}
