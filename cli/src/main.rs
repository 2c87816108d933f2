//! texforge CLI - LaTeX reconstruction from extracted page fragments

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use texforge::{EmitOptions, FragmentStream, Template, Texforge};

#[derive(Parser)]
#[command(name = "texforge")]
#[command(version)]
#[command(about = "Reconstruct LaTeX documents from extracted page fragments", long_about = None)]
struct Cli {
    /// Input fragment-stream JSON file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a fragment stream to a full output set (document, assets, manifest)
    Convert {
        /// Input fragment-stream JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Document class template
        #[arg(long, value_enum, default_value = "article")]
        template: TemplateArg,

        /// Emit \newpage between source pages
        #[arg(long)]
        page_breaks: bool,

        /// Skip image extraction and figure environments
        #[arg(long)]
        no_images: bool,
    },

    /// Convert a fragment stream to LaTeX on stdout or a file
    #[command(alias = "tex")]
    Latex {
        /// Input fragment-stream JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Document class template
        #[arg(long, value_enum, default_value = "article")]
        template: TemplateArg,

        /// Heading font-size ratio over the modal body size
        #[arg(long, default_value = "1.15")]
        heading_ratio: f32,

        /// Emit \newpage between source pages
        #[arg(long)]
        page_breaks: bool,

        /// Skip image extraction and figure environments
        #[arg(long)]
        no_images: bool,
    },

    /// Show inferred metadata and conversion statistics
    Info {
        /// Input fragment-stream JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Extract deduplicated image assets only
    Extract {
        /// Input fragment-stream JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum TemplateArg {
    /// article document class (default)
    Article,
    /// report document class
    Report,
    /// book document class
    Book,
}

impl From<TemplateArg> for Template {
    fn from(arg: TemplateArg) -> Self {
        match arg {
            TemplateArg::Article => Template::Article,
            TemplateArg::Report => Template::Report,
            TemplateArg::Book => Template::Book,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            template,
            page_breaks,
            no_images,
        }) => cmd_convert(&input, output.as_deref(), template, page_breaks, no_images),
        Some(Commands::Latex {
            input,
            output,
            template,
            heading_ratio,
            page_breaks,
            no_images,
        }) => cmd_latex(
            &input,
            output.as_deref(),
            template,
            heading_ratio,
            page_breaks,
            no_images,
        ),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Extract { input, output }) => cmd_extract(&input, output.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(
                    &input,
                    cli.output.as_deref(),
                    TemplateArg::Article,
                    false,
                    false,
                )
            } else {
                println!("{}", "Usage: texforge <FILE> [OUTPUT]".yellow());
                println!("       texforge --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn read_stream(input: &Path) -> Result<FragmentStream, Box<dyn std::error::Error>> {
    let json = fs::read_to_string(input)?;
    let stream: FragmentStream = serde_json::from_str(&json)?;
    Ok(stream)
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    template: TemplateArg,
    page_breaks: bool,
    no_images: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_output", stem))
    });

    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    pb.set_message("Reading fragment stream...");
    let stream = read_stream(input)?;
    pb.inc(1);

    pb.set_message("Converting...");
    let forge = Texforge::new()
        .template(template.into())
        .page_breaks(page_breaks)
        .images(!no_images);
    let result = forge.convert(&stream)?;
    pb.inc(1);

    pb.set_message("Writing output...");
    fs::write(output_dir.join("document.tex"), &result.latex)?;

    let assets_dir = output_dir.join("assets");
    fs::create_dir_all(&assets_dir)?;
    for asset in &result.assets {
        fs::write(assets_dir.join(asset.suggested_filename()), asset.to_ppm())?;
    }

    let manifest = serde_json::to_string_pretty(&result.manifest)?;
    fs::write(output_dir.join("manifest.json"), &manifest)?;
    let metadata = serde_json::to_string_pretty(&result.metadata)?;
    fs::write(output_dir.join("metadata.json"), &metadata)?;
    pb.inc(1);

    pb.finish_with_message("Done!");

    if result.manifest.truncated {
        println!(
            "{} some images could not be decoded; placeholders emitted",
            "Warning:".yellow().bold()
        );
    }

    println!("\n{}", "Output files:".green().bold());
    println!("  {} document.tex", "├─".dimmed());
    println!("  {} manifest.json", "├─".dimmed());
    println!("  {} metadata.json", "├─".dimmed());
    println!("  {} assets/", "└─".dimmed());

    Ok(())
}

fn cmd_latex(
    input: &Path,
    output: Option<&Path>,
    template: TemplateArg,
    heading_ratio: f32,
    page_breaks: bool,
    no_images: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let stream = read_stream(input)?;

    let options = EmitOptions::new()
        .with_template(template.into())
        .with_heading_ratio(heading_ratio)
        .with_page_breaks(page_breaks)
        .with_images(!no_images);
    let result = Texforge::with_options(options).convert(&stream)?;

    if let Some(path) = output {
        fs::write(path, &result.latex)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", result.latex);
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let stream = read_stream(input)?;
    let result = Texforge::new().convert(&stream)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    if let Some(title) = result.metadata.title.as_ref() {
        println!(
            "{}: {} ({:.0}%)",
            "Title".bold(),
            title,
            result.metadata.title.confidence * 100.0
        );
    }
    if let Some(authors) = result.metadata.authors.as_ref() {
        println!("{}: {}", "Authors".bold(), authors.join(", "));
    }
    if let Some(date) = result.metadata.date.as_ref() {
        println!("{}: {}", "Date".bold(), date);
    }
    if result.metadata.abstract_text.as_ref().is_some() {
        println!("{}: present", "Abstract".bold());
    }

    println!();
    println!("{}", "Conversion Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let stats = &result.stats;
    println!("{}: {}", "Pages".bold(), stats.pages);
    println!("{}: {}", "Fragments".bold(), stats.fragments);
    println!("{}: {}", "Headings".bold(), stats.headings);
    println!("{}: {}", "Paragraphs".bold(), stats.paragraphs);
    println!("{}: {}", "Math groups".bold(), stats.math_groups);
    println!("{}: {}", "Inline math spans".bold(), stats.inline_math_spans);
    println!("{}: {}", "List items".bold(), stats.list_items);
    println!("{}: {}", "Figures".bold(), stats.figures);
    println!("{}: {}", "Duplicate images".bold(), stats.duplicate_images);
    println!("{}: {}", "Image failures".bold(), stats.image_failures);

    Ok(())
}

fn cmd_extract(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let stream = read_stream(input)?;
    let result = Texforge::new().convert(&stream)?;

    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let mut count = 0;
    for asset in &result.assets {
        let filename = asset.suggested_filename();
        fs::write(output_dir.join(&filename), asset.to_ppm())?;
        println!("{} {}", "Extracted".green(), filename);
        count += 1;
    }

    println!("\n{} {} images extracted", "Done!".green().bold(), count);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "texforge".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("LaTeX document reconstruction tool");
    println!();
    println!("License: MIT");
}
