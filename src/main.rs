use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use glitchify::{
    filter::Filter,
    io::{load_buffer, save_buffer},
    GlitchConfig, Pipeline,
};
use log::{error, info, LevelFilter};
use rand::{random, rngs::StdRng, SeedableRng};
use rayon::prelude::*;
use simplelog::{ColorChoice, TermLogger, TerminalMode};

#[derive(Parser)]
#[command(name = "glitchify", about = "Apply procedural glitch effects to images")]
struct Args {
    /// Input images; glob patterns are expanded
    #[arg(short = 'i', long, value_name = "FILE", required_unless_present = "print_config", num_args = 1..)]
    input: Vec<String>,

    /// Output file (single input only)
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Directory for batch output, written as <stem>-glitch.png
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Seed for the effect choices; random when omitted
    #[arg(short = 's', long)]
    seed: Option<u64>,

    /// TOML file overriding effect tunables
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Sharpen and raise contrast before glitching
    #[arg(long)]
    enhance: bool,

    /// Sharpen amount used by --enhance (0-1)
    #[arg(long, value_name = "AMOUNT")]
    sharpen: Option<f64>,

    /// Contrast percent used by --enhance
    #[arg(long, value_name = "PERCENT")]
    contrast: Option<f64>,

    /// Add film grain after glitching
    #[arg(long)]
    grain: bool,

    /// Cel-shade the image before glitching
    #[arg(long)]
    cel_shade: bool,

    /// The amount of worker threads for batch processing
    #[arg(short = 't', long, value_name = "NUM", default_value_t = 4)]
    threads: usize,

    /// Print the effective config as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// More log output (repeatable)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;
    Ok(())
}

fn resolve_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for pattern in patterns {
        let matches: Vec<PathBuf> = glob::glob(pattern)
            .with_context(|| format!("invalid input pattern '{pattern}'"))?
            .filter_map(|entry| entry.ok())
            .collect();

        if matches.is_empty() {
            // Not a pattern that matched anything; keep it so the load error names it.
            inputs.push(PathBuf::from(pattern));
        } else {
            inputs.extend(matches);
        }
    }
    Ok(inputs)
}

fn output_path(input: &Path, output: Option<&Path>, output_dir: Option<&Path>) -> PathBuf {
    if let Some(output) = output {
        return output.to_path_buf();
    }

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let name = format!("{stem}-glitch.png");

    match output_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

struct Job<'a> {
    config: &'a GlitchConfig,
    pipeline: &'a Pipeline,
    enhance: bool,
    grain: bool,
    cel_shade: bool,
}

impl Job<'_> {
    fn run(&self, input: &Path, output: &Path, seed: u64) -> Result<Vec<&'static str>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut buffer =
            load_buffer(input).with_context(|| format!("failed to load {}", input.display()))?;

        if self.enhance {
            buffer = self.config.enhance.apply(buffer);
        }

        if self.cel_shade {
            self.config.cel_shade.transform_buffer(&mut buffer, &mut rng);
        }

        let (mut buffer, applied) = self.pipeline.apply_traced(buffer, &mut rng);

        if self.grain {
            self.config.grain.transform_buffer(&mut buffer, &mut rng);
        }

        save_buffer(buffer, output)
            .with_context(|| format!("failed to write {}", output.display()))?;
        Ok(applied)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let mut config = match &args.config {
        Some(path) => GlitchConfig::load(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => GlitchConfig::default(),
    };
    if let Some(amount) = args.sharpen {
        config.enhance.sharpen_amount = amount;
    }
    if let Some(contrast) = args.contrast {
        config.enhance.contrast = contrast;
    }

    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let pipeline = Pipeline::new(&config)?;
    let inputs = resolve_inputs(&args.input)?;
    if inputs.len() > 1 && args.output.is_some() {
        bail!(
            "{} inputs given but --output takes a single file; use --output-dir",
            inputs.len()
        );
    }
    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let seed = args.seed.unwrap_or_else(random);
    info!("seed {seed}");

    let job = Job {
        config: &config,
        pipeline: &pipeline,
        enhance: args.enhance,
        grain: args.grain,
        cel_shade: args.cel_shade,
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build()?;

    let failures: usize = pool.install(|| {
        inputs
            .par_iter()
            .enumerate()
            .map(|(i, input)| {
                let output = output_path(input, args.output.as_deref(), args.output_dir.as_deref());
                match job.run(input, &output, seed.wrapping_add(i as u64)) {
                    Ok(applied) => {
                        info!("{} -> {} [{}]", input.display(), output.display(), applied.join(", "));
                        0usize
                    }
                    Err(e) => {
                        error!("{e:#}");
                        1
                    }
                }
            })
            .sum()
    });

    println!("Glitched {} of {} images (seed {seed})", inputs.len() - failures, inputs.len());

    if failures > 0 {
        return Err(anyhow!("{failures} images failed"));
    }
    Ok(())
}
