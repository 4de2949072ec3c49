//! levelgen
//!
//! Generate one level (or a bare map) and print it as ASCII.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{LevelFilter, Log, Metadata, Record};
use serde::de::DeserializeOwned;
use strum::IntoEnumIterator;

use lg_core::generator::{
    CastleGenerator, CaveGenerator, CryptGenerator, DungeonGenerator, LevelGenerator,
    MountainGenerator, NestGenerator,
};
use lg_core::level::Level;
use lg_core::mapgen::{MapGenConf, MapStyle, create_map_by_name};
use lg_core::options::from_json;
use lg_rng::GameRng;

/// What to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    Dungeon,
    Cave,
    Castle,
    Crypt,
    Mountain,
    Nest,
    /// A bare map of the style given with --style
    Map,
}

/// Procedural level generator
#[derive(Parser, Debug)]
#[command(name = "levelgen")]
#[command(author, version, about = "Generate a roguelike level and print it", long_about = None)]
struct Args {
    /// Generator to run
    #[arg(value_enum)]
    kind: Kind,

    /// Map style for `map`
    #[arg(short = 's', long = "style", default_value = "digger")]
    style: String,

    /// Level width
    #[arg(short = 'c', long = "cols", default_value_t = 80)]
    cols: i32,

    /// Level height
    #[arg(short = 'r', long = "rows", default_value_t = 40)]
    rows: i32,

    /// RNG seed; random when omitted
    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Generator options as a JSON document
    #[arg(short = 'o', long = "options")]
    options: Option<String>,

    /// List the map styles and exit
    #[arg(long = "list-styles")]
    list_styles: bool,

    /// More logging, repeat for more
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Minimal logger writing to stderr
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbose: u8) -> Result<()> {
    let filter = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    log::set_logger(&LOGGER).map_err(|e| anyhow::anyhow!("logger: {}", e))?;
    log::set_max_level(filter);
    Ok(())
}

fn options<T: DeserializeOwned + Default>(json: Option<&str>) -> Result<T> {
    match json {
        Some(doc) => from_json(doc).context("invalid --options"),
        None => Ok(T::default()),
    }
}

fn run<G: LevelGenerator<Output = Level>>(
    generator: &mut G,
    args: &Args,
    rng: &mut GameRng,
) -> Result<Vec<Level>> {
    let opts: G::Options = options(args.options.as_deref())?;
    let level = generator
        .create(args.cols, args.rows, &opts, rng)
        .context("level generation failed")?;
    Ok(vec![level])
}

fn print_level(level: &Level) {
    println!("{}", level.map().to_ascii());
    let extras = level.extras();
    if let (Some(s), Some(e)) = (extras.start_point, extras.end_point) {
        println!(
            "start {:?} end {:?} path {} actors {} items {}",
            s,
            e,
            extras.critical_path.len(),
            level.actors().len(),
            level.items().len()
        );
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    if args.list_styles {
        for style in MapStyle::iter() {
            println!("{}", style);
        }
        return Ok(());
    }

    let mut rng = match args.seed {
        Some(seed) => GameRng::new(seed),
        None => GameRng::from_entropy(),
    };
    log::info!("seed {}", rng.seed());

    let levels = match args.kind {
        Kind::Dungeon => run(&mut DungeonGenerator::default(), &args, &mut rng)?,
        Kind::Cave => run(&mut CaveGenerator::default(), &args, &mut rng)?,
        Kind::Castle => run(&mut CastleGenerator::default(), &args, &mut rng)?,
        Kind::Crypt => run(&mut CryptGenerator::new(), &args, &mut rng)?,
        Kind::Nest => run(&mut NestGenerator::new(), &args, &mut rng)?,
        Kind::Mountain => {
            let opts = options(args.options.as_deref())?;
            let levels = MountainGenerator::default()
                .create(args.cols, args.rows, &opts, &mut rng)
                .context("mountain generation failed")?;
            vec![levels.face, levels.summit]
        }
        Kind::Map => {
            let conf: MapGenConf = options(args.options.as_deref())?;
            let obj = create_map_by_name(&args.style, args.cols, args.rows, &conf, &mut rng)
                .with_context(|| format!("cannot build a '{}' map", args.style))?;
            println!("{}", obj.map.to_ascii());
            return Ok(());
        }
    };

    for (i, level) in levels.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_level(level);
    }
    Ok(())
}
