//! gridkey CLI: generate, read and register 8x8 grid codes.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use gridkey::{CodeBuilder, CodeError, CodeReader, ImageFrames, Never, RecordStore};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "gridkey")]
#[command(about = "Generate and read fixed-layout 8x8 grid codes carrying a 64-bit key")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a key as a code image.
    Encode {
        /// Key to encode.
        #[arg(long)]
        key: u64,

        /// Output image path. The format follows the extension.
        #[arg(long)]
        out: PathBuf,

        /// Canvas side in pixels.
        #[arg(long, default_value_t = gridkey::DEFAULT_SIDE)]
        side: u32,

        /// Alignment bar thickness in pixels. 0 disables the bars.
        #[arg(long, default_value_t = gridkey::MARK_THICKNESS)]
        mark_thickness: u32,

        /// Print a text preview of the code.
        #[arg(long)]
        preview: bool,
    },

    /// Read a key from a sequence of images, treated as consecutive frames.
    Decode {
        /// Frames in the order they are fed to the reader.
        #[arg(long, required = true, num_args = 1..)]
        image: Vec<PathBuf>,

        /// Minimum region confidence. 0 accepts any located region.
        #[arg(long, default_value_t = 0.55)]
        threshold: f64,

        /// Give up after this many frames.
        #[arg(long)]
        max_frames: Option<usize>,

        /// Look the decoded key up in this record store.
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Generate a fresh key, register it and render its code.
    New {
        /// Record store file, created when missing.
        #[arg(long)]
        store: PathBuf,

        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        payload: String,

        /// Output image path. Defaults to `code_<name>.png`.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the record registered under a key.
    Lookup {
        #[arg(long)]
        store: PathBuf,

        #[arg(long)]
        key: u64,
    },

    /// Remove the record registered under a key.
    Delete {
        #[arg(long)]
        store: PathBuf,

        #[arg(long)]
        key: u64,
    },
}

fn main() -> CliResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Encode { key, out, side, mark_thickness, preview } => {
            run_encode(key, &out, side, mark_thickness, preview)
        }
        Commands::Decode { image, threshold, max_frames, store } => {
            run_decode(image, threshold, max_frames, store)
        }
        Commands::New { store, name, payload, out } => run_new(store, &name, &payload, out),
        Commands::Lookup { store, key } => run_lookup(store, key),
        Commands::Delete { store, key } => run_delete(store, key),
    }
}

fn run_encode(
    key: u64,
    out: &Path,
    side: u32,
    thickness: u32,
    preview: bool,
) -> CliResult<()> {
    let code = CodeBuilder::new(key).side(side).mark_thickness(thickness).build()?;
    code.save(out)?;
    log::info!("Wrote code for key {key} to {}", out.display());

    if preview {
        println!("{}", code.to_str());
    }
    Ok(())
}

fn run_decode(
    images: Vec<PathBuf>,
    threshold: f64,
    max_frames: Option<usize>,
    store: Option<PathBuf>,
) -> CliResult<()> {
    let mut reader = CodeReader::new();
    reader.threshold(threshold);
    if let Some(max) = max_frames {
        reader.max_frames(max);
    }

    let mut frames = ImageFrames::from_paths(images);
    let key = match reader.read(&mut frames, &Never) {
        Ok(Some(key)) => key,
        Ok(None) | Err(CodeError::EndOfStream) => {
            println!("no code found");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    println!("{key}");

    if let Some(path) = store {
        let store = RecordStore::open(path)?;
        match store.lookup(key)? {
            Some(rec) => println!("{}: {}", rec.name, rec.payload),
            None => log::warn!("Key {key} is not registered in {}", store.path().display()),
        }
    }
    Ok(())
}

fn run_new(store: PathBuf, name: &str, payload: &str, out: Option<PathBuf>) -> CliResult<()> {
    let mut store = RecordStore::open(store)?;
    let rec = store.create(name, payload, &mut rand::rng())?;

    let out = out.unwrap_or_else(|| PathBuf::from(format!("code_{name}.png")));
    let code = gridkey::encode(rec.key);
    code.save(&out)?;
    println!("{}", rec.key);
    log::info!("Wrote code for {:?} to {}", rec.name, out.display());
    Ok(())
}

fn run_lookup(store: PathBuf, key: u64) -> CliResult<()> {
    let store = RecordStore::open(store)?;
    let rec = store.lookup(key)?.ok_or(CodeError::RecordNotFound(key))?;
    println!("{}: {}", rec.name, rec.payload);
    Ok(())
}

fn run_delete(store: PathBuf, key: u64) -> CliResult<()> {
    let mut store = RecordStore::open(store)?;
    let rec = store.delete(key)?;
    println!("Deleted {:?}", rec.name);
    Ok(())
}
