use clap::{Parser, Subcommand};
use geophoto::types::UpdateRequest;
use geophoto::{config, naming, output, scan, update, writer};
use log::LevelFilter;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "geophoto")]
#[command(about = "Read and write GPS geotags in photo files")]
#[command(long_about = "\
Read and write GPS geotags in photo files

Coordinates are read from the EXIF GPS block regardless of which key
convention wrote it, and written back as a fresh GPS block. JPEG files keep
their image data untouched; other formats are converted to JPEG.

Examples:

  geophoto extract holiday/ --json
  geophoto set-gps beach.png --lat 48.8584 --lon 2.2945
  geophoto apply request.json -o tagged.jpg

Run 'geophoto gen-config' to generate a documented geophoto.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILE_NAME, global = true)]
    config: PathBuf,

    /// Log debug details to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print metadata and GPS coordinates of images
    Extract {
        /// Image files or directories (walked recursively)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Write GPS coordinates into an image, producing a new JPEG
    SetGps {
        input: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Output path (default: gps_updated_<name>.jpg beside the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a JSON update request ({image, latitude, longitude, filename})
    Apply {
        /// Request file, or '-' for stdin
        request: PathBuf,
        /// Output path (default: the download name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a stock geophoto.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config;

    match cli.command {
        Command::Extract { paths, json } => {
            let config = config::load_config(&config_path)?;
            init_thread_pool(&config.processing);
            let images = scan::collect_images(&paths, &config.upload)?;
            let results = scan::extract_all(&images);
            if json {
                let values: Vec<serde_json::Value> = results
                    .iter()
                    .map(|(path, result)| match result {
                        Ok(r) => output::extraction_json(path, r),
                        Err(e) => serde_json::json!({
                            "file": path.display().to_string(),
                            "error": e.to_string(),
                        }),
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&values)?);
            } else {
                for (i, (path, result)) in results.iter().enumerate() {
                    match result {
                        Ok(r) => output::print_extraction(i + 1, path, r),
                        Err(e) => {
                            for line in output::format_read_failure(i + 1, path, e) {
                                println!("{}", line);
                            }
                        }
                    }
                }
            }
        }
        Command::SetGps {
            input,
            lat,
            lon,
            output: out,
        } => {
            let config = config::load_config(&config_path)?;
            let out = out.unwrap_or_else(|| naming::default_output_path(&input));
            let options = writer::WriteOptions::from_config(&config.carrier);
            let tagged = writer::write_gps_file(&input, &out, lat, lon, &options)?;
            output::print_written(&input, &out, lat, lon, tagged.converted);
        }
        Command::Apply {
            request,
            output: out,
        } => {
            let config = config::load_config(&config_path)?;
            let request: UpdateRequest = serde_json::from_str(&read_request(&request)?)?;
            match update::apply(&request, &config) {
                Ok(response) => {
                    let out = out.unwrap_or_else(|| PathBuf::from(&response.download_name));
                    std::fs::write(&out, &response.bytes)?;
                    output::print_written(
                        Path::new(&request.filename),
                        &out,
                        request.latitude,
                        request.longitude,
                        response.converted,
                    );
                }
                Err(e) => {
                    println!("{}", serde_json::to_string(&e.to_failure())?);
                    std::process::exit(if e.status() >= 500 { 2 } else { 1 });
                }
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `warn` by default, `debug` with `-v`; `RUST_LOG` wins over both.
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; config can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn read_request(path: &Path) -> std::io::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
    }
}
