use clap::{Parser, Subcommand};
use env_logger::Env;
use vblot::convert::convert_file;
use vblot::distances::calc_distances;
use vblot::finalize::finalize_distances;
use vblot::plot::{render, DEFAULT_PLOT_OUTPUT};
use vblot::{BlotError, EnzymeTable, PlotConfig, SizeCurve};

const INFO: &str = "\
vblot: virtual Southern blot fragment tools
usage: vblot [--help] <subcommand>

Subcommands:

  calc-distances:      distances from integration sites to the closest enzyme cut sites.
  finalize-distances:  light and heavy fragment sizes from distances, directions and lengths.
  plot:                plot enzyme fragment sizes along a virtual blot.
  convert:             rewrite _H/_L fragment-size columns as blot positions.

";

#[derive(Parser)]
#[clap(name = "vblot")]
#[clap(about = INFO)]
struct Cli {
    /// Increase log verbosity (-d debug, -dd trace); RUST_LOG overrides it
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    debug: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate distances from every integration site to the closest upstream and
    /// downstream cut site of every enzyme.
    ///
    /// Both inputs are headerless CSVs: enzyme cut sites as `enzyme,chromosome,position`
    /// and integration sites as `site,chromosome,position`. Malformed rows are skipped.
    ///
    /// Example:
    ///
    ///  $ vblot calc-distances --enzyme-file enzyme_sites.csv \
    ///      --integration-file integration_sites.csv --output distances.csv
    CalcDistances {
        /// CSV file of enzyme cut sites
        #[arg(long, required = true)]
        enzyme_file: String,
        /// CSV file of integration sites
        #[arg(long, required = true)]
        integration_file: String,
        /// the output CSV file path
        #[arg(long, default_value = "closest_enzyme_distances.csv")]
        output: String,
    },
    /// Finalize distances into fragment sizes by adding each enzyme's light (L) and
    /// heavy (H) fragment lengths in the direction given for each site.
    FinalizeDistances {
        /// CSV file of fragment lengths (Name, L, H)
        #[arg(long, required = true)]
        lengths_file: String,
        /// CSV file of directions (IntegrationSite, <enzyme>_L, <enzyme>_H = up/down)
        #[arg(long, required = true)]
        directions_file: String,
        /// CSV file of distances, as written by calc-distances
        #[arg(long, required = true)]
        distances_file: String,
        /// the output CSV file path
        #[arg(long, default_value = "final_distances_with_lengths.csv")]
        output: String,
    },
    /// Plot enzyme fragment sizes along a virtual Southern blot.
    ///
    /// The enzyme file needs IntegrationSite, Position and Chromosome columns; every
    /// other column is taken as an enzyme's fragment sizes. The Y axis is labeled with
    /// the reference sizes.
    Plot {
        /// CSV file of fragment sizes per integration site and enzyme
        #[arg(long, required = true)]
        enzyme_file: String,
        /// CSV file of the Size, Position reference curve
        #[arg(long, required = true)]
        size_position_file: String,
        /// the output image path (.png or .svg)
        #[arg(long)]
        plot_output: Option<String>,
        /// figure width in inches
        #[arg(long, default_value_t = 10.0)]
        width: f64,
        /// figure height in inches
        #[arg(long, default_value_t = 6.0)]
        height: f64,
        /// figure resolution in dots per inch
        #[arg(long, default_value_t = 100)]
        dpi: u32,
        /// figure title
        #[arg(long, default_value = "Virtual Southern blot")]
        title: String,
    },
    /// Convert fragment-size columns (names ending in _H or _L) to blot positions.
    Convert {
        /// CSV file with fragment-size columns
        #[arg(long, required = true)]
        enzyme_file: String,
        /// CSV file of the Size, Position reference curve
        #[arg(long, required = true)]
        size_position_file: String,
        /// the output CSV file path
        #[arg(long, required = true)]
        converted_output: String,
    },
}

fn plot_blot(
    enzyme_file: &str,
    size_position_file: &str,
    output: Option<&str>,
    config: &PlotConfig,
) -> Result<(), BlotError> {
    let curve = SizeCurve::from_csv(size_position_file)?;
    let table = EnzymeTable::from_csv(enzyme_file)?;
    let long = table.to_long(&curve)?;

    let output = output.unwrap_or(DEFAULT_PLOT_OUTPUT);
    render(&long, &table.enzymes(), &curve, config, output)?;
    log::info!("Plot saved to {}", output);
    Ok(())
}

fn convert_sizes(
    enzyme_file: &str,
    size_position_file: &str,
    converted_output: &str,
) -> Result<(), BlotError> {
    let curve = SizeCurve::from_csv(size_position_file)?;
    convert_file(enzyme_file, &curve, converted_output)
}

fn run(cli: Cli) -> Result<(), BlotError> {
    match cli.command {
        Some(Commands::CalcDistances {
            enzyme_file,
            integration_file,
            output,
        }) => calc_distances(&enzyme_file, &integration_file, &output),
        Some(Commands::FinalizeDistances {
            lengths_file,
            directions_file,
            distances_file,
            output,
        }) => finalize_distances(&lengths_file, &directions_file, &distances_file, &output),
        Some(Commands::Plot {
            enzyme_file,
            size_position_file,
            plot_output,
            width,
            height,
            dpi,
            title,
        }) => {
            let config = PlotConfig {
                width_in: width,
                height_in: height,
                dpi,
                title,
            };
            plot_blot(
                &enzyme_file,
                &size_position_file,
                plot_output.as_deref(),
                &config,
            )
        }
        Some(Commands::Convert {
            enzyme_file,
            size_position_file,
            converted_output,
        }) => convert_sizes(&enzyme_file, &size_position_file, &converted_output),
        None => {
            println!("{}\n", INFO);
            std::process::exit(1);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let level = match cli.debug {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
