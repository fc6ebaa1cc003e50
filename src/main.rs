use clap::Parser;
use log::{error, info};
use rayon::ThreadPoolBuilder;
use std::io;
use std::num::NonZeroUsize;
use varstitch::commands::stitch::run_stitch;
use varstitch::stitcher::StitcherOptions;

/// Common options shared between all commands
#[derive(Parser, Debug)]
struct CommonOpts {
    /// Number of threads for parallel processing.
    #[clap(short = 't', long, value_parser, default_value_t = NonZeroUsize::new(4).unwrap())]
    num_threads: NonZeroUsize,

    /// Verbosity level (0 = error, 1 = info, 2 = debug)
    #[clap(short, long, default_value = "0")]
    verbose: u8,
}

/// Command-line tool for stitching overlapping paired-end reads.
#[derive(Parser, Debug)]
#[command(author, version, about, disable_help_subcommand = true)]
enum Args {
    /// Stitch overlapping mates of a BAM file into single reads
    Stitch {
        #[clap(flatten)]
        common: CommonOpts,

        /// Path to the input BAM file
        #[clap(short = 'i', long, value_parser)]
        input: String,

        /// Path to the output BAM file (not coordinate sorted)
        #[clap(short = 'o', long, value_parser)]
        output: String,

        /// Minimum quality for a base to win a disagreement in the overlap
        #[clap(short = 'q', long, value_parser, default_value_t = 20)]
        min_base_call_quality: u8,

        /// Only stitch pairs whose XC tags carry the same stitched CIGAR
        #[clap(short = 'x', long, action)]
        use_xc_stitcher: bool,

        /// When two disagreeing bases both pass the quality threshold, keep the
        /// higher-quality one instead of masking the position with N
        #[clap(long, action)]
        keep_confident_disagreements: bool,

        /// Number of read pairs handed to the thread pool at once
        #[clap(short = 'b', long, value_parser, default_value_t = 10000)]
        batch_size: usize,
    },
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    match args {
        Args::Stitch {
            common,
            input,
            output,
            min_base_call_quality,
            use_xc_stitcher,
            keep_confident_disagreements,
            batch_size,
        } => {
            initialize(&common)?;

            let options = StitcherOptions {
                min_base_call_quality,
                require_xc_tag: use_xc_stitcher,
                mask_confident_disagreements: !keep_confident_disagreements,
            };
            info!("Stitching {} into {} with {:?}", input, output, options);

            if let Err(e) = run_stitch(&input, &output, options, batch_size) {
                error!("{}", e);
                return Err(e);
            }
        }
    }

    Ok(())
}

/// Initialize logging and the thread pool
fn initialize(common: &CommonOpts) -> io::Result<()> {
    // Initialize logger based on verbosity
    env_logger::Builder::new()
        .filter_level(match common.verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    // Configure thread pool
    ThreadPoolBuilder::new()
        .num_threads(common.num_threads.into())
        .build_global()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to build thread pool: {}", e),
            )
        })
}
