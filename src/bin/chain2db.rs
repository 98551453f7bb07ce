use std::time::Instant;
use std::{env, fs, process};

use genobase::{Cancellation, Genobase, GenobaseParams, Reference, utils};
use genobase::formats::ChainReader;
use getopts::Options;
use log::info;

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new()?;
    init_log(config.verbosity)?;

    // Check if the database already exists.
    if utils::file_exists(&config.db_file) {
        if config.overwrite {
            info!("Overwriting database {}", config.db_file);
            fs::remove_file(&config.db_file).map_err(|x| x.to_string())?;
        } else {
            return Err(format!("Database {} already exists", config.db_file));
        }
    }

    // Import the chains.
    let input = utils::open_file(&config.chain_file).map_err(|x| format!("{}: {}", config.chain_file, x))?;
    let reader = ChainReader::new(input, config.reference).strip_chr_prefix(config.strip_chr);
    let params = GenobaseParams {
        read_only: false,
        no_sync: config.no_sync,
    };
    let mut database = Genobase::open(&config.db_file, &params).map_err(|x| x.to_string())?;
    let stats = database.import_chains(reader, &Cancellation::new()).map_err(|x| x.to_string())?;

    // Statistics.
    eprintln!(
        "Imported {} chains with {} alignment blocks from {} to {}",
        stats.chains, stats.alignments, config.reference, config.db_file
    );
    if let Some(size) = database.file_size() {
        eprintln!("Database size: {}", size);
    }

    let end_time = Instant::now();
    let seconds = end_time.duration_since(start_time).as_secs_f64();
    eprintln!("Used {:.3} seconds", seconds);

    Ok(())
}

fn init_log(verbosity: usize) -> Result<(), String> {
    stderrlog::new()
        .module(module_path!())
        .module("genobase")
        .quiet(false)
        .verbosity(verbosity)
        .timestamp(stderrlog::Timestamp::Off)
        .init()
        .map_err(|x| x.to_string())
}

//-----------------------------------------------------------------------------

struct Config {
    pub chain_file: String,
    pub db_file: String,
    pub reference: Reference,
    pub strip_chr: bool,
    pub no_sync: bool,
    pub overwrite: bool,
    pub verbosity: usize,
}

impl Config {
    pub fn new() -> Result<Config, String> {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt("o", "output", "output file name (default: <input>.db)", "FILE");
        opts.optopt("r", "reference", "source assembly of the chains (default: GRCh37)", "STR");
        opts.optflag("", "strip-chr", "strip the chr prefix from contig names");
        opts.optflag("", "no-sync", "do not flush writes to disk (faster but unsafe)");
        opts.optflag("", "overwrite", "overwrite the database file if it exists");
        opts.optflagmulti("v", "verbose", "print more progress information (repeat for debug output)");
        let matches = opts.parse(&args[1..]).map_err(|x| x.to_string())?;

        let header = format!("Usage: {} [options] input.chain[.gz]", program);
        if matches.opt_present("h") {
            eprint!("{}", opts.usage(&header));
            process::exit(0);
        }

        let chain_file = if let Some(s) = matches.free.first() {
            s.clone()
        } else {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        };
        let db_file = matches.opt_str("o").unwrap_or_else(|| format!("{}.db", chain_file));
        let reference = match matches.opt_str("r") {
            Some(s) => s.parse::<Reference>().map_err(|x| format!("--reference: {}", x))?,
            None => Reference::GRCh37,
        };

        Ok(Config {
            chain_file,
            db_file,
            reference,
            strip_chr: matches.opt_present("strip-chr"),
            no_sync: matches.opt_present("no-sync"),
            overwrite: matches.opt_present("overwrite"),
            verbosity: 1 + matches.opt_count("v"),
        })
    }
}

//-----------------------------------------------------------------------------
