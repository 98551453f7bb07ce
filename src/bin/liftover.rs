use std::io::{self, Write};
use std::{env, process};

use genobase::{Cancellation, Genobase, GenobaseParams, Reference};
use getopts::Options;
use log::debug;

//-----------------------------------------------------------------------------

fn main() -> Result<(), String> {
    // Parse arguments.
    let config = Config::new()?;
    init_log(config.verbosity)?;

    // Open the database.
    let params = GenobaseParams {
        read_only: true,
        no_sync: false,
    };
    let database = Genobase::open(&config.db_file, &params).map_err(|x| x.to_string())?;
    debug!("Database version: {}", database.version());

    // Translate the positions.
    let cancel = Cancellation::new();
    let mut output = io::stdout().lock();
    for (chromosome, position) in config.queries.iter() {
        let source = format!("{}:{}", chromosome, position);
        match database.lift_position(config.reference, chromosome, *position, &cancel) {
            Ok(lifted) => {
                debug!("{} lifted with chain {} (score {}, strand {})", source, lifted.chain_id, lifted.score, lifted.strand);
                writeln!(output, "{}\t{}:{}", source, lifted.chromosome, lifted.position).map_err(|x| x.to_string())?;
            },
            Err(err) if err.is_not_found() => {
                debug!("{}", err);
                writeln!(output, "{}\tunmapped", source).map_err(|x| x.to_string())?;
            },
            Err(err) => return Err(err.to_string()),
        }
    }

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
    pub db_file: String,
    pub reference: Reference,
    pub queries: Vec<(String, i64)>,
    pub verbosity: usize,
}

impl Config {
    pub fn new() -> Result<Config, String> {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt("r", "reference", "source assembly of the positions (default: GRCh37)", "STR");
        opts.optflagmulti("v", "verbose", "print more information (repeat for debug output)");
        let matches = opts.parse(&args[1..]).map_err(|x| x.to_string())?;

        let header = format!("Usage: {} [options] genobase.db chrom:pos [chrom:pos ...]", program);
        if matches.opt_present("h") {
            eprint!("{}", opts.usage(&header));
            process::exit(0);
        }
        if matches.free.len() < 2 {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        }

        let db_file = matches.free[0].clone();
        let reference = match matches.opt_str("r") {
            Some(s) => s.parse::<Reference>().map_err(|x| format!("--reference: {}", x))?,
            None => Reference::GRCh37,
        };
        let mut queries: Vec<(String, i64)> = Vec::new();
        for query in matches.free[1..].iter() {
            queries.push(parse_query(query)?);
        }

        Ok(Config {
            db_file,
            reference,
            queries,
            verbosity: 1 + matches.opt_count("v"),
        })
    }
}

// Parses `chrom:pos` into a contig name and a 0-based position.
fn parse_query(query: &str) -> Result<(String, i64), String> {
    let (chromosome, position) = query.rsplit_once(':').ok_or(format!("Invalid query {} (expected chrom:pos)", query))?;
    let position = position.replace(',', "").parse::<i64>().map_err(|x| format!("Invalid position in {}: {}", query, x))?;
    if chromosome.is_empty() || position < 0 {
        return Err(format!("Invalid query {} (expected chrom:pos)", query));
    }
    Ok((chromosome.to_string(), position))
}

//-----------------------------------------------------------------------------
