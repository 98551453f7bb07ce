use crate::{Alignment, Cancellation, Chain, Genobase, GenobaseParams, Reference, Strand};
use crate::formats::ChainReader;
use crate::utils;

use std::path::{Path, PathBuf};

use tempfile::TempDir;

//-----------------------------------------------------------------------------

// Database utilities.

pub(crate) fn open_memory_db() -> Genobase {
    let db = Genobase::open_in_memory();
    assert!(db.is_ok(), "Failed to open in-memory database: {}", db.unwrap_err());
    db.unwrap()
}

pub(crate) fn open_db(filename: &Path, params: &GenobaseParams) -> Genobase {
    let db = Genobase::open(filename, params);
    assert!(db.is_ok(), "Failed to open database {}: {}", filename.display(), db.unwrap_err());
    db.unwrap()
}

// Returns the directory, which deletes the database when dropped, and the database file.
pub(crate) fn temp_db_file() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir();
    assert!(dir.is_ok(), "Failed to create a temporary directory: {}", dir.unwrap_err());
    let dir = dir.unwrap();
    let db_file = dir.path().join("genobase.db");
    assert!(!utils::file_exists(&db_file), "Database {} already exists", db_file.display());
    (dir, db_file)
}

// Imports the given test file into the database with `chr` prefixes stripped.
pub(crate) fn import_test_chains(db: &mut Genobase, filename: &'static str) {
    let chain_file = utils::get_test_data(filename);
    let input = utils::open_file(&chain_file);
    let input = match input {
        Ok(input) => input,
        Err(err) => panic!("Failed to open {}: {}", chain_file.display(), err),
    };
    let reader = ChainReader::new(input, Reference::GRCh37).strip_chr_prefix(true);
    let result = db.import_chains(reader, &Cancellation::new());
    assert!(result.is_ok(), "Failed to import {}: {}", chain_file.display(), result.unwrap_err());
}

//-----------------------------------------------------------------------------

// The first chain in `example.chain`, with two blocks separated by a gap.

pub(crate) fn example_chain() -> Chain {
    Chain {
        id: 0,
        score: 20851231461,
        source_assembly: Reference::GRCh37,
        source_chromosome: String::from("1"),
        source_size: 249250621,
        source_strand: Strand::Forward,
        source_start: 10000,
        source_end: 267719,
        target_chromosome: String::from("1"),
        target_size: 248956422,
        target_strand: Strand::Forward,
        target_start: 10000,
        target_end: 297968,
    }
}

pub(crate) fn example_blocks() -> Vec<Alignment> {
    vec![
        Alignment { id: 0, chain_id: 0, source_offset: 0, target_offset: 0, size: 167417 },
        Alignment { id: 0, chain_id: 0, source_offset: 217417, target_offset: 247666, size: 40302 },
    ]
}

// Stores the chain and its blocks, returning the chain identifier.
pub(crate) fn store_chain_with_blocks(db: &mut Genobase, chain: &Chain, blocks: &[Alignment]) -> i64 {
    let cancel = Cancellation::new();
    let chain_id = db.store_chain(chain.source_assembly, chain, &cancel);
    assert!(chain_id.is_ok(), "Failed to store chain: {}", chain_id.unwrap_err());
    let chain_id = chain_id.unwrap();
    let result = db.store_alignments(chain_id, blocks, &cancel);
    assert!(result.is_ok(), "Failed to store alignments for chain {}: {}", chain_id, result.unwrap_err());
    chain_id
}

//-----------------------------------------------------------------------------
