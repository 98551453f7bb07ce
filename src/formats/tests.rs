use super::*;

use crate::utils;

//-----------------------------------------------------------------------------

fn read_all<R: BufRead>(reader: ChainReader<R>) -> Vec<(Chain, Vec<Alignment>)> {
    let mut result = Vec::new();
    for (i, record) in reader.enumerate() {
        assert!(record.is_ok(), "Failed to read chain {}: {}", i, record.unwrap_err());
        result.push(record.unwrap());
    }
    result
}

fn read_file(filename: &'static str, strip_chr: bool) -> Vec<(Chain, Vec<Alignment>)> {
    let chain_file = utils::get_test_data(filename);
    let input = utils::open_file(&chain_file);
    let input = match input {
        Ok(input) => input,
        Err(err) => panic!("Failed to open {}: {}", chain_file.display(), err),
    };
    let reader = ChainReader::new(input, Reference::GRCh37).strip_chr_prefix(strip_chr);
    read_all(reader)
}

fn read_error(input: &str) -> Error {
    let mut reader = ChainReader::new(input.as_bytes(), Reference::GRCh37);
    let result = reader.next();
    assert!(result.is_some(), "No result for input {:?}", input);
    let result = result.unwrap();
    assert!(result.is_err(), "Parsed invalid input {:?}", input);
    assert!(reader.next().is_none(), "Reader should stop after an error");
    result.unwrap_err()
}

fn block(source_offset: i64, target_offset: i64, size: i64) -> Alignment {
    Alignment { id: 0, chain_id: 0, source_offset, target_offset, size }
}

//-----------------------------------------------------------------------------

#[test]
fn example_file() {
    let chains = read_file("example.chain", false);
    assert_eq!(chains.len(), 3, "Wrong number of chains");

    let (chain, blocks) = &chains[0];
    let truth = Chain {
        id: 0,
        score: 20851231461,
        source_assembly: Reference::GRCh37,
        source_chromosome: String::from("chr1"),
        source_size: 249250621,
        source_strand: Strand::Forward,
        source_start: 10000,
        source_end: 267719,
        target_chromosome: String::from("chr1"),
        target_size: 248956422,
        target_strand: Strand::Forward,
        target_start: 10000,
        target_end: 297968,
    };
    assert_eq!(chain, &truth, "Wrong first chain");
    assert_eq!(blocks, &vec![block(0, 0, 167417), block(217417, 247666, 40302)], "Wrong blocks in the first chain");

    let (chain, blocks) = &chains[1];
    assert_eq!(chain.target_chromosome, "chr5", "Wrong target contig in the second chain");
    assert_eq!(chain.target_strand, Strand::Reverse, "Wrong target strand in the second chain");
    assert_eq!(blocks, &vec![block(0, 0, 40), block(50, 60, 50)], "Wrong blocks in the second chain");

    // The third chain has no id field and a block with no source gap.
    let (chain, blocks) = &chains[2];
    assert_eq!(chain.source_chromosome, "chrX", "Wrong source contig in the third chain");
    assert_eq!(
        blocks,
        &vec![block(0, 0, 100), block(120, 100, 200), block(320, 330, 160)],
        "Wrong blocks in the third chain"
    );
    let last = blocks.last().unwrap();
    assert_eq!(last.source_end(), chain.source_end - chain.source_start, "Blocks do not reach the end of the chain");
}

#[test]
fn compressed_file() {
    let plain = read_file("example.chain", false);
    let compressed = read_file("example.chain.gz", false);
    assert_eq!(compressed, plain, "Compressed file parsed differently");
}

#[test]
fn strip_chr() {
    let chains = read_file("example.chain", true);
    let names: Vec<(&str, &str)> = chains.iter().map(|(chain, _)| {
        (chain.source_chromosome.as_str(), chain.target_chromosome.as_str())
    }).collect();
    assert_eq!(names, vec![("1", "1"), ("1", "5"), ("X", "X")], "Wrong contig names");
}

#[test]
fn blocks_are_sorted_and_disjoint() {
    for (chain, blocks) in read_file("example.chain", false) {
        for pair in blocks.windows(2) {
            assert!(
                pair[0].source_end() <= pair[1].source_offset,
                "Overlapping blocks in chain on {}: {:?} and {:?}", chain.source_chromosome, pair[0], pair[1]
            );
            assert!(pair[0].target_offset + pair[0].size <= pair[1].target_offset, "Overlapping target intervals");
        }
    }
}

#[test]
fn empty_input() {
    let reader = ChainReader::new("".as_bytes(), Reference::GRCh37);
    assert!(read_all(reader).is_empty(), "Found chains in empty input");
    let reader = ChainReader::new("# comment\n\n\n".as_bytes(), Reference::GRCh37);
    assert!(read_all(reader).is_empty(), "Found chains in a file with only comments");
}

#[test]
fn source_assembly() {
    let input = "chain 10 1 1000 + 0 10 1 1000 + 0 10\n10\n";
    let reader = ChainReader::new(input.as_bytes(), Reference::NCBI36);
    let chains = read_all(reader);
    assert_eq!(chains.len(), 1, "Wrong number of chains");
    assert_eq!(chains[0].0.source_assembly, Reference::NCBI36, "Wrong source assembly");
}

//-----------------------------------------------------------------------------

#[test]
fn invalid_header() {
    let err = read_error("chain 10 1 1000 + 0 10 1 1000 + 0\n10\n");
    assert!(matches!(err, Error::Parse { line: 1, .. }), "Expected a parse error on line 1, got {}", err);

    let err = read_error("chain ten 1 1000 + 0 10 1 1000 + 0 10\n10\n");
    assert!(err.to_string().contains("score"), "Error should name the field: {}", err);

    let err = read_error("chain 10 1 1000 * 0 10 1 1000 + 0 10\n10\n");
    assert!(matches!(err, Error::Parse { line: 1, .. }), "Invalid strand was accepted: {}", err);

    let err = read_error("chain 10 1 1000 + 20 10 1 1000 + 0 10\n10\n");
    assert!(matches!(err, Error::Parse { line: 1, .. }), "Inverted interval was accepted: {}", err);

    let err = read_error("10 0 0\n");
    assert!(matches!(err, Error::Parse { line: 1, .. }), "Data line without a header was accepted: {}", err);
}

#[test]
fn invalid_blocks() {
    let err = read_error("chain 10 1 1000 + 0 20 1 1000 + 0 20\n10 0 0\n");
    assert!(matches!(err, Error::Parse { line: 2, .. }), "Missing final block was accepted: {}", err);

    let err = read_error("chain 10 1 1000 + 0 20 1 1000 + 0 20\n10 0\n10\n");
    assert!(matches!(err, Error::Parse { line: 2, .. }), "Data line with two fields was accepted: {}", err);

    let err = read_error("chain 10 1 1000 + 0 20 1 1000 + 0 20\n0 10 10\n10\n");
    assert!(matches!(err, Error::Parse { line: 2, .. }), "Empty block was accepted: {}", err);

    let err = read_error("chain 10 1 1000 + 0 20 1 1000 + 0 20\n10 -5 0\n15\n");
    assert!(matches!(err, Error::Parse { line: 2, .. }), "Negative gap was accepted: {}", err);

    let err = read_error("chain 10 1 1000 + 0 20 1 1000 + 0 20\n10 5 5\n\n5\n");
    assert!(matches!(err, Error::Parse { line: 3, .. }), "Empty line inside a chain was accepted: {}", err);
}

//-----------------------------------------------------------------------------
