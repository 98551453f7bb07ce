//! Support for reading liftover chain files.
//!
//! ### UCSC chain format
//!
//! A chain file describes pairwise alignments between two assemblies.
//! See [the format description](https://genome.ucsc.edu/goldenPath/help/chain.html) for details.
//! Each chain starts with a header line:
//!
//! ```text
//! chain score tName tSize tStrand tStart tEnd qName qSize qStrand qStart qEnd id
//! ```
//!
//! The header is followed by data lines `size dt dq`, where `size` is the length of an ungapped block and `dt` / `dq` are the gaps after it in the source (`t`) and target (`q`) assemblies.
//! The last data line of a chain only contains `size`.
//! Chains are separated by empty lines, and lines starting with `#` are comments.
//!
//! [`ChainReader`] iterates over the chains in a file, turning each into a [`Chain`] and its [`Alignment`] blocks.
//! Block offsets are accumulated from the gaps, so that they are relative to the start of the chain.
//! Use [`crate::utils::open_file`] to read gzip-compressed files.

use crate::error::{Error, Result};
use crate::{Alignment, Chain, Reference, Strand};

use std::io::BufRead;
use std::str::FromStr;

use log::warn;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// An iterator over the chains in a UCSC chain file.
///
/// Each item is a [`Chain`] anchored to the given source assembly, together with its blocks in order.
/// The identifiers of the chain and the blocks are 0, as identifiers are assigned by the database.
/// The iterator stops after the first error.
///
/// # Examples
///
/// ```
/// use genobase::{Reference, Strand};
/// use genobase::formats::ChainReader;
///
/// let input = "chain 1000 chr1 249250621 + 300000 300100 chr5 181538259 - 1000 1110 2\n40 10 20\n50\n";
/// let mut reader = ChainReader::new(input.as_bytes(), Reference::GRCh37).strip_chr_prefix(true);
/// let (chain, blocks) = reader.next().unwrap().unwrap();
/// assert_eq!(chain.source_chromosome, "1");
/// assert_eq!(chain.target_chromosome, "5");
/// assert_eq!(chain.target_strand, Strand::Reverse);
/// assert_eq!(blocks.len(), 2);
/// assert_eq!((blocks[1].source_offset, blocks[1].target_offset, blocks[1].size), (50, 60, 50));
/// assert!(reader.next().is_none());
/// ```
pub struct ChainReader<R> {
    reader: R,
    source_assembly: Reference,
    strip_chr: bool,
    buf: String,
    line_num: usize,
    failed: bool,
}

impl<R: BufRead> ChainReader<R> {
    /// Returns a reader for chains from the given source assembly.
    pub fn new(reader: R, source_assembly: Reference) -> Self {
        ChainReader {
            reader,
            source_assembly,
            strip_chr: false,
            buf: String::new(),
            line_num: 0,
            failed: false,
        }
    }

    /// Strips the UCSC `chr` prefix from contig names (e.g. `chr1` becomes `1`).
    pub fn strip_chr_prefix(mut self, strip: bool) -> Self {
        self.strip_chr = strip;
        self
    }

    /// Returns the number of lines read so far.
    pub fn line_num(&self) -> usize {
        self.line_num
    }

    // Reads the next line into the buffer. Returns `false` at the end of the input.
    fn next_line(&mut self) -> Result<bool> {
        self.buf.clear();
        let len = self.reader.read_line(&mut self.buf)?;
        if len == 0 {
            return Ok(false);
        }
        self.line_num += 1;
        Ok(true)
    }

    fn contig_name(&self, name: &str) -> String {
        if self.strip_chr {
            name.strip_prefix("chr").unwrap_or(name).to_string()
        } else {
            name.to_string()
        }
    }

    fn parse_header(&self) -> Result<Chain> {
        let line = self.line_num;
        let fields: Vec<&str> = self.buf.split_whitespace().collect();
        if fields[0] != "chain" {
            return Err(parse_error(line, format!("Expected a chain header, found {}", fields[0])));
        }
        if fields.len() != 12 && fields.len() != 13 {
            return Err(parse_error(line, format!("Expected 12 or 13 header fields, found {}", fields.len())));
        }

        let chain = Chain {
            id: 0,
            score: parse_field(fields[1], "score", line)?,
            source_assembly: self.source_assembly,
            source_chromosome: self.contig_name(fields[2]),
            source_size: parse_field(fields[3], "tSize", line)?,
            source_strand: parse_strand(fields[4], line)?,
            source_start: parse_field(fields[5], "tStart", line)?,
            source_end: parse_field(fields[6], "tEnd", line)?,
            target_chromosome: self.contig_name(fields[7]),
            target_size: parse_field(fields[8], "qSize", line)?,
            target_strand: parse_strand(fields[9], line)?,
            target_start: parse_field(fields[10], "qStart", line)?,
            target_end: parse_field(fields[11], "qEnd", line)?,
        };
        chain.validate().map_err(|err| parse_error(line, err.to_string()))?;
        Ok(chain)
    }

    // Reads the data lines of the current chain, ending with the final block.
    fn parse_blocks(&mut self) -> Result<(Vec<Alignment>, i64, i64)> {
        let mut blocks: Vec<Alignment> = Vec::new();
        let mut source_offset: i64 = 0;
        let mut target_offset: i64 = 0;
        loop {
            if !self.next_line()? {
                return Err(parse_error(self.line_num, String::from("Unexpected end of input inside a chain")));
            }
            let line = self.line_num;
            let fields: Vec<&str> = self.buf.split_whitespace().collect();
            if fields.len() != 1 && fields.len() != 3 {
                return Err(parse_error(line, format!("Expected 1 or 3 fields in a data line, found {}", fields.len())));
            }

            let size: i64 = parse_field(fields[0], "size", line)?;
            if size <= 0 {
                return Err(parse_error(line, format!("Block size must be positive, found {}", size)));
            }
            blocks.push(Alignment {
                id: 0,
                chain_id: 0,
                source_offset,
                target_offset,
                size,
            });
            source_offset += size;
            target_offset += size;
            if fields.len() == 1 {
                return Ok((blocks, source_offset, target_offset));
            }

            let source_gap: i64 = parse_field(fields[1], "dt", line)?;
            let target_gap: i64 = parse_field(fields[2], "dq", line)?;
            if source_gap < 0 || target_gap < 0 {
                return Err(parse_error(line, format!("Gaps must not be negative, found {} and {}", source_gap, target_gap)));
            }
            source_offset += source_gap;
            target_offset += target_gap;
        }
    }

    fn read_chain(&mut self) -> Result<Option<(Chain, Vec<Alignment>)>> {
        // Skip empty lines and comments until the next header.
        loop {
            if !self.next_line()? {
                return Ok(None);
            }
            let line = self.buf.trim();
            if !line.is_empty() && !line.starts_with('#') {
                break;
            }
        }

        let header_line = self.line_num;
        let chain = self.parse_header()?;
        let (blocks, source_len, target_len) = self.parse_blocks()?;
        if source_len != chain.source_end - chain.source_start || target_len != chain.target_end - chain.target_start {
            warn!(
                "Chain on line {} ({}:{}-{}) has blocks spanning {} / {} bases, but the header declares {} / {}",
                header_line, chain.source_chromosome, chain.source_start, chain.source_end,
                source_len, target_len,
                chain.source_end - chain.source_start, chain.target_end - chain.target_start
            );
        }

        Ok(Some((chain, blocks)))
    }
}

impl<R: BufRead> Iterator for ChainReader<R> {
    type Item = Result<(Chain, Vec<Alignment>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self.read_chain().transpose();
        if matches!(result, Some(Err(_))) {
            self.failed = true;
        }
        result
    }
}

//-----------------------------------------------------------------------------

fn parse_error(line: usize, message: String) -> Error {
    Error::Parse { line, message }
}

fn parse_field<T: FromStr>(field: &str, name: &str, line: usize) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    field.parse::<T>().map_err(|err| parse_error(line, format!("Invalid {} {}: {}", name, field, err)))
}

fn parse_strand(field: &str, line: usize) -> Result<Strand> {
    field.parse::<Strand>().map_err(|err| parse_error(line, err.to_string()))
}

//-----------------------------------------------------------------------------
