//! Genobase: an SQLite database of human genomic reference data.

use crate::{Alignment, Allele, AncestryGroup, Chain, Chromosome, LiftedPosition, Reference, Variant};
use crate::cancel::Cancellation;
use crate::error::{Error, Result};
use crate::utils;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::{debug, info};
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row};


//-----------------------------------------------------------------------------

/// Connection options for [`Genobase::open`].
///
/// Both options are deployment-time choices that apply to the whole connection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenobaseParams {
    /// Open the database read-only.
    ///
    /// Any number of read-only connections can read the database concurrently.
    /// The database must already exist.
    pub read_only: bool,

    /// Do not flush the database to disk after each write.
    ///
    /// This disables the rollback journal and synchronous writes.
    /// It is unsafe, as a crash can corrupt the database, but it speeds up bulk imports significantly.
    /// Ignored for read-only connections.
    pub no_sync: bool,
}

/// Statistics from [`Genobase::import_chains`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Number of chains inserted.
    pub chains: usize,
    /// Number of alignment blocks inserted.
    pub alignments: usize,
}

//-----------------------------------------------------------------------------

/// A database connection to a genobase database.
///
/// The database stores variants (table `variant`), population allele frequencies (table `allele`), and liftover chains between reference assemblies (tables `liftover_chain` and `liftover_alignment`).
/// Records are materialized for each call and never cached.
///
/// Every operation takes a [`Cancellation`] token.
/// The token is checked before the operation starts and while its SQL statements run.
/// Batched writes run in a single transaction, so a failed or cancelled batch leaves no rows behind.
///
/// The structure owns a single connection.
/// In multi-threaded applications, each thread should have its own connection.
///
/// # Examples
///
/// ```
/// use genobase::{Alignment, Cancellation, Chain, Genobase, Reference, Strand};
///
/// let mut db = Genobase::open_in_memory().unwrap();
/// let cancel = Cancellation::new();
///
/// // A GRCh37 to GRCh38 chain with two blocks.
/// let chain = Chain {
///     id: 0,
///     score: 20851231461,
///     source_assembly: Reference::GRCh37,
///     source_chromosome: String::from("1"),
///     source_size: 249250621,
///     source_strand: Strand::Forward,
///     source_start: 10000,
///     source_end: 267719,
///     target_chromosome: String::from("1"),
///     target_size: 248956422,
///     target_strand: Strand::Forward,
///     target_start: 10000,
///     target_end: 297968,
/// };
/// let chain_id = db.store_chain(Reference::GRCh37, &chain, &cancel).unwrap();
/// let blocks = [
///     Alignment { source_offset: 0, target_offset: 0, size: 167417, ..Default::default() },
///     Alignment { source_offset: 217417, target_offset: 247666, size: 40302, ..Default::default() },
/// ];
/// db.store_alignments(chain_id, &blocks, &cancel).unwrap();
///
/// // Translate a position step by step.
/// let position = 227480;
/// let found = db.get_chain(Reference::GRCh37, "1", position, &cancel).unwrap();
/// assert_eq!(found.id, chain_id);
/// let block = db.get_alignment(chain_id, found.source_offset(position), &cancel).unwrap();
/// assert_eq!(block.source_offset, 217417);
///
/// // Or in one call.
/// let lifted = db.lift_position(Reference::GRCh37, "1", position, &cancel).unwrap();
/// assert_eq!(lifted.position, 10000 + 247666 + 63);
/// ```
#[derive(Debug)]
pub struct Genobase {
    connection: Connection,
    version: String,
    read_only: bool,
}

/// Opening the database.
impl Genobase {
    // Key for database version.
    const KEY_VERSION: &'static str = "version";

    /// Current database version.
    pub const VERSION: &'static str = "Genobase v0.1.0";

    // The progress handler runs after this many SQLite virtual machine instructions.
    const PROGRESS_OPS: i32 = 1000;

    /// Opens a connection to the database in the given file.
    ///
    /// A writable connection creates the file and the tables if they do not exist.
    /// A read-only connection requires an existing database.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the database has the wrong version.
    /// Passes through any database errors.
    pub fn open<P: AsRef<Path>>(filename: P, params: &GenobaseParams) -> Result<Self> {
        let filename = filename.as_ref();
        let connection = if params.read_only {
            let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
            Connection::open_with_flags(filename, flags)
        } else {
            Connection::open(filename)
        };
        let connection = connection.map_err(|err| Error::storage("open", filename.display(), err))?;
        info!("Opened database {}{}", filename.display(), if params.read_only { " (read-only)" } else { "" });
        Self::initialize(connection, params)
    }

    /// Opens a new database in memory.
    pub fn open_in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory().map_err(|err| Error::storage("open", ":memory:", err))?;
        Self::initialize(connection, &GenobaseParams::default())
    }

    fn initialize(connection: Connection, params: &GenobaseParams) -> Result<Self> {
        let setup = |err| Error::storage("open", "connection settings", err);
        connection.pragma_update(None, "foreign_keys", true).map_err(setup)?;
        if params.no_sync && !params.read_only {
            connection.pragma_update_and_check(None, "journal_mode", "OFF", |row| row.get::<_, String>(0)).map_err(setup)?;
            connection.pragma_update(None, "synchronous", "OFF").map_err(setup)?;
        }
        if !params.read_only {
            Self::check_schema_owner(&connection)?;
            Self::create_tables(&connection)?;
        }

        let version: Option<String> = connection.query_row(
            "SELECT value FROM Tags WHERE key = ?1",
            (Self::KEY_VERSION,),
            |row| row.get(0)
        ).optional().map_err(|err| Error::storage("open", Self::KEY_VERSION, err))?;
        let version = version.ok_or_else(|| Error::Validation(String::from("The database has no version tag")))?;
        if version != Self::VERSION {
            return Err(Error::Validation(format!("Unsupported database version: {} (expected {})", version, Self::VERSION)));
        }

        Ok(Genobase {
            connection,
            version,
            read_only: params.read_only,
        })
    }

    // Refuses to add tables to a non-empty database without a version tag.
    fn check_schema_owner(connection: &Connection) -> Result<()> {
        let (objects, tags): (usize, usize) = connection.query_row(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE type = 'table' AND name = 'Tags') FROM sqlite_master",
            (),
            |row| Ok((row.get(0)?, row.get(1)?))
        ).map_err(|err| Error::storage("open", "schema", err))?;
        if objects > 0 && tags == 0 {
            return Err(Error::Validation(String::from("The file is an SQLite database of another application")));
        }
        Ok(())
    }

    fn create_tables(connection: &Connection) -> Result<()> {
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS Tags (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            ) STRICT;

            CREATE TABLE IF NOT EXISTS variant (
                id INTEGER PRIMARY KEY,
                chromosome TEXT NOT NULL,
                position INTEGER NOT NULL,
                class TEXT NOT NULL
            ) STRICT;

            CREATE INDEX IF NOT EXISTS VariantPosition
                ON variant(chromosome, position);

            CREATE TABLE IF NOT EXISTS allele (
                id INTEGER NOT NULL,
                ref TEXT NOT NULL,
                alt TEXT NOT NULL,
                ancestry TEXT NOT NULL,
                frequency REAL NOT NULL,
                PRIMARY KEY (id, ref, alt, ancestry)
            ) STRICT;

            CREATE TABLE IF NOT EXISTS liftover_chain (
                id INTEGER PRIMARY KEY,
                score INTEGER NOT NULL,
                ref TEXT NOT NULL,
                ref_name TEXT NOT NULL,
                ref_size INTEGER NOT NULL,
                ref_strand TEXT NOT NULL,
                ref_start INTEGER NOT NULL,
                ref_end INTEGER NOT NULL CHECK (ref_start <= ref_end),
                query_name TEXT NOT NULL,
                query_size INTEGER NOT NULL,
                query_strand TEXT NOT NULL,
                query_start INTEGER NOT NULL,
                query_end INTEGER NOT NULL
            ) STRICT;

            CREATE INDEX IF NOT EXISTS ChainInterval
                ON liftover_chain(ref, ref_name, ref_start, ref_end);

            CREATE TABLE IF NOT EXISTS liftover_alignment (
                id INTEGER PRIMARY KEY,
                chain_id INTEGER NOT NULL REFERENCES liftover_chain(id) ON DELETE CASCADE,
                ref_offset INTEGER NOT NULL,
                query_offset INTEGER NOT NULL,
                size INTEGER NOT NULL CHECK (size > 0),
                UNIQUE (chain_id, ref_offset)
            ) STRICT;"
        ).map_err(|err| Error::storage("create_tables", "schema", err))?;

        connection.execute(
            "INSERT OR IGNORE INTO Tags(key, value) VALUES (?1, ?2)",
            (Self::KEY_VERSION, Self::VERSION)
        ).map_err(|err| Error::storage("create_tables", Self::KEY_VERSION, err))?;
        Ok(())
    }

    /// Returns the filename of the database, or [`None`] for an in-memory database.
    pub fn filename(&self) -> Option<&str> {
        self.connection.path().filter(|path| !path.is_empty())
    }

    /// Returns the size of the database file in a human-readable format.
    pub fn file_size(&self) -> Option<String> {
        let filename = self.filename()?;
        utils::file_size(filename)
    }

    /// Returns the version of the database.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns `true` if the connection is read-only.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    // Installs the token as the progress handler, or removes the handler.
    fn set_interrupt(connection: &Connection, cancel: Option<&Cancellation>) {
        match cancel {
            Some(cancel) => {
                let token = cancel.clone();
                connection.progress_handler(Self::PROGRESS_OPS, Some(move || token.is_cancelled()));
            },
            None => connection.progress_handler(0, None::<fn() -> bool>),
        }
    }

    // Runs a read operation that SQLite interrupts when the token is cancelled.
    fn interruptible<T>(
        &self, cancel: &Cancellation, operation: &'static str,
        f: impl FnOnce(&Connection) -> Result<T>
    ) -> Result<T> {
        cancel.check(operation)?;
        Self::set_interrupt(&self.connection, Some(cancel));
        let result = f(&self.connection);
        Self::set_interrupt(&self.connection, None);
        result
    }

    // Runs a write operation that SQLite interrupts when the token is cancelled.
    fn interruptible_mut<T>(
        &mut self, cancel: &Cancellation, operation: &'static str,
        f: impl FnOnce(&mut Connection) -> Result<T>
    ) -> Result<T> {
        cancel.check(operation)?;
        Self::set_interrupt(&self.connection, Some(cancel));
        let result = f(&mut self.connection);
        Self::set_interrupt(&self.connection, None);
        result
    }

    // Executes a `SELECT COUNT(*)` query.
    fn count_rows(&self, table: &'static str, sql: &str, cancel: &Cancellation) -> Result<usize> {
        self.interruptible(cancel, "count_rows", |connection| {
            connection.query_row(sql, (), |row| row.get::<_, usize>(0))
                .map_err(|err| Error::storage("count_rows", table, err))
        })
    }
}

//-----------------------------------------------------------------------------

/// Liftover chains and alignment blocks.
impl Genobase {
    fn row_to_chain(row: &Row) -> rusqlite::Result<Chain> {
        Ok(Chain {
            id: row.get(0)?,
            score: row.get(1)?,
            source_assembly: row.get(2)?,
            source_chromosome: row.get(3)?,
            source_size: row.get(4)?,
            source_strand: row.get(5)?,
            source_start: row.get(6)?,
            source_end: row.get(7)?,
            target_chromosome: row.get(8)?,
            target_size: row.get(9)?,
            target_strand: row.get(10)?,
            target_start: row.get(11)?,
            target_end: row.get(12)?,
        })
    }

    fn row_to_alignment(row: &Row) -> rusqlite::Result<Alignment> {
        Ok(Alignment {
            id: row.get(0)?,
            chain_id: row.get(1)?,
            source_offset: row.get(2)?,
            target_offset: row.get(3)?,
            size: row.get(4)?,
        })
    }

    /// Stores a new chain anchored to the given source assembly and returns its identifier.
    ///
    /// The identifier and the source assembly in `chain` are ignored.
    /// Duplicate chains are allowed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if either interval of the chain has its start after its end.
    /// Passes through any database errors.
    pub fn store_chain(&mut self, from: Reference, chain: &Chain, cancel: &Cancellation) -> Result<i64> {
        chain.validate()?;
        self.interruptible_mut(cancel, "store_chain", |connection| {
            Self::insert_chain(connection, from, chain)
        })
    }

    /// Stores the alignment blocks of the given chain in a single transaction.
    ///
    /// All blocks are attributed to `chain_id`, and their own identifiers are ignored.
    /// The blocks should be sorted by source offset and must not overlap.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if any insertion fails, for example because a block is empty, two blocks start at the same offset, or the chain does not exist.
    /// Returns [`Error::Cancelled`] if the token is cancelled before the transaction commits.
    /// In both cases, none of the blocks are stored.
    pub fn store_alignments(&mut self, chain_id: i64, alignments: &[Alignment], cancel: &Cancellation) -> Result<()> {
        let key = || format!("chain {}", chain_id);
        self.interruptible_mut(cancel, "store_alignments", |connection| {
            let transaction = connection.transaction().map_err(|err| Error::storage("store_alignments", key(), err))?;
            Self::insert_alignments(&transaction, chain_id, alignments, cancel)?;
            transaction.commit().map_err(|err| Error::storage("store_alignments", key(), err))?;
            debug!("Stored {} alignment blocks for chain {}", alignments.len(), chain_id);
            Ok(())
        })
    }

    // Inserts the chain without validation and returns its identifier.
    fn insert_chain(connection: &Connection, from: Reference, chain: &Chain) -> Result<i64> {
        let key = || format!("{}:{}:{}-{}", from, chain.source_chromosome, chain.source_start, chain.source_end);
        let mut insert = connection.prepare_cached(
            "INSERT INTO liftover_chain(
                score, ref, ref_name, ref_size, ref_strand, ref_start, ref_end,
                query_name, query_size, query_strand, query_start, query_end
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
        ).map_err(|err| Error::storage("store_chain", key(), err))?;
        insert.execute((
            chain.score, from,
            &chain.source_chromosome, chain.source_size, chain.source_strand, chain.source_start, chain.source_end,
            &chain.target_chromosome, chain.target_size, chain.target_strand, chain.target_start, chain.target_end,
        )).map_err(|err| Error::storage("store_chain", key(), err))?;
        Ok(connection.last_insert_rowid())
    }

    // Inserts the blocks one at a time, checking the token before each.
    // The caller owns the transaction.
    fn insert_alignments(connection: &Connection, chain_id: i64, alignments: &[Alignment], cancel: &Cancellation) -> Result<()> {
        let key = || format!("chain {}", chain_id);
        let mut insert = connection.prepare_cached(
            "INSERT INTO liftover_alignment(chain_id, ref_offset, query_offset, size)
            VALUES (?1, ?2, ?3, ?4)"
        ).map_err(|err| Error::storage("store_alignments", key(), err))?;
        for alignment in alignments {
            cancel.check("store_alignments")?;
            insert.execute((chain_id, alignment.source_offset, alignment.target_offset, alignment.size))
                .map_err(|err| Error::storage("store_alignments", key(), err))?;
        }
        Ok(())
    }

    /// Returns the chain from the given assembly that covers the position on the chromosome.
    ///
    /// The chain must be on `chromosome` in the source assembly, and `position` must be within its source interval, with both ends inclusive.
    /// If several chains cover the position, the one with the highest score wins.
    /// Chains with equal scores are ordered by identifier, so the first inserted one wins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no chain covers the position.
    /// Passes through any database errors.
    pub fn get_chain(&self, from: Reference, chromosome: &str, position: i64, cancel: &Cancellation) -> Result<Chain> {
        let key = || format!("{}:{}:{}", from, chromosome, position);
        let chain = self.interruptible(cancel, "get_chain", |connection| {
            let mut statement = connection.prepare_cached(
                "SELECT id, score, ref, ref_name, ref_size, ref_strand, ref_start, ref_end,
                    query_name, query_size, query_strand, query_start, query_end
                FROM liftover_chain
                WHERE ref = ?1 AND ref_name = ?2 AND ref_start <= ?3 AND ref_end >= ?3
                ORDER BY score DESC, id ASC
                LIMIT 1"
            ).map_err(|err| Error::storage("get_chain", key(), err))?;
            statement.query_row((from, chromosome, position), Self::row_to_chain)
                .optional()
                .map_err(|err| Error::storage("get_chain", key(), err))
        })?;
        let chain = chain.ok_or_else(|| Error::not_found("chain", key()))?;
        debug!("Position {} is covered by chain {} (score {})", key(), chain.id, chain.score);
        Ok(chain)
    }

    /// Returns the first alignment block of the chain that ends at or after the given source offset.
    ///
    /// The offset is relative to the start of the chain in the source assembly (see [`Chain::source_offset`]).
    /// The result is the block `B` with the smallest source offset such that `B.source_offset + B.size >= source_offset`.
    /// This is not a containment query: an offset in an unaligned gap resolves to the block after the gap, and an offset before the first block resolves to the first block.
    /// Use [`Alignment::locate`] to tell the cases apart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the offset is past the end of the last block.
    /// Passes through any database errors.
    pub fn get_alignment(&self, chain_id: i64, source_offset: i64, cancel: &Cancellation) -> Result<Alignment> {
        let key = || format!("chain {} offset {}", chain_id, source_offset);
        let alignment = self.interruptible(cancel, "get_alignment", |connection| {
            let mut statement = connection.prepare_cached(
                "SELECT id, chain_id, ref_offset, query_offset, size
                FROM liftover_alignment
                WHERE chain_id = ?1 AND ref_offset + size >= ?2
                ORDER BY ref_offset ASC
                LIMIT 1"
            ).map_err(|err| Error::storage("get_alignment", key(), err))?;
            statement.query_row((chain_id, source_offset), Self::row_to_alignment)
                .optional()
                .map_err(|err| Error::storage("get_alignment", key(), err))
        })?;
        alignment.ok_or_else(|| Error::not_found("alignment", key()))
    }

    /// Translates a position from the given assembly to the target assembly of the best covering chain.
    ///
    /// This combines [`Self::get_chain`], [`Self::get_alignment`], and [`Chain::lift`].
    /// The block lookup uses the offset after the position, so that a block starting right where the previous one ends is found.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no chain covers the position or if the position falls in an unaligned gap.
    /// Passes through any database errors.
    pub fn lift_position(&self, from: Reference, chromosome: &str, position: i64, cancel: &Cancellation) -> Result<LiftedPosition> {
        let chain = self.get_chain(from, chromosome, position, cancel)?;
        // The first block ending after the offset is the only one that can contain it.
        let block = self.get_alignment(chain.id, chain.source_offset(position) + 1, cancel);
        let block = match block {
            Ok(block) => block,
            Err(err) if err.is_not_found() => {
                return Err(Error::not_found(
                    "aligned block",
                    format!("{}:{} (past the last block of chain {})", chromosome, position, chain.id)
                ));
            },
            Err(err) => return Err(err),
        };
        chain.lift(&block, position)
    }

    /// Deletes the chain and all of its alignment blocks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the chain does not exist.
    /// Passes through any database errors.
    pub fn delete_chain(&mut self, chain_id: i64, cancel: &Cancellation) -> Result<()> {
        let key = || format!("chain {}", chain_id);
        let deleted = self.interruptible_mut(cancel, "delete_chain", |connection| {
            connection.execute("DELETE FROM liftover_chain WHERE id = ?1", (chain_id,))
                .map_err(|err| Error::storage("delete_chain", key(), err))
        })?;
        if deleted == 0 {
            return Err(Error::not_found("chain", key()));
        }
        Ok(())
    }

    /// Returns the number of chains in the database.
    pub fn chain_count(&self, cancel: &Cancellation) -> Result<usize> {
        self.count_rows("liftover_chain", "SELECT COUNT(*) FROM liftover_chain", cancel)
    }

    /// Returns the number of alignment blocks in the database.
    pub fn alignment_count(&self, cancel: &Cancellation) -> Result<usize> {
        self.count_rows("liftover_alignment", "SELECT COUNT(*) FROM liftover_alignment", cancel)
    }

    /// Stores all chains from the iterator, each together with its alignment blocks.
    ///
    /// The iterator is usually a [`crate::formats::ChainReader`].
    /// Each chain is anchored to its own source assembly.
    /// A chain and its blocks are stored in a single transaction, so the database never contains a chain without its blocks.
    /// A failure leaves the chains before it in the database.
    /// Open the database with [`GenobaseParams::no_sync`] for faster imports.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a chain with an inverted interval.
    /// Passes through any parse and database errors.
    pub fn import_chains<I>(&mut self, chains: I, cancel: &Cancellation) -> Result<ImportStats>
    where
        I: IntoIterator<Item = Result<(Chain, Vec<Alignment>)>>,
    {
        info!("Importing liftover chains");
        let mut stats = ImportStats::default();
        for record in chains {
            let (chain, blocks) = record?;
            chain.validate()?;
            self.interruptible_mut(cancel, "import_chains", |connection| {
                let transaction = connection.transaction().map_err(|err| Error::storage("import_chains", "transaction", err))?;
                let chain_id = Self::insert_chain(&transaction, chain.source_assembly, &chain)?;
                Self::insert_alignments(&transaction, chain_id, &blocks, cancel)?;
                transaction.commit().map_err(|err| Error::storage("import_chains", format!("chain {}", chain_id), err))
            })?;
            stats.chains += 1;
            stats.alignments += blocks.len();
            if stats.chains % 1000 == 0 {
                debug!("Imported {} chains", stats.chains);
            }
        }
        info!("Inserted {} chains with {} alignment blocks", stats.chains, stats.alignments);
        Ok(stats)
    }
}

//-----------------------------------------------------------------------------

/// Variants and allele frequencies.
impl Genobase {
    fn row_to_variant(row: &Row) -> rusqlite::Result<Variant> {
        Ok(Variant {
            id: row.get(0)?,
            chromosome: row.get(1)?,
            position: row.get(2)?,
            class: row.get(3)?,
        })
    }

    fn row_to_allele(row: &Row) -> rusqlite::Result<Allele> {
        Ok(Allele {
            id: row.get(0)?,
            reference: row.get(1)?,
            alternate: row.get(2)?,
            ancestry: row.get(3)?,
            frequency: row.get(4)?,
        })
    }

    /// Stores the variants in a single transaction, replacing existing variants with the same RSID.
    ///
    /// # Errors
    ///
    /// Passes through any database errors. If an insertion fails, none of the variants are stored.
    pub fn store_variants(&mut self, variants: &[Variant], cancel: &Cancellation) -> Result<()> {
        self.interruptible_mut(cancel, "store_variants", |connection| {
            let transaction = connection.transaction().map_err(|err| Error::storage("store_variants", "transaction", err))?;
            {
                let mut insert = transaction.prepare_cached(
                    "INSERT INTO variant(id, chromosome, position, class) VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(id) DO UPDATE SET
                        chromosome = excluded.chromosome,
                        position = excluded.position,
                        class = excluded.class"
                ).map_err(|err| Error::storage("store_variants", "transaction", err))?;
                for variant in variants {
                    cancel.check("store_variants")?;
                    insert.execute((variant.id, variant.chromosome, variant.position, variant.class))
                        .map_err(|err| Error::storage("store_variants", format!("rs{}", variant.id), err))?;
                }
            }
            transaction.commit().map_err(|err| Error::storage("store_variants", "transaction", err))?;
            Ok(())
        })
    }

    /// Returns the variant with the given RSID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the variant does not exist.
    /// Passes through any database errors.
    pub fn get_variant(&self, id: i64, cancel: &Cancellation) -> Result<Variant> {
        let variant = self.interruptible(cancel, "get_variant", |connection| {
            let mut statement = connection.prepare_cached(
                "SELECT id, chromosome, position, class FROM variant WHERE id = ?1"
            ).map_err(|err| Error::storage("get_variant", format!("rs{}", id), err))?;
            statement.query_row((id,), Self::row_to_variant)
                .optional()
                .map_err(|err| Error::storage("get_variant", format!("rs{}", id), err))
        })?;
        variant.ok_or_else(|| Error::not_found("variant", format!("rs{}", id)))
    }

    /// Returns all variants at the given position.
    pub fn get_variants(&self, chromosome: Chromosome, position: i64, cancel: &Cancellation) -> Result<Vec<Variant>> {
        let key = || format!("{}:{}", chromosome, position);
        self.interruptible(cancel, "get_variants", |connection| {
            let mut statement = connection.prepare_cached(
                "SELECT id, chromosome, position, class FROM variant WHERE chromosome = ?1 AND position = ?2"
            ).map_err(|err| Error::storage("get_variants", key(), err))?;
            let mut result: Vec<Variant> = Vec::new();
            let mut rows = statement.query((chromosome, position)).map_err(|err| Error::storage("get_variants", key(), err))?;
            while let Some(row) = rows.next().map_err(|err| Error::storage("get_variants", key(), err))? {
                let variant = Self::row_to_variant(row).map_err(|err| Error::storage("get_variants", key(), err))?;
                result.push(variant);
            }
            Ok(result)
        })
    }

    /// Stores the alleles in a single transaction.
    ///
    /// An allele with the same `(id, reference, alternate, ancestry)` key as an existing one replaces its frequency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a frequency is not in `[0, 1]`. Nothing is stored in that case.
    /// Passes through any database errors. If an insertion fails, none of the alleles are stored.
    pub fn store_alleles(&mut self, alleles: &[Allele], cancel: &Cancellation) -> Result<()> {
        for allele in alleles {
            allele.validate()?;
        }
        self.interruptible_mut(cancel, "store_alleles", |connection| {
            let transaction = connection.transaction().map_err(|err| Error::storage("store_alleles", "transaction", err))?;
            {
                let mut insert = transaction.prepare_cached(
                    "INSERT INTO allele(id, ref, alt, ancestry, frequency) VALUES (?1, ?2, ?3, ?4, ?5)
                    ON CONFLICT(id, ref, alt, ancestry) DO UPDATE SET
                        frequency = excluded.frequency"
                ).map_err(|err| Error::storage("store_alleles", "transaction", err))?;
                for allele in alleles {
                    cancel.check("store_alleles")?;
                    insert.execute((allele.id, &allele.reference, &allele.alternate, allele.ancestry, allele.frequency))
                        .map_err(|err| Error::storage("store_alleles", format!("rs{}", allele.id), err))?;
                }
            }
            transaction.commit().map_err(|err| Error::storage("store_alleles", "transaction", err))?;
            Ok(())
        })
    }

    /// Returns the allele with the given key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the allele does not exist.
    /// Passes through any database errors.
    pub fn get_allele(
        &self, id: i64, reference: &str, alternate: &str, ancestry: AncestryGroup, cancel: &Cancellation
    ) -> Result<Allele> {
        let key = || format!("rs{} {}>{} ({})", id, reference, alternate, ancestry);
        let allele = self.interruptible(cancel, "get_allele", |connection| {
            let mut statement = connection.prepare_cached(
                "SELECT id, ref, alt, ancestry, frequency FROM allele
                WHERE id = ?1 AND ref = ?2 AND alt = ?3 AND ancestry = ?4"
            ).map_err(|err| Error::storage("get_allele", key(), err))?;
            statement.query_row((id, reference, alternate, ancestry), Self::row_to_allele)
                .optional()
                .map_err(|err| Error::storage("get_allele", key(), err))
        })?;
        allele.ok_or_else(|| Error::not_found("allele", key()))
    }

    /// Returns all alleles of the variant with the given RSID.
    pub fn get_alleles(&self, id: i64, cancel: &Cancellation) -> Result<Vec<Allele>> {
        self.interruptible(cancel, "get_alleles", |connection| {
            let mut statement = connection.prepare_cached(
                "SELECT id, ref, alt, ancestry, frequency FROM allele WHERE id = ?1"
            ).map_err(|err| Error::storage("get_alleles", format!("rs{}", id), err))?;
            let mut result: Vec<Allele> = Vec::new();
            let mut rows = statement.query((id,)).map_err(|err| Error::storage("get_alleles", format!("rs{}", id), err))?;
            while let Some(row) = rows.next().map_err(|err| Error::storage("get_alleles", format!("rs{}", id), err))? {
                let allele = Self::row_to_allele(row).map_err(|err| Error::storage("get_alleles", format!("rs{}", id), err))?;
                result.push(allele);
            }
            Ok(result)
        })
    }

    /// Returns the RSIDs of all variants with at least one stored allele.
    pub fn known_alleles(&self, cancel: &Cancellation) -> Result<HashSet<i64>> {
        self.interruptible(cancel, "known_alleles", |connection| {
            let mut statement = connection.prepare_cached("SELECT DISTINCT id FROM allele")
                .map_err(|err| Error::storage("known_alleles", "allele", err))?;
            let mut result: HashSet<i64> = HashSet::new();
            let mut rows = statement.query(()).map_err(|err| Error::storage("known_alleles", "allele", err))?;
            while let Some(row) = rows.next().map_err(|err| Error::storage("known_alleles", "allele", err))? {
                let id: i64 = row.get(0).map_err(|err| Error::storage("known_alleles", "allele", err))?;
                result.insert(id);
            }
            Ok(result)
        })
    }
}

//-----------------------------------------------------------------------------

/// Type of a potential database file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatabaseFileType {
    /// The file does not exist.
    Missing,
    /// The file is not a valid SQLite database.
    NotDatabase,
    /// The file is an unknown SQLite database.
    UnknownDatabase,
    /// The file is a known SQLite database with the given version string.
    Version(String),
}

/// Determines the type of the given file, which may be a SQLite database.
pub fn identify_database<P: AsRef<Path>>(filename: P) -> DatabaseFileType {
    let Ok(metadata) = fs::metadata(&filename) else {
        return DatabaseFileType::Missing;
    };
    if !metadata.is_file() {
        return DatabaseFileType::NotDatabase;
    }

    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let Ok(connection) = Connection::open_with_flags(filename, flags) else {
        return DatabaseFileType::NotDatabase;
    };

    // Opening is lazy, so a file that is not a database only fails here.
    let version: rusqlite::Result<String> = connection.query_row(
        "SELECT value FROM Tags WHERE key = 'version'", [], |row| row.get(0)
    );
    match version {
        Ok(version) => DatabaseFileType::Version(version),
        Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == rusqlite::ErrorCode::NotADatabase => {
            DatabaseFileType::NotDatabase
        },
        Err(_) => DatabaseFileType::UnknownDatabase,
    }
}

//-----------------------------------------------------------------------------
