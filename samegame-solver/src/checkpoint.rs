//! Binary checkpoint format for the transposition table.
//!
//! Format:
//! - Header (32 bytes):
//!   - Magic: "SGT1" (4 bytes)
//!   - Version: u32 LE (4 bytes)
//!   - Entry count: u64 LE (8 bytes)
//!   - Checksum: u64 LE xxhash of data section (8 bytes)
//!   - Key seed: u64 LE (8 bytes)
//! - Data section (entry_count × 28 bytes):
//!   - Hash: u64 LE (8 bytes)
//!   - Score: f64 LE (8 bytes)
//!   - Value: f64 LE (8 bytes)
//!   - Visits: u32 LE (4 bytes)
//!
//! Entries are sorted by hash for potential binary search. The key seed is
//! stored so that a checkpoint is only restored into a table that hashes
//! action sequences the same way.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use samegame_core::{TranspositionEntry, TranspositionTable};
use xxhash_rust::xxh64::xxh64;

const MAGIC: &[u8; 4] = b"SGT1";
const VERSION: u32 = 1;
const HEADER_SIZE: usize = 32;
const ENTRY_SIZE: usize = 28;

#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub seed: u64,
    pub entries: Vec<(u64, TranspositionEntry)>,
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

fn le_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(buf)
}

fn le_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(buf)
}

impl Checkpoint {
    /// Snapshot `table`, sorted by hash.
    pub fn from_table(table: &TranspositionTable) -> Checkpoint {
        let mut entries = table.snapshot();
        entries.sort_by_key(|&(hash, _)| hash);
        Checkpoint {
            seed: table.seed(),
            entries,
        }
    }

    /// Save transposition table to binary checkpoint file.
    pub fn save(path: &Path, table: &TranspositionTable) -> io::Result<usize> {
        let checkpoint = Checkpoint::from_table(table);
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        checkpoint.write_to(&mut writer)?;
        writer.flush()?;
        Ok(checkpoint.entries.len())
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let count = self.entries.len();

        // Build data section
        let mut data = Vec::with_capacity(count * ENTRY_SIZE);
        for (hash, entry) in &self.entries {
            data.extend_from_slice(&hash.to_le_bytes());
            data.extend_from_slice(&entry.score.to_le_bytes());
            data.extend_from_slice(&entry.value.to_le_bytes());
            data.extend_from_slice(&entry.visits.to_le_bytes());
        }

        let checksum = xxh64(&data, 0);

        // Header
        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&(count as u64).to_le_bytes())?;
        writer.write_all(&checksum.to_le_bytes())?;
        writer.write_all(&self.seed.to_le_bytes())?;

        // Data
        writer.write_all(&data)
    }

    /// Load checkpoint from binary file.
    pub fn load(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Checkpoint::read_from(BufReader::new(file))
    }

    pub fn read_from<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header)?;

        if &header[0..4] != MAGIC {
            return Err(invalid("Invalid checkpoint magic"));
        }

        let version = le_u32(&header[4..8]);
        if version != VERSION {
            return Err(invalid(format!("Unsupported checkpoint version: {}", version)));
        }

        let count = le_u64(&header[8..16]) as usize;
        let stored_checksum = le_u64(&header[16..24]);
        let seed = le_u64(&header[24..32]);

        let len = count
            .checked_mul(ENTRY_SIZE)
            .ok_or_else(|| invalid("Checkpoint entry count overflows"))?;
        let mut data = vec![0u8; len];
        reader.read_exact(&mut data)?;

        if xxh64(&data, 0) != stored_checksum {
            return Err(invalid("Checkpoint checksum mismatch"));
        }

        let entries = data
            .chunks_exact(ENTRY_SIZE)
            .map(|chunk| {
                let hash = le_u64(&chunk[0..8]);
                let entry = TranspositionEntry {
                    score: f64::from_bits(le_u64(&chunk[8..16])),
                    value: f64::from_bits(le_u64(&chunk[16..24])),
                    visits: le_u32(&chunk[24..28]),
                };
                (hash, entry)
            })
            .collect();

        Ok(Checkpoint { seed, entries })
    }

    /// Insert every entry into `table`, overwriting existing ones.
    ///
    /// Fails without touching the table if the key seeds differ.
    pub fn restore(&self, table: &TranspositionTable) -> io::Result<usize> {
        if self.seed != table.seed() {
            return Err(invalid(format!(
                "Checkpoint key seed {:#x} does not match table seed {:#x}",
                self.seed,
                table.seed()
            )));
        }
        for &(hash, entry) in &self.entries {
            table.insert(hash, entry);
        }
        Ok(self.entries.len())
    }

    /// Get file size estimate for a given number of entries.
    pub fn estimate_size(count: usize) -> usize {
        HEADER_SIZE + count * ENTRY_SIZE
    }
}
