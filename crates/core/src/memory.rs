//! Flat 64 KiB address space.
//!
//! There is no bus, mapping or I/O here: every address is plain RAM and reads
//! have no side effects. Callers may seed cells directly before running a
//! program (`memory[Word::new(0x00, 0x2F)] = 0x05`).

use crate::word::Word;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::{Index, IndexMut};

/// Number of addressable bytes.
pub const MEMORY_SIZE: usize = 0x10000;

#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    // Always exactly MEMORY_SIZE long, so any Word indexes in bounds.
    data: Box<[u8]>,
}

impl Memory {
    pub fn new() -> Self {
        Self {
            data: vec![0; MEMORY_SIZE].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn read(&self, addr: Word) -> u8 {
        self.data[usize::from(addr)]
    }

    #[inline]
    pub fn write(&mut self, addr: Word, val: u8) {
        self.data[usize::from(addr)] = val;
    }

    /// Little-endian 16-bit read. The high byte comes from `addr + 1`,
    /// wrapping at 0xFFFF.
    pub fn read_word(&self, addr: Word) -> Word {
        Word::new(self.read(addr.add(1)), self.read(addr))
    }

    /// Copy `bytes` into memory starting at `start`, wrapping past 0xFFFF.
    pub fn load(&mut self, start: Word, bytes: &[u8]) {
        let base = usize::from(start);
        if base + bytes.len() <= MEMORY_SIZE {
            self.data[base..base + bytes.len()].copy_from_slice(bytes);
        } else {
            for (i, &b) in bytes.iter().enumerate() {
                self.write(start.add(i as u16), b);
            }
        }
    }

    /// Copy of `len` bytes starting at `start`, wrapping past 0xFFFF.
    pub fn slice(&self, start: Word, len: usize) -> Vec<u8> {
        (0..len).map(|i| self.read(start.add(i as u16))).collect()
    }

    /// The whole address space.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Zero every cell.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.data.iter().filter(|&&b| b != 0).count();
        f.debug_struct("Memory")
            .field("size", &self.data.len())
            .field("nonzero", &used)
            .finish()
    }
}

impl Index<Word> for Memory {
    type Output = u8;

    fn index(&self, addr: Word) -> &u8 {
        &self.data[usize::from(addr)]
    }
}

impl IndexMut<Word> for Memory {
    fn index_mut(&mut self, addr: Word) -> &mut u8 {
        &mut self.data[usize::from(addr)]
    }
}

impl Serialize for Memory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.data.iter())
    }
}

impl<'de> Deserialize<'de> for Memory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        if bytes.len() != MEMORY_SIZE {
            return Err(D::Error::invalid_length(bytes.len(), &"65536 bytes"));
        }
        Ok(Self {
            data: bytes.into_boxed_slice(),
        })
    }
}
