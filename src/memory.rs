use std::fmt;

use log::trace;

/// Size of the flat data memory, in bytes.
pub const MEMORY_CAPACITY: usize = 1024;

/// Byte-addressable store backing `load`, `store`, `put` and string `print`.
#[derive(Clone)]
pub struct Memory {
    bytes: Box<[u8; MEMORY_CAPACITY]>,
}

/// Width of a single load or store. Only 1, 2, 4 and 8 bytes are representable.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Width {
    Byte = 1,
    Half = 2,
    Word = 4,
    Double = 8,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MemoryError {
    /// Access of `len` bytes at `offset` runs outside `[0, MEMORY_CAPACITY)`.
    OutOfBounds { offset: i64, len: usize },
    /// Requested width is not 1, 2, 4 or 8.
    InvalidWidth(i64),
}

impl std::error::Error for MemoryError {}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { offset, len } => write!(
                f,
                "access of {len} byte(s) at offset {offset} is outside of memory (capacity {MEMORY_CAPACITY})"
            ),
            Self::InvalidWidth(width) => {
                write!(f, "invalid access width {width}, expected 1, 2, 4 or 8")
            }
        }
    }
}

impl Width {
    pub fn bytes(self) -> usize {
        self as usize
    }
}

impl TryFrom<i64> for Width {
    type Error = MemoryError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Width::Byte),
            2 => Ok(Width::Half),
            4 => Ok(Width::Word),
            8 => Ok(Width::Double),
            other => Err(MemoryError::InvalidWidth(other)),
        }
    }
}

impl Memory {
    pub fn new() -> Self {
        Memory {
            bytes: Box::new([0; MEMORY_CAPACITY]),
        }
    }

    /// Resolve `offset..offset + len` to an index range, or fail if any part is out of bounds.
    fn range(offset: i64, len: usize) -> Result<std::ops::Range<usize>, MemoryError> {
        let err = MemoryError::OutOfBounds { offset, len };
        let start = usize::try_from(offset).map_err(|_| err)?;
        let end = start.checked_add(len).ok_or(err)?;
        if end > MEMORY_CAPACITY {
            return Err(err);
        }
        Ok(start..end)
    }

    /// Copy `dest.len()` bytes starting at `offset` into `dest`.
    pub fn load(&self, dest: &mut [u8], offset: i64) -> Result<(), MemoryError> {
        let range = Self::range(offset, dest.len())?;
        dest.copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    /// Copy all of `src` into memory starting at `offset`. Nothing is written on failure.
    pub fn store(&mut self, src: &[u8], offset: i64) -> Result<(), MemoryError> {
        let range = Self::range(offset, src.len())?;
        trace!("store {} byte(s) at {}", src.len(), offset);
        self.bytes[range].copy_from_slice(src);
        Ok(())
    }

    pub fn load_byte(&self, offset: i64) -> Result<u8, MemoryError> {
        let mut byte = [0];
        self.load(&mut byte, offset)?;
        Ok(byte[0])
    }

    pub fn store_byte(&mut self, offset: i64, value: u8) -> Result<(), MemoryError> {
        self.store(&[value], offset)
    }

    /// Little-endian read, zero-extended to 64 bits.
    pub fn load_word(&self, offset: i64, width: Width) -> Result<u64, MemoryError> {
        let mut buf = [0u8; 8];
        self.load(&mut buf[..width.bytes()], offset)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Little-endian write of the low `width` bytes of `value`.
    pub fn store_word(&mut self, offset: i64, width: Width, value: u64) -> Result<(), MemoryError> {
        let buf = value.to_le_bytes();
        self.store(&buf[..width.bytes()], offset)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..]
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
