//! Flat squared-L2 index implementation.

use crate::error::{Result, SkaldError};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// File magic for the vector artifact.
const MAGIC: &[u8; 4] = b"SKV1";

/// Exact nearest-neighbor index over fixed-dimension vectors.
///
/// Vectors are stored row-major in one flat buffer and are append-only;
/// positions are stable for the lifetime of the index, which is what lets
/// the document store address them by index.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Create an empty index for vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    /// Configured vector dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of vectors stored.
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append vectors in order.
    ///
    /// Every vector must match the configured dimension; a mismatch rejects
    /// the whole call without appending anything.
    pub fn add(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        for vector in vectors {
            if vector.len() != self.dimension {
                return Err(SkaldError::Consistency(format!(
                    "vector dimension {} does not match index dimension {}",
                    vector.len(),
                    self.dimension
                )));
            }
        }

        self.data.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            self.data.extend_from_slice(vector);
        }
        Ok(())
    }

    /// Find the k nearest vectors to the query under squared L2 distance.
    ///
    /// Returns `(distance, index)` pairs ordered nearest-first. When k
    /// exceeds the index size, every stored vector is returned.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(f32, usize)>> {
        if query.len() != self.dimension {
            return Err(SkaldError::Consistency(format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.dimension
            )));
        }

        let mut results: Vec<(f32, usize)> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(i, row)| (squared_l2(query, row), i))
            .collect();

        results.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);

        Ok(results)
    }

    /// Write the index to disk.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(MAGIC)?;
        writer.write_all(&(self.dimension as u32).to_le_bytes())?;
        writer.write_all(&(self.len() as u32).to_le_bytes())?;
        for value in &self.data {
            writer.write_all(&value.to_le_bytes())?;
        }
        writer.flush()?;

        Ok(())
    }

    /// Read an index back from disk.
    ///
    /// The payload must contain exactly `dimension * count` values; short or
    /// oversized files are treated as corrupt.
    pub fn read_from(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic).map_err(|_| {
            SkaldError::Consistency(format!("{}: not a vector artifact", path.display()))
        })?;
        if &magic != MAGIC {
            return Err(SkaldError::Consistency(format!(
                "{}: unrecognized vector artifact header",
                path.display()
            )));
        }

        let mut word = [0u8; 4];
        reader.read_exact(&mut word)?;
        let dimension = u32::from_le_bytes(word) as usize;
        reader.read_exact(&mut word)?;
        let count = u32::from_le_bytes(word) as usize;

        let mut data = Vec::with_capacity(dimension * count);
        let mut value = [0u8; 4];
        for _ in 0..dimension * count {
            reader.read_exact(&mut value).map_err(|_| {
                SkaldError::Consistency(format!("{}: truncated vector artifact", path.display()))
            })?;
            data.push(f32::from_le_bytes(value));
        }

        if reader.read(&mut value)? != 0 {
            return Err(SkaldError::Consistency(format!(
                "{}: trailing bytes after vector payload",
                path.display()
            )));
        }

        Ok(Self { dimension, data })
    }
}

/// Squared L2 distance between two equal-length vectors.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}
