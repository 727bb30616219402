use std::sync::Arc;

use itertools::Itertools;

use crate::errors::{ReflectioError, Result};

/// Ordered band selection.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Indexes {
    selection: Arc<[usize]>,
}

impl<const N: usize> From<[usize; N]> for Indexes {
    fn from(value: [usize; N]) -> Self {
        let selection = Arc::from(value);
        Indexes { selection }
    }
}

impl From<std::ops::Range<usize>> for Indexes {
    fn from(value: std::ops::Range<usize>) -> Self {
        let selection = value.collect();
        Indexes { selection }
    }
}

impl From<std::ops::RangeInclusive<usize>> for Indexes {
    fn from(value: std::ops::RangeInclusive<usize>) -> Self {
        let selection = value.collect();
        Indexes { selection }
    }
}

impl From<Arc<[usize]>> for Indexes {
    fn from(selection: Arc<[usize]>) -> Self {
        Indexes { selection }
    }
}

impl From<Vec<usize>> for Indexes {
    fn from(value: Vec<usize>) -> Self {
        Self::from(Arc::<[usize]>::from(value))
    }
}

impl Indexes {
    /// Concatenation of inclusive `(start, end)` ranges, in the given order.
    pub fn from_ranges(ranges: &[(usize, usize)]) -> Self {
        let selection = ranges
            .iter()
            .flat_map(|(start, end)| *start..=*end)
            .collect();
        Indexes { selection }
    }

    /// Resolves the selection against a collection of `collection_len` bands.
    ///
    /// Fails with [ReflectioError::Range] on the first index that does not exist.
    pub fn indexes_from(&self, collection_len: usize) -> Result<Arc<[usize]>> {
        if let Some(index) = self.selection.iter().find(|idx| **idx >= collection_len) {
            return Err(ReflectioError::Range {
                index: *index,
                len: collection_len,
            });
        }
        Ok(Arc::clone(&self.selection))
    }

    /// Splits the selection into runs of consecutive indexes.
    pub fn contiguous_runs(&self, collection_len: usize) -> Result<Vec<Indexes>> {
        let indexes = self.indexes_from(collection_len)?;
        Ok(indexes
            .iter()
            .copied()
            .enumerate()
            .chunk_by(|(position, idx)| *idx as isize - *position as isize)
            .into_iter()
            .map(|(_, run)| Indexes::from(run.map(|(_, idx)| idx).collect_vec()))
            .collect())
    }
}
