//! Spatial tiling for per-pixel work.
//!
//! A plane is split into tiles of whole rows. Each tile is a contiguous range
//! of the row-major plane, so tiles of the input, the per-pixel state and the
//! output line up index for index and never overlap.

use rayon::prelude::*;

/// Rows per tile never drop below this when derived automatically.
const MIN_AUTO_TILE_ROWS: usize = 8;

/// How a plane is split and whether tiles run on the rayon pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePlan {
    tile_len: usize,
    parallel: bool,
}

impl TilePlan {
    /// Plan tiles for a `nrows × ncols` plane.
    ///
    /// `tile_rows == 0` derives the tile height from the rayon thread count.
    pub fn new(nrows: usize, ncols: usize, tile_rows: usize, parallel: bool) -> Self {
        let rows = if tile_rows > 0 {
            tile_rows
        } else {
            (nrows / rayon::current_num_threads()).max(MIN_AUTO_TILE_ROWS)
        };
        let rows = rows.min(nrows).max(1);
        Self {
            tile_len: (rows * ncols).max(1),
            parallel,
        }
    }

    /// Cells per tile (the last tile may be shorter).
    pub fn tile_len(&self) -> usize {
        self.tile_len
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn tile_count(&self, plane_len: usize) -> usize {
        plane_len.div_ceil(self.tile_len)
    }

    /// Run `f` over matching tiles of one read-only and two mutable planes.
    pub fn for_each_zip<A, B, C, F>(&self, input: &[A], first: &mut [B], second: &mut [C], f: F)
    where
        A: Sync,
        B: Send,
        C: Send,
        F: Fn(&[A], &mut [B], &mut [C]) + Sync + Send,
    {
        let len = self.tile_len;
        if self.parallel {
            input
                .par_chunks(len)
                .zip(first.par_chunks_mut(len))
                .zip(second.par_chunks_mut(len))
                .for_each(|((a, b), c)| f(a, b, c));
        } else {
            input
                .chunks(len)
                .zip(first.chunks_mut(len))
                .zip(second.chunks_mut(len))
                .for_each(|((a, b), c)| f(a, b, c));
        }
    }

    /// Run `f` over matching tiles of one read-only and one mutable plane.
    pub fn for_each_pair<A, B, F>(&self, input: &[A], output: &mut [B], f: F)
    where
        A: Sync,
        B: Send,
        F: Fn(&[A], &mut [B]) + Sync + Send,
    {
        let len = self.tile_len;
        if self.parallel {
            input
                .par_chunks(len)
                .zip(output.par_chunks_mut(len))
                .for_each(|(a, b)| f(a, b));
        } else {
            input
                .chunks(len)
                .zip(output.chunks_mut(len))
                .for_each(|(a, b)| f(a, b));
        }
    }
}
