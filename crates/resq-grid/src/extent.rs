//! Cell counts of a grid and the index arithmetic built on them.

use resq_core::IndexableElement;
use smallvec::SmallVec;

use crate::error::GridError;

/// Dimensions of a grid in cells: `ni` columns along I, `nj` along J,
/// `nk` layers.
///
/// Cells are numbered with I fastest: `index = (k * nj + j) * ni + i`.
///
/// # Examples
///
/// ```
/// use resq_grid::Extent;
///
/// let extent = Extent::new(2, 2, 1).unwrap();
/// assert_eq!(extent.cell_count(), 4);
/// assert_eq!(extent.corner_point_count(), 72);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Extent {
    ni: usize,
    nj: usize,
    nk: usize,
}

/// Neighbour list of one cell; at most six face neighbours.
pub type Neighbours = SmallVec<[(usize, usize, usize); 6]>;

impl Extent {
    /// Create an extent. Every count must be positive and every derived
    /// element count must fit in `usize`.
    pub fn new(ni: usize, nj: usize, nk: usize) -> Result<Self, GridError> {
        let invalid = |reason| GridError::InvalidExtent {
            extent: (ni, nj, nk),
            reason,
        };
        if ni == 0 || nj == 0 || nk == 0 {
            return Err(invalid("every dimension must be at least 1"));
        }
        // The corner-point count is the largest derived quantity.
        let nodes = |n: usize| n.checked_add(1);
        nodes(ni)
            .zip(nodes(nj))
            .zip(nodes(nk))
            .and_then(|((a, b), c)| a.checked_mul(b)?.checked_mul(c))
            .and_then(|n| n.checked_mul(4))
            .and_then(|n| n.checked_mul(3))
            .ok_or_else(|| invalid("element counts overflow"))?;
        Ok(Self { ni, nj, nk })
    }

    /// Cells along I.
    pub fn ni(&self) -> usize {
        self.ni
    }

    /// Cells along J.
    pub fn nj(&self) -> usize {
        self.nj
    }

    /// Layers along K.
    pub fn nk(&self) -> usize {
        self.nk
    }

    /// `(ni, nj, nk)`.
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.ni, self.nj, self.nk)
    }

    /// `ni * nj * nk`.
    pub fn cell_count(&self) -> usize {
        self.ni * self.nj * self.nk
    }

    /// Pillar nodes per layer interface times interfaces:
    /// `(ni + 1) * (nj + 1) * (nk + 1)`.
    pub fn node_count(&self) -> usize {
        (self.ni + 1) * (self.nj + 1) * (self.nk + 1)
    }

    /// I-faces, then J-faces, then K-faces.
    pub fn face_count(&self) -> usize {
        let (ni, nj, nk) = self.dims();
        (ni + 1) * nj * nk + ni * (nj + 1) * nk + ni * nj * (nk + 1)
    }

    /// Element count of an indexable domain.
    pub fn element_count(&self, element: IndexableElement) -> usize {
        match element {
            IndexableElement::Cells => self.cell_count(),
            IndexableElement::Faces => self.face_count(),
            IndexableElement::Nodes => self.node_count(),
        }
    }

    /// Points in a split-pillar corner-point array: four slots per node.
    pub fn corner_point_count(&self) -> usize {
        self.node_count() * 4
    }

    /// `true` when `(i, j, k)` names a cell.
    pub fn contains(&self, i: usize, j: usize, k: usize) -> bool {
        i < self.ni && j < self.nj && k < self.nk
    }

    pub(crate) fn check_cell(&self, i: usize, j: usize, k: usize) -> Result<(), GridError> {
        if self.contains(i, j, k) {
            Ok(())
        } else {
            Err(GridError::IndexOutOfRange {
                index: (i, j, k),
                extent: self.dims(),
            })
        }
    }

    /// Flat cell index of `(i, j, k)`.
    pub fn cell_index(&self, i: usize, j: usize, k: usize) -> Result<usize, GridError> {
        self.check_cell(i, j, k)?;
        Ok((k * self.nj + j) * self.ni + i)
    }

    /// Inverse of [`cell_index`](Self::cell_index), returned as `(k, j, i)`.
    pub fn cell_kji(&self, index: usize) -> Result<(usize, usize, usize), GridError> {
        if index >= self.cell_count() {
            return Err(GridError::IndexOutOfRange {
                index: (index, 0, 0),
                extent: self.dims(),
            });
        }
        let i = index % self.ni;
        let j = (index / self.ni) % self.nj;
        let k = index / (self.ni * self.nj);
        Ok((k, j, i))
    }

    /// Face-sharing neighbours of a cell in the order -I, +I, -J, +J, -K, +K.
    /// Cells on the boundary have fewer neighbours.
    pub fn neighbours(&self, i: usize, j: usize, k: usize) -> Result<Neighbours, GridError> {
        self.check_cell(i, j, k)?;
        let mut out = Neighbours::new();
        let offsets: [(isize, isize, isize); 6] = [
            (-1, 0, 0),
            (1, 0, 0),
            (0, -1, 0),
            (0, 1, 0),
            (0, 0, -1),
            (0, 0, 1),
        ];
        for (di, dj, dk) in offsets {
            let ni = i.checked_add_signed(di);
            let nj = j.checked_add_signed(dj);
            let nk = k.checked_add_signed(dk);
            if let (Some(ni), Some(nj), Some(nk)) = (ni, nj, nk) {
                if self.contains(ni, nj, nk) {
                    out.push((ni, nj, nk));
                }
            }
        }
        Ok(out)
    }

    /// All cells in flat-index order, as `(i, j, k)`.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        (0..self.nk).flat_map(move |k| {
            (0..self.nj).flat_map(move |j| (0..self.ni).map(move |i| (i, j, k)))
        })
    }

    /// Flat index into the corner-point array for pillar node `(i, j)`,
    /// layer interface `k` and corner slot `slot`.
    pub fn corner_index(&self, i: usize, j: usize, k: usize, slot: usize) -> usize {
        (((k * (self.nj + 1) + j) * (self.ni + 1)) + i) * 4 + slot
    }

    /// `true` when the slot's column `(i - 1 + di, j - 1 + dj)` lies inside
    /// the extent. Slots of columns outside the extent are never read.
    pub fn slot_in_use(&self, i: usize, j: usize, slot: usize) -> bool {
        let di = slot & 1;
        let dj = slot >> 1;
        let ci = (i + di).checked_sub(1);
        let cj = (j + dj).checked_sub(1);
        matches!((ci, cj), (Some(ci), Some(cj)) if ci < self.ni && cj < self.nj)
    }

    /// Corner-point indices of cell `(i, j, k)` in `[k][j][i]` order.
    pub fn cell_corner_indices(&self, i: usize, j: usize, k: usize) -> [[[usize; 2]; 2]; 2] {
        let mut out = [[[0; 2]; 2]; 2];
        for (dk, plane) in out.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (di, slot_index) in row.iter_mut().enumerate() {
                    // The node's slot for this column mirrors the corner offset.
                    let slot = 2 * (1 - dj) + (1 - di);
                    *slot_index = self.corner_index(i + di, j + dj, k + dk, slot);
                }
            }
        }
        out
    }
}
