//! Boolean pixel grids shared by the morphology and labelling stages.

/// Neighbourhood used by every grid operation in this crate.
///
/// Dilation, hole filling and component labelling all treat two cells as
/// adjacent only when they share an edge (the 4-neighbourhood cross).
pub const CONNECTIVITY: usize = 4;

/// Row-major grid of booleans with the same dimensions as the source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl Mask {
    /// Create an all-false mask.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![false; width as usize * height as usize],
        }
    }

    /// Build a mask by evaluating `f(x, y)` for every cell.
    #[must_use]
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Mask width in cells.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in cells.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the mask.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.data[self.index(x, y)]
    }

    /// Set the value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the mask.
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Number of true cells.
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Whether at least one cell is true.
    #[must_use]
    pub fn any(&self) -> bool {
        self.data.contains(&true)
    }

    /// Flat row-major view of the cells.
    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [bool] {
        &mut self.data
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "({x}, {y}) outside {}x{} mask",
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }
}

/// Flat indices of the in-bounds 4-neighbours of `idx` in a `width`x`height` grid.
pub(crate) fn neighbours(idx: usize, width: usize, height: usize) -> impl Iterator<Item = usize> {
    let x = idx % width;
    let y = idx / width;
    let up = (y > 0).then(|| idx - width);
    let down = (y + 1 < height).then(|| idx + width);
    let left = (x > 0).then(|| idx - 1);
    let right = (x + 1 < width).then(|| idx + 1);
    [up, down, left, right].into_iter().flatten()
}
