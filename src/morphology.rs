//! Binary dilation and hole filling on [`Mask`] grids.
//!
//! Both operations use the 4-neighbourhood cross (see [`crate::CONNECTIVITY`]);
//! cells outside the grid are treated as false.

use std::collections::VecDeque;

use crate::mask::{neighbours, Mask};

/// Grow true regions by one cross-shaped step per iteration.
///
/// After each iteration a cell is true if it, or any of its 4-neighbours,
/// was true after the previous one. `iterations == 0` returns a copy.
#[must_use]
pub fn dilate(mask: &Mask, iterations: u32) -> Mask {
    let width = mask.width() as usize;
    let height = mask.height() as usize;
    let mut current = mask.clone();

    for _ in 0..iterations {
        // Nothing left to grow into, or nothing to grow from.
        if !current.any() || current.count() == current.as_slice().len() {
            break;
        }
        let mut next = current.clone();
        let src = current.as_slice();
        for (idx, cell) in next.as_mut_slice().iter_mut().enumerate() {
            if !*cell && neighbours(idx, width, height).any(|n| src[n]) {
                *cell = true;
            }
        }
        current = next;
    }

    current
}

/// Flip every false cell that cannot reach the grid border through false cells.
///
/// The background is flooded from every false border cell with an explicit
/// queue; whatever false cells the flood misses are enclosed holes.
#[must_use]
pub fn fill_holes(mask: &Mask) -> Mask {
    let width = mask.width() as usize;
    let height = mask.height() as usize;
    let src = mask.as_slice();

    let mut outside = vec![false; src.len()];
    let mut queue = VecDeque::new();

    if width > 0 && height > 0 {
        let border = (0..width)
            .flat_map(|x| [x, (height - 1) * width + x])
            .chain((0..height).flat_map(|y| [y * width, y * width + width - 1]));
        for idx in border {
            if !src[idx] && !outside[idx] {
                outside[idx] = true;
                queue.push_back(idx);
            }
        }
    }

    while let Some(idx) = queue.pop_front() {
        for n in neighbours(idx, width, height) {
            if !src[n] && !outside[n] {
                outside[n] = true;
                queue.push_back(n);
            }
        }
    }

    let mut filled = mask.clone();
    for (cell, &reached) in filled.as_mut_slice().iter_mut().zip(&outside) {
        if !reached {
            *cell = true;
        }
    }
    filled
}

/// Dilate the edge mask and fill the enclosed interiors.
#[must_use]
pub fn consolidate(edge_mask: &Mask, iterations: u32) -> Mask {
    fill_holes(&dilate(edge_mask, iterations))
}
