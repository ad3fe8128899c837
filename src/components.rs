//! Connected-component labelling and subject selection.

use std::collections::VecDeque;

use crate::mask::{neighbours, Mask};

/// Label for cells that belong to no component.
pub const BACKGROUND: u32 = 0;

/// Row-major grid of component labels.
///
/// Label [`BACKGROUND`] marks false cells; labels `1..=count` are assigned in
/// the order components are first met in a row-major scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    width: u32,
    height: u32,
    labels: Vec<u32>,
    count: u32,
}

impl LabelMap {
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

    /// Number of components found.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Label at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the map.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        assert!(x < self.width && y < self.height, "({x}, {y}) outside label map");
        self.labels[y as usize * self.width as usize + x as usize]
    }

    /// Cell count per label, indexed by label; index 0 counts background cells.
    #[must_use]
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.count as usize + 1];
        for &label in &self.labels {
            sizes[label as usize] += 1;
        }
        sizes
    }

    /// The label with the most cells, ties going to the lowest label.
    ///
    /// Returns `None` when the map holds no component.
    #[must_use]
    pub fn largest(&self) -> Option<u32> {
        let sizes = self.sizes();
        let mut best: Option<(u32, usize)> = None;
        for (label, &size) in (1..=self.count).zip(sizes.iter().skip(1)) {
            if best.is_none_or(|(_, best_size)| size > best_size) {
                best = Some((label, size));
            }
        }
        best.map(|(label, _)| label)
    }

    /// Mask of the cells carrying `label`.
    #[must_use]
    pub fn mask_of(&self, label: u32) -> Mask {
        let mut mask = Mask::new(self.width, self.height);
        for (cell, &l) in mask.as_mut_slice().iter_mut().zip(&self.labels) {
            *cell = l == label && label != BACKGROUND;
        }
        mask
    }
}

/// Label the 4-connected components of the true cells in `mask`.
///
/// Uses a queue-based flood fill, so the work is linear in the number of
/// cells and stack depth does not grow with component size.
#[must_use]
pub fn label(mask: &Mask) -> LabelMap {
    let width = mask.width() as usize;
    let height = mask.height() as usize;
    let src = mask.as_slice();

    let mut labels = vec![BACKGROUND; src.len()];
    let mut count = 0u32;
    let mut queue = VecDeque::new();

    for start in 0..src.len() {
        if !src[start] || labels[start] != BACKGROUND {
            continue;
        }
        count += 1;
        labels[start] = count;
        queue.push_back(start);

        while let Some(idx) = queue.pop_front() {
            for n in neighbours(idx, width, height) {
                if src[n] && labels[n] == BACKGROUND {
                    labels[n] = count;
                    queue.push_back(n);
                }
            }
        }
    }

    LabelMap {
        width: mask.width(),
        height: mask.height(),
        labels,
        count,
    }
}

/// Keep only the largest component of `mask`.
///
/// Returns the subject mask together with the number of components found.
/// A mask with no true cells yields an all-false subject and a count of 0.
#[must_use]
pub fn select_largest(mask: &Mask) -> (Mask, u32) {
    let labels = label(mask);
    let subject = match labels.largest() {
        Some(subject) => {
            log::trace!(
                "selected component {subject} of {} as subject",
                labels.count()
            );
            labels.mask_of(subject)
        }
        None => Mask::new(mask.width(), mask.height()),
    };
    (subject, labels.count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(mask: &mut Mask, x0: u32, y0: u32, w: u32, h: u32) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                mask.set(x, y, true);
            }
        }
    }

    #[test]
    fn label_assigns_ids_in_scan_order() {
        let mut mask = Mask::new(6, 3);
        mask.set(4, 0, true);
        mask.set(0, 2, true);
        mask.set(1, 2, true);

        let labels = label(&mask);
        assert_eq!(labels.count(), 2);
        assert_eq!(labels.get(4, 0), 1);
        assert_eq!(labels.get(0, 2), 2);
        assert_eq!(labels.get(1, 2), 2);
        assert_eq!(labels.get(3, 1), BACKGROUND);
        assert_eq!(labels.sizes(), vec![15, 1, 2]);
    }

    #[test]
    fn diagonal_cells_are_separate_components() {
        let mut mask = Mask::new(2, 2);
        mask.set(0, 0, true);
        mask.set(1, 1, true);
        assert_eq!(label(&mask).count(), 2);
    }

    #[test]
    fn u_shape_is_one_component() {
        let mut mask = Mask::new(5, 5);
        block(&mut mask, 0, 0, 1, 5);
        block(&mut mask, 4, 0, 1, 5);
        block(&mut mask, 0, 4, 5, 1);
        let labels = label(&mask);
        assert_eq!(labels.count(), 1);
        assert_eq!(labels.sizes()[1], 13);
    }

    #[test]
    fn select_largest_keeps_the_bigger_region() {
        let mut mask = Mask::new(30, 30);
        // 50 cells, discovered first.
        block(&mut mask, 1, 1, 10, 5);
        // 80 cells.
        block(&mut mask, 5, 10, 8, 10);

        let (subject, components) = select_largest(&mask);
        assert_eq!(components, 2);
        assert_eq!(subject.count(), 80);
        assert!(subject.get(5, 10));
        assert!(!subject.get(1, 1));

        let mut expected = Mask::new(30, 30);
        block(&mut expected, 5, 10, 8, 10);
        assert_eq!(subject, expected);
    }

    #[test]
    fn ties_go_to_the_first_component_found() {
        let mut mask = Mask::new(10, 10);
        block(&mut mask, 6, 0, 3, 3);
        block(&mut mask, 0, 6, 3, 3);
        let labels = label(&mask);
        assert_eq!(labels.largest(), Some(1));
        assert!(select_largest(&mask).0.get(6, 0));
    }

    #[test]
    fn empty_mask_has_no_subject() {
        let mask = Mask::new(8, 8);
        let labels = label(&mask);
        assert_eq!(labels.count(), 0);
        assert_eq!(labels.largest(), None);
        let (subject, components) = select_largest(&mask);
        assert!(!subject.any());
        assert_eq!(components, 0);
    }

    #[test]
    fn large_single_component_does_not_overflow_the_stack() {
        let mask = Mask::from_fn(1000, 1000, |_, _| true);
        let labels = label(&mask);
        assert_eq!(labels.count(), 1);
        assert_eq!(labels.sizes()[1], 1_000_000);
    }
}
