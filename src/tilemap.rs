/// A dense 2D grid stored row-major (`y * width + x`).
///
/// Unlike a planetary map this grid has hard edges: nothing wraps, and
/// neighbour queries simply omit cells that fall outside the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Fill the entire map with a value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Tilemap<T> {
    /// Wrap an existing row-major buffer. Returns `None` if the length does not match.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Option<Self> {
        (data.len() == width * height).then_some(Self { width, height, data })
    }

    /// Build a map by evaluating `f` for every coordinate in row-major order.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) outside tilemap");
        y * self.width + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Whether signed coordinates fall inside the grid.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Bounds-checked access with signed coordinates.
    pub fn get_checked(&self, x: i32, y: i32) -> Option<&T> {
        self.contains(x, y).then(|| self.get(x as usize, y as usize))
    }

    /// Get the in-bounds 4-connected neighbours in N, E, S, W order.
    pub fn neighbors(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let mut result = Vec::with_capacity(4);

        if y > 0 {
            result.push((x, y - 1));
        }
        if x + 1 < self.width {
            result.push((x + 1, y));
        }
        if y + 1 < self.height {
            result.push((x, y + 1));
        }
        if x > 0 {
            result.push((x - 1, y));
        }

        result
    }

    /// Get the in-bounds 8-connected neighbours, row by row.
    pub fn neighbors_8(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let mut result = Vec::with_capacity(8);

        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }

                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if self.contains(nx, ny) {
                    result.push((nx as usize, ny as usize));
                }
            }
        }

        result
    }

    /// Whether a cell lies on the outermost ring of the grid.
    pub fn is_border(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 == self.width || y + 1 == self.height
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| (idx % width, idx / width, val))
    }

    /// Iterate mutably over all cells with their coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut T)> {
        let width = self.width;
        self.data
            .iter_mut()
            .enumerate()
            .map(move |(idx, val)| (idx % width, idx / width, val))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_layout() {
        let map = Tilemap::from_fn(3, 2, |x, y| y * 10 + x);
        assert_eq!(map.as_slice(), &[0, 1, 2, 10, 11, 12]);
        assert_eq!(*map.get(2, 1), 12);
    }

    #[test]
    fn test_neighbors_do_not_wrap() {
        let map = Tilemap::new_with(4, 4, 0u8);
        assert_eq!(map.neighbors(0, 0), vec![(1, 0), (0, 1)]);
        assert_eq!(map.neighbors_8(0, 0).len(), 3);
        assert_eq!(map.neighbors_8(2, 2).len(), 8);
    }

    #[test]
    fn test_checked_access() {
        let map = Tilemap::new_with(2, 2, 7u8);
        assert_eq!(map.get_checked(1, 1), Some(&7));
        assert_eq!(map.get_checked(-1, 0), None);
        assert_eq!(map.get_checked(0, 2), None);
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        assert!(Tilemap::from_vec(2, 2, vec![0; 3]).is_none());
        assert!(Tilemap::from_vec(2, 2, vec![0; 4]).is_some());
    }

    #[test]
    fn test_border_ring() {
        let map = Tilemap::new_with(5, 5, ());
        assert!(map.is_border(0, 3));
        assert!(map.is_border(4, 4));
        assert!(!map.is_border(2, 2));
    }
}
