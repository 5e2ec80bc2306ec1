/// A primitive numeric coordinate.
///
/// Every integer and float type converts with an `as` cast; 64- and 128-bit
/// integers round to the nearest representable `f64`.
pub trait Coord: Copy {
    fn to_f64(self) -> f64;
}

macro_rules! impl_coord {
    ($($t:ty),*) => {
        $(
            impl Coord for $t {
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_coord!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// A fixed-dimension point with numeric coordinates readable as `f64`.
///
/// Implemented for slices, vectors and arrays of any [`Coord`] type.
pub trait Point {
    /// Number of coordinates the point exposes.
    fn dim(&self) -> usize;

    /// Returns coordinate `axis` as `f64`.
    ///
    /// # Panics
    /// Panics if `axis >= self.dim()`.
    fn coord(&self, axis: usize) -> f64;
}

impl<C: Coord> Point for [C] {
    fn dim(&self) -> usize {
        self.len()
    }

    fn coord(&self, axis: usize) -> f64 {
        self[axis].to_f64()
    }
}

impl<C: Coord> Point for Vec<C> {
    fn dim(&self) -> usize {
        self.len()
    }

    fn coord(&self, axis: usize) -> f64 {
        self[axis].to_f64()
    }
}

impl<C: Coord, const N: usize> Point for [C; N] {
    fn dim(&self) -> usize {
        N
    }

    fn coord(&self, axis: usize) -> f64 {
        self[axis].to_f64()
    }
}

impl<P: Point + ?Sized> Point for &P {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn coord(&self, axis: usize) -> f64 {
        (**self).coord(axis)
    }
}

/// Copies the first `dim` coordinates of `p` into `out` as `f64`.
pub(crate) fn extend_coords<P: Point + ?Sized>(out: &mut Vec<f64>, p: &P, dim: usize) {
    out.extend((0..dim).map(|axis| p.coord(axis)));
}
