//! Rounding divisions used to translate bounds through affine views.

pub(crate) trait NumExt {
    /// Division with rounding up.
    fn div_ceil(self, other: Self) -> Self;

    /// Division with rounding down.
    ///
    /// Note this is different from truncating, which is rounding toward zero.
    fn div_floor(self, other: Self) -> Self;
}

macro_rules! impl_num_ext {
    ($($int:ty),*) => {$(
        impl NumExt for $int {
            fn div_ceil(self, other: Self) -> Self {
                let d = self / other;
                let r = self % other;
                if (r > 0 && other > 0) || (r < 0 && other < 0) {
                    d + 1
                } else {
                    d
                }
            }

            fn div_floor(self, other: Self) -> Self {
                let d = self / other;
                let r = self % other;
                if (r > 0 && other < 0) || (r < 0 && other > 0) {
                    d - 1
                } else {
                    d
                }
            }
        }
    )*};
}

impl_num_ext!(i32, i64);

#[cfg(test)]
mod tests {
    use super::NumExt;

    #[test]
    fn rounding_follows_the_sign_of_the_quotient() {
        assert_eq!(2, <i32 as NumExt>::div_ceil(3, 2));
        assert_eq!(1, <i32 as NumExt>::div_floor(3, 2));
        assert_eq!(-1, <i32 as NumExt>::div_ceil(-3, 2));
        assert_eq!(-2, <i32 as NumExt>::div_floor(-3, 2));
        assert_eq!(-1, <i32 as NumExt>::div_ceil(3, -2));
        assert_eq!(-2, <i32 as NumExt>::div_floor(3, -2));
    }

    #[test]
    fn exact_divisions_are_not_rounded() {
        assert_eq!(-3, <i32 as NumExt>::div_ceil(6, -2));
        assert_eq!(-3, <i32 as NumExt>::div_floor(6, -2));
        assert_eq!(-3, <i64 as NumExt>::div_ceil(-6, 2));
    }
}
