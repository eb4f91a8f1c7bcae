use crate::Error;

const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

// Each view keeps the concrete width so range checks happen on store.

macro_rules! number_mut {
    (
        $(#[$meta:meta])*
        $name:ident($wide:ty) { $($variant:ident($prim:ty)),* $(,)? }
    ) => {
        $(#[$meta])*
        pub enum $name<'a> {
            $($variant(&'a mut $prim),)*
        }

        impl $name<'_> {
            /// Name of the concrete type.
            pub const fn target(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => stringify!($prim),)*
                }
            }

            /// Current value, widened.
            pub fn get(&self) -> $wide {
                match self {
                    $(Self::$variant(v) => **v as $wide,)*
                }
            }
        }

        $(
            impl<'a> From<&'a mut $prim> for $name<'a> {
                #[inline]
                fn from(v: &'a mut $prim) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

number_mut! {
    /// Mutable view of a signed integer.
    IntMut(i64) { I8(i8), I16(i16), I32(i32), I64(i64), Isize(isize) }
}

number_mut! {
    /// Mutable view of an unsigned integer.
    UintMut(u64) { U8(u8), U16(u16), U32(u32), U64(u64), Usize(usize) }
}

number_mut! {
    /// Mutable view of a float.
    FloatMut(f64) { F32(f32), F64(f64) }
}

macro_rules! store_checked {
    ($self:ident, $v:ident, $($variant:ident),*) => {
        match $self {
            $(Self::$variant(slot) => match (*$v).try_into() {
                Ok(n) => {
                    **slot = n;
                    Ok(())
                }
                Err(_) => Err(Error::overflow($v, $self.target())),
            },)*
        }
    };
}

impl IntMut<'_> {
    /// Store a signed value, failing if it does not fit.
    pub fn set_i64(&mut self, v: i64) -> Result<(), Error> {
        let v = &v;
        store_checked!(self, v, I8, I16, I32, I64, Isize)
    }

    /// Store an unsigned value, failing if it does not fit.
    pub fn set_u64(&mut self, v: u64) -> Result<(), Error> {
        let v = &v;
        store_checked!(self, v, I8, I16, I32, I64, Isize)
    }

    /// Store a float that must be integral and in range.
    pub fn set_f64(&mut self, v: f64) -> Result<(), Error> {
        // 2^63 is exactly representable; anything at or above it overflows.
        if v.fract() != 0.0 || !(-TWO_POW_63..TWO_POW_63).contains(&v) {
            return Err(Error::overflow(v, self.target()));
        }
        let n = v as i64;
        self.set_i64(n).map_err(|_| Error::overflow(v, self.target()))
    }
}

impl UintMut<'_> {
    /// Store a signed value, failing if it is negative or does not fit.
    pub fn set_i64(&mut self, v: i64) -> Result<(), Error> {
        let v = &v;
        store_checked!(self, v, U8, U16, U32, U64, Usize)
    }

    /// Store an unsigned value, failing if it does not fit.
    pub fn set_u64(&mut self, v: u64) -> Result<(), Error> {
        let v = &v;
        store_checked!(self, v, U8, U16, U32, U64, Usize)
    }

    /// Store a float that must be integral, non-negative and in range.
    pub fn set_f64(&mut self, v: f64) -> Result<(), Error> {
        if v.fract() != 0.0 || !(0.0..TWO_POW_64).contains(&v) {
            return Err(Error::overflow(v, self.target()));
        }
        let n = v as u64;
        self.set_u64(n).map_err(|_| Error::overflow(v, self.target()))
    }
}

impl FloatMut<'_> {
    /// Store a float. `f32` targets reject finite values beyond their range.
    pub fn set_f64(&mut self, v: f64) -> Result<(), Error> {
        match self {
            Self::F64(slot) => **slot = v,
            Self::F32(slot) => {
                let narrow = v as f32;
                if v.is_finite() && narrow.is_infinite() {
                    return Err(Error::overflow(v, "f32"));
                }
                **slot = narrow;
            }
        }
        Ok(())
    }

    /// Store an integer, failing if it cannot be represented exactly.
    pub fn set_i64(&mut self, v: i64) -> Result<(), Error> {
        let f = v as f64;
        if f as i64 != v || f == TWO_POW_63 {
            return Err(Error::overflow(v, self.target()));
        }
        self.set_exact(f, v)
    }

    /// Store an unsigned integer, failing if it cannot be represented exactly.
    pub fn set_u64(&mut self, v: u64) -> Result<(), Error> {
        let f = v as f64;
        if f as u64 != v || f == TWO_POW_64 {
            return Err(Error::overflow(v, self.target()));
        }
        self.set_exact(f, v)
    }

    fn set_exact(&mut self, f: f64, original: impl core::fmt::Display) -> Result<(), Error> {
        if let Self::F32(slot) = self {
            let narrow = f as f32;
            if f64::from(narrow) != f {
                return Err(Error::overflow(original, "f32"));
            }
            **slot = narrow;
            return Ok(());
        }
        self.set_f64(f)
    }
}

#[cfg(test)]
mod tests {
    use super::{FloatMut, IntMut, UintMut};
    use crate::ErrorKind;

    #[test]
    fn int_range_checks() {
        let mut x = 0_i8;
        assert!(IntMut::from(&mut x).set_i64(-128).is_ok());
        assert_eq!(x, -128);

        let err = IntMut::from(&mut x).set_i64(300).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Overflow { target: "i8", .. }));
        assert_eq!(x, -128);

        assert!(IntMut::from(&mut x).set_u64(u64::MAX).is_err());
        assert!(IntMut::from(&mut x).set_f64(1.5).is_err());
        assert!(IntMut::from(&mut x).set_f64(12.0).is_ok());
        assert_eq!(x, 12);

        let mut big = 0_i64;
        assert!(IntMut::from(&mut big).set_f64(9.3e18).is_err());
    }

    #[test]
    fn uint_rejects_negative() {
        let mut x = 0_u32;
        assert!(UintMut::from(&mut x).set_i64(-1).is_err());
        assert!(UintMut::from(&mut x).set_f64(-0.0).is_ok());
        assert!(UintMut::from(&mut x).set_u64(u64::from(u32::MAX) + 1).is_err());
        assert!(UintMut::from(&mut x).set_u64(7).is_ok());
        assert_eq!(x, 7);
    }

    #[test]
    fn float_exactness() {
        let mut x = 0.0_f32;
        assert!(FloatMut::from(&mut x).set_i64(16_777_217).is_err());
        assert!(FloatMut::from(&mut x).set_i64(16_777_216).is_ok());
        assert!(FloatMut::from(&mut x).set_f64(1e300).is_err());
        assert!(FloatMut::from(&mut x).set_f64(f64::INFINITY).is_ok());
        assert!(x.is_infinite());

        let mut y = 0.0_f64;
        assert!(FloatMut::from(&mut y).set_u64(u64::MAX).is_err());
        assert!(FloatMut::from(&mut y).set_u64(1 << 60).is_ok());
    }
}
