//! Shape views and the container traits behind them.

mod kind;
mod list_ops;
mod map_ops;
mod number;
mod optional_ops;
mod struct_ops;

pub use kind::{BytesMut, ReflectMut, ReflectRef};
pub use list_ops::List;
pub use map_ops::Map;
pub use number::{FloatMut, IntMut, UintMut};
pub use optional_ops::Optional;
pub use struct_ops::{Struct, walk, walk_mut};
