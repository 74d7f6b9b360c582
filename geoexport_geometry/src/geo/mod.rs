mod column_type;
mod geometry_type;
mod properties;
mod value;

pub use column_type::*;
pub use geometry_type::*;
pub use properties::*;
pub use value::*;
