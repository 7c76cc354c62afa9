#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod convert;
pub use convert::*;

mod def;
pub use def::*;

mod error;
pub use error::*;

mod node;
pub use node::*;

mod registry;
pub use registry::*;

mod resolve;
pub use resolve::*;

mod ty;
pub use ty::*;

mod value;
pub use value::*;
