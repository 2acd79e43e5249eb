mod converter;
mod error;
mod namespace;
mod session;
pub mod shape;
mod signature;
mod target;
mod value;

pub use converter::{Converter, Converters, to_bool};
pub use error::{Error, Result};
pub use namespace::{Export, Namespace};
pub use session::{Scope, Session};
pub use shape::{MissingTypeHint, TypeShape, classify};
pub use signature::{EXCLUDED_PARAMETERS, Parameter, Signature};
pub use target::{Arguments, Bindable, Partial, Target};
pub use value::{Annotation, FromValue, Value};
