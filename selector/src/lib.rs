// Licensed under the MIT license
// (see LICENSE or <http://opensource.org/licenses/MIT>) All files in the project carrying such
//! > selector exposes command-line flags derived from the parameters of functions and structs, instead of declaring each flag by hand. It registers one clap option per parameter, parses the command line and hands back a partially-bound invocation of the target, ready to be called.
//!
//! # How it works
//!
//! 1- Describe a target: derive [`Bindable`] on a struct, load a signature from a TOML file, or build one by hand.
//!
//! ```
//! use selector::Bindable;
//!
//! #[derive(Bindable)]
//! struct Sgd {
//!     /// Learning rate
//!     #[bindable(default = "0.01")]
//!     lr: f64,
//!     momentum: Option<f64>,
//! }
//! ```
//!
//! 2- Bind it: every parameter becomes a `--flag`, grouped under the name you give the target. Flags that belong to no registered target are ignored, so several targets can share one command line.
//!
//! ```
//! # use selector::Bindable;
//! # #[derive(Bindable)]
//! # struct Sgd {
//! #     #[bindable(default = "0.01")]
//! #     lr: f64,
//! #     momentum: Option<f64>,
//! # }
//! use selector::{Session, Target};
//!
//! let mut session = Session::new("train");
//! let sgd = session
//!     .with_args(["--momentum", "0.9", "--epochs", "10"])
//!     .bind("sgd", Target::<Sgd>::of())
//!     .unwrap();
//!
//! let sgd = sgd.call().unwrap();
//! assert_eq!(sgd.lr, 0.01);
//! assert_eq!(sgd.momentum, Some(0.9));
//! ```
//!
//! 3- Select among alternatives: [`Scope::select`] registers `--name` to pick one candidate by its name and only exposes the parameters of the chosen one. [`Scope::scan`] collects the candidates from a [`Namespace`].
//!
//! ```
//! use selector::{Session, Signature, Target};
//!
//! let relu = Target::new("Relu", Signature::new(), |_| Ok(0.0));
//! let leaky = Target::new("LeakyRelu", Signature::new().param::<f64>("slope"), |args| {
//!     args.get::<f64>("slope")
//! });
//!
//! let mut session = Session::new("train");
//! let activation = session
//!     .with_args(["--activation", "LeakyRelu", "--slope", "0.2"])
//!     .select("activation", [relu, leaky])
//!     .unwrap();
//! assert_eq!(activation.call().unwrap(), 0.2);
//! ```
//!
//! Boolean flags take `true` or `false` in any case, list parameters (`Vec<T>`) repeat their flag, and `Option<T>` parameters stay unbound when their flag is absent. Without [`Session::with_args`] every operation reads the process arguments.
//!
//! ```text
//!
//! Usage: train [OPTIONS]
//!
//! sgd:
//!       --lr <lr>              Learning rate [default: 0.01]
//!       --momentum <momentum>
//! ```
pub use selector_core::*;
pub use selector_derive::Bindable;
