//! On-demand synthesis of query operators over borrowed views.
//!
//! A host program calls operators such as `Where`, `Select` or `Count` on
//! `Span<T>`/`ReadOnlySpan<T>` values. None of them exist up front. The
//! generator scans the program through a [`ProgramImage`], finds the calls
//! that fail to resolve, and synthesizes exactly the extension functions
//! and wrapper types those calls need, round by round, until the program
//! stops changing.
//!
//! ```text
//! ProgramImage --scan--> candidates --driver--> Assembly --snapshot--> SyntheticUnit
//!                                     |   ^                                |
//!                                     v   |                                v
//!                                 synth::generate                     emit (text)
//! ```

pub mod config;
pub mod driver;
pub mod emit;
pub mod error;
pub mod host;
pub mod ir;
pub mod method;
pub mod request;
pub mod scan;
pub mod shape;
pub mod synth;
pub mod unit;

pub use config::{EmitConfig, GeneratorConfig};
pub use driver::{run, Generator};
pub use error::QueryError;
pub use host::{CallSite, ProgramImage, Symbol};
pub use method::Method;
pub use request::SynthesisRequest;
pub use shape::Shape;
pub use unit::{ArgShape, Assembly, GeneratedUnit, RunStats, SyntheticUnit};
