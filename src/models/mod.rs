pub mod finding;
pub mod report;
pub mod attempt;
pub mod verdict;

pub use finding::*;
pub use report::*;
pub use attempt::*;
pub use verdict::*;
