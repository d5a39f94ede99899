pub mod extract;
pub mod correction;

pub use extract::extract_json;
pub use correction::{parse_with_correction, try_parse, ParseOutcome, MAX_PARSE_CORRECTIONS};
