pub mod cv_record;

pub use cv_record::{CvField, CvRecord, InputKind, UnknownField};
