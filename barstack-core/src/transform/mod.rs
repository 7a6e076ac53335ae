//! Frame transforms, in the order the pipeline applies them

pub mod window;
pub mod normalize;
pub mod features;
pub mod validate;
pub mod aggregate;
pub mod merge;

pub use window::filter_year;
pub use normalize::{normalize_columns, normalize_name, titlecase_column};
pub use features::add_derived;
pub use validate::drop_negative_rows;
pub use aggregate::aggregate_daily;
pub use merge::merge_aggregates;
