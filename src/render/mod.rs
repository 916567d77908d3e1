//! Human-readable renderings of a resolved plan.

pub mod table;

pub use table::render_plan_table;
