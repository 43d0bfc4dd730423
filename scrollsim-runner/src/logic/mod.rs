pub mod plan;
pub mod reports;
pub mod seeds;

pub use plan::{PlanRequest, resolve_plan};
pub use reports::RunReport;
pub use seeds::resolve_seed;
