/*!
Concrete operators (§4.5–§4.9): `Scan`, `Select`, `Join`, `Project`, `SumAggregate`.

 */

pub mod join;

pub mod project;

pub mod scan;

pub mod select;

pub mod sum_aggregate;

pub use join::Join;
pub use project::Project;
pub use scan::Scan;
pub use select::Select;
pub use sum_aggregate::SumAggregate;
