pub mod decision;
pub mod entities;
pub mod messaging;
pub mod repositories;
pub mod update_value;
pub mod value_objects;

pub use decision::*;
pub use entities::*;
pub use messaging::*;
pub use recurrence_errors::{RecurrenceError, RecurrenceResult};
pub use repositories::*;
pub use update_value::UpdateValue;
pub use value_objects::*;
