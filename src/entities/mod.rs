pub mod credit_transactions;
pub mod disposition_records;
pub mod draw_records;
pub mod offerings;
pub mod outcomes;
pub mod players;
pub mod slots;

pub use credit_transactions as credit_transaction_entity;
pub use disposition_records as disposition_record_entity;
pub use draw_records as draw_record_entity;
pub use offerings as offering_entity;
pub use outcomes as outcome_entity;
pub use players as player_entity;
pub use slots as slot_entity;

pub use disposition_records::{DispositionKind, DispositionStatus};
pub use offerings::{DrawMode, OfferingStatus};
