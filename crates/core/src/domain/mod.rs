pub mod budget;
pub mod category;
pub mod recommendation;
pub mod transaction;
pub mod user;
