pub mod advice;
pub mod budgets;
pub mod categories;
pub mod market;
pub mod transactions;
pub mod users;
