pub mod category;
pub mod date;
pub mod expense;

pub use category::Category;
pub use date::DateNormalizer;
pub use expense::{Expense, NewExpense};
