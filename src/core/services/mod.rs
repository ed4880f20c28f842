pub mod expense_service;
pub mod provision_service;

pub use expense_service::{AddOutcome, ExpenseService, Report};
pub use provision_service::{ProvisionReport, ProvisionService, ProvisionStep, StepOutcome};
