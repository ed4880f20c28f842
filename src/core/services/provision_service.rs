//! One-shot creation of the database and its relations.

use std::fmt;

use crate::{
    config::Config,
    errors::{ExpenseError, Result},
    storage::{
        self,
        schema::{self, RelationKind},
        Session,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    /// The step was not applied; the reason is kept for reporting.
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionStep {
    pub target: String,
    pub outcome: StepOutcome,
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            StepOutcome::Done => write!(f, "created {}", self.target),
            StepOutcome::Skipped(reason) => write!(f, "skipped {}: {reason}", self.target),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub steps: Vec<ProvisionStep>,
}

impl ProvisionReport {
    fn record(&mut self, target: impl Into<String>, outcome: StepOutcome) {
        self.steps.push(ProvisionStep {
            target: target.into(),
            outcome,
        });
    }

    pub fn created(&self) -> impl Iterator<Item = &ProvisionStep> {
        self.steps
            .iter()
            .filter(|step| step.outcome == StepOutcome::Done)
    }
}

pub struct ProvisionService;

impl ProvisionService {
    /// Creates the database, then every relation of the configured layout.
    ///
    /// A database that cannot be created is reported and provisioning moves on
    /// to the relations; relations that already exist are skipped. Connection
    /// failures after that point abort.
    pub fn provision(config: &Config) -> Result<ProvisionReport> {
        let mut report = ProvisionReport::default();

        let ddl = schema::create_database_ddl(config)?;
        if ddl.is_empty() {
            tracing::debug!(dialect = %config.dialect, "database is created on first connect");
        } else {
            let database = config.database_name()?.to_string();
            match storage::create_database(config, &ddl) {
                Ok(()) => report.record(database, StepOutcome::Done),
                Err(err) => {
                    tracing::warn!(error = %err, "database was not created");
                    report.record(database, StepOutcome::Skipped(err.to_string()));
                }
            }
        }

        let mut session = Session::open(config)?;
        let relations = create_relations(&mut session, config)?;
        report.steps.extend(relations.steps);
        session.close()?;
        Ok(report)
    }
}

/// Creates the layout's relations on an open session, skipping existing ones.
pub fn create_relations(session: &mut Session, config: &Config) -> Result<ProvisionReport> {
    let mut report = ProvisionReport::default();
    for relation in schema::relations(config.dialect, config.layout, &config.table) {
        let created = match relation.kind {
            RelationKind::Table => session.create_table(&relation.description),
            RelationKind::View => session.create_view(&relation.description),
        };
        match created {
            Ok(()) => {
                tracing::info!(relation = %relation.name, "relation created");
                report.record(relation.name, StepOutcome::Done);
            }
            Err(ExpenseError::TableAlreadyExists(message)) => {
                tracing::warn!(relation = %relation.name, "relation already exists, skipping");
                report.record(relation.name, StepOutcome::Skipped(message));
            }
            Err(err) => return Err(err),
        }
    }
    Ok(report)
}
