use crate::{
    config::{Config, Dialect},
    errors::{ExpenseError, Result},
};

use super::{Row, SqlValue, StorageConnector};

/// Lifecycle of a session. A session only exists once its connection is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Closed,
}

/// An open connection owned by exactly one caller and released on drop.
pub struct Session {
    connector: Box<dyn StorageConnector>,
    state: SessionState,
}

impl Session {
    pub fn open(config: &Config) -> Result<Self> {
        Ok(Self::from_connector(super::connect(config)?))
    }

    pub fn from_connector(connector: Box<dyn StorageConnector>) -> Self {
        Self {
            connector,
            state: SessionState::Open,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn dialect(&self) -> Dialect {
        self.connector.dialect()
    }

    pub fn execute(&mut self, query: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
        self.ensure_open()?;
        self.connector.execute(query, params)
    }

    pub fn create_table(&mut self, table_desc: &str) -> Result<()> {
        self.ensure_open()?;
        self.connector.create_table(table_desc)
    }

    pub fn create_view(&mut self, view_desc: &str) -> Result<()> {
        self.ensure_open()?;
        self.connector.create_view(view_desc)
    }

    /// Closes the session. Closing an already closed session does nothing.
    pub fn close(&mut self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        self.state = SessionState::Closed;
        tracing::debug!(dialect = %self.connector.dialect(), "closing session");
        self.connector.close()
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            SessionState::Open => Ok(()),
            SessionState::Closed => Err(ExpenseError::SessionClosed),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::warn!(error = %err, "failed to release session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, rc::Rc};

    struct FakeConnector {
        closes: Rc<Cell<usize>>,
        fail_close: bool,
    }

    impl StorageConnector for FakeConnector {
        fn dialect(&self) -> Dialect {
            Dialect::Sqlite
        }

        fn connect(_config: &Config) -> Result<Self> {
            unreachable!("constructed directly in tests")
        }

        fn create_database(_config: &Config, _ddl: &str) -> Result<()> {
            Ok(())
        }

        fn run_ddl(&mut self, _sql: &str) -> Result<()> {
            Ok(())
        }

        fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
            Ok(vec![vec![SqlValue::from(sql)]])
        }

        fn query_committed(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
            let mut row = vec![SqlValue::from(sql)];
            row.extend_from_slice(params);
            Ok(vec![row])
        }

        fn close(&mut self) -> Result<()> {
            self.closes.set(self.closes.get() + 1);
            if self.fail_close {
                Err(ExpenseError::Connection("already broken".into()))
            } else {
                Ok(())
            }
        }

        fn is_open(&self) -> bool {
            self.closes.get() == 0
        }
    }

    fn session(fail_close: bool) -> (Session, Rc<Cell<usize>>) {
        let closes = Rc::new(Cell::new(0));
        let connector = FakeConnector {
            closes: Rc::clone(&closes),
            fail_close,
        };
        (Session::from_connector(Box::new(connector)), closes)
    }

    #[test]
    fn execute_translates_and_routes_by_params() {
        let (mut session, _) = session(false);
        let read = session.execute("SELECT * FROM t;", &[]).unwrap();
        assert_eq!(read[0], vec![SqlValue::from("SELECT * FROM t;")]);

        let write = session
            .execute("INSERT INTO t (a) VALUES (%s);", &[SqlValue::Integer(1)])
            .unwrap();
        assert_eq!(
            write[0],
            vec![
                SqlValue::from("INSERT INTO t (a) VALUES (?);"),
                SqlValue::Integer(1)
            ]
        );
    }

    #[test]
    fn close_is_idempotent_and_blocks_further_use() {
        let (mut session, closes) = session(false);
        session.close().unwrap();
        session.close().unwrap();
        assert_eq!(closes.get(), 1);
        assert_eq!(session.state(), SessionState::Closed);
        assert!(matches!(
            session.execute("SELECT 1;", &[]),
            Err(ExpenseError::SessionClosed)
        ));
        drop(session);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn drop_releases_open_session() {
        let (session, closes) = session(false);
        drop(session);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn failed_close_does_not_panic_on_drop() {
        let (mut session, closes) = session(true);
        assert!(session.close().is_err());
        drop(session);
        assert_eq!(closes.get(), 1);
    }
}
