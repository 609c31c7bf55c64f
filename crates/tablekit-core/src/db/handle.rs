use crate::{
    config::{Config, HandleOptions},
    db::{Row, sql},
    error::{ConnectionError, Error, QueryError},
    model::TableSchema,
    obs::{ExecKind, MetricsEvent, sink},
    value::Values,
};
use rusqlite::{Connection, params_from_iter};
use tracing::{debug, info, instrument};

///
/// TableHandle
///
/// Executes CRUD statements for one table over an owned connection.
///
/// The table is created lazily by the first operation that needs it and the
/// `created` latch stays set until `drop_table_if_exists` resets it (when
/// `reset_on_drop` is on). Every statement runs in autocommit, so each call
/// is its own committed unit. `close` is terminal.
///

#[derive(Debug)]
pub struct TableHandle {
    schema: TableSchema,
    conn: Option<Connection>,
    created: bool,
    options: HandleOptions,
}

impl TableHandle {
    /// Open the configured database for `schema`.
    pub fn open(schema: TableSchema, config: &Config) -> Result<Self, Error> {
        let conn = config.database.open()?;
        info!(table = schema.table(), path = %config.database.path.display(), "handle opened");

        Ok(Self::with_connection(schema, conn, config.handle))
    }

    /// Open a private in-memory database with default handle options.
    pub fn open_in_memory(schema: TableSchema) -> Result<Self, Error> {
        Self::open(schema, &Config::in_memory())
    }

    /// Wrap an existing connection. The handle takes ownership and closes it.
    #[must_use]
    pub fn with_connection(
        schema: TableSchema,
        conn: Connection,
        options: HandleOptions,
    ) -> Self {
        Self {
            schema,
            conn: Some(conn),
            created: false,
            options,
        }
    }

    #[must_use]
    pub const fn schema(&self) -> &TableSchema {
        &self.schema
    }

    #[must_use]
    pub fn table(&self) -> &str {
        self.schema.table()
    }

    #[must_use]
    pub const fn options(&self) -> HandleOptions {
        self.options
    }

    #[must_use]
    pub const fn is_created(&self) -> bool {
        self.created
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    ///
    /// DDL
    ///

    /// Create the table if this handle has not done so yet.
    #[instrument(skip_all, fields(table = %self.schema.table()))]
    pub fn ensure_table(&mut self) -> Result<(), Error> {
        let conn = self.conn()?;
        if self.created {
            return Ok(());
        }

        let sql = sql::create_table(&self.schema);
        debug!(%sql, "ensure table");
        conn.execute(&sql, [])?;

        self.created = true;
        sink::record(MetricsEvent::TableCreated {
            table: self.schema.table(),
        });

        Ok(())
    }

    #[instrument(skip_all, fields(table = %self.schema.table()))]
    pub fn drop_table_if_exists(&mut self) -> Result<(), Error> {
        let conn = self.conn()?;

        let sql = sql::drop_table(&self.schema);
        debug!(%sql, "drop table");
        conn.execute(&sql, [])?;

        if self.options.reset_on_drop {
            self.created = false;
        }
        sink::record(MetricsEvent::TableDropped {
            table: self.schema.table(),
        });
        info!(reset = self.options.reset_on_drop, "table dropped");

        Ok(())
    }

    ///
    /// DML
    ///

    /// Insert one row and return its rowid. Unsupplied fields with a declared
    /// default are bound to that default.
    #[instrument(skip_all, fields(table = %self.schema.table()))]
    pub fn insert(&mut self, values: &Values) -> Result<i64, Error> {
        self.ensure_table()?;

        let stmt = sql::insert(&self.schema, values)?;
        let conn = self.conn()?;
        debug!(sql = %stmt.sql, params = stmt.params.len(), "insert");
        let rows = conn.execute(&stmt.sql, params_from_iter(stmt.params.iter()))?;
        let rowid = conn.last_insert_rowid();

        self.record_exec(ExecKind::Insert, rows);

        Ok(rowid)
    }

    /// Delete the rows matching every filter and return how many went.
    #[instrument(skip_all, fields(table = %self.schema.table()))]
    pub fn delete(&mut self, filters: &Values) -> Result<usize, Error> {
        self.ensure_table()?;

        if filters.is_empty() && self.options.strict_deletes {
            return Err(QueryError::UnfilteredDelete {
                table: self.schema.table().to_string(),
            }
            .into());
        }

        self.exec_delete(filters)
    }

    /// Delete every row in the table.
    #[instrument(skip_all, fields(table = %self.schema.table()))]
    pub fn delete_all(&mut self) -> Result<usize, Error> {
        self.ensure_table()?;

        self.exec_delete(&Values::new())
    }

    /// Assign `values` on the rows matching every filter. Zero matches is
    /// not an error.
    #[instrument(skip_all, fields(table = %self.schema.table()))]
    pub fn update(&mut self, filters: &Values, values: &Values) -> Result<usize, Error> {
        self.ensure_table()?;

        let table = || self.schema.table().to_string();
        if values.is_empty() {
            return Err(QueryError::EmptyAssignment { table: table() }.into());
        }
        if filters.is_empty() && self.options.strict_deletes {
            return Err(QueryError::UnfilteredUpdate { table: table() }.into());
        }

        let stmt = sql::update(&self.schema, filters, values)?;
        debug!(sql = %stmt.sql, params = stmt.params.len(), "update");
        let rows = self
            .conn()?
            .execute(&stmt.sql, params_from_iter(stmt.params.iter()))?;

        self.record_exec(ExecKind::Update, rows);

        Ok(rows)
    }

    ///
    /// READ
    ///

    /// Rows matching every filter, in rowid order.
    #[instrument(skip_all, fields(table = %self.schema.table()))]
    pub fn select(&mut self, filters: &Values) -> Result<Vec<Row>, Error> {
        self.ensure_table()?;

        let stmt = sql::select(&self.schema, filters)?;
        debug!(sql = %stmt.sql, params = stmt.params.len(), "select");

        let mut prepared = self.conn()?.prepare(&stmt.sql)?;
        let columns: Vec<String> = prepared
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let rows = prepared
            .query_map(params_from_iter(stmt.params.iter()), |row| {
                Row::from_sql(&columns, row)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        drop(prepared);

        self.record_exec(ExecKind::Select, rows.len());

        Ok(rows)
    }

    /// Number of rows matching every filter.
    #[instrument(skip_all, fields(table = %self.schema.table()))]
    pub fn count(&mut self, filters: &Values) -> Result<u64, Error> {
        self.ensure_table()?;

        let stmt = sql::count(&self.schema, filters)?;
        debug!(sql = %stmt.sql, params = stmt.params.len(), "count");
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            &stmt.sql,
            params_from_iter(stmt.params.iter()),
            |row| row.get(0),
        )?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    ///
    /// LIFECYCLE
    ///

    /// Close the connection. Terminal: every later call, including another
    /// `close`, fails with `ConnectionError::Closed`.
    #[instrument(skip_all, fields(table = %self.schema.table()))]
    pub fn close(&mut self) -> Result<(), Error> {
        let conn = self.conn.take().ok_or_else(|| self.closed())?;

        if let Err((conn, err)) = conn.close() {
            self.conn = Some(conn);
            return Err(err.into());
        }

        sink::record(MetricsEvent::HandleClosed {
            table: self.schema.table(),
        });
        info!("handle closed");

        Ok(())
    }

    /// Alias for [`close`](Self::close); every prior call is already committed.
    pub fn save_changes(&mut self) -> Result<(), Error> {
        self.close()
    }

    ///
    /// HELPERS
    ///

    fn conn(&self) -> Result<&Connection, ConnectionError> {
        self.conn.as_ref().ok_or_else(|| self.closed())
    }

    fn closed(&self) -> ConnectionError {
        ConnectionError::Closed {
            table: self.schema.table().to_string(),
        }
    }

    fn exec_delete(&self, filters: &Values) -> Result<usize, Error> {
        let stmt = sql::delete(&self.schema, filters)?;
        debug!(sql = %stmt.sql, params = stmt.params.len(), "delete");
        let rows = self
            .conn()?
            .execute(&stmt.sql, params_from_iter(stmt.params.iter()))?;

        self.record_exec(ExecKind::Delete, rows);

        Ok(rows)
    }

    fn record_exec(&self, kind: ExecKind, rows: usize) {
        sink::record(MetricsEvent::Exec {
            kind,
            table: self.schema.table(),
            rows: u64::try_from(rows).unwrap_or(u64::MAX),
        });
    }
}

///
/// TESTS
///
