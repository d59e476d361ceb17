//! Statically declared entity schemas.
//!
//! Each persisted entity lists its columns once. Insert statements and the
//! payload fields a caller must supply are derived from that declaration;
//! foreign-key columns are bound separately by the warehouse and never read
//! from record payloads.

/// A single column of a persisted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub foreign_key: bool,
}

impl Column {
    const fn value(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            foreign_key: false,
        }
    }

    const fn foreign(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            foreign_key: true,
        }
    }
}

/// Table name plus its insertable columns (the generated primary key is not listed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    pub table: &'static str,
    pub columns: &'static [Column],
}

impl EntitySchema {
    /// Columns whose values come from record payloads.
    pub fn payload_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns
            .iter()
            .filter(|column| !column.foreign_key)
            .map(|column| column.name)
    }

    /// Columns bound from the owning entity rather than the payload.
    pub fn foreign_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns
            .iter()
            .filter(|column| column.foreign_key)
            .map(|column| column.name)
    }

    /// `INSERT` statement with payload columns first and foreign keys last.
    ///
    /// Every placeholder is cast to its declared type so callers can bind
    /// plain strings and floats.
    pub fn insert_sql(&self) -> String {
        let ordered: Vec<&Column> = self
            .columns
            .iter()
            .filter(|column| !column.foreign_key)
            .chain(self.columns.iter().filter(|column| column.foreign_key))
            .collect();

        let names = ordered
            .iter()
            .map(|column| column.name)
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = ordered
            .iter()
            .map(|column| format!("CAST(? AS {})", column.sql_type))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "INSERT INTO {table} ({names}) VALUES ({placeholders})",
            table = self.table
        )
    }
}

pub const CURRENCIES: EntitySchema = EntitySchema {
    table: "currencies",
    columns: &[Column::value("name", "TEXT")],
};

pub const DAILY_RECORDS: EntitySchema = EntitySchema {
    table: "daily_records",
    columns: &[
        Column::value("date", "DATE"),
        Column::value("open", "DOUBLE"),
        Column::value("high", "DOUBLE"),
        Column::value("low", "DOUBLE"),
        Column::value("close", "DOUBLE"),
        Column::foreign("currency_id", "BIGINT"),
    ],
};
