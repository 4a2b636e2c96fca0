use crate::types::Vehicle;
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

#[derive(Debug, Fail)]
pub enum StoreError {
    #[fail(display = "sqlite error: {}", _0)]
    Sqlite(#[cause] rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Sqlite(e)
    }
}

/// Persistence for vehicle records, keyed by plate.
pub trait VehicleStore {
    fn find_all(&self) -> Result<Vec<Vehicle>, StoreError>;
    fn find_by_id(&self, plate: &str) -> Result<Option<Vehicle>, StoreError>;
    fn exists_by_plate(&self, plate: &str) -> Result<bool, StoreError>;
    /// Inserts or replaces the record with the vehicle's plate.
    fn save(&self, vehicle: &Vehicle) -> Result<Vehicle, StoreError>;
    fn delete_by_id(&self, plate: &str) -> Result<(), StoreError>;
}

pub struct SqliteStore {
    conn: Connection,
}

pub fn open(path: &str) -> Result<SqliteStore, StoreError> {
    let store = SqliteStore::new(Connection::open(path)?)?;
    info!("Opened vehicle database at {}", path);
    Ok(store)
}

#[cfg(test)]
pub fn open_in_memory() -> Result<SqliteStore, StoreError> {
    SqliteStore::new(Connection::open_in_memory()?)
}

impl SqliteStore {
    fn new(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS vehicle (
                plate TEXT NOT NULL PRIMARY KEY,
                kind TEXT NOT NULL,
                color TEXT NOT NULL,
                manufacture_year INTEGER,
                fine_count INTEGER NOT NULL DEFAULT 0 CHECK (fine_count >= 0)
            ) WITHOUT ROWID",
            [],
        )?;
        Ok(SqliteStore { conn })
    }
}

fn vehicle_from_row(row: &Row) -> rusqlite::Result<Vehicle> {
    Ok(Vehicle {
        plate: row.get(0)?,
        kind: row.get(1)?,
        color: row.get(2)?,
        manufacture_year: row.get(3)?,
        fine_count: row.get(4)?,
    })
}

impl VehicleStore for SqliteStore {
    fn find_all(&self) -> Result<Vec<Vehicle>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT plate, kind, color, manufacture_year, fine_count FROM vehicle ORDER BY plate",
        )?;
        let vehicles = stmt
            .query_map([], vehicle_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(vehicles)
    }

    fn find_by_id(&self, plate: &str) -> Result<Option<Vehicle>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT plate, kind, color, manufacture_year, fine_count FROM vehicle WHERE plate = ?1",
                params![plate],
                vehicle_from_row,
            )
            .optional()?)
    }

    fn exists_by_plate(&self, plate: &str) -> Result<bool, StoreError> {
        Ok(self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM vehicle WHERE plate = ?1)",
            params![plate],
            |row| row.get(0),
        )?)
    }

    fn save(&self, vehicle: &Vehicle) -> Result<Vehicle, StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO vehicle(plate, kind, color, manufacture_year, fine_count)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                vehicle.plate,
                vehicle.kind,
                vehicle.color,
                vehicle.manufacture_year,
                vehicle.fine_count
            ],
        )?;
        Ok(vehicle.clone())
    }

    fn delete_by_id(&self, plate: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM vehicle WHERE plate = ?1", params![plate])?;
        Ok(())
    }
}
