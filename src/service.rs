use crate::db::{StoreError, VehicleStore};
use crate::types::Vehicle;
use log::error;

#[derive(Debug, Fail)]
pub enum ServiceError {
    #[fail(display = "vehicle with plate {} is already registered", _0)]
    AlreadyExists(String),
    #[fail(display = "vehicle with plate {} is not registered", _0)]
    NotFound(String),
    #[fail(
        display = "vehicle with plate {} has outstanding fines and cannot be deleted",
        _0
    )]
    HasFines(String),
    #[fail(display = "vehicle with plate {} cannot hold more fines", _0)]
    FineLimit(String),
    #[fail(display = "{}", _0)]
    Storage(#[cause] StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::Storage(e)
    }
}

pub struct VehicleService<S> {
    store: S,
}

impl<S: VehicleStore> VehicleService<S> {
    pub fn new(store: S) -> Self {
        VehicleService { store }
    }

    pub fn list_all(&self) -> Result<Vec<Vehicle>, ServiceError> {
        Ok(self.store.find_all()?)
    }

    /// Returns a one-element list with the vehicle registered under `plate`.
    pub fn find_by_plate(&self, plate: &str) -> Result<Vec<Vehicle>, ServiceError> {
        let vehicle = self
            .store
            .find_by_id(plate)?
            .ok_or_else(|| ServiceError::NotFound(plate.to_string()))?;
        Ok(vec![vehicle])
    }

    /// Registers a new vehicle. Any fine count supplied by the caller is reset to zero.
    pub fn create(&self, mut vehicle: Vehicle) -> Result<Vehicle, ServiceError> {
        if self.store.exists_by_plate(&vehicle.plate)? {
            error!(
                "Vehicle not registered: plate {} is already registered",
                vehicle.plate
            );
            return Err(ServiceError::AlreadyExists(vehicle.plate));
        }
        vehicle.fine_count = 0;
        Ok(self.store.save(&vehicle)?)
    }

    pub fn delete(&self, plate: &str) -> Result<(), ServiceError> {
        if !self.store.exists_by_plate(plate)? {
            error!("Vehicle with plate {} does not exist, nothing deleted", plate);
            return Err(ServiceError::NotFound(plate.to_string()));
        }
        // Another writer sharing the store may have removed it since.
        let vehicle = self
            .store
            .find_by_id(plate)?
            .ok_or_else(|| ServiceError::NotFound(plate.to_string()))?;
        if vehicle.fine_count != 0 {
            error!(
                "Vehicle with plate {} not deleted: {} fine(s) on record",
                plate, vehicle.fine_count
            );
            return Err(ServiceError::HasFines(plate.to_string()));
        }
        self.store.delete_by_id(plate)?;
        Ok(())
    }

    pub fn add_fine(&self, plate: &str) -> Result<Vehicle, ServiceError> {
        let mut vehicle = self
            .store
            .find_by_id(plate)?
            .ok_or_else(|| ServiceError::NotFound(plate.to_string()))?;
        vehicle.fine_count = match vehicle.fine_count.checked_add(1) {
            Some(count) => count,
            None => {
                error!("Vehicle with plate {} already has the maximum number of fines", plate);
                return Err(ServiceError::FineLimit(plate.to_string()));
            }
        };
        Ok(self.store.save(&vehicle)?)
    }
}
