//! The dealership service facade.
//!
//! `DealerService` is the complete external boundary: eight operations
//! over three entity stores under one root directory. Any surrounding
//! application (HTTP layer, CLI, ...) supplies the root path and
//! translates its requests into these calls.

use std::path::Path;

use lotstore_core::{LotError, LotResult};

use crate::config::Config;
use crate::query;
use crate::records::{Car, CarFullInfo, CarStatus, Model, ModelSaleStats, Sale};
use crate::store::EntityStore;

/// Dealership storage service over one root directory.
///
/// Files under the root: `models.txt`/`models_index.txt`,
/// `cars.txt`/`cars_index.txt`, `sales.txt`/`sales_index.txt`.
///
/// Multi-step operations (`sell_car`, `revert_sale`) are two separate
/// writes with no transaction boundary across stores: if the process dies
/// between the ledger write and the inventory rewrite, the two files can
/// diverge. That limitation is inherited from the on-disk design.
pub struct DealerService {
    config: Config,
    models: EntityStore<Model>,
    cars: EntityStore<Car>,
    sales: EntityStore<Sale>,
}

impl DealerService {
    /// Open a dealership store rooted at `config.root_dir`, creating the
    /// directory if needed. Record files appear lazily on first append.
    pub fn open(config: Config) -> LotResult<Self> {
        config.validate()?;

        std::fs::create_dir_all(config.root()).map_err(|e| LotError::Io {
            path: Some(config.root().to_path_buf()),
            kind: e.kind(),
            message: format!("Failed to create root directory: {}", e),
        })?;

        let strict = config.strict_unique_keys;
        tracing::debug!(
            "Opening dealership store at {} (strict_unique_keys: {})",
            config.root().display(),
            strict
        );

        Ok(Self {
            models: EntityStore::open(config.root(), strict),
            cars: EntityStore::open(config.root(), strict),
            sales: EntityStore::open(config.root(), strict),
            config,
        })
    }

    /// Root directory this service stores under.
    pub fn root(&self) -> &Path {
        self.config.root()
    }

    /// Append a model to the catalog.
    pub fn add_model(&self, model: &Model) -> LotResult<()> {
        let offset = self.models.add(model)?;
        tracing::debug!("Added model {} at offset {}", model.id, offset);
        Ok(())
    }

    /// Append a car to the inventory.
    pub fn add_car(&self, car: &Car) -> LotResult<()> {
        let offset = self.cars.add(car)?;
        tracing::debug!("Added car {} at offset {}", car.vin, offset);
        Ok(())
    }

    /// Record a sale and mark the sold car.
    ///
    /// Appends the sale to the ledger, then resolves `sale.car_vin` by
    /// exact lookup, flips the car to `sold`, and rewrites it in place.
    /// Fails with `NotFound` if the VIN is unknown; note the ledger entry
    /// has already been appended by then. Whether the car was already sold
    /// is not checked; a double sale appends a second ledger entry.
    pub fn sell_car(&self, sale: &Sale) -> LotResult<Car> {
        self.sales.add(sale)?;

        let car = self
            .cars
            .update_by_key(&sale.car_vin, |car| car.status = CarStatus::Sold)?;
        tracing::info!("Sold car {} (sale {})", car.vin, sale.sales_number);
        Ok(car)
    }

    /// Every car in insertion order, optionally filtered by status.
    pub fn get_cars(&self, status: Option<CarStatus>) -> LotResult<Vec<Car>> {
        let mut cars = self.cars.get_all()?;
        if let Some(status) = status {
            cars.retain(|car| car.status == status);
        }
        Ok(cars)
    }

    /// Full projection for one VIN: car joined with its model and, when
    /// the car has a non-reverted sale, that sale's date and cost.
    ///
    /// `None` when the VIN is unknown or the car's model is missing from
    /// the catalog.
    pub fn get_car_info(&self, vin: &str) -> LotResult<Option<CarFullInfo>> {
        query::car_full_info(&self.models, &self.cars, &self.sales, vin)
    }

    /// Change a car's VIN in place.
    ///
    /// The record keeps its slot offset; the car index is rebuilt sorted
    /// ascending by VIN and rewritten whole. Fails with `NotFound` if the
    /// old VIN is unknown.
    pub fn update_vin(&self, vin: &str, new_vin: &str) -> LotResult<Car> {
        let car = self.cars.rekey(vin, |car| car.vin = new_vin.to_string())?;
        tracing::info!("Updated VIN {} -> {}", vin, new_vin);
        Ok(car)
    }

    /// Void a sale and put its car back on the lot.
    ///
    /// Reads the sale (for its `car_vin`), tombstones its ledger slot,
    /// then flips the car back to `available` and rewrites it in place.
    /// Fails with `NotFound` for an unknown sale number, for a sale that
    /// was already reverted, or for a sale whose car is unindexed.
    pub fn revert_sale(&self, sales_number: &str) -> LotResult<Car> {
        let sale = self.sales.tombstone_by_key(sales_number)?;

        let car = self
            .cars
            .update_by_key(&sale.car_vin, |car| car.status = CarStatus::Available)?;
        tracing::info!("Reverted sale {} for car {}", sales_number, car.vin);
        Ok(car)
    }

    /// The top three models by non-reverted sales, ordered by sale count
    /// descending with ties broken by model id descending.
    pub fn top_models_by_sales(&self) -> LotResult<Vec<ModelSaleStats>> {
        query::top_models(&self.models, &self.cars, &self.sales)
    }
}

impl std::fmt::Debug for DealerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DealerService")
            .field("root", &self.config.root())
            .field("strict_unique_keys", &self.config.strict_unique_keys)
            .finish()
    }
}
