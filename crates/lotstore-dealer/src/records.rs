//! Dealership record types and their serialization contract.
//!
//! Each entity serializes to a single compact JSON line which is what a
//! record file slot holds. The [`Record`] trait is the seam between the
//! typed world and lotstore-core's string-level slot files: it names the
//! entity's files, exposes its natural key, and provides the line codec
//! once for every serde-capable type.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use lotstore_core::{LotError, LotResult};

/// A typed entity that lives in one record file + one index file.
pub trait Record: Serialize + DeserializeOwned {
    /// Entity kind name, used in errors and diagnostics.
    const ENTITY: &'static str;
    /// Record file name under the configured root directory.
    const STORE_FILE: &'static str;
    /// Index file name under the configured root directory.
    const INDEX_FILE: &'static str;

    /// The natural key this entity is indexed by.
    fn key(&self) -> String;

    /// Serialize to one record line (compact JSON).
    fn to_line(&self) -> LotResult<String> {
        serde_json::to_string(self).map_err(|e| LotError::Codec {
            entity: Self::ENTITY,
            reason: e.to_string(),
        })
    }

    /// Deserialize from one record line.
    fn from_line(line: &str) -> LotResult<Self> {
        serde_json::from_str(line).map_err(|e| LotError::Codec {
            entity: Self::ENTITY,
            reason: e.to_string(),
        })
    }
}

/// Whether a car is still on the lot or already sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarStatus {
    Available,
    Sold,
}

/// A vehicle model in the catalog. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: i64,
    pub name: String,
    pub brand: String,
}

impl Record for Model {
    const ENTITY: &'static str = "model";
    const STORE_FILE: &'static str = "models.txt";
    const INDEX_FILE: &'static str = "models_index.txt";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

/// A car in the inventory. `status` and `vin` are mutable in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub vin: String,
    /// Foreign key into the model catalog.
    pub model: i64,
    pub price: i64,
    /// ISO-8601 date the car entered the lot.
    pub date_start: String,
    pub status: CarStatus,
}

impl Record for Car {
    const ENTITY: &'static str = "car";
    const STORE_FILE: &'static str = "cars.txt";
    const INDEX_FILE: &'static str = "cars_index.txt";

    fn key(&self) -> String {
        self.vin.clone()
    }
}

/// A sale in the ledger. Created by append, voided only by tombstoning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub sales_number: String,
    /// Foreign key into the car inventory.
    pub car_vin: String,
    /// ISO-8601 date of the sale.
    pub sales_date: String,
    pub cost: i64,
}

impl Record for Sale {
    const ENTITY: &'static str = "sale";
    const STORE_FILE: &'static str = "sales.txt";
    const INDEX_FILE: &'static str = "sales_index.txt";

    fn key(&self) -> String {
        self.sales_number.clone()
    }
}

/// Read-only projection joining a car with its model and optional sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarFullInfo {
    pub vin: String,
    pub car_model_name: String,
    pub car_model_brand: String,
    pub price: i64,
    pub date_start: String,
    pub status: CarStatus,
    /// Absent while the car is unsold.
    pub sales_date: Option<String>,
    /// Absent while the car is unsold.
    pub sales_cost: Option<i64>,
}

/// One row of the top-selling-models ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSaleStats {
    pub car_model_name: String,
    pub brand: String,
    /// Count of non-tombstoned sales for this model.
    pub sales_number: u64,
}
