//! Cross-store joins and aggregations.
//!
//! Read-only queries built on the entity stores: the car → model → sale
//! join behind `get_car_info`, and the sales-per-model ranking behind
//! `top_models_by_sales`.

use hashbrown::HashMap;

use lotstore_core::LotResult;

use crate::records::{Car, CarFullInfo, Model, ModelSaleStats, Sale};
use crate::store::EntityStore;

/// Ranking length cap for [`top_models`].
const TOP_MODELS_LIMIT: usize = 3;

/// Join a car with its model and, when one exists, its sale.
///
/// Returns `None` when the VIN is unknown or the car's model is missing
/// from the catalog. The sale is resolved by scanning the ledger for the
/// first non-tombstoned sale whose `car_vin` equals the VIN exactly.
pub fn car_full_info(
    models: &EntityStore<Model>,
    cars: &EntityStore<Car>,
    sales: &EntityStore<Sale>,
    vin: &str,
) -> LotResult<Option<CarFullInfo>> {
    let Some(car) = cars.get_by_key(vin)? else {
        return Ok(None);
    };
    let Some(model) = models.get_by_key(&car.model.to_string())? else {
        return Ok(None);
    };

    let sale = sales
        .get_all()?
        .into_iter()
        .find(|sale| sale.car_vin == vin);

    Ok(Some(CarFullInfo {
        vin: car.vin,
        car_model_name: model.name,
        car_model_brand: model.brand,
        price: car.price,
        date_start: car.date_start,
        status: car.status,
        sales_date: sale.as_ref().map(|s| s.sales_date.clone()),
        sales_cost: sale.map(|s| s.cost),
    }))
}

/// Rank models by non-tombstoned sales, at most three rows.
///
/// Ordered by sale count descending, ties broken by model id descending.
/// Models with zero recorded sales never appear; sales whose VIN maps to
/// no known car, and models missing from the catalog, are skipped.
pub fn top_models(
    models: &EntityStore<Model>,
    cars: &EntityStore<Car>,
    sales: &EntityStore<Sale>,
) -> LotResult<Vec<ModelSaleStats>> {
    // Replay the car index against the car file to map VIN -> model id.
    let mut vin_to_model: HashMap<String, i64> = HashMap::new();
    for (_, offset) in cars.entries()? {
        if let Some(car) = cars.read_at(offset)? {
            vin_to_model.insert(car.vin, car.model);
        }
    }

    // Count ledger entries per model id, skipping tombstoned slots.
    let mut counts: HashMap<i64, u64> = HashMap::new();
    for sale in sales.get_all()? {
        if let Some(&model_id) = vin_to_model.get(&sale.car_vin) {
            *counts.entry(model_id).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(i64, u64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
    ranked.truncate(TOP_MODELS_LIMIT);

    let mut stats = Vec::with_capacity(ranked.len());
    for (model_id, count) in ranked {
        if let Some(model) = models.get_by_key(&model_id.to_string())? {
            stats.push(ModelSaleStats {
                car_model_name: model.name,
                brand: model.brand,
                sales_number: count,
            });
        }
    }
    Ok(stats)
}
