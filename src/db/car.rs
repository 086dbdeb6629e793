//! Car model and repository for CARLOT.
//!
//! The listing page only reads rows; there is no car CRUD beyond that.

use sqlx::SqlitePool;

use crate::{CarlotError, Result};

/// A car in the garage listing.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Car {
    /// Unique car ID.
    pub id: i64,
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Model year.
    pub year: i64,
    /// Asking price in whole currency units.
    pub price: i64,
    /// Listing creation timestamp.
    pub created_at: String,
}

/// Data for adding a car to the listing.
#[derive(Debug, Clone)]
pub struct NewCar {
    pub make: String,
    pub model: String,
    pub year: i64,
    pub price: i64,
}

impl NewCar {
    pub fn new(make: impl Into<String>, model: impl Into<String>, year: i64, price: i64) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            year,
            price,
        }
    }
}

/// Repository for car listing queries.
pub struct CarRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CarRepository<'a> {
    /// Create a new CarRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all cars, newest first.
    pub async fn list_all(&self) -> Result<Vec<Car>> {
        let cars = sqlx::query_as::<_, Car>(
            "SELECT id, make, model, year, price, created_at
             FROM cars ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| CarlotError::Database(e.to_string()))?;

        Ok(cars)
    }

    /// Add a car to the listing.
    pub async fn create(&self, new_car: &NewCar) -> Result<Car> {
        let result = sqlx::query("INSERT INTO cars (make, model, year, price) VALUES (?, ?, ?, ?)")
            .bind(&new_car.make)
            .bind(&new_car.model)
            .bind(new_car.year)
            .bind(new_car.price)
            .execute(self.pool)
            .await
            .map_err(|e| CarlotError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        let car = sqlx::query_as::<_, Car>(
            "SELECT id, make, model, year, price, created_at FROM cars WHERE id = ?",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| CarlotError::Database(e.to_string()))?;

        Ok(car)
    }

    /// Count all cars.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cars")
            .fetch_one(self.pool)
            .await
            .map_err(|e| CarlotError::Database(e.to_string()))?;
        Ok(count.0)
    }
}
