//! Comparison scenarios wiring screens, API, store, and report together.
//!
//! Every collaborator is passed in explicitly; scenarios hold no state of
//! their own and apply no recovery — the first failure aborts the scenario.

use crate::api::{CityQuery, WeatherProvider};
use crate::driver::Screen;
use crate::report::ReportSink;
use crate::screens::{HomeScreen, SettingsScreen, TempUnit};
use crate::store::{Aggregate, ColumnType, RecordStore, Value};
use anyhow::{ensure, Context, Result};

/// Compare the app's displayed temperatures against the API for `cities`
/// (name, city id), persisting one record per city.
///
/// Flow: force the app to Celsius, batch-read app temperatures, fetch API
/// temperatures by city id, store `api_temperature` (rounded), `app_temp`
/// and `temp_diff = |app - api|`, then report every city whose diff is
/// nonzero. Returns the mismatched city names; empty means consistent.
///
/// Nothing is persisted until the whole app batch has completed: a timeout
/// on one city loses the readings of the cities before it.
pub async fn compare_app_to_api(
    screen: &Screen<'_>,
    provider: &dyn WeatherProvider,
    store: &RecordStore,
    sink: &mut dyn ReportSink,
    cities: &[(&str, u64)],
) -> Result<Vec<String>> {
    let home = HomeScreen::new(screen);
    let settings = SettingsScreen::new(screen);

    log::info!("setting temperature unit to Celsius");
    home.open_settings().await?;
    settings.open_customize_units().await?;
    settings.set_temperature_unit(TempUnit::Celsius).await?;
    settings.return_to_home().await?;

    let names: Vec<&str> = cities.iter().map(|(name, _)| *name).collect();
    let app_temps = home.search_city_temperatures(&names).await?;

    store.ensure_column("app_temp", ColumnType::Real).await?;
    store.ensure_column("temp_diff", ColumnType::Real).await?;

    for ((city, id), (_, app_temp)) in cities.iter().zip(&app_temps) {
        let reading = provider
            .current_weather(&CityQuery::Id(*id))
            .await
            .with_context(|| format!("API request for {city} failed"))?;

        let api_temp = reading.temp.round();
        let temp_diff = (f64::from(*app_temp) - api_temp).abs();

        store
            .upsert(
                city,
                &[
                    ("api_temperature", Value::Real(api_temp)),
                    ("app_temp", Value::Real(f64::from(*app_temp))),
                    ("temp_diff", Value::Real(temp_diff)),
                ],
            )
            .await?;
    }

    let rows = store
        .query_records(
            &["city", "api_temperature", "app_temp", "temp_diff"],
            Some("temp_diff > ?"),
            &[Value::Real(0.0)],
        )
        .await?;

    let mismatched: Vec<String> = rows
        .iter()
        .map(|row| row[0].to_string())
        .collect();

    if !rows.is_empty() {
        let table: Vec<Vec<String>> = rows
            .iter()
            .map(|row| row.iter().map(Value::to_string).collect())
            .collect();
        sink.attach_table(
            "Difference Found Between API and APP",
            &["City", "API Temp", "App Temp", "Difference"],
            &table,
        );
        log::warn!("{} cities differ between app and API", rows.len());
    }

    Ok(mismatched)
}

/// For each city (by name): fetch from the API, write temperature and
/// feels-like to the store, read them back and require an exact match.
pub async fn check_api_store_consistency(
    provider: &dyn WeatherProvider,
    store: &RecordStore,
    cities: &[&str],
) -> Result<()> {
    for city in cities {
        let reading = provider
            .current_weather(&CityQuery::Name(city.to_string()))
            .await?;

        store
            .upsert(
                city,
                &[
                    ("api_temperature", Value::Real(reading.temp)),
                    ("feels_like", Value::Real(reading.feels_like)),
                ],
            )
            .await?;

        let row = store
            .fetch(city, &["api_temperature", "feels_like"])
            .await?
            .with_context(|| format!("no stored row for {city}"))?;

        ensure!(
            row[0] == Value::Real(reading.temp),
            "temp mismatch for {city}: stored {}, API {}",
            row[0],
            reading.temp
        );
        ensure!(
            row[1] == Value::Real(reading.feels_like),
            "feels_like mismatch for {city}: stored {}, API {}",
            row[1],
            reading.feels_like
        );
        log::info!("{city}: store and API agree ({})", reading.temp);
    }
    Ok(())
}

/// For each city (by id): store temperature, feels-like and the min/max
/// midpoint as `average_temperature`, then verify the stored average.
pub async fn check_average_temperature(
    provider: &dyn WeatherProvider,
    store: &RecordStore,
    cities: &[(&str, u64)],
) -> Result<()> {
    store
        .ensure_column("average_temperature", ColumnType::Real)
        .await?;

    for (city, id) in cities {
        let reading = provider.current_weather(&CityQuery::Id(*id)).await?;
        let average = reading.average_temperature();

        store
            .upsert(
                city,
                &[
                    ("api_temperature", Value::Real(reading.temp)),
                    ("feels_like", Value::Real(reading.feels_like)),
                    ("average_temperature", Value::Real(average)),
                ],
            )
            .await?;

        let row = store
            .fetch(city, &["average_temperature"])
            .await?
            .with_context(|| format!("no stored row for {city}"))?;
        ensure!(
            row[0] == Value::Real(average),
            "average mismatch for {city}: stored {}, computed {average}",
            row[0]
        );
    }
    Ok(())
}

/// City with the highest stored `average_temperature`.
pub async fn hottest_city(store: &RecordStore) -> Result<(String, f64)> {
    let (city, value) = store
        .aggregate("average_temperature", Aggregate::Max)
        .await?
        .context("no average_temperature records in the store")?;
    log::info!("hottest city: {city} with {value}°C");
    Ok((city, value))
}
