//! Concurrent per-country fetches with structured join.
//!
//! Every country gets its own scoped thread; [`fetch_all`] returns only after all of
//! them have finished. A failing country yields an `Err` in its own slot and never
//! affects its siblings.

use crate::api::IndicatorSource;
use crate::error::ApiError;
use crate::models::{Indicator, IndicatorSeries, SelectedCountry};
use std::thread;

/// Result of fetching one country's series.
#[derive(Debug)]
pub struct CountryFetch {
    pub country: SelectedCountry,
    pub result: Result<IndicatorSeries, ApiError>,
}

impl CountryFetch {
    pub fn series(&self) -> Option<&IndicatorSeries> {
        self.result.as_ref().ok()
    }
}

/// Fetch `indicator` for every country, concurrently. Output order = input order.
pub fn fetch_all<S>(
    source: &S,
    indicator: Indicator,
    countries: &[SelectedCountry],
) -> Vec<CountryFetch>
where
    S: IndicatorSource + ?Sized,
{
    if countries.is_empty() {
        return Vec::new();
    }

    thread::scope(|scope| {
        let handles: Vec<_> = countries
            .iter()
            .map(|country| {
                let handle = thread::Builder::new()
                    .name(format!("fetch-{}", country.code))
                    .spawn_scoped(scope, move || source.fetch_series(indicator, &country.code));
                (country, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(country, handle)| {
                let result = match handle {
                    Ok(h) => h.join().unwrap_or_else(|_| {
                        log::error!("fetch task for {} panicked", country.code);
                        Err(ApiError::TaskPanicked(country.code.clone()))
                    }),
                    // Could not spawn a thread: run inline instead.
                    Err(e) => {
                        log::warn!("spawn fetch thread for {}: {}", country.code, e);
                        source.fetch_series(indicator, &country.code)
                    }
                };
                if let Err(e) = &result {
                    log::warn!("{} {} fetch failed: {}", indicator, country.code, e);
                }
                CountryFetch {
                    country: country.clone(),
                    result,
                }
            })
            .collect()
    })
}
