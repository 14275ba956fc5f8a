//! Deterministic text rendering of pipeline results

use super::ItemResult;
use crate::store::ForecastRecord;

/// Forecast value as shown to users, `N/A` when the row has none
pub fn forecast_value(record: &ForecastRecord) -> String {
    match record.demand_forecast {
        Some(value) => value.to_string(),
        None => "N/A".to_string(),
    }
}

fn forecast_line(record: Option<&ForecastRecord>) -> String {
    match record {
        Some(record) => format!("Forecast: {}", forecast_value(record)),
        None => "No forecast data found.".to_string(),
    }
}

/// Summary used as the answer in direct mode
pub fn format_summary(results: &[ItemResult]) -> String {
    match results {
        [] => "No results processed.".to_string(),
        [single] => {
            let matched = single.selected_item.as_deref().unwrap_or("None");
            let content = match single.demand_forecast {
                Some(ref record) => forecast_line(Some(record)),
                None => format!(
                    "No demand forecast found for item '{}' (Matched: {}).",
                    single.input_item, matched
                ),
            };
            format!("### Item: {}\n{}", matched, content)
        }
        many => many
            .iter()
            .map(|result| {
                format!(
                    "### Item: {}\n{}",
                    result.selected_item.as_deref().unwrap_or("None"),
                    forecast_line(result.demand_forecast.as_ref())
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

/// Plain-text answer for a direct store lookup of one canonical name
pub fn format_forecast(item: &str, record: Option<&ForecastRecord>) -> String {
    match record {
        Some(record) => format!(
            "### Item: {}\nForecast: {}\nForecast date: {}",
            record.category_key,
            forecast_value(record),
            record.forecast_date
        ),
        None => format!("No demand forecast found for item '{}'.", item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(key: &str, value: Option<f64>) -> ForecastRecord {
        ForecastRecord {
            forecast_date: NaiveDate::from_ymd_opt(2024, 11, 1).unwrap(),
            category_key: key.to_string(),
            demand_forecast: value,
        }
    }

    #[test]
    fn test_no_results() {
        assert_eq!(format_summary(&[]), "No results processed.");
    }

    #[test]
    fn test_single_result_with_forecast() {
        let results = vec![ItemResult::resolved("widgit", "Widget", Some(record("Widget", Some(42.0))))];
        assert_eq!(format_summary(&results), "### Item: Widget\nForecast: 42");
    }

    #[test]
    fn test_single_result_without_forecast_names_input() {
        let results = vec![ItemResult::resolved("widgit", "Widget", None)];
        assert_eq!(
            format_summary(&results),
            "### Item: Widget\nNo demand forecast found for item 'widgit' (Matched: Widget)."
        );

        let results = vec![ItemResult::unmatched("ตู้")];
        assert_eq!(
            format_summary(&results),
            "### Item: None\nNo demand forecast found for item 'ตู้' (Matched: None)."
        );
    }

    #[test]
    fn test_multiple_results() {
        let results = vec![
            ItemResult::resolved("a", "A", Some(record("A", Some(12.5)))),
            ItemResult::unmatched("b"),
            ItemResult::resolved("c", "C", Some(record("C", None))),
        ];
        assert_eq!(
            format_summary(&results),
            "### Item: A\nForecast: 12.5\n\n\
             ### Item: None\nNo forecast data found.\n\n\
             ### Item: C\nForecast: N/A"
        );
    }

    #[test]
    fn test_format_forecast() {
        assert_eq!(
            format_forecast("A", Some(&record("A", Some(3.0)))),
            "### Item: A\nForecast: 3\nForecast date: 2024-11-01"
        );
        assert_eq!(
            format_forecast("Z", None),
            "No demand forecast found for item 'Z'."
        );
    }
}
