//! Handlers for the aggregate views.

use crate::analytics::{Analytics, PieSlice, TimeSeriesPoint, Totals};
use crate::commands::{blocking, plural, Out};
use crate::{Config, Result};
use std::sync::Arc;

fn analytics(config: &Config) -> Analytics {
    Analytics::new(Arc::new(config.ledger()))
}

/// Totals per category, ordered by category name.
pub async fn pie(config: Config) -> Result<Out<Vec<PieSlice>>> {
    let slices = blocking(move || analytics(&config).pie_by_category()).await?;
    let message = plural(slices.len(), "category", "categories");
    Ok(Out::new(message, slices))
}

/// Totals per month, oldest first.
pub async fn series(config: Config) -> Result<Out<Vec<TimeSeriesPoint>>> {
    let points = blocking(move || analytics(&config).time_series_monthly()).await?;
    let message = plural(points.len(), "month", "months");
    Ok(Out::new(message, points))
}

pub async fn totals(config: Config) -> Result<Out<Totals>> {
    let totals = blocking(move || analytics(&config).totals()).await?;
    let message = format!("Balance {}", totals.balance);
    Ok(Out::new(message, totals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Amount;
    use crate::test::TestEnv;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_pie() {
        let env = TestEnv::new().await;
        let out = pie(env.config()).await.unwrap();
        assert_eq!(out.message(), "3 categories");
        let slices = out.structure().unwrap();
        let pairs: Vec<(&str, Amount)> = slices
            .iter()
            .map(|s| (s.category.as_str(), s.total))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("food", amount("87.50")),
                ("rent", amount("900")),
                ("salary", amount("2500")),
            ]
        );
    }

    #[tokio::test]
    async fn test_series() {
        let env = TestEnv::new().await;
        let out = series(env.config()).await.unwrap();
        assert_eq!(out.message(), "3 months");
        let points: Vec<(String, Amount)> = out
            .structure()
            .unwrap()
            .iter()
            .map(|p| (p.period.to_string(), p.total))
            .collect();
        assert_eq!(
            points,
            vec![
                ("2024-01".to_string(), amount("42.40")),
                ("2024-02".to_string(), amount("2500")),
                ("2024-03".to_string(), amount("945.10")),
            ]
        );
    }

    #[tokio::test]
    async fn test_totals() {
        let env = TestEnv::new().await;
        let out = totals(env.config()).await.unwrap();
        let t = out.structure().unwrap();
        assert_eq!(t.income, amount("2500"));
        assert_eq!(t.expense, amount("987.50"));
        assert_eq!(t.balance, Decimal::from_str("1512.50").unwrap());
        assert_eq!(out.message(), "Balance 1512.50");
    }
}
