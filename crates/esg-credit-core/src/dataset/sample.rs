//! Bundled DAX demo portfolio.
//!
//! Ten large German listed firms with hand-maintained fundamentals,
//! emissions, and ESG attributes. The figures are indicative, frozen
//! at the snapshot date below, and exist so the CLI and the test
//! suite can run without any external data pipeline.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{FirmRecord, Portfolio};

/// Snapshot date of the hand-maintained figures.
const SAMPLE_AS_OF: (i32, u32, u32) = (2024, 12, 31);

#[allow(clippy::too_many_arguments)]
fn firm(
    ticker: &str,
    industry: &str,
    debt_to_equity: Decimal,
    interest_coverage: Decimal,
    ebit_margin: Decimal,
    roa: Decimal,
    carbon_intensity: Decimal,
    emissions_trend: Decimal,
    esg_score: Decimal,
    social_score: Decimal,
    governance_score: Decimal,
    board_diversity: Decimal,
    volatility: Decimal,
    total_assets: Decimal,
) -> FirmRecord {
    let mut f = FirmRecord::new(ticker, industry);
    f.debt_to_equity = Some(debt_to_equity);
    f.interest_coverage = Some(interest_coverage);
    f.ebit_margin = Some(ebit_margin);
    f.roa = Some(roa);
    f.carbon_intensity = Some(carbon_intensity);
    f.emissions_trend = Some(emissions_trend);
    f.esg_score = Some(esg_score);
    f.social_score = Some(social_score);
    f.governance_score = Some(governance_score);
    f.board_diversity = Some(board_diversity);
    f.controversy_flag = Some(false);
    f.volatility = Some(volatility);
    f.total_assets = Some(total_assets);
    f
}

/// The ten-firm DAX sample, every column populated.
pub fn dax_sample_portfolio() -> Portfolio {
    let (y, m, d) = SAMPLE_AS_OF;
    let as_of = NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
    let firms = vec![
        firm("SAP", "Technology", dec!(0.32), dec!(8.5), dec!(0.27), dec!(0.09), dec!(80), dec!(-10), dec!(82), dec!(85), dec!(90), dec!(0.36), dec!(0.22), dec!(68_300_000_000)),
        firm("ALV.DE", "Financials", dec!(0.28), dec!(9.1), dec!(0.11), dec!(0.01), dec!(45), dec!(5), dec!(78), dec!(80), dec!(75), dec!(0.38), dec!(0.18), dec!(1_200_000_000_000)),
        firm("DTE.DE", "Telecommunications", dec!(1.15), dec!(3.8), dec!(0.15), dec!(0.03), dec!(180), dec!(0), dec!(66), dec!(70), dec!(65), dec!(0.33), dec!(0.20), dec!(300_000_000_000)),
        firm("BAS.DE", "Chemicals", dec!(0.65), dec!(6.8), dec!(0.08), dec!(0.04), dec!(850), dec!(15), dec!(58), dec!(60), dec!(70), dec!(0.30), dec!(0.28), dec!(85_400_000_000)),
        firm("BAYN.DE", "Pharmaceuticals", dec!(0.82), dec!(7.1), dec!(0.12), dec!(0.02), dec!(320), dec!(8), dec!(64), dec!(75), dec!(68), dec!(0.35), dec!(0.31), dec!(112_000_000_000)),
        firm("BMW.DE", "Automotive", dec!(1.15), dec!(4.2), dec!(0.10), dec!(0.05), dec!(480), dec!(-5), dec!(72), dec!(82), dec!(80), dec!(0.32), dec!(0.26), dec!(246_000_000_000)),
        firm("DAI.DE", "Automotive", dec!(1.75), dec!(5.2), dec!(0.09), dec!(0.04), dec!(510), dec!(-2), dec!(69), dec!(78), dec!(76), dec!(0.28), dec!(0.27), dec!(260_000_000_000)),
        firm("SIE.DE", "Industrial", dec!(0.45), dec!(6.2), dec!(0.13), dec!(0.06), dec!(220), dec!(3), dec!(70), dec!(72), dec!(74), dec!(0.31), dec!(0.21), dec!(145_000_000_000)),
        firm("ADS.DE", "Consumer", dec!(0.55), dec!(5.5), dec!(0.09), dec!(0.05), dec!(150), dec!(0), dec!(65), dec!(68), dec!(70), dec!(0.40), dec!(0.29), dec!(22_500_000_000)),
        firm("MUV2.DE", "Financials", dec!(0.31), dec!(8.8), dec!(0.10), dec!(0.02), dec!(50), dec!(2), dec!(75), dec!(77), dec!(78), dec!(0.34), dec!(0.17), dec!(280_000_000_000)),
    ];
    // Tickers are unique by construction.
    Portfolio { as_of, firms }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sample_has_ten_fully_populated_firms() {
        let portfolio = dax_sample_portfolio();
        assert_eq!(portfolio.firms.len(), 10);
        for f in &portfolio.firms {
            assert!(f.debt_to_equity.is_some(), "{} missing Debt/Equity", f.ticker);
            assert!(f.carbon_intensity.is_some(), "{} missing CarbonIntensity", f.ticker);
            assert!(f.total_assets.is_some(), "{} missing TotalAssets", f.ticker);
        }
    }

    #[test]
    fn test_sample_values_pinned() {
        let portfolio = dax_sample_portfolio();
        let sap = &portfolio.firms[0];
        assert_eq!(sap.ticker, "SAP");
        assert_eq!(sap.debt_to_equity, Some(dec!(0.32)));
        assert_eq!(sap.carbon_intensity, Some(dec!(80)));
        assert_eq!(sap.emissions_trend, Some(dec!(-10)));
        let bas = &portfolio.firms[3];
        assert_eq!(bas.industry, "Chemicals");
        assert_eq!(bas.carbon_intensity, Some(dec!(850)));
    }
}
