//! Fix-and-flip deal economics.
//!
//! Buy the baseline at a discount to its fair market value, apply one or
//! more renovations, sell at the renovated valuation.

use crate::{
    comparator::Roi,
    types::Usd,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealAnalysis {
    pub plans:                 Vec<String>,
    pub fair_market_value:     Usd,
    pub purchase_discount_pct: f64,
    pub purchase_price:        Usd,
    pub renovation_cost:       Usd,
    pub sale_price:            Usd,
    pub total_investment:      Usd,
    pub net_profit:            Usd,
    /// Net profit over total investment.
    pub roi:                   Roi,
}

impl DealAnalysis {
    /// `discount_pct` is clamped to [0, 100]; NaN counts as no discount.
    pub fn new(
        plans: Vec<String>,
        fair_market_value: Usd,
        discount_pct: f64,
        renovation_cost: Usd,
        sale_price: Usd,
    ) -> Self {
        let discount = if discount_pct.is_nan() { 0.0 } else { discount_pct.clamp(0.0, 100.0) };
        let purchase_price = fair_market_value * (1.0 - discount / 100.0);
        let total_investment = purchase_price + renovation_cost;
        let net_profit = sale_price - total_investment;
        Self {
            plans,
            fair_market_value,
            purchase_discount_pct: discount,
            purchase_price,
            renovation_cost,
            sale_price,
            total_investment,
            net_profit,
            roi: Roi::from_net(net_profit, total_investment),
        }
    }

    pub fn is_profitable(&self) -> bool {
        self.net_profit > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discounted_purchase_flows_into_roi() {
        let deal = DealAnalysis::new(vec!["Kitchen".into()], 200_000.0, 10.0, 20_000.0, 240_000.0);

        assert_eq!(deal.purchase_price, 180_000.0);
        assert_eq!(deal.total_investment, 200_000.0);
        assert_eq!(deal.net_profit, 40_000.0);
        assert_eq!(deal.roi, Roi::Defined(20.0));
        assert!(deal.is_profitable());
    }

    #[test]
    fn free_house_and_free_work_has_undefined_roi() {
        let deal = DealAnalysis::new(vec![], 150_000.0, 250.0, 0.0, 150_000.0);
        assert_eq!(deal.purchase_discount_pct, 100.0);
        assert_eq!(deal.purchase_price, 0.0);
        assert_eq!(deal.roi, Roi::Undefined);
    }
}
