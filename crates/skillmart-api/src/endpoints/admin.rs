// Admin dashboard endpoints
//
// Read-only aggregates computed by the backend.

use crate::client::MarketplaceClient;
use crate::error::Error;
use crate::types::{AdminStatsResponse, AnalyticsResponse, RevenueStatsResponse};

impl MarketplaceClient {
    /// `GET /admin/stats`
    pub async fn get_admin_stats(&self) -> Result<AdminStatsResponse, Error> {
        self.get(&["admin", "stats"]).await
    }

    /// `GET /admin/analytics`
    pub async fn get_analytics(&self) -> Result<AnalyticsResponse, Error> {
        self.get(&["admin", "analytics"]).await
    }

    /// `GET /admin/revenue-stats`
    pub async fn get_revenue_stats(&self) -> Result<RevenueStatsResponse, Error> {
        self.get(&["admin", "revenue-stats"]).await
    }
}
