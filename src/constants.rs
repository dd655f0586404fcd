pub mod offers {

    /// Minimum payout an advertiser may offer, in minor units (500.00).
    pub const MIN_PAYOUT_MINOR: i64 = 500_00;

    pub const PREPAYMENT_MULTIPLIER: i64 = 20;

    pub const DEFAULT_LIST_STATUS: &str = "active";
}

pub mod tracking {

    /// Platform share of every conversion payout, in percent.
    pub const COMMISSION_PERCENT: i64 = 20;

    pub const UTM_SOURCE: &str = "cpasibo_pro";

    pub const UTM_MEDIUM: &str = "cpl";

    pub const CONVERSION_STATUS_APPROVED: &str = "approved";

    pub const PIXEL_CACHE_CONTROL: &str = "public, max-age=3600";
}

pub mod stats {

    pub const DEFAULT_PERIOD_DAYS: i64 = 30;

    pub const TOP_LIMIT: u64 = 10;
}

pub mod cors {

    pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

    pub const MAX_AGE_SECS: u64 = 86_400;
}
