use super::ApiError;
use crate::constants::stats::DEFAULT_PERIOD_DAYS;

/// Returns the trimmed value if present and non-empty.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parses an integer identifier from a query parameter.
pub fn parse_id(value: &str) -> Option<i32> {
    value.trim().parse::<i32>().ok()
}

pub fn validate_offer_id(value: &str) -> Result<i32, ApiError> {
    parse_id(value).ok_or_else(|| {
        ApiError::validation(format!(
            "Invalid offer id: {value}. Id must be an integer"
        ))
    })
}

pub fn validate_user_id(value: Option<&str>) -> Result<i32, ApiError> {
    let value = non_empty(value).ok_or_else(|| ApiError::validation("user_id is required"))?;
    parse_id(value).ok_or_else(|| {
        ApiError::validation(format!("Invalid user_id: {value}. Id must be an integer"))
    })
}

/// Reporting window in days. Defaults to 30; must be a non-negative integer.
pub fn validate_period(value: Option<&str>) -> Result<i64, ApiError> {
    const MAX_PERIOD_DAYS: i64 = 36_500;

    let Some(value) = non_empty(value) else {
        return Ok(DEFAULT_PERIOD_DAYS);
    };

    match value.parse::<i64>() {
        Ok(days) if (0..=MAX_PERIOD_DAYS).contains(&days) => Ok(days),
        _ => Err(ApiError::validation(format!(
            "Invalid period: {value}. Period must be a number of days between 0 and {MAX_PERIOD_DAYS}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_defaults_and_bounds() {
        assert_eq!(validate_period(None).unwrap(), 30);
        assert_eq!(validate_period(Some("")).unwrap(), 30);
        assert_eq!(validate_period(Some("7")).unwrap(), 7);
        assert_eq!(validate_period(Some("0")).unwrap(), 0);
        assert!(validate_period(Some("-1")).is_err());
        assert!(validate_period(Some("week")).is_err());
        assert!(validate_period(Some("99999999")).is_err());
    }

    #[test]
    fn user_id_is_required() {
        let err = validate_user_id(None).unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(msg) if msg == "user_id is required"));
        assert!(validate_user_id(Some("abc")).is_err());
        assert_eq!(validate_user_id(Some(" 12 ")).unwrap(), 12);
    }

    #[test]
    fn offer_id_must_be_integer() {
        assert_eq!(validate_offer_id("5").unwrap(), 5);
        assert!(validate_offer_id("5a").is_err());
    }
}
