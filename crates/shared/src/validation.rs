//! Common validation utilities.

use chrono::{TimeZone, Utc};
use validator::ValidationError;

/// Maximum age of a location timestamp in days (7 days).
const MAX_TIMESTAMP_AGE_DAYS: i64 = 7;

/// Maximum allowed future timestamp tolerance in seconds (5 minutes for clock skew).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 300;

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        let mut err = ValidationError::new("latitude_range");
        err.message = Some("Latitude must be between -90 and 90".into());
        Err(err)
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(long: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&long) {
        Ok(())
    } else {
        let mut err = ValidationError::new("longitude_range");
        err.message = Some("Longitude must be between -180 and 180".into());
        Err(err)
    }
}

/// Validates that GPS accuracy is non-negative.
pub fn validate_accuracy(accuracy_meters: f64) -> Result<(), ValidationError> {
    if accuracy_meters >= 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("accuracy_range");
        err.message = Some("Accuracy must be non-negative".into());
        Err(err)
    }
}

/// Validates that heading is within valid range (0 to 360 degrees).
pub fn validate_heading(heading_degrees: f64) -> Result<(), ValidationError> {
    if (0.0..=360.0).contains(&heading_degrees) {
        Ok(())
    } else {
        let mut err = ValidationError::new("heading_range");
        err.message = Some("Heading must be between 0 and 360".into());
        Err(err)
    }
}

/// Validates that speed is non-negative.
pub fn validate_speed(speed_kmh: f64) -> Result<(), ValidationError> {
    if speed_kmh >= 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("speed_range");
        err.message = Some("Speed must be non-negative".into());
        Err(err)
    }
}

/// Validates that a geofence radius is positive and within a sane ceiling.
///
/// Zones above 100 km stop being "last-mile" geofences and are almost always
/// a unit mistake (meters passed as kilometers).
pub fn validate_radius_km(radius_km: f64) -> Result<(), ValidationError> {
    if radius_km > 0.0 && radius_km <= 100.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("radius_range");
        err.message = Some("Radius must be between 0 and 100 km".into());
        Err(err)
    }
}

/// Validates that a timestamp (in milliseconds since epoch) is within acceptable range.
/// - Must not be more than 5 minutes in the future (allows for clock skew)
/// - Must not be older than 7 days
pub fn validate_timestamp(timestamp_millis: i64) -> Result<(), ValidationError> {
    let now = Utc::now();

    let timestamp = match Utc.timestamp_millis_opt(timestamp_millis).single() {
        Some(ts) => ts,
        None => {
            let mut err = ValidationError::new("timestamp_invalid");
            err.message = Some("Invalid timestamp format".into());
            return Err(err);
        }
    };

    let future_limit = now + chrono::Duration::seconds(MAX_FUTURE_TOLERANCE_SECS);
    if timestamp > future_limit {
        let mut err = ValidationError::new("timestamp_future");
        err.message = Some("Timestamp cannot be in the future".into());
        return Err(err);
    }

    let past_limit = now - chrono::Duration::days(MAX_TIMESTAMP_AGE_DAYS);
    if timestamp < past_limit {
        let mut err = ValidationError::new("timestamp_old");
        err.message = Some("Timestamp cannot be older than 7 days".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_latitude() {
        assert!(validate_latitude(0.0).is_ok());
        assert!(validate_latitude(90.0).is_ok());
        assert!(validate_latitude(-90.0).is_ok());
        assert!(validate_latitude(90.1).is_err());
        assert!(validate_latitude(-90.1).is_err());
    }

    #[test]
    fn test_validate_latitude_error_message() {
        let err = validate_latitude(100.0).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Latitude must be between -90 and 90"
        );
    }

    #[test]
    fn test_validate_longitude() {
        assert!(validate_longitude(0.0).is_ok());
        assert!(validate_longitude(180.0).is_ok());
        assert!(validate_longitude(-180.0).is_ok());
        assert!(validate_longitude(180.1).is_err());
        assert!(validate_longitude(-180.1).is_err());
    }

    #[test]
    fn test_validate_longitude_error_message() {
        let err = validate_longitude(200.0).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Longitude must be between -180 and 180"
        );
    }

    #[test]
    fn test_validate_accuracy() {
        assert!(validate_accuracy(0.0).is_ok());
        assert!(validate_accuracy(250.0).is_ok());
        assert!(validate_accuracy(-1.0).is_err());
    }

    #[test]
    fn test_validate_heading_common_directions() {
        assert!(validate_heading(0.0).is_ok()); // North
        assert!(validate_heading(90.0).is_ok()); // East
        assert!(validate_heading(180.0).is_ok()); // South
        assert!(validate_heading(270.0).is_ok()); // West
        assert!(validate_heading(360.0).is_ok());
        assert!(validate_heading(-1.0).is_err());
        assert!(validate_heading(360.1).is_err());
    }

    #[test]
    fn test_validate_speed() {
        assert!(validate_speed(0.0).is_ok());
        assert!(validate_speed(25.0).is_ok()); // typical delivery motorbike
        assert!(validate_speed(-10.0).is_err());
    }

    #[test]
    fn test_validate_radius_km() {
        assert!(validate_radius_km(0.5).is_ok());
        assert!(validate_radius_km(100.0).is_ok());
        assert!(validate_radius_km(0.0).is_err());
        assert!(validate_radius_km(-2.0).is_err());
        assert!(validate_radius_km(500.0).is_err());
    }

    #[test]
    fn test_validate_timestamp_current() {
        let now_millis = Utc::now().timestamp_millis();
        assert!(validate_timestamp(now_millis).is_ok());
    }

    #[test]
    fn test_validate_timestamp_recent_past() {
        let one_hour_ago = Utc::now() - chrono::Duration::hours(1);
        assert!(validate_timestamp(one_hour_ago.timestamp_millis()).is_ok());

        let six_days_ago = Utc::now() - chrono::Duration::days(6);
        assert!(validate_timestamp(six_days_ago.timestamp_millis()).is_ok());
    }

    #[test]
    fn test_validate_timestamp_too_old() {
        let eight_days_ago = Utc::now() - chrono::Duration::days(8);
        assert!(validate_timestamp(eight_days_ago.timestamp_millis()).is_err());
    }

    #[test]
    fn test_validate_timestamp_slight_future() {
        let four_min_future = Utc::now() + chrono::Duration::minutes(4);
        assert!(validate_timestamp(four_min_future.timestamp_millis()).is_ok());
    }

    #[test]
    fn test_validate_timestamp_too_far_future() {
        let ten_min_future = Utc::now() + chrono::Duration::minutes(10);
        assert!(validate_timestamp(ten_min_future.timestamp_millis()).is_err());
    }
}
