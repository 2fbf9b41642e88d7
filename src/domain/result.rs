//! Result type alias for garden-sync

use super::errors::GardenError;

/// Result type alias for garden-sync operations
///
/// # Examples
///
/// ```
/// use garden_sync::domain::result::Result;
/// use garden_sync::domain::errors::GardenError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(GardenError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, GardenError>;
