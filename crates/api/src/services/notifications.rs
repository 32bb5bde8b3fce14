//! Staff notification settings read from the `email` settings group.

use domain::models::site_setting::keys;
use domain::repositories::{RepositoryError, SiteSettingsRepository};
use domain::services::parse_receivers;

/// Recipients from `(email, receivers)`, falling back to `default_receiver`.
pub async fn receivers(
    settings: &dyn SiteSettingsRepository,
    default_receiver: &str,
) -> Result<Vec<String>, RepositoryError> {
    let configured = settings
        .get(keys::EMAIL, keys::EMAIL_RECEIVERS)
        .await?
        .map(|s| parse_receivers(&s.value))
        .unwrap_or_default();

    if !configured.is_empty() {
        return Ok(configured);
    }
    Ok(parse_receivers(default_receiver))
}

/// The `(email, notificationTemplate)` setting when present and non-blank.
pub async fn template(settings: &dyn SiteSettingsRepository) -> Result<Option<String>, RepositoryError> {
    Ok(settings
        .get(keys::EMAIL, keys::EMAIL_NOTIFICATION_TEMPLATE)
        .await?
        .map(|s| s.value)
        .filter(|v| !v.trim().is_empty()))
}
