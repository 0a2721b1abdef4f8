use crate::core::ranker::{rank_nearby, InvalidInputError, Located};
use crate::models::{NearbyAlert, Point, StoredAlert};

impl Located for StoredAlert {
    fn location(&self) -> Option<Point> {
        self.alert.location
    }
}

/// Build the list of active alerts a viewer sees around `origin`
///
/// Inactive alerts are dropped, the rest are ranked nearest first and
/// flagged when they were raised by the viewer. Only the alerts in range
/// are copied out of the snapshot.
pub fn nearby_alerts<'a, I>(
    viewer_id: &str,
    origin: Point,
    snapshot: I,
    radius_km: f64,
) -> Result<Vec<NearbyAlert>, InvalidInputError>
where
    I: IntoIterator<Item = &'a StoredAlert>,
{
    let active = snapshot.into_iter().filter(|stored| stored.alert.is_active());

    let ranked = rank_nearby(origin, active, radius_km)?;

    Ok(ranked
        .into_iter()
        .filter_map(|ranked| {
            let StoredAlert { id, alert } = ranked.record;
            // Ranked records always carry a location
            let location = alert.location?;

            Some(NearbyAlert {
                id: id.clone(),
                is_own_alert: alert.user_id == viewer_id,
                user_id: alert.user_id.clone(),
                user_name: alert.user_name.clone(),
                message: alert.message.clone(),
                emergency_type: alert.emergency_type.clone(),
                location,
                created_at: alert
                    .created_at
                    .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis),
                distance_km: ranked.distance_km,
            })
        })
        .collect())
}
