use crate::core::ranker::{rank_nearby, InvalidInputError, Located, Ranked};
use crate::models::{DirectoryUser, Point, Recipient};

impl Located for DirectoryUser {
    fn location(&self) -> Option<Point> {
        self.user.location
    }
}

/// Rank directory users around an alert origin, leaving out the sender
pub fn find_nearby_users(
    origin: Point,
    directory: Vec<DirectoryUser>,
    radius_km: f64,
    exclude_uid: &str,
) -> Result<Vec<Ranked<DirectoryUser>>, InvalidInputError> {
    rank_nearby(
        origin,
        directory.into_iter().filter(|entry| entry.uid != exclude_uid),
        radius_km,
    )
}

/// Turn ranked users into push recipients, nearest first
///
/// Users without a delivery token cannot be reached and are dropped.
pub fn build_recipients(nearby: &[Ranked<DirectoryUser>]) -> Vec<Recipient> {
    nearby
        .iter()
        .filter_map(|ranked| {
            let token = ranked.record.user.fcm_token.as_deref()?.trim();
            if token.is_empty() {
                return None;
            }

            Some(Recipient {
                user_id: ranked.record.uid.clone(),
                fcm_token: token.to_string(),
                distance_km: ranked.distance_km,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRecord;

    fn user(uid: &str, lat: f64, lon: f64, token: Option<&str>) -> DirectoryUser {
        DirectoryUser {
            uid: uid.to_string(),
            user: UserRecord {
                display_name: None,
                location: Some(Point::new(lat, lon)),
                fcm_token: token.map(str::to_string),
            },
        }
    }

    #[test]
    fn test_excludes_sender() {
        let origin = Point::new(0.0, 0.0);
        let directory = vec![
            user("sender", 0.0, 0.0, Some("t0")),
            user("helper", 0.0, 0.01, Some("t1")),
        ];

        let nearby = find_nearby_users(origin, directory, 10.0, "sender").unwrap();
        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].record.uid, "helper");
    }

    #[test]
    fn test_drops_users_without_token() {
        let origin = Point::new(0.0, 0.0);
        let directory = vec![
            user("far", 0.0, 0.05, Some("t-far")),
            user("tokenless", 0.0, 0.01, None),
            user("blank", 0.0, 0.02, Some("  ")),
            user("near", 0.0, 0.03, Some("t-near")),
        ];

        let nearby = find_nearby_users(origin, directory, 10.0, "sender").unwrap();
        assert_eq!(nearby.len(), 4);

        let recipients = build_recipients(&nearby);
        let ids: Vec<&str> = recipients.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(ids, vec!["near", "far"]);
        assert_eq!(recipients[0].fcm_token, "t-near");
        assert!(recipients[0].distance_km < recipients[1].distance_km);
    }
}
