//! Demo catalog for local development.

use tracing::info;

use crate::error::Result;
use crate::forms::{parse_start_time, ArtistForm, FormData, ShowForm, VenueForm};
use crate::storage::Storage;

const VENUES: [&[(&str, &str)]; 3] = [
    &[
        ("name", "The Musical Hop"),
        ("city", "San Francisco"),
        ("state", "CA"),
        ("address", "1015 Folsom Street"),
        ("phone", "123-123-1234"),
        ("genres", "Jazz"),
        ("genres", "Reggae"),
        ("genres", "Classical"),
        ("genres", "Folk"),
        ("website", "https://www.themusicalhop.com"),
        ("facebook_link", "https://www.facebook.com/TheMusicalHop"),
        ("seeking_talent", "y"),
        (
            "seeking_description",
            "We are on the lookout for a local artist to play every two weeks. Please call us.",
        ),
        (
            "image_link",
            "https://images.unsplash.com/photo-1543900694-133f37abaaa5?auto=format&fit=crop&w=400&q=60",
        ),
    ],
    &[
        ("name", "The Dueling Pianos Bar"),
        ("city", "New York"),
        ("state", "NY"),
        ("address", "335 Delancey Street"),
        ("phone", "914-003-1132"),
        ("genres", "Classical"),
        ("genres", "R&B"),
        ("genres", "Hip-Hop"),
        ("website", "https://www.theduelingpianos.com"),
        ("facebook_link", "https://www.facebook.com/theduelingpianos"),
        (
            "image_link",
            "https://images.unsplash.com/photo-1497032205916-ac775f0649ae?auto=format&fit=crop&w=750&q=80",
        ),
    ],
    &[
        ("name", "Park Square Live Music & Coffee"),
        ("city", "San Francisco"),
        ("state", "CA"),
        ("address", "34 Whiskey Moore Ave"),
        ("phone", "415-000-1234"),
        ("genres", "Rock n Roll"),
        ("genres", "Jazz"),
        ("genres", "Classical"),
        ("genres", "Folk"),
        ("website", "https://www.parksquarelivemusicandcoffee.com"),
        ("facebook_link", "https://www.facebook.com/ParkSquareLiveMusicAndCoffee"),
        (
            "image_link",
            "https://images.unsplash.com/photo-1485686531765-ba63b07845a7?auto=format&fit=crop&w=747&q=80",
        ),
    ],
];

const ARTISTS: [&[(&str, &str)]; 3] = [
    &[
        ("name", "Guns N Petals"),
        ("city", "San Francisco"),
        ("state", "CA"),
        ("phone", "326-123-5000"),
        ("genres", "Rock n Roll"),
        ("website", "https://www.gunsnpetalsband.com"),
        ("facebook_link", "https://www.facebook.com/GunsNPetals"),
        ("seeking_venue", "y"),
        (
            "seeking_description",
            "Looking for shows to perform at in the San Francisco Bay Area!",
        ),
        (
            "image_link",
            "https://images.unsplash.com/photo-1549213783-8284d0336c4f?auto=format&fit=crop&w=300&q=80",
        ),
    ],
    &[
        ("name", "Matt Quevedo"),
        ("city", "New York"),
        ("state", "NY"),
        ("phone", "300-400-5000"),
        ("genres", "Jazz"),
        ("facebook_link", "https://www.facebook.com/mattquevedo923251523"),
        (
            "image_link",
            "https://images.unsplash.com/photo-1495223153807-b916f75de8c5?auto=format&fit=crop&w=334&q=80",
        ),
    ],
    &[
        ("name", "The Wild Sax Band"),
        ("city", "San Francisco"),
        ("state", "CA"),
        ("phone", "432-325-5432"),
        ("genres", "Jazz"),
        ("genres", "Classical"),
        (
            "image_link",
            "https://images.unsplash.com/photo-1558369981-f9ca78462e61?auto=format&fit=crop&w=794&q=80",
        ),
    ],
];

/// (venue index, artist index, start time)
const SHOWS: [(usize, usize, &str); 5] = [
    (0, 0, "2019-05-21 21:30:00"),
    (2, 1, "2019-06-15 23:00:00"),
    (2, 2, "2035-04-01 20:00:00"),
    (2, 2, "2035-04-08 20:00:00"),
    (2, 2, "2035-04-15 20:00:00"),
];

fn form_data(fields: &[(&str, &str)]) -> FormData {
    fields.iter().copied().collect()
}

/// Loads the demo venues, artists and shows into an empty store.
///
/// Returns `false` without touching anything when the store already holds data.
pub async fn seed_demo_catalog(storage: &dyn Storage) -> Result<bool> {
    let counts = storage.counts().await?;
    if counts.venues > 0 || counts.artists > 0 || counts.shows > 0 {
        info!("Store already has data, skipping demo catalog");
        return Ok(false);
    }

    let mut venue_ids = Vec::with_capacity(VENUES.len());
    for fields in VENUES {
        let venue = storage
            .create_venue(VenueForm::from_form(&form_data(fields))?)
            .await?;
        venue_ids.push(venue.id);
    }

    let mut artist_ids = Vec::with_capacity(ARTISTS.len());
    for fields in ARTISTS {
        let artist = storage
            .create_artist(ArtistForm::from_form(&form_data(fields))?)
            .await?;
        artist_ids.push(artist.id);
    }

    for (venue, artist, start) in SHOWS {
        let Some(start_time) = parse_start_time(start) else {
            continue;
        };
        storage
            .create_show(ShowForm {
                artist_id: artist_ids[artist],
                venue_id: venue_ids[venue],
                start_time,
            })
            .await?;
    }

    info!(
        "Seeded demo catalog: {} venues, {} artists, {} shows",
        VENUES.len(),
        ARTISTS.len(),
        SHOWS.len()
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_seed_loads_catalog_once() {
        let storage = SqliteStorage::in_memory().unwrap();
        assert!(seed_demo_catalog(&storage).await.unwrap());
        assert!(!seed_demo_catalog(&storage).await.unwrap());

        let counts = storage.counts().await.unwrap();
        assert_eq!((counts.venues, counts.artists, counts.shows), (3, 3, 5));

        let now = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let music = storage.search_venues("Music", now).await.unwrap();
        assert_eq!(music.count, 2);
        let park = music
            .data
            .iter()
            .find(|hit| hit.name.starts_with("Park Square"))
            .unwrap();
        assert_eq!(park.num_upcoming_shows, 3);
    }
}
