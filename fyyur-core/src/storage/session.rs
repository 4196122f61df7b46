use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use super::serialization::{
    artist_from_row, contains_pattern, genres_to_json, venue_from_row, ARTIST_COLUMNS,
    VENUE_COLUMNS,
};
use crate::domain::{
    Artist, ArtistShow, ArtistSummary, CatalogCounts, Choice, CityGroup, SearchHit, Show,
    ShowListing, Venue, VenueShow, VenueSummary,
};
use crate::error::Result;
use crate::forms::{ArtistForm, ShowForm, VenueForm};

/// Typed queries against one open transaction.
///
/// A `Session` never commits or rolls back on its own; the owner of the
/// transaction decides that once the unit of work returns.
pub struct Session<'c> {
    conn: &'c Connection,
}

impl<'c> Session<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    // Venues

    pub fn venue_summaries(&self, now: NaiveDateTime) -> Result<Vec<(String, String, VenueSummary)>> {
        let mut stmt = self.conn.prepare(
            "SELECT v.city, v.state, v.id, v.name,
                    COALESCE(SUM(CASE WHEN s.start_time >= ?1 THEN 1 ELSE 0 END), 0)
             FROM venue v
             LEFT JOIN show s ON s.venue_id = v.id
             GROUP BY v.id
             ORDER BY v.state, v.city, v.name, v.id",
        )?;
        let rows = stmt.query_map(params![now], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                VenueSummary {
                    id: row.get(2)?,
                    name: row.get(3)?,
                    num_upcoming_shows: row.get(4)?,
                },
            ))
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn venues_by_area(&self, now: NaiveDateTime) -> Result<Vec<CityGroup>> {
        let mut groups: Vec<CityGroup> = Vec::new();
        for (city, state, venue) in self.venue_summaries(now)? {
            match groups.last_mut() {
                Some(group) if group.city == city && group.state == state => {
                    group.venues.push(venue)
                }
                _ => groups.push(CityGroup {
                    city,
                    state,
                    venues: vec![venue],
                }),
            }
        }
        Ok(groups)
    }

    pub fn search_venues(&self, term: &str, now: NaiveDateTime) -> Result<Vec<SearchHit>> {
        let mut stmt = self.conn.prepare(
            "SELECT v.id, v.name,
                    COALESCE(SUM(CASE WHEN s.start_time >= ?1 THEN 1 ELSE 0 END), 0)
             FROM venue v
             LEFT JOIN show s ON s.venue_id = v.id
             WHERE fold_case(v.name) LIKE fold_case(?2) ESCAPE '\\'
             GROUP BY v.id
             ORDER BY v.name, v.id",
        )?;
        let rows = stmt.query_map(params![now, contains_pattern(term)], search_hit_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn get_venue(&self, id: i64) -> Result<Option<Venue>> {
        let sql = format!("SELECT {VENUE_COLUMNS} FROM venue WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id], venue_from_row)
            .optional()?)
    }

    pub fn venue_exists(&self, id: i64) -> Result<bool> {
        Ok(self
            .conn
            .query_row("SELECT 1 FROM venue WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?
            .is_some())
    }

    /// Shows booked at a venue, joined to the performing artist, oldest first.
    pub fn venue_shows(&self, venue_id: i64) -> Result<Vec<VenueShow>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.name, a.image_link, s.start_time
             FROM show s
             JOIN artist a ON a.id = s.artist_id
             WHERE s.venue_id = ?1
             ORDER BY s.start_time, s.id",
        )?;
        let rows = stmt.query_map(params![venue_id], |row| {
            Ok(VenueShow {
                artist_id: row.get(0)?,
                artist_name: row.get(1)?,
                artist_image_link: row.get(2)?,
                start_time: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn insert_venue(&self, form: &VenueForm) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO venue (name, city, state, address, phone, image_link, genres,
                                facebook_link, website, seeking_talent, seeking_description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                form.name,
                form.city,
                form.state,
                form.address,
                form.phone,
                form.image_link,
                genres_to_json(&form.genres)?,
                form.facebook_link,
                form.website,
                form.seeking_talent,
                form.seeking_description,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Replaces every editable column. Returns the number of rows touched.
    pub fn update_venue(&self, id: i64, form: &VenueForm) -> Result<usize> {
        Ok(self.conn.execute(
            "UPDATE venue SET name = ?2, city = ?3, state = ?4, address = ?5, phone = ?6,
                    image_link = ?7, genres = ?8, facebook_link = ?9, website = ?10,
                    seeking_talent = ?11, seeking_description = ?12
             WHERE id = ?1",
            params![
                id,
                form.name,
                form.city,
                form.state,
                form.address,
                form.phone,
                form.image_link,
                genres_to_json(&form.genres)?,
                form.facebook_link,
                form.website,
                form.seeking_talent,
                form.seeking_description,
            ],
        )?)
    }

    pub fn count_venue_shows(&self, venue_id: i64) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM show WHERE venue_id = ?1",
            params![venue_id],
            |row| row.get(0),
        )?)
    }

    pub fn delete_venue(&self, id: i64) -> Result<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM venue WHERE id = ?1", params![id])?)
    }

    // Artists

    pub fn artist_summaries(&self, now: NaiveDateTime) -> Result<Vec<ArtistSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.name,
                    COALESCE(SUM(CASE WHEN s.start_time >= ?1 THEN 1 ELSE 0 END), 0)
             FROM artist a
             LEFT JOIN show s ON s.artist_id = a.id
             GROUP BY a.id
             ORDER BY a.id",
        )?;
        let rows = stmt.query_map(params![now], |row| {
            Ok(ArtistSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                num_upcoming_shows: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn search_artists(&self, term: &str, now: NaiveDateTime) -> Result<Vec<SearchHit>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.name,
                    COALESCE(SUM(CASE WHEN s.start_time >= ?1 THEN 1 ELSE 0 END), 0)
             FROM artist a
             LEFT JOIN show s ON s.artist_id = a.id
             WHERE fold_case(a.name) LIKE fold_case(?2) ESCAPE '\\'
             GROUP BY a.id
             ORDER BY a.name, a.id",
        )?;
        let rows = stmt.query_map(params![now, contains_pattern(term)], search_hit_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn get_artist(&self, id: i64) -> Result<Option<Artist>> {
        let sql = format!("SELECT {ARTIST_COLUMNS} FROM artist WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id], artist_from_row)
            .optional()?)
    }

    pub fn artist_exists(&self, id: i64) -> Result<bool> {
        Ok(self
            .conn
            .query_row("SELECT 1 FROM artist WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?
            .is_some())
    }

    /// Shows an artist is booked into, joined to the hosting venue, oldest first.
    pub fn artist_shows(&self, artist_id: i64) -> Result<Vec<ArtistShow>> {
        let mut stmt = self.conn.prepare(
            "SELECT v.id, v.name, v.image_link, s.start_time
             FROM show s
             JOIN venue v ON v.id = s.venue_id
             WHERE s.artist_id = ?1
             ORDER BY s.start_time, s.id",
        )?;
        let rows = stmt.query_map(params![artist_id], |row| {
            Ok(ArtistShow {
                venue_id: row.get(0)?,
                venue_name: row.get(1)?,
                venue_image_link: row.get(2)?,
                start_time: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn insert_artist(&self, form: &ArtistForm) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO artist (name, city, state, phone, genres, image_link, website,
                                 facebook_link, seeking_venue, seeking_description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                form.name,
                form.city,
                form.state,
                form.phone,
                genres_to_json(&form.genres)?,
                form.image_link,
                form.website,
                form.facebook_link,
                form.seeking_venue,
                form.seeking_description,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update_artist(&self, id: i64, form: &ArtistForm) -> Result<usize> {
        Ok(self.conn.execute(
            "UPDATE artist SET name = ?2, city = ?3, state = ?4, phone = ?5, genres = ?6,
                    image_link = ?7, website = ?8, facebook_link = ?9,
                    seeking_venue = ?10, seeking_description = ?11
             WHERE id = ?1",
            params![
                id,
                form.name,
                form.city,
                form.state,
                form.phone,
                genres_to_json(&form.genres)?,
                form.image_link,
                form.website,
                form.facebook_link,
                form.seeking_venue,
                form.seeking_description,
            ],
        )?)
    }

    // Shows

    pub fn list_shows(&self, limit: u32, offset: u64) -> Result<Vec<ShowListing>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.id, v.id, v.name, a.id, a.name, a.image_link, s.start_time
             FROM show s
             JOIN venue v ON v.id = s.venue_id
             JOIN artist a ON a.id = s.artist_id
             ORDER BY s.start_time, s.id
             LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt.query_map(params![limit, offset as i64], |row| {
            Ok(ShowListing {
                id: row.get(0)?,
                venue_id: row.get(1)?,
                venue_name: row.get(2)?,
                artist_id: row.get(3)?,
                artist_name: row.get(4)?,
                artist_image_link: row.get(5)?,
                start_time: row.get(6)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn insert_show(&self, form: &ShowForm) -> Result<Show> {
        self.conn.execute(
            "INSERT INTO show (venue_id, artist_id, start_time) VALUES (?1, ?2, ?3)",
            params![form.venue_id, form.artist_id, form.start_time],
        )?;
        Ok(Show {
            id: self.conn.last_insert_rowid(),
            venue_id: form.venue_id,
            artist_id: form.artist_id,
            start_time: form.start_time,
        })
    }

    // Lookups

    pub fn venue_choices(&self) -> Result<Vec<Choice>> {
        self.choices("SELECT id, name FROM venue ORDER BY name, id")
    }

    pub fn artist_choices(&self) -> Result<Vec<Choice>> {
        self.choices("SELECT id, name FROM artist ORDER BY name, id")
    }

    fn choices(&self, sql: &str) -> Result<Vec<Choice>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(Choice {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn counts(&self) -> Result<CatalogCounts> {
        Ok(self.conn.query_row(
            "SELECT (SELECT COUNT(*) FROM venue),
                    (SELECT COUNT(*) FROM artist),
                    (SELECT COUNT(*) FROM show)",
            [],
            |row| {
                Ok(CatalogCounts {
                    venues: row.get(0)?,
                    artists: row.get(1)?,
                    shows: row.get(2)?,
                })
            },
        )?)
    }
}

fn search_hit_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SearchHit> {
    Ok(SearchHit {
        id: row.get(0)?,
        name: row.get(1)?,
        num_upcoming_shows: row.get(2)?,
    })
}
