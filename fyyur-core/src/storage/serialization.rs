use rusqlite::types::Type;
use rusqlite::Row;

use crate::domain::{Artist, Genre, Venue};
use crate::error::Result;

pub const VENUE_COLUMNS: &str = "id, name, city, state, address, phone, image_link, genres, \
     facebook_link, website, seeking_talent, seeking_description";

pub const ARTIST_COLUMNS: &str = "id, name, city, state, phone, genres, image_link, website, \
     facebook_link, seeking_venue, seeking_description";

/// Genres are stored as a JSON array of their labels.
pub fn genres_to_json(genres: &[Genre]) -> Result<String> {
    Ok(serde_json::to_string(genres)?)
}

fn genres_from_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<Genre>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Maps a row selected with [`VENUE_COLUMNS`].
pub fn venue_from_row(row: &Row<'_>) -> rusqlite::Result<Venue> {
    Ok(Venue {
        id: row.get(0)?,
        name: row.get(1)?,
        city: row.get(2)?,
        state: row.get(3)?,
        address: row.get(4)?,
        phone: row.get(5)?,
        image_link: row.get(6)?,
        genres: genres_from_column(row, 7)?,
        facebook_link: row.get(8)?,
        website: row.get(9)?,
        seeking_talent: row.get(10)?,
        seeking_description: row.get(11)?,
    })
}

/// Maps a row selected with [`ARTIST_COLUMNS`].
pub fn artist_from_row(row: &Row<'_>) -> rusqlite::Result<Artist> {
    Ok(Artist {
        id: row.get(0)?,
        name: row.get(1)?,
        city: row.get(2)?,
        state: row.get(3)?,
        phone: row.get(4)?,
        genres: genres_from_column(row, 5)?,
        image_link: row.get(6)?,
        website: row.get(7)?,
        facebook_link: row.get(8)?,
        seeking_venue: row.get(9)?,
        seeking_description: row.get(10)?,
    })
}

/// Builds a `LIKE` pattern matching `term` anywhere, with `\` as the escape.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
