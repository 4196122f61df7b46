//! Declared schemas for the venue, artist and show forms.
//!
//! Submissions arrive as loosely typed urlencoded pairs. Each form type checks
//! presence, length bounds and value types up front and either yields a fully
//! typed value or a [`ValidationError`] listing every offending field. Storage
//! never sees an unchecked submission.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::{is_us_state, Artist, Genre, Venue};

/// Bound for short text columns (names, cities, phones, facebook links).
pub const SHORT_TEXT_MAX: usize = 120;
/// Bound for long text columns (image links, websites, descriptions).
pub const LONG_TEXT_MAX: usize = 500;

const START_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Multi-valued view of an urlencoded form body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(name.into()).or_default().push(value.into());
    }

    /// First value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn get_all(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Value of `name` or the empty string, for re-filling form inputs.
    pub fn value(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = FormData::new();
        for (name, value) in iter {
            data.insert(name, value);
        }
        data
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every field problem found in one submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    #[cfg(test)]
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                field,
                message: message.into(),
            }],
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid form submission")?;
        for (i, err) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{} {}", err.field, err.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Accumulates field errors while pulling typed values out of a [`FormData`].
struct Checker<'a> {
    data: &'a FormData,
    errors: ValidationError,
}

impl<'a> Checker<'a> {
    fn new(data: &'a FormData) -> Self {
        Self {
            data,
            errors: ValidationError::default(),
        }
    }

    fn trimmed(&self, field: &str) -> Option<&'a str> {
        self.data
            .get(field)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn required(&mut self, field: &'static str, max_len: usize) -> String {
        match self.trimmed(field) {
            None => {
                self.errors.push(field, "is required");
                String::new()
            }
            Some(value) => self.bounded(field, value, max_len),
        }
    }

    fn optional(&mut self, field: &'static str, max_len: usize) -> Option<String> {
        self.trimmed(field)
            .map(|value| self.bounded(field, value, max_len))
    }

    fn optional_link(&mut self, field: &'static str, max_len: usize) -> Option<String> {
        let link = self.optional(field, max_len)?;
        if !(link.starts_with("http://") || link.starts_with("https://")) {
            self.errors.push(field, "must start with http:// or https://");
        }
        Some(link)
    }

    fn bounded(&mut self, field: &'static str, value: &str, max_len: usize) -> String {
        if value.chars().count() > max_len {
            self.errors
                .push(field, format!("must be at most {max_len} characters"));
        }
        value.to_string()
    }

    fn state(&mut self, field: &'static str) -> String {
        let state = self.required(field, SHORT_TEXT_MAX).to_uppercase();
        if !state.is_empty() && !is_us_state(&state) {
            self.errors.push(field, format!("'{state}' is not a US state code"));
        }
        state
    }

    fn phone(&mut self, field: &'static str) -> String {
        let phone = self.required(field, SHORT_TEXT_MAX);
        if phone.is_empty() {
            return phone;
        }
        let allowed = phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '.' | '(' | ')' | '+'));
        let digits = phone.chars().filter(char::is_ascii_digit).count();
        if !allowed || digits < 7 {
            self.errors.push(field, "is not a valid phone number");
        }
        phone
    }

    fn genres(&mut self, field: &'static str) -> Vec<Genre> {
        let data = self.data;
        let mut genres = Vec::new();
        for raw in data.get_all(field) {
            if raw.trim().is_empty() {
                continue;
            }
            match raw.parse::<Genre>() {
                Ok(genre) if !genres.contains(&genre) => genres.push(genre),
                Ok(_) => {}
                Err(e) => self.errors.push(field, e.to_string()),
            }
        }
        genres
    }

    /// Checkbox semantics: a non-empty value means checked, anything else unchecked.
    fn checkbox(&self, field: &str) -> bool {
        self.trimmed(field).is_some()
    }

    fn id(&mut self, field: &'static str) -> i64 {
        let Some(raw) = self.trimmed(field) else {
            self.errors.push(field, "is required");
            return 0;
        };
        match raw.parse::<i64>() {
            Ok(id) if id > 0 => id,
            _ => {
                self.errors.push(field, "must be a positive whole number");
                0
            }
        }
    }

    fn datetime(&mut self, field: &'static str) -> NaiveDateTime {
        let Some(raw) = self.trimmed(field) else {
            self.errors.push(field, "is required");
            return NaiveDateTime::MIN;
        };
        match parse_start_time(raw) {
            Some(dt) => dt,
            None => {
                self.errors
                    .push(field, "must be a date and time like 2035-04-01 20:00");
                NaiveDateTime::MIN
            }
        }
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

pub fn parse_start_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    START_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

#[derive(Debug, Clone, PartialEq)]
pub struct VenueForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub image_link: Option<String>,
    pub genres: Vec<Genre>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

impl VenueForm {
    pub fn from_form(data: &FormData) -> Result<Self, ValidationError> {
        let mut check = Checker::new(data);
        let form = VenueForm {
            name: check.required("name", SHORT_TEXT_MAX),
            city: check.required("city", SHORT_TEXT_MAX),
            state: check.state("state"),
            address: check.required("address", SHORT_TEXT_MAX),
            phone: check.phone("phone"),
            image_link: check.optional_link("image_link", LONG_TEXT_MAX),
            genres: check.genres("genres"),
            facebook_link: check.optional_link("facebook_link", SHORT_TEXT_MAX),
            website: check.optional_link("website", LONG_TEXT_MAX),
            seeking_talent: check.checkbox("seeking_talent"),
            seeking_description: check.optional("seeking_description", LONG_TEXT_MAX),
        };
        check.finish(form)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtistForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub genres: Vec<Genre>,
    pub image_link: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

impl ArtistForm {
    pub fn from_form(data: &FormData) -> Result<Self, ValidationError> {
        let mut check = Checker::new(data);
        let form = ArtistForm {
            name: check.required("name", SHORT_TEXT_MAX),
            city: check.required("city", SHORT_TEXT_MAX),
            state: check.state("state"),
            phone: check.phone("phone"),
            genres: check.genres("genres"),
            image_link: check.optional_link("image_link", LONG_TEXT_MAX),
            website: check.optional_link("website", LONG_TEXT_MAX),
            facebook_link: check.optional_link("facebook_link", SHORT_TEXT_MAX),
            seeking_venue: check.checkbox("seeking_venue"),
            seeking_description: check.optional("seeking_description", LONG_TEXT_MAX),
        };
        check.finish(form)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShowForm {
    pub artist_id: i64,
    pub venue_id: i64,
    pub start_time: NaiveDateTime,
}

impl ShowForm {
    pub fn from_form(data: &FormData) -> Result<Self, ValidationError> {
        let mut check = Checker::new(data);
        let form = ShowForm {
            artist_id: check.id("artist_id"),
            venue_id: check.id("venue_id"),
            start_time: check.datetime("start_time"),
        };
        check.finish(form)
    }
}

fn push_optional(data: &mut FormData, name: &str, value: &Option<String>) {
    if let Some(value) = value {
        data.insert(name, value.as_str());
    }
}

fn push_genres(data: &mut FormData, genres: &[Genre]) {
    for genre in genres {
        data.insert("genres", genre.label());
    }
}

/// Pre-populates an edit form from the stored venue.
impl From<&Venue> for FormData {
    fn from(venue: &Venue) -> Self {
        let mut data = FormData::new();
        data.insert("name", venue.name.as_str());
        data.insert("city", venue.city.as_str());
        data.insert("state", venue.state.as_str());
        data.insert("address", venue.address.as_str());
        data.insert("phone", venue.phone.as_str());
        push_optional(&mut data, "image_link", &venue.image_link);
        push_genres(&mut data, &venue.genres);
        push_optional(&mut data, "facebook_link", &venue.facebook_link);
        push_optional(&mut data, "website", &venue.website);
        if venue.seeking_talent {
            data.insert("seeking_talent", "y");
        }
        push_optional(&mut data, "seeking_description", &venue.seeking_description);
        data
    }
}

/// Pre-populates an edit form from the stored artist.
impl From<&Artist> for FormData {
    fn from(artist: &Artist) -> Self {
        let mut data = FormData::new();
        data.insert("name", artist.name.as_str());
        data.insert("city", artist.city.as_str());
        data.insert("state", artist.state.as_str());
        data.insert("phone", artist.phone.as_str());
        push_genres(&mut data, &artist.genres);
        push_optional(&mut data, "image_link", &artist.image_link);
        push_optional(&mut data, "website", &artist.website);
        push_optional(&mut data, "facebook_link", &artist.facebook_link);
        if artist.seeking_venue {
            data.insert("seeking_venue", "y");
        }
        push_optional(&mut data, "seeking_description", &artist.seeking_description);
        data
    }
}
