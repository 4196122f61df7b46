use async_trait::async_trait;
use chrono::NaiveDateTime;
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

use super::session::Session;
use super::{Storage, MAX_PER_PAGE};
use crate::domain::*;
use crate::error::{Result, StorageError};
use crate::forms::{ArtistForm, ShowForm, ValidationError, VenueForm};
use crate::schedule::partition;

/// SQLite-backed storage holding a single connection.
///
/// Every unit of work borrows the connection on a blocking thread, opens a
/// transaction and commits only if the work returned `Ok`. Errors and panics
/// drop the transaction, which rolls it back, and the lock guard is released
/// on every path.
#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Open (or create) the database file at `path` and apply migrations.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        info!("Opening SQLite database at {}", path.display());
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::from_connection(conn)
    }

    /// A private in-memory database, mostly useful for tests.
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        register_functions(&conn)?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `work` inside one transaction on a blocking thread.
    pub async fn with_session<T, F>(&self, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Session<'_>) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || -> Result<T> {
            let mut guard = conn.lock().unwrap_or_else(|poisoned| {
                // The transaction that panicked was rolled back while unwinding.
                warn!("Recovering storage connection after a panicked unit of work");
                PoisonError::into_inner(poisoned)
            });
            let tx = guard.transaction()?;
            let value = work(&Session::new(&tx))?;
            tx.commit()?;
            Ok(value)
        })
        .await
        .map_err(|e| StorageError::Session(format!("storage task failed: {e}")))?
    }
}

/// `fold_case(text)` lowercases with full Unicode rules; the built-in `LIKE`
/// only folds ASCII letters.
fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "fold_case",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text = ctx.get::<String>(0)?;
            Ok(text.to_lowercase())
        },
    )?;
    Ok(())
}

pub fn run_migrations(conn: &Connection) -> Result<()> {
    debug!("Running database migrations...");
    let migration_sql = include_str!("../../migrations/001_create_schema.sql");
    conn.execute_batch(migration_sql)?;
    debug!("Database migrations completed successfully");
    Ok(())
}

fn require<T>(found: Option<T>, entity: &'static str, id: i64) -> Result<T> {
    found.ok_or(StorageError::NotFound { entity, id })
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn venues_by_area(&self, now: NaiveDateTime) -> Result<Vec<CityGroup>> {
        self.with_session(move |s| s.venues_by_area(now)).await
    }

    async fn search_venues(&self, term: &str, now: NaiveDateTime) -> Result<SearchResults> {
        let term = term.to_string();
        let hits = self
            .with_session(move |s| s.search_venues(&term, now))
            .await?;
        Ok(SearchResults::from(hits))
    }

    async fn venue_detail(&self, id: i64, now: NaiveDateTime) -> Result<VenueDetail> {
        self.with_session(move |s| {
            let venue = require(s.get_venue(id)?, "venue", id)?;
            let shows = partition(s.venue_shows(id)?, now);
            Ok(VenueDetail { venue, shows })
        })
        .await
    }

    async fn get_venue(&self, id: i64) -> Result<Venue> {
        self.with_session(move |s| require(s.get_venue(id)?, "venue", id))
            .await
    }

    async fn create_venue(&self, form: VenueForm) -> Result<Venue> {
        let venue = self
            .with_session(move |s| {
                let id = s.insert_venue(&form)?;
                require(s.get_venue(id)?, "venue", id)
            })
            .await?;
        info!("Created venue: {} with id {}", venue.name, venue.id);
        Ok(venue)
    }

    async fn update_venue(&self, id: i64, form: VenueForm) -> Result<Venue> {
        let venue = self
            .with_session(move |s| {
                if s.update_venue(id, &form)? == 0 {
                    return Err(StorageError::not_found("venue", id));
                }
                require(s.get_venue(id)?, "venue", id)
            })
            .await?;
        info!("Updated venue: {} with id {}", venue.name, venue.id);
        Ok(venue)
    }

    async fn delete_venue(&self, id: i64) -> Result<Venue> {
        let venue = self
            .with_session(move |s| {
                let venue = require(s.get_venue(id)?, "venue", id)?;
                let dependents = s.count_venue_shows(id)?;
                if dependents > 0 {
                    return Err(StorageError::HasDependents {
                        entity: "venue",
                        id,
                        dependents,
                    });
                }
                s.delete_venue(id)?;
                Ok(venue)
            })
            .await?;
        info!("Deleted venue: {} with id {}", venue.name, venue.id);
        Ok(venue)
    }

    async fn list_artists(&self, now: NaiveDateTime) -> Result<Vec<ArtistSummary>> {
        self.with_session(move |s| s.artist_summaries(now)).await
    }

    async fn search_artists(&self, term: &str, now: NaiveDateTime) -> Result<SearchResults> {
        let term = term.to_string();
        let hits = self
            .with_session(move |s| s.search_artists(&term, now))
            .await?;
        Ok(SearchResults::from(hits))
    }

    async fn artist_detail(&self, id: i64, now: NaiveDateTime) -> Result<ArtistDetail> {
        self.with_session(move |s| {
            let artist = require(s.get_artist(id)?, "artist", id)?;
            let shows = partition(s.artist_shows(id)?, now);
            Ok(ArtistDetail { artist, shows })
        })
        .await
    }

    async fn get_artist(&self, id: i64) -> Result<Artist> {
        self.with_session(move |s| require(s.get_artist(id)?, "artist", id))
            .await
    }

    async fn create_artist(&self, form: ArtistForm) -> Result<Artist> {
        let artist = self
            .with_session(move |s| {
                let id = s.insert_artist(&form)?;
                require(s.get_artist(id)?, "artist", id)
            })
            .await?;
        info!("Created artist: {} with id {}", artist.name, artist.id);
        Ok(artist)
    }

    async fn update_artist(&self, id: i64, form: ArtistForm) -> Result<Artist> {
        let artist = self
            .with_session(move |s| {
                if s.update_artist(id, &form)? == 0 {
                    return Err(StorageError::not_found("artist", id));
                }
                require(s.get_artist(id)?, "artist", id)
            })
            .await?;
        info!("Updated artist: {} with id {}", artist.name, artist.id);
        Ok(artist)
    }

    async fn list_shows(&self, page: u32, per_page: u32) -> Result<Page<ShowListing>> {
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        self.with_session(move |s| {
            let total = s.counts()?.shows;
            let mut listing = Page {
                items: Vec::new(),
                page: 1,
                per_page,
                total,
            };
            // Past the end lands on the last page.
            listing.page = page.clamp(1, listing.total_pages());
            let offset = u64::from(listing.page - 1) * u64::from(per_page);
            listing.items = s.list_shows(per_page, offset)?;
            Ok(listing)
        })
        .await
    }

    async fn create_show(&self, form: ShowForm) -> Result<Show> {
        let show = self
            .with_session(move |s| {
                let mut missing = ValidationError::default();
                if !s.artist_exists(form.artist_id)? {
                    missing.push("artist_id", format!("no artist with id {}", form.artist_id));
                }
                if !s.venue_exists(form.venue_id)? {
                    missing.push("venue_id", format!("no venue with id {}", form.venue_id));
                }
                if !missing.is_empty() {
                    return Err(missing.into());
                }
                s.insert_show(&form)
            })
            .await?;
        info!(
            "Created show {} (artist {} at venue {}, {})",
            show.id, show.artist_id, show.venue_id, show.start_time
        );
        Ok(show)
    }

    async fn venue_choices(&self) -> Result<Vec<Choice>> {
        self.with_session(|s| s.venue_choices()).await
    }

    async fn artist_choices(&self) -> Result<Vec<Choice>> {
        self.with_session(|s| s.artist_choices()).await
    }

    async fn counts(&self) -> Result<CatalogCounts> {
        self.with_session(|s| s.counts()).await
    }
}
